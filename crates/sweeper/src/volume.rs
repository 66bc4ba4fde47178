//! Per-volume processing

use crate::executor::DeletionExecutor;
use crate::retry::RetryPolicy;
use crate::stats::{VolumeOutcome, VolumeStats};
use std::sync::Arc;
use sweep_core::{classify, Classification, ClusterApi, PolicyConfig, Volume};
use tracing::{debug, error, info, warn};

/// Classifies and deletes the snapshots of one volume, then purges once
#[derive(Clone)]
pub struct VolumeProcessor {
    api: Arc<dyn ClusterApi>,
    executor: DeletionExecutor,
    retry: RetryPolicy,
}

impl VolumeProcessor {
    /// Create a processor sharing the executor's API handle
    pub fn new(api: Arc<dyn ClusterApi>, executor: DeletionExecutor, retry: RetryPolicy) -> Self {
        Self {
            api,
            executor,
            retry,
        }
    }

    /// Process one volume
    ///
    /// Never fails: listing problems, classification errors and API
    /// failures are logged and reflected in the returned stats.
    pub async fn process(&self, volume: &Volume, policy: &PolicyConfig) -> VolumeStats {
        // 1. Identify the volume
        match &volume.workload {
            Some(workload) => info!(
                volume = %volume.name,
                pvc = %workload.claim,
                namespace = %workload.namespace,
                "Processing volume: {} for {} in namespace: {}",
                volume.name,
                workload.claim,
                workload.namespace
            ),
            None => info!(volume = %volume.name, "Processing volume: {}", volume.name),
        }

        if let Some(backup) = &volume.last_backup {
            info!(
                volume = %volume.name,
                "Last backup: {} on: {}",
                backup.name,
                backup.at.as_deref().unwrap_or("")
            );
        }

        // 2. List snapshots
        let snapshots = match self.api.list_snapshots(&volume.id).await {
            Ok(snapshots) => snapshots,
            Err(e) if e.is_unsupported() => {
                info!(volume = %volume.name, "Ignoring volume: {}", e);
                return VolumeStats::skipped(VolumeOutcome::Unsupported);
            }
            Err(e) => {
                error!(volume = %volume.name, error = %e, "Failed to list snapshots: {}", e);
                return VolumeStats::skipped(VolumeOutcome::ListingFailed);
            }
        };

        info!(volume = %volume.name, count = snapshots.len(), "Number of snapshots: {}", snapshots.len());

        // 3. Classify and delete, in listing order
        let mut stats = VolumeStats::default();
        for snapshot in &snapshots {
            stats.seen += 1;

            let classification = match classify(snapshot, policy) {
                Ok(classification) => classification,
                Err(e) => {
                    error!(volume = %volume.name, snapshot = %snapshot.name, error = %e, "Skipping snapshot: {}", e);
                    stats.classification_errors += 1;
                    continue;
                }
            };

            let Some(reason) = classification.deletion_reason() else {
                info!(volume = %volume.name, snapshot = %snapshot.name, "Ignoring snapshot: {}", snapshot.name);
                stats.kept += 1;
                continue;
            };

            if classification == Classification::DeleteInvalidTimestamp {
                debug!(snapshot = %snapshot.name, "Snapshot creation date empty, deleting");
            }

            match self.executor.delete(volume, snapshot, reason).await {
                Ok(()) => stats.record_deleted(reason, snapshot.size_bytes),
                Err(_) => stats.deletion_failures += 1,
            }
        }

        // 4. Reclaim space once for the whole volume
        if stats.deleted() > 0 {
            if self.executor.is_dry_run() {
                info!(volume = %volume.name, "Dry run, skipping purge");
            } else {
                info!(volume = %volume.name, "Purging snapshots...");
                let api = self.api.as_ref();
                match self
                    .retry
                    .run("snapshot_purge", move || api.purge_snapshots(&volume.id))
                    .await
                {
                    Ok(()) => stats.purged = true,
                    Err(e) => {
                        error!(volume = %volume.name, error = %e, "Failed to purge snapshots: {}", e);
                        stats.purge_failed = true;
                    }
                }
            }
        }

        info!(volume = %volume.name, "Finished processing volume {}", volume.name);
        info!(
            volume = %volume.name,
            deleted = stats.deleted(),
            kept = stats.kept,
            failures = stats.deletion_failures,
            "Deleted {} snapshots",
            stats.deleted()
        );

        // 5. Re-read post-purge state
        match self.api.get_volume(&volume.id).await {
            Ok(refreshed) => debug!(
                volume = %refreshed.name,
                state = refreshed.state.as_deref().unwrap_or("unknown"),
                "Refreshed volume"
            ),
            Err(e) => warn!(volume = %volume.name, error = %e, "Failed to refresh volume: {}", e),
        }
        info!("---");

        stats
    }
}
