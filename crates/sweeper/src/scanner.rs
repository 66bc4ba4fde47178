//! Cluster-wide scan driving the volume processor

use crate::stats::RunSummary;
use crate::volume::VolumeProcessor;
use std::sync::Arc;
use sweep_core::{ApiError, ClusterApi, PolicyConfig};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Fatal scan failure
#[derive(Debug, Error)]
pub enum ScanError {
    /// Without a volume list nothing can be processed
    #[error("failed to list volumes: {0}")]
    ListVolumes(#[source] ApiError),
}

/// Percentage of volumes started before volume `index`
pub fn progress_percent(index: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    index as f64 / total as f64 * 100.0
}

/// Enumerates volumes and processes them one after another
pub struct ClusterScanner {
    api: Arc<dyn ClusterApi>,
    processor: VolumeProcessor,
    cancel: CancellationToken,
}

impl ClusterScanner {
    pub fn new(api: Arc<dyn ClusterApi>, processor: VolumeProcessor) -> Self {
        Self {
            api,
            processor,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop between volumes once `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run one full scan
    ///
    /// Only the initial volume listing can fail the run. The in-flight
    /// volume always finishes; cancellation is checked before each volume.
    pub async fn run(&self, policy: &PolicyConfig) -> Result<RunSummary, ScanError> {
        let volumes = self.api.list_volumes().await.map_err(ScanError::ListVolumes)?;
        let total = volumes.len();

        info!(
            stale_age_days = policy.stale_age_days,
            orphan_markers = ?policy.orphan_markers,
            now = %policy.now,
            "Starting volume snapshot cleanup"
        );
        info!(volumes = total, "Number of volumes: {}", total);

        let mut summary = RunSummary {
            volumes_total: total as u64,
            ..RunSummary::default()
        };

        for (index, volume) in volumes.iter().enumerate() {
            if self.cancel.is_cancelled() {
                warn!(
                    processed = index,
                    remaining = total - index,
                    "Cancellation requested, stopping before volume {}",
                    volume.name
                );
                summary.cancelled = true;
                break;
            }

            warn!(
                "Processing volume progress: {:.1}% ({}/{})",
                progress_percent(index, total),
                index,
                total
            );

            let stats = self.processor.process(volume, policy).await;
            summary.merge(&stats);
        }

        info!(
            processed = summary.volumes_processed,
            skipped = summary.volumes_skipped,
            failed = summary.volumes_failed,
            deleted = summary.deleted(),
            deletion_failures = summary.deletion_failures,
            purges = summary.purges,
            cancelled = summary.cancelled,
            "Finished volume snapshot cleanup"
        );

        Ok(summary)
    }
}
