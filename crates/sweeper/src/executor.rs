//! Single-snapshot deletion

use crate::retry::RetryPolicy;
use std::sync::Arc;
use sweep_core::format::{bytes_to_mib, format_created_date};
use sweep_core::{ApiError, ClusterApi, DeletionReason, Snapshot, Volume};
use thiserror::Error;
use tracing::{error, warn};

/// A snapshot could not be deleted
///
/// Non-fatal: the caller counts it and moves on to the next snapshot.
#[derive(Debug, Error)]
#[error("failed to delete snapshot {snapshot} on volume {volume}: {source}")]
pub struct DeletionError {
    pub volume: String,
    pub snapshot: String,
    #[source]
    pub source: ApiError,
}

/// Audit line logged before every deletion
pub fn audit_message(snapshot: &Snapshot, reason: DeletionReason) -> String {
    format!(
        "Deleting {} snapshot {} created on {} with size {:.1} MiB",
        reason,
        snapshot.name,
        format_created_date(snapshot.created()),
        bytes_to_mib(snapshot.size_bytes)
    )
}

/// Deletes one snapshot at a time through the cluster API
#[derive(Clone)]
pub struct DeletionExecutor {
    api: Arc<dyn ClusterApi>,
    retry: RetryPolicy,
    dry_run: bool,
}

impl DeletionExecutor {
    /// Create an executor that deletes for real
    pub fn new(api: Arc<dyn ClusterApi>, retry: RetryPolicy) -> Self {
        Self {
            api,
            retry,
            dry_run: false,
        }
    }

    /// Log decisions without calling the API
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Delete `snapshot` from `volume`, logging an audit line first
    pub async fn delete(
        &self,
        volume: &Volume,
        snapshot: &Snapshot,
        reason: DeletionReason,
    ) -> Result<(), DeletionError> {
        let created = format_created_date(snapshot.created());
        let size_mib = bytes_to_mib(snapshot.size_bytes);

        warn!(
            volume = %volume.name,
            snapshot = %snapshot.name,
            reason = %reason,
            created = %created,
            size_mib = format_args!("{size_mib:.1}"),
            dry_run = self.dry_run,
            "{}",
            audit_message(snapshot, reason)
        );

        if self.dry_run {
            return Ok(());
        }

        let api = self.api.as_ref();
        self.retry
            .run("snapshot_delete", move || api.delete_snapshot(&volume.id, &snapshot.name))
            .await
            .map_err(|source| {
                error!(
                    volume = %volume.name,
                    snapshot = %snapshot.name,
                    error = %source,
                    "Failed to delete snapshot due to API error: {}",
                    source
                );
                DeletionError {
                    volume: volume.id.clone(),
                    snapshot: snapshot.name.clone(),
                    source,
                }
            })
    }
}
