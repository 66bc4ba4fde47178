//! Per-volume and per-run counters

use serde::Serialize;
use sweep_core::DeletionReason;

/// How far processing of a volume got
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeOutcome {
    /// Snapshots were listed and classified
    #[default]
    Processed,
    /// Snapshot listing is not supported in the volume's current state
    Unsupported,
    /// Snapshot listing failed for another reason
    ListingFailed,
}

/// Counters for one volume
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VolumeStats {
    pub outcome: VolumeOutcome,
    pub seen: u64,
    pub kept: u64,
    pub deleted_orphaned: u64,
    pub deleted_stale: u64,
    pub deleted_invalid_timestamp: u64,
    pub deletion_failures: u64,
    /// Snapshots whose timestamp could not be parsed
    pub classification_errors: u64,
    /// Bytes freed by successful deletions (before purge)
    pub bytes_deleted: u64,
    pub purged: bool,
    pub purge_failed: bool,
}

impl VolumeStats {
    /// Stats for a volume that was skipped before any snapshot was seen
    pub fn skipped(outcome: VolumeOutcome) -> Self {
        Self {
            outcome,
            ..Self::default()
        }
    }

    /// Record one successful deletion
    pub fn record_deleted(&mut self, reason: DeletionReason, size_bytes: u64) {
        match reason {
            DeletionReason::Orphaned => self.deleted_orphaned += 1,
            DeletionReason::Stale => self.deleted_stale += 1,
            DeletionReason::InvalidTimestamp => self.deleted_invalid_timestamp += 1,
        }
        self.bytes_deleted = self.bytes_deleted.saturating_add(size_bytes);
    }

    /// Total successful deletions across all reasons
    pub fn deleted(&self) -> u64 {
        self.deleted_orphaned + self.deleted_stale + self.deleted_invalid_timestamp
    }
}

/// Counters for a whole run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub volumes_total: u64,
    pub volumes_processed: u64,
    pub volumes_skipped: u64,
    pub volumes_failed: u64,
    pub snapshots_seen: u64,
    pub snapshots_kept: u64,
    pub deleted_orphaned: u64,
    pub deleted_stale: u64,
    pub deleted_invalid_timestamp: u64,
    pub deletion_failures: u64,
    pub classification_errors: u64,
    pub bytes_deleted: u64,
    pub purges: u64,
    pub purge_failures: u64,
    /// The scan stopped before every volume was processed
    pub cancelled: bool,
    /// Decisions were logged but nothing was deleted
    pub dry_run: bool,
}

impl RunSummary {
    /// Fold one volume's stats into the run totals
    pub fn merge(&mut self, stats: &VolumeStats) {
        match stats.outcome {
            VolumeOutcome::Processed => self.volumes_processed += 1,
            VolumeOutcome::Unsupported => self.volumes_skipped += 1,
            VolumeOutcome::ListingFailed => self.volumes_failed += 1,
        }

        self.snapshots_seen += stats.seen;
        self.snapshots_kept += stats.kept;
        self.deleted_orphaned += stats.deleted_orphaned;
        self.deleted_stale += stats.deleted_stale;
        self.deleted_invalid_timestamp += stats.deleted_invalid_timestamp;
        self.deletion_failures += stats.deletion_failures;
        self.classification_errors += stats.classification_errors;
        self.bytes_deleted = self.bytes_deleted.saturating_add(stats.bytes_deleted);

        if stats.purged {
            self.purges += 1;
        }
        if stats.purge_failed {
            self.purge_failures += 1;
        }
    }

    /// Total successful deletions across all reasons
    pub fn deleted(&self) -> u64 {
        self.deleted_orphaned + self.deleted_stale + self.deleted_invalid_timestamp
    }

    /// Whether any per-snapshot or per-volume error was recorded
    pub fn has_errors(&self) -> bool {
        self.deletion_failures > 0
            || self.classification_errors > 0
            || self.purge_failures > 0
            || self.volumes_failed > 0
    }
}
