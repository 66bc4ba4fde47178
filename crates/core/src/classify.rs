//! Snapshot classification
//!
//! Rules are evaluated in a fixed order and the first match wins:
//!
//! 1. Name contains an orphan marker      -> `DeleteOrphaned`
//! 2. No creation timestamp               -> `DeleteInvalidTimestamp`
//! 3. Age in whole days > stale threshold -> `DeleteStale`
//! 4. Otherwise                           -> `Keep`

use crate::model::Snapshot;
use crate::policy::{MissingTimestampPolicy, PolicyConfig};
use chrono::{DateTime, NaiveDateTime, Utc};
use std::fmt;
use thiserror::Error;

/// Wire format of snapshot creation timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Outcome of classifying one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Leave the snapshot alone
    Keep,
    /// Created by a backup schedule that no longer exists
    DeleteOrphaned {
        /// The marker that matched
        marker: String,
    },
    /// Older than the retention threshold
    DeleteStale {
        /// Age in whole days at the policy's reference instant
        age_days: i64,
    },
    /// No usable creation timestamp
    DeleteInvalidTimestamp,
}

/// Why a snapshot is being removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeletionReason {
    Orphaned,
    Stale,
    InvalidTimestamp,
}

/// Per-snapshot classification failure
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("snapshot {snapshot} has malformed creation timestamp {value:?}: {source}")]
    MalformedTimestamp {
        snapshot: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl Classification {
    /// Deletion reason, or `None` for `Keep`
    pub fn deletion_reason(&self) -> Option<DeletionReason> {
        match self {
            Self::Keep => None,
            Self::DeleteOrphaned { .. } => Some(DeletionReason::Orphaned),
            Self::DeleteStale { .. } => Some(DeletionReason::Stale),
            Self::DeleteInvalidTimestamp => Some(DeletionReason::InvalidTimestamp),
        }
    }
}

impl DeletionReason {
    /// Human-readable reason used in audit logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Orphaned => "orphaned",
            Self::Stale => "stale",
            Self::InvalidTimestamp => "invalid creation date",
        }
    }
}

impl fmt::Display for DeletionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a snapshot creation timestamp
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).map(|naive| naive.and_utc())
}

/// Classify a snapshot against the run's policy
///
/// Pure and deterministic: the reference instant comes from `policy.now`.
pub fn classify(snapshot: &Snapshot, policy: &PolicyConfig) -> Result<Classification, ClassifyError> {
    if let Some(marker) = policy.orphan_marker_in(&snapshot.name) {
        return Ok(Classification::DeleteOrphaned {
            marker: marker.to_string(),
        });
    }

    let Some(raw) = snapshot.created() else {
        return Ok(match policy.missing_timestamp {
            MissingTimestampPolicy::Delete => Classification::DeleteInvalidTimestamp,
            MissingTimestampPolicy::Keep => Classification::Keep,
        });
    };

    let created = parse_timestamp(raw).map_err(|source| ClassifyError::MalformedTimestamp {
        snapshot: snapshot.name.clone(),
        value: raw.to_string(),
        source,
    })?;

    let age_days = (policy.now - created).num_days();
    if age_days > i64::from(policy.stale_age_days) {
        return Ok(Classification::DeleteStale { age_days });
    }

    Ok(Classification::Keep)
}
