//! Retention policy configuration

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default stale-age threshold in days
pub const DEFAULT_STALE_AGE_DAYS: u32 = 14;

/// What to do with a snapshot that carries no creation timestamp
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingTimestampPolicy {
    /// Treat it as corrupt and delete it (default)
    #[default]
    Delete,
    /// Fall through to the age check, which cannot fire without a timestamp
    Keep,
}

impl MissingTimestampPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Delete => "delete",
            Self::Keep => "keep",
        }
    }
}

impl fmt::Display for MissingTimestampPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MissingTimestampPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delete" => Ok(Self::Delete),
            "keep" => Ok(Self::Keep),
            other => Err(format!("expected 'delete' or 'keep', got '{other}'")),
        }
    }
}

/// Immutable policy for one run
///
/// `now` is captured once at run start so every age comparison in the run
/// uses the same reference instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    /// Name fragments identifying retired backup schedules
    pub orphan_markers: Vec<String>,
    /// Snapshots strictly older than this many whole days are stale
    pub stale_age_days: u32,
    /// Reference instant for age computation
    pub now: DateTime<Utc>,
    /// Handling of snapshots without a creation timestamp
    pub missing_timestamp: MissingTimestampPolicy,
}

impl PolicyConfig {
    /// Create a policy with default thresholds, anchored at `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            orphan_markers: Vec::new(),
            stale_age_days: DEFAULT_STALE_AGE_DAYS,
            now,
            missing_timestamp: MissingTimestampPolicy::default(),
        }
    }

    /// Replace the orphan markers
    pub fn with_orphan_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.orphan_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the stale-age threshold
    pub fn with_stale_age_days(mut self, days: u32) -> Self {
        self.stale_age_days = days;
        self
    }

    /// Replace the missing-timestamp handling
    pub fn with_missing_timestamp(mut self, policy: MissingTimestampPolicy) -> Self {
        self.missing_timestamp = policy;
        self
    }

    /// Stale-age threshold as a duration
    pub fn stale_age(&self) -> Duration {
        Duration::days(i64::from(self.stale_age_days))
    }

    /// First orphan marker contained in `name`, if any
    pub fn orphan_marker_in(&self, name: &str) -> Option<&str> {
        self.orphan_markers
            .iter()
            .map(String::as_str)
            .find(|marker| name.contains(marker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let policy = PolicyConfig::new(now);

        assert_eq!(policy.stale_age_days, 14);
        assert_eq!(policy.stale_age(), Duration::days(14));
        assert_eq!(policy.missing_timestamp, MissingTimestampPolicy::Delete);
        assert!(policy.orphan_markers.is_empty());
    }

    #[test]
    fn test_missing_timestamp_parse() {
        assert_eq!("delete".parse(), Ok(MissingTimestampPolicy::Delete));
        assert_eq!(" KEEP ".parse(), Ok(MissingTimestampPolicy::Keep));
        assert!("maybe".parse::<MissingTimestampPolicy>().is_err());
    }

    #[test]
    fn test_orphan_marker_lookup_is_case_sensitive_substring() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let policy = PolicyConfig::new(now).with_orphan_markers(["c-6fffho", "kubestr"]);

        assert_eq!(policy.orphan_marker_in("c-6fffho-001"), Some("c-6fffho"));
        assert_eq!(policy.orphan_marker_in("snap-kubestr-x"), Some("kubestr"));
        assert_eq!(policy.orphan_marker_in("C-6FFFHO-001"), None);
        assert_eq!(policy.orphan_marker_in("snap-002"), None);
    }
}
