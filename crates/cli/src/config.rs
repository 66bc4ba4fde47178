//! Run configuration
//!
//! Values are layered: command-line flag > environment variable > config
//! file > built-in default. Flags and environment variables are both
//! handled by clap and arrive here as [`Overrides`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use sweep_core::policy::DEFAULT_STALE_AGE_DAYS;
use sweep_core::{MissingTimestampPolicy, PolicyConfig};
use sweeper::RetryPolicy;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 2;
const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no cluster endpoint configured (set LONGHORN_URL, --endpoint or `endpoint` in the config file)")]
    MissingEndpoint,

    #[error("stale_age_days must be at least 1")]
    InvalidStaleAge,

    #[error("orphan markers must not be blank (an empty marker matches every snapshot)")]
    EmptyOrphanMarker,

    #[error("request_timeout_secs must be at least 1")]
    InvalidTimeout,
}

/// Contents of the TOML config file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub endpoint: Option<String>,
    pub stale_age_days: Option<u32>,
    pub orphan_markers: Option<Vec<String>>,
    pub missing_timestamp: Option<MissingTimestampPolicy>,
    pub log_level: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub endpoint: Option<String>,
    pub stale_age_days: Option<u32>,
    /// Empty means "not given"
    pub orphan_markers: Vec<String>,
    pub missing_timestamp: Option<MissingTimestampPolicy>,
    pub log_level: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub max_retries: Option<u32>,
    pub retry_backoff_ms: Option<u64>,
    pub dry_run: bool,
}

/// Fully resolved configuration for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    pub endpoint: String,
    pub stale_age_days: u32,
    pub orphan_markers: Vec<String>,
    pub missing_timestamp: MissingTimestampPolicy,
    pub log_level: String,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    pub dry_run: bool,
}

/// Default config file location (`$XDG_CONFIG_HOME/snapsweep/config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("snapsweep").join("config.toml"))
}

/// Load the config file
///
/// An explicitly given path must exist. The default path is optional.
pub fn load_file(explicit: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(FileConfig::default()),
        },
    };

    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;

    toml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

impl SweepConfig {
    /// Merge file values and overrides, then validate
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        let config = Self::merge(file, overrides);
        config.validate()?;
        Ok(config)
    }

    /// Merge file values and overrides without validating
    ///
    /// Markers and the endpoint are trimmed. A missing endpoint is left empty.
    pub fn merge(file: FileConfig, overrides: Overrides) -> Self {
        let orphan_markers = if overrides.orphan_markers.is_empty() {
            file.orphan_markers.unwrap_or_default()
        } else {
            overrides.orphan_markers
        };

        Self {
            endpoint: overrides
                .endpoint
                .or(file.endpoint)
                .map(|endpoint| endpoint.trim().to_string())
                .unwrap_or_default(),
            stale_age_days: overrides
                .stale_age_days
                .or(file.stale_age_days)
                .unwrap_or(DEFAULT_STALE_AGE_DAYS),
            orphan_markers: orphan_markers
                .iter()
                .map(|marker| marker.trim().to_string())
                .collect(),
            missing_timestamp: overrides
                .missing_timestamp
                .or(file.missing_timestamp)
                .unwrap_or_default(),
            log_level: overrides
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            request_timeout: Duration::from_secs(
                overrides
                    .request_timeout_secs
                    .or(file.request_timeout_secs)
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            retry: RetryPolicy {
                max_retries: overrides
                    .max_retries
                    .or(file.max_retries)
                    .unwrap_or(DEFAULT_MAX_RETRIES),
                initial_backoff: Duration::from_millis(
                    overrides
                        .retry_backoff_ms
                        .or(file.retry_backoff_ms)
                        .unwrap_or(DEFAULT_RETRY_BACKOFF_MS),
                ),
            },
            dry_run: overrides.dry_run,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.is_empty() {
            return Err(ConfigError::MissingEndpoint);
        }
        if self.stale_age_days == 0 {
            return Err(ConfigError::InvalidStaleAge);
        }
        if self.orphan_markers.iter().any(|marker| marker.is_empty()) {
            return Err(ConfigError::EmptyOrphanMarker);
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }

    /// Build the immutable policy for a run started at `now`
    pub fn policy(&self, now: DateTime<Utc>) -> PolicyConfig {
        PolicyConfig::new(now)
            .with_orphan_markers(self.orphan_markers.iter().cloned())
            .with_stale_age_days(self.stale_age_days)
            .with_missing_timestamp(self.missing_timestamp)
    }
}
