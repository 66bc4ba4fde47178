//! Snapsweep CLI - snapshot garbage collection for Longhorn clusters
//!
//! ## Commands
//!
//! - `snapsweep run` - Classify and delete snapshots, purge touched volumes
//! - `snapsweep run --dry-run` - Log every decision without deleting
//! - `snapsweep config` - Show the effective configuration
//!
//! Running without a subcommand is the same as `snapsweep run`.

pub mod cmd;
pub mod config;
pub mod logging;
pub mod report;
pub mod signal;

use clap::{Args, Parser, Subcommand, ValueEnum};
use config::Overrides;
use std::path::PathBuf;
use sweep_core::MissingTimestampPolicy;

/// Snapsweep - remove orphaned and stale volume snapshots
#[derive(Debug, Parser)]
#[command(name = "snapsweep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Settings shared by every command
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Config file (default: $XDG_CONFIG_HOME/snapsweep/config.toml)
    #[arg(long, global = true, env = "SNAPSWEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Longhorn manager endpoint, e.g. localhost:8080
    #[arg(long, global = true, env = "LONGHORN_URL")]
    pub endpoint: Option<String>,

    /// Delete snapshots older than this many days (legacy DELETE_AGE_DAY is also read)
    #[arg(long, global = true, env = "DELETE_AGE_DAYS")]
    pub stale_age_days: Option<u32>,

    /// Older spelling of `--stale-age-days`
    #[arg(long = "delete-age-day", global = true, env = "DELETE_AGE_DAY", hide = true)]
    pub legacy_stale_age_days: Option<u32>,

    /// Delete snapshots whose name contains this string (repeatable)
    #[arg(long = "orphan-marker", global = true, env = "DELETE_STRINGS", value_delimiter = ',')]
    pub orphan_markers: Vec<String>,

    /// Snapshots without a creation date: delete or keep
    #[arg(long, global = true, env = "MISSING_TIMESTAMP")]
    pub missing_timestamp: Option<MissingTimestampPolicy>,

    /// Log level or filter directive (overridden by RUST_LOG; legacy log_level is also read)
    #[arg(long, global = true, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Lowercase `log_level` environment variable from older deployments
    #[arg(long = "legacy-log-level", global = true, env = "log_level", hide = true)]
    pub legacy_log_level: Option<String>,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub request_timeout_secs: Option<u64>,

    /// Retries for transient delete/purge failures
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Initial retry backoff in milliseconds (doubles per retry)
    #[arg(long, global = true)]
    pub retry_backoff_ms: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run snapshot cleanup once
    Run(RunArgs),
    /// Show the effective configuration
    Config,
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Classify and log, but delete and purge nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Summary output format
    #[arg(long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Summary output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Settings {
    /// Config overrides from flags and environment
    pub fn overrides(&self, dry_run: bool) -> Overrides {
        Overrides {
            endpoint: self.endpoint.clone(),
            stale_age_days: self.stale_age_days.or(self.legacy_stale_age_days),
            orphan_markers: self.orphan_markers.clone(),
            missing_timestamp: self.missing_timestamp,
            log_level: self.log_level.clone().or_else(|| self.legacy_log_level.clone()),
            request_timeout_secs: self.request_timeout_secs,
            max_retries: self.max_retries,
            retry_backoff_ms: self.retry_backoff_ms,
            dry_run,
        }
    }
}
