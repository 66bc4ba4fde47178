//! Snapshot sweeper - applies the retention policy to a live cluster
//!
//! This crate provides:
//! - Per-snapshot deletion with failure isolation
//! - Per-volume processing with a single purge per volume
//! - Cluster-wide scan with progress, summary and cancellation
//! - Bounded retry for transient API failures

pub mod executor;
pub mod retry;
pub mod scanner;
pub mod stats;
pub mod volume;

// Re-exports
pub use executor::{audit_message, DeletionError, DeletionExecutor};
pub use retry::RetryPolicy;
pub use scanner::{progress_percent, ClusterScanner, ScanError};
pub use stats::{RunSummary, VolumeOutcome, VolumeStats};
pub use volume::VolumeProcessor;
