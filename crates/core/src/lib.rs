//! Snapsweep core - snapshot model and retention decisions
//!
//! This crate provides:
//! - Volume and snapshot data structures
//! - Immutable per-run policy configuration
//! - The snapshot classifier (orphaned / invalid / stale / keep)
//! - The cluster API contract the sweeper drives
//! - An in-memory cluster for tests and rehearsals

pub mod api;
pub mod classify;
pub mod format;
pub mod memory;
pub mod model;
pub mod policy;

// Re-exports
pub use api::{ApiError, ClusterApi};
pub use classify::{classify, parse_timestamp, Classification, ClassifyError, DeletionReason};
pub use memory::MemoryCluster;
pub use model::{BackupInfo, Snapshot, Volume, WorkloadBinding};
pub use policy::{MissingTimestampPolicy, PolicyConfig};
