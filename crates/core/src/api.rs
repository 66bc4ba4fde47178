//! Cluster management API contract

use crate::model::{Snapshot, Volume};
use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by a cluster API implementation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The volume cannot list snapshots in its current state (e.g. detached)
    #[error("snapshot listing is not supported for volume {volume} in its current state")]
    Unsupported { volume: String },

    /// The addressed volume or snapshot does not exist
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The server answered with a non-success status
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The request never got a response
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Unsupported { .. } | Self::NotFound { .. } | Self::Decode(_) => false,
        }
    }

    /// Whether this is the "listing not supported" condition
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// Operations the sweeper needs from the storage cluster
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// List every volume in the cluster
    async fn list_volumes(&self) -> Result<Vec<Volume>, ApiError>;

    /// List the snapshots of a volume, in cluster order
    async fn list_snapshots(&self, volume_id: &str) -> Result<Vec<Snapshot>, ApiError>;

    /// Delete one snapshot by name
    async fn delete_snapshot(&self, volume_id: &str, snapshot: &str) -> Result<(), ApiError>;

    /// Reclaim space left behind by deleted snapshots
    async fn purge_snapshots(&self, volume_id: &str) -> Result<(), ApiError>;

    /// Re-read a volume's current state
    async fn get_volume(&self, volume_id: &str) -> Result<Volume, ApiError>;
}
