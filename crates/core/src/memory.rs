//! In-memory cluster for tests and rehearsals
//!
//! [`MemoryCluster`] implements [`ClusterApi`] over plain collections and
//! records every mutating call, so callers can assert exactly what the
//! sweeper asked the cluster to do. Failures can be injected per volume or
//! per snapshot.
//!
//! Not a model of real cluster behavior: purge is a no-op apart from being
//! recorded, and deleted snapshots disappear immediately.

use crate::api::{ApiError, ClusterApi};
use crate::model::{Snapshot, Volume};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// Injected failure for one (volume, snapshot) delete
#[derive(Debug, Clone)]
struct DeleteFault {
    error: ApiError,
    /// Remaining failing attempts; `None` fails forever
    remaining: Option<u32>,
}

#[derive(Debug, Default)]
struct State {
    volumes: Vec<Volume>,
    snapshots: HashMap<String, Vec<Snapshot>>,
    unsupported: HashSet<String>,
    list_volumes_error: Option<ApiError>,
    delete_faults: HashMap<(String, String), DeleteFault>,
    purge_faults: HashMap<String, ApiError>,
    delete_attempts: Vec<(String, String)>,
    deleted: Vec<(String, String)>,
    purges: Vec<String>,
    refreshes: Vec<String>,
}

/// Thread-safe in-memory [`ClusterApi`]
#[derive(Debug, Default)]
pub struct MemoryCluster {
    state: Mutex<State>,
}

impl MemoryCluster {
    /// Create an empty cluster
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a volume with its snapshots, in listing order
    pub fn with_volume(self, volume: Volume, snapshots: Vec<Snapshot>) -> Self {
        {
            let mut state = self.state.lock();
            state.snapshots.insert(volume.id.clone(), snapshots);
            state.volumes.push(volume);
        }
        self
    }

    /// Add a volume whose snapshot listing is not supported
    pub fn with_unsupported_volume(self, volume: Volume) -> Self {
        {
            let mut state = self.state.lock();
            state.unsupported.insert(volume.id.clone());
            state.volumes.push(volume);
        }
        self
    }

    /// Make `list_volumes` fail
    pub fn fail_listing(self, error: ApiError) -> Self {
        self.state.lock().list_volumes_error = Some(error);
        self
    }

    /// Make every delete of `snapshot` on `volume_id` fail
    pub fn fail_delete(self, volume_id: &str, snapshot: &str, error: ApiError) -> Self {
        self.insert_delete_fault(volume_id, snapshot, error, None);
        self
    }

    /// Make the first `times` deletes of `snapshot` fail, then succeed
    pub fn fail_delete_times(self, volume_id: &str, snapshot: &str, times: u32, error: ApiError) -> Self {
        self.insert_delete_fault(volume_id, snapshot, error, Some(times));
        self
    }

    /// Make every purge of `volume_id` fail
    pub fn fail_purge(self, volume_id: &str, error: ApiError) -> Self {
        self.state.lock().purge_faults.insert(volume_id.to_string(), error);
        self
    }

    fn insert_delete_fault(&self, volume_id: &str, snapshot: &str, error: ApiError, remaining: Option<u32>) {
        self.state.lock().delete_faults.insert(
            (volume_id.to_string(), snapshot.to_string()),
            DeleteFault { error, remaining },
        );
    }

    /// Every delete call, including failed ones, in call order
    pub fn delete_attempts(&self) -> Vec<(String, String)> {
        self.state.lock().delete_attempts.clone()
    }

    /// Successful deletes, in call order
    pub fn deleted(&self) -> Vec<(String, String)> {
        self.state.lock().deleted.clone()
    }

    /// Volume ids passed to purge, in call order
    pub fn purges(&self) -> Vec<String> {
        self.state.lock().purges.clone()
    }

    /// Volume ids re-read through `get_volume`, in call order
    pub fn refreshes(&self) -> Vec<String> {
        self.state.lock().refreshes.clone()
    }

    /// Names of the snapshots still present on a volume
    pub fn remaining_snapshots(&self, volume_id: &str) -> Vec<String> {
        self.state
            .lock()
            .snapshots
            .get(volume_id)
            .map(|snapshots| snapshots.iter().map(|s| s.name.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ClusterApi for MemoryCluster {
    async fn list_volumes(&self) -> Result<Vec<Volume>, ApiError> {
        let state = self.state.lock();
        match &state.list_volumes_error {
            Some(error) => Err(error.clone()),
            None => Ok(state.volumes.clone()),
        }
    }

    async fn list_snapshots(&self, volume_id: &str) -> Result<Vec<Snapshot>, ApiError> {
        let state = self.state.lock();
        if state.unsupported.contains(volume_id) {
            return Err(ApiError::Unsupported {
                volume: volume_id.to_string(),
            });
        }

        state
            .snapshots
            .get(volume_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("volume {volume_id}"),
            })
    }

    async fn delete_snapshot(&self, volume_id: &str, snapshot: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        let key = (volume_id.to_string(), snapshot.to_string());
        state.delete_attempts.push(key.clone());

        if let Some(fault) = state.delete_faults.get_mut(&key) {
            match fault.remaining.as_mut() {
                None => return Err(fault.error.clone()),
                Some(0) => {}
                Some(remaining) => {
                    *remaining -= 1;
                    return Err(fault.error.clone());
                }
            }
        }

        let snapshots = state
            .snapshots
            .get_mut(volume_id)
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("volume {volume_id}"),
            })?;

        let before = snapshots.len();
        snapshots.retain(|s| s.name != snapshot);
        if snapshots.len() == before {
            return Err(ApiError::NotFound {
                resource: format!("snapshot {snapshot}"),
            });
        }

        state.deleted.push(key);
        Ok(())
    }

    async fn purge_snapshots(&self, volume_id: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.purges.push(volume_id.to_string());
        match state.purge_faults.get(volume_id) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn get_volume(&self, volume_id: &str) -> Result<Volume, ApiError> {
        let mut state = self.state.lock();
        state.refreshes.push(volume_id.to_string());
        state
            .volumes
            .iter()
            .find(|v| v.id == volume_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("volume {volume_id}"),
            })
    }
}
