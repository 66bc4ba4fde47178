//! Longhorn JSON resources and their mapping onto the core model

use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use sweep_core::{BackupInfo, Snapshot, Volume, WorkloadBinding};

/// Name of the live head entry Longhorn includes in snapshot listings
pub const VOLUME_HEAD: &str = "volume-head";

/// Action a volume must advertise before its snapshots can be listed
pub const SNAPSHOT_LIST_ACTION: &str = "snapshotList";

/// Generic `{ "data": [...] }` collection envelope
#[derive(Debug, Deserialize)]
pub struct Collection<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireVolume {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub last_backup: String,
    #[serde(default)]
    pub last_backup_at: String,
    #[serde(default)]
    pub kubernetes_status: Option<WireKubernetesStatus>,
    /// Action name -> action URL, only present for actions valid right now
    #[serde(default)]
    pub actions: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireKubernetesStatus {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub pvc_name: String,
}

#[derive(Debug, Deserialize)]
pub struct WireSnapshot {
    pub name: String,
    #[serde(default)]
    pub created: String,
    #[serde(default, deserialize_with = "size_bytes")]
    pub size: u64,
}

/// Longhorn reports sizes as decimal strings; accept numbers too
fn size_bytes<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Number(u64),
        Text(String),
    }

    match Size::deserialize(deserializer)? {
        Size::Number(n) => Ok(n),
        Size::Text(text) if text.trim().is_empty() => Ok(0),
        Size::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid snapshot size {text:?}"))),
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

impl WireVolume {
    /// Identifier used in API paths
    pub fn key(&self) -> &str {
        if self.id.is_empty() {
            &self.name
        } else {
            &self.id
        }
    }

    /// Whether the volume currently allows snapshot listing
    pub fn can_list_snapshots(&self) -> bool {
        self.actions.contains_key(SNAPSHOT_LIST_ACTION)
    }
}

impl From<WireVolume> for Volume {
    fn from(wire: WireVolume) -> Self {
        let id = wire.key().to_string();
        let name = if wire.name.is_empty() { id.clone() } else { wire.name };

        let last_backup = non_empty(wire.last_backup).map(|name| BackupInfo {
            name,
            at: non_empty(wire.last_backup_at),
        });

        let workload = wire
            .kubernetes_status
            .filter(|status| !status.pvc_name.is_empty())
            .map(|status| WorkloadBinding {
                namespace: status.namespace,
                claim: status.pvc_name,
            });

        Volume {
            id,
            name,
            last_backup,
            workload,
            state: non_empty(wire.state),
        }
    }
}

impl From<WireSnapshot> for Snapshot {
    fn from(wire: WireSnapshot) -> Self {
        Snapshot {
            name: wire.name,
            created: non_empty(wire.created),
            size_bytes: wire.size,
        }
    }
}

/// Convert a snapshot listing, dropping the volume head entry
pub fn into_snapshots(wire: Vec<WireSnapshot>) -> Vec<Snapshot> {
    wire.into_iter()
        .filter(|s| s.name != VOLUME_HEAD)
        .map(Snapshot::from)
        .collect()
}
