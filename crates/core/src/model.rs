//! Volume and snapshot data structures

use serde::{Deserialize, Serialize};

/// A logical block device in the cluster
///
/// The sweeper never creates or destroys volumes. It only lists their
/// snapshots, deletes some of them and re-reads the volume afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Cluster-wide identifier, used in every API call
    pub id: String,
    /// Display name
    pub name: String,
    /// Most recent backup, if any
    pub last_backup: Option<BackupInfo>,
    /// Kubernetes workload bound to this volume (logging only)
    pub workload: Option<WorkloadBinding>,
    /// Attachment state as reported by the cluster (e.g. "attached")
    pub state: Option<String>,
}

/// Descriptor of the last backup taken of a volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupInfo {
    /// Backup name
    pub name: String,
    /// Backup timestamp as reported by the cluster
    pub at: Option<String>,
}

/// Namespace and claim a volume is bound to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadBinding {
    pub namespace: String,
    pub claim: String,
}

/// A point-in-time capture belonging to exactly one volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Name, unique within its volume
    pub name: String,
    /// Raw creation timestamp (`%Y-%m-%dT%H:%M:%SZ`)
    ///
    /// `None` and the empty string both mean "no timestamp".
    pub created: Option<String>,
    /// Size in bytes
    pub size_bytes: u64,
}

impl Volume {
    /// Create a bare volume with no backup or workload metadata
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            last_backup: None,
            workload: None,
            state: None,
        }
    }

    /// Attach last-backup metadata
    pub fn with_last_backup(mut self, name: impl Into<String>, at: Option<String>) -> Self {
        self.last_backup = Some(BackupInfo {
            name: name.into(),
            at,
        });
        self
    }

    /// Attach workload binding metadata
    pub fn with_workload(mut self, namespace: impl Into<String>, claim: impl Into<String>) -> Self {
        self.workload = Some(WorkloadBinding {
            namespace: namespace.into(),
            claim: claim.into(),
        });
        self
    }
}

impl Snapshot {
    /// Create a snapshot record
    pub fn new(name: impl Into<String>, created: Option<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            created,
            size_bytes,
        }
    }

    /// Creation timestamp, with empty or blank values treated as absent
    pub fn created(&self) -> Option<&str> {
        self.created
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_created_is_absent() {
        assert_eq!(Snapshot::new("a", None, 0).created(), None);
        assert_eq!(Snapshot::new("a", Some(String::new()), 0).created(), None);
        assert_eq!(Snapshot::new("a", Some("  ".into()), 0).created(), None);
        assert_eq!(
            Snapshot::new("a", Some("2024-01-01T00:00:00Z".into()), 0).created(),
            Some("2024-01-01T00:00:00Z")
        );
    }

    #[test]
    fn test_volume_builders() {
        let volume = Volume::new("pvc-1")
            .with_last_backup("backup-9", Some("2024-01-01T00:00:00Z".into()))
            .with_workload("media", "jellyfin-config");

        assert_eq!(volume.name, "pvc-1");
        assert_eq!(volume.last_backup.unwrap().name, "backup-9");
        assert_eq!(volume.workload.unwrap().claim, "jellyfin-config");
    }
}
