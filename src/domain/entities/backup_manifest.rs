//! Backup manifest entity - what was snapshotted and what was created

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One snapshotted file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEntry {
    pub original: PathBuf,
    pub backup: PathBuf,
}

/// Drives rollback of a failed deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupManifest {
    /// Directory holding this run's snapshots
    pub root: PathBuf,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub entries: Vec<BackupEntry>,
    /// Files that did not exist before the run
    #[serde(default)]
    pub created_files: Vec<PathBuf>,
}

impl BackupManifest {
    pub fn new(root: PathBuf, created_at: DateTime<Utc>) -> Self {
        Self {
            root,
            created_at,
            entries: Vec::new(),
            created_files: Vec::new(),
        }
    }

    pub fn original_paths(&self) -> Vec<&PathBuf> {
        self.entries.iter().map(|e| &e.original).collect()
    }

    pub fn backup_paths(&self) -> Vec<&PathBuf> {
        self.entries.iter().map(|e| &e.backup).collect()
    }

    pub fn contains(&self, original: &std::path::Path) -> bool {
        self.entries.iter().any(|e| e.original == original)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.created_files.is_empty()
    }
}
