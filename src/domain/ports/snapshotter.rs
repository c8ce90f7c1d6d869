//! Snapshotter Port
//!
//! Lets the conflict resolver and handlers take backups without knowing where
//! or how they are stored.

use std::path::{Path, PathBuf};

use crate::error::BackupError;

pub trait Snapshotter: Send + Sync {
    /// Copy `path` aside before it is overwritten.
    ///
    /// Returns `Ok(None)` when the path does not exist. Snapshotting the same
    /// path twice keeps the first (pre-deployment) copy.
    fn snapshot(&self, path: &Path) -> Result<Option<PathBuf>, BackupError>;

    /// Note that `path` did not exist before this run
    fn record_created(&self, path: &Path);
}

/// Snapshotter that never copies anything (dry runs, backups disabled)
pub struct NoSnapshots;

impl Snapshotter for NoSnapshots {
    fn snapshot(&self, _path: &Path) -> Result<Option<PathBuf>, BackupError> {
        Ok(None)
    }

    fn record_created(&self, _path: &Path) {}
}
