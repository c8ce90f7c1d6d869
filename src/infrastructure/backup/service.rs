//! Backup Service
//!
//! Snapshot-before-write and restore-on-failure over a backup root
//! (`~/.cairn/backups` by default). Each run gets its own timestamped
//! directory that mirrors the absolute paths of the files it saved.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use crate::domain::entities::BackupManifest;
use crate::domain::ports::{FileSystem, Snapshotter};
use crate::error::{codes, BackupError, DeployIssue};
use crate::infrastructure::fs::LocalFs;

use super::session::BackupSession;

/// Default number of run directories kept by [`BackupService::prune`]
pub const DEFAULT_RETAIN: usize = 5;

/// `<YYYY-MM-DDTHH-MM-SS.mmm>-<pid>[-<n>]`, the only names `list` and `prune` touch
const RUN_DIR_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}T\d{2}-\d{2}-\d{2}\.\d{3}-\d+(?:-\d+)?$";

/// What a rollback did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackReport {
    pub restored: usize,
    pub removed: usize,
    /// Partial failures; rollback never fails outright
    pub warnings: Vec<DeployIssue>,
}

#[derive(Clone)]
pub struct BackupService {
    root: PathBuf,
    retain: usize,
    fs: Arc<dyn FileSystem>,
}

impl BackupService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            retain: DEFAULT_RETAIN,
            fs: Arc::new(LocalFs::new()),
        }
    }

    /// File system used for snapshots and restores
    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    pub fn with_retain(mut self, retain: usize) -> Self {
        self.retain = retain.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a lazy session for one deployment
    pub fn start_session(&self) -> BackupSession {
        BackupSession::new(self.root.clone(), self.fs.clone())
    }

    /// Snapshot every existing path now; nonexistent paths are skipped
    pub fn create_backup(&self, paths: &[PathBuf]) -> Result<BackupManifest, BackupError> {
        let session = self.start_session();
        for path in paths {
            session.snapshot(path)?;
        }
        Ok(session
            .persist()?
            .unwrap_or_else(|| BackupManifest::new(self.root.clone(), chrono::Utc::now())))
    }

    /// Restore every snapshot and remove every file created during the run.
    ///
    /// Safe to run more than once. Individual failures become warnings.
    pub fn rollback(&self, manifest: &BackupManifest) -> RollbackReport {
        let mut report = RollbackReport::default();

        for created in &manifest.created_files {
            match self.fs.remove(created) {
                Ok(()) => report.removed += 1,
                Err(e) if e.is_not_found() => {}
                Err(e) => report.warnings.push(
                    DeployIssue::warning(
                        codes::BACKUP_FAILED,
                        format!("could not remove {}: {e}", created.display()),
                    )
                    .with_path(created),
                ),
            }
        }

        for entry in &manifest.entries {
            match self.fs.copy(&entry.backup, &entry.original) {
                Ok(()) => report.restored += 1,
                Err(e) => {
                    let err = BackupError::Restore {
                        path: entry.original.clone(),
                        source: e.into(),
                    };
                    report.warnings.push(
                        DeployIssue::warning(codes::BACKUP_FAILED, err.to_string())
                            .with_path(&entry.original),
                    );
                }
            }
        }

        log::warn!(
            "rollback restored {} file(s) and removed {} new file(s)",
            report.restored,
            report.removed
        );
        report
    }

    /// Delete a run's backup directory (successful run, backups not kept)
    pub fn discard(&self, manifest: &BackupManifest) -> Result<(), BackupError> {
        if !manifest.root.starts_with(&self.root) {
            return Err(BackupError::Manifest {
                path: manifest.root.clone(),
                message: "refusing to delete a directory outside the backup root".to_string(),
            });
        }
        match fs::remove_dir_all(&manifest.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(BackupError::Restore {
                path: manifest.root.clone(),
                source,
            }),
        }
    }

    /// Run directories created by this service, newest first.
    ///
    /// Anything else under the root is left alone.
    pub fn list(&self) -> Result<Vec<PathBuf>, BackupError> {
        let Ok(run_dir_name) = Regex::new(RUN_DIR_PATTERN) else {
            return Ok(Vec::new());
        };
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(BackupError::Snapshot {
                    path: self.root.clone(),
                    source,
                })
            }
        };

        let mut dirs: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter(|e| run_dir_name.is_match(&e.file_name().to_string_lossy()))
            .map(|e| e.path())
            .collect();
        // Names start with a sortable timestamp
        dirs.sort();
        dirs.reverse();
        Ok(dirs)
    }

    /// Keep only the newest `retain` run directories
    pub fn prune(&self) -> Result<usize, BackupError> {
        let mut pruned = 0;
        for old in self.list()?.into_iter().skip(self.retain) {
            match fs::remove_dir_all(&old) {
                Ok(()) => pruned += 1,
                Err(e) => log::warn!("could not prune backup {}: {e}", old.display()),
            }
        }
        if pruned > 0 {
            log::debug!("pruned {pruned} old backup(s)");
        }
        Ok(pruned)
    }
}
