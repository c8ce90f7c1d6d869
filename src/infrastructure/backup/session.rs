//! Lazy per-run snapshot session
//!
//! Nothing touches disk until the first snapshot; a run that never
//! overwrites an existing file leaves no backup directory behind.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::domain::entities::{BackupEntry, BackupManifest};
use crate::domain::ports::{FileSystem, Snapshotter};
use crate::error::BackupError;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Default)]
struct SessionState {
    run_dir: Option<PathBuf>,
    entries: Vec<BackupEntry>,
    created_files: Vec<PathBuf>,
}

/// Snapshot session shared by all handlers of one deployment
pub struct BackupSession {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    started_at: DateTime<Utc>,
    state: Mutex<SessionState>,
}

impl BackupSession {
    pub(super) fn new(root: PathBuf, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root,
            fs,
            started_at: Utc::now(),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// `<YYYY-MM-DDTHH-MM-SS.mmm>-<pid>`
    fn run_dir_name(&self) -> String {
        format!(
            "{}-{}",
            self.started_at.format("%Y-%m-%dT%H-%M-%S%.3f"),
            std::process::id()
        )
    }

    fn ensure_run_dir(&self, state: &mut SessionState) -> Result<PathBuf, BackupError> {
        if let Some(dir) = &state.run_dir {
            return Ok(dir.clone());
        }

        fs::create_dir_all(&self.root).map_err(|source| BackupError::Snapshot {
            path: self.root.clone(),
            source,
        })?;

        let base = self.run_dir_name();
        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                base.clone()
            } else {
                format!("{base}-{attempt}")
            };
            let candidate = self.root.join(name);
            match fs::create_dir(&candidate) {
                Ok(()) => {
                    state.run_dir = Some(candidate.clone());
                    return Ok(candidate);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(source) => {
                    return Err(BackupError::Snapshot {
                        path: candidate,
                        source,
                    })
                }
            }
        }
    }

    /// Whether anything was snapshotted or created
    pub fn is_empty(&self) -> bool {
        self.state
            .lock()
            .map(|s| s.entries.is_empty() && s.created_files.is_empty())
            .unwrap_or(true)
    }

    /// Manifest of everything recorded so far
    pub fn manifest(&self) -> Option<BackupManifest> {
        let state = self.state.lock().ok()?;
        if state.entries.is_empty() && state.created_files.is_empty() {
            return None;
        }
        let root = state
            .run_dir
            .clone()
            .unwrap_or_else(|| self.root.join(self.run_dir_name()));
        Some(BackupManifest {
            root,
            created_at: self.started_at,
            entries: state.entries.clone(),
            created_files: state.created_files.clone(),
        })
    }

    /// Write `manifest.json` into the run directory and return the manifest
    pub fn persist(&self) -> Result<Option<BackupManifest>, BackupError> {
        let Some(manifest) = self.manifest() else {
            return Ok(None);
        };
        if manifest.entries.is_empty() {
            // Only created files: rollback needs no directory on disk
            return Ok(Some(manifest));
        }

        let path = manifest.root.join(MANIFEST_FILE);
        let body = serde_json::to_string_pretty(&manifest).map_err(|e| BackupError::Manifest {
            path: path.clone(),
            message: e.to_string(),
        })?;
        fs::write(&path, body).map_err(|e| BackupError::Manifest {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(Some(manifest))
    }
}

impl Snapshotter for BackupSession {
    fn snapshot(&self, path: &Path) -> Result<Option<PathBuf>, BackupError> {
        if !self.fs.exists(path) {
            return Ok(None);
        }

        let mut state = self.state.lock().map_err(|_| BackupError::Snapshot {
            path: path.to_path_buf(),
            source: std::io::Error::other("backup session poisoned"),
        })?;

        if let Some(entry) = state.entries.iter().find(|e| e.original == path) {
            return Ok(Some(entry.backup.clone()));
        }
        if state.created_files.iter().any(|p| p == path) {
            return Ok(None);
        }

        let run_dir = self.ensure_run_dir(&mut state)?;
        let backup = run_dir.join(mirror(path));
        self.fs
            .copy(path, &backup)
            .map_err(|e| BackupError::Snapshot {
                path: path.to_path_buf(),
                source: e.into(),
            })?;

        log::debug!("snapshot {} -> {}", path.display(), backup.display());
        state.entries.push(BackupEntry {
            original: path.to_path_buf(),
            backup: backup.clone(),
        });
        Ok(Some(backup))
    }

    fn record_created(&self, path: &Path) {
        if let Ok(mut state) = self.state.lock() {
            let known = state.entries.iter().any(|e| e.original == path)
                || state.created_files.iter().any(|p| p == path);
            if !known {
                state.created_files.push(path.to_path_buf());
            }
        }
    }
}

/// Relative path mirroring an absolute one (`/home/u/.kiro/x` -> `home/u/.kiro/x`)
fn mirror(path: &Path) -> PathBuf {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(PathBuf::from(part)),
            Component::Prefix(prefix) => Some(PathBuf::from(
                prefix.as_os_str().to_string_lossy().replace([':', '\\'], ""),
            )),
            Component::RootDir | Component::CurDir | Component::ParentDir => None,
        })
        .collect()
}
