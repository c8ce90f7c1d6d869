//! File-based cross-process lock
//!
//! A lock is a JSON file created with `create_new`, so at most one process
//! can hold it. Stale detection, removal and creation run while holding an
//! `fs2` exclusive lock on a sibling `.guard` file, so two waiters can never
//! both decide a lock is stale and both take it.

use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use fs2::FileExt;
use sha2::{Digest, Sha256};

use super::process::{hostname, is_process_dead, new_token};
use crate::domain::entities::LockInfo;
use crate::domain::value_objects::Platform;
use crate::error::LockError;

/// Timing knobs for [`FileLockService::acquire`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockOptions {
    /// Give up after this long
    pub timeout: Duration,
    /// Delay between attempts while the lock is held
    pub retry_interval: Duration,
    /// Locks older than this are stale, and so is the lease we write
    pub stale_after: Duration,
}

impl Default for LockOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry_interval: Duration::from_millis(100),
            stale_after: Duration::from_secs(300),
        }
    }
}

/// A held lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockHandle {
    pub info: LockInfo,
    pub path: PathBuf,
}

impl LockHandle {
    pub fn resource(&self) -> &str {
        &self.info.resource
    }
}

enum Attempt {
    Acquired(LockHandle),
    Held { holder_pid: u32 },
}

enum Existing {
    Missing,
    Valid(LockInfo),
    Corrupted { age: Duration },
}

/// Exclusive guard over a resource's critical section; unlocked on drop
struct Guard {
    file: File,
}

impl Drop for Guard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Lock service backed by files under one directory
#[derive(Debug, Clone)]
pub struct FileLockService {
    lock_dir: PathBuf,
}

impl FileLockService {
    pub fn new(lock_dir: impl Into<PathBuf>) -> Self {
        Self {
            lock_dir: lock_dir.into(),
        }
    }

    pub fn lock_dir(&self) -> &Path {
        &self.lock_dir
    }

    /// Resource name for a (platform, target directory) pair
    pub fn resource_for(platform: Platform, target: &Path) -> String {
        let target = fs::canonicalize(target).unwrap_or_else(|_| target.to_path_buf());
        let mut hasher = Sha256::new();
        hasher.update(target.to_string_lossy().as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        format!("{}-{}", platform.key(), &digest[..16])
    }

    pub fn lock_path(&self, resource: &str) -> PathBuf {
        self.lock_dir.join(format!("{resource}.lock"))
    }

    fn guard_path(&self, resource: &str) -> PathBuf {
        self.lock_dir.join(format!("{resource}.lock.guard"))
    }

    /// Acquire `resource`, polling until `options.timeout`
    pub fn acquire(&self, resource: &str, options: &LockOptions) -> Result<LockHandle, LockError> {
        let started = Instant::now();
        let mut announced = false;

        loop {
            match self.try_acquire(resource, options)? {
                Attempt::Acquired(handle) => {
                    log::debug!("acquired lock {} ({})", resource, handle.path.display());
                    return Ok(handle);
                }
                Attempt::Held { holder_pid } => {
                    let waited = started.elapsed();
                    if waited >= options.timeout {
                        return Err(LockError::Timeout {
                            resource: resource.to_string(),
                            holder_pid,
                            waited_ms: waited.as_millis() as u64,
                        });
                    }
                    if !announced {
                        log::info!("lock {resource} is held by pid {holder_pid}; waiting");
                        announced = true;
                    }
                    let remaining = options.timeout - waited;
                    std::thread::sleep(options.retry_interval.min(remaining));
                }
            }
        }
    }

    /// Release a held lock. Idempotent: a missing file or a lock now owned
    /// by someone else is left alone.
    pub fn release(&self, handle: &LockHandle) -> Result<bool, LockError> {
        let _guard = self.guard(handle.resource())?;
        match self.read_existing(&handle.path)? {
            Existing::Valid(info) if info.token == handle.info.token => {
                remove_if_present(&handle.path)?;
                log::debug!("released lock {}", handle.resource());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Renew the lease on a held lock
    pub fn refresh(&self, handle: &mut LockHandle) -> Result<(), LockError> {
        let _guard = self.guard(handle.resource())?;
        match self.read_existing(&handle.path)? {
            Existing::Valid(info) if info.token == handle.info.token => {
                let mut renewed = info;
                renewed.acquired_at = Utc::now();
                write_lock_file(&handle.path, &renewed, false)?;
                handle.info = renewed;
                Ok(())
            }
            _ => Err(LockError::Lost {
                resource: handle.resource().to_string(),
            }),
        }
    }

    /// Current holder of `resource`, if any
    pub fn inspect(&self, resource: &str) -> Result<Option<LockInfo>, LockError> {
        match self.read_existing(&self.lock_path(resource))? {
            Existing::Valid(info) => Ok(Some(info)),
            Existing::Missing | Existing::Corrupted { .. } => Ok(None),
        }
    }

    /// Remove a lock regardless of owner (explicit stale-lock cleanup)
    pub fn force_unlock(&self, resource: &str) -> Result<bool, LockError> {
        let _guard = self.guard(resource)?;
        let path = self.lock_path(resource);
        let removed = remove_if_present(&path)?;
        if removed {
            log::warn!("force-removed lock {}", path.display());
        }
        Ok(removed)
    }

    fn try_acquire(&self, resource: &str, options: &LockOptions) -> Result<Attempt, LockError> {
        let _guard = self.guard(resource)?;
        let path = self.lock_path(resource);

        match self.read_existing(&path)? {
            Existing::Missing => {}
            Existing::Valid(info) => {
                if !self.is_stale(&info, options.stale_after) {
                    return Ok(Attempt::Held {
                        holder_pid: info.pid,
                    });
                }
                log::warn!(
                    "removing stale lock {} (pid {}, age {}s)",
                    resource,
                    info.pid,
                    info.age(Utc::now()).as_secs()
                );
                remove_if_present(&path)?;
            }
            Existing::Corrupted { age } => {
                if age <= options.stale_after {
                    return Ok(Attempt::Held { holder_pid: 0 });
                }
                log::warn!("removing unreadable stale lock {}", path.display());
                remove_if_present(&path)?;
            }
        }

        let info = LockInfo {
            resource: resource.to_string(),
            pid: std::process::id(),
            hostname: hostname(),
            token: new_token(),
            acquired_at: Utc::now(),
            lease_ms: options.stale_after.as_millis() as u64,
        };

        match write_lock_file(&path, &info, true) {
            Ok(()) => Ok(Attempt::Acquired(LockHandle { info, path })),
            Err(LockError::Io { source, .. }) if source.kind() == ErrorKind::AlreadyExists => {
                Ok(Attempt::Held { holder_pid: 0 })
            }
            Err(err) => Err(err),
        }
    }

    fn is_stale(&self, info: &LockInfo, stale_after: Duration) -> bool {
        if info.is_expired(Utc::now(), stale_after) {
            return true;
        }
        let same_host = info.hostname.is_empty() || info.hostname == hostname();
        same_host && is_process_dead(info.pid)
    }

    fn guard(&self, resource: &str) -> Result<Guard, LockError> {
        fs::create_dir_all(&self.lock_dir).map_err(|source| LockError::Io {
            path: self.lock_dir.clone(),
            source,
        })?;
        let path = self.guard_path(resource);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| LockError::Io {
                path: path.clone(),
                source,
            })?;
        file.lock_exclusive()
            .map_err(|source| LockError::Io { path, source })?;
        Ok(Guard { file })
    }

    fn read_existing(&self, path: &Path) -> Result<Existing, LockError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Existing::Missing),
            Err(source) => {
                return Err(LockError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        match serde_json::from_str::<LockInfo>(&content) {
            Ok(info) => Ok(Existing::Valid(info)),
            Err(e) => {
                log::debug!("unreadable lock file {}: {e}", path.display());
                let age = fs::metadata(path)
                    .and_then(|m| m.modified())
                    .ok()
                    .and_then(|modified| modified.elapsed().ok())
                    .unwrap_or(Duration::ZERO);
                Ok(Existing::Corrupted { age })
            }
        }
    }
}

fn write_lock_file(path: &Path, info: &LockInfo, create_new: bool) -> Result<(), LockError> {
    let io_err = |source| LockError::Io {
        path: path.to_path_buf(),
        source,
    };
    let body = serde_json::to_vec_pretty(info).map_err(|e| LockError::Corrupted {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut options = OpenOptions::new();
    options.write(true);
    if create_new {
        options.create_new(true);
    } else {
        options.create(true).truncate(true);
    }
    let mut file = options.open(path).map_err(io_err)?;
    file.write_all(&body).map_err(io_err)?;
    file.sync_all().map_err(io_err)
}

fn remove_if_present(path: &Path) -> Result<bool, LockError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(LockError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
