//! Configuration type definitions

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::application::deploy::{VALIDATION_CACHE_CAPACITY, VALIDATION_CACHE_TTL};
use crate::application::DeploymentOptions;
use crate::domain::services::OptimizerSettings;
use crate::domain::value_objects::{ConflictStrategy, Platform};
use crate::infrastructure::backup::DEFAULT_RETAIN;
use crate::infrastructure::lock::LockOptions;

/// `[lock]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Lock file directory (defaults to `~/.cairn/locks`)
    pub dir: Option<PathBuf>,
    pub timeout_ms: u64,
    pub retry_ms: u64,
    pub stale_ms: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        let defaults = LockOptions::default();
        Self {
            dir: None,
            timeout_ms: defaults.timeout.as_millis() as u64,
            retry_ms: defaults.retry_interval.as_millis() as u64,
            stale_ms: defaults.stale_after.as_millis() as u64,
        }
    }
}

/// `[backup]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Backup root (defaults to `~/.cairn/backups`)
    pub dir: Option<PathBuf>,
    /// Keep backups of successful runs
    pub keep: bool,
    pub retain: usize,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            dir: None,
            keep: true,
            retain: DEFAULT_RETAIN,
        }
    }
}

/// `[performance]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub max_concurrency: usize,
    pub chunk_size: usize,
    pub streaming_threshold: u64,
    pub parallel_threshold: usize,
    pub cache_ttl_secs: u64,
    pub cache_capacity: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        let defaults = OptimizerSettings::default();
        Self {
            max_concurrency: defaults.max_concurrency,
            chunk_size: defaults.chunk_size,
            streaming_threshold: defaults.streaming_threshold,
            parallel_threshold: defaults.parallel_threshold,
            cache_ttl_secs: VALIDATION_CACHE_TTL.as_secs(),
            cache_capacity: VALIDATION_CACHE_CAPACITY,
        }
    }
}

/// `[deploy]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub strategy: ConflictStrategy,
    pub continue_on_error: bool,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            strategy: ConflictStrategy::default(),
            continue_on_error: true,
        }
    }
}

/// Engine configuration (`~/.cairn/config.toml`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub lock: LockConfig,
    pub backup: BackupConfig,
    pub performance: PerformanceConfig,
    pub deploy: DeployConfig,
}

impl EngineConfig {
    pub fn lock_options(&self) -> LockOptions {
        LockOptions {
            timeout: Duration::from_millis(self.lock.timeout_ms),
            retry_interval: Duration::from_millis(self.lock.retry_ms.max(1)),
            stale_after: Duration::from_millis(self.lock.stale_ms),
        }
    }

    pub fn optimizer_settings(&self) -> OptimizerSettings {
        OptimizerSettings {
            streaming_threshold: self.performance.streaming_threshold,
            chunk_size: self.performance.chunk_size,
            parallel_threshold: self.performance.parallel_threshold,
            max_concurrency: self.performance.max_concurrency,
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.performance.cache_ttl_secs)
    }

    pub fn lock_dir(&self, state_dir: &Path) -> PathBuf {
        self.lock
            .dir
            .clone()
            .unwrap_or_else(|| state_dir.join("locks"))
    }

    pub fn backup_dir(&self, state_dir: &Path) -> PathBuf {
        self.backup
            .dir
            .clone()
            .unwrap_or_else(|| state_dir.join("backups"))
    }

    /// Deployment options seeded from this config; CLI flags apply on top
    pub fn deployment_options(
        &self,
        platform: Platform,
        project_dir: impl Into<PathBuf>,
        home_dir: impl Into<PathBuf>,
    ) -> DeploymentOptions {
        let mut options = DeploymentOptions::new(platform, project_dir, home_dir)
            .with_strategy(self.deploy.strategy)
            .with_continue_on_error(self.deploy.continue_on_error)
            .with_keep_backups(self.backup.keep);
        options.retain_backups = self.backup.retain;
        options.optimizer = self.optimizer_settings();
        options.lock = self.lock_options();
        options
    }
}
