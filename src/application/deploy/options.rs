//! Deployment Options
//!
//! Configuration types for deploy operations.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::policies::ComponentSelection;
use crate::domain::services::OptimizerSettings;
use crate::domain::value_objects::{ComponentKind, ConflictStrategy, MergeStrategy, Platform};
use crate::error::OptionsError;
use crate::infrastructure::backup::DEFAULT_RETAIN;
use crate::infrastructure::lock::LockOptions;

/// Options for one deployment
#[derive(Debug, Clone)]
pub struct DeploymentOptions {
    /// Target platform
    pub platform: Platform,
    /// Project root for project-scoped components
    pub project_dir: PathBuf,
    /// Home root for home-scoped components
    pub home_dir: PathBuf,
    /// Component include/exclude lists
    pub selection: ComponentSelection,
    pub strategy: ConflictStrategy,
    /// Override of each component's default merge sub-strategy
    pub merge: Option<MergeStrategy>,
    /// Plan and report without writing
    pub dry_run: bool,
    /// Stop after validation and scanning; no lock, no writes
    pub validate_only: bool,
    /// Overwrite without conflict detection
    pub force: bool,
    /// Backup root override
    pub backup_dir: Option<PathBuf>,
    /// Snapshot overwritten files even when the strategy does not require it
    pub create_backup: bool,
    /// Keep the backup after a successful run
    pub keep_backups: bool,
    /// Number of retained backups after pruning
    pub retain_backups: usize,
    /// Keep dispatching siblings after a component fails
    pub continue_on_error: bool,
    /// Attach a performance report to the result
    pub collect_metrics: bool,
    pub optimizer: OptimizerSettings,
    pub lock: LockOptions,
}

impl DeploymentOptions {
    pub fn new(platform: Platform, project_dir: impl Into<PathBuf>, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            platform,
            project_dir: project_dir.into(),
            home_dir: home_dir.into(),
            selection: ComponentSelection::default(),
            strategy: ConflictStrategy::default(),
            merge: None,
            dry_run: false,
            validate_only: false,
            force: false,
            backup_dir: None,
            create_backup: false,
            keep_backups: true,
            retain_backups: DEFAULT_RETAIN,
            continue_on_error: true,
            collect_metrics: false,
            optimizer: OptimizerSettings::default(),
            lock: LockOptions::default(),
        }
    }

    pub fn with_include(mut self, include: Vec<ComponentKind>) -> Self {
        self.selection.include = include;
        self
    }

    pub fn with_exclude(mut self, exclude: Vec<ComponentKind>) -> Self {
        self.selection.exclude = exclude;
        self
    }

    pub fn with_strategy(mut self, strategy: ConflictStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_merge(mut self, merge: Option<MergeStrategy>) -> Self {
        self.merge = merge;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_validate_only(mut self, validate_only: bool) -> Self {
        self.validate_only = validate_only;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = Some(dir.into());
        self
    }

    pub fn with_create_backup(mut self, create: bool) -> Self {
        self.create_backup = create;
        self
    }

    pub fn with_keep_backups(mut self, keep: bool) -> Self {
        self.keep_backups = keep;
        self
    }

    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    pub fn with_metrics(mut self, collect: bool) -> Self {
        self.collect_metrics = collect;
        self
    }

    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.optimizer.max_concurrency = max;
        self
    }

    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.optimizer.chunk_size = bytes;
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock.timeout = timeout;
        self
    }

    pub fn with_lock_stale_after(mut self, stale_after: Duration) -> Self {
        self.lock.stale_after = stale_after;
        self
    }

    /// Reject invalid option combinations
    pub fn validate(&self) -> Result<(), OptionsError> {
        if let Some(kind) = self.selection.overlap() {
            return Err(OptionsError::IncludeExcludeOverlap(kind));
        }
        if self.optimizer.max_concurrency == 0 {
            return Err(OptionsError::ZeroConcurrency);
        }
        if self.optimizer.chunk_size == 0 {
            return Err(OptionsError::ZeroChunkSize);
        }
        if self.force && self.strategy == ConflictStrategy::Skip {
            return Err(OptionsError::ForceWithSkip);
        }
        Ok(())
    }

    /// Strategy after applying `force`
    pub fn effective_strategy(&self) -> ConflictStrategy {
        if self.force {
            ConflictStrategy::Overwrite
        } else {
            self.strategy
        }
    }

    /// Dry run unless validate-only takes precedence
    pub fn is_dry_run(&self) -> bool {
        self.dry_run && !self.validate_only
    }

    /// Whether overwritten files must be snapshotted
    pub fn needs_backup(&self) -> bool {
        !self.dry_run
            && !self.validate_only
            && (self.create_backup || self.effective_strategy().requires_snapshot())
    }
}
