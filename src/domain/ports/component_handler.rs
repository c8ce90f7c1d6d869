//! Component Handler Port
//!
//! A handler turns one component of a platform section into concrete file
//! writes. Every handler follows the same protocol: ensure the target
//! directory, load existing content, resolve conflicts, write.

use std::path::{Path, PathBuf};

use crate::domain::entities::{ComponentData, ConflictRecord, ContextMetadata};
use crate::domain::ports::{DeployEventSink, FileSystem, Snapshotter};
use crate::domain::services::{ConflictResolver, IoMode};
use crate::domain::value_objects::{ComponentKind, ConflictStrategy, MergeStrategy, Platform};
use crate::error::DeployIssue;

/// Where and with what collaborators a component is deployed
#[derive(Clone, Copy)]
pub struct TargetContext<'a> {
    pub platform: Platform,
    /// Root for home-scoped components (`~`)
    pub home_dir: &'a Path,
    /// Root for project-scoped components
    pub project_dir: &'a Path,
    pub fs: &'a dyn FileSystem,
    pub resolver: &'a ConflictResolver,
    pub snapshots: &'a dyn Snapshotter,
    pub events: &'a dyn DeployEventSink,
    pub metadata: &'a ContextMetadata,
}

/// Per-deployment knobs passed to every handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerOptions {
    pub strategy: ConflictStrategy,
    /// Overrides the component's default merge sub-strategy
    pub merge: Option<MergeStrategy>,
    pub dry_run: bool,
    pub io: IoMode,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            strategy: ConflictStrategy::default(),
            merge: None,
            dry_run: false,
            io: IoMode::InMemory,
        }
    }
}

/// What one handler call did
#[derive(Debug, Clone, Default)]
pub struct HandlerOutcome {
    /// Files actually written
    pub deployed_files: Vec<PathBuf>,
    /// Files left untouched (skip strategy, up-to-date, unresolved)
    pub skipped_files: Vec<PathBuf>,
    /// Files a dry run would have written
    pub planned_files: Vec<PathBuf>,
    pub conflicts: Vec<ConflictRecord>,
    pub errors: Vec<DeployIssue>,
    pub warnings: Vec<DeployIssue>,
}

impl HandlerOutcome {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fold another outcome into this one
    pub fn absorb(&mut self, other: HandlerOutcome) {
        self.deployed_files.extend(other.deployed_files);
        self.skipped_files.extend(other.skipped_files);
        self.planned_files.extend(other.planned_files);
        self.conflicts.extend(other.conflicts);
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

/// Deploys components of one content category
pub trait ComponentHandler: Send + Sync {
    /// Whether this handler knows how to deploy `kind`
    fn handles(&self, kind: ComponentKind) -> bool;

    /// Deploy one component. Never panics on bad input; failures are
    /// reported through [`HandlerOutcome::errors`].
    fn deploy(
        &self,
        data: &ComponentData,
        target: &TargetContext,
        options: &HandlerOptions,
    ) -> HandlerOutcome;
}
