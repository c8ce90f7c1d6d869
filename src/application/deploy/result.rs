//! Deployment Result
//!
//! Result types for deploy operations.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::entities::ConflictRecord;
use crate::domain::services::PerformanceReport;
use crate::domain::value_objects::{ComponentKind, Platform, Severity};
use crate::error::{codes, DeployIssue};

/// Orchestrator states, in the order a full run visits them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeployState {
    Idle,
    Validating,
    SecurityScanning,
    Locking,
    DryRunReport,
    Deploying,
    Finalizing,
    Released,
}

impl DeployState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployState::Idle => "idle",
            DeployState::Validating => "validating",
            DeployState::SecurityScanning => "security-scanning",
            DeployState::Locking => "locking",
            DeployState::DryRunReport => "dry-run-report",
            DeployState::Deploying => "deploying",
            DeployState::Finalizing => "finalizing",
            DeployState::Released => "released",
        }
    }
}

/// Overall outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Success,
    /// Some components failed, the rest stayed deployed
    Partial,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeploymentSummary {
    pub files_deployed: usize,
    pub files_skipped: usize,
    pub conflicts_resolved: usize,
    pub backup_created: bool,
    pub duration_ms: u64,
}

/// Result of a deployment
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentResult {
    pub success: bool,
    pub status: DeploymentStatus,
    pub platform: Platform,
    pub dry_run: bool,
    pub deployed_components: Vec<ComponentKind>,
    pub skipped_components: Vec<ComponentKind>,
    pub deployed_files: Vec<PathBuf>,
    /// Files a dry run would have written
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub planned_files: Vec<PathBuf>,
    pub skipped_files: Vec<PathBuf>,
    pub conflicts: Vec<ConflictRecord>,
    pub errors: Vec<DeployIssue>,
    pub warnings: Vec<DeployIssue>,
    pub summary: DeploymentSummary,
    pub rolled_back: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_dir: Option<PathBuf>,
    pub states: Vec<DeployState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceReport>,
}

impl DeploymentResult {
    pub fn new(platform: Platform, dry_run: bool) -> Self {
        Self {
            success: false,
            status: DeploymentStatus::Failed,
            platform,
            dry_run,
            deployed_components: Vec::new(),
            skipped_components: Vec::new(),
            deployed_files: Vec::new(),
            planned_files: Vec::new(),
            skipped_files: Vec::new(),
            conflicts: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            summary: DeploymentSummary::default(),
            rolled_back: false,
            backup_dir: None,
            states: Vec::new(),
            performance: None,
        }
    }

    pub fn has_error_code(&self, code: &str) -> bool {
        self.errors.iter().any(|e| e.code == code)
    }

    /// Fatal errors stop a run before anything is written
    pub fn has_fatal_error(&self) -> bool {
        self.errors.iter().any(|e| e.severity == Severity::Fatal)
    }

    /// Settle `status`, `success` and the summary counters
    pub(super) fn finish(&mut self, duration_ms: u64) {
        self.status = if self.errors.is_empty() {
            DeploymentStatus::Success
        } else if !self.rolled_back
            && !self.has_fatal_error()
            && !self.has_error_code(codes::CANCELLED)
            && !self.deployed_components.is_empty()
        {
            DeploymentStatus::Partial
        } else {
            DeploymentStatus::Failed
        };
        self.success = self.status != DeploymentStatus::Failed;

        self.summary.files_deployed = self.deployed_files.len();
        self.summary.files_skipped = self.skipped_files.len();
        self.summary.conflicts_resolved = self
            .conflicts
            .iter()
            .filter(|c| c.resolution.is_resolved())
            .count();
        self.summary.duration_ms = duration_ms;
    }
}
