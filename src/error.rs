//! Error types for Cairn
//!
//! Library errors use `thiserror`. Every deploy-time failure maps onto the
//! [`DeployError`] taxonomy, which carries a stable code and a severity so the
//! presentation layer can render remediation hints keyed by code.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::domain::value_objects::{ComponentKind, Severity};

/// Result type alias for Cairn operations
pub type CairnResult<T> = Result<T, DeployError>;

/// Stable error codes surfaced in `DeploymentResult::errors`
pub mod codes {
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const SECURITY_CHECK_FAILED: &str = "SECURITY_CHECK_FAILED";
    pub const LOCK_TIMEOUT: &str = "LOCK_TIMEOUT";
    pub const LOCK_IO: &str = "LOCK_IO";
    pub const COMPONENT_DEPLOY_FAILED: &str = "COMPONENT_DEPLOY_FAILED";
    pub const CONFLICT_UNRESOLVED: &str = "CONFLICT_UNRESOLVED";
    pub const MERGE_FAILED: &str = "MERGE_FAILED";
    pub const BACKUP_FAILED: &str = "BACKUP_FAILED";
    pub const ROLLBACK_PERFORMED: &str = "ROLLBACK_PERFORMED";
    pub const FILESYSTEM_ERROR: &str = "FILESYSTEM_ERROR";
    pub const CANCELLED: &str = "CANCELLED";
    pub const UNKNOWN_FIELDS: &str = "UNKNOWN_FIELDS";
    pub const CONFLICT_SKIPPED: &str = "CONFLICT_SKIPPED";
}

/// Deployment error taxonomy
#[derive(Error, Debug)]
pub enum DeployError {
    /// Input shape problem; aborts before any write
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Unsafe content detected; aborts before any write
    #[error("security check failed: {message}")]
    Security { message: String },

    /// Lock contention, timeout or lock-file I/O
    #[error(transparent)]
    Lock(#[from] LockError),

    /// Isolated per-component failure
    #[error("failed to deploy {component}: {message}")]
    ComponentDeploy {
        component: ComponentKind,
        message: String,
    },

    /// Snapshot or restore failure (downgraded to a warning)
    #[error(transparent)]
    Backup(#[from] BackupError),

    /// Permission or I/O failure on a specific file
    #[error("file system error at {path}: {message}")]
    FileSystem { path: PathBuf, message: String },
}

impl DeployError {
    /// Stable code used by remediation rendering
    pub fn code(&self) -> &'static str {
        match self {
            DeployError::Validation { .. } => codes::VALIDATION_FAILED,
            DeployError::Security { .. } => codes::SECURITY_CHECK_FAILED,
            DeployError::Lock(LockError::Timeout { .. }) => codes::LOCK_TIMEOUT,
            DeployError::Lock(_) => codes::LOCK_IO,
            DeployError::ComponentDeploy { .. } => codes::COMPONENT_DEPLOY_FAILED,
            DeployError::Backup(_) => codes::BACKUP_FAILED,
            DeployError::FileSystem { .. } => codes::FILESYSTEM_ERROR,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            DeployError::Backup(_) => Severity::Warning,
            DeployError::Validation { .. }
            | DeployError::Security { .. }
            | DeployError::Lock(_) => Severity::Fatal,
            DeployError::ComponentDeploy { .. } | DeployError::FileSystem { .. } => {
                Severity::Error
            }
        }
    }

    /// Convert into the record carried by `DeploymentResult`
    pub fn to_issue(&self) -> DeployIssue {
        let (component, path) = match self {
            DeployError::ComponentDeploy { component, .. } => (Some(*component), None),
            DeployError::FileSystem { path, .. } => (None, Some(path.clone())),
            _ => (None, None),
        };
        DeployIssue {
            code: self.code().to_string(),
            message: self.to_string(),
            severity: self.severity(),
            component,
            path,
        }
    }
}

/// Error or warning record aggregated into a deployment result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeployIssue {
    pub code: String,
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<ComponentKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl DeployIssue {
    pub fn new(code: &str, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            severity,
            component: None,
            path: None,
        }
    }

    pub fn warning(code: &str, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    pub fn with_component(mut self, component: ComponentKind) -> Self {
        self.component = Some(component);
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// Lock service errors
#[derive(Error, Debug)]
pub enum LockError {
    #[error("timed out after {waited_ms}ms waiting for lock '{resource}' held by pid {holder_pid}")]
    Timeout {
        resource: String,
        holder_pid: u32,
        waited_ms: u64,
    },

    #[error("lock file {path} is unreadable: {message}")]
    Corrupted { path: PathBuf, message: String },

    #[error("lock '{resource}' is no longer held by this process")]
    Lost { resource: String },

    #[error("lock I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Backup service errors
#[derive(Error, Debug)]
pub enum BackupError {
    #[error("failed to snapshot {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to restore {path}: {source}")]
    Restore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write backup manifest {path}: {message}")]
    Manifest { path: PathBuf, message: String },
}

/// Invalid option combinations; rejected before the state machine starts
#[derive(Error, Debug, PartialEq, Eq)]
pub enum OptionsError {
    #[error("component '{0}' is both included and excluded")]
    IncludeExcludeOverlap(ComponentKind),

    #[error("max_concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("chunk_size must be at least 1 byte")]
    ZeroChunkSize,

    #[error("--force cannot be combined with the 'skip' conflict strategy")]
    ForceWithSkip,
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {message}")]
    Parse { path: PathBuf, message: String },
}
