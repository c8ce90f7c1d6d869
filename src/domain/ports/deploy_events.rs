//! Deploy Event Port
//!
//! Provides an observable interface for deploy operations.
//! Enables progress reporting, JSON event streams, and debugging.

use std::path::PathBuf;

use crate::domain::entities::Resolution;
use crate::domain::value_objects::{ComponentKind, Platform};

/// Event emitted during deploy operations
#[derive(Debug, Clone)]
pub enum DeployEvent {
    /// Deploy started
    Started {
        platform: Platform,
        target: PathBuf,
        component_count: usize,
    },

    /// Orchestrator moved to a new state
    StateChanged {
        from: &'static str,
        to: &'static str,
    },

    /// A component handler started
    ComponentStarted { component: ComponentKind },

    /// File was written (or would be, in a dry run)
    FileWritten {
        component: ComponentKind,
        path: PathBuf,
        dry_run: bool,
    },

    /// File was left untouched
    FileSkipped {
        component: ComponentKind,
        path: PathBuf,
        reason: String,
    },

    /// A conflict was settled
    ConflictResolved {
        path: PathBuf,
        resolution: Resolution,
    },

    /// A component handler failed
    ComponentFailed {
        component: ComponentKind,
        error: String,
    },

    /// Rollback finished
    RolledBack { restored: usize, removed: usize },

    /// Deploy completed
    Completed {
        success: bool,
        files_deployed: usize,
        files_skipped: usize,
        error_count: usize,
    },
}

/// Trait for receiving deploy events
///
/// Implementations:
/// - `JsonEventSink`: NDJSON event stream for CI
/// - `LogEventSink`: forwards to the `log` facade
/// - `NoopEventSink`: silent operation
pub trait DeployEventSink: Send + Sync {
    /// Handle a deploy event
    fn on_event(&self, event: DeployEvent);

    /// Check if this sink wants detailed events (e.g., per-file)
    fn wants_detailed_events(&self) -> bool {
        true
    }
}

/// No-op event sink for silent operation
pub struct NoopEventSink;

impl DeployEventSink for NoopEventSink {
    fn on_event(&self, _event: DeployEvent) {}

    fn wants_detailed_events(&self) -> bool {
        false
    }
}
