//! Cairn - deployment engine for AI coding assistant configuration
//!
//! Cairn takes a normalized context bundle (settings, agents, commands,
//! steering, specs, hooks, templates) and materializes it onto a platform's
//! on-disk layout, detecting conflicts with existing files, merging where it
//! can, snapshotting before it overwrites and rolling back when a component
//! fails. Concurrent deployments to the same project are serialized through
//! a file lock.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

pub use application::{
    DeployState, DeploymentOptions, DeploymentOrchestrator, DeploymentResult, DeploymentStatus,
};
pub use config::EngineConfig;
pub use domain::entities::Context;
pub use domain::value_objects::{ComponentKind, ConflictStrategy, MergeStrategy, Platform};
pub use error::{CairnResult, DeployError, DeployIssue};
