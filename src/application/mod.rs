//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `DeploymentOrchestrator` - Validate, scan, lock, deploy, finalize

pub mod deploy;

pub use deploy::{
    DeployState, DeploymentOptions, DeploymentOrchestrator, DeploymentResult, DeploymentStatus,
    DeploymentSummary, ValidationCache,
};
