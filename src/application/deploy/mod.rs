//! Deploy Module
//!
//! Orchestrates one deployment of a context onto a platform layout.
//!
//! ## Structure
//!
//! - `options` - Configuration types (`DeploymentOptions`)
//! - `result` - Result types (`DeploymentResult`, `DeployState`)
//! - `dispatch` - Bounded worker pool for component dispatch
//! - `use_case` - The state machine (`DeploymentOrchestrator`)
//!
//! ## Usage
//!
//! ```ignore
//! use cairn::application::deploy::{DeploymentOptions, DeploymentOrchestrator};
//!
//! let orchestrator = DeploymentOrchestrator::new(fs, locks, backup_root, cache);
//! let result = orchestrator.execute(&context, &DeploymentOptions::new(platform, project, home))?;
//! ```

mod dispatch;
mod options;
mod result;
mod use_case;

pub use options::DeploymentOptions;
pub use result::{DeployState, DeploymentResult, DeploymentStatus, DeploymentSummary};
pub use use_case::{
    DeploymentOrchestrator, ValidationCache, VALIDATION_CACHE_CAPACITY, VALIDATION_CACHE_TTL,
};

#[cfg(test)]
mod tests;
