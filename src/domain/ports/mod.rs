//! Domain Ports (Interfaces)
//!
//! These traits define the boundaries of the domain layer.
//! Infrastructure layer provides concrete implementations.

pub mod component_handler;
pub mod conflict_prompt;
pub mod deploy_events;
pub mod file_system;
pub mod snapshotter;

pub use component_handler::{ComponentHandler, HandlerOptions, HandlerOutcome, TargetContext};
pub use conflict_prompt::{ConflictChoice, ConflictContext, ConflictPrompt, FixedPrompt};
pub use deploy_events::{DeployEvent, DeployEventSink, NoopEventSink};
pub use file_system::{FileSystem, FsError, FsResult};
pub use snapshotter::{NoSnapshots, Snapshotter};
