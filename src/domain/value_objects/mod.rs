//! Domain Value Objects
//!
//! Immutable value types that represent domain concepts.

mod component;
mod platform;
mod severity;
mod strategy;

pub use component::{ComponentKind, ComponentScope, ContentCategory};
pub use platform::Platform;
pub use severity::Severity;
pub use strategy::{ConflictStrategy, MergeStrategy};
