//! Domain Policies
//!
//! Business rules that govern behavior. These are pure functions that operate
//! on domain entities.

mod naming;
mod validation;

pub use naming::sanitize_file_name;
pub use validation::{validate_context, ComponentSelection, ValidationReport};
