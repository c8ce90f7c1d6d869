//! Infrastructure implementations for ConflictPrompt

mod interactive;

pub use interactive::InteractivePrompt;
