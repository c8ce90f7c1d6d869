//! Conflict Prompt Port
//!
//! Used by the `prompt` conflict strategy. Only interactive callers provide an
//! implementation; without one, prompted conflicts stay unresolved.

use std::path::Path;

/// Caller's choice for a prompted conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictChoice {
    /// Overwrite the file with incoming content
    Overwrite,
    /// Keep existing content
    Skip,
    /// Merge with the component's merge strategy
    Merge,
    /// Show diff between existing and incoming content (prompt should loop)
    Diff,
    /// Leave the conflict unresolved
    Abort,
}

/// Conflict context provided to the prompt
#[derive(Debug, Clone)]
pub struct ConflictContext<'a> {
    pub path: &'a Path,
    pub existing_content: &'a str,
    pub incoming_content: &'a str,
}

/// Asks a human how to settle a conflict
pub trait ConflictPrompt: Send + Sync {
    /// Returns the choice. On `ConflictChoice::Diff` the caller shows the
    /// diff via `show_diff` and asks again.
    fn choose(&self, context: &ConflictContext) -> ConflictChoice;

    /// Display a diff to the user.
    fn show_diff(&self, diff: &str);
}

/// Prompt that always answers the same way (tests, scripted callers)
pub struct FixedPrompt(pub ConflictChoice);

impl ConflictPrompt for FixedPrompt {
    fn choose(&self, _context: &ConflictContext) -> ConflictChoice {
        self.0
    }

    fn show_diff(&self, _diff: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn fixed_prompt_answers_consistently() {
        let prompt = FixedPrompt(ConflictChoice::Skip);
        let path = PathBuf::from("settings.json");
        let context = ConflictContext {
            path: &path,
            existing_content: "{}",
            incoming_content: "{\"a\":1}",
        };
        assert_eq!(prompt.choose(&context), ConflictChoice::Skip);
        assert_eq!(prompt.choose(&context), ConflictChoice::Skip);
    }
}
