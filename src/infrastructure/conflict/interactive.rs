//! Interactive Conflict Prompt
//!
//! Asks the user on the terminal how to settle each conflict.

use std::sync::Mutex;

use dialoguer::Select;

use crate::domain::ports::{ConflictChoice, ConflictContext, ConflictPrompt};

const ITEMS: [&str; 7] = [
    "Overwrite",
    "Skip (keep existing)",
    "Merge",
    "Show diff",
    "Overwrite all remaining",
    "Skip all remaining",
    "Abort",
];

/// Terminal prompt built on `dialoguer`.
///
/// Supports "apply to all": once chosen, later conflicts get the same answer
/// without asking.
pub struct InteractivePrompt {
    apply_all: Mutex<Option<ConflictChoice>>,
    /// Serializes prompts when handlers run in parallel
    terminal: Mutex<()>,
}

impl InteractivePrompt {
    pub fn new() -> Self {
        Self {
            apply_all: Mutex::new(None),
            terminal: Mutex::new(()),
        }
    }

    fn remembered(&self) -> Option<ConflictChoice> {
        self.apply_all.lock().ok().and_then(|guard| *guard)
    }

    fn remember(&self, choice: ConflictChoice) -> ConflictChoice {
        if let Ok(mut guard) = self.apply_all.lock() {
            *guard = Some(choice);
        }
        choice
    }

    fn ask(&self, context: &ConflictContext) -> ConflictChoice {
        let _terminal = self.terminal.lock();
        if let Some(choice) = self.remembered() {
            return choice;
        }

        let selection = Select::new()
            .with_prompt(format!("{} already exists", context.path.display()))
            .items(&ITEMS)
            .default(0)
            .interact_opt();

        match selection {
            Ok(Some(index)) => map_selection(index)
                .map(|(choice, all)| if all { self.remember(choice) } else { choice })
                .unwrap_or(ConflictChoice::Abort),
            // Esc, closed terminal or I/O error
            Ok(None) | Err(_) => ConflictChoice::Abort,
        }
    }
}

impl Default for InteractivePrompt {
    fn default() -> Self {
        Self::new()
    }
}

/// Menu index to (choice, apply-to-all)
fn map_selection(index: usize) -> Option<(ConflictChoice, bool)> {
    match index {
        0 => Some((ConflictChoice::Overwrite, false)),
        1 => Some((ConflictChoice::Skip, false)),
        2 => Some((ConflictChoice::Merge, false)),
        3 => Some((ConflictChoice::Diff, false)),
        4 => Some((ConflictChoice::Overwrite, true)),
        5 => Some((ConflictChoice::Skip, true)),
        6 => Some((ConflictChoice::Abort, false)),
        _ => None,
    }
}

impl ConflictPrompt for InteractivePrompt {
    fn choose(&self, context: &ConflictContext) -> ConflictChoice {
        self.remembered().unwrap_or_else(|| self.ask(context))
    }

    fn show_diff(&self, diff: &str) {
        eprintln!();
        eprintln!("{}", diff);
    }
}
