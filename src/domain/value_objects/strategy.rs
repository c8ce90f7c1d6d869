//! Conflict and merge strategies

use serde::{Deserialize, Serialize};

use super::ContentCategory;

/// How to treat a target path that already holds different content
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictStrategy {
    /// Keep existing content and warn
    Skip,
    /// Replace existing content outright
    Overwrite,
    /// Merge existing and incoming content with a merge sub-strategy
    #[default]
    Merge,
    /// Snapshot the existing file, then overwrite
    Backup,
    /// Ask an interactive caller; unresolved otherwise
    Prompt,
}

impl ConflictStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictStrategy::Skip => "skip",
            ConflictStrategy::Overwrite => "overwrite",
            ConflictStrategy::Merge => "merge",
            ConflictStrategy::Backup => "backup",
            ConflictStrategy::Prompt => "prompt",
        }
    }

    /// Whether this strategy snapshots files before writing
    pub fn requires_snapshot(&self) -> bool {
        matches!(self, ConflictStrategy::Backup)
    }
}

impl std::fmt::Display for ConflictStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merge sub-strategy used by [`ConflictStrategy::Merge`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MergeStrategy {
    /// Incoming scalars win, objects merge recursively, arrays are replaced
    DeepMerge,
    /// Like deep-merge, but arrays are concatenated existing + incoming
    ArrayAppend,
    /// Prose: append incoming after existing with a divider
    SectionMerge,
    /// Prose: carry completed checklist items over into incoming content
    TaskStatusPreserve,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::DeepMerge => "deep-merge",
            MergeStrategy::ArrayAppend => "array-append",
            MergeStrategy::SectionMerge => "section-merge",
            MergeStrategy::TaskStatusPreserve => "task-status-preserve",
        }
    }

    /// Category of content this sub-strategy knows how to merge
    pub fn category(&self) -> ContentCategory {
        match self {
            MergeStrategy::DeepMerge | MergeStrategy::ArrayAppend => ContentCategory::Structured,
            MergeStrategy::SectionMerge | MergeStrategy::TaskStatusPreserve => {
                ContentCategory::Prose
            }
        }
    }
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
