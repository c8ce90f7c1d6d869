//! Conflict record - one discrepancy between incoming and on-disk content

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::value_objects::MergeStrategy;

/// Kind of change the incoming content represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    /// Nothing exists at the path yet
    Addition,
    /// Existing content differs from incoming
    Modification,
    /// Incoming content is empty while existing is not
    Deletion,
}

impl ConflictKind {
    pub fn classify(existing: Option<&str>, incoming: &str) -> Self {
        match existing {
            None => ConflictKind::Addition,
            Some(e) if incoming.trim().is_empty() && !e.trim().is_empty() => {
                ConflictKind::Deletion
            }
            Some(_) => ConflictKind::Modification,
        }
    }
}

/// How a conflict was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "action", content = "merge")]
pub enum Resolution {
    Skipped,
    Overwritten,
    BackedUp,
    Merged(MergeStrategy),
    Unresolved,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Resolution::Unresolved)
    }
}

/// Ephemeral record, scoped to one component deploy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictRecord {
    pub path: PathBuf,
    pub kind: ConflictKind,
    #[serde(skip)]
    pub existing_content: Option<String>,
    #[serde(skip)]
    pub incoming_content: String,
    pub resolution: Resolution,
    /// Short change summary, e.g. `+2 ~1 -0`
    pub summary: String,
}
