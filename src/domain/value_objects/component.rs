//! Component kinds and their content categories

use serde::{Deserialize, Serialize};

use super::MergeStrategy;

/// Whether a component is written as structured data or as prose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentCategory {
    /// Pretty-printed JSON
    Structured,
    /// Markdown with a metadata header
    Prose,
}

/// Where a component's files live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentScope {
    /// Under the user's home directory
    Home,
    /// Under the project directory
    Project,
}

/// A named slice of configuration deployed independently
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    Settings,
    Agents,
    Commands,
    Steering,
    Specs,
    Hooks,
    Templates,
}

impl ComponentKind {
    /// Deployment order used for sequential dispatch
    pub const ALL: [ComponentKind; 7] = [
        ComponentKind::Settings,
        ComponentKind::Agents,
        ComponentKind::Commands,
        ComponentKind::Steering,
        ComponentKind::Specs,
        ComponentKind::Hooks,
        ComponentKind::Templates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Settings => "settings",
            ComponentKind::Agents => "agents",
            ComponentKind::Commands => "commands",
            ComponentKind::Steering => "steering",
            ComponentKind::Specs => "specs",
            ComponentKind::Hooks => "hooks",
            ComponentKind::Templates => "templates",
        }
    }

    pub fn category(&self) -> ContentCategory {
        match self {
            ComponentKind::Settings
            | ComponentKind::Agents
            | ComponentKind::Hooks
            | ComponentKind::Templates => ContentCategory::Structured,
            ComponentKind::Commands | ComponentKind::Steering | ComponentKind::Specs => {
                ContentCategory::Prose
            }
        }
    }

    pub fn scope(&self) -> ComponentScope {
        match self {
            ComponentKind::Settings | ComponentKind::Agents | ComponentKind::Commands => {
                ComponentScope::Home
            }
            ComponentKind::Steering
            | ComponentKind::Specs
            | ComponentKind::Hooks
            | ComponentKind::Templates => ComponentScope::Project,
        }
    }

    /// Merge sub-strategy used when the caller does not pick one
    pub fn default_merge(&self) -> MergeStrategy {
        match self {
            ComponentKind::Settings | ComponentKind::Agents | ComponentKind::Templates => {
                MergeStrategy::DeepMerge
            }
            ComponentKind::Hooks => MergeStrategy::ArrayAppend,
            ComponentKind::Commands | ComponentKind::Steering | ComponentKind::Specs => {
                MergeStrategy::SectionMerge
            }
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
