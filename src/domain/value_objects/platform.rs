//! Platform value object - which development tool layout to deploy onto

use serde::{Deserialize, Serialize};

/// Target platform for deployment
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    /// Claude Code (Anthropic)
    #[serde(alias = "claude")]
    #[value(alias = "claude")]
    ClaudeCode,
    /// Kiro IDE
    Kiro,
    /// Cursor IDE
    Cursor,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::ClaudeCode, Platform::Kiro, Platform::Cursor];

    /// Get the configuration directory name for this platform
    pub fn directory_name(&self) -> &'static str {
        match self {
            Platform::ClaudeCode => ".claude",
            Platform::Kiro => ".kiro",
            Platform::Cursor => ".cursor",
        }
    }

    /// Key used for this platform in a context's `platforms` map
    pub fn key(&self) -> &'static str {
        match self {
            Platform::ClaudeCode => "claude-code",
            Platform::Kiro => "kiro",
            Platform::Cursor => "cursor",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::ClaudeCode => "Claude Code",
            Platform::Kiro => "Kiro",
            Platform::Cursor => "Cursor",
        }
    }

    pub fn from_key(key: &str) -> Option<Platform> {
        match key {
            "claude-code" | "claude" => Some(Platform::ClaudeCode),
            "kiro" => Some(Platform::Kiro),
            "cursor" => Some(Platform::Cursor),
            _ => None,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
