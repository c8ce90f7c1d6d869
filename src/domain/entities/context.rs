//! Context entity - the normalized configuration bundle to deploy
//!
//! A `Context` is produced by an external collector/transformer pipeline and
//! is read-only to the engine. The platform-specific subtrees are typed per
//! component; keys the engine does not understand are preserved in
//! [`PlatformSection::extra`] instead of being dropped.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::value_objects::{ComponentKind, Platform};

/// Provenance of a context bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextMetadata {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Normalized configuration bundle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    #[serde(default)]
    pub metadata: ContextMetadata,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub personal: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub project: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub prompts: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub tools: Value,
    #[serde(default)]
    pub platforms: BTreeMap<String, PlatformSection>,
}

impl Context {
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Section for a platform, honoring key aliases
    pub fn section(&self, platform: Platform) -> Option<&PlatformSection> {
        self.platforms
            .iter()
            .find(|(key, _)| Platform::from_key(key) == Some(platform))
            .map(|(_, section)| section)
    }

    /// Platform keys the engine does not recognize
    pub fn unknown_platforms(&self) -> Vec<&str> {
        self.platforms
            .keys()
            .filter(|key| Platform::from_key(key).is_none())
            .map(String::as_str)
            .collect()
    }

    /// The whole bundle as a JSON tree (used for scanning)
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Stable content fingerprint (`sha256:<hex>`)
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        format!("sha256:{:x}", hasher.finalize())
    }
}

/// A structured (JSON) document with a name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredDocument {
    pub name: String,
    pub content: Value,
}

/// A prose (markdown) document with a name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProseDocument {
    pub name: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A spec: a named folder of prose documents (requirements, design, tasks, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecDocument {
    pub name: String,
    #[serde(default)]
    pub documents: BTreeMap<String, String>,
}

/// Platform-shaped configuration for one target platform
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents: Vec<StructuredDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<ProseDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steering: Vec<ProseDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specs: Vec<SpecDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hooks: Vec<StructuredDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<StructuredDocument>,
    /// Keys not understood by the engine; kept, never written
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlatformSection {
    /// Non-empty components in deployment order
    pub fn components(&self) -> Vec<ComponentData> {
        let mut components = Vec::new();
        if let Some(settings) = &self.settings {
            components.push(ComponentData::Settings(settings.clone()));
        }
        if !self.agents.is_empty() {
            components.push(ComponentData::Agents(self.agents.clone()));
        }
        if !self.commands.is_empty() {
            components.push(ComponentData::Commands(self.commands.clone()));
        }
        if !self.steering.is_empty() {
            components.push(ComponentData::Steering(self.steering.clone()));
        }
        if !self.specs.is_empty() {
            components.push(ComponentData::Specs(self.specs.clone()));
        }
        if !self.hooks.is_empty() {
            components.push(ComponentData::Hooks(self.hooks.clone()));
        }
        if !self.templates.is_empty() {
            components.push(ComponentData::Templates(self.templates.clone()));
        }
        components
    }

    pub fn unknown_keys(&self) -> Vec<&str> {
        self.extra.keys().map(String::as_str).collect()
    }
}

/// One component's payload, tagged by kind
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentData {
    Settings(Value),
    Agents(Vec<StructuredDocument>),
    Commands(Vec<ProseDocument>),
    Steering(Vec<ProseDocument>),
    Specs(Vec<SpecDocument>),
    Hooks(Vec<StructuredDocument>),
    Templates(Vec<StructuredDocument>),
}

impl ComponentData {
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentData::Settings(_) => ComponentKind::Settings,
            ComponentData::Agents(_) => ComponentKind::Agents,
            ComponentData::Commands(_) => ComponentKind::Commands,
            ComponentData::Steering(_) => ComponentKind::Steering,
            ComponentData::Specs(_) => ComponentKind::Specs,
            ComponentData::Hooks(_) => ComponentKind::Hooks,
            ComponentData::Templates(_) => ComponentKind::Templates,
        }
    }

    /// Number of files this component will produce
    pub fn file_count(&self) -> usize {
        match self {
            ComponentData::Settings(_) => 1,
            ComponentData::Agents(docs)
            | ComponentData::Hooks(docs)
            | ComponentData::Templates(docs) => docs.len(),
            ComponentData::Commands(docs) | ComponentData::Steering(docs) => docs.len(),
            ComponentData::Specs(specs) => specs.iter().map(|s| s.documents.len()).sum(),
        }
    }

    /// Approximate payload size in bytes
    pub fn payload_bytes(&self) -> u64 {
        let structured = |value: &Value| serde_json::to_vec(value).map_or(0, |v| v.len()) as u64;
        match self {
            ComponentData::Settings(value) => structured(value),
            ComponentData::Agents(docs)
            | ComponentData::Hooks(docs)
            | ComponentData::Templates(docs) => docs.iter().map(|d| structured(&d.content)).sum(),
            ComponentData::Commands(docs) | ComponentData::Steering(docs) => {
                docs.iter().map(|d| d.content.len() as u64).sum()
            }
            ComponentData::Specs(specs) => specs
                .iter()
                .flat_map(|s| s.documents.values())
                .map(|d| d.len() as u64)
                .sum(),
        }
    }
}
