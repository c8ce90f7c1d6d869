//! Context validation policy
//!
//! Checks the shape of the platform section selected for a deployment.
//! Everything here runs before any lock is taken or any file is touched.

use std::collections::HashSet;

use serde_json::Value;

use super::naming::sanitize_file_name;
use crate::domain::entities::{ComponentData, Context, StructuredDocument};
use crate::domain::value_objects::{ComponentKind, Platform};

/// Include/exclude filter over component kinds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSelection {
    /// Empty means "all components"
    pub include: Vec<ComponentKind>,
    pub exclude: Vec<ComponentKind>,
}

impl ComponentSelection {
    pub fn allows(&self, kind: ComponentKind) -> bool {
        (self.include.is_empty() || self.include.contains(&kind)) && !self.exclude.contains(&kind)
    }

    /// Component that appears in both lists, if any
    pub fn overlap(&self) -> Option<ComponentKind> {
        self.include
            .iter()
            .copied()
            .find(|k| self.exclude.contains(k))
    }

    /// Stable key used for caching validation outcomes
    pub fn cache_key(&self) -> String {
        let join = |kinds: &[ComponentKind]| {
            let mut names: Vec<_> = kinds.iter().map(|k| k.as_str()).collect();
            names.sort_unstable();
            names.join(",")
        };
        format!("+{}-{}", join(&self.include), join(&self.exclude))
    }
}

/// Outcome of validating a context for one platform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Components that passed the filter
    pub selected: Vec<ComponentKind>,
    /// Components present in the context but filtered out
    pub filtered_out: Vec<ComponentKind>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate the context's section for `platform` under `selection`
pub fn validate_context(
    context: &Context,
    platform: Platform,
    selection: &ComponentSelection,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    let unrecognized = context.unknown_platforms();

    let Some(section) = context.section(platform) else {
        let available: Vec<_> = context.platforms.keys().cloned().collect();
        let mut message = format!(
            "context has no section for platform '{}' (available: {})",
            platform.key(),
            if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            }
        );
        if !unrecognized.is_empty() {
            message.push_str(&format!(
                "; unrecognized platform keys: {}",
                unrecognized.join(", ")
            ));
        }
        report.errors.push(message);
        return report;
    };

    if !unrecognized.is_empty() {
        report.warnings.push(format!(
            "ignoring unrecognized platform sections: {}",
            unrecognized.join(", ")
        ));
    }

    let unknown = section.unknown_keys();
    if !unknown.is_empty() {
        report.warnings.push(format!(
            "ignoring unknown keys in '{}' section: {}",
            platform.key(),
            unknown.join(", ")
        ));
    }

    for component in section.components() {
        let kind = component.kind();
        if !selection.allows(kind) {
            report.filtered_out.push(kind);
            continue;
        }
        report.errors.extend(validate_component(&component));
        report.selected.push(kind);
    }

    if report.selected.is_empty() && report.errors.is_empty() {
        report.errors.push(format!(
            "no components left to deploy for '{}' after include/exclude filtering",
            platform.key()
        ));
    }

    report
}

fn validate_component(component: &ComponentData) -> Vec<String> {
    let kind = component.kind();
    let mut errors = Vec::new();

    match component {
        ComponentData::Settings(value) => {
            if !value.is_object() {
                errors.push(format!("{kind}: settings must be a JSON object"));
            }
        }
        ComponentData::Agents(docs) | ComponentData::Hooks(docs) | ComponentData::Templates(docs) => {
            errors.extend(check_names(kind, docs.iter().map(|d| d.name.as_str())));
            errors.extend(non_object_documents(kind, docs));
        }
        ComponentData::Commands(docs) | ComponentData::Steering(docs) => {
            errors.extend(check_names(kind, docs.iter().map(|d| d.name.as_str())));
        }
        ComponentData::Specs(specs) => {
            errors.extend(check_names(kind, specs.iter().map(|s| s.name.as_str())));
            for spec in specs {
                if spec.documents.is_empty() {
                    errors.push(format!("{kind}: spec '{}' has no documents", spec.name));
                }
                errors.extend(check_names(
                    kind,
                    spec.documents.keys().map(String::as_str),
                ));
            }
        }
    }

    errors
}

fn non_object_documents(kind: ComponentKind, docs: &[StructuredDocument]) -> Vec<String> {
    docs.iter()
        .filter(|d| !matches!(d.content, Value::Object(_)))
        .map(|d| format!("{kind}: '{}' must be a JSON object", d.name))
        .collect()
}

fn check_names<'a>(kind: ComponentKind, names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for name in names {
        match sanitize_file_name(name) {
            None => errors.push(format!("{kind}: name '{name}' is empty after sanitizing")),
            Some(sanitized) => {
                if !seen.insert(sanitized.clone()) {
                    errors.push(format!(
                        "{kind}: '{name}' collides with another entry as '{sanitized}'"
                    ));
                }
            }
        }
    }
    errors
}
