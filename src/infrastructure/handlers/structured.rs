//! Structured component handler (settings, agents, hooks, templates)
//!
//! Content is written as pretty-printed JSON.

use std::path::Path;

use serde_json::Value;

use super::layout::Layout;
use super::protocol::{deploy_file, effective_merge, merge_override_warning, FileJob};
use crate::domain::entities::{ComponentData, StructuredDocument};
use crate::domain::ports::{
    ComponentHandler, FileSystem, FsError, HandlerOptions, HandlerOutcome, TargetContext,
};
use crate::domain::services::to_pretty_json;
use crate::domain::value_objects::{ComponentKind, ContentCategory};
use crate::error::{codes, DeployIssue};

#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredHandler;

impl StructuredHandler {
    pub fn new() -> Self {
        Self
    }

    /// Read a deployed file back as JSON
    pub fn read_back(&self, fs: &dyn FileSystem, path: &Path) -> Result<Value, FsError> {
        let content = fs.read(path)?;
        serde_json::from_str(&content).map_err(|e| FsError::Other(format!("{}: {e}", path.display())))
    }

    fn deploy_documents(
        &self,
        kind: ComponentKind,
        documents: &[StructuredDocument],
        layout: &Layout,
        target: &TargetContext,
        options: &HandlerOptions,
        outcome: &mut HandlerOutcome,
    ) {
        for document in documents {
            let Some(path) = layout.document_path(kind, &document.name) else {
                outcome.errors.push(
                    DeployIssue::error(
                        codes::VALIDATION_FAILED,
                        format!("{kind} name '{}' has no usable file name", document.name),
                    )
                    .with_component(kind),
                );
                continue;
            };
            deploy_file(
                FileJob {
                    component: kind,
                    path,
                    body: to_pretty_json(&document.content),
                    header: None,
                    merge: effective_merge(kind, kind.default_merge(), options),
                },
                target,
                options,
                outcome,
            );
        }
    }
}

impl ComponentHandler for StructuredHandler {
    fn handles(&self, kind: ComponentKind) -> bool {
        kind.category() == ContentCategory::Structured
    }

    fn deploy(
        &self,
        data: &ComponentData,
        target: &TargetContext,
        options: &HandlerOptions,
    ) -> HandlerOutcome {
        let mut outcome = HandlerOutcome::default();
        let kind = data.kind();
        let layout = Layout::new(target.platform, target.home_dir, target.project_dir);
        outcome
            .warnings
            .extend(merge_override_warning(kind, options));

        match data {
            ComponentData::Settings(settings) => deploy_file(
                FileJob {
                    component: kind,
                    path: layout.settings_path(),
                    body: to_pretty_json(settings),
                    header: None,
                    merge: effective_merge(kind, kind.default_merge(), options),
                },
                target,
                options,
                &mut outcome,
            ),
            ComponentData::Agents(docs)
            | ComponentData::Hooks(docs)
            | ComponentData::Templates(docs) => {
                self.deploy_documents(kind, docs, &layout, target, options, &mut outcome)
            }
            ComponentData::Commands(_) | ComponentData::Steering(_) | ComponentData::Specs(_) => {
                outcome.errors.push(
                    DeployIssue::error(
                        codes::COMPONENT_DEPLOY_FAILED,
                        format!("{kind} is not a structured component"),
                    )
                    .with_component(kind),
                );
            }
        }

        outcome
    }
}
