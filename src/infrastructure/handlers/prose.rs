//! Prose component handler (commands, steering, specs)
//!
//! Markdown documents get a YAML metadata header identifying where they came
//! from. The header is regenerated on every write and is never part of
//! conflict resolution; only the body is diffed and merged.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::layout::Layout;
use super::protocol::{
    deploy_file, effective_merge, merge_override_warning, strip_header, FileJob, GENERATED_BY,
};
use crate::domain::entities::{ComponentData, ContextMetadata, ProseDocument, SpecDocument};
use crate::domain::policies::sanitize_file_name;
use crate::domain::ports::{
    ComponentHandler, FileSystem, FsError, HandlerOptions, HandlerOutcome, TargetContext,
};
use crate::domain::value_objects::{ComponentKind, ContentCategory, MergeStrategy};
use crate::error::{codes, DeployIssue};

/// Spec documents with this name track checklist progress
const TASKS_DOCUMENT: &str = "tasks";

#[derive(Serialize)]
struct ProseHeader<'a> {
    component: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProseHandler;

impl ProseHandler {
    pub fn new() -> Self {
        Self
    }

    /// Metadata block placed before a document body
    pub fn header(
        &self,
        kind: ComponentKind,
        name: &str,
        description: Option<&str>,
        metadata: &ContextMetadata,
    ) -> Result<String, serde_yaml_ng::Error> {
        let header = ProseHeader {
            component: kind.as_str(),
            name,
            description: description.filter(|d| !d.trim().is_empty()),
            context: Some(metadata.id.as_str()).filter(|s| !s.is_empty()),
            version: Some(metadata.version.as_str()).filter(|s| !s.is_empty()),
        };
        let yaml = serde_yaml_ng::to_string(&header)?;
        Ok(format!("---\n{}\n{GENERATED_BY}\n---\n\n", yaml.trim_end()))
    }

    /// Read a deployed document back without its header
    pub fn read_back(&self, fs: &dyn FileSystem, path: &Path) -> Result<String, FsError> {
        let content = fs.read(path)?;
        Ok(strip_header(&content).to_string())
    }

    #[allow(clippy::too_many_arguments)]
    fn deploy_one(
        &self,
        kind: ComponentKind,
        path: Option<PathBuf>,
        name: &str,
        description: Option<&str>,
        body: &str,
        default_merge: MergeStrategy,
        target: &TargetContext,
        options: &HandlerOptions,
        outcome: &mut HandlerOutcome,
    ) {
        let Some(path) = path else {
            outcome.errors.push(
                DeployIssue::error(
                    codes::VALIDATION_FAILED,
                    format!("{kind} name '{name}' has no usable file name"),
                )
                .with_component(kind),
            );
            return;
        };

        let header = match self.header(kind, name, description, target.metadata) {
            Ok(header) => header,
            Err(e) => {
                outcome.errors.push(
                    DeployIssue::error(
                        codes::COMPONENT_DEPLOY_FAILED,
                        format!("cannot render header for '{name}': {e}"),
                    )
                    .with_component(kind)
                    .with_path(path),
                );
                return;
            }
        };

        deploy_file(
            FileJob {
                component: kind,
                path,
                body: body.to_string(),
                header: Some(header),
                merge: effective_merge(kind, default_merge, options),
            },
            target,
            options,
            outcome,
        );
    }

    fn deploy_documents(
        &self,
        kind: ComponentKind,
        documents: &[ProseDocument],
        layout: &Layout,
        target: &TargetContext,
        options: &HandlerOptions,
        outcome: &mut HandlerOutcome,
    ) {
        for document in documents {
            self.deploy_one(
                kind,
                layout.document_path(kind, &document.name),
                &document.name,
                document.description.as_deref(),
                &document.content,
                kind.default_merge(),
                target,
                options,
                outcome,
            );
        }
    }

    fn deploy_specs(
        &self,
        specs: &[SpecDocument],
        layout: &Layout,
        target: &TargetContext,
        options: &HandlerOptions,
        outcome: &mut HandlerOutcome,
    ) {
        let kind = ComponentKind::Specs;
        for spec in specs {
            for (document, body) in &spec.documents {
                let default_merge =
                    if sanitize_file_name(document).as_deref() == Some(TASKS_DOCUMENT) {
                        MergeStrategy::TaskStatusPreserve
                    } else {
                        kind.default_merge()
                    };
                self.deploy_one(
                    kind,
                    layout.spec_document_path(&spec.name, document),
                    &format!("{}/{}", spec.name, document),
                    None,
                    body,
                    default_merge,
                    target,
                    options,
                    outcome,
                );
            }
        }
    }
}

impl ComponentHandler for ProseHandler {
    fn handles(&self, kind: ComponentKind) -> bool {
        kind.category() == ContentCategory::Prose
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
            ComponentData::Commands(docs) | ComponentData::Steering(docs) => {
                self.deploy_documents(kind, docs, &layout, target, options, &mut outcome)
            }
            ComponentData::Specs(specs) => {
                self.deploy_specs(specs, &layout, target, options, &mut outcome)
            }
            ComponentData::Settings(_)
            | ComponentData::Agents(_)
            | ComponentData::Hooks(_)
            | ComponentData::Templates(_) => {
                outcome.errors.push(
                    DeployIssue::error(
                        codes::COMPONENT_DEPLOY_FAILED,
                        format!("{kind} is not a prose component"),
                    )
                    .with_component(kind),
                );
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{NoSnapshots, NoopEventSink};
    use crate::domain::services::{ConflictResolver, SECTION_DIVIDER};
    use crate::domain::value_objects::{ConflictStrategy, Platform};
    use crate::infrastructure::fs::LocalFs;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::tempdir;

    fn metadata() -> ContextMetadata {
        ContextMetadata {
            id: "ctx-1".to_string(),
            version: "v2".to_string(),
            ..Default::default()
        }
    }

    fn deploy(
        project: &Path,
        data: &ComponentData,
        strategy: ConflictStrategy,
    ) -> HandlerOutcome {
        let resolver = ConflictResolver::new();
        let metadata = metadata();
        let target = TargetContext {
            platform: Platform::Kiro,
            home_dir: project,
            project_dir: project,
            fs: &LocalFs,
            resolver: &resolver,
            snapshots: &NoSnapshots,
            events: &NoopEventSink,
            metadata: &metadata,
        };
        ProseHandler.deploy(
            data,
            &target,
            &HandlerOptions {
                strategy,
                ..Default::default()
            },
        )
    }

    fn steering(content: &str) -> ComponentData {
        ComponentData::Steering(vec![ProseDocument {
            name: "API Standards".to_string(),
            content: content.to_string(),
            description: Some("Use REST everywhere".to_string()),
        }])
    }

    #[test]
    fn header_is_rendered_as_frontmatter() {
        let header = ProseHandler
            .header(
                ComponentKind::Steering,
                "API Standards",
                Some("Use REST everywhere"),
                &metadata(),
            )
            .unwrap();
        let rendered = format!("{header}Body");

        insta::assert_snapshot!(rendered, @r"
        ---
        component: steering
        name: API Standards
        description: Use REST everywhere
        context: ctx-1
        version: v2
        generated_by: cairn
        ---

        Body
        ");
    }

    #[test]
    fn new_document_gets_header_and_body() {
        let dir = tempdir().unwrap();
        let outcome = deploy(dir.path(), &steering("Use REST."), ConflictStrategy::Merge);

        let path = dir.path().join(".kiro/steering/api-standards.md");
        assert_eq!(outcome.deployed_files, vec![path.clone()]);
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("---\ncomponent: steering\n"));
        assert_eq!(ProseHandler.read_back(&LocalFs, &path).unwrap(), "Use REST.");
    }

    #[test]
    fn section_merge_appends_after_divider() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".kiro/steering/api-standards.md");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "A").unwrap();

        deploy(dir.path(), &steering("B"), ConflictStrategy::Merge);

        assert_eq!(
            ProseHandler.read_back(&LocalFs, &path).unwrap(),
            format!("A{SECTION_DIVIDER}B")
        );
    }

    #[test]
    fn redeploying_same_document_is_up_to_date() {
        let dir = tempdir().unwrap();
        deploy(dir.path(), &steering("Same"), ConflictStrategy::Merge);

        let second = deploy(dir.path(), &steering("Same"), ConflictStrategy::Merge);

        assert!(second.deployed_files.is_empty());
        assert_eq!(second.skipped_files.len(), 1);
    }

    #[test]
    fn tasks_documents_preserve_completion() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".kiro/specs/auth/tasks.md");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "- [x] Build API\n- [ ] Write docs\n").unwrap();

        let mut documents = BTreeMap::new();
        documents.insert(
            "tasks".to_string(),
            "- [ ] Build API\n- [ ] Write docs\n- [ ] Ship\n".to_string(),
        );
        documents.insert("design".to_string(), "Design".to_string());
        let outcome = deploy(
            dir.path(),
            &ComponentData::Specs(vec![SpecDocument {
                name: "Auth".to_string(),
                documents,
            }]),
            ConflictStrategy::Merge,
        );

        assert!(outcome.is_success(), "{:?}", outcome.errors);
        assert_eq!(outcome.deployed_files.len(), 2);
        assert_eq!(
            ProseHandler.read_back(&LocalFs, &path).unwrap(),
            "- [x] Build API\n- [ ] Write docs\n- [ ] Ship\n"
        );
    }

    #[test]
    fn overwrite_replaces_body_without_resolver() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".kiro/steering/api-standards.md");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "old").unwrap();

        let outcome = deploy(dir.path(), &steering("new"), ConflictStrategy::Overwrite);

        assert!(outcome.conflicts.is_empty());
        assert_eq!(ProseHandler.read_back(&LocalFs, &path).unwrap(), "new");
    }
}
