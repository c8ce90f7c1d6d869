//! Per-platform on-disk layout
//!
//! | component | path                                          |
//! |-----------|-----------------------------------------------|
//! | settings  | `<home>/<dir>/settings.json`                  |
//! | agents    | `<home>/<dir>/agents/<name>.json`             |
//! | commands  | `<home>/<dir>/commands/<name>.md`             |
//! | steering  | `<project>/<dir>/steering/<name>.md`          |
//! | specs     | `<project>/<dir>/specs/<spec>/<document>.md`  |
//! | hooks     | `<project>/<dir>/hooks/<name>.json`           |
//! | templates | `<project>/<dir>/templates/<name>.json`       |

use std::path::{Path, PathBuf};

use crate::domain::policies::sanitize_file_name;
use crate::domain::value_objects::{ComponentKind, ComponentScope, ContentCategory, Platform};

/// Resolves destination paths for one platform
#[derive(Debug, Clone, Copy)]
pub struct Layout<'a> {
    pub platform: Platform,
    pub home_dir: &'a Path,
    pub project_dir: &'a Path,
}

impl<'a> Layout<'a> {
    pub fn new(platform: Platform, home_dir: &'a Path, project_dir: &'a Path) -> Self {
        Self {
            platform,
            home_dir,
            project_dir,
        }
    }

    /// `<root>/<dir>` for the component's scope
    pub fn platform_dir(&self, kind: ComponentKind) -> PathBuf {
        let root = match kind.scope() {
            ComponentScope::Home => self.home_dir,
            ComponentScope::Project => self.project_dir,
        };
        root.join(self.platform.directory_name())
    }

    /// Directory holding a component's files
    pub fn component_dir(&self, kind: ComponentKind) -> PathBuf {
        match kind {
            ComponentKind::Settings => self.platform_dir(kind),
            _ => self.platform_dir(kind).join(kind.as_str()),
        }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.platform_dir(ComponentKind::Settings)
            .join("settings.json")
    }

    /// Path of a named document; `None` when the name sanitizes to nothing
    pub fn document_path(&self, kind: ComponentKind, name: &str) -> Option<PathBuf> {
        let file = sanitize_file_name(name)?;
        Some(
            self.component_dir(kind)
                .join(format!("{file}.{}", extension(kind.category()))),
        )
    }

    /// Path of one document inside a spec folder
    pub fn spec_document_path(&self, spec: &str, document: &str) -> Option<PathBuf> {
        let folder = sanitize_file_name(spec)?;
        let file = sanitize_file_name(document)?;
        Some(
            self.component_dir(ComponentKind::Specs)
                .join(folder)
                .join(format!("{file}.md")),
        )
    }
}

fn extension(category: ContentCategory) -> &'static str {
    match category {
        ContentCategory::Structured => "json",
        ContentCategory::Prose => "md",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> Layout<'static> {
        Layout::new(Platform::Kiro, Path::new("/home/u"), Path::new("/work/app"))
    }

    #[test]
    fn settings_live_in_home() {
        assert_eq!(
            layout().settings_path(),
            PathBuf::from("/home/u/.kiro/settings.json")
        );
    }

    #[test]
    fn steering_lives_in_project() {
        assert_eq!(
            layout().document_path(ComponentKind::Steering, "API Standards"),
            Some(PathBuf::from("/work/app/.kiro/steering/api-standards.md"))
        );
    }

    #[test]
    fn agents_are_json() {
        assert_eq!(
            layout().document_path(ComponentKind::Agents, "reviewer"),
            Some(PathBuf::from("/home/u/.kiro/agents/reviewer.json"))
        );
    }

    #[test]
    fn spec_documents_nest_under_spec_folder() {
        assert_eq!(
            layout().spec_document_path("User Auth", "tasks"),
            Some(PathBuf::from("/work/app/.kiro/specs/user-auth/tasks.md"))
        );
    }

    #[test]
    fn path_traversal_names_stay_inside_component_dir() {
        let path = layout()
            .document_path(ComponentKind::Commands, "../../etc/passwd")
            .unwrap();
        assert!(path.starts_with("/home/u/.kiro/commands"));
    }

    #[test]
    fn unusable_names_have_no_path() {
        assert_eq!(layout().document_path(ComponentKind::Hooks, "///"), None);
    }
}
