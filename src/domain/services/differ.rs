//! Differ Domain Service
//!
//! Computes differences between existing and incoming content: key paths for
//! structured content, sections (or lines) for prose.

use serde_json::Value;
use similar::{ChangeTag, TextDiff};

use crate::domain::value_objects::ContentCategory;

/// Summary of how incoming content differs from existing content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentDiff {
    /// Whether there are any changes
    pub has_changes: bool,
    /// Key paths / sections / lines only present in incoming
    pub additions: Vec<String>,
    /// Key paths / sections present in both with different values
    pub modifications: Vec<String>,
    /// Key paths / sections / lines only present in existing
    pub deletions: Vec<String>,
}

impl ContentDiff {
    fn finish(mut self) -> Self {
        self.has_changes =
            !self.additions.is_empty() || !self.modifications.is_empty() || !self.deletions.is_empty();
        self
    }

    /// Compact summary (e.g., "+2 ~1 -0")
    pub fn summary(&self) -> String {
        format!(
            "+{} ~{} -{}",
            self.additions.len(),
            self.modifications.len(),
            self.deletions.len()
        )
    }
}

/// Differ service for computing content differences
#[derive(Debug, Clone, Copy, Default)]
pub struct Differ;

impl Differ {
    pub fn new() -> Self {
        Self
    }

    /// Diff two documents of the given category.
    ///
    /// Structured content that fails to parse as JSON is compared as prose.
    pub fn diff(&self, existing: &str, incoming: &str, category: ContentCategory) -> ContentDiff {
        if category == ContentCategory::Structured {
            if let (Ok(old), Ok(new)) = (
                serde_json::from_str::<Value>(existing),
                serde_json::from_str::<Value>(incoming),
            ) {
                return self.diff_structured(&old, &new);
            }
        }
        self.diff_prose(existing, incoming)
    }

    /// Structural key-path comparison.
    ///
    /// Objects are walked recursively; arrays and scalars are compared as
    /// whole values at their key path.
    pub fn diff_structured(&self, existing: &Value, incoming: &Value) -> ContentDiff {
        let mut diff = ContentDiff::default();
        walk_structured("", existing, incoming, &mut diff);
        diff.finish()
    }

    /// Section comparison for markdown, falling back to lines when neither
    /// side has headings.
    pub fn diff_prose(&self, existing: &str, incoming: &str) -> ContentDiff {
        let old_sections = split_sections(existing);
        let new_sections = split_sections(incoming);

        if old_sections.iter().all(|(h, _)| h.is_none())
            && new_sections.iter().all(|(h, _)| h.is_none())
        {
            return self.diff_lines(existing, incoming);
        }

        let mut diff = ContentDiff::default();
        for (heading, body) in &new_sections {
            let key = section_key(heading);
            match old_sections.iter().find(|(h, _)| h == heading) {
                None => diff.additions.push(key),
                Some((_, old_body)) if old_body.trim() != body.trim() => {
                    diff.modifications.push(key)
                }
                Some(_) => {}
            }
        }
        for (heading, _) in &old_sections {
            if !new_sections.iter().any(|(h, _)| h == heading) {
                diff.deletions.push(section_key(heading));
            }
        }
        diff.finish()
    }

    /// Line-level comparison
    pub fn diff_lines(&self, existing: &str, incoming: &str) -> ContentDiff {
        let text_diff = TextDiff::from_lines(existing, incoming);
        let mut diff = ContentDiff::default();
        for change in text_diff.iter_all_changes() {
            let line = change.value().trim_end().to_string();
            match change.tag() {
                ChangeTag::Insert => diff.additions.push(line),
                ChangeTag::Delete => diff.deletions.push(line),
                ChangeTag::Equal => {}
            }
        }
        diff.finish()
    }

    /// Unified diff text for display
    pub fn unified(&self, existing: &str, incoming: &str, path: &str) -> String {
        TextDiff::from_lines(existing, incoming)
            .unified_diff()
            .context_radius(3)
            .header(&format!("{path} (existing)"), &format!("{path} (incoming)"))
            .to_string()
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn walk_structured(prefix: &str, existing: &Value, incoming: &Value, diff: &mut ContentDiff) {
    match (existing, incoming) {
        (Value::Object(old), Value::Object(new)) => {
            for (key, new_value) in new {
                let path = join_path(prefix, key);
                match old.get(key) {
                    None => diff.additions.push(path),
                    Some(old_value) => walk_structured(&path, old_value, new_value, diff),
                }
            }
            for key in old.keys() {
                if !new.contains_key(key) {
                    diff.deletions.push(join_path(prefix, key));
                }
            }
        }
        (old, new) if old != new => {
            let path = if prefix.is_empty() { "$" } else { prefix };
            diff.modifications.push(path.to_string());
        }
        _ => {}
    }
}

fn section_key(heading: &Option<String>) -> String {
    heading.clone().unwrap_or_else(|| "(preamble)".to_string())
}

/// Split markdown into `(heading, body)` pairs; text before the first
/// heading has no heading.
fn split_sections(content: &str) -> Vec<(Option<String>, String)> {
    let mut sections: Vec<(Option<String>, String)> = Vec::new();
    let mut heading: Option<String> = None;
    let mut body = String::new();

    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with('#') {
            if heading.is_some() || !body.trim().is_empty() {
                sections.push((heading.take(), std::mem::take(&mut body)));
            }
            body.clear();
            heading = Some(trimmed.trim_start_matches('#').trim().to_string());
        } else {
            body.push_str(line);
            body.push('\n');
        }
    }
    if heading.is_some() || !body.trim().is_empty() {
        sections.push((heading, body));
    }
    sections
}
