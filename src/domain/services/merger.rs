//! Merger Domain Service
//!
//! Implements the merge sub-strategies used by the `merge` conflict strategy.
//!
//! - `deep-merge`: incoming scalars win, objects merge recursively, arrays
//!   are replaced wholesale
//! - `array-append`: like deep-merge, but arrays concatenate existing + incoming
//! - `section-merge`: prose, incoming appended after existing with a divider
//! - `task-status-preserve`: prose, completed checklist items in existing are
//!   re-applied to matching incomplete items in incoming

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::domain::value_objects::{ContentCategory, MergeStrategy};

/// Separator placed between existing and incoming prose by `section-merge`
pub const SECTION_DIVIDER: &str = "\n\n---\n\n";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MergeError {
    #[error("existing content is not valid JSON: {0}")]
    InvalidExisting(String),

    #[error("incoming content is not valid JSON: {0}")]
    InvalidIncoming(String),

    #[error("merge strategy '{strategy}' cannot merge {category:?} content")]
    CategoryMismatch {
        strategy: MergeStrategy,
        category: ContentCategory,
    },
}

/// Merge two documents of `category` with `strategy`
pub fn merge(
    existing: &str,
    incoming: &str,
    category: ContentCategory,
    strategy: MergeStrategy,
) -> Result<String, MergeError> {
    if strategy.category() != category {
        return Err(MergeError::CategoryMismatch { strategy, category });
    }

    match strategy {
        MergeStrategy::DeepMerge | MergeStrategy::ArrayAppend => {
            let old: Value = serde_json::from_str(existing)
                .map_err(|e| MergeError::InvalidExisting(e.to_string()))?;
            let new: Value = serde_json::from_str(incoming)
                .map_err(|e| MergeError::InvalidIncoming(e.to_string()))?;
            let merged = if strategy == MergeStrategy::DeepMerge {
                deep_merge(old, new)
            } else {
                array_append(old, new)
            };
            Ok(to_pretty_json(&merged))
        }
        MergeStrategy::SectionMerge => Ok(section_merge(existing, incoming)),
        MergeStrategy::TaskStatusPreserve => Ok(preserve_task_status(existing, incoming)),
    }
}

/// Pretty-printed JSON with a trailing newline
pub fn to_pretty_json(value: &Value) -> String {
    let mut out = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    out.push('\n');
    out
}

/// Deep merge: incoming wins on scalars and arrays, objects merge recursively
pub fn deep_merge(existing: Value, incoming: Value) -> Value {
    merge_values(existing, incoming, false)
}

/// Deep merge that concatenates arrays instead of replacing them
pub fn array_append(existing: Value, incoming: Value) -> Value {
    merge_values(existing, incoming, true)
}

fn merge_values(existing: Value, incoming: Value, append_arrays: bool) -> Value {
    match (existing, incoming) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, overlay_value) in overlay {
                match base.get_mut(&key) {
                    Some(slot) => {
                        let base_value = std::mem::take(slot);
                        *slot = merge_values(base_value, overlay_value, append_arrays);
                    }
                    None => {
                        base.insert(key, overlay_value);
                    }
                }
            }
            Value::Object(base)
        }
        (Value::Array(mut base), Value::Array(overlay)) if append_arrays => {
            base.extend(overlay);
            Value::Array(base)
        }
        (_, incoming) => incoming,
    }
}

/// Append incoming prose after existing prose, separated by a divider
pub fn section_merge(existing: &str, incoming: &str) -> String {
    format!("{existing}{SECTION_DIVIDER}{incoming}")
}

/// Carry completed checklist items from `existing` over to `incoming`.
///
/// Every `- [x] <title>` in existing marks the first-level `- [ ] <title>`
/// items in incoming complete. Titles match as literal, regex-escaped
/// prefixes, so a completed `Build API` also completes `Build API docs`.
pub fn preserve_task_status(existing: &str, incoming: &str) -> String {
    let completed = completed_titles(existing);
    let mut result = incoming.to_string();

    for title in completed {
        let pattern = format!(r"(?m)^(\s*[-*]\s+)\[ \](\s+{})", regex::escape(&title));
        let Ok(re) = Regex::new(&pattern) else {
            continue;
        };
        result = re.replace_all(&result, "${1}[x]${2}").into_owned();
    }

    result
}

fn completed_titles(content: &str) -> Vec<String> {
    let Ok(re) = Regex::new(r"(?m)^\s*[-*]\s+\[[xX]\]\s+(.+?)\s*$") else {
        return Vec::new();
    };
    re.captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deep_merge_incoming_scalars_win() {
        let merged = deep_merge(
            json!({"theme": "light", "fontSize": 12}),
            json!({"theme": "dark"}),
        );
        assert_eq!(merged, json!({"theme": "dark", "fontSize": 12}));
    }

    #[test]
    fn deep_merge_recurses_into_objects() {
        let merged = deep_merge(
            json!({"editor": {"tabSize": 2, "wrap": false}}),
            json!({"editor": {"wrap": true}}),
        );
        assert_eq!(merged, json!({"editor": {"tabSize": 2, "wrap": true}}));
    }

    #[test]
    fn deep_merge_replaces_arrays() {
        let merged = deep_merge(json!({"a": [1, 2]}), json!({"a": [3]}));
        assert_eq!(merged, json!({"a": [3]}));
    }

    #[test]
    fn array_append_concatenates() {
        let merged = array_append(
            json!({"hooks": ["lint"], "name": "x"}),
            json!({"hooks": ["test"], "name": "y"}),
        );
        assert_eq!(merged, json!({"hooks": ["lint", "test"], "name": "y"}));
    }

    #[test]
    fn array_append_type_change_takes_incoming() {
        let merged = array_append(json!({"a": [1]}), json!({"a": "one"}));
        assert_eq!(merged, json!({"a": "one"}));
    }

    #[test]
    fn section_merge_uses_divider() {
        assert_eq!(section_merge("A", "B"), format!("A{SECTION_DIVIDER}B"));
    }

    #[test]
    fn task_status_is_preserved() {
        let merged = preserve_task_status("- [x] Build API\n", "- [ ] Build API\n");
        assert_eq!(merged, "- [x] Build API\n");
    }

    #[test]
    fn task_status_leaves_other_content_untouched() {
        let existing = "# Tasks\n- [x] Build API\n- [ ] Write docs\n";
        let incoming = "# Tasks v2\n- [ ] Build API\n- [ ] Write docs\n- [ ] Ship\n";
        assert_eq!(
            preserve_task_status(existing, incoming),
            "# Tasks v2\n- [x] Build API\n- [ ] Write docs\n- [ ] Ship\n"
        );
    }

    #[test]
    fn task_titles_are_regex_escaped() {
        let merged = preserve_task_status("- [x] Fix (a+b)*\n", "- [ ] Fix (a+b)*\n- [ ] Fix aab\n");
        assert_eq!(merged, "- [x] Fix (a+b)*\n- [ ] Fix aab\n");
    }

    #[test]
    fn task_titles_match_as_prefix() {
        let merged = preserve_task_status("- [x] Build API\n", "- [ ] Build API docs\n");
        assert_eq!(merged, "- [x] Build API docs\n");
    }

    #[test]
    fn merge_rejects_category_mismatch() {
        let err = merge("a", "b", ContentCategory::Structured, MergeStrategy::SectionMerge)
            .unwrap_err();
        assert!(matches!(err, MergeError::CategoryMismatch { .. }));
    }

    #[test]
    fn merge_reports_invalid_existing_json() {
        let err = merge(
            "{oops",
            "{}",
            ContentCategory::Structured,
            MergeStrategy::DeepMerge,
        )
        .unwrap_err();
        assert!(matches!(err, MergeError::InvalidExisting(_)));
    }

    #[test]
    fn merge_structured_is_pretty_printed() {
        let out = merge(
            r#"{"a":1}"#,
            r#"{"b":2}"#,
            ContentCategory::Structured,
            MergeStrategy::DeepMerge,
        )
        .unwrap();
        assert_eq!(out, "{\n  \"a\": 1,\n  \"b\": 2\n}\n");
    }
}
