//! Property tests for the merge sub-strategies.

use proptest::prelude::*;
use serde_json::{Map, Value};

use cairn::domain::services::{array_append, deep_merge, preserve_task_status, section_merge};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-z]{0,8}".prop_map(Value::String),
    ]
}

fn json_value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            proptest::collection::btree_map("[a-d]", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn json_object() -> impl Strategy<Value = Value> {
    proptest::collection::btree_map("[a-d]", json_value(), 0..5)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>()))
}

fn task_line() -> impl Strategy<Value = String> {
    ("[ x]", "[A-Za-z][A-Za-z ]{0,11}").prop_map(|(mark, title)| format!("- [{mark}] {}", title.trim_end()))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: every incoming top-level key wins unless both sides are objects.
    #[test]
    fn property_deep_merge_incoming_wins(existing in json_object(), incoming in json_object()) {
        let merged = deep_merge(existing.clone(), incoming.clone());
        let merged = merged.as_object().unwrap();

        for (key, value) in incoming.as_object().unwrap() {
            let both_objects = value.is_object()
                && existing.get(key).map(Value::is_object).unwrap_or(false);
            if !both_objects {
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }
        for (key, value) in existing.as_object().unwrap() {
            if incoming.get(key).is_none() {
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }
    }

    /// PROPERTY: re-applying the same incoming document changes nothing.
    #[test]
    fn property_deep_merge_is_idempotent(existing in json_value(), incoming in json_value()) {
        let once = deep_merge(existing, incoming.clone());
        let twice = deep_merge(once.clone(), incoming);
        prop_assert_eq!(once, twice);
    }

    /// PROPERTY: array-append keeps every element of both top-level arrays.
    #[test]
    fn property_array_append_concatenates(
        existing in proptest::collection::vec(leaf(), 0..6),
        incoming in proptest::collection::vec(leaf(), 0..6),
    ) {
        let merged = array_append(
            serde_json::json!({ "list": existing.clone() }),
            serde_json::json!({ "list": incoming.clone() }),
        );
        let mut expected = existing;
        expected.extend(incoming);
        prop_assert_eq!(&merged["list"], &Value::Array(expected));
    }

    /// PROPERTY: section merge keeps both sides in order.
    #[test]
    fn property_section_merge_keeps_both(existing in "[a-z\n ]{0,40}", incoming in "[a-z\n ]{0,40}") {
        let merged = section_merge(&existing, &incoming);
        prop_assert!(merged.starts_with(&existing));
        prop_assert!(merged.ends_with(&incoming));
    }

    /// PROPERTY: task status preservation only ever ticks boxes.
    #[test]
    fn property_task_status_only_ticks_boxes(
        existing in proptest::collection::vec(task_line(), 0..6),
        incoming in proptest::collection::vec(task_line(), 0..6),
    ) {
        let incoming = incoming.join("\n");
        let preserved = preserve_task_status(&existing.join("\n"), &incoming);

        prop_assert_eq!(preserved.len(), incoming.len());
        prop_assert_eq!(preserved.replace("[x]", "[ ]"), incoming.replace("[x]", "[ ]"));
        prop_assert!(preserved.matches("[x]").count() >= incoming.matches("[x]").count());
    }
}
