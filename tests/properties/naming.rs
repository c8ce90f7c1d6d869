//! Property tests for destination file-name sanitizing.

use proptest::prelude::*;

use cairn::domain::policies::sanitize_file_name;

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: sanitized names are a single safe, visible path segment.
    #[test]
    fn property_sanitized_names_are_safe(name in "\\PC{0,40}") {
        if let Some(safe) = sanitize_file_name(&name) {
            prop_assert!(!safe.is_empty());
            prop_assert!(safe
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-')));
            prop_assert!(!safe.starts_with('.'));
            prop_assert!(!safe.starts_with('-'));
            prop_assert!(!safe.ends_with('-'));
            prop_assert!(!safe.contains("--"));
            prop_assert!(!safe.contains(".."));
        }
    }

    /// PROPERTY: sanitizing twice is the same as sanitizing once.
    #[test]
    fn property_sanitize_is_idempotent(name in "\\PC{0,40}") {
        if let Some(safe) = sanitize_file_name(&name) {
            prop_assert_eq!(sanitize_file_name(&safe), Some(safe.clone()));
        }
    }

    /// PROPERTY: traversal attempts never survive.
    #[test]
    fn property_traversal_is_neutralized(depth in 1usize..5, leaf in "[a-z]{1,8}") {
        let name = format!("{}{}", "../".repeat(depth), leaf);
        prop_assert_eq!(sanitize_file_name(&name), Some(leaf));
    }
}
