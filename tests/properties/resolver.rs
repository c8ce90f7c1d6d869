//! Property tests for conflict resolution.

use std::path::Path;

use proptest::prelude::*;

use cairn::domain::ports::NoSnapshots;
use cairn::domain::services::{ConflictResolver, ResolveRequest};
use cairn::domain::value_objects::{ConflictStrategy, ContentCategory, MergeStrategy};

fn resolve(strategy: ConflictStrategy, existing: Option<&str>, incoming: &str) -> Option<String> {
    let request = ResolveRequest {
        path: Path::new("/p/.kiro/steering/rules.md"),
        existing,
        incoming,
        category: ContentCategory::Prose,
        strategy,
        merge: MergeStrategy::SectionMerge,
    };
    ConflictResolver::new()
        .resolve(&request, &NoSnapshots)
        .final_content
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 96,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: overwrite always lands on the incoming content, and
    /// deploying it again changes nothing.
    #[test]
    fn property_overwrite_is_idempotent(existing in proptest::option::of("[a-z \n]{0,30}"), incoming in "[a-z \n]{0,30}") {
        let first = resolve(ConflictStrategy::Overwrite, existing.as_deref(), &incoming);
        prop_assert_eq!(first.as_deref(), Some(incoming.as_str()));

        let second = resolve(ConflictStrategy::Overwrite, first.as_deref(), &incoming);
        prop_assert_eq!(second, first);
    }

    /// PROPERTY: skip never produces content for an existing file.
    #[test]
    fn property_skip_never_writes_over_existing(existing in "[a-z]{0,20}", incoming in "[a-z]{0,20}") {
        prop_assert_eq!(resolve(ConflictStrategy::Skip, Some(&existing), &incoming), None);
    }
}
