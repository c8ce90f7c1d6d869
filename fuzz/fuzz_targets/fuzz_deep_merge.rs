#![no_main]

use libfuzzer_sys::fuzz_target;

use cairn::domain::services::{array_append, deep_merge};

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };
    let Some((left, right)) = content.split_once('\u{0}') else {
        return;
    };
    let (Ok(existing), Ok(incoming)) = (
        serde_json::from_str::<serde_json::Value>(left),
        serde_json::from_str::<serde_json::Value>(right),
    ) else {
        return;
    };

    // Merging with itself is a fixed point for deep-merge
    let merged = deep_merge(existing.clone(), incoming.clone());
    assert_eq!(deep_merge(merged.clone(), incoming.clone()), merged);
    let _ = array_append(existing, incoming);
});
