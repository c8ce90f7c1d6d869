#![no_main]

use libfuzzer_sys::fuzz_target;

use cairn::domain::services::{preserve_task_status, section_merge};

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };
    let (existing, incoming) = content.split_once('\u{0}').unwrap_or((content, ""));

    let preserved = preserve_task_status(existing, incoming);
    // Only checkbox markers may change
    assert_eq!(preserved.len(), incoming.len());
    let _ = section_merge(existing, incoming);
});
