#![no_main]

use libfuzzer_sys::fuzz_target;

use cairn::domain::policies::{validate_context, ComponentSelection};
use cairn::domain::services::SecurityScanner;
use cairn::{Context, Platform};

fuzz_target!(|data: &[u8]| {
    let Ok(content) = std::str::from_utf8(data) else {
        return;
    };
    // Parsing, validating and scanning arbitrary contexts must never panic
    let Ok(context) = Context::from_json(content) else {
        return;
    };
    let _ = context.fingerprint();
    for platform in Platform::ALL {
        let _ = validate_context(&context, platform, &ComponentSelection::default());
    }
    let _ = SecurityScanner::new().scan_context(&context);
});
