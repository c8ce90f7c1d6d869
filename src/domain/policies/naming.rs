//! File naming policy
//!
//! Destination file names are derived from user-supplied document names, so
//! they are normalized before touching the file system.

/// Sanitize a document name into a safe file stem.
///
/// Lower-cases the name and replaces every character outside
/// `[a-z0-9._-]` with a hyphen. Runs of hyphens or dots collapse to one, and leading
/// dots or hyphens are stripped so the result can never name a hidden file or
/// traverse upwards. Returns `None` when nothing usable remains.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let mut out = String::with_capacity(name.len());
    for ch in name.trim().chars().flat_map(char::to_lowercase) {
        let mapped = if ch.is_ascii_alphanumeric() || ch == '.' || ch == '_' || ch == '-' {
            ch
        } else {
            '-'
        };
        if mapped == '-' && out.ends_with('-') {
            continue;
        }
        out.push(mapped);
    }

    let mut trimmed = out
        .trim_start_matches(['.', '-'])
        .trim_end_matches('-')
        .to_string();
    while trimmed.contains("..") {
        trimmed = trimmed.replace("..", ".");
    }

    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
