//! Custom assertion macros for CLI tests.
//!
//! These macros provide descriptive failure messages to aid debugging.

use std::path::Path;

/// List all files in a directory recursively (for debugging)
pub fn list_all_files(dir: &Path) -> Vec<String> {
    let mut files = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                files.extend(list_all_files(&path));
            } else {
                files.push(path.display().to_string());
            }
        }
    }
    files
}

/// Assert that a file was deployed relative to the project root.
#[macro_export]
macro_rules! assert_deployed {
    ($env:expr, $path:expr) => {
        let full_path = $env.project_path($path);
        assert!(
            full_path.exists(),
            "Expected file at '{}', but it doesn't exist.\n\
             Files found:\n  {}",
            $path,
            $crate::common::list_all_files($env.project_root.path()).join("\n  ")
        );
    };
}

/// Assert that a file was NOT deployed relative to the project root.
#[macro_export]
macro_rules! assert_not_deployed {
    ($env:expr, $path:expr) => {
        let full_path = $env.project_path($path);
        assert!(
            !full_path.exists(),
            "Expected '{}' to NOT exist, but it does.",
            $path
        );
    };
}

/// Assert that output (stdout or stderr) contains expected pattern.
#[macro_export]
macro_rules! assert_output_contains {
    ($result:expr, $pattern:expr) => {
        assert!(
            $result.stdout.contains($pattern) || $result.stderr.contains($pattern),
            "Expected output to contain '{}'\n\
             stdout:\n{}\n\
             stderr:\n{}",
            $pattern,
            $result.stdout,
            $result.stderr
        );
    };
}

/// Assert the process exit code, printing output on mismatch.
#[macro_export]
macro_rules! assert_exit_code {
    ($result:expr, $code:expr) => {
        assert_eq!(
            $result.exit_code,
            $code,
            "unexpected exit code\nstdout:\n{}\nstderr:\n{}",
            $result.stdout,
            $result.stderr
        );
    };
}
