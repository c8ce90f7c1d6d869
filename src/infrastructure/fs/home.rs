//! Home directory resolution with test isolation support.
//!
//! On Windows, `dirs::home_dir()` uses the Windows system API rather than
//! environment variables, so setting `HOME` in tests has no effect there.
//! `cairn_home_dir()` checks `CAIRN_TEST_HOME` first and falls back to
//! `dirs::home_dir()`.
//!
//! Everything cairn derives from the home directory (platform directories,
//! `~/.cairn/locks`, `~/.cairn/backups`, `~/.cairn/config.toml`) goes through
//! this function.

use std::path::PathBuf;

/// Environment variable for test isolation of home directory.
pub const CAIRN_TEST_HOME_VAR: &str = "CAIRN_TEST_HOME";

/// Get the home directory for cairn paths.
///
/// # Example
///
/// ```
/// use cairn::infrastructure::fs::cairn_home_dir;
///
/// if let Some(home) = cairn_home_dir() {
///     let locks = home.join(".cairn/locks");
/// }
/// ```
pub fn cairn_home_dir() -> Option<PathBuf> {
    std::env::var_os(CAIRN_TEST_HOME_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
}

/// `~/.cairn`, the engine's own state directory
pub fn cairn_state_dir() -> Option<PathBuf> {
    cairn_home_dir().map(|home| home.join(".cairn"))
}
