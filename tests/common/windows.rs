//! Home directory isolation helpers.
//!
//! On Windows, `dirs::home_dir()` uses the system API rather than `HOME` or
//! `USERPROFILE`, so setting those has no effect there. `CAIRN_TEST_HOME`
//! overrides the resolved home on every platform.

use std::path::Path;
use std::process::Command;

/// Extension trait for Command to isolate the home directory.
pub trait WindowsCompatExt {
    /// Set `HOME`, `USERPROFILE` and `CAIRN_TEST_HOME` to `home`, and clear
    /// any `CAIRN_*` overrides inherited from the developer's shell.
    fn with_test_home(&mut self, home: &Path) -> &mut Self;
}

impl WindowsCompatExt for Command {
    fn with_test_home(&mut self, home: &Path) -> &mut Self {
        for var in [
            "CAIRN_LOCK_TIMEOUT_MS",
            "CAIRN_LOCK_STALE_MS",
            "CAIRN_MAX_CONCURRENCY",
            "CAIRN_STRATEGY",
            "CAIRN_BACKUP_DIR",
            "CAIRN_LOCK_DIR",
            "RUST_LOG",
        ] {
            self.env_remove(var);
        }
        self.env("HOME", home)
            .env("USERPROFILE", home)
            .env("CAIRN_TEST_HOME", home)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_test_home() {
        let mut cmd = Command::new("echo");
        cmd.with_test_home(Path::new("/tmp/test_home"));

        let envs: Vec<_> = cmd.get_envs().collect();
        assert!(envs
            .iter()
            .any(|(k, v)| *k == "CAIRN_TEST_HOME" && v.is_some()));
    }
}
