//! Test environment builder for isolated Cairn testing.
//!
//! Provides `TestEnv` - an isolated test environment with temp directories
//! for both project and home, plus helpers to run Cairn CLI commands.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

use super::windows::WindowsCompatExt;

/// Result of running a Cairn CLI command
#[derive(Debug)]
pub struct TestResult {
    pub success: bool,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl TestResult {
    /// Check if command succeeded
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Combine stdout and stderr
    pub fn combined_output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Parse stdout as one JSON document
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{}", self.stdout))
    }
}

/// Isolated test environment with temp directories.
///
/// Provides:
/// - Isolated project directory
/// - Isolated home directory (locks, backups and config live under `~/.cairn`)
/// - CLI command execution helpers
pub struct TestEnv {
    /// Temporary directory for the project
    pub project_root: TempDir,
    /// Temporary directory for HOME
    pub home_dir: TempDir,
    /// Path to the cairn binary
    cairn_bin: PathBuf,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            project_root: TempDir::new().expect("Failed to create project dir"),
            home_dir: TempDir::new().expect("Failed to create home dir"),
            cairn_bin: PathBuf::from(env!("CARGO_BIN_EXE_cairn")),
        }
    }

    /// Get path relative to project root
    pub fn project_path(&self, relative: &str) -> PathBuf {
        self.project_root.path().join(relative)
    }

    /// Get path relative to home directory
    pub fn home_path(&self, relative: &str) -> PathBuf {
        self.home_dir.path().join(relative)
    }

    /// `~/.cairn`
    pub fn state_path(&self, relative: &str) -> PathBuf {
        self.home_path(".cairn").join(relative)
    }

    /// Write a context bundle into the project and return its path
    pub fn write_context(&self, json: &str) -> String {
        let path = self.project_path("context.json");
        std::fs::write(&path, json).expect("Failed to write context");
        path.display().to_string()
    }

    /// Run cairn CLI in this environment from project root
    pub fn run(&self, args: &[&str]) -> TestResult {
        self.run_with_env(args, &[])
    }

    /// Run cairn CLI from project root with extra env vars.
    pub fn run_with_env(&self, args: &[&str], env_vars: &[(&str, &str)]) -> TestResult {
        let mut cmd = Command::new(&self.cairn_bin);
        cmd.current_dir(self.project_root.path())
            .args(args)
            .with_test_home(self.home_dir.path());

        for (key, value) in env_vars {
            cmd.env(key, value);
        }

        let output = cmd.output().expect("Failed to execute cairn");

        self.output_to_result(output)
    }

    /// `cairn deploy --context <ctx> --platform <p> --project <root> <extra>`
    pub fn deploy(&self, context: &str, platform: &str, extra: &[&str]) -> TestResult {
        let project = self.project_root.path().display().to_string();
        let mut args = vec![
            "deploy",
            "--context",
            context,
            "--platform",
            platform,
            "--project",
            project.as_str(),
        ];
        args.extend_from_slice(extra);
        self.run(&args)
    }

    fn output_to_result(&self, output: Output) -> TestResult {
        TestResult {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// Read a deployed project file
    pub fn read_project_file(&self, relative_path: &str) -> String {
        let full_path = self.project_path(relative_path);
        std::fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("Failed to read deployed file {}: {}", relative_path, e))
    }

    /// Read a deployed home file
    pub fn read_home_file(&self, relative_path: &str) -> String {
        let full_path = self.home_path(relative_path);
        std::fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("Failed to read deployed file {}: {}", relative_path, e))
    }

    /// Write a file to the project directory
    pub fn write_project_file(&self, relative_path: &str, content: &str) {
        write_file(&self.project_path(relative_path), content);
    }

    /// Write a file to the home directory
    pub fn write_home_file(&self, relative_path: &str, content: &str) {
        write_file(&self.home_path(relative_path), content);
    }

    /// Every file under project and home (path, content), excluding the
    /// engine's own state under `~/.cairn`
    pub fn snapshot(&self) -> Vec<(PathBuf, Vec<u8>)> {
        let state = self.state_path("");
        let mut files = Vec::new();
        collect(self.project_root.path(), &mut files);
        collect(self.home_dir.path(), &mut files);
        files.retain(|(path, _)| !path.starts_with(&state));
        files.sort();
        files
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create directories");
    }
    std::fs::write(path, content).expect("Failed to write file");
}

fn collect(dir: &Path, files: &mut Vec<(PathBuf, Vec<u8>)>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect(&path, files);
        } else if let Ok(content) = std::fs::read(&path) {
            files.push((path, content));
        }
    }
}
