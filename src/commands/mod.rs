//! Subcommand runners
//!
//! Each runner returns the process exit code; `Err` is reserved for
//! environment problems (unreadable config, no home directory).

pub mod deploy;
pub mod scan;
pub mod unlock;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use cairn::config::{self, EngineConfig};
use cairn::domain::entities::Context;
use cairn::infrastructure::{cairn_home_dir, cairn_state_dir};

/// Flags shared by every subcommand
pub struct Globals {
    pub json: bool,
    pub verbose: u8,
    pub config: Option<PathBuf>,
}

pub fn load_context(path: &Path) -> Result<Context> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read context {}", path.display()))?;
    Context::from_json(&content)
        .with_context(|| format!("invalid context JSON in {}", path.display()))
}

pub fn home_dir() -> Result<PathBuf> {
    cairn_home_dir().context("cannot determine home directory")
}

pub fn state_dir() -> Result<PathBuf> {
    cairn_state_dir().context("cannot determine home directory")
}

/// File config plus `CAIRN_*` overrides; warnings go to stderr
pub fn load_config(explicit: Option<&Path>, state_dir: &Path) -> Result<EngineConfig> {
    let (config, mut warnings) = config::load(explicit, Some(state_dir))?;
    let (config, env_warnings) = config::with_env_overrides(config, config::env_lookup);
    warnings.extend(env_warnings);
    for warning in &warnings {
        eprintln!("[WARN] {}", warning);
    }
    Ok(config)
}

/// Absolute project path, so the lock key does not depend on the cwd
pub fn project_dir(path: &Path) -> Result<PathBuf> {
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()
        .context("cannot determine current directory")?
        .join(path))
}

pub fn print_error(err: &anyhow::Error, json: bool) {
    if json {
        let output = serde_json::json!({
            "event": "error",
            "message": format!("{:#}", err),
        });
        println!("{}", output);
        return;
    }
    eprintln!("[ERROR] {:#}", err);
}
