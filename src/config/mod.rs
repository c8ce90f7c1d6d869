//! Engine configuration
//!
//! Precedence, highest first:
//! 1. CLI flags
//! 2. Environment variables (`CAIRN_*`)
//! 3. `--config <path>`, else `~/.cairn/config.toml`
//! 4. Built-in defaults

mod env_validator;
mod loader;
mod types;

pub use env_validator::{levenshtein, EnvVarValidator};
pub use loader::{
    env_lookup, load, load_with_warnings, with_env_overrides, ConfigWarning, CONFIG_FILE,
};
pub use types::{BackupConfig, DeployConfig, EngineConfig, LockConfig, PerformanceConfig};
