//! Configuration loading

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::ConflictStrategy;
use crate::error::ConfigError;

use super::env_validator::{levenshtein, EnvVarValidator};
use super::types::EngineConfig;

/// File name of the engine config inside the state directory
pub const CONFIG_FILE: &str = "config.toml";

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Key in the config file that no section understands
    UnknownKey {
        key: String,
        file: PathBuf,
        line: Option<usize>,
        suggestion: Option<String>,
    },
    /// Environment override that failed to parse and was ignored
    InvalidEnv {
        var: String,
        value: String,
        expected: String,
        suggestion: Option<String>,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::UnknownKey {
                key,
                file,
                line,
                suggestion,
            } => {
                write!(f, "unknown config key '{}' in {}", key, file.display())?;
                if let Some(line) = line {
                    write!(f, ":{}", line)?;
                }
                if let Some(suggestion) = suggestion {
                    write!(f, " (did you mean '{}'?)", suggestion)?;
                }
                Ok(())
            }
            ConfigWarning::InvalidEnv {
                var,
                value,
                expected,
                suggestion,
            } => {
                write!(f, "ignoring {}='{}': expected {}", var, value, expected)?;
                if let Some(suggestion) = suggestion {
                    write!(f, " (did you mean '{}'?)", suggestion)?;
                }
                Ok(())
            }
        }
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> Result<(EngineConfig, Vec<ConfigWarning>), ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);

    let config: EngineConfig = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|path_str| {
            let key = path_str
                .split('.')
                .next_back()
                .unwrap_or(path_str.as_str())
                .to_string();
            ConfigWarning::UnknownKey {
                line: find_line_number(&content, &key),
                suggestion: suggest_key(&key),
                file: path.to_path_buf(),
                key,
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load from an explicit path, `<state_dir>/config.toml`, or defaults.
///
/// A missing explicit path is an error; a missing default file is not.
pub fn load(
    explicit: Option<&Path>,
    state_dir: Option<&Path>,
) -> Result<(EngineConfig, Vec<ConfigWarning>), ConfigError> {
    if let Some(path) = explicit {
        return load_with_warnings(path);
    }

    if let Some(dir) = state_dir {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            log::debug!("loading config from {}", path.display());
            return load_with_warnings(&path);
        }
    }

    Ok((EngineConfig::default(), Vec::new()))
}

/// Apply `CAIRN_*` environment overrides.
///
/// `lookup` resolves a variable name; pass [`env_lookup`] outside tests.
pub fn with_env_overrides<F>(mut config: EngineConfig, lookup: F) -> (EngineConfig, Vec<ConfigWarning>)
where
    F: Fn(&str) -> Option<String>,
{
    let mut warnings = Vec::new();
    let millis = |s: &str| s.parse::<u64>().ok();
    let positive = |s: &str| s.parse::<usize>().ok().filter(|n| *n > 0);

    if let Some(value) = lookup("CAIRN_LOCK_TIMEOUT_MS") {
        match EnvVarValidator::new("CAIRN_LOCK_TIMEOUT_MS", "milliseconds").parse(&value, millis) {
            Ok(ms) => config.lock.timeout_ms = ms,
            Err(warning) => warnings.push(warning),
        }
    }

    if let Some(value) = lookup("CAIRN_LOCK_STALE_MS") {
        match EnvVarValidator::new("CAIRN_LOCK_STALE_MS", "milliseconds").parse(&value, millis) {
            Ok(ms) => config.lock.stale_ms = ms,
            Err(warning) => warnings.push(warning),
        }
    }

    if let Some(value) = lookup("CAIRN_MAX_CONCURRENCY") {
        match EnvVarValidator::new("CAIRN_MAX_CONCURRENCY", "a positive integer")
            .parse(&value, positive)
        {
            Ok(n) => config.performance.max_concurrency = n,
            Err(warning) => warnings.push(warning),
        }
    }

    if let Some(value) = lookup("CAIRN_STRATEGY") {
        const STRATEGIES: &[&str] = &["skip", "overwrite", "merge", "backup", "prompt"];
        let parsed = EnvVarValidator::new("CAIRN_STRATEGY", "one of skip, overwrite, merge, backup, prompt")
            .with_candidates(STRATEGIES)
            .parse(&value, parse_strategy);
        match parsed {
            Ok(strategy) => config.deploy.strategy = strategy,
            Err(warning) => warnings.push(warning),
        }
    }

    if let Some(dir) = lookup("CAIRN_BACKUP_DIR").filter(|v| !v.trim().is_empty()) {
        config.backup.dir = Some(PathBuf::from(dir));
    }

    if let Some(dir) = lookup("CAIRN_LOCK_DIR").filter(|v| !v.trim().is_empty()) {
        config.lock.dir = Some(PathBuf::from(dir));
    }

    (config, warnings)
}

/// Process environment lookup for [`with_env_overrides`]
pub fn env_lookup(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

fn parse_strategy(value: &str) -> Option<ConflictStrategy> {
    match value.to_lowercase().as_str() {
        "skip" => Some(ConflictStrategy::Skip),
        "overwrite" => Some(ConflictStrategy::Overwrite),
        "merge" => Some(ConflictStrategy::Merge),
        "backup" => Some(ConflictStrategy::Backup),
        "prompt" => Some(ConflictStrategy::Prompt),
        _ => None,
    }
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn suggest_key(unknown: &str) -> Option<String> {
    const CANDIDATES: &[&str] = &[
        "lock",
        "dir",
        "timeout_ms",
        "retry_ms",
        "stale_ms",
        "backup",
        "keep",
        "retain",
        "performance",
        "max_concurrency",
        "chunk_size",
        "streaming_threshold",
        "parallel_threshold",
        "cache_ttl_secs",
        "cache_capacity",
        "deploy",
        "strategy",
        "continue_on_error",
    ];

    CANDIDATES
        .iter()
        .map(|candidate| (*candidate, levenshtein(unknown, candidate)))
        .min_by_key(|(_, dist)| *dist)
        .filter(|(_, dist)| *dist <= 2)
        .map(|(candidate, _)| candidate.to_string())
}
