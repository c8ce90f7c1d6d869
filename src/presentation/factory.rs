//! Orchestrator Factory
//!
//! Wires infrastructure into the deployment orchestrator.

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use is_terminal::IsTerminal;

use crate::application::DeploymentOrchestrator;
use crate::config::EngineConfig;
use crate::domain::ports::{ConflictPrompt, DeployEventSink};
use crate::domain::services::TtlCache;
use crate::domain::value_objects::ConflictStrategy;
use crate::infrastructure::{
    FileLockService, InteractivePrompt, JsonEventSink, LocalFs, LogEventSink,
};

/// Orchestrator backed by the local filesystem, with lock and backup roots
/// resolved from `config` under `state_dir`
pub fn create_orchestrator(config: &EngineConfig, state_dir: &Path) -> DeploymentOrchestrator {
    let cache = Arc::new(TtlCache::new(
        config.performance.cache_capacity,
        config.cache_ttl(),
    ));
    DeploymentOrchestrator::new(
        Arc::new(LocalFs::new()),
        FileLockService::new(config.lock_dir(state_dir)),
        config.backup_dir(state_dir),
        cache,
    )
}

/// NDJSON on stdout when streaming, otherwise events go to the log
pub fn event_sink(stream: bool) -> Arc<dyn DeployEventSink> {
    if stream {
        Arc::new(JsonEventSink::stdout())
    } else {
        Arc::new(LogEventSink)
    }
}

/// Terminal prompt for the `prompt` strategy when stdin is interactive
pub fn conflict_prompt(strategy: ConflictStrategy) -> Option<Arc<dyn ConflictPrompt>> {
    if strategy == ConflictStrategy::Prompt && std::io::stdin().is_terminal() {
        Some(Arc::new(InteractivePrompt::new()))
    } else {
        None
    }
}

/// Orchestrator for a CLI run: events, prompt and cancellation attached
pub fn create_cli_orchestrator(
    config: &EngineConfig,
    state_dir: &Path,
    strategy: ConflictStrategy,
    stream_events: bool,
    cancel: Arc<AtomicBool>,
) -> DeploymentOrchestrator {
    let orchestrator = create_orchestrator(config, state_dir)
        .with_events(event_sink(stream_events))
        .with_cancel_flag(cancel);
    match conflict_prompt(strategy) {
        Some(prompt) => orchestrator.with_prompt(prompt),
        None => orchestrator,
    }
}
