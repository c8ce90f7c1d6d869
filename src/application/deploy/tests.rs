//! Deployment Orchestrator Tests

use super::*;
use crate::domain::entities::Context;
use crate::domain::ports::{ConflictChoice, DeployEvent, DeployEventSink, FixedPrompt};
use crate::domain::services::{Dispatch, TtlCache};
use crate::domain::value_objects::{ComponentKind, ConflictStrategy, Platform};
use crate::error::{codes, OptionsError};
use crate::infrastructure::fs::LocalFs;
use crate::infrastructure::lock::{FileLockService, LockOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::{tempdir, TempDir};

struct Harness {
    _dir: TempDir,
    home: PathBuf,
    project: PathBuf,
    state: PathBuf,
}

impl Harness {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let home = dir.path().join("home");
        let project = dir.path().join("project");
        let state = dir.path().join("state");
        fs::create_dir_all(&home).unwrap();
        fs::create_dir_all(&project).unwrap();
        Self {
            _dir: dir,
            home,
            project,
            state,
        }
    }

    fn lock_dir(&self) -> PathBuf {
        self.state.join("locks")
    }

    fn backup_dir(&self) -> PathBuf {
        self.state.join("backups")
    }

    fn orchestrator(&self) -> DeploymentOrchestrator {
        DeploymentOrchestrator::new(
            Arc::new(LocalFs::new()),
            FileLockService::new(self.lock_dir()),
            self.backup_dir(),
            Arc::new(TtlCache::new(16, Duration::from_secs(300))),
        )
    }

    fn options(&self) -> DeploymentOptions {
        DeploymentOptions::new(Platform::Kiro, &self.project, &self.home)
            .with_lock_timeout(Duration::from_millis(300))
    }

    fn lock_path(&self) -> PathBuf {
        let service = FileLockService::new(self.lock_dir());
        service.lock_path(&FileLockService::resource_for(Platform::Kiro, &self.project))
    }

    fn settings(&self) -> PathBuf {
        self.home.join(".kiro/settings.json")
    }

    fn steering(&self, name: &str) -> PathBuf {
        self.project.join(format!(".kiro/steering/{name}.md"))
    }

    fn write(&self, path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
}

fn context(json: &str) -> Context {
    Context::from_json(json).unwrap()
}

fn settings_and_steering() -> Context {
    context(
        r#"{
            "metadata": {"id": "ctx-1", "version": "v1"},
            "platforms": {"kiro": {
                "settings": {"theme": "dark"},
                "steering": [{"name": "rules", "content": "Be precise."}]
            }}
        }"#,
    )
}

struct RecordingEventSink {
    events: Mutex<Vec<DeployEvent>>,
}

impl RecordingEventSink {
    fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn states(&self) -> Vec<&'static str> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                DeployEvent::StateChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }
}

impl DeployEventSink for RecordingEventSink {
    fn on_event(&self, event: DeployEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[test]
fn deploys_all_components_and_releases_lock() {
    let h = Harness::new();
    let result = h
        .orchestrator()
        .execute(&settings_and_steering(), &h.options())
        .unwrap();

    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.status, DeploymentStatus::Success);
    assert_eq!(
        result.deployed_components,
        vec![ComponentKind::Settings, ComponentKind::Steering]
    );
    assert_eq!(result.summary.files_deployed, 2);
    assert!(h.settings().exists());
    assert!(h.steering("rules").exists());
    assert!(!h.lock_path().exists());
    assert_eq!(
        result.states,
        vec![
            DeployState::Idle,
            DeployState::Validating,
            DeployState::SecurityScanning,
            DeployState::Locking,
            DeployState::Deploying,
            DeployState::Finalizing,
            DeployState::Released,
        ]
    );
}

#[test]
fn dry_run_mutates_nothing() {
    let h = Harness::new();
    h.write(&h.settings(), r#"{"theme":"light"}"#);

    let result = h
        .orchestrator()
        .execute(&settings_and_steering(), &h.options().with_dry_run(true))
        .unwrap();

    assert!(result.success);
    assert!(result.dry_run);
    assert_eq!(result.summary.files_deployed, 0);
    assert_eq!(result.planned_files.len(), 2);
    assert_eq!(fs::read_to_string(h.settings()).unwrap(), r#"{"theme":"light"}"#);
    assert!(!h.steering("rules").exists());
    assert!(!h.lock_path().exists());
    assert!(result.states.contains(&DeployState::DryRunReport));
    assert!(!result.states.contains(&DeployState::Deploying));
    // Conflict detection still ran
    assert_eq!(result.conflicts.len(), 1);
}

#[test]
fn skip_keeps_existing_settings() {
    let h = Harness::new();
    h.write(&h.settings(), r#"{"theme":"light"}"#);
    let ctx = context(
        r#"{"platforms": {"kiro": {"settings": {"theme": "dark", "fontSize": 14}}}}"#,
    );

    let result = h
        .orchestrator()
        .execute(&ctx, &h.options().with_strategy(ConflictStrategy::Skip))
        .unwrap();

    assert!(result.success);
    assert_eq!(fs::read_to_string(h.settings()).unwrap(), r#"{"theme":"light"}"#);
    assert_eq!(result.summary.files_skipped, 1);
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].code, codes::CONFLICT_SKIPPED);
}

#[test]
fn validation_failure_never_locks() {
    let h = Harness::new();
    let ctx = context(r#"{"platforms": {"cursor": {"settings": {}}}}"#);

    let result = h.orchestrator().execute(&ctx, &h.options()).unwrap();

    assert!(!result.success);
    assert!(result.has_error_code(codes::VALIDATION_FAILED));
    assert_eq!(
        result.states,
        vec![
            DeployState::Idle,
            DeployState::Validating,
            DeployState::Finalizing,
            DeployState::Released,
        ]
    );
    assert!(!h.lock_dir().exists());
}

#[test]
fn invalid_options_fail_before_any_state() {
    let h = Harness::new();
    let err = h
        .orchestrator()
        .execute(&settings_and_steering(), &h.options().with_max_concurrency(0))
        .unwrap_err();
    assert_eq!(err, OptionsError::ZeroConcurrency);
}

#[test]
fn security_blockers_refuse_all_writes() {
    let h = Harness::new();
    let ctx = context(
        r#"{"platforms": {"kiro": {
            "settings": {"apiKey": "sk-ant-REDACTED"},
            "steering": [{"name": "rules", "content": "x"}]
        }}}"#,
    );

    let result = h.orchestrator().execute(&ctx, &h.options()).unwrap();

    assert!(!result.success);
    assert!(result.has_error_code(codes::SECURITY_CHECK_FAILED));
    assert!(!h.settings().exists());
    assert!(!h.steering("rules").exists());
    assert!(!result.states.contains(&DeployState::Locking));
}

#[test]
fn security_blockers_only_warn_in_dry_run() {
    let h = Harness::new();
    let ctx = context(
        r#"{"platforms": {"kiro": {"settings": {"apiKey": "sk-ant-REDACTED"}}}}"#,
    );

    let result = h
        .orchestrator()
        .execute(&ctx, &h.options().with_dry_run(true))
        .unwrap();

    assert!(result.success);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.code == codes::SECURITY_CHECK_FAILED));
    assert!(!h.settings().exists());
}

#[test]
fn validate_only_stops_after_scanning() {
    let h = Harness::new();
    let result = h
        .orchestrator()
        .execute(
            &settings_and_steering(),
            &h.options().with_validate_only(true).with_dry_run(true),
        )
        .unwrap();

    assert!(result.success);
    assert!(!result.dry_run);
    assert_eq!(
        result.states,
        vec![
            DeployState::Idle,
            DeployState::Validating,
            DeployState::SecurityScanning,
            DeployState::Finalizing,
            DeployState::Released,
        ]
    );
    assert!(!h.settings().exists());
    assert!(!h.lock_dir().exists());
}

#[test]
fn held_lock_times_out_without_writes() {
    let h = Harness::new();
    let other = FileLockService::new(h.lock_dir());
    let resource = FileLockService::resource_for(Platform::Kiro, &h.project);
    let held = other.acquire(&resource, &LockOptions::default()).unwrap();

    let result = h
        .orchestrator()
        .execute(&settings_and_steering(), &h.options())
        .unwrap();

    assert!(!result.success);
    assert!(result.has_error_code(codes::LOCK_TIMEOUT));
    assert!(!h.settings().exists());
    assert!(!result.states.contains(&DeployState::Deploying));
    // The other holder keeps its lock
    assert!(h.lock_path().exists());
    other.release(&held).unwrap();
}

#[test]
fn stale_lock_from_dead_process_is_taken_over() {
    let h = Harness::new();
    let mut child = std::process::Command::new("true").spawn().unwrap();
    let dead_pid = child.id();
    child.wait().unwrap();

    let old = chrono::Utc::now() - chrono::Duration::minutes(30);
    h.write(
        &h.lock_path(),
        &serde_json::json!({
            "resource": "stale",
            "pid": dead_pid,
            "hostname": "",
            "token": "old-token",
            "acquired_at": old,
            "lease_ms": 1000,
        })
        .to_string(),
    );

    let result = h
        .orchestrator()
        .execute(
            &settings_and_steering(),
            &h.options().with_lock_stale_after(Duration::from_secs(60)),
        )
        .unwrap();

    assert!(result.success, "{:?}", result.errors);
    assert!(!result.has_error_code(codes::LOCK_TIMEOUT));
    assert!(!h.lock_path().exists());
}

#[test]
fn failure_under_backup_rolls_back_earlier_components() {
    let h = Harness::new();
    h.write(&h.settings(), r#"{"theme":"light"}"#);
    // A file where the steering directory should be makes steering fail
    h.write(&h.project.join(".kiro/steering"), "not a directory");
    let ctx = context(
        r#"{"platforms": {"kiro": {
            "settings": {"theme": "dark"},
            "agents": [{"name": "reviewer", "content": {"role": "review"}}],
            "steering": [{"name": "rules", "content": "Be precise."}]
        }}}"#,
    );

    let result = h
        .orchestrator()
        .execute(&ctx, &h.options().with_strategy(ConflictStrategy::Backup))
        .unwrap();

    assert!(!result.success);
    assert!(result.rolled_back);
    assert_eq!(result.status, DeploymentStatus::Failed);
    assert!(result.summary.backup_created);
    assert_eq!(result.summary.files_deployed, 0);
    assert!(result
        .warnings
        .iter()
        .any(|w| w.code == codes::ROLLBACK_PERFORMED));
    assert_eq!(fs::read_to_string(h.settings()).unwrap(), r#"{"theme":"light"}"#);
    assert!(!h.home.join(".kiro/agents/reviewer.json").exists());
    assert!(!h.lock_path().exists());
}

#[test]
fn successful_backup_is_discarded_unless_kept() {
    let h = Harness::new();
    h.write(&h.settings(), r#"{"theme":"light"}"#);
    let ctx = context(r#"{"platforms": {"kiro": {"settings": {"theme": "dark"}}}}"#);

    let kept = h
        .orchestrator()
        .execute(&ctx, &h.options().with_strategy(ConflictStrategy::Backup))
        .unwrap();
    let backup_dir = kept.backup_dir.clone().unwrap();
    assert!(backup_dir.join("manifest.json").exists());

    h.write(&h.settings(), r#"{"theme":"light"}"#);
    let discarded = h
        .orchestrator()
        .execute(
            &ctx,
            &h.options()
                .with_strategy(ConflictStrategy::Backup)
                .with_keep_backups(false),
        )
        .unwrap();
    assert!(discarded.summary.backup_created);
    assert!(discarded.backup_dir.is_none());
    assert!(backup_dir.exists());
}

#[test]
fn component_failure_is_isolated_by_default() {
    let h = Harness::new();
    fs::create_dir_all(h.settings()).unwrap();

    let result = h
        .orchestrator()
        .execute(&settings_and_steering(), &h.options())
        .unwrap();

    assert_eq!(result.status, DeploymentStatus::Partial);
    assert!(result.success);
    assert_eq!(result.deployed_components, vec![ComponentKind::Steering]);
    assert!(result.has_error_code(codes::FILESYSTEM_ERROR));
    assert!(h.steering("rules").exists());
}

#[test]
fn stop_on_first_failure_skips_remaining_components() {
    let h = Harness::new();
    fs::create_dir_all(h.settings()).unwrap();

    let result = h
        .orchestrator()
        .execute(
            &settings_and_steering(),
            &h.options().with_continue_on_error(false),
        )
        .unwrap();

    assert!(result.skipped_components.contains(&ComponentKind::Steering));
    assert!(!h.steering("rules").exists());
    assert!(!result.success);
}

#[test]
fn include_filter_limits_components() {
    let h = Harness::new();
    let result = h
        .orchestrator()
        .execute(
            &settings_and_steering(),
            &h.options().with_include(vec![ComponentKind::Steering]),
        )
        .unwrap();

    assert_eq!(result.deployed_components, vec![ComponentKind::Steering]);
    assert_eq!(result.skipped_components, vec![ComponentKind::Settings]);
    assert!(!h.settings().exists());
}

#[test]
fn cancellation_stops_dispatch_and_still_releases() {
    let h = Harness::new();
    let cancel = Arc::new(AtomicBool::new(true));

    let result = h
        .orchestrator()
        .with_cancel_flag(cancel)
        .execute(&settings_and_steering(), &h.options())
        .unwrap();

    assert!(!result.success);
    assert!(result.has_error_code(codes::CANCELLED));
    assert_eq!(result.skipped_components.len(), 2);
    assert!(!h.settings().exists());
    assert!(!h.lock_path().exists());
}

#[test]
fn prompt_without_interactive_caller_stays_unresolved() {
    let h = Harness::new();
    h.write(&h.settings(), r#"{"theme":"light"}"#);
    let ctx = context(r#"{"platforms": {"kiro": {"settings": {"theme": "dark"}}}}"#);

    let result = h
        .orchestrator()
        .execute(&ctx, &h.options().with_strategy(ConflictStrategy::Prompt))
        .unwrap();

    assert!(result.has_error_code(codes::CONFLICT_UNRESOLVED));
    assert_eq!(fs::read_to_string(h.settings()).unwrap(), r#"{"theme":"light"}"#);
}

#[test]
fn prompt_answer_is_applied() {
    let h = Harness::new();
    h.write(&h.settings(), r#"{"theme":"light"}"#);
    let ctx = context(r#"{"platforms": {"kiro": {"settings": {"theme": "dark"}}}}"#);

    let result = h
        .orchestrator()
        .with_prompt(Arc::new(FixedPrompt(ConflictChoice::Overwrite)))
        .execute(&ctx, &h.options().with_strategy(ConflictStrategy::Prompt))
        .unwrap();

    assert!(result.success, "{:?}", result.errors);
    assert_eq!(
        fs::read_to_string(h.settings()).unwrap(),
        "{\n  \"theme\": \"dark\"\n}\n"
    );
}

#[test]
fn many_components_dispatch_in_parallel_with_metrics() {
    let h = Harness::new();
    let ctx = context(
        r#"{"platforms": {"kiro": {
            "settings": {"theme": "dark"},
            "agents": [{"name": "reviewer", "content": {"role": "review"}}],
            "commands": [{"name": "ship", "content": "Ship it."}],
            "steering": [{"name": "rules", "content": "Be precise."}],
            "hooks": [{"name": "lint", "content": {"patterns": ["*.rs"]}}]
        }}}"#,
    );

    let result = h
        .orchestrator()
        .execute(&ctx, &h.options().with_metrics(true))
        .unwrap();

    assert!(result.success, "{:?}", result.errors);
    assert_eq!(result.deployed_components.len(), 5);
    let report = result.performance.unwrap();
    assert_eq!(report.plan.dispatch, Dispatch::Parallel { workers: 4 });
    assert_eq!(report.components.len(), 5);
    assert_eq!(report.workload_files, 5);
}

#[test]
fn validation_results_are_cached() {
    let h = Harness::new();
    let orchestrator = h.orchestrator();
    let ctx = settings_and_steering();

    orchestrator.execute(&ctx, &h.options().with_dry_run(true)).unwrap();
    orchestrator.execute(&ctx, &h.options().with_dry_run(true)).unwrap();

    let stats = orchestrator.cache().stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.entries, 1);
}

#[test]
fn events_follow_state_machine() {
    let h = Harness::new();
    let sink = Arc::new(RecordingEventSink::new());

    h.orchestrator()
        .with_events(sink.clone())
        .execute(&settings_and_steering(), &h.options())
        .unwrap();

    assert_eq!(
        sink.states(),
        vec![
            "validating",
            "security-scanning",
            "locking",
            "deploying",
            "finalizing",
            "released"
        ]
    );
    let events = sink.events.lock().unwrap();
    assert!(matches!(
        events.last(),
        Some(DeployEvent::Completed { success: true, .. })
    ));
}

#[test]
fn unlock_removes_foreign_lock() {
    let h = Harness::new();
    let other = FileLockService::new(h.lock_dir());
    let resource = FileLockService::resource_for(Platform::Kiro, &h.project);
    other.acquire(&resource, &LockOptions::default()).unwrap();

    let orchestrator = h.orchestrator();
    assert!(orchestrator.unlock(Platform::Kiro, &h.project).unwrap());
    assert!(!orchestrator.unlock(Platform::Kiro, &h.project).unwrap());
    assert!(!h.lock_path().exists());
}
