//! Deployment Orchestrator
//!
//! Drives one deployment through the state machine
//! `Idle → Validating → SecurityScanning → Locking → (DryRunReport | Deploying) → Finalizing → Released`.
//!
//! - Validation and security failures jump to `Finalizing`; no lock is taken.
//! - A lock failure ends the run before any write.
//! - Once the lock is held every exit path goes through `Finalizing`, which
//!   rolls back when a component failed under a backup and always releases
//!   the lock.
//!
//! The orchestrator owns no business rules. Validation, scanning, conflict
//! resolution and strategy selection live in the domain layer; file writes
//! live in the component handlers.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::domain::entities::{ComponentData, Context};
use crate::domain::policies::{validate_context, ComponentSelection, ValidationReport};
use crate::domain::ports::{
    ComponentHandler, ConflictPrompt, DeployEvent, DeployEventSink, FileSystem, HandlerOptions,
    HandlerOutcome, NoSnapshots, NoopEventSink, Snapshotter, TargetContext,
};
use crate::domain::services::{
    ConflictResolver, Dispatch, PerformanceOptimizer, PerformanceReport,
    SecurityScanner, TtlCache, Workload,
};
use crate::domain::value_objects::{ComponentKind, Platform};
use crate::error::{codes, DeployError, DeployIssue, LockError, OptionsError};
use crate::infrastructure::backup::{BackupService, BackupSession};
use crate::infrastructure::handlers::{default_handlers, handler_for};
use crate::infrastructure::lock::{FileLockService, LockHandle};

use super::dispatch::run_bounded;
use super::options::DeploymentOptions;
use super::result::{DeployState, DeploymentResult};

/// Cache of validation outcomes keyed by context fingerprint, platform and
/// component filters
pub type ValidationCache = TtlCache<String, ValidationReport>;

/// Default capacity and TTL for [`ValidationCache`]
pub const VALIDATION_CACHE_CAPACITY: usize = 64;
pub const VALIDATION_CACHE_TTL: Duration = Duration::from_secs(300);

/// One in-flight deployment: current state plus the result being built
struct Run<'a> {
    events: &'a dyn DeployEventSink,
    state: DeployState,
    result: DeploymentResult,
}

impl<'a> Run<'a> {
    fn new(events: &'a dyn DeployEventSink, mut result: DeploymentResult) -> Self {
        result.states.push(DeployState::Idle);
        Self {
            events,
            state: DeployState::Idle,
            result,
        }
    }

    fn transition(&mut self, to: DeployState) {
        log::debug!("deploy state: {} -> {}", self.state.as_str(), to.as_str());
        self.events.on_event(DeployEvent::StateChanged {
            from: self.state.as_str(),
            to: to.as_str(),
        });
        self.state = to;
        self.result.states.push(to);
    }
}

/// What one dispatched component produced
struct ComponentRun {
    kind: ComponentKind,
    outcome: HandlerOutcome,
    elapsed: Duration,
    files: usize,
}

/// Deployment orchestrator
///
/// Parameterized by its collaborators so tests can swap the file system,
/// handlers, prompt and event sink.
pub struct DeploymentOrchestrator {
    fs: Arc<dyn FileSystem>,
    locks: FileLockService,
    backup_root: PathBuf,
    handlers: Vec<Arc<dyn ComponentHandler>>,
    scanner: SecurityScanner,
    cache: Arc<ValidationCache>,
    events: Arc<dyn DeployEventSink>,
    prompt: Option<Arc<dyn ConflictPrompt>>,
    cancel: Arc<AtomicBool>,
}

impl DeploymentOrchestrator {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        locks: FileLockService,
        backup_root: impl Into<PathBuf>,
        cache: Arc<ValidationCache>,
    ) -> Self {
        Self {
            fs,
            locks,
            backup_root: backup_root.into(),
            handlers: default_handlers(),
            scanner: SecurityScanner::new(),
            cache,
            events: Arc::new(NoopEventSink),
            prompt: None,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn DeployEventSink>) -> Self {
        self.events = events;
        self
    }

    /// Interactive prompt for the `prompt` strategy
    pub fn with_prompt(mut self, prompt: Arc<dyn ConflictPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn with_handlers(mut self, handlers: Vec<Arc<dyn ComponentHandler>>) -> Self {
        self.handlers = handlers;
        self
    }

    /// Flag that stops new component dispatch when set (e.g. by Ctrl-C)
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cache(&self) -> &ValidationCache {
        &self.cache
    }

    /// Remove the lock for `(platform, project_dir)` regardless of its owner
    pub fn unlock(&self, platform: Platform, project_dir: &Path) -> Result<bool, LockError> {
        let resource = FileLockService::resource_for(platform, project_dir);
        let removed = self.locks.force_unlock(&resource)?;
        if removed {
            log::info!("removed lock '{resource}'");
        }
        Ok(removed)
    }

    /// Validate a context, reusing a cached outcome when the same context was
    /// validated recently with the same filters
    pub fn validate(
        &self,
        context: &Context,
        platform: Platform,
        selection: &ComponentSelection,
    ) -> ValidationReport {
        let key = format!(
            "{}|{}|{}",
            context.fingerprint(),
            platform.key(),
            selection.cache_key()
        );
        if let Some(report) = self.cache.get(&key) {
            log::trace!("validation cache hit for {}", platform.key());
            return report;
        }
        let report = validate_context(context, platform, selection);
        self.cache.insert(key, report.clone());
        report
    }

    /// Execute one deployment
    ///
    /// Invalid option combinations are rejected before the state machine
    /// starts. Everything else ends up in the returned result.
    pub fn execute(
        &self,
        context: &Context,
        options: &DeploymentOptions,
    ) -> Result<DeploymentResult, OptionsError> {
        options.validate()?;

        let started = Instant::now();
        let dry_run = options.is_dry_run();
        let mut run = Run::new(
            self.events.as_ref(),
            DeploymentResult::new(options.platform, dry_run),
        );

        let Some(components) = self.validating(&mut run, context, options) else {
            return Ok(self.finish(run, started, None));
        };

        self.events.on_event(DeployEvent::Started {
            platform: options.platform,
            target: options.project_dir.clone(),
            component_count: components.len(),
        });

        if !self.scanning(&mut run, context, options) || options.validate_only {
            return Ok(self.finish(run, started, None));
        }

        run.transition(DeployState::Locking);
        let resource = FileLockService::resource_for(options.platform, &options.project_dir);
        let handle = match self.locks.acquire(&resource, &options.lock) {
            Ok(handle) => handle,
            Err(e) => {
                log::warn!("could not lock '{resource}': {e}");
                run.result.errors.push(DeployError::from(e).to_issue());
                return Ok(self.finish(run, started, None));
            }
        };
        log::info!("acquired lock '{resource}'");
        let lock = Mutex::new(handle);

        let backups = BackupService::new(
            options
                .backup_dir
                .clone()
                .unwrap_or_else(|| self.backup_root.clone()),
        )
        .with_retain(options.retain_backups)
        .with_fs(self.fs.clone());
        let session = options.needs_backup().then(|| backups.start_session());

        run.transition(if dry_run {
            DeployState::DryRunReport
        } else {
            DeployState::Deploying
        });
        let performance =
            self.deploying(&mut run, context, &components, options, &lock, session.as_ref());

        run.transition(DeployState::Finalizing);
        if let Some(session) = &session {
            self.finalize_backup(&mut run, &backups, session, options);
        }
        self.release(&mut run, lock);

        Ok(self.finish(run, started, performance))
    }

    fn validating(
        &self,
        run: &mut Run,
        context: &Context,
        options: &DeploymentOptions,
    ) -> Option<Vec<ComponentData>> {
        run.transition(DeployState::Validating);
        let report = self.validate(context, options.platform, &options.selection);

        run.result.warnings.extend(
            report
                .warnings
                .iter()
                .map(|w| DeployIssue::warning(codes::UNKNOWN_FIELDS, w.clone())),
        );
        run.result
            .skipped_components
            .extend(report.filtered_out.iter().copied());

        if !report.is_valid() {
            run.result.errors.extend(report.errors.iter().map(|message| {
                DeployError::Validation {
                    message: message.clone(),
                }
                .to_issue()
            }));
            return None;
        }

        let section = context.section(options.platform)?;
        Some(
            section
                .components()
                .into_iter()
                .filter(|c| options.selection.allows(c.kind()))
                .collect(),
        )
    }

    /// Returns false when the run must stop
    fn scanning(&self, run: &mut Run, context: &Context, options: &DeploymentOptions) -> bool {
        run.transition(DeployState::SecurityScanning);
        let report = self.scanner.scan_context(context);
        if report.is_safe {
            return true;
        }

        let findings = report.describe();
        if options.dry_run || options.validate_only {
            run.result.warnings.extend(
                findings
                    .into_iter()
                    .map(|f| DeployIssue::warning(codes::SECURITY_CHECK_FAILED, f)),
            );
            return true;
        }

        log::warn!("security scan found {} blocker(s)", findings.len());
        run.result.errors.push(
            DeployError::Security {
                message: findings.join("; "),
            }
            .to_issue(),
        );
        false
    }

    fn deploying(
        &self,
        run: &mut Run,
        context: &Context,
        components: &[ComponentData],
        options: &DeploymentOptions,
        lock: &Mutex<LockHandle>,
        session: Option<&BackupSession>,
    ) -> Option<PerformanceReport> {
        let workload = Workload {
            component_count: components.len(),
            file_count: components.iter().map(ComponentData::file_count).sum(),
            total_bytes: components.iter().map(ComponentData::payload_bytes).sum(),
        };
        let plan = PerformanceOptimizer::new(options.optimizer).select_strategy(&workload);
        log::debug!("execution plan for {workload:?}: {plan:?}");
        let mut performance = options
            .collect_metrics
            .then(|| PerformanceReport::new(plan, &workload));

        let dry_run = options.is_dry_run();
        let mut resolver = ConflictResolver::new().with_dry_run(dry_run);
        if let Some(prompt) = &self.prompt {
            resolver = resolver.with_prompt(Arc::clone(prompt));
        }
        let no_snapshots = NoSnapshots;
        let snapshots: &dyn Snapshotter = match session {
            Some(session) => session,
            None => &no_snapshots,
        };
        let target = TargetContext {
            platform: options.platform,
            home_dir: &options.home_dir,
            project_dir: &options.project_dir,
            fs: self.fs.as_ref(),
            resolver: &resolver,
            snapshots,
            events: self.events.as_ref(),
            metadata: &context.metadata,
        };
        let handler_options = HandlerOptions {
            strategy: options.effective_strategy(),
            merge: options.merge,
            dry_run,
            io: plan.io,
        };
        let workers = match plan.dispatch {
            Dispatch::Sequential => 1,
            Dispatch::Parallel { workers } => workers,
        };

        let stop = AtomicBool::new(false);
        let runs = run_bounded(
            components,
            workers,
            || stop.load(Ordering::SeqCst) || self.cancel.load(Ordering::SeqCst),
            |component| {
                let finished = self.deploy_component(component, &target, &handler_options, lock);
                if !finished.outcome.is_success() && !options.continue_on_error {
                    stop.store(true, Ordering::SeqCst);
                }
                finished
            },
        );

        for (component, finished) in components.iter().zip(runs) {
            let Some(finished) = finished else {
                run.result.skipped_components.push(component.kind());
                continue;
            };
            if let Some(report) = performance.as_mut() {
                report.record(finished.kind, finished.elapsed, finished.files);
            }
            let outcome = finished.outcome;
            if outcome.is_success() {
                run.result.deployed_components.push(finished.kind);
            }
            run.result.deployed_files.extend(outcome.deployed_files);
            run.result.planned_files.extend(outcome.planned_files);
            run.result.skipped_files.extend(outcome.skipped_files);
            run.result.conflicts.extend(outcome.conflicts);
            run.result.errors.extend(outcome.errors);
            run.result.warnings.extend(outcome.warnings);
        }

        if self.cancel.load(Ordering::SeqCst) {
            log::warn!("deployment cancelled; finalizing");
            run.result.errors.push(DeployIssue::error(
                codes::CANCELLED,
                "deployment cancelled before all components were dispatched",
            ));
        }

        performance
    }

    fn deploy_component(
        &self,
        component: &ComponentData,
        target: &TargetContext,
        options: &HandlerOptions,
        lock: &Mutex<LockHandle>,
    ) -> ComponentRun {
        let kind = component.kind();
        let started = Instant::now();
        let mut outcome = HandlerOutcome::default();

        let refreshed = {
            let mut handle = lock.lock().unwrap_or_else(PoisonError::into_inner);
            self.locks.refresh(&mut handle)
        };
        if let Err(e) = refreshed {
            // Nothing may be written without the lock
            outcome
                .errors
                .push(DeployError::from(e).to_issue().with_component(kind));
        } else {
            self.events
                .on_event(DeployEvent::ComponentStarted { component: kind });
            match handler_for(&self.handlers, kind) {
                Some(handler) => outcome = handler.deploy(component, target, options),
                None => outcome.errors.push(
                    DeployError::ComponentDeploy {
                        component: kind,
                        message: "no handler registered".to_string(),
                    }
                    .to_issue(),
                ),
            }
        }

        if let Some(first) = outcome.errors.first() {
            log::warn!("{kind} failed: {}", first.message);
            self.events.on_event(DeployEvent::ComponentFailed {
                component: kind,
                error: first.message.clone(),
            });
        }

        ComponentRun {
            kind,
            outcome,
            elapsed: started.elapsed(),
            files: component.file_count(),
        }
    }

    fn finalize_backup(
        &self,
        run: &mut Run,
        backups: &BackupService,
        session: &BackupSession,
        options: &DeploymentOptions,
    ) {
        let manifest = match session.persist() {
            Ok(manifest) => manifest,
            Err(e) => {
                run.result.warnings.push(DeployError::from(e).to_issue());
                session.manifest()
            }
        };
        let Some(manifest) = manifest else {
            return;
        };
        if !manifest.entries.is_empty() {
            run.result.summary.backup_created = true;
            run.result.backup_dir = Some(manifest.root.clone());
        }

        if !run.result.errors.is_empty() {
            let report = backups.rollback(&manifest);
            self.events.on_event(DeployEvent::RolledBack {
                restored: report.restored,
                removed: report.removed,
            });
            run.result.warnings.extend(report.warnings);
            run.result.warnings.push(DeployIssue::warning(
                codes::ROLLBACK_PERFORMED,
                format!(
                    "rolled back: restored {} file(s), removed {} new file(s)",
                    report.restored, report.removed
                ),
            ));
            run.result.rolled_back = true;
            // Rolled back writes no longer count as deployed
            run.result
                .skipped_components
                .append(&mut run.result.deployed_components);
            run.result.deployed_files.clear();
        }

        if options.keep_backups || run.result.rolled_back {
            if let Err(e) = backups.prune() {
                run.result.warnings.push(DeployError::from(e).to_issue());
            }
        } else {
            match backups.discard(&manifest) {
                Ok(()) => run.result.backup_dir = None,
                Err(e) => run.result.warnings.push(DeployError::from(e).to_issue()),
            }
        }
    }

    fn release(&self, run: &mut Run, lock: Mutex<LockHandle>) {
        let handle = lock.into_inner().unwrap_or_else(PoisonError::into_inner);
        match self.locks.release(&handle) {
            Ok(true) => log::info!("released lock '{}'", handle.resource()),
            Ok(false) => log::warn!("lock '{}' was already gone", handle.resource()),
            Err(e) => run
                .result
                .warnings
                .push(DeployIssue::warning(codes::LOCK_IO, e.to_string())),
        }
    }

    fn finish(
        &self,
        mut run: Run,
        started: Instant,
        performance: Option<PerformanceReport>,
    ) -> DeploymentResult {
        if run.state != DeployState::Finalizing {
            run.transition(DeployState::Finalizing);
        }
        run.transition(DeployState::Released);

        let elapsed = started.elapsed();
        let mut result = run.result;
        result.performance = performance.map(|mut report| {
            report.finish(elapsed, self.cache.stats());
            report
        });
        result.finish(elapsed.as_millis() as u64);

        self.events.on_event(DeployEvent::Completed {
            success: result.success,
            files_deployed: result.summary.files_deployed,
            files_skipped: result.summary.files_skipped,
            error_count: result.errors.len(),
        });
        result
    }
}
