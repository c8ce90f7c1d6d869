//! Conflict Resolver Domain Service
//!
//! Decides the final content for a path that already holds content, according
//! to the configured [`ConflictStrategy`]. The resolver never touches the file
//! system itself; backups go through the [`Snapshotter`] port and interactive
//! decisions through the [`ConflictPrompt`] port.

use std::path::Path;
use std::sync::Arc;

use super::differ::Differ;
use super::merger::{merge, MergeError};
use crate::domain::entities::{ConflictKind, ConflictRecord, Resolution};
use crate::domain::ports::{ConflictChoice, ConflictContext, ConflictPrompt, Snapshotter};
use crate::domain::value_objects::{ConflictStrategy, ContentCategory, MergeStrategy};
use crate::error::{codes, DeployIssue};

/// Everything needed to resolve one path
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub path: &'a Path,
    pub existing: Option<&'a str>,
    pub incoming: &'a str,
    pub category: ContentCategory,
    pub strategy: ConflictStrategy,
    pub merge: MergeStrategy,
}

/// Outcome of resolving one path
#[derive(Debug, Clone)]
pub struct ResolveOutcome {
    /// False when the conflict needs a decision nobody made (or merging failed)
    pub resolved: bool,
    /// Content to write; `None` means leave the path untouched
    pub final_content: Option<String>,
    pub errors: Vec<DeployIssue>,
    pub warnings: Vec<DeployIssue>,
    pub record: ConflictRecord,
}

/// Applies conflict strategies
#[derive(Clone, Default)]
pub struct ConflictResolver {
    prompt: Option<Arc<dyn ConflictPrompt>>,
    dry_run: bool,
    differ: Differ,
}

impl ConflictResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an interactive prompt for the `prompt` strategy
    pub fn with_prompt(mut self, prompt: Arc<dyn ConflictPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// In a dry run prompts are never shown
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn resolve(&self, request: &ResolveRequest, snapshots: &dyn Snapshotter) -> ResolveOutcome {
        let mut outcome = ResolveOutcome {
            resolved: true,
            final_content: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            record: ConflictRecord {
                path: request.path.to_path_buf(),
                kind: ConflictKind::classify(request.existing, request.incoming),
                existing_content: request.existing.map(str::to_string),
                incoming_content: request.incoming.to_string(),
                resolution: Resolution::Overwritten,
                summary: String::new(),
            },
        };

        let Some(existing) = request.existing else {
            outcome.record.summary = "new file".to_string();
            outcome.final_content = Some(request.incoming.to_string());
            return outcome;
        };

        outcome.record.summary = self
            .differ
            .diff(existing, request.incoming, request.category)
            .summary();

        match request.strategy {
            ConflictStrategy::Overwrite => self.overwrite(request, &mut outcome),
            ConflictStrategy::Skip => self.skip(request, &mut outcome),
            ConflictStrategy::Backup => self.backup(request, snapshots, &mut outcome),
            ConflictStrategy::Merge => self.merge(request, existing, &mut outcome),
            ConflictStrategy::Prompt => self.prompt(request, existing, &mut outcome),
        }

        outcome
    }

    fn overwrite(&self, request: &ResolveRequest, outcome: &mut ResolveOutcome) {
        outcome.final_content = Some(request.incoming.to_string());
        outcome.record.resolution = Resolution::Overwritten;
    }

    fn skip(&self, request: &ResolveRequest, outcome: &mut ResolveOutcome) {
        outcome.final_content = None;
        outcome.record.resolution = Resolution::Skipped;
        outcome.warnings.push(
            DeployIssue::warning(
                codes::CONFLICT_SKIPPED,
                format!("kept existing {} (strategy: skip)", request.path.display()),
            )
            .with_path(request.path),
        );
    }

    fn backup(
        &self,
        request: &ResolveRequest,
        snapshots: &dyn Snapshotter,
        outcome: &mut ResolveOutcome,
    ) {
        match snapshots.snapshot(request.path) {
            Ok(_) => {
                outcome.final_content = Some(request.incoming.to_string());
                outcome.record.resolution = Resolution::BackedUp;
            }
            Err(err) => {
                // No snapshot, no overwrite
                outcome.final_content = None;
                outcome.record.resolution = Resolution::Skipped;
                outcome.warnings.push(
                    DeployIssue::warning(
                        codes::BACKUP_FAILED,
                        format!("{err}; left {} unchanged", request.path.display()),
                    )
                    .with_path(request.path),
                );
            }
        }
    }

    fn merge(&self, request: &ResolveRequest, existing: &str, outcome: &mut ResolveOutcome) {
        match merge(existing, request.incoming, request.category, request.merge) {
            Ok(merged) => {
                outcome.final_content = Some(merged);
                outcome.record.resolution = Resolution::Merged(request.merge);
            }
            Err(err) => self.merge_failed(request, err, outcome),
        }
    }

    fn merge_failed(&self, request: &ResolveRequest, err: MergeError, outcome: &mut ResolveOutcome) {
        outcome.resolved = false;
        outcome.final_content = None;
        outcome.record.resolution = Resolution::Unresolved;
        outcome.errors.push(
            DeployIssue::error(
                codes::MERGE_FAILED,
                format!(
                    "cannot {} {}: {err}",
                    request.merge,
                    request.path.display()
                ),
            )
            .with_path(request.path),
        );
    }

    fn prompt(&self, request: &ResolveRequest, existing: &str, outcome: &mut ResolveOutcome) {
        if self.dry_run {
            outcome.resolved = false;
            outcome.record.resolution = Resolution::Unresolved;
            outcome.warnings.push(
                DeployIssue::warning(
                    codes::CONFLICT_UNRESOLVED,
                    format!("{} would require a decision", request.path.display()),
                )
                .with_path(request.path),
            );
            return;
        }

        let Some(prompt) = &self.prompt else {
            self.unresolved(request, "no interactive prompt available", outcome);
            return;
        };

        let context = ConflictContext {
            path: request.path,
            existing_content: existing,
            incoming_content: request.incoming,
        };
        loop {
            match prompt.choose(&context) {
                ConflictChoice::Diff => {
                    let path = request.path.display().to_string();
                    prompt.show_diff(&self.differ.unified(existing, request.incoming, &path));
                }
                ConflictChoice::Overwrite => return self.overwrite(request, outcome),
                ConflictChoice::Skip => return self.skip(request, outcome),
                ConflictChoice::Merge => return self.merge(request, existing, outcome),
                ConflictChoice::Abort => {
                    return self.unresolved(request, "declined by user", outcome)
                }
            }
        }
    }

    fn unresolved(&self, request: &ResolveRequest, reason: &str, outcome: &mut ResolveOutcome) {
        outcome.resolved = false;
        outcome.final_content = None;
        outcome.record.resolution = Resolution::Unresolved;
        outcome.errors.push(
            DeployIssue::error(
                codes::CONFLICT_UNRESOLVED,
                format!("conflict at {} left unresolved: {reason}", request.path.display()),
            )
            .with_path(request.path),
        );
    }
}
