//! The write protocol shared by every handler:
//! ensure-directory, load-existing, resolve-conflict, write.

use std::path::PathBuf;

use crate::domain::entities::Resolution;
use crate::domain::ports::{
    DeployEvent, FileSystem, HandlerOptions, HandlerOutcome, TargetContext,
};
use crate::domain::services::{IoMode, ResolveRequest};
use crate::domain::value_objects::{ComponentKind, ConflictStrategy, MergeStrategy};
use crate::error::{codes, DeployIssue};
use crate::infrastructure::fs::hash_content;

/// One file a handler wants on disk
#[derive(Debug, Clone)]
pub(super) struct FileJob {
    pub component: ComponentKind,
    pub path: PathBuf,
    /// Content subject to conflict resolution
    pub body: String,
    /// Metadata block written before the body (prose only)
    pub header: Option<String>,
    pub merge: MergeStrategy,
}

enum Existing {
    Missing,
    UpToDate,
    Content(String),
}

/// Marker identifying headers written by this engine
pub(super) const GENERATED_BY: &str = "generated_by: cairn";

pub(super) fn render(header: Option<&str>, body: &str) -> String {
    match header {
        Some(header) => format!("{header}{body}"),
        None => body.to_string(),
    }
}

/// Body of a file, without a header this engine wrote earlier
pub(super) fn strip_header(content: &str) -> &str {
    let Some(rest) = content.strip_prefix("---\n") else {
        return content;
    };
    let Some(end) = rest.find("\n---\n") else {
        return content;
    };
    if !rest[..end].lines().any(|line| line.trim() == GENERATED_BY) {
        return content;
    }
    let body = &rest[end + "\n---\n".len()..];
    body.strip_prefix('\n').unwrap_or(body)
}

/// Merge sub-strategy for a file: the caller's override when it fits the
/// category, otherwise the component default
pub(super) fn effective_merge(
    component: ComponentKind,
    default: MergeStrategy,
    options: &HandlerOptions,
) -> MergeStrategy {
    match options.merge {
        Some(merge) if merge.category() == component.category() => merge,
        _ => default,
    }
}

/// Warning for an override that cannot apply to this component
pub(super) fn merge_override_warning(
    component: ComponentKind,
    options: &HandlerOptions,
) -> Option<DeployIssue> {
    let merge = options.merge?;
    if options.strategy != ConflictStrategy::Merge || merge.category() == component.category() {
        return None;
    }
    Some(
        DeployIssue::warning(
            codes::MERGE_FAILED,
            format!(
                "merge strategy '{merge}' does not apply to {component}; using '{}'",
                component.default_merge()
            ),
        )
        .with_component(component),
    )
}

pub(super) fn deploy_file(
    job: FileJob,
    target: &TargetContext,
    options: &HandlerOptions,
    outcome: &mut HandlerOutcome,
) {
    let FileJob {
        component,
        path,
        body,
        header,
        merge,
    } = job;
    let rendered = render(header.as_deref(), &body);

    let existing = match load_existing(target.fs, &path, &rendered, options.io) {
        Ok(Existing::Missing) => None,
        Ok(Existing::UpToDate) => return skip(target, component, path, "up to date", outcome),
        Ok(Existing::Content(content)) if content == rendered => {
            return skip(target, component, path, "up to date", outcome)
        }
        Ok(Existing::Content(content)) => Some(content),
        Err(message) => return fail(component, path, message, outcome),
    };

    let final_body = match existing.as_deref() {
        None => body,
        Some(_) if options.strategy == ConflictStrategy::Overwrite => body,
        Some(existing) => {
            let existing_body = if header.is_some() {
                strip_header(existing)
            } else {
                existing
            };
            let resolved = target.resolver.resolve(
                &ResolveRequest {
                    path: &path,
                    existing: Some(existing_body),
                    incoming: &body,
                    category: component.category(),
                    strategy: options.strategy,
                    merge,
                },
                target.snapshots,
            );

            outcome
                .errors
                .extend(resolved.errors.into_iter().map(|e| e.with_component(component)));
            outcome
                .warnings
                .extend(resolved.warnings.into_iter().map(|w| w.with_component(component)));
            if target.events.wants_detailed_events() {
                target.events.on_event(DeployEvent::ConflictResolved {
                    path: path.clone(),
                    resolution: resolved.record.resolution,
                });
            }
            let reason = skip_reason(&resolved.record.resolution);
            outcome.conflicts.push(resolved.record);

            match resolved.final_content {
                Some(content) => content,
                None => return skip(target, component, path, reason, outcome),
            }
        }
    };

    let content = render(header.as_deref(), &final_body);

    if options.dry_run {
        if target.events.wants_detailed_events() {
            target.events.on_event(DeployEvent::FileWritten {
                component,
                path: path.clone(),
                dry_run: true,
            });
        }
        outcome.planned_files.push(path);
        return;
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = target.fs.create_dir_all(parent) {
            return fail(component, path, e.to_string(), outcome);
        }
    }

    if existing.is_some() {
        if let Err(e) = target.snapshots.snapshot(&path) {
            outcome.warnings.push(
                DeployIssue::warning(codes::BACKUP_FAILED, format!("{e}; left file unchanged"))
                    .with_component(component)
                    .with_path(&path),
            );
            return skip(target, component, path, "backup failed", outcome);
        }
    } else {
        target.snapshots.record_created(&path);
    }

    let written = match options.io {
        IoMode::InMemory => target.fs.write(&path, &content),
        IoMode::Streaming { chunk_size } => target.fs.write_chunked(&path, &content, chunk_size),
    };
    match written {
        Ok(()) => {
            if target.events.wants_detailed_events() {
                target.events.on_event(DeployEvent::FileWritten {
                    component,
                    path: path.clone(),
                    dry_run: false,
                });
            }
            outcome.deployed_files.push(path);
        }
        Err(e) => fail(component, path, e.to_string(), outcome),
    }
}

fn load_existing(
    fs: &dyn FileSystem,
    path: &std::path::Path,
    rendered: &str,
    io: IoMode,
) -> Result<Existing, String> {
    if !fs.exists(path) {
        return Ok(Existing::Missing);
    }
    if matches!(io, IoMode::Streaming { .. }) {
        // Compare by hash before pulling a large file into memory
        if let Ok(hash) = fs.hash(path) {
            if hash == hash_content(rendered) {
                return Ok(Existing::UpToDate);
            }
        }
    }
    match fs.read(path) {
        Ok(content) => Ok(Existing::Content(content)),
        Err(e) if e.is_not_found() => Ok(Existing::Missing),
        Err(e) => Err(e.to_string()),
    }
}

fn skip_reason(resolution: &Resolution) -> &'static str {
    match resolution {
        Resolution::Unresolved => "unresolved conflict",
        Resolution::Skipped => "kept existing",
        _ => "unchanged",
    }
}

fn skip(
    target: &TargetContext,
    component: ComponentKind,
    path: PathBuf,
    reason: &str,
    outcome: &mut HandlerOutcome,
) {
    if target.events.wants_detailed_events() {
        target.events.on_event(DeployEvent::FileSkipped {
            component,
            path: path.clone(),
            reason: reason.to_string(),
        });
    }
    outcome.skipped_files.push(path);
}

fn fail(component: ComponentKind, path: PathBuf, message: String, outcome: &mut HandlerOutcome) {
    outcome.errors.push(
        DeployIssue::error(codes::FILESYSTEM_ERROR, message)
            .with_component(component)
            .with_path(path),
    );
}
