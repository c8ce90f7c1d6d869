//! Output Rendering
//!
//! Renders deployment and scan results as text or JSON, and maps results
//! onto process exit codes.

use std::fmt::Write as _;
use std::path::Path;

use crate::application::{DeploymentResult, DeploymentStatus};
use crate::domain::entities::Resolution;
use crate::domain::services::{Dispatch, ScanReport};
use crate::error::{codes, DeployIssue};

/// Process exit codes
pub mod exit {
    /// Success or partial success
    pub const SUCCESS: i32 = 0;
    /// Invalid context, options or config
    pub const INVALID: i32 = 1;
    pub const SECURITY: i32 = 2;
    pub const LOCK: i32 = 3;
    /// Rolled back, or nothing deployed
    pub const FAILED: i32 = 4;
}

/// Exit code for a finished deployment
pub fn exit_code(result: &DeploymentResult) -> i32 {
    if result.success {
        exit::SUCCESS
    } else if result.has_error_code(codes::VALIDATION_FAILED) {
        exit::INVALID
    } else if result.has_error_code(codes::SECURITY_CHECK_FAILED) {
        exit::SECURITY
    } else if result.has_error_code(codes::LOCK_TIMEOUT) || result.has_error_code(codes::LOCK_IO) {
        exit::LOCK
    } else {
        exit::FAILED
    }
}

/// Output format for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for scripting
    Json,
}

impl OutputFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

struct Icons {
    check: &'static str,
    cross: &'static str,
    write: &'static str,
    warn: &'static str,
}

impl Icons {
    fn unicode() -> Self {
        Self {
            check: "✓",
            cross: "✗",
            write: "→",
            warn: "!",
        }
    }

    fn ascii() -> Self {
        Self {
            check: "[OK]",
            cross: "[FAIL]",
            write: "->",
            warn: "[WARN]",
        }
    }
}

/// Trait for rendering deploy results
pub trait DeployResultRenderer {
    fn render(&self, result: &DeploymentResult) -> String;
}

/// Text renderer for deploy results
pub struct TextRenderer {
    pub unicode: bool,
    pub verbose: u8,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self {
            unicode: true,
            verbose: 0,
        }
    }
}

impl DeployResultRenderer for TextRenderer {
    fn render(&self, result: &DeploymentResult) -> String {
        let icons = if self.unicode {
            Icons::unicode()
        } else {
            Icons::ascii()
        };
        let mut out = String::new();

        let heading = match (result.dry_run, result.status) {
            (true, DeploymentStatus::Failed) => format!("{} Dry Run Failed", icons.cross),
            (true, _) => format!("{} Dry Run", icons.check),
            (false, DeploymentStatus::Success) => format!("{} Deploy Complete", icons.check),
            (false, DeploymentStatus::Partial) => {
                format!("{} Deploy Completed With Errors", icons.warn)
            }
            (false, DeploymentStatus::Failed) => format!("{} Deploy Failed", icons.cross),
        };
        let _ = writeln!(out, "{} ({})", heading, result.platform);
        let _ = writeln!(out);

        if !result.deployed_components.is_empty() {
            let _ = writeln!(out, "  Components: {}", join(&result.deployed_components));
        }
        if !result.skipped_components.is_empty() {
            let _ = writeln!(
                out,
                "  Skipped components: {}",
                join(&result.skipped_components)
            );
        }

        let summary = &result.summary;
        if result.dry_run {
            let _ = writeln!(
                out,
                "  {} files would be written, {} conflicts",
                result.planned_files.len(),
                result.conflicts.len()
            );
        } else {
            let _ = writeln!(
                out,
                "  {} files written, {} skipped, {} conflicts resolved",
                summary.files_deployed, summary.files_skipped, summary.conflicts_resolved
            );
        }
        if let Some(dir) = &result.backup_dir {
            let _ = writeln!(out, "  Backup: {}", dir.display());
        }
        if result.rolled_back {
            let _ = writeln!(out, "  Rolled back: earlier writes were restored");
        }

        let files = if result.dry_run {
            &result.planned_files
        } else {
            &result.deployed_files
        };
        if !files.is_empty() && (self.verbose > 0 || result.dry_run) {
            let label = if result.dry_run { "Would write" } else { "Written" };
            let _ = writeln!(out);
            let _ = writeln!(out, "  {} ({}):", label, files.len());
            for path in files {
                let _ = writeln!(out, "    {} {}", icons.write, path.display());
            }
        }

        if !result.conflicts.is_empty() && (self.verbose > 0 || result.dry_run) {
            let _ = writeln!(out);
            let _ = writeln!(out, "  Conflicts ({}):", result.conflicts.len());
            for conflict in &result.conflicts {
                let _ = writeln!(
                    out,
                    "    {} {} [{}] {}",
                    conflict.path.display(),
                    resolution_label(&conflict.resolution),
                    conflict.summary,
                    if conflict.resolution.is_resolved() { "" } else { "(unresolved)" }
                );
            }
        }

        if !result.errors.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "  Errors:");
            for issue in &result.errors {
                render_issue(&mut out, icons.cross, issue);
            }
        }

        if !result.warnings.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "  Warnings:");
            for issue in &result.warnings {
                render_issue(&mut out, icons.warn, issue);
            }
        }

        if let Some(perf) = &result.performance {
            let _ = writeln!(out);
            let dispatch = match perf.plan.dispatch {
                Dispatch::Sequential => "sequential".to_string(),
                Dispatch::Parallel { workers } => format!("parallel x{}", workers),
            };
            let _ = writeln!(
                out,
                "  Performance: {} in {}ms ({} bytes, cache {} hit / {} miss)",
                dispatch, perf.total_ms, perf.workload_bytes, perf.cache_hits, perf.cache_misses
            );
            if self.verbose > 0 {
                for timing in &perf.components {
                    let _ = writeln!(
                        out,
                        "    {} {}ms, {} files",
                        timing.component, timing.duration_ms, timing.files
                    );
                }
            }
        }

        out
    }
}

/// JSON renderer for deploy results
pub struct JsonRenderer;

impl DeployResultRenderer for JsonRenderer {
    fn render(&self, result: &DeploymentResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|e| {
            serde_json::json!({ "event": "error", "message": e.to_string() }).to_string()
        })
    }
}

/// Renderer for the requested format
pub fn renderer(format: OutputFormat, verbose: u8) -> Box<dyn DeployResultRenderer> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer {
            unicode: true,
            verbose,
        }),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}

/// Render a standalone scan
pub fn render_scan(report: &ScanReport, source: &Path, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report).unwrap_or_default(),
        OutputFormat::Text => {
            let mut out = String::new();
            if report.is_safe {
                let _ = writeln!(out, "✓ No security blockers in {}", source.display());
                return out;
            }
            let _ = writeln!(
                out,
                "✗ {} security blocker(s) in {}",
                report.blockers.len(),
                source.display()
            );
            for line in report.describe() {
                let _ = writeln!(out, "    {}", line);
            }
            out
        }
    }
}

/// Remediation hint for an error code
pub fn hint(code: &str) -> Option<&'static str> {
    match code {
        codes::VALIDATION_FAILED => Some("fix the context file, then re-run with --validate-only"),
        codes::SECURITY_CHECK_FAILED => {
            Some("remove the secret or command; 'cairn scan' lists every blocker")
        }
        codes::LOCK_TIMEOUT => Some(
            "another deployment holds the lock; if it crashed, run 'cairn unlock --platform <p>'",
        ),
        codes::CONFLICT_UNRESOLVED => {
            Some("re-run from a terminal with --strategy prompt, or choose another --strategy")
        }
        codes::MERGE_FAILED => Some("existing file is not mergeable; use --strategy backup"),
        _ => None,
    }
}

fn render_issue(out: &mut String, icon: &str, issue: &DeployIssue) {
    let _ = write!(out, "    {} [{}] {}", icon, issue.code, issue.message);
    if let Some(path) = &issue.path {
        let _ = write!(out, " ({})", path.display());
    }
    let _ = writeln!(out);
    if let Some(hint) = hint(&issue.code) {
        let _ = writeln!(out, "      hint: {}", hint);
    }
}

fn resolution_label(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Skipped => "skipped".to_string(),
        Resolution::Overwritten => "overwritten".to_string(),
        Resolution::BackedUp => "backed up".to_string(),
        Resolution::Merged(strategy) => format!("merged ({})", strategy),
        Resolution::Unresolved => "unresolved".to_string(),
    }
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
