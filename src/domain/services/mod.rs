//! Domain Services
//!
//! Pure business logic services that operate on domain entities.
//! These services have no I/O dependencies and are easily testable.

mod cache;
mod conflict;
mod differ;
mod merger;
mod optimizer;
mod security_scanner;

pub use cache::{CacheStats, TtlCache};
pub use conflict::{ConflictResolver, ResolveOutcome, ResolveRequest};
pub use differ::{ContentDiff, Differ};
pub use merger::{
    array_append, deep_merge, merge, preserve_task_status, section_merge, to_pretty_json,
    MergeError, SECTION_DIVIDER,
};
pub use optimizer::{
    ComponentTiming, Dispatch, ExecutionPlan, IoMode, OptimizerSettings, PerformanceOptimizer,
    PerformanceReport, Workload,
};
pub use security_scanner::{FindingKind, ScanReport, SecurityFinding, SecurityScanner};
