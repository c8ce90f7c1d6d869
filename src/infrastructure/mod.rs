//! Infrastructure Layer
//!
//! Concrete implementations of domain ports.
//! This layer handles all I/O operations.
//!
//! ## Structure
//!
//! - `fs/` - Local file system with atomic and chunked writes, home resolution
//! - `lock/` - Cross-process file lock service
//! - `backup/` - Snapshot sessions and rollback
//! - `handlers/` - Structured and prose component handlers
//! - `events/` - Deploy event sinks (NDJSON, log)
//! - `conflict/` - Interactive conflict prompt

pub mod backup;
pub mod conflict;
pub mod events;
pub mod fs;
pub mod handlers;
pub mod lock;

// Re-export for convenience
pub use backup::{BackupService, BackupSession};
pub use conflict::InteractivePrompt;
pub use events::{JsonEventSink, LogEventSink};
pub use fs::{cairn_home_dir, cairn_state_dir, LocalFs};
pub use handlers::{default_handlers, ProseHandler, StructuredHandler};
pub use lock::{FileLockService, LockOptions};
