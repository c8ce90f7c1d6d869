//! Backup and rollback

mod service;
mod session;

pub use service::{BackupService, RollbackReport, DEFAULT_RETAIN};
pub use session::{BackupSession, MANIFEST_FILE};
