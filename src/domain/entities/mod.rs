//! Domain Entities
//!
//! Core types with identity: the input context, lock metadata, backup
//! manifests and conflict records.

mod backup_manifest;
mod conflict_record;
mod context;
mod lock;

pub use backup_manifest::{BackupEntry, BackupManifest};
pub use conflict_record::{ConflictKind, ConflictRecord, Resolution};
pub use context::{
    ComponentData, Context, ContextMetadata, PlatformSection, ProseDocument, SpecDocument,
    StructuredDocument,
};
pub use lock::LockInfo;
