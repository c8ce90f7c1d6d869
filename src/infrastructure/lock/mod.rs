//! Cross-process locking over a named resource

mod file_lock;
mod process;

pub use file_lock::{FileLockService, LockHandle, LockOptions};
