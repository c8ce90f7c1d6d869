//! File System Implementations
//!
//! Concrete implementations of the FileSystem port.

mod home;
mod local;

pub use home::{cairn_home_dir, cairn_state_dir, CAIRN_TEST_HOME_VAR};
pub use local::{hash_content, LocalFs};
