//! FileSystem port - abstraction over file I/O operations
//!
//! Handlers write deployed files through this trait, and the backup service
//! takes snapshots and restores them through it. Only the backup service's
//! own directory bookkeeping (run directories, manifests, pruning) touches
//! `std::fs` directly.

use std::path::{Path, PathBuf};

/// Result type for file system operations
pub type FsResult<T> = Result<T, FsError>;

/// File system operation errors
#[derive(Debug)]
pub enum FsError {
    /// File not found
    NotFound(PathBuf),
    /// Permission denied
    PermissionDenied(PathBuf),
    /// I/O error
    Io(std::io::Error),
    /// Other error
    Other(String),
}

impl FsError {
    /// Attach the path an I/O error happened at
    pub fn at(path: &Path, err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FsError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => FsError::PermissionDenied(path.to_path_buf()),
            _ => FsError::Io(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound(_))
    }
}

impl From<std::io::Error> for FsError {
    fn from(err: std::io::Error) -> Self {
        FsError::at(Path::new(""), err)
    }
}

impl std::fmt::Display for FsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FsError::NotFound(path) => write!(f, "File not found: {}", path.display()),
            FsError::PermissionDenied(path) => {
                write!(f, "Permission denied: {}", path.display())
            }
            FsError::Io(err) => write!(f, "I/O error: {}", err),
            FsError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for FsError {}

impl From<FsError> for std::io::Error {
    fn from(err: FsError) -> Self {
        let message = err.to_string();
        match err {
            FsError::Io(err) => err,
            FsError::NotFound(_) => std::io::Error::new(std::io::ErrorKind::NotFound, message),
            FsError::PermissionDenied(_) => {
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, message)
            }
            FsError::Other(_) => std::io::Error::other(message),
        }
    }
}

/// Abstract file system interface
///
/// Implementations:
/// - `LocalFs` - standard file I/O with atomic writes
/// - failing wrappers in the backup tests
pub trait FileSystem: Send + Sync {
    /// Read file content as string
    fn read(&self, path: &Path) -> FsResult<String>;

    /// Write content to file atomically
    fn write(&self, path: &Path, content: &str) -> FsResult<()>;

    /// Write content in fixed-size chunks, keeping at most one chunk in flight
    fn write_chunked(&self, path: &Path, content: &str, _chunk_size: usize) -> FsResult<()> {
        self.write(path, content)
    }

    /// Check if file exists
    fn exists(&self, path: &Path) -> bool;

    /// Remove a file
    fn remove(&self, path: &Path) -> FsResult<()>;

    /// Create directory and parents
    fn create_dir_all(&self, path: &Path) -> FsResult<()>;

    /// Copy a file, creating the destination's parent directories
    fn copy(&self, from: &Path, to: &Path) -> FsResult<()>;

    /// Compute content hash (`sha256:<hex>`)
    fn hash(&self, path: &Path) -> FsResult<String>;
}
