//! Local File System Implementation
//!
//! Implements the FileSystem port for local disk operations.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::domain::ports::file_system::{FileSystem, FsError, FsResult};

const HASH_BUFFER: usize = 64 * 1024;

/// Local file system implementation
///
/// Writes go to a temp file in the destination directory and are renamed
/// into place, so readers never observe a half-written file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    /// Create a new LocalFs instance
    pub fn new() -> Self {
        Self
    }

    fn temp_sibling(&self, path: &Path) -> FsResult<NamedTempFile> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| FsError::at(parent, e))?;
        NamedTempFile::new_in(parent).map_err(|e| FsError::at(parent, e))
    }

    /// Rename into place, keeping the permissions of a file being replaced
    fn persist(&self, temp: NamedTempFile, path: &Path) -> FsResult<()> {
        if let Ok(existing) = std::fs::metadata(path) {
            temp.as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| FsError::at(path, e))?;
        }
        temp.persist(path)
            .map(|_| ())
            .map_err(|e| FsError::at(path, e.error))
    }
}

impl FileSystem for LocalFs {
    fn read(&self, path: &Path) -> FsResult<String> {
        std::fs::read_to_string(path).map_err(|e| FsError::at(path, e))
    }

    fn write(&self, path: &Path, content: &str) -> FsResult<()> {
        let mut temp = self.temp_sibling(path)?;
        temp.write_all(content.as_bytes())
            .and_then(|_| temp.as_file().sync_all())
            .map_err(|e| FsError::at(path, e))?;
        self.persist(temp, path)
    }

    fn write_chunked(&self, path: &Path, content: &str, chunk_size: usize) -> FsResult<()> {
        let mut temp = self.temp_sibling(path)?;
        for chunk in content.as_bytes().chunks(chunk_size.max(1)) {
            temp.write_all(chunk).map_err(|e| FsError::at(path, e))?;
        }
        temp.as_file().sync_all().map_err(|e| FsError::at(path, e))?;
        self.persist(temp, path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove(&self, path: &Path) -> FsResult<()> {
        std::fs::remove_file(path).map_err(|e| FsError::at(path, e))
    }

    fn create_dir_all(&self, path: &Path) -> FsResult<()> {
        std::fs::create_dir_all(path).map_err(|e| FsError::at(path, e))
    }

    fn copy(&self, from: &Path, to: &Path) -> FsResult<()> {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FsError::at(parent, e))?;
        }
        std::fs::copy(from, to)
            .map(|_| ())
            .map_err(|e| FsError::at(from, e))
    }

    fn hash(&self, path: &Path) -> FsResult<String> {
        let file = File::open(path).map_err(|e| FsError::at(path, e))?;
        let mut reader = BufReader::with_capacity(HASH_BUFFER, file);
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; HASH_BUFFER];
        loop {
            let read = reader.read(&mut buffer).map_err(|e| FsError::at(path, e))?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
        }
        Ok(format!("sha256:{:x}", hasher.finalize()))
    }
}

/// `sha256:<hex>` of in-memory content, comparable with [`FileSystem::hash`]
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("sha256:{:x}", hasher.finalize())
}
