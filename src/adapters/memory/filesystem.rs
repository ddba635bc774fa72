//! In-memory filesystem adapter.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::adapters::live::filesystem::glob_set;
use crate::ports::filesystem::FileSystem;

/// Filesystem backed by a sorted map of paths to contents.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    fail_writes: Option<String>,
}

impl MemoryFileSystem {
    /// Creates an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a UTF-8 file.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, contents: &str) -> Self {
        self.with_bytes(path, contents.as_bytes().to_vec())
    }

    /// Adds a file with arbitrary bytes.
    #[must_use]
    pub fn with_bytes(self, path: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        self.files().insert(path.into(), contents);
        self
    }

    /// Makes every write fail with `message`.
    #[must_use]
    pub fn failing_writes(mut self, message: impl Into<String>) -> Self {
        self.fail_writes = Some(message.into());
        self
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<u8>>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the contents of a file as a string, if present.
    #[must_use]
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let files = self.files();
        files.get(path.as_ref()).map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl FileSystem for MemoryFileSystem {
    fn list_files(
        &self,
        root: &Path,
        include: &[String],
        exclude: &[String],
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let include = glob_set(include)?;
        let exclude = glob_set(exclude)?;
        let files = self.files();
        Ok(files
            .keys()
            .filter_map(|path| path.strip_prefix(root).ok())
            .filter(|rel| include.is_match(rel) && !exclude.is_match(rel))
            .map(|rel| rel.to_string_lossy().replace('\\', "/"))
            .collect())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        let files = self.files();
        files.get(path).cloned().ok_or_else(|| format!("no such file: {}", path.display()).into())
    }

    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(message) = &self.fail_writes {
            return Err(message.clone().into());
        }
        let mut files = self.files();
        files.insert(path.to_path_buf(), contents.as_bytes().to_vec());
        Ok(())
    }
}
