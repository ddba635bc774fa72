//! Filesystem port for listing, reading and writing files.

use std::path::Path;

/// Provides filesystem access for the sync pipeline.
///
/// Abstracting the filesystem allows the pipeline to run against an
/// in-memory tree in tests without touching the real disk.
pub trait FileSystem: Send + Sync {
    /// Lists files below `root` whose relative path matches one of the
    /// `include` globs and none of the `exclude` globs.
    ///
    /// Paths are relative to `root`, use `/` as separator and come back in
    /// a stable order.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob is invalid or `root` cannot be walked.
    fn list_files(
        &self,
        root: &Path,
        include: &[String],
        exclude: &[String],
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;

    /// Reads the raw bytes of a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or cannot be read.
    fn read(&self, path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;

    /// Writes the given contents to a file, creating or overwriting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (permissions, disk full, etc.).
    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
