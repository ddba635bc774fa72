//! Git repository port for blame and summary publishing.

use std::path::Path;

use crate::repo::RepoSlug;

/// Provides the version-control operations a sync run needs.
///
/// Abstracting git access keeps extraction and the run pipeline testable
/// without a real repository.
pub trait GitRepo: Send + Sync {
    /// Returns the commit that last touched `line` (1-based) of `path`.
    ///
    /// `Ok(None)` means the line has no commit yet (uncommitted changes).
    ///
    /// # Errors
    ///
    /// Returns an error if blame cannot be computed for the line.
    fn revision_for_line(
        &self,
        path: &Path,
        line: usize,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>;

    /// Stages `path`, commits it with `message` and pushes.
    ///
    /// Returns `false` without committing when `path` has no changes.
    ///
    /// # Errors
    ///
    /// Returns an error if any git step fails.
    fn commit_and_push(
        &self,
        path: &Path,
        message: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;

    /// Returns the GitHub repository the `origin` remote points at, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote cannot be queried.
    fn origin_repo(&self) -> Result<Option<RepoSlug>, Box<dyn std::error::Error + Send + Sync>>;
}
