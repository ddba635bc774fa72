//! In-memory git adapter.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::ports::git::GitRepo;
use crate::repo::RepoSlug;

/// Git repository with scripted blame results and a commit log.
#[derive(Debug, Default)]
pub struct MemoryGitRepo {
    revisions: HashMap<(String, usize), String>,
    blame_error: Option<String>,
    origin: Option<RepoSlug>,
    commit_error: Option<String>,
    unchanged: bool,
    commits: Mutex<Vec<(PathBuf, String)>>,
}

impl MemoryGitRepo {
    /// Creates a repository where no line has a revision.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attributes `line` of `file` to `revision`.
    #[must_use]
    pub fn with_revision(mut self, file: &str, line: usize, revision: &str) -> Self {
        self.revisions.insert((file.to_string(), line), revision.to_string());
        self
    }

    /// Makes every blame fail with `message`.
    #[must_use]
    pub fn failing_blame(mut self, message: impl Into<String>) -> Self {
        self.blame_error = Some(message.into());
        self
    }

    /// Sets the repository the `origin` remote points at.
    #[must_use]
    pub fn with_origin(mut self, origin: RepoSlug) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Makes every commit fail with `message`.
    #[must_use]
    pub fn failing_commit(mut self, message: impl Into<String>) -> Self {
        self.commit_error = Some(message.into());
        self
    }

    /// Reports every path as unchanged, so nothing gets committed.
    #[must_use]
    pub fn without_changes(mut self) -> Self {
        self.unchanged = true;
        self
    }

    /// Returns the `(path, message)` pairs committed so far.
    #[must_use]
    pub fn commits(&self) -> Vec<(PathBuf, String)> {
        self.commits.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl GitRepo for MemoryGitRepo {
    fn revision_for_line(
        &self,
        path: &Path,
        line: usize,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(message) = &self.blame_error {
            return Err(message.clone().into());
        }
        let key = (path.to_string_lossy().into_owned(), line);
        Ok(self.revisions.get(&key).cloned())
    }

    fn commit_and_push(
        &self,
        path: &Path,
        message: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(error) = &self.commit_error {
            return Err(error.clone().into());
        }
        if self.unchanged {
            return Ok(false);
        }
        let mut commits = self.commits.lock().unwrap_or_else(PoisonError::into_inner);
        commits.push((path.to_path_buf(), message.to_string()));
        Ok(true)
    }

    fn origin_repo(&self) -> Result<Option<RepoSlug>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.origin.clone())
    }
}
