//! Errors that abort a run.

use thiserror::Error;

use crate::config::ConfigError;
use crate::todo::ExtractError;

/// A fatal failure of a sync or scan run.
///
/// Per-action tracker failures are not fatal; they are collected in the
/// run report and surface as [`SyncError::ActionsFailed`] only at exit.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid or missing configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The source tree could not be scanned.
    #[error(transparent)]
    Extract(#[from] ExtractError),
    /// Existing issues or labels could not be read.
    #[error("failed to read tracker state: {0}")]
    TrackerRead(String),
    /// The summary could not be written.
    #[error("failed to write summary to {path}: {message}")]
    Persist {
        /// Summary path.
        path: String,
        /// Underlying error.
        message: String,
    },
    /// The summary could not be committed or pushed.
    #[error("failed to commit summary: {0}")]
    Commit(String),
    /// The HTTP client or runtime could not be set up.
    #[error("failed to start: {0}")]
    Setup(String),
    /// Some tracker actions failed while the rest of the run completed.
    #[error("{failed} of {attempted} tracker actions failed")]
    ActionsFailed {
        /// Number of failed actions.
        failed: usize,
        /// Number of attempted actions.
        attempted: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure() {
        let err = SyncError::Persist { path: "TODO_SUMMARY.md".into(), message: "read-only".into() };
        assert_eq!(err.to_string(), "failed to write summary to TODO_SUMMARY.md: read-only");

        let err = SyncError::ActionsFailed { failed: 2, attempted: 5 };
        assert_eq!(err.to_string(), "2 of 5 tracker actions failed");
    }

    #[test]
    fn config_errors_pass_through() {
        let err = SyncError::from(ConfigError::MissingToken);
        assert!(err.to_string().starts_with("missing GitHub token"));
    }
}
