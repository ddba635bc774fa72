//! Issue tracker port for reading and mutating tracked issues and labels.

use std::error::Error;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

/// Boxed future type alias used by [`IssueTracker`] to keep the trait dyn-compatible.
pub type TrackerFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, Box<dyn Error + Send + Sync>>> + Send + 'a>>;

/// Open or closed state of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    /// The issue is open.
    Open,
    /// The issue has been closed.
    Closed,
}

/// Represents an issue in the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Tracker-assigned issue number.
    pub number: u64,
    /// The issue title.
    pub title: String,
    /// Names of the labels attached to the issue.
    pub labels: Vec<String>,
    /// Whether the issue is open or closed.
    pub state: IssueState,
}

impl Issue {
    /// Returns `true` if the issue carries `label` (case-insensitive, as
    /// GitHub compares label names).
    #[must_use]
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l.eq_ignore_ascii_case(label))
    }
}

/// A label definition to create in the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label name.
    pub name: String,
    /// Display color as six hex digits, without `#`.
    pub color: String,
    /// Short description shown in the tracker UI.
    pub description: String,
}

/// Reads and mutates issues and labels in an external tracker.
///
/// Every call is awaited in sequence by the pipeline, so an implementation
/// never sees overlapping requests from one run.
pub trait IssueTracker: Send + Sync {
    /// Lists every open issue in the repository (pull requests excluded).
    ///
    /// # Errors
    ///
    /// Returns an error if the issues cannot be listed.
    fn list_open_issues(&self) -> TrackerFuture<'_, Vec<Issue>>;

    /// Lists the names of all labels defined in the repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the labels cannot be listed.
    fn list_labels(&self) -> TrackerFuture<'_, Vec<String>>;

    /// Creates a label.
    ///
    /// # Errors
    ///
    /// Returns an error if the label cannot be created.
    fn create_label<'a>(&'a self, label: &'a Label) -> TrackerFuture<'a, ()>;

    /// Creates an issue carrying `labels` and returns its number.
    ///
    /// The labels are set in the same request, so an issue never exists
    /// without its ownership label.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue cannot be created.
    fn create_issue<'a>(
        &'a self,
        title: &'a str,
        body: &'a str,
        labels: &'a [String],
    ) -> TrackerFuture<'a, u64>;

    /// Adds labels to an existing issue, keeping the ones it has.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue does not exist or the labels cannot be added.
    fn add_labels<'a>(&'a self, number: u64, labels: &'a [String]) -> TrackerFuture<'a, ()>;

    /// Closes an issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue cannot be found or closed.
    fn close_issue(&self, number: u64) -> TrackerFuture<'_, ()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_label_ignores_case() {
        let issue = Issue {
            number: 1,
            title: "x".into(),
            labels: vec!["TODO-md".into()],
            state: IssueState::Open,
        };
        assert!(issue.has_label("todo-md"));
        assert!(!issue.has_label("bug"));
    }
}
