//! In-memory issue tracker that journals every call.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::ports::issues::{Issue, IssueState, IssueTracker, Label, TrackerFuture};

/// One call made against a [`MemoryIssueTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCall {
    /// `list_open_issues`
    ListOpenIssues,
    /// `list_labels`
    ListLabels,
    /// `create_label`, with the label name.
    CreateLabel(String),
    /// `create_issue`, with the title.
    CreateIssue(String),
    /// `add_labels`, with the issue number and labels.
    AddLabels(u64, Vec<String>),
    /// `close_issue`, with the issue number.
    CloseIssue(u64),
}

impl TrackerCall {
    /// Returns `true` for calls that mutate tracker state.
    #[must_use]
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::ListOpenIssues | Self::ListLabels)
    }
}

#[derive(Debug, Default)]
struct TrackerState {
    issues: Vec<Issue>,
    labels: Vec<String>,
    journal: Vec<TrackerCall>,
    add_label_failures: usize,
}

/// Issue tracker held in memory.
///
/// Behaves like GitHub where it matters to a sync run: label names are
/// unique ignoring case, numbers are assigned sequentially and closed
/// issues drop out of [`IssueTracker::list_open_issues`].
#[derive(Debug, Default)]
pub struct MemoryIssueTracker {
    state: Mutex<TrackerState>,
    read_error: Option<String>,
    failing_titles: HashSet<String>,
}

impl MemoryIssueTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an existing label.
    #[must_use]
    pub fn with_label(self, name: &str) -> Self {
        self.lock().labels.push(name.to_string());
        self
    }

    /// Adds an existing issue with the next free number.
    #[must_use]
    pub fn with_issue(self, title: &str, labels: &[&str], state: IssueState) -> Self {
        {
            let mut guard = self.lock();
            let number = next_number(&guard.issues);
            guard.issues.push(Issue {
                number,
                title: title.to_string(),
                labels: labels.iter().map(ToString::to_string).collect(),
                state,
            });
        }
        self
    }

    /// Makes both listing calls fail with `message`.
    #[must_use]
    pub fn failing_reads(mut self, message: impl Into<String>) -> Self {
        self.read_error = Some(message.into());
        self
    }

    /// Makes `create_issue` fail for the given title.
    #[must_use]
    pub fn failing_create(mut self, title: &str) -> Self {
        self.failing_titles.insert(title.to_string());
        self
    }

    /// Makes the next `count` calls to `add_labels` fail.
    #[must_use]
    pub fn failing_add_labels(self, count: usize) -> Self {
        self.lock().add_label_failures = count;
        self
    }

    /// Returns every call made so far, in order.
    #[must_use]
    pub fn journal(&self) -> Vec<TrackerCall> {
        self.lock().journal.clone()
    }

    /// Returns every issue, open or closed.
    #[must_use]
    pub fn issues(&self) -> Vec<Issue> {
        self.lock().issues.clone()
    }

    /// Returns every label name.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.lock().labels.clone()
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn next_number(issues: &[Issue]) -> u64 {
    issues.iter().map(|i| i.number).max().unwrap_or(0) + 1
}

fn ready<T: Send + 'static>(
    result: Result<T, Box<dyn std::error::Error + Send + Sync>>,
) -> TrackerFuture<'static, T> {
    Box::pin(std::future::ready(result))
}

impl IssueTracker for MemoryIssueTracker {
    fn list_open_issues(&self) -> TrackerFuture<'_, Vec<Issue>> {
        let mut state = self.lock();
        state.journal.push(TrackerCall::ListOpenIssues);
        if let Some(message) = &self.read_error {
            return ready(Err(message.clone().into()));
        }
        let open = state.issues.iter().filter(|i| i.state == IssueState::Open).cloned().collect();
        ready(Ok(open))
    }

    fn list_labels(&self) -> TrackerFuture<'_, Vec<String>> {
        let mut state = self.lock();
        state.journal.push(TrackerCall::ListLabels);
        if let Some(message) = &self.read_error {
            return ready(Err(message.clone().into()));
        }
        ready(Ok(state.labels.clone()))
    }

    fn create_label<'a>(&'a self, label: &'a Label) -> TrackerFuture<'a, ()> {
        let mut state = self.lock();
        state.journal.push(TrackerCall::CreateLabel(label.name.clone()));
        if state.labels.iter().any(|l| l.eq_ignore_ascii_case(&label.name)) {
            return ready(Err(format!("label {} already exists", label.name).into()));
        }
        state.labels.push(label.name.clone());
        ready(Ok(()))
    }

    fn create_issue<'a>(
        &'a self,
        title: &'a str,
        _body: &'a str,
        labels: &'a [String],
    ) -> TrackerFuture<'a, u64> {
        let mut state = self.lock();
        state.journal.push(TrackerCall::CreateIssue(title.to_string()));
        if self.failing_titles.contains(title) {
            return ready(Err(format!("rejected issue {title:?}").into()));
        }
        let number = next_number(&state.issues);
        state.issues.push(Issue {
            number,
            title: title.to_string(),
            labels: labels.to_vec(),
            state: IssueState::Open,
        });
        ready(Ok(number))
    }

    fn add_labels<'a>(&'a self, number: u64, labels: &'a [String]) -> TrackerFuture<'a, ()> {
        let mut state = self.lock();
        state.journal.push(TrackerCall::AddLabels(number, labels.to_vec()));
        if state.add_label_failures > 0 {
            state.add_label_failures -= 1;
            return ready(Err(format!("cannot label issue #{number}").into()));
        }
        let Some(issue) = state.issues.iter_mut().find(|i| i.number == number) else {
            return ready(Err(format!("issue #{number} not found").into()));
        };
        for label in labels {
            if !issue.has_label(label) {
                issue.labels.push(label.clone());
            }
        }
        ready(Ok(()))
    }

    fn close_issue(&self, number: u64) -> TrackerFuture<'_, ()> {
        let mut state = self.lock();
        state.journal.push(TrackerCall::CloseIssue(number));
        let Some(issue) = state.issues.iter_mut().find(|i| i.number == number) else {
            return ready(Err(format!("issue #{number} not found").into()));
        };
        issue.state = IssueState::Closed;
        ready(Ok(()))
    }
}
