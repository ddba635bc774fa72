//! Executes a [`SyncPlan`] against an issue tracker.

use tracing::{info, warn};

use super::SyncPlan;
use crate::ports::IssueTracker;

/// An action that the tracker rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionFailure {
    /// What was attempted, e.g. `create issue "fix X"`.
    pub action: String,
    /// Error reported by the tracker.
    pub error: String,
}

/// Outcome of applying a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Actions that succeeded.
    pub applied: usize,
    /// Actions that failed, in the order they were attempted.
    pub failures: Vec<ActionFailure>,
}

impl ApplyReport {
    /// Returns `true` when no action failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, action: String, result: Result<(), String>) {
        match result {
            Ok(()) => {
                info!("{action}");
                self.applied += 1;
            }
            Err(error) => {
                warn!(%error, "failed to {action}");
                self.failures.push(ActionFailure { action, error });
            }
        }
    }
}

/// Applies every action of `plan`, one at a time.
///
/// Labels are created first, then issues (with their labels), then missing
/// labels are added to tracked issues, then stale issues are closed. A
/// failed action is recorded and the remaining actions still run.
pub async fn apply_plan(tracker: &dyn IssueTracker, plan: &SyncPlan) -> ApplyReport {
    let mut report = ApplyReport::default();

    for label in &plan.labels_to_create {
        let result = tracker.create_label(label).await.map_err(|e| e.to_string());
        report.record(format!("create label {:?}", label.name), result);
    }

    for issue in &plan.issues_to_create {
        let action = format!("create issue {:?}", issue.title);
        match tracker.create_issue(&issue.title, &issue.body, &issue.labels).await {
            Ok(number) => report.record(format!("{action} as #{number}"), Ok(())),
            Err(e) => report.record(action, Err(e.to_string())),
        }
    }

    for update in &plan.labels_to_add {
        let result =
            tracker.add_labels(update.number, &update.labels).await.map_err(|e| e.to_string());
        report.record(
            format!("label issue #{} with {}", update.number, update.labels.join(", ")),
            result,
        );
    }

    for issue in &plan.issues_to_close {
        let result = tracker.close_issue(issue.number).await.map_err(|e| e.to_string());
        report.record(format!("close issue #{} {:?}", issue.number, issue.title), result);
    }

    report
}
