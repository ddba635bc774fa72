//! Reconciliation of extracted TODOs against tracked issues.
//!
//! Planning is pure: [`plan_sync`] reads the current records and the
//! tracker state and returns the actions that would bring the tracker in
//! line. [`apply::apply_plan`] carries a plan out; a dry run only prints
//! [`format_plan`].
//!
//! Records and issues are matched by exact title. Only open issues carrying
//! the ownership label are ever closed, so issues filed by people are left
//! alone even when their title matches a TODO.

pub mod apply;

use std::collections::HashMap;
use std::fmt::Write;

use crate::ports::{ColorSource, Issue, IssueState, Label};
use crate::repo::RepoSlug;
use crate::todo::TodoRecord;

/// Label marking issues created by this tool.
pub const DEFAULT_MARKER: &str = "todo-md";

/// An issue to open for a TODO with no tracked counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    /// Issue title; the TODO text.
    pub title: String,
    /// Provenance of the TODO.
    pub body: String,
    /// Ownership marker followed by the TODO's labels.
    pub labels: Vec<String>,
}

/// A tracked issue whose TODO is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    /// Tracker issue number.
    pub number: u64,
    /// Issue title.
    pub title: String,
}

/// A tracked issue missing some of its TODO's labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelUpdate {
    /// Tracker issue number.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Labels to add.
    pub labels: Vec<String>,
}

/// Actions that reconcile the tracker with the current TODOs.
///
/// Labels must be created before the issues that reference them; the
/// fields are listed in the order they are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Labels missing from the tracker.
    pub labels_to_create: Vec<Label>,
    /// Issues to open.
    pub issues_to_create: Vec<NewIssue>,
    /// Tracked issues to label.
    pub labels_to_add: Vec<LabelUpdate>,
    /// Issues to close.
    pub issues_to_close: Vec<IssueRef>,
}

impl SyncPlan {
    /// Returns `true` when there is nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels_to_create.is_empty()
            && self.issues_to_create.is_empty()
            && self.labels_to_add.is_empty()
            && self.issues_to_close.is_empty()
    }

    /// Total number of actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels_to_create.len()
            + self.issues_to_create.len()
            + self.labels_to_add.len()
            + self.issues_to_close.len()
    }
}

/// Tracker state and settings a plan is computed against.
pub struct PlanContext<'a> {
    /// Every open issue in the tracker.
    pub open_issues: &'a [Issue],
    /// Names of the labels that already exist.
    pub existing_labels: &'a [String],
    /// Ownership label.
    pub marker: &'a str,
    /// Repository, for commit links in issue bodies.
    pub repo: &'a RepoSlug,
    /// Colors for new labels.
    pub colors: &'a dyn ColorSource,
}

/// Computes the actions needed to reconcile `records` with the tracker.
#[must_use]
pub fn plan_sync(records: &[TodoRecord], ctx: &PlanContext<'_>) -> SyncPlan {
    let owned: Vec<&Issue> = ctx
        .open_issues
        .iter()
        .filter(|issue| issue.state == IssueState::Open && issue.has_label(ctx.marker))
        .collect();

    SyncPlan {
        labels_to_create: missing_labels(records, ctx),
        issues_to_create: issues_to_create(records, &owned, ctx),
        labels_to_add: labels_to_add(records, &owned),
        issues_to_close: owned
            .iter()
            .filter(|issue| !records.iter().any(|r| r.title == issue.title))
            .map(|issue| IssueRef { number: issue.number, title: issue.title.clone() })
            .collect(),
    }
}

/// Marker plus every record label, minus what the tracker already has.
fn missing_labels(records: &[TodoRecord], ctx: &PlanContext<'_>) -> Vec<Label> {
    let mut wanted: Vec<&str> = vec![ctx.marker];
    for label in records.iter().flat_map(|r| &r.labels) {
        if !wanted.iter().any(|w| w.eq_ignore_ascii_case(label)) {
            wanted.push(label);
        }
    }

    wanted
        .into_iter()
        .filter(|name| !ctx.existing_labels.iter().any(|e| e.eq_ignore_ascii_case(name)))
        .map(|name| Label {
            name: name.to_string(),
            color: ctx.colors.next_color(),
            description: if name == ctx.marker {
                "Issues tracked from TODO comments".to_string()
            } else {
                "Label from TODO comments".to_string()
            },
        })
        .collect()
}

/// One new issue per distinct untracked title, in first-seen order.
///
/// Records sharing a title are one entity: the issue lists every location
/// and carries the union of their labels.
fn issues_to_create(
    records: &[TodoRecord],
    owned: &[&Issue],
    ctx: &PlanContext<'_>,
) -> Vec<NewIssue> {
    let mut order: Vec<&str> = Vec::new();
    let mut by_title: HashMap<&str, Vec<&TodoRecord>> = HashMap::new();
    for record in records {
        if owned.iter().any(|issue| issue.title == record.title) {
            continue;
        }
        by_title
            .entry(record.title.as_str())
            .or_insert_with(|| {
                order.push(record.title.as_str());
                Vec::new()
            })
            .push(record);
    }

    order
        .into_iter()
        .map(|title| {
            let sources = &by_title[title];
            let mut labels = vec![ctx.marker.to_string()];
            for label in sources.iter().flat_map(|r| &r.labels) {
                if !labels.iter().any(|l| l.eq_ignore_ascii_case(label)) {
                    labels.push(label.clone());
                }
            }
            NewIssue { title: title.to_string(), body: issue_body(sources, ctx.repo), labels }
        })
        .collect()
}

/// Labels a TODO carries that its tracked issue lacks, per owned issue.
fn labels_to_add(records: &[TodoRecord], owned: &[&Issue]) -> Vec<LabelUpdate> {
    owned
        .iter()
        .filter_map(|issue| {
            let mut missing: Vec<String> = Vec::new();
            for label in records.iter().filter(|r| r.title == issue.title).flat_map(|r| &r.labels) {
                if !issue.has_label(label) && !missing.iter().any(|m| m.eq_ignore_ascii_case(label))
                {
                    missing.push(label.clone());
                }
            }
            (!missing.is_empty()).then(|| LabelUpdate {
                number: issue.number,
                title: issue.title.clone(),
                labels: missing,
            })
        })
        .collect()
}

/// Builds the issue body listing where the TODO lives.
fn issue_body(sources: &[&TodoRecord], repo: &RepoSlug) -> String {
    let mut body = String::from("This issue tracks a `TODO` comment found in the source tree.\n\n");
    for record in sources {
        let _ = write!(body, "- `{}`, line {}", record.file, record.line);
        if let Some(rev) = &record.revision {
            let _ = write!(body, " ([commit]({}))", repo.commit_url(rev));
        }
        body.push('\n');
    }
    body.push_str("\nIt is closed automatically once the comment is removed.\n");
    body
}

/// Formats a plan as a human-readable report.
#[must_use]
pub fn format_plan(plan: &SyncPlan) -> String {
    if plan.is_empty() {
        return "Nothing to sync.".to_string();
    }

    let mut lines = Vec::new();
    for label in &plan.labels_to_create {
        lines.push(format!("  CREATE LABEL {} (#{})", label.name, label.color));
    }
    for issue in &plan.issues_to_create {
        lines.push(format!("  CREATE ISSUE {} [{}]", issue.title, issue.labels.join(", ")));
    }
    for update in &plan.labels_to_add {
        lines.push(format!(
            "  LABEL ISSUE #{}: {} [{}]",
            update.number,
            update.title,
            update.labels.join(", ")
        ));
    }
    for issue in &plan.issues_to_close {
        lines.push(format!("  CLOSE ISSUE #{}: {}", issue.number, issue.title));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::FixedColor;

    fn todo(title: &str, labels: &[&str]) -> TodoRecord {
        TodoRecord {
            title: title.to_string(),
            labels: labels.iter().map(ToString::to_string).collect(),
            file: "src/lib.rs".to_string(),
            line: 1,
            revision: None,
        }
    }

    fn issue(number: u64, title: &str, labels: &[&str]) -> Issue {
        Issue {
            number,
            title: title.to_string(),
            labels: labels.iter().map(ToString::to_string).collect(),
            state: IssueState::Open,
        }
    }

    fn plan(records: &[TodoRecord], issues: &[Issue], labels: &[&str]) -> SyncPlan {
        let labels: Vec<String> = labels.iter().map(ToString::to_string).collect();
        let repo = RepoSlug::new("acme", "widgets");
        let colors = FixedColor::default();
        let ctx = PlanContext {
            open_issues: issues,
            existing_labels: &labels,
            marker: DEFAULT_MARKER,
            repo: &repo,
            colors: &colors,
        };
        plan_sync(records, &ctx)
    }

    #[test]
    fn creates_issue_for_new_todo() {
        let result = plan(&[todo("fix X", &[])], &[], &[DEFAULT_MARKER]);
        assert_eq!(result.issues_to_create.len(), 1);
        assert_eq!(result.issues_to_create[0].title, "fix X");
        assert_eq!(result.issues_to_create[0].labels, [DEFAULT_MARKER]);
        assert!(result.issues_to_close.is_empty());
        assert!(result.labels_to_create.is_empty());
    }

    #[test]
    fn matching_titles_yield_empty_plan() {
        let records = [todo("a", &["bug"]), todo("b", &[])];
        let issues = [issue(1, "a", &[DEFAULT_MARKER, "bug"]), issue(2, "b", &[DEFAULT_MARKER])];
        let result = plan(&records, &issues, &[DEFAULT_MARKER, "bug"]);
        assert!(result.is_empty(), "{result:?}");
    }

    #[test]
    fn tracked_issue_gains_new_todo_labels() {
        let records = [todo("a", &["bug", "Perf"]), todo("a", &["perf", "ui"])];
        let issues = [issue(1, "a", &[DEFAULT_MARKER, "bug"]), issue(2, "b", &[DEFAULT_MARKER])];
        let result = plan(&records, &issues, &[DEFAULT_MARKER, "bug", "perf", "ui"]);
        assert_eq!(
            result.labels_to_add,
            [LabelUpdate { number: 1, title: "a".into(), labels: vec!["Perf".into(), "ui".into()] }]
        );
        assert!(result.issues_to_create.is_empty());
    }

    #[test]
    fn closes_owned_issue_whose_todo_is_gone() {
        let issues = [issue(9, "stale", &[DEFAULT_MARKER])];
        let result = plan(&[], &issues, &[DEFAULT_MARKER]);
        assert_eq!(result.issues_to_close, [IssueRef { number: 9, title: "stale".into() }]);
    }

    #[test]
    fn never_closes_unowned_issue() {
        let issues = [issue(9, "stale", &["bug"])];
        let result = plan(&[], &issues, &[DEFAULT_MARKER]);
        assert!(result.issues_to_close.is_empty());
    }

    #[test]
    fn unowned_issue_with_same_title_does_not_suppress_creation() {
        let issues = [issue(3, "fix X", &[])];
        let result = plan(&[todo("fix X", &[])], &issues, &[DEFAULT_MARKER]);
        assert_eq!(result.issues_to_create.len(), 1);
    }

    #[test]
    fn closed_issue_is_not_a_match() {
        let mut closed = issue(4, "fix X", &[DEFAULT_MARKER]);
        closed.state = IssueState::Closed;
        let result = plan(&[todo("fix X", &[])], &[closed], &[DEFAULT_MARKER]);
        assert_eq!(result.issues_to_create.len(), 1);
        assert!(result.issues_to_close.is_empty());
    }

    #[test]
    fn title_match_is_case_sensitive() {
        let issues = [issue(5, "Fix X", &[DEFAULT_MARKER])];
        let result = plan(&[todo("fix X", &[])], &issues, &[DEFAULT_MARKER]);
        assert_eq!(result.issues_to_create.len(), 1);
        assert_eq!(result.issues_to_close.len(), 1);
    }

    #[test]
    fn ensures_marker_and_record_labels() {
        let records = [todo("a", &["ui", "perf"]), todo("b", &["Perf", "docs"])];
        let result = plan(&records, &[], &["docs"]);
        let names: Vec<&str> = result.labels_to_create.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, [DEFAULT_MARKER, "ui", "perf"]);
        assert!(result.labels_to_create.iter().all(|l| l.color == "ededed"));
    }

    #[test]
    fn duplicate_titles_make_one_issue() {
        let mut second = todo("dedupe me", &["b"]);
        second.file = "src/other.rs".to_string();
        second.line = 40;
        second.revision = Some("abc123".to_string());
        let records = [todo("dedupe me", &["a"]), second];

        let result = plan(&records, &[], &[]);
        assert_eq!(result.issues_to_create.len(), 1);
        let created = &result.issues_to_create[0];
        assert_eq!(created.labels, [DEFAULT_MARKER, "a", "b"]);
        assert!(created.body.contains("- `src/lib.rs`, line 1\n"));
        assert!(created.body.contains(
            "- `src/other.rs`, line 40 ([commit](https://github.com/acme/widgets/commit/abc123))"
        ));
    }

    #[test]
    fn format_plan_lists_every_action() {
        let plan = SyncPlan {
            labels_to_create: vec![Label {
                name: "ui".into(),
                color: "123456".into(),
                description: String::new(),
            }],
            issues_to_create: vec![NewIssue {
                title: "fix X".into(),
                body: String::new(),
                labels: vec![DEFAULT_MARKER.into(), "ui".into()],
            }],
            labels_to_add: vec![LabelUpdate {
                number: 3,
                title: "tidy".into(),
                labels: vec!["perf".into()],
            }],
            issues_to_close: vec![IssueRef { number: 7, title: "stale".into() }],
        };
        let output = format_plan(&plan);
        assert!(output.contains("CREATE LABEL ui (#123456)"));
        assert!(output.contains("CREATE ISSUE fix X [todo-md, ui]"));
        assert!(output.contains("LABEL ISSUE #3: tidy [perf]"));
        assert!(output.contains("CLOSE ISSUE #7: stale"));
        assert_eq!(plan.len(), 4);
    }

    #[test]
    fn format_plan_empty() {
        assert_eq!(format_plan(&SyncPlan::default()), "Nothing to sync.");
    }
}
