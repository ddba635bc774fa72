//! Grouped Markdown summary of the TODOs in a tree.
//!
//! The output is byte-stable: groups appear in the order their label is
//! first seen while walking records in extraction order, and records keep
//! that order inside each group.

use std::collections::HashMap;
use std::fmt::Write;

use crate::repo::RepoSlug;
use crate::todo::TodoRecord;

/// Group for records that carry no label.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Top-level heading of the summary document.
const HEADING: &str = "# 📋 TODO Summary";

/// The records filed under one label.
#[derive(Debug, PartialEq, Eq)]
pub struct LabelGroup<'a> {
    /// Label name, or [`UNCATEGORIZED`].
    pub label: String,
    /// Records in extraction order.
    pub records: Vec<&'a TodoRecord>,
}

/// Partitions records by label.
///
/// A record lands in the group of each of its labels, or in
/// [`UNCATEGORIZED`] when it has none.
#[must_use]
pub fn group_by_label(records: &[TodoRecord]) -> Vec<LabelGroup<'_>> {
    let (groups, _) = records.iter().fold(
        (Vec::<LabelGroup<'_>>::new(), HashMap::<&str, usize>::new()),
        |(mut groups, mut index), record| {
            let labels: Vec<&str> = if record.labels.is_empty() {
                vec![UNCATEGORIZED]
            } else {
                record.labels.iter().map(String::as_str).collect()
            };
            for label in labels {
                let slot = *index.entry(label).or_insert_with(|| {
                    groups.push(LabelGroup { label: label.to_string(), records: Vec::new() });
                    groups.len() - 1
                });
                groups[slot].records.push(record);
            }
            (groups, index)
        },
    );
    groups
}

/// Renders the summary document.
///
/// Records with a revision link to that commit in `repo`. Without a
/// repository no links are rendered.
#[must_use]
pub fn render_summary(records: &[TodoRecord], repo: Option<&RepoSlug>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{HEADING}");
    out.push('\n');

    for group in group_by_label(records) {
        let _ = writeln!(out, "## {}", group.label);
        for todo in group.records {
            let _ = write!(out, "- [ ] {} (in `{}`, line {})", todo.title, todo.file, todo.line);
            if let (Some(rev), Some(repo)) = (&todo.revision, repo) {
                let _ = write!(out, " ([commit]({}))", repo.commit_url(rev));
            }
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(title: &str, labels: &[&str], file: &str, line: usize) -> TodoRecord {
        TodoRecord {
            title: title.to_string(),
            labels: labels.iter().map(ToString::to_string).collect(),
            file: file.to_string(),
            line,
            revision: None,
        }
    }

    #[test]
    fn groups_follow_first_seen_order() {
        let records = vec![
            todo("a", &["zeta"], "x.rs", 1),
            todo("b", &[], "x.rs", 2),
            todo("c", &["alpha", "zeta"], "y.rs", 1),
        ];
        let groups = group_by_label(&records);
        let names: Vec<&str> = groups.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(names, ["zeta", UNCATEGORIZED, "alpha"]);

        let zeta: Vec<&str> = groups[0].records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(zeta, ["a", "c"]);
    }

    #[test]
    fn no_records_yields_no_groups() {
        assert!(group_by_label(&[]).is_empty());
        let repo = RepoSlug::new("acme", "widgets");
        assert_eq!(render_summary(&[], Some(&repo)), "# 📋 TODO Summary\n\n");
    }

    #[test]
    fn renders_exact_document() {
        let mut linked = todo("fix bug", &["bug"], "src/lib.rs", 12);
        linked.revision = Some("abc123".to_string());
        let records = vec![linked, todo("write docs", &[], "README.md", 3)];
        let repo = RepoSlug::new("acme", "widgets");

        let expected = "# 📋 TODO Summary\n\
                        \n\
                        ## bug\n\
                        - [ ] fix bug (in `src/lib.rs`, line 12) \
                        ([commit](https://github.com/acme/widgets/commit/abc123))\n\
                        \n\
                        ## uncategorized\n\
                        - [ ] write docs (in `README.md`, line 3)\n\
                        \n";
        assert_eq!(render_summary(&records, Some(&repo)), expected);
    }

    #[test]
    fn omits_links_without_repository() {
        let mut linked = todo("fix bug", &["bug"], "src/lib.rs", 12);
        linked.revision = Some("abc123".to_string());
        let out = render_summary(&[linked], None);
        assert!(out.contains("- [ ] fix bug (in `src/lib.rs`, line 12)\n"), "{out}");
        assert!(!out.contains("commit"));
    }

    #[test]
    fn rendering_is_stable() {
        let records = vec![todo("a", &["y", "x"], "a.rs", 1), todo("b", &["x"], "b.rs", 9)];
        let repo = RepoSlug::new("acme", "widgets");
        assert_eq!(render_summary(&records, Some(&repo)), render_summary(&records, Some(&repo)));
    }
}
