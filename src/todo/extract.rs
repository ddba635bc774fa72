//! Extraction of [`TodoRecord`]s from file contents.
//!
//! A line yields a record when it contains `TODO:` (any case). Text after
//! the marker is the title, up to an optional `Label:` suffix holding a
//! comma-separated label list that runs to the end of the line:
//!
//! ```text
//! // TODO: cache parsed manifests Label: perf, build.
//! ```
//!
//! Blame failures and undecodable lines degrade to warnings; only a file
//! that cannot be listed or read stops extraction.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use super::TodoRecord;
use crate::ports::{FileSystem, GitRepo};

static TODO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)TODO:\s*?(.*?)(?:\s+Label:\s*(.+))?$").expect("TODO pattern is valid")
});

/// Comment terminators removed from the end of a line before parsing.
const COMMENT_CLOSERS: [&str; 3] = ["--}}", "*/", "-->"];

/// Title and labels parsed from a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTodo {
    /// Trimmed comment text; may be empty.
    pub title: String,
    /// De-duplicated labels in order of appearance.
    pub labels: Vec<String>,
}

/// A recoverable problem met while extracting records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractWarning {
    /// The line was not valid UTF-8 and was decoded lossily.
    Decode {
        /// Repository-relative path.
        file: String,
        /// 1-based line number.
        line: usize,
    },
    /// Blame failed; the record was emitted without a revision.
    Revision {
        /// Repository-relative path.
        file: String,
        /// 1-based line number.
        line: usize,
        /// Error reported by the git port.
        message: String,
    },
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode { file, line } => {
                write!(f, "{file}:{line}: line is not valid UTF-8, decoded lossily")
            }
            Self::Revision { file, line, message } => {
                write!(f, "{file}:{line}: could not resolve commit: {message}")
            }
        }
    }
}

/// A failure that stops extraction.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The file listing could not be produced.
    #[error("failed to list files under {root}: {message}")]
    List {
        /// Root of the scan.
        root: String,
        /// Underlying error.
        message: String,
    },
    /// A listed file could not be read.
    #[error("failed to read {path}: {message}")]
    Read {
        /// Repository-relative path.
        path: String,
        /// Underlying error.
        message: String,
    },
}

/// Records found in a tree, plus the warnings raised while finding them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Records in file-list order, then line order.
    pub records: Vec<TodoRecord>,
    /// Recoverable problems, in the order they were met.
    pub warnings: Vec<ExtractWarning>,
    /// Number of files read.
    pub files_scanned: usize,
}

/// Parses one line of text.
///
/// Returns `None` when the line carries no `TODO:` marker.
#[must_use]
pub fn parse_line(line: &str) -> Option<ParsedTodo> {
    let line = strip_comment_closer(line);
    let captures = TODO_PATTERN.captures(line)?;
    let title = captures.get(1).map_or("", |m| m.as_str()).trim().to_string();
    let labels = captures.get(2).map(|m| parse_labels(m.as_str())).unwrap_or_default();
    Some(ParsedTodo { title, labels })
}

fn strip_comment_closer(line: &str) -> &str {
    let trimmed = line.trim_end();
    COMMENT_CLOSERS
        .iter()
        .find_map(|closer| trimmed.strip_suffix(*closer))
        .map_or(trimmed, str::trim_end)
}

fn parse_labels(raw: &str) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        let entry = entry.strip_suffix(&['.', ','][..]).unwrap_or(entry);
        if entry.is_empty() || labels.iter().any(|l| l == entry) {
            continue;
        }
        labels.push(entry.to_string());
    }
    labels
}

/// Lists the files under `root` and extracts every TODO from them.
///
/// `skip` names repository-relative paths left out of the scan (the
/// summary file, which would otherwise be scanned on the next run).
///
/// # Errors
///
/// Returns an error if the listing fails or a listed file cannot be read.
pub fn scan_tree(
    fs: &dyn FileSystem,
    git: Option<&dyn GitRepo>,
    root: &Path,
    include: &[String],
    exclude: &[String],
    skip: &[String],
) -> Result<Extraction, ExtractError> {
    let files = fs.list_files(root, include, exclude).map_err(|e| ExtractError::List {
        root: root.display().to_string(),
        message: e.to_string(),
    })?;
    let files: Vec<String> = files.into_iter().filter(|f| !skip.contains(f)).collect();
    extract_todos(fs, git, root, &files)
}

/// Extracts TODO records from `files`, in the given order.
///
/// When `git` is `None` no blame is attempted and every revision is absent.
///
/// # Errors
///
/// Returns an error if a file cannot be read.
pub fn extract_todos(
    fs: &dyn FileSystem,
    git: Option<&dyn GitRepo>,
    root: &Path,
    files: &[String],
) -> Result<Extraction, ExtractError> {
    let mut extraction = Extraction::default();

    for file in files {
        let bytes = fs
            .read(&root.join(file))
            .map_err(|e| ExtractError::Read { path: file.clone(), message: e.to_string() })?;
        extraction.files_scanned += 1;

        for (index, raw) in bytes.split(|b| *b == b'\n').enumerate() {
            let line_no = index + 1;
            let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
            let (text, lossy) = match std::str::from_utf8(raw) {
                Ok(text) => (std::borrow::Cow::Borrowed(text), false),
                Err(_) => (String::from_utf8_lossy(raw), true),
            };
            let Some(parsed) = parse_line(&text) else { continue };

            if lossy {
                extraction.warnings.push(ExtractWarning::Decode { file: file.clone(), line: line_no });
            }

            let revision = match git.map(|git| git.revision_for_line(Path::new(file), line_no)) {
                None | Some(Ok(None)) => None,
                Some(Ok(Some(rev))) => Some(rev),
                Some(Err(e)) => {
                    extraction.warnings.push(ExtractWarning::Revision {
                        file: file.clone(),
                        line: line_no,
                        message: e.to_string(),
                    });
                    None
                }
            };

            extraction.records.push(TodoRecord {
                title: parsed.title,
                labels: parsed.labels,
                file: file.clone(),
                line: line_no,
                revision,
            });
        }
    }

    Ok(extraction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{MemoryFileSystem, MemoryGitRepo};

    fn labels(parsed: &ParsedTodo) -> Vec<&str> {
        parsed.labels.iter().map(String::as_str).collect()
    }

    #[test]
    fn parses_title_and_labels() {
        let parsed = parse_line("// TODO: fix bug Label: a, b., c").unwrap();
        assert_eq!(parsed.title, "fix bug");
        assert_eq!(labels(&parsed), ["a", "b", "c"]);
    }

    #[test]
    fn parses_line_without_labels() {
        let parsed = parse_line("# TODO: no labels here").unwrap();
        assert_eq!(parsed.title, "no labels here");
        assert!(parsed.labels.is_empty());
    }

    #[test]
    fn marker_is_case_insensitive() {
        let parsed = parse_line("/* todo: lower case label: x */").unwrap();
        assert_eq!(parsed.title, "lower case");
        assert_eq!(labels(&parsed), ["x"]);
    }

    #[test]
    fn non_matching_lines_are_skipped() {
        assert!(parse_line("fn main() {}").is_none());
        assert!(parse_line("TODO without colon").is_none());
    }

    #[test]
    fn empty_title_still_parses() {
        let parsed = parse_line("// TODO:").unwrap();
        assert_eq!(parsed.title, "");
        assert!(parsed.labels.is_empty());

        let parsed = parse_line("// TODO: Label: docs").unwrap();
        assert_eq!(parsed.title, "");
        assert_eq!(labels(&parsed), ["docs"]);

        let parsed = parse_line("# TODO:   label: a, b").unwrap();
        assert_eq!(parsed.title, "");
        assert_eq!(labels(&parsed), ["a", "b"]);
    }

    #[test]
    fn empty_and_duplicate_labels_are_dropped() {
        let parsed = parse_line("TODO: tidy Label: ui,, ui, ,").unwrap();
        assert_eq!(labels(&parsed), ["ui"]);
    }

    #[test]
    fn strips_template_comment_closers() {
        let parsed = parse_line("{{-- TODO: move to partial --}}").unwrap();
        assert_eq!(parsed.title, "move to partial");

        let parsed = parse_line("<!-- TODO: alt text Label: a11y -->").unwrap();
        assert_eq!(parsed.title, "alt text");
        assert_eq!(labels(&parsed), ["a11y"]);
    }

    #[test]
    fn extracts_in_file_then_line_order() {
        let fs = MemoryFileSystem::new()
            .with_file("b.rs", "// TODO: second file\n")
            .with_file("a.rs", "fn x() {}\n// TODO: later line\r\n// TODO: earlier? no, last\n");
        let files = vec!["b.rs".to_string(), "a.rs".to_string()];

        let extraction = extract_todos(&fs, None, Path::new(""), &files).unwrap();
        let found: Vec<(&str, usize)> =
            extraction.records.iter().map(|r| (r.file.as_str(), r.line)).collect();
        assert_eq!(found, [("b.rs", 1), ("a.rs", 2), ("a.rs", 3)]);
        assert_eq!(extraction.records[1].title, "later line");
        assert_eq!(extraction.files_scanned, 2);
        assert!(extraction.warnings.is_empty());
    }

    #[test]
    fn extraction_is_repeatable() {
        let fs = MemoryFileSystem::new()
            .with_file("src/lib.rs", "// TODO: one Label: a\n// TODO: two\n")
            .with_file("README.md", "TODO: three Label: docs, a\n");
        let git = MemoryGitRepo::new().with_revision("src/lib.rs", 1, "c0ffee");
        let files = vec!["README.md".to_string(), "src/lib.rs".to_string()];

        let first = extract_todos(&fs, Some(&git), Path::new(""), &files).unwrap();
        let second = extract_todos(&fs, Some(&git), Path::new(""), &files).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.records.len(), 3);
    }

    #[test]
    fn revisions_come_from_blame() {
        let fs = MemoryFileSystem::new().with_file("a.rs", "// TODO: blamed\n// TODO: fresh\n");
        let git = MemoryGitRepo::new().with_revision("a.rs", 1, "abc123");

        let extraction =
            extract_todos(&fs, Some(&git), Path::new(""), &["a.rs".to_string()]).unwrap();
        assert_eq!(extraction.records[0].revision.as_deref(), Some("abc123"));
        assert_eq!(extraction.records[1].revision, None);
        assert!(extraction.warnings.is_empty());
    }

    #[test]
    fn blame_failure_degrades_to_warning() {
        let fs = MemoryFileSystem::new().with_file("a.rs", "// TODO: keep going\n");
        let git = MemoryGitRepo::new().failing_blame("not a git repository");

        let extraction =
            extract_todos(&fs, Some(&git), Path::new(""), &["a.rs".to_string()]).unwrap();
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].revision, None);
        assert!(matches!(
            &extraction.warnings[..],
            [ExtractWarning::Revision { line: 1, message, .. }] if message.contains("not a git")
        ));
    }

    #[test]
    fn invalid_utf8_line_is_decoded_lossily() {
        let mut bytes = b"// TODO: caf".to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b" menu\n");
        let fs = MemoryFileSystem::new().with_bytes("menu.html", bytes);

        let extraction =
            extract_todos(&fs, None, Path::new(""), &["menu.html".to_string()]).unwrap();
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].title, "caf\u{FFFD} menu");
        assert_eq!(
            extraction.warnings,
            [ExtractWarning::Decode { file: "menu.html".into(), line: 1 }]
        );
    }

    #[test]
    fn unreadable_file_is_fatal() {
        let fs = MemoryFileSystem::new();
        let err = extract_todos(&fs, None, Path::new(""), &["gone.rs".to_string()]).unwrap_err();
        assert!(matches!(err, ExtractError::Read { ref path, .. } if path == "gone.rs"));
    }

    #[test]
    fn scan_tree_skips_named_files() {
        let fs = MemoryFileSystem::new()
            .with_file("TODO_SUMMARY.md", "TODO: should not be scanned\n")
            .with_file("main.rs", "// TODO: scanned\n");

        let extraction = scan_tree(
            &fs,
            None,
            Path::new(""),
            &["**/*".to_string()],
            &[],
            &["TODO_SUMMARY.md".to_string()],
        )
        .unwrap();
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0].file, "main.rs");
    }
}
