//! TODO records extracted from source comments.

pub mod extract;

use serde::{Deserialize, Serialize};

/// One `TODO:` comment found in a source file.
///
/// The title is the identity key: a record and a tracked issue are the
/// same entity exactly when their titles are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRecord {
    /// Comment text between the marker and an optional `Label:` suffix.
    pub title: String,
    /// Labels from the `Label:` suffix, in order of first occurrence.
    pub labels: Vec<String>,
    /// Repository-relative path of the file.
    pub file: String,
    /// 1-based line number.
    pub line: usize,
    /// Commit that last touched the line, when blame succeeded.
    pub revision: Option<String>,
}

pub use extract::{
    extract_todos, parse_line, scan_tree, ExtractError, ExtractWarning, Extraction, ParsedTodo,
};
