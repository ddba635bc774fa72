//! Live filesystem adapter using `std::fs` and `walkdir`.

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;
use walkdir::WalkDir;

use crate::ports::filesystem::FileSystem;

/// Live filesystem adapter backed by real disk I/O.
pub struct LiveFileSystem;

/// Stand-in for an arbitrary descendant of a directory. No real path
/// contains NUL, so only wildcards can match it.
const ANY_DESCENDANT: &str = "\u{0}/\u{0}";

/// Compiles a list of glob patterns into a single matcher.
///
/// # Errors
///
/// Returns an error naming the first invalid pattern.
pub(crate) fn glob_set(patterns: &[String]) -> Result<GlobSet, globset::Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    builder.build()
}

/// Whether `exclude` matches everything below the directory `dir`, so the
/// walk can skip it without reading it.
fn excludes_subtree(exclude: &GlobSet, dir: &Path) -> bool {
    exclude.is_match(dir.join(ANY_DESCENDANT))
}

impl FileSystem for LiveFileSystem {
    fn list_files(
        &self,
        root: &Path,
        include: &[String],
        exclude: &[String],
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let include = glob_set(include)?;
        let exclude = glob_set(exclude)?;

        let walker = WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(|entry| {
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            entry.depth() == 0 || !entry.file_type().is_dir() || !excludes_subtree(&exclude, rel)
        });

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if include.is_match(rel) && !exclude.is_match(rel) {
                files.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
        debug!(root = %root.display(), count = files.len(), "listed files");
        Ok(files)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(std::fs::read(path)?)
    }

    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        Ok(std::fs::write(path, contents)?)
    }
}
