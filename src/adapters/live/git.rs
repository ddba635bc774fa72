//! Live git adapter using `git` CLI commands.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::debug;

use crate::ports::git::GitRepo;
use crate::repo::RepoSlug;

/// Author used for summary commits.
const COMMIT_AUTHOR_NAME: &str = "github-actions[bot]";
const COMMIT_AUTHOR_EMAIL: &str = "41898282+github-actions[bot]@users.noreply.github.com";

/// Live git adapter that shells out to the `git` CLI inside a working tree.
pub struct LiveGitRepo {
    root: PathBuf,
}

impl LiveGitRepo {
    /// Creates an adapter running git commands in `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn git(&self, args: &[&str]) -> Result<Output, Box<dyn std::error::Error + Send + Sync>> {
        let output = Command::new("git").current_dir(&self.root).args(args).output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("git {} failed: {}", args.join(" "), stderr.trim()).into());
        }
        Ok(output)
    }
}

/// Reads the commit id from the first line of `git blame --porcelain`.
///
/// Uncommitted lines are attributed to the all-zero id, reported as `None`.
fn parse_blame_revision(porcelain: &str) -> Option<String> {
    let sha = porcelain.split_whitespace().next()?;
    if sha.is_empty() || sha.bytes().all(|b| b == b'0') {
        return None;
    }
    Some(sha.to_string())
}

impl GitRepo for LiveGitRepo {
    fn revision_for_line(
        &self,
        path: &Path,
        line: usize,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>> {
        let range = format!("{line},{line}");
        let file = path.to_string_lossy();
        let output = self.git(&["blame", "--porcelain", "-L", &range, "--", &file])?;
        Ok(parse_blame_revision(&String::from_utf8_lossy(&output.stdout)))
    }

    fn commit_and_push(
        &self,
        path: &Path,
        message: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let file = path.to_string_lossy();
        let status = self.git(&["status", "--porcelain", "--", &file])?;
        if status.stdout.iter().all(u8::is_ascii_whitespace) {
            debug!(path = %file, "summary unchanged, nothing to commit");
            return Ok(false);
        }

        self.git(&["add", "--", &file])?;
        self.git(&[
            "-c",
            &format!("user.name={COMMIT_AUTHOR_NAME}"),
            "-c",
            &format!("user.email={COMMIT_AUTHOR_EMAIL}"),
            "commit",
            "-m",
            message,
            "--",
            &file,
        ])?;
        self.git(&["push"])?;
        debug!(path = %file, "pushed summary commit");
        Ok(true)
    }

    fn origin_repo(&self) -> Result<Option<RepoSlug>, Box<dyn std::error::Error + Send + Sync>> {
        let output = self.git(&["remote", "get-url", "origin"])?;
        Ok(RepoSlug::from_remote_url(&String::from_utf8_lossy(&output.stdout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_committed_blame() {
        let porcelain = "3f2a9c1e 12 12 1\nauthor Someone\n\tlet x = 1; // TODO: tidy\n";
        assert_eq!(parse_blame_revision(porcelain).as_deref(), Some("3f2a9c1e"));
    }

    #[test]
    fn uncommitted_blame_has_no_revision() {
        let porcelain = "0000000000000000000000000000000000000000 1 1 1\nauthor Not Committed Yet\n";
        assert_eq!(parse_blame_revision(porcelain), None);
        assert_eq!(parse_blame_revision(""), None);
    }

    #[test]
    fn blame_outside_a_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "// TODO: x\n").unwrap();
        let git = LiveGitRepo::new(dir.path());
        assert!(git.revision_for_line(Path::new("a.rs"), 1).is_err());
    }
}
