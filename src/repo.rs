//! GitHub repository coordinates.

use std::fmt;
use std::str::FromStr;

/// An `owner/name` pair identifying a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    /// Account or organisation owning the repository.
    pub owner: String,
    /// Repository name, without a `.git` suffix.
    pub name: String,
}

impl RepoSlug {
    /// Creates a slug from its parts.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self { owner: owner.into(), name: name.into() }
    }

    /// Web URL of a commit in this repository.
    #[must_use]
    pub fn commit_url(&self, revision: &str) -> String {
        format!("https://github.com/{}/{}/commit/{revision}", self.owner, self.name)
    }

    /// Parses a git remote URL pointing at github.com.
    ///
    /// Accepts the https, scp-like (`git@github.com:o/r.git`) and `ssh://`
    /// forms. Returns `None` for other hosts or malformed URLs.
    #[must_use]
    pub fn from_remote_url(url: &str) -> Option<Self> {
        let url = url.trim();
        let rest = url
            .strip_prefix("https://github.com/")
            .or_else(|| url.strip_prefix("http://github.com/"))
            .or_else(|| url.strip_prefix("git@github.com:"))
            .or_else(|| url.strip_prefix("ssh://git@github.com/"))?;
        let rest = rest.trim_end_matches('/');
        let rest = rest.strip_suffix(".git").unwrap_or(rest);
        rest.parse().ok()
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoSlug {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(format!("expected a repository in owner/name form, got {s:?}")),
        }
    }
}
