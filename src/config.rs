//! Run configuration, layered from flags, environment and a YAML file.
//!
//! Flags and their environment variables win over the config file, which
//! wins over the built-in defaults. The config file is `--config` when
//! given, otherwise `.todo-sync.yaml` in the scanned root if it exists.

use std::path::{Path, PathBuf};

use globset::Glob;
use serde::Deserialize;
use thiserror::Error;

use crate::cli::{CommonArgs, SyncArgs};
use crate::reconcile::DEFAULT_MARKER;
use crate::repo::RepoSlug;

/// Config file looked up in the scanned root.
pub const DEFAULT_CONFIG_FILE: &str = ".todo-sync.yaml";
/// Summary document written by a run.
pub const DEFAULT_SUMMARY_FILE: &str = "TODO_SUMMARY.md";

/// Files scanned when no include globs are configured.
pub const DEFAULT_INCLUDE: &[&str] = &["**/*.{rs,js,ts,php,html,md,css,scss}"];
/// Paths skipped when no exclude globs are configured.
pub const DEFAULT_EXCLUDE: &[&str] =
    &["node_modules/**", "vendor/**", ".git/**", "scripts/**", "target/**"];

/// A configuration problem detected before any work starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No tracker credential was supplied.
    #[error("missing GitHub token: pass --github-token or set GITHUB_TOKEN")]
    MissingToken,
    /// The repository could not be determined.
    #[error("cannot determine the GitHub repository: pass --repo owner/name or set GITHUB_REPOSITORY")]
    MissingRepo,
    /// The config file could not be read.
    #[error("failed to read config file {path}: {message}")]
    Read {
        /// Path of the config file.
        path: String,
        /// Underlying error.
        message: String,
    },
    /// An include or exclude pattern is not a valid glob.
    #[error("invalid glob {pattern:?}: {message}")]
    InvalidGlob {
        /// The offending pattern.
        pattern: String,
        /// Parser message.
        message: String,
    },
    /// The config file is not valid.
    #[error("failed to parse config file {path}: {message}")]
    Parse {
        /// Path of the config file.
        path: String,
        /// Underlying error.
        message: String,
    },
}

/// Settings accepted in the YAML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Globs of files to scan.
    pub include: Option<Vec<String>>,
    /// Globs of files to skip.
    pub exclude: Option<Vec<String>>,
    /// Ownership label.
    pub label: Option<String>,
    /// Summary output path, relative to the root.
    pub summary_file: Option<PathBuf>,
    /// Repository in `owner/name` form.
    pub repo: Option<String>,
    /// Whether to attribute TODOs to commits.
    pub blame: Option<bool>,
}

impl FileConfig {
    /// Loads the config file named by `explicit`, or the default file in
    /// `root` when it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or any file is invalid.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = root.join(DEFAULT_CONFIG_FILE);
                if !candidate.exists() {
                    return Ok(Self::default());
                }
                candidate
            }
        };
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|message| ConfigError::Parse {
            path: path.display().to_string(),
            message,
        })
    }

    /// Parses YAML config text. An empty document is the default config.
    ///
    /// # Errors
    ///
    /// Returns the parser's message if the text is not a valid config or
    /// `repo` is not in `owner/name` form.
    pub fn parse(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
        if let Some(repo) = &config.repo {
            repo.parse::<RepoSlug>().map_err(|e| format!("repo: {e}"))?;
        }
        Ok(config)
    }

    /// Repository named by the file. Parsing has already validated it.
    fn repo_slug(&self) -> Option<RepoSlug> {
        self.repo.as_deref().and_then(|repo| repo.parse().ok())
    }
}

/// Fully resolved settings for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Directory scanned for TODOs.
    pub root: PathBuf,
    /// Summary output path, relative to `root` unless absolute.
    pub summary_file: PathBuf,
    /// Tracker credential.
    pub github_token: Option<String>,
    /// Repository, when known without asking git.
    pub repo: Option<RepoSlug>,
    /// Compute and report actions without mutating anything.
    pub dry_run: bool,
    /// Commit and push the summary after writing it.
    pub commit: bool,
    /// Ownership label.
    pub marker: String,
    /// Globs of files to scan.
    pub include: Vec<String>,
    /// Globs of files to skip.
    pub exclude: Vec<String>,
    /// Attribute TODOs to commits with `git blame`.
    pub blame: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            summary_file: PathBuf::from(DEFAULT_SUMMARY_FILE),
            github_token: None,
            repo: None,
            dry_run: false,
            commit: true,
            marker: DEFAULT_MARKER.to_string(),
            include: DEFAULT_INCLUDE.iter().map(ToString::to_string).collect(),
            exclude: DEFAULT_EXCLUDE.iter().map(ToString::to_string).collect(),
            blame: true,
        }
    }
}

impl SyncConfig {
    /// Resolves settings shared by every command.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or names an
    /// invalid repository.
    pub fn from_common(args: &CommonArgs) -> Result<Self, ConfigError> {
        let file = FileConfig::load(&args.root, args.config.as_deref())?;
        let file_repo = file.repo_slug();
        let defaults = Self::default();

        let config = Self {
            root: args.root.clone(),
            summary_file: args
                .summary_file
                .clone()
                .or(file.summary_file)
                .unwrap_or(defaults.summary_file),
            repo: args.repo.clone().or(file_repo),
            marker: file.label.unwrap_or(defaults.marker),
            include: pick(&args.include, file.include, defaults.include),
            exclude: pick(&args.exclude, file.exclude, defaults.exclude),
            blame: !args.no_blame && file.blame.unwrap_or(true),
            ..defaults
        };
        config.check_globs()?;
        Ok(config)
    }

    /// Resolves settings for `sync`, layering its own flags on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded.
    pub fn from_sync(args: &SyncArgs) -> Result<Self, ConfigError> {
        let mut config = Self::from_common(&args.common)?;
        config.github_token = args.github_token.clone().filter(|t| !t.trim().is_empty());
        config.dry_run = args.dry_run;
        config.commit = args.commit;
        if let Some(label) = &args.label {
            config.marker.clone_from(label);
        }
        Ok(config)
    }

    fn check_globs(&self) -> Result<(), ConfigError> {
        for pattern in self.include.iter().chain(&self.exclude) {
            Glob::new(pattern).map_err(|e| ConfigError::InvalidGlob {
                pattern: pattern.clone(),
                message: e.kind().to_string(),
            })?;
        }
        Ok(())
    }

    /// Returns the tracker credential.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingToken`] when none was supplied.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.github_token.as_deref().ok_or(ConfigError::MissingToken)
    }

    /// Path the summary is written to.
    #[must_use]
    pub fn summary_path(&self) -> PathBuf {
        self.root.join(&self.summary_file)
    }

    /// Summary path as listed by the file scan, so it can be skipped.
    #[must_use]
    pub fn summary_scan_key(&self) -> String {
        self.summary_file.to_string_lossy().replace('\\', "/").trim_start_matches("./").to_string()
    }
}

/// Flag values when given, else the file's, else the default.
fn pick(flags: &[String], file: Option<Vec<String>>, default: Vec<String>) -> Vec<String> {
    if flags.is_empty() {
        file.unwrap_or(default)
    } else {
        flags.to_vec()
    }
}
