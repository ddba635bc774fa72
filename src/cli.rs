//! CLI argument definitions.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::repo::RepoSlug;

/// Top-level CLI parser for `todo-sync`.
#[derive(Debug, Parser)]
#[command(
    name = "todo-sync",
    version,
    about = "Sync TODO comments with GitHub issues and a Markdown summary"
)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile TODO comments with GitHub issues and write the summary.
    Sync(SyncArgs),
    /// Print the TODO summary without contacting GitHub.
    Scan(ScanArgs),
}

/// Options shared by every command.
#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// Directory to scan.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
    /// YAML config file (defaults to `.todo-sync.yaml` in the root).
    #[arg(long, env = "TODO_SYNC_CONFIG")]
    pub config: Option<PathBuf>,
    /// Summary output path, relative to the root.
    #[arg(long, env = "SUMMARY_FILE")]
    pub summary_file: Option<PathBuf>,
    /// Repository as `owner/name` (defaults to the origin remote).
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: Option<RepoSlug>,
    /// Glob of files to scan; repeatable.
    #[arg(long)]
    pub include: Vec<String>,
    /// Glob of files to skip; repeatable.
    #[arg(long)]
    pub exclude: Vec<String>,
    /// Do not attribute TODOs to commits.
    #[arg(long)]
    pub no_blame: bool,
}

/// Options for `sync`.
#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    /// Shared options.
    #[command(flatten)]
    pub common: CommonArgs,
    /// GitHub token with issue write access.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,
    /// Report planned actions without changing anything.
    #[arg(
        long,
        env = "DRY_RUN",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    pub dry_run: bool,
    /// Commit and push the summary after writing it.
    #[arg(
        long,
        env = "COMMIT",
        action = ArgAction::Set,
        num_args = 0..=1,
        default_missing_value = "true",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    pub commit: bool,
    /// Label marking issues owned by this tool.
    #[arg(long, env = "TODO_SYNC_LABEL")]
    pub label: Option<String>,
}

/// Options for `scan`.
#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// Shared options.
    #[command(flatten)]
    pub common: CommonArgs,
}
