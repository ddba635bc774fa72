//! `todo-sync sync` command.

use std::sync::Arc;

use crate::adapters::live::GitHubIssueTracker;
use crate::cli::SyncArgs;
use crate::config::{ConfigError, SyncConfig};
use crate::context::ServiceContext;
use crate::error::SyncError;
use crate::pipeline::{self, RunReport};
use crate::reconcile::format_plan;

/// Execute the `sync` command.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, the run aborts, or any
/// tracker action failed.
pub async fn run(args: &SyncArgs) -> Result<(), SyncError> {
    let config = SyncConfig::from_sync(args)?;
    let token = config.require_token()?;
    let ctx = ServiceContext::live(&config.root);

    let repo = pipeline::resolve_repo(&config, ctx.git.as_ref())
        .map_err(|_| ConfigError::MissingRepo)?
        .ok_or(ConfigError::MissingRepo)?;
    let tracker = GitHubIssueTracker::new(token, repo.clone())
        .map_err(|e| SyncError::Setup(format!("failed to build HTTP client: {e}")))?;
    let ctx = ctx.with_tracker(Arc::new(tracker));

    let report = pipeline::run_sync(&ctx, &config, &repo).await?;
    print_report(&report);
    report.into_result().map(|_| ())
}

fn print_report(report: &RunReport) {
    if report.applied.is_none() {
        println!("Dry run, planned actions:");
    } else {
        println!("Sync complete:");
    }
    println!("{}", format_plan(&report.plan));

    if let Some(applied) = &report.applied {
        for failure in &applied.failures {
            println!("  FAILED {}: {}", failure.action, failure.error);
        }
    }
    println!(
        "{} TODOs in {} files; summary {}",
        report.todos,
        report.files_scanned,
        if report.committed { "committed" } else { "written" }
    );
}
