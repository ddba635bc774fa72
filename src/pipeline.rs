//! The sync run: extract, reconcile, apply, persist, commit.
//!
//! Stages run in order and each depends only on the outputs of the ones
//! before it. Configuration, extraction, tracker reads and persistence
//! failures abort the run before any further side effect; individual
//! tracker actions that fail are collected in the report instead.

use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::config::SyncConfig;
use crate::context::ServiceContext;
use crate::error::SyncError;
use crate::ports::git::GitRepo;
use crate::reconcile::apply::{apply_plan, ApplyReport};
use crate::reconcile::{format_plan, plan_sync, PlanContext, SyncPlan};
use crate::repo::RepoSlug;
use crate::summary::render_summary;
use crate::todo::{scan_tree, Extraction};

/// Commit message used for the summary.
pub const COMMIT_MESSAGE: &str = "chore(todo): update TODO summary";

/// What a sync run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Number of files scanned.
    pub files_scanned: usize,
    /// Number of TODO records found.
    pub todos: usize,
    /// Number of non-fatal extraction warnings.
    pub warnings: usize,
    /// Actions computed against the tracker.
    pub plan: SyncPlan,
    /// Outcome of applying the plan; `None` in a dry run.
    pub applied: Option<ApplyReport>,
    /// Whether the summary was committed and pushed.
    pub committed: bool,
}

impl RunReport {
    /// Returns `true` when every attempted tracker action succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.applied.as_ref().is_none_or(ApplyReport::is_success)
    }

    /// Converts a partially failed run into an error.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::ActionsFailed`] when any tracker action failed.
    pub fn into_result(self) -> Result<Self, SyncError> {
        match &self.applied {
            Some(applied) if !applied.is_success() => Err(SyncError::ActionsFailed {
                failed: applied.failures.len(),
                attempted: applied.failures.len() + applied.applied,
            }),
            _ => Ok(self),
        }
    }
}

/// Runs a full sync of the tree at `config.root` against the context's
/// tracker.
///
/// # Errors
///
/// Returns an error if extraction, tracker reads, writing the summary or
/// committing fails.
pub async fn run_sync(
    ctx: &ServiceContext,
    config: &SyncConfig,
    repo: &RepoSlug,
) -> Result<RunReport, SyncError> {
    let started_at = ctx.clock.now();
    info!(%repo, root = %config.root.display(), dry_run = config.dry_run, "starting TODO sync");

    let extraction = extract(ctx, config, config.blame)?;

    let open_issues =
        ctx.issues.list_open_issues().await.map_err(|e| SyncError::TrackerRead(e.to_string()))?;
    let existing_labels =
        ctx.issues.list_labels().await.map_err(|e| SyncError::TrackerRead(e.to_string()))?;

    let plan = plan_sync(
        &extraction.records,
        &PlanContext {
            open_issues: &open_issues,
            existing_labels: &existing_labels,
            marker: &config.marker,
            repo,
            colors: ctx.colors.as_ref(),
        },
    );
    info!(
        labels = plan.labels_to_create.len(),
        create = plan.issues_to_create.len(),
        relabel = plan.labels_to_add.len(),
        close = plan.issues_to_close.len(),
        "planned tracker actions"
    );

    let applied = if config.dry_run {
        info!("dry run, skipping tracker actions:\n{}", format_plan(&plan));
        None
    } else {
        Some(apply_plan(ctx.issues.as_ref(), &plan).await)
    };

    persist(ctx, config, &render_summary(&extraction.records, Some(repo)))?;

    let committed = if config.commit && !config.dry_run {
        commit(ctx.git.as_ref(), &config.summary_file)?
    } else {
        false
    };

    let report = RunReport {
        started_at,
        finished_at: ctx.clock.now(),
        files_scanned: extraction.files_scanned,
        todos: extraction.records.len(),
        warnings: extraction.warnings.len(),
        plan,
        applied,
        committed,
    };
    info!(
        todos = report.todos,
        files = report.files_scanned,
        committed = report.committed,
        "TODO sync finished"
    );
    Ok(report)
}

/// Scans the tree and renders its summary without touching the tracker.
///
/// Revisions are looked up only when `repo` is known, since they are only
/// rendered as links into it.
///
/// # Errors
///
/// Returns an error if extraction fails.
pub fn run_scan(
    ctx: &ServiceContext,
    config: &SyncConfig,
    repo: Option<&RepoSlug>,
) -> Result<String, SyncError> {
    let extraction = extract(ctx, config, config.blame && repo.is_some())?;
    Ok(render_summary(&extraction.records, repo))
}

/// Resolves the repository from configuration, falling back to the
/// `origin` remote.
///
/// # Errors
///
/// Returns an error if the remote cannot be queried.
pub fn resolve_repo(config: &SyncConfig, git: &dyn GitRepo) -> Result<Option<RepoSlug>, String> {
    if let Some(repo) = &config.repo {
        return Ok(Some(repo.clone()));
    }
    git.origin_repo().map_err(|e| format!("failed to read origin remote: {e}"))
}

fn extract(
    ctx: &ServiceContext,
    config: &SyncConfig,
    blame: bool,
) -> Result<Extraction, SyncError> {
    let git = blame.then(|| ctx.git.as_ref());
    let extraction = scan_tree(
        ctx.fs.as_ref(),
        git,
        &config.root,
        &config.include,
        &config.exclude,
        &[config.summary_scan_key()],
    )?;
    for warning in &extraction.warnings {
        warn!("{warning}");
    }
    info!(
        files = extraction.files_scanned,
        todos = extraction.records.len(),
        "extracted TODO comments"
    );
    Ok(extraction)
}

fn persist(ctx: &ServiceContext, config: &SyncConfig, summary: &str) -> Result<(), SyncError> {
    let path = config.summary_path();
    ctx.fs
        .write(&path, summary)
        .map_err(|e| SyncError::Persist { path: path.display().to_string(), message: e.to_string() })?;
    info!(path = %path.display(), "wrote TODO summary");
    Ok(())
}

fn commit(git: &dyn GitRepo, summary_file: &Path) -> Result<bool, SyncError> {
    let committed = git
        .commit_and_push(summary_file, COMMIT_MESSAGE)
        .map_err(|e| SyncError::Commit(e.to_string()))?;
    if committed {
        info!(path = %summary_file.display(), "committed and pushed TODO summary");
    } else {
        info!("TODO summary unchanged, nothing to commit");
    }
    Ok(committed)
}
