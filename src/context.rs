//! Service context bundling all port trait objects.

use std::path::Path;
use std::sync::Arc;

use crate::adapters::live::{LiveClock, LiveFileSystem, LiveGitRepo, RandomColor};
use crate::ports::clock::Clock;
use crate::ports::filesystem::FileSystem;
use crate::ports::git::GitRepo;
use crate::ports::issues::{Issue, IssueTracker, Label, TrackerFuture};
use crate::ports::palette::ColorSource;

/// Bundles all port trait objects into a single context.
///
/// Each field provides access to one external boundary. Ports are shared
/// so tests can keep a handle on an in-memory adapter and inspect it after
/// a run.
pub struct ServiceContext {
    /// Clock for run timestamps.
    pub clock: Arc<dyn Clock>,
    /// Filesystem for listing, reading and writing files.
    pub fs: Arc<dyn FileSystem>,
    /// Git repository for blame and committing the summary.
    pub git: Arc<dyn GitRepo>,
    /// Issue tracker holding the synced issues.
    pub issues: Arc<dyn IssueTracker>,
    /// Colors for labels created by a run.
    pub colors: Arc<dyn ColorSource>,
}

impl ServiceContext {
    /// Creates a context from explicit adapters.
    pub fn new(
        clock: Arc<dyn Clock>,
        fs: Arc<dyn FileSystem>,
        git: Arc<dyn GitRepo>,
        issues: Arc<dyn IssueTracker>,
        colors: Arc<dyn ColorSource>,
    ) -> Self {
        Self { clock, fs, git, issues, colors }
    }

    /// Creates a live context for the repository at `root`.
    ///
    /// No tracker is attached: every tracker call fails until one is set
    /// with [`ServiceContext::with_tracker`].
    #[must_use]
    pub fn live(root: &Path) -> Self {
        Self {
            clock: Arc::new(LiveClock),
            fs: Arc::new(LiveFileSystem),
            git: Arc::new(LiveGitRepo::new(root)),
            issues: Arc::new(UnconfiguredTracker),
            colors: Arc::new(RandomColor),
        }
    }

    /// Replaces the issue tracker.
    #[must_use]
    pub fn with_tracker(mut self, issues: Arc<dyn IssueTracker>) -> Self {
        self.issues = issues;
        self
    }
}

/// Tracker used before credentials are known.
struct UnconfiguredTracker;

impl UnconfiguredTracker {
    fn fail<'a, T: 'a>() -> TrackerFuture<'a, T> {
        Box::pin(async { Err("no issue tracker configured".into()) })
    }
}

impl IssueTracker for UnconfiguredTracker {
    fn list_open_issues(&self) -> TrackerFuture<'_, Vec<Issue>> {
        Self::fail()
    }

    fn list_labels(&self) -> TrackerFuture<'_, Vec<String>> {
        Self::fail()
    }

    fn create_label<'a>(&'a self, _label: &'a Label) -> TrackerFuture<'a, ()> {
        Self::fail()
    }

    fn create_issue<'a>(
        &'a self,
        _title: &'a str,
        _body: &'a str,
        _labels: &'a [String],
    ) -> TrackerFuture<'a, u64> {
        Self::fail()
    }

    fn add_labels<'a>(&'a self, _number: u64, _labels: &'a [String]) -> TrackerFuture<'a, ()> {
        Self::fail()
    }

    fn close_issue(&self, _number: u64) -> TrackerFuture<'_, ()> {
        Self::fail()
    }
}
