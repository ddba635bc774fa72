//! Port traits defining external boundaries.
//!
//! Each trait represents a boundary between the sync core and an external
//! system (time, filesystem, git, issue tracker, label colors).
//! Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod git;
pub mod issues;
pub mod palette;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use git::GitRepo;
pub use issues::{Issue, IssueState, IssueTracker, Label, TrackerFuture};
pub use palette::ColorSource;
