//! In-memory adapters for tests and offline runs.
//!
//! Each adapter keeps its state behind a mutex and exposes builder methods
//! for seeding state and injecting failures.

pub mod clock;
pub mod filesystem;
pub mod git;
pub mod issues;
pub mod palette;

pub use clock::FixedClock;
pub use filesystem::MemoryFileSystem;
pub use git::MemoryGitRepo;
pub use issues::{MemoryIssueTracker, TrackerCall};
pub use palette::FixedColor;
