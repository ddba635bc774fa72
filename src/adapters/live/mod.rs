//! Live adapters for real external interactions.

pub mod clock;
pub mod filesystem;
pub mod git;
pub mod issues;
pub mod palette;

pub use clock::LiveClock;
pub use filesystem::LiveFileSystem;
pub use git::LiveGitRepo;
pub use issues::GitHubIssueTracker;
pub use palette::RandomColor;
