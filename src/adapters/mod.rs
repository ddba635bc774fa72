//! Port implementations.
//!
//! `live` talks to the real disk, the `git` CLI and the GitHub API;
//! `memory` keeps everything in process for tests.

pub mod live;
pub mod memory;
