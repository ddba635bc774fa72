//! Clock port for timestamping sync runs.

use chrono::{DateTime, Utc};

/// Provides the current time.
///
/// Run reports carry start and finish times; a fixed clock keeps them
/// stable in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}
