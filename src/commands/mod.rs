//! Command dispatch and handlers.

pub mod scan;
pub mod sync;

use crate::cli::Command;
use crate::error::SyncError;

/// Dispatch a parsed command to its handler.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let result = match command {
        Command::Sync(args) => block_on(sync::run(args)),
        Command::Scan(args) => scan::run(args),
    };
    result.map_err(|e| e.to_string())
}

/// Drives a command future on a single-threaded runtime.
fn block_on<F>(future: F) -> Result<(), SyncError>
where
    F: std::future::Future<Output = Result<(), SyncError>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| SyncError::Setup(format!("failed to start async runtime: {e}")))?;
    runtime.block_on(future)
}
