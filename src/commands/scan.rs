//! `todo-sync scan` command.

use tracing::warn;

use crate::cli::ScanArgs;
use crate::config::SyncConfig;
use crate::context::ServiceContext;
use crate::error::SyncError;
use crate::pipeline;

/// Execute the `scan` command, printing the summary to stdout.
///
/// # Errors
///
/// Returns an error if configuration or extraction fails.
pub fn run(args: &ScanArgs) -> Result<(), SyncError> {
    let config = SyncConfig::from_common(&args.common)?;
    let ctx = ServiceContext::live(&config.root);

    let repo = pipeline::resolve_repo(&config, ctx.git.as_ref()).unwrap_or_else(|e| {
        warn!("{e}; rendering without commit links");
        None
    });

    print!("{}", pipeline::run_scan(&ctx, &config, repo.as_ref())?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::{Cli, Command};

    #[test]
    fn scan_of_missing_root_fails() {
        let cli = Cli::parse_from(["todo-sync", "scan", "--root", "/nonexistent/todo-sync-root"]);
        let Command::Scan(args) = cli.command else { panic!("expected scan") };
        let err = run(&args).unwrap_err();
        assert!(matches!(err, SyncError::Extract(_)), "{err}");
    }
}
