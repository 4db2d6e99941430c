//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod completions;
pub mod play;
pub mod validate;
pub mod version;
pub mod words;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands};
use crate::error::WordmonError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// `cancel` fires on SIGINT/SIGTERM; only `play` listens to it.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), WordmonError> {
    match cli.command {
        Commands::Play(args) => play::run(&args, cli.quiet, cancel).await,
        Commands::Validate(args) => validate::run(&args),
        Commands::Words(args) => words::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}
