//! Command line interface for sentry_release_uploader.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, DEFAULT_CONFIG_FILE, OptionOverrides, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}
