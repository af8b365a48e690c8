//! Shared helper functions for command execution.

use crate::cli::{Args, OptionOverrides};
use crate::config::{RawOptions, UploaderOptions, load_config_file};
use crate::error::Result;

/// Merge command line overrides over the config file and apply defaults.
///
/// A missing config file is fine only when `--config` was not given.
pub(super) fn load_options(args: &Args, overrides: &OptionOverrides) -> Result<UploaderOptions> {
    let from_file = if args.uses_default_config() && !args.config.exists() {
        log::debug!("No {} found, using defaults", args.config.display());
        RawOptions::default()
    } else {
        load_config_file(&args.config)?
    };

    overrides.to_raw().or(from_file).into_options()
}

/// Prompt user for confirmation with y/n input
pub(super) fn prompt_confirmation(prompt: &str) -> std::io::Result<bool> {
    use std::io::Write;

    print!("{} [y/N]: ", prompt);
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;

    let response = input.trim().to_lowercase();
    Ok(matches!(response.as_str(), "y" | "yes"))
}
