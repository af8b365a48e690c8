//! Cleanup command implementation.
//!
//! Removes build outputs matching `deleteRegex` without uploading anything.

use super::helpers::{load_options, prompt_confirmation};
use crate::build::{BuildStats, scan_output_dir};
use crate::cli::{Args, Command, OptionOverrides, RuntimeConfig};
use crate::error::Result;
use crate::plugin::delete_matching;

/// Execute cleanup command
pub(super) async fn execute_cleanup(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Cleanup { output_dir, yes } = &args.command else {
        unreachable!("execute_cleanup called with non-Cleanup command");
    };

    let options = load_options(args, &OptionOverrides::default())?;
    let stats = BuildStats {
        hash: String::new(),
        assets: scan_output_dir(output_dir)?,
    };

    let matching = stats
        .assets
        .iter()
        .filter(|a| options.delete_regex.is_match(&a.name))
        .count();
    if matching == 0 {
        config.println("No files to clean up");
        return Ok(());
    }

    if !yes {
        config.println(&format!(
            "About to delete {} file(s) matching {}",
            matching, options.delete_regex
        ));
        if !prompt_confirmation("Continue with cleanup?")? {
            config.println("Cleanup cancelled");
            return Ok(());
        }
    }

    for path in delete_matching(&stats, &options.delete_regex)? {
        config.indent(&path.display().to_string());
    }

    Ok(())
}
