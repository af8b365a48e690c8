//! Validate command implementation.
//!
//! Checks that the merged configuration has everything a release needs.

use super::helpers::load_options;
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

/// Execute validate command
pub(super) async fn execute_validate(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Validate { overrides } = &args.command else {
        unreachable!("execute_validate called with non-Validate command");
    };

    let options = load_options(args, overrides)?;
    options.validate()?;

    config.println(&format!(
        "📋 Organization: {}",
        options.organization.as_deref().unwrap_or_default()
    ));
    config.indent(&format!("Projects: {}", options.projects.join(", ")));
    config.indent(&format!("API: {}", options.base_sentry_url));
    if options.should_overwrite {
        config.indent("Existing artifacts will be replaced");
    }
    if options.delete_after_compile {
        config.indent(&format!(
            "Outputs matching {} are deleted after upload",
            options.delete_regex
        ));
    }

    Ok(())
}
