//! Command execution functions.

mod cleanup;
mod helpers;
mod upload;
mod validate;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

use cleanup::execute_cleanup;
use upload::execute_upload;
use validate::execute_validate;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        let output = super::OutputManager::new(false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        // Upload reports hook failures itself and returns its own exit code
        Command::Upload { .. } => execute_upload(&args, &config).await,
        Command::Validate { .. } => execute_validate(&args, &config).await.map(|()| 0),
        Command::Cleanup { .. } => execute_cleanup(&args, &config).await.map(|()| 0),
    };

    match result {
        Ok(0) => {
            if !matches!(args.command, Command::Upload { .. }) {
                config.success_println(&format!(
                    "Command '{}' completed successfully",
                    args.command.name()
                ));
            }
            Ok(0)
        }
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}
