//! Command execution functions coordinating all release operations.

mod changelog;
mod helpers;
mod release;

use crate::cli::{Args, Command, OutputManager};
use crate::error::Result;

use changelog::execute_changelog;
use release::{execute_init, execute_release};

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(e) = args.validate() {
        // Validation errors are shown even in quiet mode
        OutputManager::new(false).error(&e.to_string());
        return Ok(1);
    }

    let output = OutputManager::new(args.quiet);

    let result = match &args.command {
        Command::Release { bump } => execute_release(&args, *bump, &output).await,
        Command::Init => execute_init(&args, &output).await,
        Command::Changelog { since } => execute_changelog(&args, since.as_deref(), &output).await,
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            output.error(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));
            helpers::print_suggestions(&output, &e);
            Ok(1)
        }
    }
}
