//! Shared helpers for command handlers.

use std::io::IsTerminal;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Refuses instead of prompting when stdin is not a terminal.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))
}

/// Human-readable confirmation on stderr, silent under `--quiet`.
pub fn report(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("{}", output::success(message, output::should_color(&global.color)));
    }
}
