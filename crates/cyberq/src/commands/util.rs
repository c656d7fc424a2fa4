//! Shared helpers for command handlers.

use std::io::IsTerminal;

use cyberq_core::Coordinator;

use crate::error::CliError;

/// Run one poll and fail loudly if the device did not answer.
pub async fn fetch_snapshot(
    coordinator: &Coordinator,
) -> Result<std::sync::Arc<cyberq_core::Snapshot>, CliError> {
    Ok(coordinator.first_refresh().await?)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(action: &str, message: &str, yes_flag: bool) -> Result<bool, CliError> {
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
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}
