//! Command dispatch: bridges CLI args -> coordinator -> output formatting.

pub mod config_cmd;
pub mod diagnostics;
pub mod entities;
pub mod probe;
pub mod set;
pub mod status;
pub mod util;
pub mod watch;

use cyberq_core::Coordinator;

use crate::cli::Command;
use crate::config::Presentation;
use crate::error::CliError;

/// Dispatch a device-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    coordinator: &Coordinator,
    out: Presentation,
) -> Result<(), CliError> {
    match cmd {
        Command::Status => status::handle(coordinator, out).await,
        Command::Entities(args) => entities::handle(coordinator, &args, out).await,
        Command::Set(args) => set::handle(coordinator, &args, out).await,
        Command::Watch(args) => watch::handle(coordinator, &args, out).await,
        Command::Diagnostics => diagnostics::handle(coordinator, out).await,
        // Probe, Config and Completions are handled before dispatch
        Command::Probe(_) | Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
