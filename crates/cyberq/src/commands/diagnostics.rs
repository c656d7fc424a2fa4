//! `cyberq diagnostics`: redacted state dump for bug reports.

use cyberq_core::{Coordinator, RefreshOutcome};

use crate::cli::OutputFormat;
use crate::config::Presentation;
use crate::error::CliError;
use crate::output;

/// Always succeeds once the coordinator exists: an unreachable device is
/// part of what the dump should show.
pub async fn handle(coordinator: &Coordinator, out: Presentation) -> Result<(), CliError> {
    if let RefreshOutcome::Failed = coordinator.refresh().await {
        tracing::info!("device did not answer; dumping availability only");
    }

    let doc = cyberq_core::diagnostics(coordinator);
    let format = match out.format {
        OutputFormat::Table | OutputFormat::Plain => OutputFormat::Json,
        other => other,
    };
    output::print_output(&output::render_structured(format, &doc)?, out.quiet);
    Ok(())
}
