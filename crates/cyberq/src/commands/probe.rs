//! `cyberq probe`: the setup connectivity check, without saving anything.

use cyberq_core::{DeviceInfo, TransportConfig};

use crate::config::Presentation;
use crate::error::CliError;
use crate::output;

fn detail(info: &DeviceInfo) -> String {
    [
        format!("Name:      {}", info.name()),
        format!("Model:     {} ({})", info.model(), info.manufacturer()),
        format!("Serial:    {}", info.serial_number),
        format!("MAC:       {}", info.mac),
        format!(
            "Firmware:  {}",
            info.firmware_version.as_deref().unwrap_or("unknown")
        ),
    ]
    .join("\n")
}

/// Probe `host:port` and print the identity it reports.
pub async fn handle(
    host: &str,
    port: u16,
    transport: &TransportConfig,
    out: Presentation,
) -> Result<DeviceInfo, CliError> {
    tracing::debug!(host, port, "probing device");
    let info = cyberq_core::setup::probe_device_with(host, port, transport).await?;
    let rendered = output::render_single(out.format, &info, detail, |i| i.serial_number.clone())?;
    output::print_output(&rendered, out.quiet);
    Ok(info)
}
