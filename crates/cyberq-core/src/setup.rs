// ── Setup connectivity probe ──
//
// Confirms a host answers like a CyberQ before a profile is saved. Uses the
// same fetch and parse as the poll loop, once, with no coordinator.

use tracing::{debug, warn};

use cyberq_api::{CyberqClient, DeviceTransport, TransportConfig};

use crate::error::SetupError;
use crate::model::DeviceInfo;
use crate::parse::parse;

/// Probe `host:port` over HTTP and return the device identity.
pub async fn probe_device(host: &str, port: u16) -> Result<DeviceInfo, SetupError> {
    probe_device_with(host, port, &TransportConfig::default()).await
}

/// [`probe_device`] with a custom request timeout.
pub async fn probe_device_with(
    host: &str,
    port: u16,
    transport: &TransportConfig,
) -> Result<DeviceInfo, SetupError> {
    let client = CyberqClient::new(host, port, transport).map_err(SetupError::CannotConnect)?;
    probe_with(&client).await
}

/// Probe through an arbitrary transport.
pub async fn probe_with<T: DeviceTransport>(transport: &T) -> Result<DeviceInfo, SetupError> {
    let payload = transport.fetch().await.map_err(|e| {
        warn!(error = %e, unreachable = e.is_unreachable(), "setup probe failed");
        SetupError::CannotConnect(e)
    })?;

    let snapshot = parse(&payload).map_err(|e| {
        warn!(error = %e, "setup probe got an unexpected payload");
        SetupError::Unknown(e.to_string())
    })?;

    let info = snapshot
        .device
        .ok_or_else(|| SetupError::Unknown("device did not report its MAC address".into()))?;
    debug!(serial = %info.serial_number, "setup probe succeeded");
    Ok(info)
}
