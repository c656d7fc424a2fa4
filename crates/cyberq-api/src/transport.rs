// Shared transport configuration and the device transport seam.
//
// `TransportConfig` builds the `reqwest::Client` used by `CyberqClient`.
// `DeviceTransport` is what the coordinator is generic over, so tests can
// swap in an instrumented transport without a network.

use std::future::Future;
use std::time::Duration;

use crate::client::WriteRequest;
use crate::error::Error;
use crate::payload::RawPayload;

/// Default per-request timeout. Kept below the default 5s poll interval.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Total request timeout (connect + response).
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TransportConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .connect_timeout(self.timeout)
            .user_agent(concat!("cyberq/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Client(format!("failed to build HTTP client: {e}")))
    }

    pub(crate) fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

/// A timeout-bounded I/O primitive against one device.
///
/// Implementations perform no retries and no caching. Callers are
/// responsible for never issuing two calls at once.
pub trait DeviceTransport: Send + Sync + 'static {
    /// Read the device's full reportable state.
    fn fetch(&self) -> impl Future<Output = Result<RawPayload, Error>> + Send;

    /// Write a single field. Fails with [`Error::Rejected`] when the device
    /// echoes back something other than `request.expected_echo`.
    fn write(&self, request: &WriteRequest) -> impl Future<Output = Result<(), Error>> + Send;
}
