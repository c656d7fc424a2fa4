// ── Runtime coordinator configuration ──
//
// Describes *which* device to talk to and how often. Built by the CLI from
// a profile; core never reads config files.

use std::time::Duration;

use cyberq_api::TransportConfig;

pub const DEFAULT_PORT: u16 = 80;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(4);
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
pub const DEFAULT_WRITE_LOCK_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for synchronizing a single device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    pub host: String,
    pub port: u16,
    poll_interval: Duration,
    request_timeout: Duration,
    /// Consecutive failed polls before the device is reported unavailable.
    pub failure_threshold: u32,
    /// How long a write waits for an in-flight poll before giving up.
    pub write_lock_timeout: Duration,
}

impl CoordinatorConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            write_lock_timeout: DEFAULT_WRITE_LOCK_TIMEOUT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the poll interval. Values below one second are raised to one second.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold.max(1);
        self
    }

    pub fn with_write_lock_timeout(mut self, timeout: Duration) -> Self {
        self.write_lock_timeout = timeout;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Timeout for one whole fetch or write, always shorter than the poll
    /// interval.
    pub fn request_timeout(&self) -> Duration {
        let ceiling = self.poll_interval.saturating_sub(Duration::from_millis(100));
        self.request_timeout.min(ceiling).max(Duration::from_millis(100))
    }

    /// `host:port`, the identity of the device this coordinator owns.
    pub fn device_key(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig::with_timeout(self.request_timeout())
    }
}
