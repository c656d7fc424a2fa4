// ── Device snapshot ──

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use super::probe::{ProbeId, ProbeReading, Status};
use super::settings::{ControlSettings, SystemSettings};

pub const MANUFACTURER: &str = "BBQ Guru";
pub const MODEL: &str = "CyberQ WiFi";

/// Hardware identity, read from `config.xml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub mac: String,
    pub firmware_version: Option<String>,
    /// Last two MAC octets, as printed on the unit's label.
    pub serial_number: String,
}

impl DeviceInfo {
    pub fn from_mac(mac: impl Into<String>, firmware_version: Option<String>) -> Self {
        let mac = mac.into();
        let serial_number = mac.split(':').skip(4).take(2).collect::<String>();
        Self {
            mac,
            firmware_version,
            serial_number,
        }
    }

    /// `CyberQ <serial>`.
    pub fn name(&self) -> String {
        format!("CyberQ {}", self.serial_number)
    }

    pub fn model(&self) -> &'static str {
        MODEL
    }

    pub fn manufacturer(&self) -> &'static str {
        MANUFACTURER
    }
}

/// One complete, validated read of the device.
///
/// Immutable once published; the coordinator shares it as `Arc<Snapshot>`
/// and replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Stamp of the device operation that produced this state.
    pub sequence: u64,
    pub received_at: DateTime<Utc>,
    pub probes: [ProbeReading; 4],
    pub control: ControlSettings,
    pub system: SystemSettings,
    /// Blower output, percent.
    pub output_percent: u8,
    /// Absent on firmware that does not report it.
    pub fan_shorted: Option<bool>,
    pub timer_status: Status,
    #[serde(serialize_with = "serialize_hms")]
    pub timer_remaining: Duration,
    pub device: Option<DeviceInfo>,
}

impl Snapshot {
    pub fn probe(&self, id: ProbeId) -> &ProbeReading {
        &self.probes[id.index()]
    }

    pub(crate) fn probe_mut(&mut self, id: ProbeId) -> &mut ProbeReading {
        &mut self.probes[id.index()]
    }

    pub fn cook(&self) -> &ProbeReading {
        self.probe(ProbeId::Cook)
    }
}

/// Render a duration the way the device does, `HH:MM:SS`.
pub fn format_hms(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_hms<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_hms(*duration))
}
