// ── Probe domain types ──

use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoStaticStr};

use super::settings::Choice;

/// One of the four temperature inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProbeId {
    Cook,
    Food1,
    Food2,
    Food3,
}

impl ProbeId {
    pub const ALL: [Self; 4] = [Self::Cook, Self::Food1, Self::Food2, Self::Food3];

    pub fn index(self) -> usize {
        match self {
            Self::Cook => 0,
            Self::Food1 => 1,
            Self::Food2 => 2,
            Self::Food3 => 3,
        }
    }

    /// Name the controller's own display uses when no label is set.
    pub fn default_label(self) -> &'static str {
        match self {
            Self::Cook => "Pit",
            Self::Food1 => "Food 1",
            Self::Food2 => "Food 2",
            Self::Food3 => "Food 3",
        }
    }
}

/// Controller status code, shared by the probes and the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    High,
    Low,
    Done,
    Error,
    Hold,
    Alarm,
    Shutdown,
}

impl Choice for Status {
    const LABELS: &'static [&'static str] =
        &["ok", "high", "low", "done", "error", "hold", "alarm", "shutdown"];

    fn from_index(index: usize) -> Option<Self> {
        Some(match index {
            0 => Self::Ok,
            1 => Self::High,
            2 => Self::Low,
            3 => Self::Done,
            4 => Self::Error,
            5 => Self::Hold,
            6 => Self::Alarm,
            7 => Self::Shutdown,
            _ => return None,
        })
    }

    fn index(self) -> usize {
        match self {
            Self::Ok => 0,
            Self::High => 1,
            Self::Low => 2,
            Self::Done => 3,
            Self::Error => 4,
            Self::Hold => 5,
            Self::Alarm => 6,
            Self::Shutdown => 7,
        }
    }
}

impl Status {
    pub fn icon(self) -> &'static str {
        match self {
            Self::Ok => "mdi:fire",
            Self::High => "mdi:thermometer-high",
            Self::Low => "mdi:thermometer-low",
            Self::Done => "mdi:check-circle",
            Self::Error => "mdi:thermometer-alert",
            Self::Hold => "mdi:pause-circle",
            Self::Alarm => "mdi:bell-ring",
            Self::Shutdown => "mdi:power",
        }
    }

    /// The controller is not driving the fan for this input.
    pub fn is_inactive(self) -> bool {
        matches!(self, Self::Error | Self::Shutdown)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Current state of one probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReading {
    pub name: String,
    /// Degrees Fahrenheit; `None` when nothing is plugged in.
    pub temperature: Option<f64>,
    /// Setpoint in degrees Fahrenheit.
    pub target: f64,
    pub status: Status,
}
