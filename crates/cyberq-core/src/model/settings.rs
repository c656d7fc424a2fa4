// ── Controller settings ──

use serde::{Deserialize, Serialize};

/// An enumerated setting the device stores as an option index.
pub trait Choice: Copy + Sized + 'static {
    /// Display labels, in device index order.
    const LABELS: &'static [&'static str];

    fn from_index(index: usize) -> Option<Self>;

    fn index(self) -> usize;

    fn label(self) -> &'static str {
        Self::LABELS.get(self.index()).copied().unwrap_or_default()
    }

    /// Case-insensitive label lookup.
    fn from_label(label: &str) -> Option<Self> {
        Self::LABELS
            .iter()
            .position(|l| l.eq_ignore_ascii_case(label.trim()))
            .and_then(Self::from_index)
    }
}

/// Which food probe the pit setpoint ramps down with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RampProbe {
    None,
    Food1,
    Food2,
    Food3,
}

impl Choice for RampProbe {
    const LABELS: &'static [&'static str] = &["None", "Food 1", "Food 2", "Food 3"];

    fn from_index(index: usize) -> Option<Self> {
        Some(match index {
            0 => Self::None,
            1 => Self::Food1,
            2 => Self::Food2,
            3 => Self::Food3,
            _ => return None,
        })
    }

    fn index(self) -> usize {
        match self {
            Self::None => 0,
            Self::Food1 => 1,
            Self::Food2 => 2,
            Self::Food3 => 3,
        }
    }
}

/// Unit the controller's own display uses. The wire is always °F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegreeUnits {
    Celsius,
    Fahrenheit,
}

impl Choice for DegreeUnits {
    const LABELS: &'static [&'static str] = &["Celsius", "Fahrenheit"];

    fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Celsius),
            1 => Some(Self::Fahrenheit),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Celsius => 0,
            Self::Fahrenheit => 1,
        }
    }
}

/// Number of alarm beeps, `0..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlarmBeeps(u8);

impl AlarmBeeps {
    pub const MAX: u8 = 5;

    pub fn new(beeps: u8) -> Option<Self> {
        (beeps <= Self::MAX).then_some(Self(beeps))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Choice for AlarmBeeps {
    const LABELS: &'static [&'static str] = &["0", "1", "2", "3", "4", "5"];

    fn from_index(index: usize) -> Option<Self> {
        u8::try_from(index).ok().and_then(Self::new)
    }

    fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// What the controller does when the cook timer runs out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeoutAction {
    NoAction,
    Hold,
    Alarm,
    Shutdown,
}

impl Choice for TimeoutAction {
    const LABELS: &'static [&'static str] = &["No Action", "Hold", "Alarm", "Shutdown"];

    fn from_index(index: usize) -> Option<Self> {
        Some(match index {
            0 => Self::NoAction,
            1 => Self::Hold,
            2 => Self::Alarm,
            3 => Self::Shutdown,
            _ => return None,
        })
    }

    fn index(self) -> usize {
        match self {
            Self::NoAction => 0,
            Self::Hold => 1,
            Self::Alarm => 2,
            Self::Shutdown => 3,
        }
    }
}

impl TimeoutAction {
    pub fn icon(self) -> &'static str {
        match self {
            Self::NoAction => "mdi:timer-off",
            Self::Hold => "mdi:pause-circle",
            Self::Alarm => "mdi:bell-ring",
            Self::Shutdown => "mdi:power",
        }
    }
}

/// Fan control parameters (index.htm / control.htm).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSettings {
    /// Proportional band in °F.
    pub prop_band: u8,
    /// Fan cycle time in seconds.
    pub cycle_time: u8,
    /// Alarm deviation in °F.
    pub alarm_deviation: u8,
    /// Pit temperature held after the timer expires, °F.
    pub cook_hold: f64,
    pub ramp: RampProbe,
    pub timeout_action: TimeoutAction,
    pub open_detect: bool,
}

/// Front-panel settings (system.htm).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemSettings {
    pub degree_units: DegreeUnits,
    pub alarm_beeps: AlarmBeeps,
    pub lcd_backlight: u8,
    pub lcd_contrast: u8,
    pub menu_scrolling: bool,
    pub key_beeps: bool,
}
