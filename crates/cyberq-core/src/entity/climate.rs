// ── Probe climate entity ──

use serde::Serialize;

use cyberq_api::DeviceTransport;

use super::{EntityCategory, EntityState, live_snapshot, unique_id};
use crate::coordinator::Coordinator;
use crate::error::WriteError;
use crate::field::{Field, TEMP_MAX, TEMP_MIN};
use crate::model::{ProbeId, ProbeReading, Status};

/// Heat while the controller is driving toward the setpoint, off otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    Off,
    Heat,
}

impl HvacMode {
    /// Off when the setpoint sits at the minimum or the probe is in
    /// error/shutdown.
    pub fn of(reading: &ProbeReading) -> Self {
        if reading.target <= TEMP_MIN || reading.status.is_inactive() {
            Self::Off
        } else {
            Self::Heat
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateState {
    pub current_temperature: Option<f64>,
    pub target_temperature: f64,
    pub mode: HvacMode,
    pub status: Status,
}

/// One temperature probe: reading, setpoint and status.
pub struct ClimateEntity<T: DeviceTransport> {
    coordinator: Coordinator<T>,
    probe: ProbeId,
    unique_id: String,
}

impl<T: DeviceTransport> ClimateEntity<T> {
    pub const MIN_TEMP: f64 = TEMP_MIN;
    pub const MAX_TEMP: f64 = TEMP_MAX;
    pub const TARGET_STEP: f64 = 1.0;

    pub(crate) fn new(coordinator: Coordinator<T>, device_name: &str, probe: ProbeId) -> Self {
        let prefix = match probe {
            ProbeId::Cook => "pit",
            ProbeId::Food1 => "food1",
            ProbeId::Food2 => "food2",
            ProbeId::Food3 => "food3",
        };
        Self {
            coordinator,
            probe,
            unique_id: unique_id(device_name, &format!("{prefix}_probe")),
        }
    }

    pub fn probe(&self) -> ProbeId {
        self.probe
    }

    /// The setpoint field this entity writes.
    pub fn field(&self) -> Field {
        Field::set(self.probe)
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// The probe's label as stored on the controller.
    pub fn name(&self) -> String {
        self.coordinator
            .current_snapshot()
            .map(|s| s.probe(self.probe).name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.probe.default_label().to_owned())
    }

    pub fn icon(&self) -> &'static str {
        live_snapshot(&self.coordinator)
            .map_or("mdi:thermometer", |s| s.probe(self.probe).status.icon())
    }

    #[allow(clippy::unused_self)]
    pub fn category(&self) -> Option<EntityCategory> {
        None
    }

    #[allow(clippy::unused_self)]
    pub fn enabled_by_default(&self) -> bool {
        true
    }

    pub fn state(&self) -> EntityState {
        let Some(snapshot) = live_snapshot(&self.coordinator) else {
            return EntityState::Unavailable;
        };
        let reading = snapshot.probe(self.probe);
        EntityState::Climate(ClimateState {
            current_temperature: reading.temperature,
            target_temperature: reading.target,
            mode: HvacMode::of(reading),
            status: reading.status,
        })
    }

    pub async fn set_target(&self, degrees: f64) -> Result<(), WriteError> {
        self.coordinator.write(self.field(), degrees).await
    }

    /// Turning off parks the setpoint at the minimum. Turning on needs an
    /// explicit target, so `Heat` is accepted only via [`set_target`](Self::set_target).
    pub async fn set_mode(&self, mode: HvacMode) -> Result<(), WriteError> {
        match mode {
            HvacMode::Off => self.set_target(TEMP_MIN).await,
            HvacMode::Heat => Err(WriteError::invalid(
                self.field(),
                "set a target temperature to turn the probe on",
            )),
        }
    }
}
