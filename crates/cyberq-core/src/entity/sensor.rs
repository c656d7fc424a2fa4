// ── Status sensor entities ──

use cyberq_api::DeviceTransport;

use super::{EntityCategory, EntityState, live_snapshot, unique_id};
use crate::coordinator::Coordinator;
use crate::field::Field;
use crate::model::Status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub field: Field,
    pub icon: &'static str,
    pub unit: Option<&'static str>,
    pub enabled_by_default: bool,
}

impl SensorDescription {
    const fn status(key: &'static str, name: &'static str, field: Field) -> Self {
        Self {
            key,
            name,
            field,
            icon: "mdi:thermometer",
            unit: None,
            enabled_by_default: true,
        }
    }

    const fn disabled(mut self) -> Self {
        self.enabled_by_default = false;
        self
    }

    /// Reports one of the controller status codes.
    pub fn is_status(&self) -> bool {
        matches!(
            self.field,
            Field::CookStatus
                | Field::Food1Status
                | Field::Food2Status
                | Field::Food3Status
                | Field::TimerStatus
        )
    }
}

pub static SENSORS: [SensorDescription; 7] = [
    SensorDescription {
        key: "fan_speed",
        name: "Fan speed",
        field: Field::OutputPercent,
        icon: "mdi:fan",
        unit: Some("%"),
        enabled_by_default: true,
    },
    SensorDescription::status("pit_status", "Pit status", Field::CookStatus),
    SensorDescription::status("probe1_status", "Food 1 status", Field::Food1Status),
    SensorDescription::status("probe2_status", "Food 2 status", Field::Food2Status),
    SensorDescription::status("probe3_status", "Food 3 status", Field::Food3Status),
    SensorDescription::status("timer_status", "Timer status", Field::TimerStatus).disabled(),
    SensorDescription {
        key: "timer_curr",
        name: "Timer remaining",
        field: Field::TimerCurr,
        icon: "mdi:timer",
        unit: None,
        enabled_by_default: false,
    },
];

pub struct SensorEntity<T: DeviceTransport> {
    coordinator: Coordinator<T>,
    desc: &'static SensorDescription,
    unique_id: String,
}

impl<T: DeviceTransport> SensorEntity<T> {
    pub(crate) fn new(
        coordinator: Coordinator<T>,
        device_name: &str,
        desc: &'static SensorDescription,
    ) -> Self {
        Self {
            coordinator,
            desc,
            unique_id: unique_id(device_name, desc.key),
        }
    }

    pub fn description(&self) -> &'static SensorDescription {
        self.desc
    }

    pub fn field(&self) -> Field {
        self.desc.field
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> String {
        self.desc.name.to_owned()
    }

    /// Status sensors take the icon of the status they report.
    pub fn icon(&self) -> &'static str {
        if self.desc.is_status() {
            if let Some(status) = self.status() {
                return status.icon();
            }
        }
        self.desc.icon
    }

    /// Status sensors and the timer are diagnostic; fan speed is primary.
    pub fn category(&self) -> Option<EntityCategory> {
        (self.desc.field != Field::OutputPercent).then_some(EntityCategory::Diagnostic)
    }

    pub fn enabled_by_default(&self) -> bool {
        self.desc.enabled_by_default
    }

    pub fn state(&self) -> EntityState {
        match live_snapshot(&self.coordinator) {
            Some(snapshot) => EntityState::Sensor(snapshot.value(self.desc.field)),
            None => EntityState::Unavailable,
        }
    }

    fn status(&self) -> Option<Status> {
        let snapshot = live_snapshot(&self.coordinator)?;
        Some(match self.desc.field.probe() {
            Some(probe) => snapshot.probe(probe).status,
            None => snapshot.timer_status,
        })
    }
}
