// ── Binary indicator entities ──

use cyberq_api::DeviceTransport;

use super::{EntityCategory, EntityState, live_snapshot, unique_id};
use crate::coordinator::Coordinator;
use crate::field::{Field, FieldValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinaryDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub field: Field,
    pub icon: &'static str,
}

/// Only created when the firmware reports `FAN_SHORTED`.
pub static BINARY_SENSORS: [BinaryDescription; 1] = [BinaryDescription {
    key: "fan_shorted",
    name: "Fan shorted",
    field: Field::FanShorted,
    icon: "mdi:fan-alert",
}];

pub struct BinaryEntity<T: DeviceTransport> {
    coordinator: Coordinator<T>,
    desc: &'static BinaryDescription,
    unique_id: String,
}

impl<T: DeviceTransport> BinaryEntity<T> {
    pub(crate) fn new(
        coordinator: Coordinator<T>,
        device_name: &str,
        desc: &'static BinaryDescription,
    ) -> Self {
        Self {
            coordinator,
            desc,
            unique_id: unique_id(device_name, desc.key),
        }
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

    pub fn icon(&self) -> &'static str {
        self.desc.icon
    }

    #[allow(clippy::unused_self)]
    pub fn category(&self) -> Option<EntityCategory> {
        Some(EntityCategory::Diagnostic)
    }

    #[allow(clippy::unused_self)]
    pub fn enabled_by_default(&self) -> bool {
        true
    }

    pub fn state(&self) -> EntityState {
        match live_snapshot(&self.coordinator).and_then(|s| s.value(self.desc.field)) {
            Some(FieldValue::Flag(on)) => EntityState::BinarySensor(on),
            _ => EntityState::Unavailable,
        }
    }
}
