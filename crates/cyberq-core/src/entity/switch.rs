// ── On/off switch entities ──

use cyberq_api::DeviceTransport;

use super::{EntityCategory, EntityState, live_snapshot, unique_id};
use crate::coordinator::Coordinator;
use crate::error::WriteError;
use crate::field::{Field, FieldValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub field: Field,
    pub icon: &'static str,
}

pub static SWITCHES: [SwitchDescription; 3] = [
    SwitchDescription {
        key: "opendetect",
        name: "Open lid detect",
        field: Field::OpenDetect,
        icon: "mdi:valve-open",
    },
    SwitchDescription {
        key: "menu_scrolling",
        name: "Menu scrolling",
        field: Field::MenuScrolling,
        icon: "mdi:script-text",
    },
    SwitchDescription {
        key: "key_beeps",
        name: "Key beeps",
        field: Field::KeyBeeps,
        icon: "mdi:keyboard",
    },
];

pub struct SwitchEntity<T: DeviceTransport> {
    coordinator: Coordinator<T>,
    desc: &'static SwitchDescription,
    unique_id: String,
}

impl<T: DeviceTransport> SwitchEntity<T> {
    pub(crate) fn new(
        coordinator: Coordinator<T>,
        device_name: &str,
        desc: &'static SwitchDescription,
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
        Some(EntityCategory::Config)
    }

    #[allow(clippy::unused_self)]
    pub fn enabled_by_default(&self) -> bool {
        false
    }

    pub fn state(&self) -> EntityState {
        match live_snapshot(&self.coordinator).and_then(|s| s.value(self.desc.field)) {
            Some(FieldValue::Flag(on)) => EntityState::Switch(on),
            _ => EntityState::Unavailable,
        }
    }

    pub async fn turn_on(&self) -> Result<(), WriteError> {
        self.coordinator.write(self.desc.field, true).await
    }

    pub async fn turn_off(&self) -> Result<(), WriteError> {
        self.coordinator.write(self.desc.field, false).await
    }
}
