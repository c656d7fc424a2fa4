// ── Probe label entities ──

use cyberq_api::DeviceTransport;

use super::{EntityCategory, EntityState, live_snapshot, unique_id};
use crate::coordinator::Coordinator;
use crate::error::WriteError;
use crate::field::{Field, FieldValue, NAME_MAX_LEN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub field: Field,
    pub icon: &'static str,
}

pub static TEXTS: [TextDescription; 4] = [
    TextDescription {
        key: "cook_name",
        name: "Pit name",
        field: Field::CookName,
        icon: "mdi:fire",
    },
    TextDescription {
        key: "probe1_name",
        name: "Food 1 name",
        field: Field::Food1Name,
        icon: "mdi:thermometer",
    },
    TextDescription {
        key: "probe2_name",
        name: "Food 2 name",
        field: Field::Food2Name,
        icon: "mdi:thermometer",
    },
    TextDescription {
        key: "probe3_name",
        name: "Food 3 name",
        field: Field::Food3Name,
        icon: "mdi:thermometer",
    },
];

pub struct TextEntity<T: DeviceTransport> {
    coordinator: Coordinator<T>,
    desc: &'static TextDescription,
    unique_id: String,
}

impl<T: DeviceTransport> TextEntity<T> {
    pub const MIN_LEN: usize = 1;
    pub const MAX_LEN: usize = NAME_MAX_LEN;
    pub const PATTERN: &'static str = "^[A-Za-z0-9_ +]{1,20}$";

    pub(crate) fn new(
        coordinator: Coordinator<T>,
        device_name: &str,
        desc: &'static TextDescription,
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
        true
    }

    pub fn state(&self) -> EntityState {
        match live_snapshot(&self.coordinator).and_then(|s| s.value(self.desc.field)) {
            Some(FieldValue::Text(label)) => EntityState::Text(label),
            _ => EntityState::Unavailable,
        }
    }

    pub async fn set_value(&self, label: &str) -> Result<(), WriteError> {
        self.coordinator
            .write(self.desc.field, FieldValue::Text(label.to_owned()))
            .await
    }
}
