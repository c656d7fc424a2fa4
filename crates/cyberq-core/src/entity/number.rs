// ── Numeric setting entities ──

use cyberq_api::DeviceTransport;

use super::{EntityCategory, EntityState, live_snapshot, unique_id};
use crate::coordinator::Coordinator;
use crate::error::WriteError;
use crate::field::{Field, FieldKind, FieldValue, TEMP_MAX, TEMP_MIN};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub field: Field,
    pub icon: &'static str,
    pub unit: &'static str,
    pub step: f64,
}

impl NumberDescription {
    /// Bounds come from the field table.
    pub fn range(&self) -> (f64, f64) {
        match self.field.spec().kind {
            FieldKind::Integer { min, max } => (f64::from(min), f64::from(max)),
            _ => (TEMP_MIN, TEMP_MAX),
        }
    }
}

pub static NUMBERS: [NumberDescription; 6] = [
    NumberDescription {
        key: "cook_propband",
        name: "Proportional band",
        field: Field::PropBand,
        icon: "mdi:thermometer-lines",
        unit: "°F",
        step: 1.0,
    },
    NumberDescription {
        key: "cook_cyctime",
        name: "Cycle time",
        field: Field::CycleTime,
        icon: "mdi:fan-clock",
        unit: "s",
        step: 1.0,
    },
    NumberDescription {
        key: "alarmdev",
        name: "Alarm deviation",
        field: Field::AlarmDev,
        icon: "mdi:thermometer-alert",
        unit: "°F",
        step: 1.0,
    },
    NumberDescription {
        key: "lcd_backlight",
        name: "LCD backlight",
        field: Field::LcdBacklight,
        icon: "mdi:brightness-5",
        unit: "%",
        step: 1.0,
    },
    NumberDescription {
        key: "lcd_contrast",
        name: "LCD contrast",
        field: Field::LcdContrast,
        icon: "mdi:brightness-6",
        unit: "%",
        step: 1.0,
    },
    NumberDescription {
        key: "cook_hold",
        name: "Cook hold",
        field: Field::CookHold,
        icon: "mdi:thermometer",
        unit: "°F",
        step: 1.0,
    },
];

pub struct NumberEntity<T: DeviceTransport> {
    coordinator: Coordinator<T>,
    desc: &'static NumberDescription,
    unique_id: String,
}

impl<T: DeviceTransport> NumberEntity<T> {
    pub(crate) fn new(
        coordinator: Coordinator<T>,
        device_name: &str,
        desc: &'static NumberDescription,
    ) -> Self {
        Self {
            coordinator,
            desc,
            unique_id: unique_id(device_name, desc.key),
        }
    }

    pub fn description(&self) -> &'static NumberDescription {
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
            Some(FieldValue::Number(n)) => EntityState::Number(n),
            _ => EntityState::Unavailable,
        }
    }

    pub async fn set_value(&self, value: f64) -> Result<(), WriteError> {
        self.coordinator.write(self.desc.field, value).await
    }
}
