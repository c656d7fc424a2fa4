// ── Enumerated selector entities ──

use cyberq_api::DeviceTransport;

use super::{EntityCategory, EntityState, live_snapshot, unique_id};
use crate::coordinator::Coordinator;
use crate::error::WriteError;
use crate::field::{Field, FieldKind, FieldValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectDescription {
    pub key: &'static str,
    pub name: &'static str,
    pub field: Field,
    pub icon: &'static str,
    pub enabled_by_default: bool,
}

impl SelectDescription {
    pub fn options(&self) -> &'static [&'static str] {
        match self.field.spec().kind {
            FieldKind::Choice(labels) => labels,
            _ => &[],
        }
    }
}

pub static SELECTS: [SelectDescription; 4] = [
    SelectDescription {
        key: "ramp_probe",
        name: "Ramp probe",
        field: Field::CookRamp,
        icon: "mdi:thermometer-lines",
        enabled_by_default: true,
    },
    SelectDescription {
        key: "display_degree_units",
        name: "Display units",
        field: Field::DegUnits,
        icon: "mdi:thermometer",
        enabled_by_default: false,
    },
    SelectDescription {
        key: "alarm_beeps",
        name: "Alarm beeps",
        field: Field::AlarmBeeps,
        icon: "mdi:alert",
        enabled_by_default: false,
    },
    SelectDescription {
        key: "timeout_action",
        name: "Timeout action",
        field: Field::TimeoutAction,
        icon: "mdi:clock",
        enabled_by_default: false,
    },
];

pub struct SelectEntity<T: DeviceTransport> {
    coordinator: Coordinator<T>,
    desc: &'static SelectDescription,
    unique_id: String,
}

impl<T: DeviceTransport> SelectEntity<T> {
    pub(crate) fn new(
        coordinator: Coordinator<T>,
        device_name: &str,
        desc: &'static SelectDescription,
    ) -> Self {
        Self {
            coordinator,
            desc,
            unique_id: unique_id(device_name, desc.key),
        }
    }

    pub fn description(&self) -> &'static SelectDescription {
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

    /// The timeout action selector shows the icon of the chosen action.
    pub fn icon(&self) -> &'static str {
        if self.desc.field == Field::TimeoutAction {
            if let Some(snapshot) = live_snapshot(&self.coordinator) {
                return snapshot.control.timeout_action.icon();
            }
        }
        self.desc.icon
    }

    #[allow(clippy::unused_self)]
    pub fn category(&self) -> Option<EntityCategory> {
        Some(EntityCategory::Config)
    }

    pub fn enabled_by_default(&self) -> bool {
        self.desc.enabled_by_default
    }

    pub fn state(&self) -> EntityState {
        match live_snapshot(&self.coordinator).and_then(|s| s.value(self.desc.field)) {
            Some(FieldValue::Option(label)) => EntityState::Select(label),
            _ => EntityState::Unavailable,
        }
    }

    pub async fn select_option(&self, option: &str) -> Result<(), WriteError> {
        self.coordinator
            .write(self.desc.field, FieldValue::Option(option.to_owned()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Choice, TimeoutAction};

    #[test]
    fn options_come_from_the_field_table() {
        assert_eq!(SELECTS[0].options(), ["None", "Food 1", "Food 2", "Food 3"]);
        assert_eq!(SELECTS[3].options(), TimeoutAction::LABELS);
        assert!(SELECTS.iter().all(|d| !d.options().is_empty()));
    }
}
