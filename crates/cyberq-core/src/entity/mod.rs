// ── Entity adapters ──
//
// Host-facing view of the device: each entity holds a coordinator handle,
// reads its value from the current snapshot, and routes writes through
// `Coordinator::write`. Entities never cache state of their own.

mod binary;
mod climate;
mod number;
mod select;
mod sensor;
mod switch;
mod text;

use std::sync::Arc;

use serde::Serialize;
use strum::{Display, IntoStaticStr};

use cyberq_api::DeviceTransport;

use crate::coordinator::Coordinator;
use crate::error::WriteError;
use crate::field::FieldValue;
use crate::model::{ProbeId, Snapshot};

pub use binary::{BINARY_SENSORS, BinaryDescription, BinaryEntity};
pub use climate::{ClimateEntity, ClimateState, HvacMode};
pub use number::{NUMBERS, NumberDescription, NumberEntity};
pub use select::{SELECTS, SelectDescription, SelectEntity};
pub use sensor::{SENSORS, SensorDescription, SensorEntity};
pub use switch::{SWITCHES, SwitchDescription, SwitchEntity};
pub use text::{TEXTS, TextDescription, TextEntity};

// ── Shared types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    BinarySensor,
    Climate,
    Number,
    Select,
    Sensor,
    Switch,
    Text,
}

/// Where a host should list the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityCategory {
    Config,
    Diagnostic,
}

/// What an entity currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EntityState {
    /// The coordinator is unavailable or has not produced a snapshot yet.
    Unavailable,
    Climate(ClimateState),
    Number(f64),
    Select(String),
    /// `None` when the device does not report the value right now.
    Sensor(Option<FieldValue>),
    Switch(bool),
    Text(String),
    BinarySensor(bool),
}

impl EntityState {
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable)
    }
}

/// Static metadata plus current state, for listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySummary {
    pub unique_id: String,
    pub name: String,
    pub kind: EntityKind,
    pub icon: &'static str,
    pub category: Option<EntityCategory>,
    pub enabled_by_default: bool,
    pub state: EntityState,
}

/// Snapshot to render from, or `None` when entities must show unavailable.
pub(crate) fn live_snapshot<T: DeviceTransport>(
    coordinator: &Coordinator<T>,
) -> Option<Arc<Snapshot>> {
    if !coordinator.availability().is_available() {
        return None;
    }
    coordinator.current_snapshot()
}

fn unique_id(device_name: &str, key: &str) -> String {
    format!("{device_name}_{key}")
}

// ── Entity ──────────────────────────────────────────────────────────

/// Any of the seven entity kinds.
pub enum Entity<T: DeviceTransport> {
    BinarySensor(BinaryEntity<T>),
    Climate(ClimateEntity<T>),
    Number(NumberEntity<T>),
    Select(SelectEntity<T>),
    Sensor(SensorEntity<T>),
    Switch(SwitchEntity<T>),
    Text(TextEntity<T>),
}

macro_rules! dispatch {
    ($self:ident, $entity:ident => $body:expr) => {
        match $self {
            Entity::BinarySensor($entity) => $body,
            Entity::Climate($entity) => $body,
            Entity::Number($entity) => $body,
            Entity::Select($entity) => $body,
            Entity::Sensor($entity) => $body,
            Entity::Switch($entity) => $body,
            Entity::Text($entity) => $body,
        }
    };
}

impl<T: DeviceTransport> Entity<T> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::BinarySensor(_) => EntityKind::BinarySensor,
            Self::Climate(_) => EntityKind::Climate,
            Self::Number(_) => EntityKind::Number,
            Self::Select(_) => EntityKind::Select,
            Self::Sensor(_) => EntityKind::Sensor,
            Self::Switch(_) => EntityKind::Switch,
            Self::Text(_) => EntityKind::Text,
        }
    }

    pub fn unique_id(&self) -> &str {
        dispatch!(self, e => e.unique_id())
    }

    pub fn name(&self) -> String {
        dispatch!(self, e => e.name())
    }

    pub fn icon(&self) -> &'static str {
        dispatch!(self, e => e.icon())
    }

    pub fn category(&self) -> Option<EntityCategory> {
        dispatch!(self, e => e.category())
    }

    pub fn enabled_by_default(&self) -> bool {
        dispatch!(self, e => e.enabled_by_default())
    }

    pub fn state(&self) -> EntityState {
        dispatch!(self, e => e.state())
    }

    /// Set the entity from user input. Read-only kinds reject every value.
    pub async fn set(&self, input: &str) -> Result<(), WriteError> {
        match self {
            Self::Climate(e) => e.set_target(parse_number(e.field(), input)?).await,
            Self::Number(e) => e.set_value(parse_number(e.field(), input)?).await,
            Self::Select(e) => e.select_option(input).await,
            Self::Switch(e) => match e.field().parse_value(input)? {
                FieldValue::Flag(true) => e.turn_on().await,
                _ => e.turn_off().await,
            },
            Self::Text(e) => e.set_value(input).await,
            Self::BinarySensor(e) => Err(WriteError::ReadOnly(e.field())),
            Self::Sensor(e) => Err(WriteError::ReadOnly(e.field())),
        }
    }

    pub fn summary(&self) -> EntitySummary {
        EntitySummary {
            unique_id: self.unique_id().to_owned(),
            name: self.name(),
            kind: self.kind(),
            icon: self.icon(),
            category: self.category(),
            enabled_by_default: self.enabled_by_default(),
            state: self.state(),
        }
    }
}

fn parse_number(field: crate::field::Field, input: &str) -> Result<f64, WriteError> {
    match field.parse_value(input)? {
        FieldValue::Number(n) => Ok(n),
        other => Err(WriteError::invalid(field, format!("expected a number, got {other}"))),
    }
}

/// Build the full entity set for one device.
///
/// Naming uses the device identity from the current snapshot, falling back
/// to the configured host. The fan-shorted indicator is only created when
/// the firmware reports it, so call this after a successful first refresh.
pub fn build_entities<T: DeviceTransport>(coordinator: &Coordinator<T>) -> Vec<Entity<T>> {
    let snapshot = coordinator.current_snapshot();
    let device_name = snapshot
        .as_ref()
        .and_then(|s| s.device.as_ref())
        .map_or_else(|| coordinator.config().host.clone(), |d| d.name());

    let mut entities = Vec::new();

    for probe in ProbeId::ALL {
        entities.push(Entity::Climate(ClimateEntity::new(
            coordinator.clone(),
            &device_name,
            probe,
        )));
    }
    for desc in &NUMBERS {
        entities.push(Entity::Number(NumberEntity::new(coordinator.clone(), &device_name, desc)));
    }
    for desc in &SELECTS {
        entities.push(Entity::Select(SelectEntity::new(coordinator.clone(), &device_name, desc)));
    }
    for desc in &SENSORS {
        entities.push(Entity::Sensor(SensorEntity::new(coordinator.clone(), &device_name, desc)));
    }
    for desc in &SWITCHES {
        entities.push(Entity::Switch(SwitchEntity::new(coordinator.clone(), &device_name, desc)));
    }
    for desc in &TEXTS {
        entities.push(Entity::Text(TextEntity::new(coordinator.clone(), &device_name, desc)));
    }
    if snapshot.as_ref().is_some_and(|s| s.fan_shorted.is_some()) {
        for desc in &BINARY_SENSORS {
            entities.push(Entity::BinarySensor(BinaryEntity::new(
                coordinator.clone(),
                &device_name,
                desc,
            )));
        }
    }

    entities
}
