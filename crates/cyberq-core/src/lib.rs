// cyberq-core: Device state synchronization between cyberq-api and consumers (CLI).

pub mod config;
pub mod coordinator;
pub mod diagnostics;
pub mod entity;
pub mod error;
pub mod field;
pub mod model;
pub mod parse;
pub mod setup;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::CoordinatorConfig;
pub use coordinator::{Availability, Coordinator, CoordinatorEvent, RefreshOutcome, UnavailableReason};
pub use error::{CoreError, ParseError, SetupError, TransportError, WriteError};
pub use field::{Field, FieldKind, FieldSpec, FieldValue};
pub use parse::parse;
pub use diagnostics::diagnostics;
pub use entity::{Entity, EntityCategory, EntityKind, EntityState, EntitySummary, build_entities};
pub use setup::{probe_device, probe_with};
pub use stream::{SnapshotStream, SnapshotWatchStream};

pub use model::{
    AlarmBeeps, ControlSettings, DegreeUnits, DeviceInfo, ProbeId, ProbeReading, RampProbe,
    Snapshot, Status, SystemSettings, TimeoutAction,
};

pub use cyberq_api::{CyberqClient, DeviceTransport, Page, RawPayload, TransportConfig, WriteRequest};
