// ── Domain model ──
//
// Typed view of one complete device read. Wire encodings (tenths of a
// degree, option indices, `OPEN`) never appear past `parse`.

mod probe;
mod settings;
mod snapshot;

pub use probe::{ProbeId, ProbeReading, Status};
pub use settings::{AlarmBeeps, Choice, ControlSettings, DegreeUnits, RampProbe, SystemSettings, TimeoutAction};
pub use snapshot::{DeviceInfo, MANUFACTURER, MODEL, Snapshot, format_hms};
