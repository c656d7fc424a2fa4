// ── Diagnostics dump ──
//
// Everything a bug report needs, with identifying values masked.

use serde_json::{Value, json};

use cyberq_api::DeviceTransport;

use crate::coordinator::Coordinator;

pub const REDACTED: &str = "**REDACTED**";

/// Keys masked wherever they appear in the dump.
pub const REDACT_KEYS: &[&str] = &["hostname", "host", "macaddress", "mac", "serial_number"];

/// Build the diagnostics document for one coordinator.
pub fn diagnostics<T: DeviceTransport>(coordinator: &Coordinator<T>) -> Value {
    let config = coordinator.config();
    let snapshot = coordinator.current_snapshot();

    let mut doc = json!({
        "config": {
            "hostname": config.host,
            "port": config.port,
            "poll_interval_secs": config.poll_interval().as_secs(),
            "request_timeout_ms": u64::try_from(config.request_timeout().as_millis()).unwrap_or(u64::MAX),
            "failure_threshold": config.failure_threshold,
        },
        "availability": coordinator.availability(),
        "device": snapshot.as_ref().and_then(|s| s.device.as_ref()).map(|d| json!({
            "model": d.model(),
            "manufacturer": d.manufacturer(),
            "macaddress": d.mac,
            "firmware_version": d.firmware_version,
            "serial_number": d.serial_number,
        })),
        "snapshot": snapshot.as_deref(),
    });
    redact(&mut doc);
    doc
}

/// Replace every value stored under a key in [`REDACT_KEYS`], recursively.
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map.iter_mut() {
                if REDACT_KEYS.contains(&key.as_str()) && !inner.is_null() {
                    *inner = Value::String(REDACTED.into());
                } else {
                    redact(inner);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn redacts_nested_keys() {
        let mut doc = json!({
            "config": { "hostname": "192.168.1.50", "port": 80 },
            "snapshot": { "device": { "mac": "00:1B:2C:3D:4E:5F", "serial_number": "4E5F",
                                      "firmware_version": "1.7" } },
            "list": [{ "macaddress": "x" }],
            "missing": { "serial_number": null },
        });
        redact(&mut doc);
        assert_eq!(
            doc,
            json!({
                "config": { "hostname": REDACTED, "port": 80 },
                "snapshot": { "device": { "mac": REDACTED, "serial_number": REDACTED,
                                          "firmware_version": "1.7" } },
                "list": [{ "macaddress": REDACTED }],
                "missing": { "serial_number": null },
            })
        );
    }
}
