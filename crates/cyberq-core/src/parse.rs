// ── State parser ──
//
// Pure conversion from the transport's flat key/value payload to a typed
// `Snapshot`. A snapshot is either fully populated or not produced: the
// first bad or missing field fails the whole parse. Unknown keys are
// ignored. The coordinator stamps `sequence` after a successful parse.

use std::time::Duration;

use chrono::Utc;
use cyberq_api::RawPayload;

use crate::error::ParseError;
use crate::field::{Field, FieldKind, READING_MAX, READING_MIN, TEMP_MAX, TEMP_MIN};
use crate::model::{
    AlarmBeeps, Choice, ControlSettings, DegreeUnits, DeviceInfo, ProbeId, ProbeReading,
    RampProbe, Snapshot, Status, SystemSettings, TimeoutAction,
};

const OPEN: &str = "OPEN";
const MAC_KEY: &str = "MAC";
const FIRMWARE_KEY: &str = "FWVER";

/// Decode a raw device payload into a [`Snapshot`] with `sequence == 0`.
pub fn parse(payload: &RawPayload) -> Result<Snapshot, ParseError> {
    let probes = [
        probe(payload, ProbeId::Cook)?,
        probe(payload, ProbeId::Food1)?,
        probe(payload, ProbeId::Food2)?,
        probe(payload, ProbeId::Food3)?,
    ];

    let control = ControlSettings {
        prop_band: integer(payload, Field::PropBand)?,
        cycle_time: integer(payload, Field::CycleTime)?,
        alarm_deviation: integer(payload, Field::AlarmDev)?,
        cook_hold: setpoint(payload, Field::CookHold)?,
        ramp: choice::<RampProbe>(payload, Field::CookRamp)?,
        timeout_action: choice::<TimeoutAction>(payload, Field::TimeoutAction)?,
        open_detect: flag(payload, Field::OpenDetect)?,
    };

    let system = SystemSettings {
        degree_units: choice::<DegreeUnits>(payload, Field::DegUnits)?,
        alarm_beeps: choice::<AlarmBeeps>(payload, Field::AlarmBeeps)?,
        lcd_backlight: integer(payload, Field::LcdBacklight)?,
        lcd_contrast: integer(payload, Field::LcdContrast)?,
        menu_scrolling: flag(payload, Field::MenuScrolling)?,
        key_beeps: flag(payload, Field::KeyBeeps)?,
    };

    let fan_shorted = match lookup(payload, Field::FanShorted) {
        Some(raw) => Some(decode_flag(Field::FanShorted, raw)?),
        None => None,
    };

    Ok(Snapshot {
        sequence: 0,
        received_at: Utc::now(),
        probes,
        control,
        system,
        output_percent: integer(payload, Field::OutputPercent)?,
        fan_shorted,
        timer_status: choice::<Status>(payload, Field::TimerStatus)?,
        timer_remaining: timer(payload, Field::TimerCurr)?,
        device: device_info(payload),
    })
}

fn probe(payload: &RawPayload, id: ProbeId) -> Result<ProbeReading, ParseError> {
    Ok(ProbeReading {
        name: text(payload, Field::name(id))?,
        temperature: reading(payload, Field::temp(id))?,
        target: setpoint(payload, Field::set(id))?,
        status: choice::<Status>(payload, Field::status(id))?,
    })
}

fn device_info(payload: &RawPayload) -> Option<DeviceInfo> {
    let mac = payload.get(MAC_KEY).map(str::trim).filter(|m| !m.is_empty())?;
    let firmware = payload
        .get(FIRMWARE_KEY)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned);
    Some(DeviceInfo::from_mac(mac, firmware))
}

// ── Field decoders ──────────────────────────────────────────────────

/// Raw value under the field's wire key or one of its aliases.
fn lookup(payload: &RawPayload, field: Field) -> Option<&str> {
    field.spec().keys().find_map(|key| payload.get(key))
}

fn required(payload: &RawPayload, field: Field) -> Result<&str, ParseError> {
    lookup(payload, field).ok_or(ParseError::MissingField(field.wire_key()))
}

fn out_of_range(field: Field, raw: &str) -> ParseError {
    ParseError::OutOfRange {
        field: field.wire_key(),
        value: raw.to_owned(),
    }
}

fn malformed(field: Field, raw: &str) -> ParseError {
    ParseError::Malformed {
        field: field.wire_key(),
        value: raw.to_owned(),
    }
}

fn text(payload: &RawPayload, field: Field) -> Result<String, ParseError> {
    debug_assert_eq!(field.spec().kind, FieldKind::Text);
    required(payload, field).map(|raw| raw.trim().to_owned())
}

fn tenths(field: Field, raw: &str) -> Result<f64, ParseError> {
    let value: i32 = raw.trim().parse().map_err(|_| malformed(field, raw))?;
    Ok(f64::from(value) / 10.0)
}

fn reading(payload: &RawPayload, field: Field) -> Result<Option<f64>, ParseError> {
    let raw = required(payload, field)?;
    if raw.trim().eq_ignore_ascii_case(OPEN) {
        return Ok(None);
    }
    let degrees = tenths(field, raw)?;
    if !(READING_MIN..=READING_MAX).contains(&degrees) {
        return Err(out_of_range(field, raw));
    }
    Ok(Some(degrees))
}

fn setpoint(payload: &RawPayload, field: Field) -> Result<f64, ParseError> {
    let raw = required(payload, field)?;
    let degrees = tenths(field, raw)?;
    if !(TEMP_MIN..=TEMP_MAX).contains(&degrees) {
        return Err(out_of_range(field, raw));
    }
    Ok(degrees)
}

fn integer(payload: &RawPayload, field: Field) -> Result<u8, ParseError> {
    let FieldKind::Integer { min, max } = field.spec().kind else {
        return Err(malformed(field, "<not an integer field>"));
    };
    let raw = required(payload, field)?;
    let value: i64 = raw.trim().parse().map_err(|_| malformed(field, raw))?;
    u8::try_from(value)
        .ok()
        .filter(|v| (min..=max).contains(v))
        .ok_or_else(|| out_of_range(field, raw))
}

fn choice<C: Choice>(payload: &RawPayload, field: Field) -> Result<C, ParseError> {
    let raw = required(payload, field)?;
    let unknown = || ParseError::UnknownEnum {
        field: field.wire_key(),
        value: raw.to_owned(),
    };
    let index: usize = raw.trim().parse().map_err(|_| unknown())?;
    C::from_index(index).ok_or_else(unknown)
}

fn decode_flag(field: Field, raw: &str) -> Result<bool, ParseError> {
    let value: i64 = raw.trim().parse().map_err(|_| malformed(field, raw))?;
    Ok(value != 0)
}

fn flag(payload: &RawPayload, field: Field) -> Result<bool, ParseError> {
    decode_flag(field, required(payload, field)?)
}

fn timer(payload: &RawPayload, field: Field) -> Result<Duration, ParseError> {
    let raw = required(payload, field)?;
    let parts: Vec<&str> = raw.trim().split(':').collect();
    let [hours, minutes, seconds] = parts.as_slice() else {
        return Err(malformed(field, raw));
    };
    let component = |part: &str, limit: u64| -> Result<u64, ParseError> {
        if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed(field, raw));
        }
        let value: u64 = part.parse().map_err(|_| malformed(field, raw))?;
        if value >= limit {
            return Err(malformed(field, raw));
        }
        Ok(value)
    };
    let total = component(*hours, 100)? * 3600
        + component(*minutes, 60)? * 60
        + component(*seconds, 60)?;
    Ok(Duration::from_secs(total))
}
