// ── Field table ──
//
// The closed set of values the controller reports or accepts. Every read
// in `parse` and every write through the coordinator is routed through
// `Field::spec()`, so wire keys, domains and target pages live in exactly
// one place.

use std::fmt;
use std::str::FromStr;

use cyberq_api::{Page, WriteRequest};
use serde::Serialize;
use strum::{EnumCount, EnumIter, IntoEnumIterator};

use crate::error::WriteError;
use crate::model::{
    AlarmBeeps, Choice, DegreeUnits, ProbeId, RampProbe, Snapshot, Status, TimeoutAction,
    format_hms,
};

/// Lowest setpoint the controller accepts, °F. Also the "off" setpoint.
pub const TEMP_MIN: f64 = 32.0;
/// Highest setpoint the controller accepts, °F.
pub const TEMP_MAX: f64 = 475.0;
/// Lowest temperature a probe can report, °F. A probe left outside in
/// winter reads below zero.
pub const READING_MIN: f64 = -999.9;
/// Highest temperature a probe can report, °F.
pub const READING_MAX: f64 = 999.9;
/// Longest probe label the controller stores.
pub const NAME_MAX_LEN: usize = 20;

/// Every value the device exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum Field {
    CookName,
    Food1Name,
    Food2Name,
    Food3Name,
    CookTemp,
    Food1Temp,
    Food2Temp,
    Food3Temp,
    CookSet,
    Food1Set,
    Food2Set,
    Food3Set,
    CookStatus,
    Food1Status,
    Food2Status,
    Food3Status,
    PropBand,
    CycleTime,
    AlarmDev,
    CookHold,
    CookRamp,
    DegUnits,
    AlarmBeeps,
    TimeoutAction,
    LcdBacklight,
    LcdContrast,
    MenuScrolling,
    KeyBeeps,
    OpenDetect,
    OutputPercent,
    FanShorted,
    TimerStatus,
    TimerCurr,
}

/// How a field is encoded on the wire, and its domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-text label, `1..=20` chars of `[A-Za-z0-9_ +]`.
    Text,
    /// Probe temperature in tenths of °F, `OPEN` when unplugged.
    Reading,
    /// Setpoint; tenths of °F on read, whole °F on write, `32..=475`.
    Setpoint,
    /// Plain integer.
    Integer { min: u8, max: u8 },
    /// Option index into the given labels.
    Choice(&'static [&'static str]),
    /// `0`/`1`.
    Flag,
    /// `HH:MM:SS`.
    Timer,
}

/// One row of the field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub wire_key: &'static str,
    /// Older firmware reports some keys without the `COOK_` prefix.
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
    /// Settings page writes go to; `None` for read-only fields.
    pub page: Option<Page>,
    /// A payload without this field cannot produce a snapshot.
    pub required: bool,
}

impl FieldSpec {
    const fn read_only(wire_key: &'static str, kind: FieldKind) -> Self {
        Self {
            wire_key,
            aliases: &[],
            kind,
            page: None,
            required: true,
        }
    }

    const fn writable(wire_key: &'static str, kind: FieldKind, page: Page) -> Self {
        Self {
            wire_key,
            aliases: &[],
            kind,
            page: Some(page),
            required: true,
        }
    }

    const fn aliased(mut self, aliases: &'static [&'static str]) -> Self {
        self.aliases = aliases;
        self
    }

    const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// All keys this field may appear under, canonical first.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + use<> {
        std::iter::once(self.wire_key).chain(self.aliases.iter().copied())
    }
}

const PERCENT: FieldKind = FieldKind::Integer { min: 0, max: 100 };
const STATUS: FieldKind = FieldKind::Choice(Status::LABELS);

impl Field {
    pub fn spec(self) -> FieldSpec {
        use FieldKind::{Flag, Reading, Setpoint, Text, Timer};

        match self {
            Self::CookName => FieldSpec::writable("COOK_NAME", Text, Page::Index),
            Self::Food1Name => FieldSpec::writable("FOOD1_NAME", Text, Page::Index),
            Self::Food2Name => FieldSpec::writable("FOOD2_NAME", Text, Page::Index),
            Self::Food3Name => FieldSpec::writable("FOOD3_NAME", Text, Page::Index),
            Self::CookTemp => FieldSpec::read_only("COOK_TEMP", Reading),
            Self::Food1Temp => FieldSpec::read_only("FOOD1_TEMP", Reading),
            Self::Food2Temp => FieldSpec::read_only("FOOD2_TEMP", Reading),
            Self::Food3Temp => FieldSpec::read_only("FOOD3_TEMP", Reading),
            Self::CookSet => FieldSpec::writable("COOK_SET", Setpoint, Page::Index),
            Self::Food1Set => FieldSpec::writable("FOOD1_SET", Setpoint, Page::Index),
            Self::Food2Set => FieldSpec::writable("FOOD2_SET", Setpoint, Page::Index),
            Self::Food3Set => FieldSpec::writable("FOOD3_SET", Setpoint, Page::Index),
            Self::CookStatus => FieldSpec::read_only("COOK_STATUS", STATUS),
            Self::Food1Status => FieldSpec::read_only("FOOD1_STATUS", STATUS),
            Self::Food2Status => FieldSpec::read_only("FOOD2_STATUS", STATUS),
            Self::Food3Status => FieldSpec::read_only("FOOD3_STATUS", STATUS),
            Self::PropBand => FieldSpec::writable(
                "COOK_PROPBAND",
                FieldKind::Integer { min: 5, max: 100 },
                Page::Index,
            )
            .aliased(&["PROPBAND"]),
            Self::CycleTime => FieldSpec::writable(
                "COOK_CYCTIME",
                FieldKind::Integer { min: 1, max: 30 },
                Page::Index,
            )
            .aliased(&["CYCTIME"]),
            Self::AlarmDev => FieldSpec::writable(
                "ALARMDEV",
                FieldKind::Integer { min: 0, max: 100 },
                Page::Control,
            ),
            Self::CookHold => FieldSpec::writable("COOKHOLD", Setpoint, Page::Control),
            Self::CookRamp => FieldSpec::writable(
                "COOK_RAMP",
                FieldKind::Choice(RampProbe::LABELS),
                Page::Control,
            ),
            Self::DegUnits => FieldSpec::writable(
                "DEG_UNITS",
                FieldKind::Choice(DegreeUnits::LABELS),
                Page::System,
            ),
            Self::AlarmBeeps => FieldSpec::writable(
                "ALARM_BEEPS",
                FieldKind::Choice(AlarmBeeps::LABELS),
                Page::System,
            ),
            Self::TimeoutAction => FieldSpec::writable(
                "TIMEOUT_ACTION",
                FieldKind::Choice(TimeoutAction::LABELS),
                Page::Control,
            ),
            Self::LcdBacklight => FieldSpec::writable("LCD_BACKLIGHT", PERCENT, Page::System),
            Self::LcdContrast => FieldSpec::writable("LCD_CONTRAST", PERCENT, Page::System),
            Self::MenuScrolling => FieldSpec::writable("MENU_SCROLLING", Flag, Page::System),
            Self::KeyBeeps => FieldSpec::writable("KEY_BEEPS", Flag, Page::System),
            Self::OpenDetect => FieldSpec::writable("OPENDETECT", Flag, Page::Control),
            Self::OutputPercent => FieldSpec::read_only("OUTPUT_PERCENT", PERCENT),
            Self::FanShorted => FieldSpec::read_only("FAN_SHORTED", Flag).optional(),
            Self::TimerStatus => FieldSpec::read_only("TIMER_STATUS", STATUS),
            Self::TimerCurr => FieldSpec::read_only("TIMER_CURR", Timer),
        }
    }

    pub fn wire_key(self) -> &'static str {
        self.spec().wire_key
    }

    pub fn is_writable(self) -> bool {
        self.spec().page.is_some()
    }

    /// Look a field up by its wire key or an alias, ignoring case.
    pub fn from_wire_key(key: &str) -> Option<Self> {
        let key = key.trim();
        Self::iter().find(|field| field.spec().keys().any(|k| k.eq_ignore_ascii_case(key)))
    }

    pub fn name(probe: ProbeId) -> Self {
        match probe {
            ProbeId::Cook => Self::CookName,
            ProbeId::Food1 => Self::Food1Name,
            ProbeId::Food2 => Self::Food2Name,
            ProbeId::Food3 => Self::Food3Name,
        }
    }

    pub fn temp(probe: ProbeId) -> Self {
        match probe {
            ProbeId::Cook => Self::CookTemp,
            ProbeId::Food1 => Self::Food1Temp,
            ProbeId::Food2 => Self::Food2Temp,
            ProbeId::Food3 => Self::Food3Temp,
        }
    }

    pub fn set(probe: ProbeId) -> Self {
        match probe {
            ProbeId::Cook => Self::CookSet,
            ProbeId::Food1 => Self::Food1Set,
            ProbeId::Food2 => Self::Food2Set,
            ProbeId::Food3 => Self::Food3Set,
        }
    }

    pub fn status(probe: ProbeId) -> Self {
        match probe {
            ProbeId::Cook => Self::CookStatus,
            ProbeId::Food1 => Self::Food1Status,
            ProbeId::Food2 => Self::Food2Status,
            ProbeId::Food3 => Self::Food3Status,
        }
    }

    /// The probe a per-probe field belongs to.
    pub fn probe(self) -> Option<ProbeId> {
        ProbeId::ALL.into_iter().find(|&probe| {
            [Self::name(probe), Self::temp(probe), Self::set(probe), Self::status(probe)]
                .contains(&self)
        })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_key())
    }
}

impl FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire_key(s).ok_or_else(|| format!("unknown field '{s}'"))
    }
}

// ── Values ──────────────────────────────────────────────────────────

/// A typed field value, as read from a snapshot or handed to a write.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Flag(bool),
    /// An option label, e.g. `Food 1`.
    Option(String),
    Text(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Flag(true) => f.write_str("on"),
            Self::Flag(false) => f.write_str("off"),
            Self::Option(s) | Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// A validated write: the request for the transport and the value to
/// merge into the cached snapshot once the device accepts it.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedWrite {
    pub field: Field,
    pub request: WriteRequest,
    pub value: FieldValue,
}

impl Field {
    /// Interpret user input (e.g. a CLI argument) for this field.
    pub fn parse_value(self, input: &str) -> Result<FieldValue, WriteError> {
        let input = input.trim();
        match self.spec().kind {
            FieldKind::Reading | FieldKind::Timer => Err(WriteError::ReadOnly(self)),
            FieldKind::Text => Ok(FieldValue::Text(input.to_owned())),
            FieldKind::Setpoint | FieldKind::Integer { .. } => input
                .parse::<f64>()
                .map(FieldValue::Number)
                .map_err(|_| WriteError::invalid(self, format!("'{input}' is not a number"))),
            FieldKind::Choice(_) => Ok(FieldValue::Option(input.to_owned())),
            FieldKind::Flag => match input.to_ascii_lowercase().as_str() {
                "1" | "on" | "true" | "yes" => Ok(FieldValue::Flag(true)),
                "0" | "off" | "false" | "no" => Ok(FieldValue::Flag(false)),
                _ => Err(WriteError::invalid(self, format!("'{input}' is not on/off"))),
            },
        }
    }

    /// Validate `value` against this field's domain and encode it for the wire.
    ///
    /// Performs no I/O; a value that fails here never reaches the transport.
    pub fn encode(self, value: &FieldValue) -> Result<EncodedWrite, WriteError> {
        let spec = self.spec();
        let Some(page) = spec.page else {
            return Err(WriteError::ReadOnly(self));
        };

        let (wire, echo, normalized) = match (spec.kind, value) {
            (FieldKind::Text, FieldValue::Text(text) | FieldValue::Option(text)) => {
                validate_label(self, text)?;
                (text.clone(), text.clone(), FieldValue::Text(text.clone()))
            }
            (FieldKind::Setpoint, FieldValue::Number(n)) => {
                let degrees = checked_whole(self, *n, TEMP_MIN, TEMP_MAX)?;
                (
                    degrees.to_string(),
                    (degrees * 10).to_string(),
                    FieldValue::Number(f64::from(degrees)),
                )
            }
            (FieldKind::Integer { min, max }, FieldValue::Number(n)) => {
                let whole = checked_whole(self, *n, f64::from(min), f64::from(max))?;
                if (*n - f64::from(whole)).abs() > f64::EPSILON {
                    return Err(WriteError::invalid(self, format!("{n} is not a whole number")));
                }
                (whole.to_string(), whole.to_string(), FieldValue::Number(f64::from(whole)))
            }
            (FieldKind::Choice(labels), FieldValue::Option(label)) => {
                let index = labels
                    .iter()
                    .position(|l| l.eq_ignore_ascii_case(label.trim()))
                    .ok_or_else(|| {
                        WriteError::invalid(
                            self,
                            format!("'{label}' is not one of: {}", labels.join(", ")),
                        )
                    })?;
                let canonical = labels.get(index).copied().unwrap_or_default();
                (
                    index.to_string(),
                    index.to_string(),
                    FieldValue::Option(canonical.to_owned()),
                )
            }
            (FieldKind::Flag, FieldValue::Flag(on)) => {
                let wire = if *on { "1" } else { "0" };
                (wire.to_owned(), wire.to_owned(), FieldValue::Flag(*on))
            }
            (FieldKind::Reading | FieldKind::Timer, _) => return Err(WriteError::ReadOnly(self)),
            (_, other) => {
                return Err(WriteError::invalid(self, format!("wrong value type: {other:?}")));
            }
        };

        Ok(EncodedWrite {
            field: self,
            request: WriteRequest::new(page, spec.wire_key, wire).with_expected_echo(Some(echo)),
            value: normalized,
        })
    }
}

fn validate_label(field: Field, text: &str) -> Result<(), WriteError> {
    let len = text.chars().count();
    if len == 0 || len > NAME_MAX_LEN {
        return Err(WriteError::invalid(
            field,
            format!("must be 1 to {NAME_MAX_LEN} characters"),
        ));
    }
    if let Some(bad) = text
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | ' ' | '+')))
    {
        return Err(WriteError::invalid(field, format!("character '{bad}' is not allowed")));
    }
    Ok(())
}

/// Round to the nearest whole number and check it lies in `min..=max`.
fn checked_whole(field: Field, value: f64, min: f64, max: f64) -> Result<i32, WriteError> {
    if !value.is_finite() {
        return Err(WriteError::invalid(field, "not a finite number"));
    }
    let rounded = value.round();
    if rounded < min || rounded > max {
        return Err(WriteError::invalid(
            field,
            format!("{value} is outside {min}..={max}"),
        ));
    }
    Ok(round_to_i32(rounded))
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub(crate) fn round_to_i32(value: f64) -> i32 {
    value.round() as i32
}

fn number_to_u8(value: f64) -> u8 {
    u8::try_from(round_to_i32(value)).unwrap_or(u8::MAX)
}

// ── Snapshot access by field ────────────────────────────────────────

impl Snapshot {
    /// Current value of `field`, or `None` when the device does not report it
    /// (an unplugged probe, firmware without `FAN_SHORTED`).
    pub fn value(&self, field: Field) -> Option<FieldValue> {
        if let Some(probe) = field.probe() {
            let reading = self.probe(probe);
            return match field.spec().kind {
                FieldKind::Text => Some(FieldValue::Text(reading.name.clone())),
                FieldKind::Reading => reading.temperature.map(FieldValue::Number),
                FieldKind::Setpoint => Some(FieldValue::Number(reading.target)),
                _ => Some(FieldValue::Option(reading.status.label().to_owned())),
            };
        }

        let control = &self.control;
        let system = &self.system;
        let value = match field {
            Field::PropBand => FieldValue::Number(f64::from(control.prop_band)),
            Field::CycleTime => FieldValue::Number(f64::from(control.cycle_time)),
            Field::AlarmDev => FieldValue::Number(f64::from(control.alarm_deviation)),
            Field::CookHold => FieldValue::Number(control.cook_hold),
            Field::CookRamp => FieldValue::Option(control.ramp.label().to_owned()),
            Field::TimeoutAction => FieldValue::Option(control.timeout_action.label().to_owned()),
            Field::OpenDetect => FieldValue::Flag(control.open_detect),
            Field::DegUnits => FieldValue::Option(system.degree_units.label().to_owned()),
            Field::AlarmBeeps => FieldValue::Option(system.alarm_beeps.label().to_owned()),
            Field::LcdBacklight => FieldValue::Number(f64::from(system.lcd_backlight)),
            Field::LcdContrast => FieldValue::Number(f64::from(system.lcd_contrast)),
            Field::MenuScrolling => FieldValue::Flag(system.menu_scrolling),
            Field::KeyBeeps => FieldValue::Flag(system.key_beeps),
            Field::OutputPercent => FieldValue::Number(f64::from(self.output_percent)),
            Field::FanShorted => FieldValue::Flag(self.fan_shorted?),
            Field::TimerStatus => FieldValue::Option(self.timer_status.label().to_owned()),
            Field::TimerCurr => FieldValue::Text(format_hms(self.timer_remaining)),
            // per-probe fields are handled above
            _ => return None,
        };
        Some(value)
    }

    /// Merge an accepted write into this snapshot. Values come from
    /// [`Field::encode`] and are already within the field's domain.
    pub(crate) fn apply(&mut self, field: Field, value: &FieldValue) {
        if let Some(probe) = field.probe() {
            let reading = self.probe_mut(probe);
            match value {
                FieldValue::Text(name) => reading.name.clone_from(name),
                FieldValue::Number(n) => reading.target = *n,
                _ => {}
            }
            return;
        }

        match (field, value) {
            (Field::PropBand, FieldValue::Number(n)) => self.control.prop_band = number_to_u8(*n),
            (Field::CycleTime, FieldValue::Number(n)) => self.control.cycle_time = number_to_u8(*n),
            (Field::AlarmDev, FieldValue::Number(n)) => {
                self.control.alarm_deviation = number_to_u8(*n);
            }
            (Field::CookHold, FieldValue::Number(n)) => self.control.cook_hold = *n,
            (Field::CookRamp, FieldValue::Option(label)) => {
                if let Some(ramp) = RampProbe::from_label(label) {
                    self.control.ramp = ramp;
                }
            }
            (Field::TimeoutAction, FieldValue::Option(label)) => {
                if let Some(action) = TimeoutAction::from_label(label) {
                    self.control.timeout_action = action;
                }
            }
            (Field::OpenDetect, FieldValue::Flag(on)) => self.control.open_detect = *on,
            (Field::DegUnits, FieldValue::Option(label)) => {
                if let Some(units) = DegreeUnits::from_label(label) {
                    self.system.degree_units = units;
                }
            }
            (Field::AlarmBeeps, FieldValue::Option(label)) => {
                if let Some(beeps) = AlarmBeeps::from_label(label) {
                    self.system.alarm_beeps = beeps;
                }
            }
            (Field::LcdBacklight, FieldValue::Number(n)) => {
                self.system.lcd_backlight = number_to_u8(*n);
            }
            (Field::LcdContrast, FieldValue::Number(n)) => {
                self.system.lcd_contrast = number_to_u8(*n);
            }
            (Field::MenuScrolling, FieldValue::Flag(on)) => self.system.menu_scrolling = *on,
            (Field::KeyBeeps, FieldValue::Flag(on)) => self.system.key_beeps = *on,
            _ => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wire_keys_are_unique() {
        let mut keys: Vec<&str> = Field::iter().flat_map(|f| f.spec().keys()).collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert_eq!(Field::COUNT, 33);
    }

    #[test]
    fn lookup_accepts_aliases() {
        assert_eq!(Field::from_wire_key("PROPBAND"), Some(Field::PropBand));
        assert_eq!(Field::from_wire_key("cook_cyctime"), Some(Field::CycleTime));
        assert_eq!(Field::from_wire_key("NOPE"), None);
        assert_eq!("alarmdev".parse::<Field>(), Ok(Field::AlarmDev));
    }

    #[test]
    fn per_probe_fields_resolve_their_probe() {
        assert_eq!(Field::Food2Set.probe(), Some(ProbeId::Food2));
        assert_eq!(Field::CookStatus.probe(), Some(ProbeId::Cook));
        assert_eq!(Field::AlarmDev.probe(), None);
    }

    #[test]
    fn setpoint_encodes_degrees_and_echoes_tenths() {
        let encoded = Field::CookSet.encode(&FieldValue::Number(230.0)).unwrap();
        assert_eq!(encoded.request.page, Page::Index);
        assert_eq!(encoded.request.key, "COOK_SET");
        assert_eq!(encoded.request.value, "230");
        assert_eq!(encoded.request.expected_echo.as_deref(), Some("2300"));
        assert_eq!(encoded.value, FieldValue::Number(230.0));
    }

    #[test]
    fn out_of_range_setpoint_is_invalid() {
        let err = Field::Food1Set.encode(&FieldValue::Number(500.0)).unwrap_err();
        assert!(matches!(err, WriteError::InvalidValue { field: Field::Food1Set, .. }));
        let err = Field::CookSet.encode(&FieldValue::Number(f64::NAN)).unwrap_err();
        assert!(matches!(err, WriteError::InvalidValue { .. }));
    }

    #[test]
    fn integer_bounds() {
        assert!(Field::AlarmDev.encode(&FieldValue::Number(0.0)).is_ok());
        assert!(Field::AlarmDev.encode(&FieldValue::Number(101.0)).is_err());
        assert!(Field::PropBand.encode(&FieldValue::Number(4.0)).is_err());
        assert!(Field::CycleTime.encode(&FieldValue::Number(30.0)).is_ok());
        assert!(Field::CycleTime.encode(&FieldValue::Number(6.5)).is_err());
    }

    #[test]
    fn choice_encodes_index() {
        let encoded = Field::CookRamp
            .encode(&FieldValue::Option("food 2".into()))
            .unwrap();
        assert_eq!(encoded.request.page, Page::Control);
        assert_eq!(encoded.request.value, "2");
        assert_eq!(encoded.value, FieldValue::Option("Food 2".into()));

        let err = Field::DegUnits
            .encode(&FieldValue::Option("Kelvin".into()))
            .unwrap_err();
        assert!(matches!(err, WriteError::InvalidValue { .. }));
    }

    #[test]
    fn labels_are_restricted() {
        assert!(Field::CookName.encode(&FieldValue::Text("Big Green Egg+1".into())).is_ok());
        assert!(Field::CookName.encode(&FieldValue::Text(String::new())).is_err());
        assert!(Field::CookName.encode(&FieldValue::Text("x".repeat(21))).is_err());
        assert!(Field::CookName.encode(&FieldValue::Text("ribs!".into())).is_err());
    }

    #[test]
    fn read_only_fields_refuse_writes() {
        for field in [Field::CookTemp, Field::OutputPercent, Field::TimerCurr, Field::FanShorted] {
            let err = field.encode(&FieldValue::Number(1.0)).unwrap_err();
            assert!(matches!(err, WriteError::ReadOnly(f) if f == field));
        }
    }

    #[test]
    fn wrong_value_type_is_invalid() {
        let err = Field::KeyBeeps.encode(&FieldValue::Number(1.0)).unwrap_err();
        assert!(matches!(err, WriteError::InvalidValue { .. }));
    }

    #[test]
    fn parse_value_per_kind() {
        assert_eq!(Field::OpenDetect.parse_value("on").unwrap(), FieldValue::Flag(true));
        assert_eq!(Field::AlarmDev.parse_value("15").unwrap(), FieldValue::Number(15.0));
        assert!(Field::AlarmDev.parse_value("fifteen").is_err());
        assert!(matches!(
            Field::CookTemp.parse_value("200"),
            Err(WriteError::ReadOnly(Field::CookTemp))
        ));
    }
}
