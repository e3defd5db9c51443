//! # VMC Telegram Decoder
//!
//! This module decodes the ASCII telegrams returned by the ventilation unit into
//! typed records. It leverages the `nom` crate to split a tagged, comma-delimited
//! telegram into its fields; every fixed-position access happens only after the
//! field count has been checked.
//!
//! ## Telegrams
//! - `VMGO,...` status telegram (answer to `VMGH?`), decoded into [`StatusFrame`]
//! - `VMGI,...` sensor telegram (answer to `VMGI?`), decoded into [`SensorFrame`]
//! - `VMNM,<name>` or `VMNM <name>`, decoded into a device name
//! - `VMSL` 64-character network payload, decoded into [`NetworkInfo`]
//!
//! ## Usage
//!
//! ```
//! use vmc_rs::vmc::frame::{parse_sensors, parse_status};
//!
//! let sensors = parse_sensors("VMGI,220,150,500,800,0,0,0,0,0,0,150,0,0,0").unwrap();
//! assert_eq!(sensors.temp_internal_c, 22.0);
//!
//! assert!(parse_status("VMGO,2,00010").is_none());
//! ```
//!
//! The `decode` constructors return a typed [`VmcError`] describing why a telegram
//! was rejected; the `parse_*` functions collapse that into `None`.

use crate::constants::*;
use crate::error::VmcError;
use nom::bytes::complete::{tag, take_till};
use nom::character::complete::char;
use nom::combinator::all_consuming;
use nom::multi::many0;
use nom::sequence::{pair, preceded};
use nom::IResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroizing;

/// Operating mode encoded by a fan speed code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FanMode {
    Off,
    /// Manual speed 1..=4
    Manual(u8),
    Night,
    Hyperventilation,
    FreeCooling,
    /// Code outside the documented table
    Unknown(u8),
}

/// Raw fan speed code as reported in the status telegram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FanSpeed(pub u8);

impl FanSpeed {
    pub const OFF: FanSpeed = FanSpeed(FAN_SPEED_OFF);
    pub const NIGHT: FanSpeed = FanSpeed(FAN_SPEED_NIGHT);
    pub const HYPERVENTILATION: FanSpeed = FanSpeed(FAN_SPEED_HYPERVENTILATION);
    pub const FREE_COOLING: FanSpeed = FanSpeed(FAN_SPEED_FREE_COOLING);

    pub fn code(self) -> u8 {
        self.0
    }

    pub fn mode(self) -> FanMode {
        match self.0 {
            FAN_SPEED_OFF => FanMode::Off,
            s @ 1..=FAN_SPEED_MAX_MANUAL => FanMode::Manual(s),
            FAN_SPEED_NIGHT => FanMode::Night,
            FAN_SPEED_HYPERVENTILATION => FanMode::Hyperventilation,
            FAN_SPEED_FREE_COOLING => FanMode::FreeCooling,
            other => FanMode::Unknown(other),
        }
    }

    pub fn is_off(self) -> bool {
        self.0 == FAN_SPEED_OFF
    }

    /// Volumetric airflow in m³/h from the fixed table.
    pub fn airflow_m3h(self) -> f64 {
        AIRFLOW_M3H
            .get(usize::from(self.0))
            .copied()
            .unwrap_or(AIRFLOW_FALLBACK_M3H)
    }

    /// Fan percentage from the fixed table.
    pub fn percentage(self) -> u8 {
        FAN_PERCENTAGE
            .get(usize::from(self.0))
            .copied()
            .unwrap_or(FAN_PERCENTAGE_FALLBACK)
    }
}

impl From<u8> for FanSpeed {
    fn from(code: u8) -> Self {
        FanSpeed(code)
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode() {
            FanMode::Off => write!(f, "off"),
            FanMode::Manual(s) => write!(f, "speed {s}"),
            FanMode::Night => write!(f, "night"),
            FanMode::Hyperventilation => write!(f, "hyperventilation"),
            FanMode::FreeCooling => write!(f, "free cooling"),
            FanMode::Unknown(c) => write!(f, "unknown ({c})"),
        }
    }
}

/// Decoded `VMGO` status telegram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusFrame {
    pub fan_speed: FanSpeed,
    pub panel_led_on: bool,
    pub sensors_enabled: bool,
    pub lights_level_pct: u8,
    pub lights_timer_sec: u32,
}

/// Decoded `VMGI` sensor telegram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorFrame {
    pub temp_internal_c: f64,
    pub temp_external_c: f64,
    pub humidity_pct: f64,
    /// Raw reading; a faulty sensor may report a negative value
    pub co2_ppm: i64,
    /// `None` when the unit reports the "no reading" sentinel
    pub voc_ppb: Option<i64>,
}

/// Decoded `VMSL` network payload.
#[derive(Clone, PartialEq, Eq)]
pub struct NetworkInfo {
    pub ssid: String,
    pub password: Zeroizing<String>,
}

impl fmt::Debug for NetworkInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetworkInfo")
            .field("ssid", &self.ssid)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Splits `<tag>,<f1>,<f2>,...` into `[tag, f1, f2, ...]`.
fn tagged_fields<'a>(expected: &'static str, input: &'a str) -> IResult<&'a str, Vec<&'a str>> {
    let field = take_till(|c| c == ',');
    let (rest, (head, mut tail)) =
        all_consuming(pair(tag(expected), many0(preceded(char(','), field))))(input)?;
    tail.insert(0, head);
    Ok((rest, tail))
}

/// Validates the tag and minimum field count of a telegram.
fn split_telegram<'a>(expected: &'static str, raw: &'a str) -> Result<Vec<&'a str>, VmcError> {
    let line = raw.trim();
    if !line.starts_with(expected) {
        let shown: String = line.chars().take(8).collect();
        return Err(VmcError::Protocol(format!(
            "expected {expected} telegram, got '{shown}'"
        )));
    }
    let (_, fields) = tagged_fields(expected, line)
        .map_err(|e| VmcError::Parse(format!("malformed {expected} telegram: {e}")))?;
    if fields.len() < MIN_FRAME_FIELDS {
        return Err(VmcError::Parse(format!(
            "{expected} telegram has {} fields, need at least {MIN_FRAME_FIELDS}",
            fields.len()
        )));
    }
    Ok(fields)
}

fn int_field(fields: &[&str], idx: usize, what: &str) -> Result<i64, VmcError> {
    let raw = fields
        .get(idx)
        .ok_or_else(|| VmcError::Parse(format!("{what}: field {idx} missing")))?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| VmcError::Parse(format!("{what}: field {idx} is not numeric ('{raw}')")))
}

fn tenths(value: i64) -> f64 {
    value as f64 / 10.0
}

impl StatusFrame {
    /// Decodes a `VMGO` telegram.
    pub fn decode(raw: &str) -> Result<Self, VmcError> {
        let fields = split_telegram(TAG_STATUS, raw)?;

        let fan = int_field(&fields, STATUS_IDX_FAN_SPEED, "fan speed")?;
        let fan_speed = u8::try_from(fan)
            .map(FanSpeed)
            .map_err(|_| VmcError::Parse(format!("fan speed out of range: {fan}")))?;
        let lights_level = int_field(&fields, STATUS_IDX_LIGHTS_LEVEL, "lights level")?;
        // Older firmware stops at 15 fields and carries no timer.
        let lights_timer = if fields.len() > STATUS_IDX_LIGHTS_TIMER {
            int_field(&fields, STATUS_IDX_LIGHTS_TIMER, "lights timer")?
        } else {
            0
        };

        Ok(StatusFrame {
            fan_speed,
            panel_led_on: fields[STATUS_IDX_PANEL_LED].trim() == PANEL_LED_ON,
            sensors_enabled: fields[STATUS_IDX_SENSORS].trim() == SENSORS_ENABLED,
            lights_level_pct: lights_level.clamp(0, 100) as u8,
            lights_timer_sec: u32::try_from(lights_timer.max(0)).unwrap_or(u32::MAX),
        })
    }
}

impl SensorFrame {
    /// Decodes a `VMGI` telegram.
    pub fn decode(raw: &str) -> Result<Self, VmcError> {
        let fields = split_telegram(TAG_SENSORS, raw)?;

        let temp_internal = int_field(&fields, SENSORS_IDX_TEMP_INTERNAL, "internal temperature")?;
        let temp_external = int_field(&fields, SENSORS_IDX_TEMP_EXTERNAL, "external temperature")?;
        let humidity = int_field(&fields, SENSORS_IDX_HUMIDITY, "humidity")?;
        let co2_ppm = int_field(&fields, SENSORS_IDX_CO2, "CO2")?;
        let voc = int_field(&fields, SENSORS_IDX_VOC, "VOC")?;
        let voc_ppb = (voc != VOC_NO_READING).then_some(voc);

        Ok(SensorFrame {
            temp_internal_c: tenths(temp_internal),
            temp_external_c: tenths(temp_external),
            humidity_pct: tenths(humidity),
            co2_ppm,
            voc_ppb,
        })
    }
}

impl NetworkInfo {
    /// Decodes the fixed-width `VMSL` payload. A leading `VMSL` tag is tolerated.
    pub fn decode(raw: &str) -> Result<Self, VmcError> {
        let mut payload = raw.trim();
        if let Some(rest) = payload.strip_prefix(TAG_NETWORK) {
            payload = rest.strip_prefix([',', ' ']).unwrap_or(rest);
        }
        if payload.starts_with(ERROR_PREFIX) {
            return Err(VmcError::Protocol(payload.to_string()));
        }

        let chars: Vec<char> = payload.chars().collect();
        // SSID and password slots are both fixed width; a short reply means a cut-off password.
        if chars.len() < 2 * NETWORK_FIELD_LEN {
            return Err(VmcError::Parse(format!(
                "network payload has {} characters, need {}",
                chars.len(),
                2 * NETWORK_FIELD_LEN
            )));
        }
        let slot = |range: std::ops::Range<usize>| -> String {
            chars[range]
                .iter()
                .collect::<String>()
                .trim_end_matches(NETWORK_PAD)
                .to_string()
        };

        Ok(NetworkInfo {
            ssid: slot(0..NETWORK_FIELD_LEN),
            password: Zeroizing::new(slot(NETWORK_FIELD_LEN..2 * NETWORK_FIELD_LEN)),
        })
    }
}

/// Extracts the device name from `VMNM,<name>` or `VMNM <name>`.
pub fn decode_name(raw: &str) -> Result<String, VmcError> {
    let line = raw.trim();
    let rest = line.strip_prefix(TAG_NAME).ok_or_else(|| {
        VmcError::Protocol(format!("expected {TAG_NAME} telegram, got '{line}'"))
    })?;
    let name = match rest.chars().next() {
        Some(',') => rest[1..].split(',').next().unwrap_or(""),
        Some(' ') => &rest[1..],
        _ => "",
    }
    .trim();
    if name.is_empty() {
        return Err(VmcError::Parse(format!("no name in '{line}'")));
    }
    Ok(name.to_string())
}

/// Decodes a status telegram, `None` when malformed.
pub fn parse_status(raw: &str) -> Option<StatusFrame> {
    StatusFrame::decode(raw).ok()
}

/// Decodes a sensor telegram, `None` when malformed.
pub fn parse_sensors(raw: &str) -> Option<SensorFrame> {
    SensorFrame::decode(raw).ok()
}

/// Decodes a name telegram, `None` when malformed.
pub fn parse_name(raw: &str) -> Option<String> {
    decode_name(raw).ok()
}

/// Decodes a network payload, `None` when malformed.
pub fn parse_network(raw: &str) -> Option<NetworkInfo> {
    NetworkInfo::decode(raw).ok()
}
