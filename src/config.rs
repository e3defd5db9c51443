//! # Device and Polling Configuration
//!
//! Device records are supplied by the host; this module only validates them and
//! can read a JSON device list. Nothing here is ever written back.

use crate::constants::*;
use crate::error::VmcError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// One configured ventilation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub ip: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(alias = "name")]
    pub display_name: String,
    #[serde(alias = "room_volume")]
    pub room_volume_m3: f64,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl DeviceRecord {
    pub fn new(ip: impl Into<String>, display_name: impl Into<String>, room_volume_m3: f64) -> Self {
        DeviceRecord {
            ip: ip.into(),
            port: DEFAULT_PORT,
            display_name: display_name.into(),
            room_volume_m3,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// `ip:port`, also used as the device key in logs and the fleet manager.
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }

    pub fn validate(&self) -> Result<(), VmcError> {
        if self.ip.trim().is_empty() {
            return Err(VmcError::Config("device ip is empty".into()));
        }
        if self.port == 0 {
            return Err(VmcError::Config(format!("{}: port 0 is not valid", self.ip)));
        }
        if !(MIN_ROOM_VOLUME_M3..=MAX_ROOM_VOLUME_M3).contains(&self.room_volume_m3) {
            return Err(VmcError::Config(format!(
                "{}: room volume {} m³ outside {MIN_ROOM_VOLUME_M3}..={MAX_ROOM_VOLUME_M3}",
                self.ip, self.room_volume_m3
            )));
        }
        Ok(())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

/// Cadences and thresholds of one polling coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    #[serde(with = "duration_secs")]
    pub normal_interval: Duration,
    #[serde(with = "duration_secs")]
    pub recovery_interval: Duration,
    pub error_threshold: u32,
    #[serde(with = "duration_secs")]
    pub name_refresh: Duration,
    #[serde(with = "duration_secs")]
    pub network_refresh: Duration,
    #[serde(with = "duration_secs")]
    pub exchange_timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        PollConfig {
            normal_interval: DEFAULT_NORMAL_INTERVAL,
            recovery_interval: DEFAULT_RECOVERY_INTERVAL,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
            name_refresh: DEFAULT_NAME_REFRESH,
            network_refresh: DEFAULT_NETWORK_REFRESH,
            exchange_timeout: DEFAULT_EXCHANGE_TIMEOUT,
        }
    }
}

impl PollConfig {
    pub fn validate(&self) -> Result<(), VmcError> {
        if self.normal_interval.is_zero() || self.recovery_interval.is_zero() {
            return Err(VmcError::Config("polling intervals must be non-zero".into()));
        }
        if self.error_threshold == 0 {
            return Err(VmcError::Config("error threshold must be at least 1".into()));
        }
        if self.exchange_timeout.is_zero() {
            return Err(VmcError::Config("exchange timeout must be non-zero".into()));
        }
        Ok(())
    }
}

/// Parses a JSON array of device records and validates each one.
pub fn parse_devices(json: &str) -> Result<Vec<DeviceRecord>, VmcError> {
    let devices: Vec<DeviceRecord> = serde_json::from_str(json)?;
    for device in &devices {
        device.validate()?;
    }
    Ok(devices)
}

/// Reads a JSON device list from disk.
pub fn load_devices(path: impl AsRef<Path>) -> Result<Vec<DeviceRecord>, VmcError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| VmcError::Config(format!("cannot read {}: {e}", path.display())))?;
    parse_devices(&text)
}
