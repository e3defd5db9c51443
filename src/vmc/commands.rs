//! # VMC Commands
//!
//! Encoders for the write commands understood by the unit and [`VmcDevice`], a
//! small handle bundling a transport with a device address for one-off reads
//! and writes.
//!
//! Register writes use an 11-character `VMWH<rr><vvvvv>` layout: a 2-digit
//! register number followed by a 5-digit zero-padded value.

use crate::constants::*;
use crate::error::VmcError;
use crate::vmc::client::{ProtocolClient, Transport};
use crate::vmc::frame::{decode_name, FanSpeed, NetworkInfo, SensorFrame, StatusFrame};
use std::time::Duration;
use zeroize::Zeroizing;

/// Encodes a register write.
pub fn encode_register(register: u8, value: u32) -> Result<String, VmcError> {
    if register > 99 {
        return Err(VmcError::InvalidArgument(format!("register {register} out of range")));
    }
    if value > MAX_REGISTER_VALUE {
        return Err(VmcError::InvalidArgument(format!(
            "value {value} does not fit a register (max {MAX_REGISTER_VALUE})"
        )));
    }
    Ok(format!("{CMD_WRITE_PREFIX}{register:02}{value:05}"))
}

pub fn encode_fan_speed(speed: FanSpeed) -> Result<String, VmcError> {
    if speed.code() > FAN_SPEED_FREE_COOLING {
        return Err(VmcError::InvalidArgument(format!(
            "fan speed code {} is not writable (0..={FAN_SPEED_FREE_COOLING})",
            speed.code()
        )));
    }
    encode_register(REG_FAN_SPEED, u32::from(speed.code()))
}

pub fn encode_panel_led(on: bool) -> Result<String, VmcError> {
    // Same five-digit encoding the status telegram reports back.
    let value = if on { 10 } else { 0 };
    encode_register(REG_PANEL_LED, value)
}

pub fn encode_sensors_enabled(enabled: bool) -> Result<String, VmcError> {
    let value = if enabled { 0 } else { SENSORS_DISABLED_VALUE };
    encode_register(REG_SENSORS, value)
}

pub fn encode_lights_level(level_pct: u8) -> Result<String, VmcError> {
    if level_pct > 100 {
        return Err(VmcError::InvalidArgument(format!("lights level {level_pct}% above 100%")));
    }
    encode_register(REG_LIGHTS_LEVEL, u32::from(level_pct))
}

pub fn encode_lights_timer(seconds: u32) -> Result<String, VmcError> {
    encode_register(REG_LIGHTS_TIMER, seconds)
}

/// Encodes `VMNM <name>`.
pub fn encode_rename(name: &str) -> Result<String, VmcError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(VmcError::InvalidArgument("device name is empty".into()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(VmcError::InvalidArgument(format!(
            "device name longer than {MAX_NAME_LEN} characters"
        )));
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(VmcError::InvalidArgument("device name contains control characters".into()));
    }
    Ok(format!("{TAG_NAME} {name}"))
}

fn pad_network_field(value: &str, what: &str) -> Result<String, VmcError> {
    let len = value.chars().count();
    if len > NETWORK_FIELD_LEN {
        return Err(VmcError::InvalidArgument(format!(
            "{what} longer than {NETWORK_FIELD_LEN} characters"
        )));
    }
    if value.contains(NETWORK_PAD) || value.chars().any(|c| c.is_control()) {
        return Err(VmcError::InvalidArgument(format!(
            "{what} must not contain '{NETWORK_PAD}' or control characters"
        )));
    }
    let mut padded = String::with_capacity(NETWORK_FIELD_LEN);
    padded.push_str(value);
    padded.extend(std::iter::repeat(NETWORK_PAD).take(NETWORK_FIELD_LEN - len));
    Ok(padded)
}

/// Encodes `VMSL <ssid*><password*>`. The result holds the password and is zeroized on drop.
pub fn encode_wifi(ssid: &str, password: &str) -> Result<Zeroizing<String>, VmcError> {
    if ssid.is_empty() {
        return Err(VmcError::InvalidArgument("SSID is empty".into()));
    }
    let ssid = pad_network_field(ssid, "SSID")?;
    let password = Zeroizing::new(pad_network_field(password, "password")?);
    Ok(Zeroizing::new(format!("{TAG_NETWORK} {ssid}{}", password.as_str())))
}

/// Accepts `OK...` replies to write commands.
pub fn expect_ok(reply: &str) -> Result<(), VmcError> {
    let reply = reply.trim();
    if reply.starts_with(OK_PREFIX) {
        Ok(())
    } else if reply.starts_with(ERROR_PREFIX) {
        Err(VmcError::Protocol(format!("device replied '{reply}'")))
    } else {
        Err(VmcError::Protocol(format!("unexpected reply '{reply}'")))
    }
}

/// Handle to one ventilation unit over a given transport.
#[derive(Debug, Clone)]
pub struct VmcDevice<T: Transport = ProtocolClient> {
    transport: T,
    host: String,
    port: u16,
    timeout: Duration,
}

impl VmcDevice<ProtocolClient> {
    /// Handle using the TCP client with default settings.
    pub fn connect(host: &str, port: u16) -> Self {
        VmcDevice::with_transport(ProtocolClient::default(), host, port)
    }
}

impl<T: Transport> VmcDevice<T> {
    pub fn with_transport(transport: T, host: &str, port: u16) -> Self {
        VmcDevice {
            transport,
            host: host.to_string(),
            port,
            timeout: DEFAULT_EXCHANGE_TIMEOUT,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Sends an arbitrary command and returns the trimmed reply.
    pub async fn send_raw(&self, command: &str) -> Result<String, VmcError> {
        self.transport
            .send(&self.host, self.port, command, self.timeout)
            .await
    }

    pub async fn read_status(&self) -> Result<StatusFrame, VmcError> {
        StatusFrame::decode(&self.send_raw(CMD_STATUS).await?)
    }

    pub async fn read_sensors(&self) -> Result<SensorFrame, VmcError> {
        SensorFrame::decode(&self.send_raw(CMD_SENSORS).await?)
    }

    pub async fn read_name(&self) -> Result<String, VmcError> {
        decode_name(&self.send_raw(CMD_NAME).await?)
    }

    pub async fn read_network(&self) -> Result<NetworkInfo, VmcError> {
        NetworkInfo::decode(&self.send_raw(CMD_NETWORK).await?)
    }

    async fn write(&self, command: &str) -> Result<(), VmcError> {
        expect_ok(&self.send_raw(command).await?)
    }

    pub async fn set_fan_speed(&self, speed: FanSpeed) -> Result<(), VmcError> {
        self.write(&encode_fan_speed(speed)?).await
    }

    pub async fn set_panel_led(&self, on: bool) -> Result<(), VmcError> {
        self.write(&encode_panel_led(on)?).await
    }

    pub async fn set_sensors_enabled(&self, enabled: bool) -> Result<(), VmcError> {
        self.write(&encode_sensors_enabled(enabled)?).await
    }

    pub async fn set_lights_level(&self, level_pct: u8) -> Result<(), VmcError> {
        self.write(&encode_lights_level(level_pct)?).await
    }

    pub async fn set_lights_timer(&self, seconds: u32) -> Result<(), VmcError> {
        self.write(&encode_lights_timer(seconds)?).await
    }

    pub async fn rename(&self, name: &str) -> Result<(), VmcError> {
        self.write(&encode_rename(name)?).await
    }

    pub async fn set_wifi(&self, ssid: &str, password: &str) -> Result<(), VmcError> {
        let command = encode_wifi(ssid, password)?;
        self.write(command.as_str()).await
    }
}
