//! VMC Protocol Constants
//!
//! This module defines the constants used by the ventilation unit protocol
//! implementation: telegram tags, command strings, network defaults, polling
//! cadences and the fixed fan-speed lookup tables.

use std::time::Duration;

// ----------------------------------------------------------------------------
// Wire framing
// ----------------------------------------------------------------------------

/// Frame terminator appended to every outgoing command
pub const FRAME_TERMINATOR: &str = "\r\n";

/// Default TCP port of the unit's command server
pub const DEFAULT_PORT: u16 = 5001;

/// Default per-exchange timeout (applied to connect and read independently)
pub const DEFAULT_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(3);

/// Upper bound on the number of bytes read for one response
pub const MAX_RESPONSE_BYTES: usize = 1024;

/// Prefix of a device-side error reply
pub const ERROR_PREFIX: &str = "ERROR";

/// Prefix of a device-side acknowledgement
pub const OK_PREFIX: &str = "OK";

// ----------------------------------------------------------------------------
// Telegram tags and read commands
// ----------------------------------------------------------------------------

/// Tag of the status telegram
pub const TAG_STATUS: &str = "VMGO";

/// Tag of the sensor telegram
pub const TAG_SENSORS: &str = "VMGI";

/// Tag of the name telegram
pub const TAG_NAME: &str = "VMNM";

/// Tag of the network telegram
pub const TAG_NETWORK: &str = "VMSL";

/// Status query
pub const CMD_STATUS: &str = "VMGH?";

/// Sensor query
pub const CMD_SENSORS: &str = "VMGI?";

/// Device name query
pub const CMD_NAME: &str = "VMNM?";

/// Network (Wi-Fi) query
pub const CMD_NETWORK: &str = "VMSL?";

/// Register write prefix
pub const CMD_WRITE_PREFIX: &str = "VMWH";

/// Minimum comma-separated field count for status and sensor telegrams
pub const MIN_FRAME_FIELDS: usize = 15;

// Status telegram positions
pub const STATUS_IDX_FAN_SPEED: usize = 1;
pub const STATUS_IDX_PANEL_LED: usize = 2;
pub const STATUS_IDX_SENSORS: usize = 4;
pub const STATUS_IDX_LIGHTS_LEVEL: usize = 11;
pub const STATUS_IDX_LIGHTS_TIMER: usize = 15;

/// Raw status value for "panel LED on"
pub const PANEL_LED_ON: &str = "00010";

/// Raw status value for "sensors enabled"
pub const SENSORS_ENABLED: &str = "00000";

// Sensor telegram positions
pub const SENSORS_IDX_TEMP_INTERNAL: usize = 1;
pub const SENSORS_IDX_TEMP_EXTERNAL: usize = 2;
pub const SENSORS_IDX_HUMIDITY: usize = 3;
pub const SENSORS_IDX_CO2: usize = 4;
pub const SENSORS_IDX_VOC: usize = 11;

/// Raw VOC value meaning "no reading"
pub const VOC_NO_READING: i64 = 0;

// ----------------------------------------------------------------------------
// Write registers (VMWH<rr><vvvvv>)
// ----------------------------------------------------------------------------

pub const REG_FAN_SPEED: u8 = 0;
pub const REG_PANEL_LED: u8 = 1;
pub const REG_SENSORS: u8 = 3;
pub const REG_LIGHTS_LEVEL: u8 = 4;
pub const REG_LIGHTS_TIMER: u8 = 5;

/// Register value switching the sensors off
pub const SENSORS_DISABLED_VALUE: u32 = 2;

/// Largest value that fits the 5-digit register field
pub const MAX_REGISTER_VALUE: u32 = 99_999;

// ----------------------------------------------------------------------------
// Network payload (VMSL)
// ----------------------------------------------------------------------------

/// Width of each of the SSID and password slots
pub const NETWORK_FIELD_LEN: usize = 32;

/// Padding character of the network payload
pub const NETWORK_PAD: char = '*';

/// Maximum length of a device name
pub const MAX_NAME_LEN: usize = 32;

// ----------------------------------------------------------------------------
// Fan speed codes
// ----------------------------------------------------------------------------

pub const FAN_SPEED_OFF: u8 = 0;
pub const FAN_SPEED_MAX_MANUAL: u8 = 4;
pub const FAN_SPEED_NIGHT: u8 = 5;
pub const FAN_SPEED_HYPERVENTILATION: u8 = 6;
pub const FAN_SPEED_FREE_COOLING: u8 = 7;

/// Airflow in m³/h indexed by fan speed code
pub const AIRFLOW_M3H: [f64; 8] = [0.0, 10.0, 17.0, 26.0, 37.0, 7.0, 42.0, 26.0];

/// Fan percentage indexed by fan speed code
pub const FAN_PERCENTAGE: [u8; 8] = [0, 25, 50, 75, 100, 25, 100, 0];

/// Airflow reported for codes outside the table
pub const AIRFLOW_FALLBACK_M3H: f64 = 10.0;

/// Percentage reported for codes outside the table
pub const FAN_PERCENTAGE_FALLBACK: u8 = 25;

// ----------------------------------------------------------------------------
// Polling cadence
// ----------------------------------------------------------------------------

/// Refresh interval while the device answers
pub const DEFAULT_NORMAL_INTERVAL: Duration = Duration::from_secs(180);

/// Refresh interval once the error threshold is reached
pub const DEFAULT_RECOVERY_INTERVAL: Duration = Duration::from_secs(30);

/// Consecutive failures that switch the coordinator into recovery
pub const DEFAULT_ERROR_THRESHOLD: u32 = 5;

/// Minimum age of the cached name before it is fetched again
pub const DEFAULT_NAME_REFRESH: Duration = Duration::from_secs(900);

/// Minimum age of the cached network info before it is fetched again
pub const DEFAULT_NETWORK_REFRESH: Duration = Duration::from_secs(900);

// ----------------------------------------------------------------------------
// Room volume sanity range (m³)
// ----------------------------------------------------------------------------

pub const MIN_ROOM_VOLUME_M3: f64 = 1.0;
pub const MAX_ROOM_VOLUME_M3: f64 = 1000.0;
