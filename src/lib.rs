//! # vmc-rs - A Rust Crate for Networked Ventilation Units
//!
//! The vmc-rs crate polls controlled mechanical ventilation (VMC) units over
//! their line-based ASCII/TCP protocol, turns their telemetry into typed records
//! and derives psychrometric comfort and efficiency figures from them.
//!
//! ## Features
//!
//! - One-shot command exchange over TCP with timeout and error classification
//! - Decoding of the status (`VMGO`), sensor (`VMGI`), name and network telegrams
//! - Write commands: fan speed, panel LED, sensors, lights, rename, Wi-Fi
//! - Per-device polling coordinator with normal/recovery cadences, slow-field
//!   refresh gates and stale-data-over-no-data snapshots
//! - Fleet manager running one independent polling task per device
//! - Dew point, absolute humidity, comfort index and air exchange metrics
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! vmc-rs = "0.3"
//! ```
//!
//! ```rust,no_run
//! use vmc_rs::{DeviceManager, DeviceRecord, PollConfig};
//!
//! # async fn run() -> Result<(), vmc_rs::VmcError> {
//! let mut manager = DeviceManager::new(PollConfig::default())?;
//! manager.add_device(DeviceRecord::new("192.168.1.40", "Living room", 60.0))?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod coordinator;
pub mod device_manager;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod stats;
pub mod util;
pub mod vmc;

pub use crate::error::{ErrorKind, VmcError};
pub use crate::logging::{init_logger, try_init_logger};

pub use config::{load_devices, DeviceRecord, PollConfig};
pub use coordinator::{
    CoordinatorHandle, CycleOutcome, PollMode, PollState, PollingCoordinator, RenameSink,
    Snapshot,
};
pub use device_manager::DeviceManager;
pub use metrics::DerivedMetrics;
pub use stats::PollStats;
pub use vmc::{
    ClientConfig, FanMode, FanSpeed, MockTransport, NetworkInfo, ProtocolClient, SensorFrame,
    StatusFrame, Transport, VmcDevice,
};

/// Sends one command to a device with the default client and returns the trimmed reply.
///
/// # Arguments
/// * `host` - Device IP address or host name
/// * `port` - Command port (usually [`constants::DEFAULT_PORT`])
/// * `command` - Command with or without terminator, e.g. `"VMGH?"`
pub async fn send_command(host: &str, port: u16, command: &str) -> Result<String, VmcError> {
    ProtocolClient::default().send_default(host, port, command).await
}

/// Reads and decodes the status telegram of a device.
pub async fn read_status(host: &str, port: u16) -> Result<StatusFrame, VmcError> {
    VmcDevice::connect(host, port).read_status().await
}

/// Reads and decodes the sensor telegram of a device.
pub async fn read_sensors(host: &str, port: u16) -> Result<SensorFrame, VmcError> {
    VmcDevice::connect(host, port).read_sensors().await
}
