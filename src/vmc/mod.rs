//! The vmc module contains the components responsible for the core device protocol
//! implementation: the TCP request/response client, telegram decoding and the
//! write-command encoders.

pub mod client;
pub mod commands;
pub mod frame;
pub mod mock;

pub use client::{ClientConfig, ProtocolClient, Transport};
pub use commands::VmcDevice;
pub use frame::{
    parse_name, parse_network, parse_sensors, parse_status, FanMode, FanSpeed, NetworkInfo,
    SensorFrame, StatusFrame,
};
pub use mock::MockTransport;
