//! # VMC Error Handling
//!
//! This module defines the VmcError enum, which represents the different error
//! types that can occur in the vmc-rs crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Represents the different error types that can occur in the VMC crate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VmcError {
    /// The device could not be reached (refused, unreachable, DNS failure).
    #[error("Connection to {addr} failed: {reason}")]
    Connection { addr: String, reason: String },

    /// A connect, write or read deadline was exceeded.
    #[error("Timed out during {stage} with {addr} after {after:?}")]
    Timeout {
        addr: String,
        stage: &'static str,
        after: Duration,
    },

    /// The device answered with `ERROR...` or with an unexpected telegram.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A telegram was too short or a fixed-position field was not numeric.
    #[error("Error parsing telegram: {0}")]
    Parse(String),

    /// A write command argument was rejected before anything was sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A device list or configuration value could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Fieldless classification of [`VmcError`], used for statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Connection,
    Timeout,
    Protocol,
    Parse,
    InvalidArgument,
    Config,
}

impl VmcError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VmcError::Connection { .. } => ErrorKind::Connection,
            VmcError::Timeout { .. } => ErrorKind::Timeout,
            VmcError::Protocol(_) => ErrorKind::Protocol,
            VmcError::Parse(_) => ErrorKind::Parse,
            VmcError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            VmcError::Config(_) => ErrorKind::Config,
        }
    }

    /// True for failures of the exchange itself (as opposed to bad input on our side).
    pub fn is_communication(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Connection | ErrorKind::Timeout | ErrorKind::Protocol | ErrorKind::Parse
        )
    }
}

impl From<serde_json::Error> for VmcError {
    fn from(err: serde_json::Error) -> Self {
        VmcError::Config(err.to_string())
    }
}
