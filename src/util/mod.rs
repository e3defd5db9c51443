//! # Utility Modules
//!
//! Common helpers used throughout the vmc-rs crate.

pub mod logging;

pub use logging::LogThrottle;
