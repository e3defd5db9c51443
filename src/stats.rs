//! # Per-Device Poll Statistics
//!
//! Counters kept by each polling coordinator for its own device. They are
//! owned by the coordinator, never registered globally, and published with the
//! coordinator's handle for diagnostics.

use crate::error::{ErrorKind, VmcError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Poll statistics for one device
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PollStats {
    /// Cycles that produced a snapshot
    pub cycles_ok: u64,
    /// Cycles aborted by a failed status fetch
    pub cycles_aborted: u64,
    /// Failed sensor/name/network fetches (never abort a cycle)
    pub optional_failures: u64,
    /// Status fetch failures by error kind
    pub failures_by_kind: HashMap<ErrorKind, u64>,
    pub last_error: Option<String>,
    pub last_success: Option<DateTime<Utc>>,
}

impl PollStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, at: DateTime<Utc>) {
        self.cycles_ok += 1;
        self.last_success = Some(at);
    }

    pub fn record_abort(&mut self, error: &VmcError) {
        self.cycles_aborted += 1;
        *self.failures_by_kind.entry(error.kind()).or_insert(0) += 1;
        self.last_error = Some(error.to_string());
    }

    pub fn record_optional_failure(&mut self, error: &VmcError) {
        self.optional_failures += 1;
        self.last_error = Some(error.to_string());
    }

    pub fn failures(&self, kind: ErrorKind) -> u64 {
        self.failures_by_kind.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_cycles(&self) -> u64 {
        self.cycles_ok + self.cycles_aborted
    }

    /// Fraction of cycles that succeeded, 0.0 before the first cycle.
    pub fn success_rate(&self) -> f64 {
        let total = self.total_cycles();
        if total == 0 {
            0.0
        } else {
            self.cycles_ok as f64 / total as f64
        }
    }

    pub fn to_json(&self) -> Result<String, VmcError> {
        Ok(serde_json::to_string(self)?)
    }
}
