//! Mock transport implementation for testing
//!
//! This module provides a scriptable in-memory transport that can be used to
//! exercise the polling coordinator and the command layer without a device.
//! Responses are queued per command; a command with an empty queue falls back
//! to its sticky default, and to a connection error when it has none.

use crate::vmc::client::Transport;
use crate::error::VmcError;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Default)]
struct MockState {
    queued: HashMap<String, VecDeque<Result<String, VmcError>>>,
    defaults: HashMap<String, Result<String, VmcError>>,
    sent: Vec<String>,
}

/// In-memory transport answering from scripted responses.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

fn key(command: &str) -> String {
    command.trim_end_matches(['\r', '\n']).to_string()
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the recorded calls from others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a one-shot response for `command`.
    pub fn queue(&self, command: &str, response: Result<String, VmcError>) {
        self.lock()
            .queued
            .entry(key(command))
            .or_default()
            .push_back(response);
    }

    /// Queue a one-shot successful response.
    pub fn queue_ok(&self, command: &str, response: &str) {
        self.queue(command, Ok(response.to_string()));
    }

    /// Set the response returned whenever nothing is queued for `command`.
    pub fn set_default(&self, command: &str, response: Result<String, VmcError>) {
        self.lock().defaults.insert(key(command), response);
    }

    /// Set a sticky successful response.
    pub fn set_default_ok(&self, command: &str, response: &str) {
        self.set_default(command, Ok(response.to_string()));
    }

    /// Make every command without a queued response fail to connect.
    pub fn go_offline(&self) {
        self.lock().defaults.clear();
    }

    /// Commands sent so far, without terminator.
    pub fn sent(&self) -> Vec<String> {
        self.lock().sent.clone()
    }

    /// Number of times `command` was sent.
    pub fn count(&self, command: &str) -> usize {
        let wanted = key(command);
        self.lock().sent.iter().filter(|c| **c == wanted).count()
    }

    pub fn clear_sent(&self) {
        self.lock().sent.clear();
    }
}

/// Error the mock returns for a device that does not answer.
pub fn offline_error(host: &str, port: u16) -> VmcError {
    VmcError::Connection {
        addr: format!("{host}:{port}"),
        reason: "connection refused".to_string(),
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        host: &str,
        port: u16,
        command: &str,
        _timeout: Duration,
    ) -> Result<String, VmcError> {
        let command = key(command);
        let mut state = self.lock();
        state.sent.push(command.clone());
        if let Some(response) = state.queued.get_mut(&command).and_then(|q| q.pop_front()) {
            return response;
        }
        state
            .defaults
            .get(&command)
            .cloned()
            .unwrap_or_else(|| Err(offline_error(host, port)))
    }
}
