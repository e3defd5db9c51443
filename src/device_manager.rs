//! # VMC Device Manager
//!
//! This module provides the DeviceManager struct, the entry point for polling a
//! fleet of ventilation units.
//!
//! Every device gets its own [`PollingCoordinator`] running as an independent
//! tokio task. Coordinators share nothing but a clone of the transport; each
//! one's polling state stays inside its task.

use crate::config::{DeviceRecord, PollConfig};
use crate::coordinator::{
    CoordinatorHandle, CoordinatorReceivers, PollingCoordinator, RenameSink, Snapshot,
};
use crate::error::VmcError;
use crate::stats::PollStats;
use crate::vmc::client::{ProtocolClient, Transport};
use log::info;
use std::collections::HashMap;
use std::sync::Arc;

/// Manages one polling task per configured device.
pub struct DeviceManager<T: Transport + Clone + 'static = ProtocolClient> {
    transport: T,
    config: PollConfig,
    rename_sink: Option<Arc<dyn RenameSink>>,
    /// Handles keyed by `ip:port`.
    handles: HashMap<String, CoordinatorHandle>,
}

impl DeviceManager<ProtocolClient> {
    /// Creates a manager using the TCP client.
    pub fn new(config: PollConfig) -> Result<Self, VmcError> {
        DeviceManager::with_transport(ProtocolClient::default(), config)
    }
}

impl<T: Transport + Clone + 'static> DeviceManager<T> {
    pub fn with_transport(transport: T, config: PollConfig) -> Result<Self, VmcError> {
        config.validate()?;
        Ok(DeviceManager {
            transport,
            config,
            rename_sink: None,
            handles: HashMap::new(),
        })
    }

    /// Sink notified when any managed device reports a new name.
    pub fn with_rename_sink(mut self, sink: Arc<dyn RenameSink>) -> Self {
        self.rename_sink = Some(sink);
        self
    }

    /// Starts polling a device. Must be called from within a tokio runtime.
    pub fn add_device(&mut self, record: DeviceRecord) -> Result<(), VmcError> {
        record.validate()?;
        let address = record.address();
        if self.handles.contains_key(&address) {
            return Err(VmcError::Config(format!("device {address} is already managed")));
        }

        let mut coordinator =
            PollingCoordinator::new(self.transport.clone(), record, self.config.clone())?;
        if let Some(sink) = &self.rename_sink {
            coordinator = coordinator.with_rename_sink(Arc::clone(sink));
        }
        info!("Managing device {address}");
        self.handles.insert(address, coordinator.spawn());
        Ok(())
    }

    /// Stops polling a device and waits for its task to finish.
    pub async fn remove_device(&mut self, address: &str) -> Result<(), VmcError> {
        let handle = self
            .handles
            .remove(address)
            .ok_or_else(|| VmcError::Config(format!("device {address} is not managed")))?;
        handle.stop().await;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Addresses of all managed devices, sorted.
    pub fn addresses(&self) -> Vec<String> {
        let mut addresses: Vec<String> = self.handles.keys().cloned().collect();
        addresses.sort();
        addresses
    }

    /// Current records, including names updated by device-side renames.
    pub fn devices(&self) -> Vec<DeviceRecord> {
        self.addresses()
            .iter()
            .filter_map(|a| self.handles.get(a).map(CoordinatorHandle::device))
            .collect()
    }

    pub fn snapshot(&self, address: &str) -> Option<Snapshot> {
        self.handles.get(address).and_then(CoordinatorHandle::snapshot)
    }

    pub fn is_available(&self, address: &str) -> bool {
        self.handles
            .get(address)
            .map(CoordinatorHandle::is_available)
            .unwrap_or(false)
    }

    pub fn stats(&self, address: &str) -> Option<PollStats> {
        self.handles.get(address).map(CoordinatorHandle::stats)
    }

    pub fn subscribe(&self, address: &str) -> Option<CoordinatorReceivers> {
        self.handles.get(address).map(CoordinatorHandle::subscribe)
    }

    /// Last snapshot of every device, keyed by address.
    pub fn snapshots(&self) -> HashMap<String, Option<Snapshot>> {
        self.handles
            .iter()
            .map(|(address, handle)| (address.clone(), handle.snapshot()))
            .collect()
    }

    /// Stops every polling task.
    ///
    /// All tasks are signalled before any is awaited, so a slow in-flight cycle
    /// on one device does not let the others start new cycles.
    pub async fn shutdown_all(&mut self) {
        let handles: Vec<CoordinatorHandle> = self.handles.drain().map(|(_, h)| h).collect();
        for handle in &handles {
            handle.request_stop();
        }
        info!("Stopping {} polling task(s)", handles.len());
        for handle in handles {
            handle.stop().await;
        }
    }
}
