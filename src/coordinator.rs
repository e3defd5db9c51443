//! # Polling Coordinator
//!
//! One [`PollingCoordinator`] drives one ventilation unit. It owns the device's
//! [`PollState`] exclusively, runs strictly sequential poll cycles and publishes
//! the result of each successful cycle as a [`Snapshot`].
//!
//! ## Cycle
//! 1. `VMGH?` status fetch. Any failure aborts the cycle and counts towards the
//!    consecutive-error threshold.
//! 2. `VMGI?` sensor fetch, best effort.
//! 3. `VMNM?` / `VMSL?` fetches, each gated by its own refresh period; a failed
//!    fetch keeps the cached value and is retried on the next cycle.
//! 4. Error counter reset, leaving recovery mode if needed.
//! 5. Rename detection against the configured display name.
//! 6. Snapshot publication.
//!
//! ## Cadence
//! The coordinator sleeps for the normal interval between cycles, or for the
//! recovery interval once `error_threshold` consecutive cycles were aborted.
//! The first successful cycle switches back to the normal interval.

use crate::config::{DeviceRecord, PollConfig};
use crate::constants::{CMD_NAME, CMD_NETWORK, CMD_SENSORS, CMD_STATUS};
use crate::error::VmcError;
use crate::stats::PollStats;
use crate::util::logging::LogThrottle;
use crate::vmc::client::Transport;
use crate::vmc::frame::{decode_name, NetworkInfo, SensorFrame, StatusFrame};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Receives device-side rename notifications.
pub trait RenameSink: Send + Sync {
    fn device_renamed(&self, address: &str, old_name: &str, new_name: &str);
}

impl<F> RenameSink for F
where
    F: Fn(&str, &str, &str) + Send + Sync,
{
    fn device_renamed(&self, address: &str, old_name: &str, new_name: &str) {
        self(address, old_name, new_name)
    }
}

/// Refresh cadence currently applied by a coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PollMode {
    Normal,
    Recovery,
}

/// Mutable polling state of one device.
#[derive(Debug, Clone)]
pub struct PollState {
    consecutive_errors: u32,
    mode: PollMode,
    current_interval: Duration,
    last_name_fetch_at: Option<Instant>,
    last_network_fetch_at: Option<Instant>,
    cached_name: Option<String>,
    cached_network: Option<String>,
}

impl PollState {
    pub fn new(config: &PollConfig) -> Self {
        PollState {
            consecutive_errors: 0,
            mode: PollMode::Normal,
            current_interval: config.normal_interval,
            last_name_fetch_at: None,
            last_network_fetch_at: None,
            cached_name: None,
            cached_network: None,
        }
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    pub fn mode(&self) -> PollMode {
        self.mode
    }

    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    pub fn cached_name(&self) -> Option<&str> {
        self.cached_name.as_deref()
    }

    pub fn cached_network(&self) -> Option<&str> {
        self.cached_network.as_deref()
    }

    pub fn last_name_fetch_at(&self) -> Option<Instant> {
        self.last_name_fetch_at
    }

    pub fn last_network_fetch_at(&self) -> Option<Instant> {
        self.last_network_fetch_at
    }

    // The only place the interval is assigned.
    fn set_mode(&mut self, mode: PollMode, config: &PollConfig) {
        self.mode = mode;
        self.current_interval = match mode {
            PollMode::Normal => config.normal_interval,
            PollMode::Recovery => config.recovery_interval,
        };
    }

    /// Counts an aborted cycle. Returns true when this failure entered recovery.
    pub fn record_failure(&mut self, config: &PollConfig) -> bool {
        self.consecutive_errors = self.consecutive_errors.saturating_add(1);
        if self.consecutive_errors >= config.error_threshold && self.mode == PollMode::Normal {
            self.set_mode(PollMode::Recovery, config);
            return true;
        }
        false
    }

    /// Clears the failure streak. Returns true when this success left recovery.
    pub fn record_success(&mut self, config: &PollConfig) -> bool {
        self.consecutive_errors = 0;
        if self.mode == PollMode::Recovery {
            self.set_mode(PollMode::Normal, config);
            return true;
        }
        false
    }
}

fn refresh_due(last: Option<Instant>, every: Duration, now: Instant) -> bool {
    match last {
        None => true,
        Some(at) => now.saturating_duration_since(at) >= every,
    }
}

/// Data handed to the presentation layer after a successful cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub status: Option<StatusFrame>,
    pub sensors: Option<SensorFrame>,
    pub name: Option<String>,
    pub network: Option<String>,
    pub available: bool,
    pub fetched_at: DateTime<Utc>,
}

/// Result of one poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Success(Snapshot),
    Aborted(VmcError),
}

impl CycleOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CycleOutcome::Success(_))
    }
}

/// Receivers for everything a coordinator publishes.
#[derive(Debug, Clone)]
pub struct CoordinatorReceivers {
    pub snapshot: watch::Receiver<Option<Snapshot>>,
    pub available: watch::Receiver<bool>,
    pub stats: watch::Receiver<PollStats>,
    pub device: watch::Receiver<DeviceRecord>,
}

struct Publishers {
    snapshot: watch::Sender<Option<Snapshot>>,
    available: watch::Sender<bool>,
    stats: watch::Sender<PollStats>,
    device: watch::Sender<DeviceRecord>,
}

/// Polls one device on its own schedule.
pub struct PollingCoordinator<T: Transport> {
    transport: T,
    device: DeviceRecord,
    config: PollConfig,
    state: PollState,
    stats: PollStats,
    rename_sink: Option<Arc<dyn RenameSink>>,
    last_snapshot: Option<Snapshot>,
    available: bool,
    publishers: Publishers,
    failure_log: LogThrottle,
}

impl<T: Transport> PollingCoordinator<T> {
    /// Fails with [`VmcError::Config`] when `config` does not validate; a zero
    /// interval would otherwise poll without ever sleeping.
    pub fn new(transport: T, device: DeviceRecord, config: PollConfig) -> Result<Self, VmcError> {
        config.validate()?;
        let state = PollState::new(&config);
        let publishers = Publishers {
            snapshot: watch::channel(None).0,
            available: watch::channel(false).0,
            stats: watch::channel(PollStats::new()).0,
            device: watch::channel(device.clone()).0,
        };
        Ok(PollingCoordinator {
            transport,
            device,
            config,
            state,
            stats: PollStats::new(),
            rename_sink: None,
            last_snapshot: None,
            available: false,
            publishers,
            // Three warnings per 10 minutes while a device stays down.
            failure_log: LogThrottle::new(Duration::from_secs(600), 3),
        })
    }

    pub fn with_rename_sink(mut self, sink: Arc<dyn RenameSink>) -> Self {
        self.rename_sink = Some(sink);
        self
    }

    pub fn device(&self) -> &DeviceRecord {
        &self.device
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn stats(&self) -> &PollStats {
        &self.stats
    }

    /// Last successful snapshot; retained across aborted cycles.
    pub fn last_snapshot(&self) -> Option<&Snapshot> {
        self.last_snapshot.as_ref()
    }

    /// False until the first success and after every aborted cycle.
    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn current_interval(&self) -> Duration {
        self.state.current_interval()
    }

    pub fn subscribe(&self) -> CoordinatorReceivers {
        CoordinatorReceivers {
            snapshot: self.publishers.snapshot.subscribe(),
            available: self.publishers.available.subscribe(),
            stats: self.publishers.stats.subscribe(),
            device: self.publishers.device.subscribe(),
        }
    }

    async fn fetch(&self, command: &str) -> Result<String, VmcError> {
        self.transport
            .send(
                &self.device.ip,
                self.device.port,
                command,
                self.config.exchange_timeout,
            )
            .await
    }

    async fn fetch_status(&self) -> Result<StatusFrame, VmcError> {
        let raw = self.fetch(CMD_STATUS).await?;
        StatusFrame::decode(&raw)
    }

    async fn fetch_sensors(&self) -> Result<SensorFrame, VmcError> {
        let raw = self.fetch(CMD_SENSORS).await?;
        SensorFrame::decode(&raw)
    }

    async fn fetch_name(&self) -> Result<String, VmcError> {
        let raw = self.fetch(CMD_NAME).await?;
        decode_name(&raw)
    }

    async fn fetch_network(&self) -> Result<String, VmcError> {
        let raw = self.fetch(CMD_NETWORK).await?;
        NetworkInfo::decode(&raw).map(|info| info.ssid.clone())
    }

    fn optional_failure(&mut self, what: &str, err: &VmcError) {
        debug!("{}: {what} fetch failed: {err}", self.device.address());
        self.stats.record_optional_failure(err);
    }

    fn abort(&mut self, err: VmcError) -> CycleOutcome {
        let address = self.device.address();
        let entered_recovery = self.state.record_failure(&self.config);
        self.stats.record_abort(&err);
        self.available = false;

        if entered_recovery {
            warn!(
                "{address}: {} consecutive failures, polling every {:?} until it answers",
                self.state.consecutive_errors(),
                self.state.current_interval()
            );
        }
        crate::log_throttled!(
            self.failure_log,
            log::Level::Warn,
            "{address}: poll aborted ({} in a row): {err}",
            self.state.consecutive_errors()
        );

        self.publishers.available.send_replace(false);
        self.publishers.stats.send_replace(self.stats.clone());
        CycleOutcome::Aborted(err)
    }

    fn apply_device_name(&mut self, reported: &str) {
        if reported == self.device.display_name {
            return;
        }
        let old = std::mem::replace(&mut self.device.display_name, reported.to_string());
        let address = self.device.address();
        info!("{address}: device renamed from '{old}' to '{reported}'");
        self.publishers.device.send_replace(self.device.clone());
        if let Some(sink) = &self.rename_sink {
            sink.device_renamed(&address, &old, reported);
        }
    }

    /// Runs one poll cycle.
    pub async fn poll_cycle(&mut self) -> CycleOutcome {
        let now = Instant::now();

        let status = match self.fetch_status().await {
            Ok(status) => status,
            Err(err) => return self.abort(err),
        };

        let sensors = match self.fetch_sensors().await {
            Ok(sensors) => Some(sensors),
            Err(err) => {
                self.optional_failure("sensor", &err);
                None
            }
        };

        let mut fresh_name = None;
        if refresh_due(self.state.last_name_fetch_at, self.config.name_refresh, now) {
            match self.fetch_name().await {
                Ok(name) => {
                    self.state.cached_name = Some(name.clone());
                    self.state.last_name_fetch_at = Some(now);
                    fresh_name = Some(name);
                }
                Err(err) => self.optional_failure("name", &err),
            }
        }

        if refresh_due(self.state.last_network_fetch_at, self.config.network_refresh, now) {
            match self.fetch_network().await {
                Ok(ssid) => {
                    self.state.cached_network = Some(ssid);
                    self.state.last_network_fetch_at = Some(now);
                }
                Err(err) => self.optional_failure("network", &err),
            }
        }

        if self.state.record_success(&self.config) {
            info!(
                "{}: device answered again, back to {:?} polling",
                self.device.address(),
                self.state.current_interval()
            );
        }
        let dropped = self.failure_log.reset();
        if dropped > 0 {
            debug!("{}: {dropped} failure warnings were suppressed", self.device.address());
        }

        if let Some(name) = fresh_name {
            self.apply_device_name(&name);
        }

        let fetched_at = Utc::now();
        let snapshot = Snapshot {
            status: Some(status),
            sensors,
            name: self.state.cached_name.clone(),
            network: self.state.cached_network.clone(),
            available: true,
            fetched_at,
        };
        self.stats.record_success(fetched_at);
        self.available = true;
        self.last_snapshot = Some(snapshot.clone());

        self.publishers.snapshot.send_replace(Some(snapshot.clone()));
        self.publishers.available.send_replace(true);
        self.publishers.stats.send_replace(self.stats.clone());
        CycleOutcome::Success(snapshot)
    }

    /// Polls until `shutdown` turns true or its sender is dropped.
    ///
    /// Shutdown is only observed between cycles; a cycle in flight completes.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "{}: polling '{}' every {:?}",
            self.device.address(),
            self.device.display_name,
            self.state.current_interval()
        );
        loop {
            if *shutdown.borrow() {
                break;
            }
            self.poll_cycle().await;

            let sleep = tokio::time::sleep(self.state.current_interval());
            tokio::pin!(sleep);
            loop {
                tokio::select! {
                    _ = &mut sleep => break,
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            debug!("{}: polling stopped", self.device.address());
                            return;
                        }
                    }
                }
            }
        }
        debug!("{}: polling stopped", self.device.address());
    }
}

impl<T: Transport + 'static> PollingCoordinator<T> {
    /// Spawns the polling loop as its own task.
    pub fn spawn(self) -> CoordinatorHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let receivers = self.subscribe();
        let address = self.device.address();
        let task = tokio::spawn(self.run(shutdown_rx));
        CoordinatorHandle {
            address,
            shutdown: shutdown_tx,
            receivers,
            task,
        }
    }
}

/// Handle to a spawned coordinator task.
#[derive(Debug)]
pub struct CoordinatorHandle {
    address: String,
    shutdown: watch::Sender<bool>,
    receivers: CoordinatorReceivers,
    task: JoinHandle<()>,
}

impl CoordinatorHandle {
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Last successful snapshot, kept while the device is unavailable.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.receivers.snapshot.borrow().clone()
    }

    pub fn is_available(&self) -> bool {
        *self.receivers.available.borrow()
    }

    pub fn stats(&self) -> PollStats {
        self.receivers.stats.borrow().clone()
    }

    pub fn device(&self) -> DeviceRecord {
        self.receivers.device.borrow().clone()
    }

    pub fn subscribe(&self) -> CoordinatorReceivers {
        self.receivers.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Asks the task to stop after its current cycle without waiting.
    pub fn request_stop(&self) {
        self.shutdown.send_replace(true);
    }

    /// Signals the task to stop after its current cycle and waits for it.
    pub async fn stop(self) {
        self.request_stop();
        if let Err(e) = self.task.await {
            if e.is_panic() {
                warn!("{}: polling task panicked", self.address);
            }
        }
    }

    /// Cancels the task immediately, even mid-exchange.
    pub fn abort(&self) {
        self.task.abort();
    }
}
