//! # Scan Lifecycle Controller
//!
//! Coordinates the user's scan toggle with the adapter's power state and
//! turns advertisements into display entries.
//!
//! ## States
//! - `Idle`: no scan requested
//! - `AwaitingPowerOn`: scan requested, adapter not powered on yet
//! - `Scanning`: scan running, advertisements are processed
//!
//! ## Session Reset
//! Entering `Scanning` clears the display list and the known keys before the
//! first advertisement of the new session. Nothing else resets them.
//!
//! ## Threading
//! The controller is owned by one thread. Adapter callbacks reach it as
//! [`AdapterEvent`]s through a channel, one at a time.

use crate::adapter::{AdapterEvent, AdvertisementEvent, PowerState, ScanAdapter};
use crate::device_record::DeviceRecord;
use crate::display_list::DisplayList;
use crate::known_keys::KnownKeys;
use crate::label::{CounterPolicy, LabelFormatter};
use log::{debug, error, info, trace, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    AwaitingPowerOn,
    Scanning,
}

pub struct ScanController<A: ScanAdapter> {
    adapter: A,
    state: ScanState,
    scan_requested: bool,
    service_filter: Vec<Uuid>,
    known_keys: KnownKeys,
    display: DisplayList,
    labels: LabelFormatter,
}

impl<A: ScanAdapter> ScanController<A> {
    pub fn new(adapter: A, service_filter: Vec<Uuid>, counter_policy: CounterPolicy) -> Self {
        Self {
            adapter,
            state: ScanState::Idle,
            scan_requested: false,
            service_filter,
            known_keys: KnownKeys::new(),
            display: DisplayList::new(),
            labels: LabelFormatter::new(counter_policy),
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn scan_requested(&self) -> bool {
        self.scan_requested
    }

    pub fn display(&self) -> &DisplayList {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut DisplayList {
        &mut self.display
    }

    pub fn known_keys(&self) -> &KnownKeys {
        &self.known_keys
    }

    pub fn labels(&self) -> &LabelFormatter {
        &self.labels
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// The user's scan toggle.
    pub fn set_scan_requested(&mut self, requested: bool) {
        self.scan_requested = requested;

        if requested {
            let power = self.adapter.power_state();
            self.try_start_scan(power);
        } else {
            self.stop_scanning();
            self.state = ScanState::Idle;
            info!("Scanning disabled");
        }
    }

    pub fn handle_event(&mut self, event: AdapterEvent) {
        match event {
            AdapterEvent::PowerStateChanged(power) => self.on_power_state_changed(power),
            AdapterEvent::PeripheralDiscovered(advertisement) => {
                self.on_peripheral_discovered(&advertisement);
            }
        }
    }

    /// Power loss keeps the scan request, so a later power-on resumes scanning.
    pub fn on_power_state_changed(&mut self, power: PowerState) {
        info!("Adapter power state changed: {:?}", power);

        if power == PowerState::PoweredOn {
            self.try_start_scan(power);
            return;
        }

        self.stop_scanning();
        self.state = if self.scan_requested {
            ScanState::AwaitingPowerOn
        } else {
            ScanState::Idle
        };
    }

    /// Returns the new display entry when the advertisement surfaced a device.
    pub fn on_peripheral_discovered(&mut self, advertisement: &AdvertisementEvent) -> Option<String> {
        if self.state != ScanState::Scanning {
            debug!("Dropping advertisement received while not scanning");
            return None;
        }

        let Some(record) = DeviceRecord::from_advertisement(advertisement) else {
            trace!(
                "Ignoring anonymous advertisement (id: {:?})",
                advertisement.stable_identifier
            );
            return None;
        };

        if !self.known_keys.try_admit(&record.key) {
            trace!("Already listed: {}", record.key);
            return None;
        }

        let entry = self.labels.format_entry(record.label.as_deref(), &record.key);
        info!(
            "Discovered {} (key: {}, rssi: {:?})",
            entry, record.key, advertisement.signal_strength
        );
        debug!(
            "{} advertises services {:?}, manufacturers {:?}",
            entry, advertisement.payload.service_uuids, advertisement.payload.manufacturer_ids
        );
        self.display.push(entry.clone());
        Some(entry)
    }

    /// Stops any active scan. Called on teardown and on drop.
    pub fn shutdown(&mut self) {
        self.scan_requested = false;
        self.stop_scanning();
        self.state = ScanState::Idle;
    }

    fn try_start_scan(&mut self, power: PowerState) {
        if !self.scan_requested {
            return;
        }

        if power != PowerState::PoweredOn {
            info!("Scan requested, waiting for adapter to power on");
            self.state = ScanState::AwaitingPowerOn;
            return;
        }

        self.begin_session();

        if self.state == ScanState::Scanning {
            if let Err(e) = self.adapter.stop_scan() {
                warn!("Failed to stop previous scan before restart: {}", e);
            }
        }

        match self.adapter.start_scan(&self.service_filter) {
            Ok(()) => {
                info!("Scanning started");
                self.state = ScanState::Scanning;
            }
            Err(e) => {
                error!("Failed to start scan: {}", e);
                self.state = ScanState::AwaitingPowerOn;
            }
        }
    }

    fn begin_session(&mut self) {
        if !self.known_keys.is_empty() {
            debug!("Forgetting {} devices from the previous session", self.known_keys.len());
        }
        self.display.clear();
        self.known_keys.clear();
        self.labels.begin_session();
    }

    fn stop_scanning(&mut self) {
        if self.state != ScanState::Scanning {
            return;
        }

        if let Err(e) = self.adapter.stop_scan() {
            warn!("Failed to stop scan: {}", e);
        }
        info!("Scanning stopped");
    }
}

impl<A: ScanAdapter> Drop for ScanController<A> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
