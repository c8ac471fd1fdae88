//! # Adapter Boundary
//!
//! Types exchanged with the platform Bluetooth stack. The core never sees the
//! platform's own types: advertisements arrive as [`AdvertisementEvent`]s and
//! the controller drives scanning through the [`ScanAdapter`] trait.
//!
//! ## Event Flow
//! The platform delivers power-state changes and discoveries on its own
//! thread. Implementations forward them as [`AdapterEvent`]s over a channel
//! that the owning thread drains, so the controller state is never shared.

use crate::error::ScanError;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    PoweredOn,
    PoweredOff,
    /// Unknown, unauthorized, unsupported or resetting
    Other,
}

/// Loosely-structured advertisement data, reduced to the fields we read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvertisementPayload {
    pub local_name: Option<String>,
    pub service_uuids: Vec<Uuid>,
    pub manufacturer_ids: Vec<u16>,
}

impl AdvertisementPayload {
    pub fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvertisementEvent {
    pub peripheral_name: Option<String>,
    pub payload: AdvertisementPayload,
    /// Session-scoped identity token assigned by the platform
    pub stable_identifier: Option<String>,
    /// Not used for discovery decisions
    pub signal_strength: Option<i16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterEvent {
    PowerStateChanged(PowerState),
    PeripheralDiscovered(AdvertisementEvent),
}

/// Scan control surface of a Bluetooth adapter.
///
/// `start_scan` with an empty filter discovers every advertising device.
/// `stop_scan` must be a no-op when nothing is scanning.
pub trait ScanAdapter {
    fn start_scan(&mut self, service_filter: &[Uuid]) -> Result<(), ScanError>;
    fn stop_scan(&mut self) -> Result<(), ScanError>;
    fn power_state(&self) -> PowerState;
}
