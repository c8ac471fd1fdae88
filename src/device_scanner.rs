//! # Device Scanner Module
//!
//! [`ScanAdapter`] implementation backed by `btleplug`.
//!
//! ## Key Components
//! - `BleScanner`: handle owned by the controller; start/stop are fire-and-forget commands
//! - `ScanWorker`: dedicated thread with its own Tokio runtime that owns the platform adapter
//!
//! ## Why
//! btleplug is async and delivers central events on its own stream. Running it
//! in a separate thread keeps the controller single-threaded: the worker only
//! translates commands into btleplug calls and btleplug events into
//! [`AdapterEvent`]s on a crossbeam channel.

use crate::adapter::{AdapterEvent, AdvertisementEvent, AdvertisementPayload, PowerState, ScanAdapter};
use crate::error::ScanError;
use btleplug::api::{
    Central, CentralEvent, CentralState, Manager as _, Peripheral as _, PeripheralProperties,
    ScanFilter,
};
use btleplug::platform::{Adapter, Manager, PeripheralId};
use crossbeam_channel::Sender;
use futures::StreamExt;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

/// How long dropping the scanner waits for the worker before detaching it.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterCommand {
    StartScan(Vec<Uuid>),
    StopScan,
    Shutdown,
}

pub struct BleScanner {
    command_sender: UnboundedSender<AdapterCommand>,
    power: Arc<Mutex<PowerState>>,
    worker: Option<JoinHandle<()>>,
}

impl BleScanner {
    /// Spawns the worker thread. Power changes and discoveries are sent on `events`.
    pub fn spawn(events: Sender<AdapterEvent>) -> Self {
        let (command_sender, commands) = unbounded_channel();
        let power = Arc::new(Mutex::new(PowerState::Other));

        let worker = ScanWorker {
            commands,
            events,
            power: power.clone(),
        };
        let handle = std::thread::spawn(move || worker.run());

        Self {
            command_sender,
            power,
            worker: Some(handle),
        }
    }

    fn send(&self, command: AdapterCommand) -> Result<(), ScanError> {
        self.command_sender
            .send(command)
            .map_err(|_| ScanError::WorkerUnavailable)
    }
}

impl ScanAdapter for BleScanner {
    fn start_scan(&mut self, service_filter: &[Uuid]) -> Result<(), ScanError> {
        self.send(AdapterCommand::StartScan(service_filter.to_vec()))
    }

    fn stop_scan(&mut self) -> Result<(), ScanError> {
        self.send(AdapterCommand::StopScan)
    }

    fn power_state(&self) -> PowerState {
        self.power
            .lock()
            .map(|state| *state)
            .unwrap_or(PowerState::Other)
    }
}

impl Drop for BleScanner {
    fn drop(&mut self) {
        let _ = self.send(AdapterCommand::Shutdown);
        if let Some(handle) = self.worker.take() {
            join_with_timeout(handle, SHUTDOWN_TIMEOUT);
        }
    }
}

/// Joins `handle` if it finishes within `timeout`, otherwise detaches it.
///
/// The worker only reads commands once btleplug has initialised, so a stuck
/// `Manager::new` would otherwise hang teardown.
fn join_with_timeout(handle: JoinHandle<()>, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            log::warn!("Scan worker did not stop within {:?}; detaching", timeout);
            return false;
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    if handle.join().is_err() {
        log::error!("Scan worker panicked");
    }
    true
}

struct ScanWorker {
    commands: UnboundedReceiver<AdapterCommand>,
    events: Sender<AdapterEvent>,
    power: Arc<Mutex<PowerState>>,
}

impl ScanWorker {
    /// Runs until the command channel closes or a shutdown is requested.
    fn run(self) {
        let rt = match Runtime::new() {
            Ok(runtime) => runtime,
            Err(e) => {
                let error = ScanError::ManagerInit(e.to_string());
                log::error!("{}", error);
                publish_power(&self.events, &self.power, PowerState::Other);
                return;
            }
        };

        let ScanWorker {
            commands,
            events,
            power,
        } = self;

        if let Err(error) = rt.block_on(event_loop(commands, &events, &power)) {
            // Reported as an unusable adapter; the controller stays non-scanning.
            log::error!("{}", error);
            publish_power(&events, &power, PowerState::Other);
        }

        log::info!("Scan worker: shutting down");
    }
}

async fn event_loop(
    mut commands: UnboundedReceiver<AdapterCommand>,
    events: &Sender<AdapterEvent>,
    power: &Arc<Mutex<PowerState>>,
) -> Result<(), ScanError> {
    let manager = Manager::new()
        .await
        .map_err(|e| ScanError::ManagerInit(e.to_string()))?;

    let central = manager
        .adapters()
        .await
        .map_err(|e| ScanError::ManagerInit(e.to_string()))?
        .into_iter()
        .next()
        .ok_or(ScanError::NoAdapters)?;

    let mut central_events = central
        .events()
        .await
        .map_err(|e| ScanError::ManagerInit(e.to_string()))?;

    let initial = match central.adapter_state().await {
        Ok(state) => power_from_central(state),
        Err(e) => {
            log::warn!("Could not read adapter state: {}", e);
            PowerState::Other
        }
    };
    publish_power(events, power, initial);

    let mut scanning = false;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(AdapterCommand::StartScan(services)) => {
                    if scanning {
                        stop_scan(&central).await;
                    }
                    log::debug!("Scan worker: starting scan ({} service filters)", services.len());
                    match central.start_scan(ScanFilter { services }).await {
                        Ok(()) => scanning = true,
                        Err(e) => {
                            log::error!("{}", ScanError::ScanFailed(e.to_string()));
                            scanning = false;
                        }
                    }
                }
                Some(AdapterCommand::StopScan) => {
                    if scanning {
                        stop_scan(&central).await;
                        scanning = false;
                    }
                }
                Some(AdapterCommand::Shutdown) | None => break,
            },
            event = central_events.next() => match event {
                Some(CentralEvent::StateUpdate(state)) => {
                    let state = power_from_central(state);
                    if state != PowerState::PoweredOn {
                        scanning = false;
                    }
                    publish_power(events, power, state);
                }
                Some(CentralEvent::DeviceDiscovered(id)) | Some(CentralEvent::DeviceUpdated(id)) => {
                    if !scanning {
                        continue;
                    }
                    if let Some(advertisement) = read_advertisement(&central, &id).await {
                        if events.send(AdapterEvent::PeripheralDiscovered(advertisement)).is_err() {
                            log::debug!("Scan worker: event receiver dropped");
                            break;
                        }
                    }
                }
                Some(_) => {}
                None => {
                    log::warn!("Scan worker: adapter event stream ended");
                    break;
                }
            },
        }
    }

    if scanning {
        stop_scan(&central).await;
    }

    Ok(())
}

async fn stop_scan(central: &Adapter) {
    if let Err(e) = central.stop_scan().await {
        log::warn!("{}", ScanError::ScanFailed(e.to_string()));
    }
}

async fn read_advertisement(central: &Adapter, id: &PeripheralId) -> Option<AdvertisementEvent> {
    let peripheral = match central.peripheral(id).await {
        Ok(peripheral) => peripheral,
        Err(e) => {
            log::debug!("Peripheral {} vanished: {}", id, e);
            return None;
        }
    };

    match peripheral.properties().await {
        Ok(Some(properties)) => Some(advertisement_from_properties(id.to_string(), properties)),
        Ok(None) => None,
        Err(e) => {
            log::debug!("Could not read properties of {}: {}", id, e);
            None
        }
    }
}

/// btleplug merges the GAP name into `local_name`, so the peripheral name is left empty.
fn advertisement_from_properties(id: String, properties: PeripheralProperties) -> AdvertisementEvent {
    let mut manufacturer_ids: Vec<u16> = properties.manufacturer_data.keys().copied().collect();
    manufacturer_ids.sort_unstable();

    AdvertisementEvent {
        peripheral_name: None,
        payload: AdvertisementPayload {
            local_name: properties.local_name,
            service_uuids: properties.services,
            manufacturer_ids,
        },
        stable_identifier: Some(id),
        signal_strength: properties.rssi,
    }
}

fn power_from_central(state: CentralState) -> PowerState {
    match state {
        CentralState::PoweredOn => PowerState::PoweredOn,
        CentralState::PoweredOff => PowerState::PoweredOff,
        _ => PowerState::Other,
    }
}

fn publish_power(events: &Sender<AdapterEvent>, power: &Arc<Mutex<PowerState>>, state: PowerState) {
    if let Ok(mut current) = power.lock() {
        *current = state;
    }
    let _ = events.send(AdapterEvent::PowerStateChanged(state));
}
