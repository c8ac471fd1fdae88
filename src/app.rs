//! Interactive front end: owns the controller on the main thread and feeds it
//! adapter events and user commands one message at a time.

use crate::adapter::{AdapterEvent, ScanAdapter};
use crate::controller::ScanController;
use crate::display_list::ListUpdate;
use crossbeam_channel::{never, select, Receiver};
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Adapter(AdapterEvent),
    SetScanning(bool),
    ShowList,
    ShowStatus,
    Quit,
}

pub const HELP: &str = "commands: on | off | list | status | quit";

/// Maps a line typed by the user to a message.
pub fn parse_command(line: &str) -> Option<Message> {
    match line.trim().to_ascii_lowercase().as_str() {
        "on" | "start" | "scan" => Some(Message::SetScanning(true)),
        "off" | "stop" => Some(Message::SetScanning(false)),
        "list" | "ls" => Some(Message::ShowList),
        "status" => Some(Message::ShowStatus),
        "quit" | "exit" | "q" => Some(Message::Quit),
        _ => None,
    }
}

pub struct DiscoveryApp<A: ScanAdapter, W: Write> {
    controller: ScanController<A>,
    list_updates: Receiver<ListUpdate>,
    out: W,
}

impl<A: ScanAdapter, W: Write> DiscoveryApp<A, W> {
    pub fn new(mut controller: ScanController<A>, out: W) -> Self {
        let list_updates = controller.display_mut().subscribe();
        Self {
            controller,
            list_updates,
            out,
        }
    }

    /// Applies one message. Returns false when the app should exit.
    pub fn update(&mut self, message: Message) -> bool {
        match message {
            Message::Adapter(event) => self.controller.handle_event(event),
            Message::SetScanning(requested) => self.controller.set_scan_requested(requested),
            Message::ShowList => {
                if self.controller.display().is_empty() {
                    self.say("(no devices)");
                }
                let lines: Vec<String> = self
                    .controller
                    .display()
                    .entries()
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| format!("{:>3}. {}", i + 1, entry))
                    .collect();
                for line in lines {
                    self.say(&line);
                }
            }
            Message::ShowStatus => {
                let status = format!(
                    "state: {:?}, requested: {}, adapter: {:?}, devices: {}, known keys: {}, unnamed so far: {}",
                    self.controller.state(),
                    self.controller.scan_requested(),
                    self.controller.adapter().power_state(),
                    self.controller.display().len(),
                    self.controller.known_keys().len(),
                    self.controller.labels().unknown_count()
                );
                self.say(&status);
            }
            Message::Quit => {
                self.controller.shutdown();
                self.render_updates();
                return false;
            }
        }

        self.render_updates();
        true
    }

    /// Processes messages until `Quit` or until user input closes.
    pub fn run(mut self, mut adapter_events: Receiver<AdapterEvent>, commands: Receiver<Message>) {
        loop {
            let message = select! {
                recv(adapter_events) -> event => event.ok().map(Message::Adapter),
                recv(commands) -> command => Some(command.unwrap_or(Message::Quit)),
            };

            let Some(message) = message else {
                log::warn!("Adapter event channel closed; no further discoveries");
                adapter_events = never();
                continue;
            };

            if !self.update(message) {
                break;
            }
        }

        log::info!("Discovery stopped");
    }

    fn render_updates(&mut self) {
        let updates: Vec<ListUpdate> = self.list_updates.try_iter().collect();
        for update in updates {
            match update {
                ListUpdate::Cleared => self.say("-- new scan session --"),
                ListUpdate::Added { index, entry } => {
                    self.say(&format!("{:>3}. {}", index + 1, entry));
                }
            }
        }
    }

    fn say(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            log::warn!("Failed to write output: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{AdvertisementEvent, PowerState};
    use crate::controller::tests::RecordingAdapter;
    use crate::label::CounterPolicy;
    use crossbeam_channel::unbounded;

    fn app(power: PowerState) -> (DiscoveryApp<RecordingAdapter, Vec<u8>>, RecordingAdapter) {
        let adapter = RecordingAdapter::new(power);
        let handle = adapter.clone();
        let controller = ScanController::new(adapter, Vec::new(), CounterPolicy::PerProcess);
        (DiscoveryApp::new(controller, Vec::new()), handle)
    }

    fn discovered(name: &str, id: &str) -> Message {
        Message::Adapter(AdapterEvent::PeripheralDiscovered(AdvertisementEvent {
            peripheral_name: Some(name.to_string()),
            stable_identifier: Some(id.to_string()),
            ..Default::default()
        }))
    }

    fn output(app: &DiscoveryApp<RecordingAdapter, Vec<u8>>) -> String {
        String::from_utf8(app.out.clone()).unwrap()
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(" ON "), Some(Message::SetScanning(true)));
        assert_eq!(parse_command("off"), Some(Message::SetScanning(false)));
        assert_eq!(parse_command("q"), Some(Message::Quit));
        assert_eq!(parse_command("connect"), None);
    }

    #[test]
    fn test_discoveries_are_printed_incrementally() {
        let (mut app, _adapter) = app(PowerState::PoweredOn);
        assert!(app.update(Message::SetScanning(true)));
        app.update(discovered("Speaker", "id-1"));
        app.update(discovered("Speaker", "id-1"));
        app.update(discovered("Watch", "id-2"));

        assert_eq!(
            output(&app),
            "-- new scan session --\n  1. Speaker\n  2. Watch\n"
        );
    }

    #[test]
    fn test_list_and_status() {
        let (mut app, _adapter) = app(PowerState::PoweredOff);
        app.update(Message::ShowList);
        app.update(Message::SetScanning(true));
        app.update(Message::ShowStatus);

        let out = output(&app);
        assert!(out.contains("(no devices)"));
        assert!(out.contains("state: AwaitingPowerOn, requested: true, adapter: PoweredOff"));
    }

    #[test]
    fn test_status_reports_session_counts() {
        let (mut app, _adapter) = app(PowerState::PoweredOn);
        app.update(Message::SetScanning(true));
        app.update(discovered("Speaker", "id-1"));
        app.update(discovered("A1B2C3D4E5F6", "id-2"));
        app.update(Message::ShowStatus);

        assert!(output(&app).contains("devices: 2, known keys: 2, unnamed so far: 1"));
    }

    #[test]
    fn test_quit_stops_scan() {
        let (mut app, adapter) = app(PowerState::PoweredOn);
        app.update(Message::SetScanning(true));
        assert!(!app.update(Message::Quit));
        assert_eq!(adapter.stops(), 1);
    }

    #[test]
    fn test_run_processes_commands_until_quit() {
        let (app, adapter) = app(PowerState::PoweredOn);
        let (event_sender, event_receiver) = unbounded::<AdapterEvent>();
        let (command_sender, command_receiver) = unbounded();

        command_sender.send(Message::SetScanning(true)).unwrap();
        command_sender.send(Message::Quit).unwrap();
        drop(event_sender);

        app.run(event_receiver, command_receiver);
        assert_eq!(adapter.starts(), 1);
        assert_eq!(adapter.stops(), 1);
    }
}
