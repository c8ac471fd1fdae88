mod adapter;
mod app;
mod config;
mod controller;
mod device_record;
mod device_scanner;
mod display_list;
mod error;
mod identity;
mod known_keys;
mod label;

use app::{parse_command, DiscoveryApp, Message, HELP};
use config::Config;
use controller::ScanController;
use crossbeam_channel::{unbounded, Sender};
use device_scanner::BleScanner;
use std::io::BufRead;

fn main() {
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    if let Some(e) = config_error {
        log::warn!("{}; using default settings", e);
    }

    // Adapter events flow from the scan worker thread to this thread
    let (event_sender, event_receiver) = unbounded();
    let scanner = BleScanner::spawn(event_sender);
    let controller = ScanController::new(scanner, config.service_uuids(), config.counter_policy());

    let (command_sender, command_receiver) = unbounded();
    if config.scan_on_start {
        let _ = command_sender.send(Message::SetScanning(true));
    }

    std::thread::spawn(move || read_commands(command_sender));

    println!("{}", HELP);
    DiscoveryApp::new(controller, std::io::stdout()).run(event_receiver, command_receiver);
}

/// Forwards stdin commands until EOF, then asks the app to quit.
fn read_commands(sender: Sender<Message>) {
    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("Failed to read input: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match parse_command(&line) {
            Some(message) => {
                let quit = message == Message::Quit;
                if sender.send(message).is_err() || quit {
                    return;
                }
            }
            None => println!("{}", HELP),
        }
    }

    let _ = sender.send(Message::Quit);
}
