use clap::Parser;
use crossbeam::channel::{self, Sender};
use metrodeck::{
    cli::Args,
    config::AppConfig,
    create_click_player,
    input::{self, map_line, DEFAULT_CONTEXT},
    list_midi_outputs, logging, EventLoop, HostEvent, MetronomeController, SettingsStore,
    ui::TerminalHost,
};
use std::io::{self, BufRead};
use std::thread;

fn main() {
    let args = Args::parse();

    if args.list_midi_outputs {
        list_available_outputs(&list_midi_outputs());
        return;
    }

    let config = match AppConfig::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    initialize_logging(&config);
    log::info!(
        "Configuration: {} bpm, {} beats, accent {:?}, {:?} panel",
        config.bpm,
        config.beats_per_measure,
        config.accent,
        config.panel
    );
    if let Some(path) = &args.config {
        log::debug!("Using config file {:?}", path);
    }

    let (event_tx, event_rx) = channel::unbounded();
    let controller = create_controller(&config, event_tx.clone());

    spawn_input_reader(event_tx.clone(), config.clone());
    let _ = event_tx.send(HostEvent::WillAppear {
        context: DEFAULT_CONTEXT.to_string(),
        controller: config.panel,
    });

    println!("{}", input::HELP);
    EventLoop::new(controller, event_rx).run();
    log::info!("Application exiting");
}

fn initialize_logging(config: &AppConfig) {
    let level = config
        .log_level_filter()
        .unwrap_or(log::LevelFilter::Debug);
    match logging::init_logger(level) {
        Ok(path) => log::info!("Application starting, logging to {:?}", path),
        Err(e) => eprintln!("Logging disabled: {}", e),
    }
}

fn list_available_outputs(devices: &[String]) {
    println!("Available MIDI outputs:");
    for device in devices {
        println!("  - {}", device);
    }
}

fn create_controller(
    config: &AppConfig,
    event_tx: Sender<HostEvent>,
) -> MetronomeController<TerminalHost> {
    let store = config.settings_path().map(SettingsStore::new);
    if let Some(store) = &store {
        log::info!("Panel settings stored in {:?}", store.path());
    }

    let host = TerminalHost::new(store, event_tx);
    let player = create_click_player(config);
    MetronomeController::with_state(host, player, config.initial_state())
}

fn spawn_input_reader(event_tx: Sender<HostEvent>, config: AppConfig) {
    let spawned = thread::Builder::new()
        .name("stdin-input".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else {
                    break;
                };
                match map_line(&line, config.panel) {
                    Some(event) => {
                        let quit = event == HostEvent::Shutdown;
                        if event_tx.send(event).is_err() || quit {
                            return;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => println!("{}", input::HELP),
                }
            }
            let _ = event_tx.send(HostEvent::Shutdown);
        });

    if let Err(e) = spawned {
        log::error!("Failed to start input thread: {}", e);
    }
}
