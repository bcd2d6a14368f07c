pub mod audio;
pub mod cli;
pub mod config;
pub mod controller;
pub mod display;
pub mod event_loop;
pub mod host;
pub mod input;
pub mod logging;
pub mod scheduler;
pub mod settings;
pub mod state;
pub mod ui;

pub use audio::{Click, ClickNotes, ClickPlayer, LogClickPlayer, MidiClickPlayer};
pub use cli::Args;
pub use controller::{MetronomeController, PanelSession};
pub use display::Feedback;
pub use event_loop::{dispatch, EventLoop, HostEvent};
pub use host::{AccessoryHost, ContextId, ControllerKind, PanelGeometry};
pub use scheduler::DriftScheduler;
pub use settings::{PersistedSettings, SettingsStore};
pub use state::{AccentPattern, EditMode, SharedTempo, TempoState};

/// Click player used by the binary. With `test-mock` no MIDI port is opened.
#[cfg(not(feature = "test-mock"))]
pub fn create_click_player(config: &crate::config::AppConfig) -> Box<dyn ClickPlayer> {
    match MidiClickPlayer::connect(config.midi_output.as_deref(), config.click_notes()) {
        Ok(player) => Box::new(player),
        Err(e) => {
            log::warn!("MIDI click output unavailable ({}), clicks are logged only", e);
            eprintln!("MIDI click output unavailable: {}", e);
            Box::new(LogClickPlayer)
        }
    }
}

#[cfg(feature = "test-mock")]
pub fn create_click_player(_config: &crate::config::AppConfig) -> Box<dyn ClickPlayer> {
    Box::new(LogClickPlayer)
}

#[cfg(not(feature = "test-mock"))]
pub fn list_midi_outputs() -> Vec<String> {
    MidiClickPlayer::list_output_ports().unwrap_or_else(|e| {
        log::error!("Failed to list MIDI outputs: {}", e);
        Vec::new()
    })
}

#[cfg(feature = "test-mock")]
pub fn list_midi_outputs() -> Vec<String> {
    vec!["Mock Output 1".to_string(), "Mock Output 2".to_string()]
}
