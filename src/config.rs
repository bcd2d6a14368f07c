// config.rs

use crate::audio::ClickNotes;
use crate::cli::Args;
use crate::host::ControllerKind;
use crate::settings;
use crate::state::{AccentPattern, TempoState, DEFAULT_BEATS_PER_MEASURE, DEFAULT_BPM};
use ::config::{Config, Environment, File};
use log::LevelFilter;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_CONFIG_NAME: &str = "metrodeck";
pub const ENV_PREFIX: &str = "METRODECK";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Source(#[from] ::config::ConfigError),
    #[error("unknown log level '{0}'")]
    LogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    pub bpm: u32,
    pub beats_per_measure: u32,
    pub accent: AccentPattern,
    pub panel: ControllerKind,
    pub midi_output: Option<String>,
    pub midi_channel: u8,
    pub accent_note: u8,
    pub regular_note: u8,
    pub velocity: u8,
    pub settings_file: Option<PathBuf>,
    pub log_level: String,
}

impl AppConfig {
    /// Layers built-in defaults, the config file, `METRODECK_*` environment
    /// variables and finally command line flags.
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let notes = ClickNotes::default();
        let builder = Config::builder()
            .set_default("bpm", i64::from(DEFAULT_BPM))?
            .set_default("beats_per_measure", i64::from(DEFAULT_BEATS_PER_MEASURE))?
            .set_default("accent", "none")?
            .set_default("panel", "encoder")?
            .set_default("midi_channel", i64::from(notes.channel))?
            .set_default("accent_note", i64::from(notes.accent))?
            .set_default("regular_note", i64::from(notes.regular))?
            .set_default("velocity", i64::from(notes.velocity))?
            .set_default("log_level", "debug")?;

        let file = match &args.config {
            Some(path) => File::from(path.as_path()),
            None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
        };

        let config = builder
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .set_override_option("bpm", args.bpm.map(i64::from))?
            .set_override_option("beats_per_measure", args.beats.map(i64::from))?
            .set_override_option("accent", args.accent.clone())?
            .set_override_option("panel", args.panel.clone())?
            .set_override_option("midi_output", args.midi_output.clone())?
            .set_override_option(
                "settings_file",
                args.settings_file
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .set_override_option("log_level", args.log_level.clone())?
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.log_level_filter()?;
        Ok(app_config)
    }

    pub fn log_level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    /// Tempo state the session starts with before any stored settings arrive.
    pub fn initial_state(&self) -> TempoState {
        let mut state = TempoState::new();
        state.set_bpm(i64::from(self.bpm));
        state.set_beats_per_measure(i64::from(self.beats_per_measure));
        state.set_accent_pattern(self.accent);
        state
    }

    pub fn click_notes(&self) -> ClickNotes {
        ClickNotes {
            channel: self.midi_channel,
            accent: self.accent_note,
            regular: self.regular_note,
            velocity: self.velocity,
        }
    }

    pub fn settings_path(&self) -> Option<PathBuf> {
        self.settings_file
            .clone()
            .or_else(settings::default_settings_path)
    }
}
