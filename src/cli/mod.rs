use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Starting tempo in beats per minute (20-280)
    #[arg(short, long)]
    pub bpm: Option<u32>,

    /// Starting beats per measure (1-12)
    #[arg(long)]
    pub beats: Option<u32>,

    /// Starting accent pattern: none, first, last, even or odd
    #[arg(short, long)]
    pub accent: Option<String>,

    /// Panel to simulate: encoder or keypad
    #[arg(long)]
    pub panel: Option<String>,

    /// Play clicks on the MIDI output whose name contains this string
    #[arg(long)]
    pub midi_output: Option<String>,

    /// List available MIDI output devices
    #[arg(long)]
    pub list_midi_outputs: bool,

    /// Where panel settings are stored between runs
    #[arg(long)]
    pub settings_file: Option<PathBuf>,

    /// Configuration file (defaults to ./metrodeck.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level written to the log file
    #[arg(long)]
    pub log_level: Option<String>,
}
