use log::{debug, info, warn};
use midir::{MidiOutput, MidiOutputConnection};

/// The two fixed metronome sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    Accent,
    Regular,
}

/// Plays clicks. Playback is fire-and-forget: a click triggered while the
/// previous one still sounds restarts it from the beginning.
pub trait ClickPlayer {
    fn play(&mut self, click: Click);
}

impl<P: ClickPlayer + ?Sized> ClickPlayer for Box<P> {
    fn play(&mut self, click: Click) {
        (**self).play(click)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("MIDI output init error: {0}")]
    Init(#[from] midir::InitError),
    #[error("MIDI connection error: {0}")]
    Connection(String),
    #[error("MIDI send error: {0}")]
    Send(#[from] midir::SendError),
    #[error("MIDI port error: {0}")]
    PortInfo(#[from] midir::PortInfoError),
    #[error("MIDI output device '{0}' not found")]
    DeviceNotFound(String),
    #[error("No MIDI output ports available")]
    NoPorts,
}

/// Player that only logs, for runs without a MIDI output.
#[derive(Debug, Default)]
pub struct LogClickPlayer;

impl ClickPlayer for LogClickPlayer {
    fn play(&mut self, click: Click) {
        debug!("Click: {:?}", click);
    }
}

/// MIDI notes used for the two clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickNotes {
    pub channel: u8,
    pub accent: u8,
    pub regular: u8,
    pub velocity: u8,
}

impl Default for ClickNotes {
    fn default() -> Self {
        // GM percussion: hi and low wood block on channel 10
        Self {
            channel: 9,
            accent: 76,
            regular: 77,
            velocity: 100,
        }
    }
}

impl ClickNotes {
    pub fn note_for(&self, click: Click) -> u8 {
        match click {
            Click::Accent => self.accent,
            Click::Regular => self.regular,
        }
    }

    fn note_on(&self, note: u8) -> [u8; 3] {
        [0x90 | (self.channel & 0x0F), note & 0x7F, self.velocity & 0x7F]
    }

    fn note_off(&self, note: u8) -> [u8; 3] {
        [0x80 | (self.channel & 0x0F), note & 0x7F, 0]
    }

    /// Messages that restart `click`: release the note, then strike it again.
    pub fn retrigger(&self, click: Click) -> [[u8; 3]; 2] {
        let note = self.note_for(click);
        [self.note_off(note), self.note_on(note)]
    }
}

/// Plays clicks as percussion notes on a MIDI output port.
pub struct MidiClickPlayer {
    connection: MidiOutputConnection,
    notes: ClickNotes,
}

impl MidiClickPlayer {
    /// Connects to the first port whose name contains `device_name`, or to
    /// the first available port when no name is given.
    pub fn connect(device_name: Option<&str>, notes: ClickNotes) -> Result<Self, AudioError> {
        let midi_out = MidiOutput::new("metrodeck-output")?;
        let out_ports = midi_out.ports();
        if out_ports.is_empty() {
            return Err(AudioError::NoPorts);
        }

        let port = match device_name {
            Some(name) => out_ports
                .iter()
                .find(|p| midi_out.port_name(p).unwrap_or_default().contains(name))
                .ok_or_else(|| AudioError::DeviceNotFound(name.to_string()))?,
            None => &out_ports[0],
        };

        let port_name = midi_out.port_name(port)?;
        info!("Connecting click output to MIDI port: {}", port_name);
        let connection = midi_out
            .connect(port, "metrodeck-output-conn")
            .map_err(|e| AudioError::Connection(e.to_string()))?;

        Ok(Self { connection, notes })
    }

    pub fn list_output_ports() -> Result<Vec<String>, AudioError> {
        let midi_out = MidiOutput::new("metrodeck-port-lister")?;
        Ok(midi_out
            .ports()
            .iter()
            .filter_map(|p| midi_out.port_name(p).ok())
            .collect())
    }

    fn send_click(&mut self, click: Click) -> Result<(), AudioError> {
        for message in self.notes.retrigger(click) {
            self.connection.send(&message)?;
        }
        Ok(())
    }
}

impl ClickPlayer for MidiClickPlayer {
    fn play(&mut self, click: Click) {
        if let Err(e) = self.send_click(click) {
            warn!("Failed to play {:?} click: {}", click, e);
        }
    }
}
