//! Panel feedback rendering.
//!
//! The panel shows one value string and a 0–100 indicator bar. The bar maps
//! the displayed number from the tempo range, so it only moves in tempo mode
//! and stays pinned at zero while editing the measure or the accents.

use crate::state::{EditMode, TempoState, MAX_BPM, MIN_BPM};
use serde::Serialize;

/// Payload pushed to the panel's feedback layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feedback {
    pub value: String,
    pub indicator: f64,
    #[serde(skip)]
    pub type_string: &'static str,
}

/// Maps `value` from the tempo range onto the indicator bar, clamped to
/// [0, 100]. Measure lengths fall below the tempo range and so read 0.
pub fn indicator(value: u32) -> f64 {
    let span = f64::from(MAX_BPM - MIN_BPM);
    ((f64::from(value) - f64::from(MIN_BPM)) / span * 100.0).clamp(0.0, 100.0)
}

pub fn render(state: &TempoState) -> Feedback {
    let mode = state.edit_mode();
    let (value, indicator) = match mode {
        EditMode::Tempo => (state.bpm().to_string(), indicator(state.bpm())),
        EditMode::BeatsPerMeasure => (
            state.beats_per_measure().to_string(),
            indicator(state.beats_per_measure()),
        ),
        EditMode::Accent => (state.accent_pattern().label().to_string(), 0.0),
    };

    Feedback {
        value: format!("{}{}", value, mode.type_string()),
        indicator,
        type_string: mode.type_string(),
    }
}
