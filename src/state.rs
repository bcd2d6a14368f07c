use crate::audio::Click;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

pub const MIN_BPM: u32 = 20;
pub const MAX_BPM: u32 = 280;
pub const DEFAULT_BPM: u32 = 140;

pub const MIN_BEATS_PER_MEASURE: u32 = 1;
pub const MAX_BEATS_PER_MEASURE: u32 = 12;
pub const DEFAULT_BEATS_PER_MEASURE: u32 = 4;

/// Tempo state shared by every panel session. All access happens on the
/// event loop thread, so a `RefCell` is enough.
pub type SharedTempo = Rc<RefCell<TempoState>>;

/// Which beats of a measure get the accent click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccentPattern {
    #[default]
    None,
    First,
    Last,
    Even,
    Odd,
}

impl AccentPattern {
    pub const ALL: [AccentPattern; 5] = [
        AccentPattern::None,
        AccentPattern::First,
        AccentPattern::Last,
        AccentPattern::Even,
        AccentPattern::Odd,
    ];

    /// Position in the persisted `beatMode` range (0..=4).
    pub fn ordinal(self) -> u8 {
        match self {
            AccentPattern::None => 0,
            AccentPattern::First => 1,
            AccentPattern::Last => 2,
            AccentPattern::Even => 3,
            AccentPattern::Odd => 4,
        }
    }

    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    /// Moves through the ordinals by `ticks`, pinning at `None` and `Odd`.
    pub fn shifted(self, ticks: i32) -> Self {
        let last = (Self::ALL.len() - 1) as i64;
        let ordinal = (i64::from(self.ordinal()) + i64::from(ticks)).clamp(0, last);
        Self::ALL[ordinal as usize]
    }

    pub fn label(self) -> &'static str {
        match self {
            AccentPattern::None => "none",
            AccentPattern::First => "first beat",
            AccentPattern::Last => "last beat",
            AccentPattern::Even => "even beats",
            AccentPattern::Odd => "odd beats",
        }
    }

    /// Whether the 0-indexed `beat` of a measure gets the accent click.
    ///
    /// `Even` and `Odd` test the opposite parity of the 0-indexed counter,
    /// i.e. they count beats from one. Stored settings depend on this mapping.
    pub fn accents(self, beat: u32, beats_per_measure: u32) -> bool {
        match self {
            AccentPattern::None => false,
            AccentPattern::First => beat == 0,
            AccentPattern::Last => beat + 1 == beats_per_measure,
            AccentPattern::Even => beat % 2 != 0,
            AccentPattern::Odd => beat % 2 == 0,
        }
    }
}

/// Parameter the dial currently edits. Cycles on each dial press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Tempo,
    BeatsPerMeasure,
    Accent,
}

impl EditMode {
    const CYCLE: [EditMode; 3] = [
        EditMode::Tempo,
        EditMode::BeatsPerMeasure,
        EditMode::Accent,
    ];

    pub fn next(self) -> Self {
        let index = Self::CYCLE.iter().position(|m| *m == self).unwrap_or(0);
        Self::CYCLE[(index + 1) % Self::CYCLE.len()]
    }

    /// Persisted `mode` number, 1-based.
    pub fn number(self) -> u8 {
        match self {
            EditMode::Tempo => 1,
            EditMode::BeatsPerMeasure => 2,
            EditMode::Accent => 3,
        }
    }

    pub fn from_number(number: i64) -> Option<Self> {
        match number {
            1 => Some(EditMode::Tempo),
            2 => Some(EditMode::BeatsPerMeasure),
            3 => Some(EditMode::Accent),
            _ => None,
        }
    }

    /// Feedback layout resource shown on the panel in this mode.
    pub fn layout(self) -> &'static str {
        match self {
            EditMode::Tempo => "libs/layouts/bpm.json",
            EditMode::BeatsPerMeasure => "libs/layouts/beatsPerMeasure.json",
            EditMode::Accent => "libs/layouts/beatMode.json",
        }
    }

    pub fn type_string(self) -> &'static str {
        match self {
            EditMode::Tempo => " bpm",
            EditMode::BeatsPerMeasure => "/4 time",
            EditMode::Accent => "",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TempoState {
    bpm: u32,
    beats_per_measure: u32,
    accent_pattern: AccentPattern,
    edit_mode: EditMode,
    beat_counter: u32,
    running: bool,
}

impl Default for TempoState {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            beats_per_measure: DEFAULT_BEATS_PER_MEASURE,
            accent_pattern: AccentPattern::default(),
            edit_mode: EditMode::default(),
            beat_counter: 0,
            running: false,
        }
    }
}

fn clamp_offset(value: u32, ticks: i64, min: u32, max: u32) -> u32 {
    (i64::from(value) + ticks).clamp(i64::from(min), i64::from(max)) as u32
}

impl TempoState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedTempo {
        Rc::new(RefCell::new(self))
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn beats_per_measure(&self) -> u32 {
        self.beats_per_measure
    }

    pub fn accent_pattern(&self) -> AccentPattern {
        self.accent_pattern
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    pub fn beat_counter(&self) -> u32 {
        self.beat_counter
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Sets the tempo, clamped to [`MIN_BPM`, `MAX_BPM`].
    pub fn set_bpm(&mut self, bpm: i64) {
        self.bpm = clamp_offset(0, bpm, MIN_BPM, MAX_BPM);
    }

    pub fn adjust_bpm(&mut self, ticks: i32) -> u32 {
        self.bpm = clamp_offset(self.bpm, i64::from(ticks), MIN_BPM, MAX_BPM);
        self.bpm
    }

    /// Restarts the measure only when the length actually changes.
    pub fn set_beats_per_measure(&mut self, beats: i64) {
        let beats = clamp_offset(0, beats, MIN_BEATS_PER_MEASURE, MAX_BEATS_PER_MEASURE);
        if beats != self.beats_per_measure {
            self.beats_per_measure = beats;
            self.beat_counter = 0;
        }
    }

    pub fn adjust_beats_per_measure(&mut self, ticks: i32) -> u32 {
        self.beats_per_measure = clamp_offset(
            self.beats_per_measure,
            i64::from(ticks),
            MIN_BEATS_PER_MEASURE,
            MAX_BEATS_PER_MEASURE,
        );
        self.beat_counter = 0;
        self.beats_per_measure
    }

    /// Restarts the measure only when the pattern actually changes.
    pub fn set_accent_pattern(&mut self, pattern: AccentPattern) {
        if pattern != self.accent_pattern {
            self.accent_pattern = pattern;
            self.beat_counter = 0;
        }
    }

    pub fn adjust_accent_pattern(&mut self, ticks: i32) -> AccentPattern {
        self.accent_pattern = self.accent_pattern.shifted(ticks);
        self.beat_counter = 0;
        self.accent_pattern
    }

    pub fn set_edit_mode(&mut self, mode: EditMode) {
        self.edit_mode = mode;
    }

    pub fn cycle_edit_mode(&mut self) -> EditMode {
        self.edit_mode = self.edit_mode.next();
        self.edit_mode
    }

    pub fn set_running(&mut self, running: bool) {
        self.running = running;
        self.beat_counter = 0;
    }

    /// Time between two clicks at the current tempo.
    pub fn beat_interval(&self) -> Duration {
        Duration::from_micros(60_000_000 / u64::from(self.bpm))
    }

    /// Picks the click for the current beat and advances the counter,
    /// wrapping at the end of the measure.
    pub fn next_click(&mut self) -> Click {
        if self.beat_counter >= self.beats_per_measure {
            self.beat_counter = 0;
        }

        let click = if self
            .accent_pattern
            .accents(self.beat_counter, self.beats_per_measure)
        {
            Click::Accent
        } else {
            Click::Regular
        };

        self.beat_counter = (self.beat_counter + 1) % self.beats_per_measure;
        click
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accent_pattern_shift_saturates() {
        assert_eq!(AccentPattern::None.shifted(-3), AccentPattern::None);
        assert_eq!(AccentPattern::First.shifted(2), AccentPattern::Even);
        assert_eq!(AccentPattern::Last.shifted(100), AccentPattern::Odd);
        assert_eq!(AccentPattern::Odd.shifted(i32::MIN), AccentPattern::None);
    }

    #[test]
    fn test_ordinals_round_trip() {
        for pattern in AccentPattern::ALL {
            assert_eq!(
                AccentPattern::from_ordinal(i64::from(pattern.ordinal())),
                Some(pattern)
            );
        }
        assert_eq!(AccentPattern::from_ordinal(5), None);
        assert_eq!(AccentPattern::from_ordinal(-1), None);
        assert_eq!(EditMode::from_number(0), None);
        assert_eq!(EditMode::from_number(4), None);
    }

    #[test]
    fn test_beat_interval_follows_bpm() {
        let mut state = TempoState::new();
        state.set_bpm(120);
        assert_eq!(state.beat_interval(), Duration::from_millis(500));
        state.set_bpm(280);
        assert_eq!(state.beat_interval(), Duration::from_micros(214_285));
    }

    #[test]
    fn test_counter_wraps_after_shrinking_measure() {
        let mut state = TempoState::new();
        state.set_beats_per_measure(6);
        for _ in 0..5 {
            state.next_click();
        }
        assert_eq!(state.beat_counter(), 5);

        state.adjust_beats_per_measure(-3);
        assert_eq!(state.beat_counter(), 0);
        assert_eq!(state.beats_per_measure(), 3);
    }

    #[test]
    fn test_unchanged_setters_keep_counter() {
        let mut state = TempoState::new();
        state.next_click();
        state.next_click();

        state.set_beats_per_measure(4);
        state.set_accent_pattern(AccentPattern::None);
        assert_eq!(state.beat_counter(), 2);

        state.adjust_beats_per_measure(100);
        state.adjust_beats_per_measure(0);
        assert_eq!(state.beat_counter(), 0);
        state.next_click();
        state.adjust_accent_pattern(-1);
        assert_eq!(state.beat_counter(), 0);
    }
}
