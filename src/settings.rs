//! Persisted panel settings.
//!
//! Settings are a flat JSON object per panel. Reading is lenient: any field
//! that is missing, mistyped or out of range keeps the value already in
//! memory.

use crate::display::Feedback;
use crate::state::{AccentPattern, EditMode, TempoState};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Snapshot written back to the host after every render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSettings {
    pub bpm: u32,
    pub beats_per_measure: u32,
    pub beat_mode: u8,
    pub mode: u8,
    pub type_string: String,
    pub layout: String,
    pub value: String,
    pub indicator: f64,
}

impl PersistedSettings {
    pub fn capture(state: &TempoState, feedback: &Feedback) -> Self {
        Self {
            bpm: state.bpm(),
            beats_per_measure: state.beats_per_measure(),
            beat_mode: state.accent_pattern().ordinal(),
            mode: state.edit_mode().number(),
            type_string: feedback.type_string.to_string(),
            layout: state.edit_mode().layout().to_string(),
            value: feedback.value.clone(),
            indicator: feedback.indicator,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

/// Fields recovered from a received settings blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsPatch {
    pub bpm: Option<i64>,
    pub beats_per_measure: Option<i64>,
    pub beat_mode: Option<AccentPattern>,
    pub mode: Option<EditMode>,
}

fn integer_field(settings: &Value, key: &str) -> Option<i64> {
    let field = settings.get(key)?;
    field
        .as_i64()
        .or_else(|| field.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
}

impl SettingsPatch {
    pub fn from_value(settings: &Value) -> Self {
        if !settings.is_object() {
            warn!("Ignoring settings that are not an object: {}", settings);
            return Self::default();
        }

        Self {
            bpm: integer_field(settings, "bpm"),
            beats_per_measure: integer_field(settings, "beatsPerMeasure"),
            beat_mode: integer_field(settings, "beatMode").and_then(AccentPattern::from_ordinal),
            mode: integer_field(settings, "mode").and_then(EditMode::from_number),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply(&self, state: &mut TempoState) {
        if let Some(bpm) = self.bpm {
            state.set_bpm(bpm);
        }
        if let Some(beats) = self.beats_per_measure {
            state.set_beats_per_measure(beats);
        }
        if let Some(pattern) = self.beat_mode {
            state.set_accent_pattern(pattern);
        }
        if let Some(mode) = self.mode {
            state.set_edit_mode(mode);
        }
    }
}

/// Default location of the settings file:
/// `$HOME/.local/share/metrodeck/settings.json`.
pub fn default_settings_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("metrodeck")
            .join("settings.json"),
    )
}

/// JSON file holding the settings blob of every panel, keyed by context.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load_all(&self) -> Result<BTreeMap<String, Value>, SettingsError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn load(&self, context: &str) -> Result<Option<Value>, SettingsError> {
        Ok(self.load_all()?.remove(context))
    }

    pub fn save(&self, context: &str, settings: &PersistedSettings) -> Result<(), SettingsError> {
        let mut all = match self.load_all() {
            Ok(all) => all,
            Err(SettingsError::Json(e)) => {
                warn!("Replacing unreadable settings file {:?}: {}", self.path, e);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        all.insert(context.to_string(), settings.to_value());

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&all)?)?;
        debug!("Saved settings for {} to {:?}", context, self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::render;
    use serde_json::json;

    #[test]
    fn test_patch_reads_all_fields() {
        let patch = SettingsPatch::from_value(&json!({
            "bpm": 96,
            "beatsPerMeasure": 3,
            "beatMode": 2,
            "mode": 3,
            "typeString": "",
            "layout": "libs/layouts/beatMode.json",
        }));
        assert_eq!(patch.bpm, Some(96));
        assert_eq!(patch.beats_per_measure, Some(3));
        assert_eq!(patch.beat_mode, Some(AccentPattern::Last));
        assert_eq!(patch.mode, Some(EditMode::Accent));
    }

    #[test]
    fn test_patch_skips_malformed_fields() {
        let patch = SettingsPatch::from_value(&json!({
            "bpm": "fast",
            "beatsPerMeasure": 5.0,
            "beatMode": 9,
            "mode": 0,
        }));
        assert_eq!(patch.bpm, None);
        assert_eq!(patch.beats_per_measure, Some(5));
        assert_eq!(patch.beat_mode, None);
        assert_eq!(patch.mode, None);

        assert!(SettingsPatch::from_value(&json!([1, 2, 3])).is_empty());
        assert!(SettingsPatch::from_value(&Value::Null).is_empty());
    }

    #[test]
    fn test_apply_clamps_numbers() {
        let mut state = TempoState::new();
        SettingsPatch::from_value(&json!({ "bpm": 999, "beatsPerMeasure": 0 })).apply(&mut state);
        assert_eq!(state.bpm(), 280);
        assert_eq!(state.beats_per_measure(), 1);
    }

    #[test]
    fn test_capture_uses_schema_keys() {
        let state = TempoState::new();
        let value = PersistedSettings::capture(&state, &render(&state)).to_value();
        assert_eq!(value["bpm"], 140);
        assert_eq!(value["beatsPerMeasure"], 4);
        assert_eq!(value["beatMode"], 0);
        assert_eq!(value["mode"], 1);
        assert_eq!(value["typeString"], " bpm");
        assert_eq!(value["layout"], "libs/layouts/bpm.json");
        assert_eq!(value["value"], "140 bpm");
    }
}
