// ui.rs

use crate::display::Feedback;
use crate::event_loop::HostEvent;
use crate::host::{AccessoryHost, ContextId};
use crate::settings::{PersistedSettings, SettingsStore};
use crossbeam::channel::Sender;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, error, warn};
use std::collections::HashMap;
use std::path::Path;

fn create_panel_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let pb = multi_progress.add(ProgressBar::new(100));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{prefix:.bold} [{bar:40.cyan}] {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("⣀⣤⣦⣶⣷⣿ "),
    );
    pb
}

/// Short name of a layout resource, e.g. `bpm` for `libs/layouts/bpm.json`.
pub fn layout_label(layout: &str) -> &str {
    Path::new(layout)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(layout)
}

/// Host that draws each panel as a terminal progress bar and keeps
/// settings in a JSON file.
pub struct TerminalHost {
    store: Option<SettingsStore>,
    event_tx: Sender<HostEvent>,
    multi_progress: MultiProgress,
    panels: HashMap<ContextId, ProgressBar>,
}

impl TerminalHost {
    pub fn new(store: Option<SettingsStore>, event_tx: Sender<HostEvent>) -> Self {
        Self::with_draw_target(store, event_tx, ProgressDrawTarget::stderr())
    }

    pub fn with_draw_target(
        store: Option<SettingsStore>,
        event_tx: Sender<HostEvent>,
        target: ProgressDrawTarget,
    ) -> Self {
        TerminalHost {
            store,
            event_tx,
            multi_progress: MultiProgress::with_draw_target(target),
            panels: HashMap::new(),
        }
    }

    /// Last value drawn on `context`, if it is on screen.
    pub fn panel_message(&self, context: &str) -> Option<String> {
        self.panels.get(context).map(|pb| pb.message().to_string())
    }

    pub fn panel_position(&self, context: &str) -> Option<u64> {
        self.panels.get(context).map(|pb| pb.position())
    }

    fn panel(&mut self, context: &str) -> &ProgressBar {
        let multi_progress = &self.multi_progress;
        self.panels.entry(context.to_string()).or_insert_with(|| {
            let pb = create_panel_bar(multi_progress);
            pb.set_prefix(context.to_string());
            pb
        })
    }
}

impl AccessoryHost for TerminalHost {
    fn get_settings(&mut self, context: &str) {
        let Some(store) = &self.store else {
            return;
        };

        match store.load(context) {
            Ok(Some(settings)) => {
                let event = HostEvent::DidReceiveSettings {
                    context: context.to_string(),
                    settings,
                };
                if self.event_tx.send(event).is_err() {
                    warn!("Event loop gone, dropping settings for {}", context);
                }
            }
            Ok(None) => debug!("No stored settings for {}", context),
            Err(e) => warn!("Could not read settings for {}: {}", context, e),
        }
    }

    fn set_feedback_layout(&mut self, context: &str, layout: &str) {
        let label = format!("{} ({})", context, layout_label(layout));
        self.panel(context).set_prefix(label);
    }

    fn set_feedback(&mut self, context: &str, feedback: &Feedback) {
        let pb = self.panel(context);
        pb.set_position(feedback.indicator.round() as u64);
        pb.set_message(feedback.value.clone());
    }

    fn set_settings(&mut self, context: &str, settings: &PersistedSettings) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(context, settings) {
                error!("Failed to save settings for {}: {}", context, e);
            }
        }
    }
}

impl Drop for TerminalHost {
    fn drop(&mut self) {
        for pb in self.panels.values() {
            pb.abandon();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::render;
    use crate::state::TempoState;

    #[test]
    fn test_layout_label() {
        assert_eq!(layout_label("libs/layouts/beatsPerMeasure.json"), "beatsPerMeasure");
        assert_eq!(layout_label(""), "");
    }

    #[test]
    fn test_feedback_is_drawn_on_panel() {
        let (tx, _rx) = crossbeam::channel::unbounded();
        let mut host = TerminalHost::with_draw_target(None, tx, ProgressDrawTarget::hidden());

        let mut state = TempoState::new();
        state.set_bpm(280);
        host.set_feedback("panel-1", &render(&state));

        assert_eq!(host.panel_message("panel-1").as_deref(), Some("280 bpm"));
        assert_eq!(host.panel_position("panel-1"), Some(100));
        assert_eq!(host.panel_message("panel-2"), None);
    }

    #[test]
    fn test_get_settings_without_store_sends_nothing() {
        let (tx, rx) = crossbeam::channel::unbounded();
        let mut host = TerminalHost::with_draw_target(None, tx, ProgressDrawTarget::hidden());
        host.get_settings("panel-1");
        assert!(rx.try_recv().is_err());
    }
}
