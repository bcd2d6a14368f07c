//! Metronome controller.
//!
//! Owns the shared [`TempoState`], the panel sessions showing it and the one
//! scheduler that plays clicks. Every input goes through here; a change made
//! from any panel is rendered on all of them.

use crate::audio::ClickPlayer;
use crate::display::{self, Feedback};
use crate::host::{AccessoryHost, ContextId, PanelGeometry};
use crate::scheduler::DriftScheduler;
use crate::settings::{PersistedSettings, SettingsPatch};
use crate::state::{EditMode, SharedTempo, TempoState};
use log::{debug, info, warn};
use serde_json::Value;
use std::cell::Ref;
use std::collections::BTreeMap;
use std::time::Instant;

/// One attached panel.
#[derive(Debug)]
pub struct PanelSession {
    context: ContextId,
    geometry: PanelGeometry,
    tempo: SharedTempo,
}

impl PanelSession {
    pub fn new(context: ContextId, geometry: PanelGeometry, tempo: SharedTempo) -> Self {
        Self {
            context,
            geometry,
            tempo,
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    pub fn tempo(&self) -> Ref<'_, TempoState> {
        self.tempo.borrow()
    }
}

pub struct MetronomeController<H: AccessoryHost> {
    tempo: SharedTempo,
    sessions: BTreeMap<ContextId, PanelSession>,
    metronome: DriftScheduler,
    host: H,
}

impl<H: AccessoryHost> MetronomeController<H> {
    pub fn new<P>(host: H, player: P) -> Self
    where
        P: ClickPlayer + 'static,
    {
        Self::with_state(host, player, TempoState::default())
    }

    pub fn with_state<P>(host: H, mut player: P, state: TempoState) -> Self
    where
        P: ClickPlayer + 'static,
    {
        let interval = state.beat_interval();
        let tempo = state.into_shared();

        let clock_tempo = tempo.clone();
        let metronome = DriftScheduler::new(interval, move || {
            let click = clock_tempo.borrow_mut().next_click();
            player.play(click);
        })
        .immediate(true)
        .on_overrun(|drift| {
            warn!(
                "Metronome round {:?} late, more than a full beat; clicks are falling behind",
                drift
            );
        });

        Self {
            tempo,
            sessions: BTreeMap::new(),
            metronome,
            host,
        }
    }

    pub fn tempo(&self) -> Ref<'_, TempoState> {
        self.tempo.borrow()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn session(&self, context: &str) -> Option<&PanelSession> {
        self.sessions.get(context)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn scheduler(&self) -> &DriftScheduler {
        &self.metronome
    }

    /// When the next click is due, if the metronome is running.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.metronome.next_deadline()
    }

    /// Plays the pending click if it is due at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        self.metronome.poll(now)
    }

    pub fn on_appear(&mut self, context: impl Into<ContextId>, geometry: PanelGeometry) {
        let context = context.into();
        info!("Panel {} appeared ({}x{})", context, geometry.width, geometry.height);

        let session = PanelSession::new(context.clone(), geometry, self.tempo.clone());
        self.sessions.insert(context.clone(), session);
        self.host.get_settings(&context);
        self.render(&context);
    }

    pub fn on_disappear(&mut self, context: &str) {
        match self.sessions.remove(context) {
            Some(_) => info!("Panel {} disappeared", context),
            None => debug!("Disappear for unknown panel {}", context),
        }
    }

    pub fn on_settings_received(&mut self, context: &str, settings: &Value) {
        if !self.has_session(context) {
            return;
        }

        let patch = SettingsPatch::from_value(settings);
        debug!("Settings received for {}: {:?}", context, patch);
        patch.apply(&mut self.tempo.borrow_mut());

        self.update_interval();
        let layout = self.tempo.borrow().edit_mode().layout();
        self.host.set_feedback_layout(context, layout);
        self.render_all();
    }

    pub fn on_rotate(&mut self, context: &str, ticks: i32) {
        if !self.has_session(context) {
            return;
        }

        let mode = self.tempo.borrow().edit_mode();
        {
            let mut tempo = self.tempo.borrow_mut();
            match mode {
                EditMode::Tempo => {
                    let bpm = tempo.adjust_bpm(ticks);
                    debug!("Dial {:+} on {}: tempo {} bpm", ticks, context, bpm);
                }
                EditMode::BeatsPerMeasure => {
                    let beats = tempo.adjust_beats_per_measure(ticks);
                    debug!("Dial {:+} on {}: {} beats per measure", ticks, context, beats);
                }
                EditMode::Accent => {
                    let pattern = tempo.adjust_accent_pattern(ticks);
                    debug!("Dial {:+} on {}: accent {:?}", ticks, context, pattern);
                }
            }
        }

        if mode == EditMode::Tempo {
            self.update_interval();
        }
        self.render_all();
    }

    pub fn on_mode_toggle(&mut self, context: &str) {
        if !self.has_session(context) {
            return;
        }

        let mode = self.tempo.borrow_mut().cycle_edit_mode();
        debug!("Edit mode is now {:?}", mode);

        let contexts: Vec<ContextId> = self.sessions.keys().cloned().collect();
        for context in &contexts {
            self.host.set_feedback_layout(context, mode.layout());
        }
        self.render_all();
    }

    pub fn on_run_toggle(&mut self, context: &str) {
        self.on_run_toggle_at(context, Instant::now());
    }

    /// Starts or stops the metronome as of `now`.
    pub fn on_run_toggle_at(&mut self, context: &str, now: Instant) {
        if !self.has_session(context) {
            return;
        }

        let was_running = self.tempo.borrow().is_running();
        // Counter resets before the immediate first click reads it.
        self.tempo.borrow_mut().set_running(!was_running);

        if was_running {
            self.metronome.stop();
            info!("Metronome stopped");
        } else {
            self.metronome.start(now);
            info!("Metronome started at {} bpm", self.tempo.borrow().bpm());
        }
    }

    /// Pushes the current value to one panel and persists its settings.
    pub fn render(&mut self, context: &str) {
        let Some(session) = self.sessions.get(context) else {
            return;
        };

        let (feedback, settings) = {
            let tempo = session.tempo();
            let feedback: Feedback = display::render(&tempo);
            let settings = PersistedSettings::capture(&tempo, &feedback);
            (feedback, settings)
        };
        debug!("Render {}: {} ({:.2})", context, feedback.value, feedback.indicator);

        self.host.set_feedback(context, &feedback);
        self.host.set_settings(context, &settings);
    }

    /// Stops playback. Called when the host goes away.
    pub fn shutdown(&mut self) {
        self.metronome.stop();
        self.tempo.borrow_mut().set_running(false);
        self.sessions.clear();
        info!("Metronome controller shut down");
    }

    fn render_all(&mut self) {
        let contexts: Vec<ContextId> = self.sessions.keys().cloned().collect();
        for context in &contexts {
            self.render(context);
        }
    }

    fn update_interval(&mut self) {
        let interval = self.tempo.borrow().beat_interval();
        self.metronome.set_interval(interval);
    }

    fn has_session(&self, context: &str) -> bool {
        let known = self.sessions.contains_key(context);
        if !known {
            debug!("Ignoring input for unknown panel {}", context);
        }
        known
    }
}
