#![allow(dead_code)]

use metrodeck::{AccessoryHost, Click, ClickPlayer, Feedback, PersistedSettings};
use std::sync::{Arc, Mutex};

pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Host call captured by [`RecordingHost`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    GetSettings(String),
    Layout(String, String),
    Feedback(String, Feedback),
    Settings(String, PersistedSettings),
}

#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub calls: Arc<Mutex<Vec<HostCall>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn last_feedback(&self, context: &str) -> Option<Feedback> {
        self.calls().into_iter().rev().find_map(|call| match call {
            HostCall::Feedback(c, feedback) if c == context => Some(feedback),
            _ => None,
        })
    }

    pub fn last_settings(&self, context: &str) -> Option<PersistedSettings> {
        self.calls().into_iter().rev().find_map(|call| match call {
            HostCall::Settings(c, settings) if c == context => Some(settings),
            _ => None,
        })
    }

    pub fn layouts(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Layout(c, layout) => Some((c, layout)),
                _ => None,
            })
            .collect()
    }
}

impl AccessoryHost for RecordingHost {
    fn get_settings(&mut self, context: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::GetSettings(context.to_string()));
    }

    fn set_feedback_layout(&mut self, context: &str, layout: &str) {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::Layout(context.to_string(), layout.to_string()));
    }

    fn set_feedback(&mut self, context: &str, feedback: &Feedback) {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::Feedback(context.to_string(), feedback.clone()));
    }

    fn set_settings(&mut self, context: &str, settings: &PersistedSettings) {
        self.calls
            .lock()
            .unwrap()
            .push(HostCall::Settings(context.to_string(), settings.clone()));
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecordingPlayer {
    pub clicks: Arc<Mutex<Vec<Click>>>,
}

impl RecordingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clicks(&self) -> Vec<Click> {
        self.clicks.lock().unwrap().clone()
    }
}

impl ClickPlayer for RecordingPlayer {
    fn play(&mut self, click: Click) {
        self.clicks.lock().unwrap().push(click);
    }
}
