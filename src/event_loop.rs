// event_loop.rs

use crate::controller::MetronomeController;
use crate::host::{AccessoryHost, ContextId, ControllerKind, PanelGeometry};
use crossbeam::channel::{self, Receiver};
use log::{debug, info};
use serde_json::Value;
use std::time::Instant;

/// Everything the host can tell the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    WillAppear {
        context: ContextId,
        controller: ControllerKind,
    },
    WillDisappear {
        context: ContextId,
    },
    DidReceiveSettings {
        context: ContextId,
        settings: Value,
    },
    DialRotate {
        context: ContextId,
        ticks: i32,
    },
    DialDown {
        context: ContextId,
    },
    /// `hold` is true when the touch began a long press; only the release
    /// (`hold == false`) toggles playback.
    TouchTap {
        context: ContextId,
        hold: bool,
    },
    Shutdown,
}

/// Routes one host event to the controller. Returns false once the host
/// asked to shut down.
pub fn dispatch<H: AccessoryHost>(
    controller: &mut MetronomeController<H>,
    event: HostEvent,
    now: Instant,
) -> bool {
    debug!("Host event: {:?}", event);
    match event {
        HostEvent::WillAppear {
            context,
            controller: kind,
        } => controller.on_appear(context, PanelGeometry::for_controller(kind)),
        HostEvent::WillDisappear { context } => controller.on_disappear(&context),
        HostEvent::DidReceiveSettings { context, settings } => {
            controller.on_settings_received(&context, &settings)
        }
        HostEvent::DialRotate { context, ticks } => controller.on_rotate(&context, ticks),
        HostEvent::DialDown { context } => controller.on_mode_toggle(&context),
        HostEvent::TouchTap { context, hold } => {
            if hold {
                debug!("Ignoring hold on {}", context);
            } else {
                controller.on_run_toggle_at(&context, now);
            }
        }
        HostEvent::Shutdown => return false,
    }
    true
}

/// Single-threaded loop: waits for either the next host event or the next
/// click deadline, whichever comes first.
pub struct EventLoop<H: AccessoryHost> {
    controller: MetronomeController<H>,
    event_rx: Receiver<HostEvent>,
}

impl<H: AccessoryHost> EventLoop<H> {
    pub fn new(controller: MetronomeController<H>, event_rx: Receiver<HostEvent>) -> Self {
        EventLoop {
            controller,
            event_rx,
        }
    }

    pub fn controller(&self) -> &MetronomeController<H> {
        &self.controller
    }

    /// Runs until a shutdown event arrives or every sender is dropped, then
    /// stops the metronome and hands the controller back.
    pub fn run(mut self) -> MetronomeController<H> {
        info!("Event loop started");
        loop {
            let timer = match self.controller.next_deadline() {
                Some(deadline) => channel::at(deadline),
                None => channel::never(),
            };

            crossbeam::select! {
                recv(self.event_rx) -> msg => match msg {
                    Ok(event) => {
                        if !dispatch(&mut self.controller, event, Instant::now()) {
                            info!("Shutdown requested");
                            break;
                        }
                    }
                    Err(_) => {
                        info!("Host event channel closed");
                        break;
                    }
                },
                recv(timer) -> _ => {
                    self.controller.poll(Instant::now());
                }
            }
        }

        self.controller.shutdown();
        self.controller
    }
}
