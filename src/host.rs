//! Accessory host interface.
//!
//! The host owns the physical panel: it tells the controller when a panel
//! appears or receives input, and the controller calls back to draw feedback
//! and persist settings.

use crate::display::Feedback;
use crate::settings::PersistedSettings;
use serde::{Deserialize, Serialize};

/// Opaque per-panel handle assigned by the host.
pub type ContextId = String;

/// Kind of control the accessory is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    /// Dial with a touch strip and a feedback panel.
    #[default]
    Encoder,
    /// Plain key showing an icon.
    Keypad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelGeometry {
    pub width: u32,
    pub height: u32,
    pub scale: u32,
    pub icon_size: u32,
}

impl PanelGeometry {
    const SCALE: u32 = 2;
    const BASE_ICON_SIZE: u32 = 48;

    pub fn for_controller(kind: ControllerKind) -> Self {
        let (width, height) = match kind {
            ControllerKind::Encoder => (100, 50),
            ControllerKind::Keypad => (144, 144),
        };
        Self {
            width,
            height,
            scale: Self::SCALE,
            icon_size: Self::BASE_ICON_SIZE * Self::SCALE,
        }
    }
}

/// Calls the controller makes into the host. None of them report failure
/// back; a host that cannot deliver logs and moves on.
pub trait AccessoryHost {
    /// Ask for the persisted settings of `context`. The answer arrives later
    /// as a settings event.
    fn get_settings(&mut self, context: &str);

    fn set_feedback_layout(&mut self, context: &str, layout: &str);

    fn set_feedback(&mut self, context: &str, feedback: &Feedback);

    fn set_settings(&mut self, context: &str, settings: &PersistedSettings);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_per_controller() {
        let encoder = PanelGeometry::for_controller(ControllerKind::Encoder);
        assert_eq!((encoder.width, encoder.height), (100, 50));
        let keypad = PanelGeometry::for_controller(ControllerKind::Keypad);
        assert_eq!((keypad.width, keypad.height), (144, 144));
        assert_eq!(keypad.icon_size, 96);
    }
}
