//! Group-level and per-light command types

use deltalux_model::{Color, LightId, LightTarget};
use serde::{Deserialize, Serialize};

/// Requested power state for a group command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Power {
    On,
    Off,
}

/// A command addressed to the group as a whole
///
/// Brightness is the group level (0-100); omitting it on a turn-on
/// reuses the last commanded level. Color, color temperature and
/// transition are forwarded to every member unchanged.
///
/// # Example
///
/// ```rust
/// use deltalux_sync::GroupCommand;
///
/// let cmd = GroupCommand::turn_on().with_brightness(50);
/// assert_eq!(cmd.brightness, Some(50));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupCommand {
    pub power: Power,
    /// Group-level brightness, 0-100 (0 behaves like a turn-off)
    pub brightness: Option<u8>,
    pub color: Option<Color>,
    /// Color temperature in mireds
    pub color_temp: Option<u16>,
    /// Transition time in seconds, forwarded unchanged
    pub transition: Option<f32>,
}

impl GroupCommand {
    /// A turn-on command with no attribute changes
    pub fn turn_on() -> Self {
        Self {
            power: Power::On,
            brightness: None,
            color: None,
            color_temp: None,
            transition: None,
        }
    }

    /// A turn-off command
    pub fn turn_off() -> Self {
        Self {
            power: Power::Off,
            brightness: None,
            color: None,
            color_temp: None,
            transition: None,
        }
    }

    pub fn with_brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_color_temp(mut self, mireds: u16) -> Self {
        self.color_temp = Some(mireds);
        self
    }

    pub fn with_transition(mut self, seconds: f32) -> Self {
        self.transition = Some(seconds);
        self
    }
}

/// A command addressed to one member light
///
/// Produced by the coordinator from a [`GroupCommand`] via the offset
/// mapping, and handed to the injected light-control interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightCommand {
    pub id: LightId,
    pub target: LightTarget,
    pub color: Option<Color>,
    pub color_temp: Option<u16>,
    pub transition: Option<f32>,
}
