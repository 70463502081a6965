//! Light and group state types

use serde::{Deserialize, Serialize};

/// Computed per-light target: on at a definite brightness, or off
///
/// Brightness 0 never appears inside `On`; an offset that drives a
/// light to zero or below produces `Off` instead, so accent lights can
/// fully extinguish at low group levels rather than being clamped up
/// to their minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightTarget {
    /// Light on at the given brightness (1-100, within the member's clamp bounds)
    On { brightness: u8 },
    /// Light off
    Off,
}

impl LightTarget {
    pub fn is_on(&self) -> bool {
        matches!(self, LightTarget::On { .. })
    }

    /// Target brightness, if on
    pub fn brightness(&self) -> Option<u8> {
        match self {
            LightTarget::On { brightness } => Some(*brightness),
            LightTarget::Off => None,
        }
    }
}

/// Opaque color payload, passed through to member lights unchanged
///
/// This system never transforms color, only brightness; the variants
/// cover the representations member lights commonly report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Color {
    /// Hue (degrees) and saturation (percent)
    Hs { hue: f64, saturation: f64 },
    Rgb { r: u8, g: u8, b: u8 },
    Rgbw { r: u8, g: u8, b: u8, w: u8 },
    Rgbww { r: u8, g: u8, b: u8, cw: u8, ww: u8 },
    /// CIE xy chromaticity
    Xy { x: f64, y: f64 },
}

/// Observed state of one member light
///
/// Delivered by the host's state-change notifications. `brightness`
/// may be absent even when on (e.g. a light that reports only on/off).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightState {
    pub on: bool,
    pub brightness: Option<u8>,
    pub color: Option<Color>,
    /// Color temperature in mireds
    pub color_temp: Option<u16>,
}

impl LightState {
    /// An off state
    pub fn off() -> Self {
        Self {
            on: false,
            brightness: None,
            color: None,
            color_temp: None,
        }
    }

    /// An on state at the given brightness
    pub fn on(brightness: u8) -> Self {
        Self {
            on: true,
            brightness: Some(brightness),
            color: None,
            color_temp: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_color_temp(mut self, mireds: u16) -> Self {
        self.color_temp = Some(mireds);
        self
    }

    /// Whether this observed state matches a commanded target
    ///
    /// Compared on power and brightness only. Color is pass-through
    /// and devices commonly echo it in a different representation, so
    /// it cannot take part in the comparison.
    pub fn matches_target(&self, target: &LightTarget) -> bool {
        match target {
            LightTarget::On { brightness } => self.on && self.brightness == Some(*brightness),
            LightTarget::Off => !self.on,
        }
    }
}

/// Representative state reported for the group as a whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupState {
    /// On if any member is on
    pub on: bool,
    /// Brightness of the reference member, if any member is on
    pub brightness: Option<u8>,
    pub color: Option<Color>,
    pub color_temp: Option<u16>,
}

impl GroupState {
    /// The all-off group state
    pub fn off() -> Self {
        Self {
            on: false,
            brightness: None,
            color: None,
            color_temp: None,
        }
    }
}
