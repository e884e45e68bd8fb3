// ── Light domain types ──
//
// A light has at most one colour representation at a time, and its
// brightness stays inside [0, 100]. `LightUpdate` is the partial payload
// used for optimistic overlays and bridge writes alike.

use serde::{Deserialize, Serialize};

pub const MIN_BRIGHTNESS: f64 = 0.0;
pub const MAX_BRIGHTNESS: f64 = 100.0;

/// CIE 1931 chromaticity coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Xy {
    pub x: f64,
    pub y: f64,
}

impl Xy {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The active colour representation of a light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LightColor {
    Xy(Xy),
    Temperature { mirek: u16 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub id: String,
    pub name: String,
    pub archetype: Option<String>,
    pub on: bool,
    /// Percent, `None` for non-dimmable lights.
    pub brightness: Option<f64>,
    pub color: Option<LightColor>,
}

impl Light {
    /// Copy of this light with `update` overlaid.
    ///
    /// Per-field merge over {on, brightness, color}: a field present in the
    /// update replaces the current value, an absent field is preserved.
    pub fn merged(&self, update: &LightUpdate) -> Light {
        let mut light = self.clone();
        light.apply(update);
        light
    }

    /// In-place form of [`merged`](Self::merged).
    pub fn apply(&mut self, update: &LightUpdate) {
        if let Some(on) = update.on {
            self.on = on;
        }
        if let Some(brightness) = update.brightness {
            self.brightness = Some(brightness);
        }
        if let Some(color) = update.color {
            self.color = Some(color);
        }
    }

    /// Brightness for aggregation: absent counts as zero.
    pub fn brightness_or_zero(&self) -> f64 {
        self.brightness.unwrap_or(MIN_BRIGHTNESS)
    }
}

/// Clamp a brightness percentage into range. NaN becomes zero.
pub fn clamp_brightness(value: f64) -> f64 {
    if value.is_nan() {
        MIN_BRIGHTNESS
    } else {
        value.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS)
    }
}

/// Partial light state.
///
/// Built with the `with_*` methods. Setting an xy colour drops a pending
/// colour temperature and vice versa, so an update never carries both.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LightUpdate {
    on: Option<bool>,
    brightness: Option<f64>,
    color: Option<LightColor>,
}

impl LightUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for an on/off-only update.
    pub fn power(on: bool) -> Self {
        Self::new().with_on(on)
    }

    pub fn with_on(mut self, on: bool) -> Self {
        self.on = Some(on);
        self
    }

    pub fn with_brightness(mut self, brightness: f64) -> Self {
        self.brightness = Some(clamp_brightness(brightness));
        self
    }

    pub fn with_xy(mut self, xy: Xy) -> Self {
        self.color = Some(LightColor::Xy(xy));
        self
    }

    pub fn with_mirek(mut self, mirek: u16) -> Self {
        self.color = Some(LightColor::Temperature { mirek });
        self
    }

    pub fn with_color(mut self, color: LightColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn on(&self) -> Option<bool> {
        self.on
    }

    pub fn brightness(&self) -> Option<f64> {
        self.brightness
    }

    pub fn color(&self) -> Option<LightColor> {
        self.color
    }

    pub fn is_empty(&self) -> bool {
        self.on.is_none() && self.brightness.is_none() && self.color.is_none()
    }
}
