//! Rendering quality modes and display scale

use serde::{Deserialize, Serialize};

/// Geometry antialiasing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AntialiasMode {
    #[default]
    PerPrimitive,
    Aliased,
}

impl AntialiasMode {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            AntialiasMode::PerPrimitive
        } else {
            AntialiasMode::Aliased
        }
    }

    pub fn is_enabled(self) -> bool {
        self == AntialiasMode::PerPrimitive
    }
}

/// Text antialiasing
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAntialiasMode {
    #[default]
    Default,
    ClearType,
    Grayscale,
    Aliased,
}

/// Sampling used when a bitmap is scaled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum InterpolationMode {
    NearestNeighbor,
    #[default]
    Linear,
}

/// Dots per inch on each axis; 96 is unscaled
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Dpi {
    pub x: f32,
    pub y: f32,
}

impl Dpi {
    pub const DEFAULT: Dpi = Dpi { x: 96.0, y: 96.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Scale factor relative to 96 DPI, falling back to 1.0 for nonsense values.
    pub fn scale_factor(&self) -> (f32, f32) {
        let sanitize = |v: f32| {
            if v.is_finite() && v > 0.0 {
                v / 96.0
            } else {
                1.0
            }
        };
        (sanitize(self.x), sanitize(self.y))
    }
}

impl Default for Dpi {
    fn default() -> Self {
        Self::DEFAULT
    }
}
