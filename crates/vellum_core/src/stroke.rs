//! Stroke outline enums

/// Predefined dash patterns, expressed in multiples of the stroke width
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DashStyle {
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
    DashDotDot,
    /// The pattern comes from a caller-supplied dash array
    Custom,
}

impl DashStyle {
    /// Alternating on/off lengths for the predefined styles.
    ///
    /// `Solid` and `Custom` have no intrinsic pattern.
    pub fn intervals(self) -> Option<&'static [f32]> {
        match self {
            DashStyle::Solid | DashStyle::Custom => None,
            DashStyle::Dash => Some(&[2.0, 2.0]),
            DashStyle::Dot => Some(&[0.0, 2.0]),
            DashStyle::DashDot => Some(&[2.0, 2.0, 0.0, 2.0]),
            DashStyle::DashDotDot => Some(&[2.0, 2.0, 0.0, 2.0, 0.0, 2.0]),
        }
    }
}

/// Shape drawn at the end of an open stroke or of each dash
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CapStyle {
    #[default]
    Flat,
    Square,
    Round,
    Triangle,
}

impl CapStyle {
    /// How far past the end of a segment the cap reaches, as a fraction of the width.
    pub fn extent(self) -> f32 {
        match self {
            CapStyle::Flat => 0.0,
            CapStyle::Square | CapStyle::Round | CapStyle::Triangle => 0.5,
        }
    }
}
