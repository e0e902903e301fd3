//! Font-backed text shaping for Vellum
//!
//! This crate provides:
//! - Font loading and metrics (TTF/OTF via ttf-parser)
//! - Greedy line wrapping over glyph advances
//! - A [`FontShaper`] implementing [`vellum_core::TextShaper`], so a
//!   `ResourceDevice` can measure text and build text outline geometry

pub mod font;
pub mod shaper;
pub mod wrap;

pub use font::{FontFace, FontMetrics};
pub use shaper::FontShaper;
pub use wrap::{snap_to_device, wrap_lines, WrappedLine};

use thiserror::Error;
use vellum_core::ShapingError;

/// Text shaping errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TextError {
    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Font has no family name")]
    MissingFamilyName,

    #[error("No font loaded for family '{0}'")]
    NoFont(String),
}

pub type Result<T> = std::result::Result<T, TextError>;

impl From<TextError> for ShapingError {
    fn from(err: TextError) -> Self {
        ShapingError(err.to_string())
    }
}
