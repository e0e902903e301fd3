//! Font description and the text shaping seam
//!
//! Shaping, measurement and glyph outline extraction live outside the paint
//! core. The core only needs a [`TextShaper`] that answers two pure questions:
//! how big is this text, and what does its outline look like.

use crate::geometry::{Point, Size};
use crate::modes::Dpi;
use thiserror::Error;

/// Font weight on the usual 100-950 scale
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontWeight {
    Thin,
    ExtraLight,
    Light,
    #[default]
    Normal,
    Medium,
    SemiBold,
    Bold,
    ExtraBold,
    Black,
}

impl FontWeight {
    pub fn value(self) -> u16 {
        match self {
            FontWeight::Thin => 100,
            FontWeight::ExtraLight => 200,
            FontWeight::Light => 300,
            FontWeight::Normal => 400,
            FontWeight::Medium => 500,
            FontWeight::SemiBold => 600,
            FontWeight::Bold => 700,
            FontWeight::ExtraBold => 800,
            FontWeight::Black => 900,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontStyle {
    #[default]
    Normal,
    Oblique,
    Italic,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FontStretch {
    UltraCondensed,
    ExtraCondensed,
    Condensed,
    SemiCondensed,
    #[default]
    Normal,
    SemiExpanded,
    Expanded,
    ExtraExpanded,
    UltraExpanded,
}

/// Horizontal placement of lines within the layout box
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextAlignment {
    #[default]
    Leading,
    Trailing,
    Center,
    Justified,
}

/// Vertical placement of the paragraph within the layout box
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParagraphAlignment {
    #[default]
    Near,
    Far,
    Center,
}

/// Everything needed to pick and size a face
#[derive(Clone, Debug, PartialEq)]
pub struct FontDescriptor {
    pub family: String,
    pub size: f32,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub stretch: FontStretch,
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: FontWeight::default(),
            style: FontStyle::default(),
            stretch: FontStretch::default(),
        }
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_stretch(mut self, stretch: FontStretch) -> Self {
        self.stretch = stretch;
        self
    }
}

/// Failure reported by a [`TextShaper`]
#[derive(Error, Debug, Clone, PartialEq)]
#[error("text shaping failed: {0}")]
pub struct ShapingError(pub String);

/// Receives glyph outlines in layout space (y-down, origin at the top-left of the line box)
pub trait OutlineSink {
    fn move_to(&mut self, to: Point);
    fn line_to(&mut self, to: Point);
    fn quad_to(&mut self, control: Point, to: Point);
    fn cubic_to(&mut self, control1: Point, control2: Point, to: Point);
    fn close(&mut self);
}

/// The text shaping collaborator
pub trait TextShaper {
    /// Size of `text` laid out inside `constraint`.
    ///
    /// An empty string measures as [`Size::ZERO`].
    fn measure(
        &self,
        text: &str,
        font: &FontDescriptor,
        constraint: Size,
        dpi: Dpi,
    ) -> Result<Size, ShapingError>;

    /// Emit the glyph outlines of `text` as a single line.
    fn outline(
        &self,
        text: &str,
        font: &FontDescriptor,
        sink: &mut dyn OutlineSink,
    ) -> Result<(), ShapingError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_descriptor_defaults() {
        let font = FontDescriptor::new("Inter", 12.0).with_weight(FontWeight::Bold);
        assert_eq!(font.weight.value(), 700);
        assert_eq!(font.style, FontStyle::Normal);
        assert_eq!(font.stretch, FontStretch::Normal);
    }
}
