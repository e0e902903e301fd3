//! Loaded font faces and their metrics

use std::sync::Arc;

use ttf_parser::{name_id, Face, GlyphId, OutlineBuilder};

use crate::{Result, TextError};

/// Vertical metrics in font units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
}

impl FontMetrics {
    /// Scale from font units to layout units at `font_size`
    pub fn scale(&self, font_size: f32) -> f32 {
        font_size / f32::from(self.units_per_em.max(1))
    }

    pub fn ascent(&self, font_size: f32) -> f32 {
        f32::from(self.ascender) * self.scale(font_size)
    }

    /// Distance between consecutive baselines
    pub fn line_height(&self, font_size: f32) -> f32 {
        let units = i32::from(self.ascender) - i32::from(self.descender) + i32::from(self.line_gap);
        units as f32 * self.scale(font_size)
    }
}

/// A parsed font file kept alive with its raw bytes
///
/// `ttf_parser::Face` borrows the data, so the face is re-parsed on demand;
/// parsing only reads the table directory.
pub struct FontFace {
    data: Arc<[u8]>,
    index: u32,
    family: String,
    metrics: FontMetrics,
}

impl FontFace {
    /// Parse face `index` of a font file or collection.
    pub fn from_bytes(data: impl Into<Arc<[u8]>>, index: u32) -> Result<Self> {
        let data = data.into();
        let face = Face::parse(&data, index)
            .map_err(|e| TextError::FontParseError(e.to_string()))?;

        let family = face
            .names()
            .into_iter()
            .filter(|name| {
                name.name_id == name_id::TYPOGRAPHIC_FAMILY || name.name_id == name_id::FAMILY
            })
            .find_map(|name| name.to_string())
            .ok_or(TextError::MissingFamilyName)?;

        let metrics = FontMetrics {
            units_per_em: face.units_per_em(),
            ascender: face.ascender(),
            descender: face.descender(),
            line_gap: face.line_gap(),
        };

        Ok(Self {
            data: Arc::clone(&data),
            index,
            family,
            metrics,
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    /// Run `f` against the parsed face.
    pub fn with_face<T>(&self, f: impl FnOnce(&Face<'_>) -> T) -> Result<T> {
        let face = Face::parse(&self.data, self.index)
            .map_err(|e| TextError::FontParseError(e.to_string()))?;
        Ok(f(&face))
    }
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("index", &self.index)
            .field("metrics", &self.metrics)
            .finish()
    }
}

/// Glyph for `c`, falling back to `.notdef`
pub(crate) fn glyph_for(face: &Face<'_>, c: char) -> GlyphId {
    face.glyph_index(c).unwrap_or(GlyphId(0))
}

/// Horizontal advance of `c` in font units
pub(crate) fn advance_units(face: &Face<'_>, c: char) -> u16 {
    face.glyph_hor_advance(glyph_for(face, c)).unwrap_or(0)
}

/// Adapts ttf-parser outline callbacks (font units, y-up) to a layout-space sink
pub(crate) struct SinkAdapter<'s> {
    pub(crate) sink: &'s mut dyn vellum_core::OutlineSink,
    pub(crate) scale: f32,
    pub(crate) origin_x: f32,
    pub(crate) baseline: f32,
}

impl SinkAdapter<'_> {
    fn map(&self, x: f32, y: f32) -> vellum_core::Point {
        vellum_core::Point::new(self.origin_x + x * self.scale, self.baseline - y * self.scale)
    }
}

impl OutlineBuilder for SinkAdapter<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.sink.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.sink.line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (c, p) = (self.map(x1, y1), self.map(x, y));
        self.sink.quad_to(c, p);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (c1, c2, p) = (self.map(x1, y1), self.map(x2, y2), self.map(x, y));
        self.sink.cubic_to(c1, c2, p);
    }

    fn close(&mut self) {
        self.sink.close();
    }
}
