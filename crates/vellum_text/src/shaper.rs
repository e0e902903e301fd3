//! A [`TextShaper`] over loaded font files
//!
//! Glyphs are placed by their horizontal advances without kerning or complex
//! shaping. Faces are looked up by family name only; weight, style and
//! stretch of the requested font are not matched.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};
use vellum_core::{Dpi, FontDescriptor, OutlineSink, ShapingError, Size, TextShaper};

use crate::font::{advance_units, glyph_for, FontFace, SinkAdapter};
use crate::wrap::{snap_to_device, wrap_lines};
use crate::{Result, TextError};

/// Text shaper backed by font files registered by family
#[derive(Default)]
pub struct FontShaper {
    /// Faces keyed by lowercased family name
    faces: FxHashMap<String, Arc<FontFace>>,
    /// The first loaded face, used for unknown families
    fallback: Option<Arc<FontFace>>,
}

impl FontShaper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a font under the family name stored in the file.
    ///
    /// Returns that family name.
    pub fn add_font(&mut self, data: impl Into<Arc<[u8]>>) -> Result<String> {
        let face = FontFace::from_bytes(data, 0)?;
        let family = face.family().to_owned();
        self.insert(&family, face);
        Ok(family)
    }

    /// Register a font under an explicit family name.
    pub fn add_font_as(&mut self, family: &str, data: impl Into<Arc<[u8]>>) -> Result<()> {
        let face = FontFace::from_bytes(data, 0)?;
        self.insert(family, face);
        Ok(())
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.faces.contains_key(&family.to_lowercase())
    }

    pub fn families(&self) -> Vec<String> {
        let mut families: Vec<String> = self
            .faces
            .values()
            .map(|face| face.family().to_owned())
            .collect();
        families.sort();
        families.dedup();
        families
    }

    fn insert(&mut self, family: &str, face: FontFace) {
        debug!("Loaded font '{}' as family '{}'", face.family(), family);
        let face = Arc::new(face);
        if self.fallback.is_none() {
            self.fallback = Some(Arc::clone(&face));
        }
        self.faces.insert(family.to_lowercase(), face);
    }

    fn resolve(&self, family: &str) -> Result<&FontFace> {
        if let Some(face) = self.faces.get(&family.to_lowercase()) {
            return Ok(face);
        }
        match &self.fallback {
            Some(face) => {
                trace!("No font for '{}', using '{}'", family, face.family());
                Ok(face)
            }
            None => Err(TextError::NoFont(family.to_owned())),
        }
    }
}

impl TextShaper for FontShaper {
    fn measure(
        &self,
        text: &str,
        font: &FontDescriptor,
        constraint: Size,
        dpi: Dpi,
    ) -> std::result::Result<Size, ShapingError> {
        if text.is_empty() {
            return Ok(Size::ZERO);
        }

        let face = self.resolve(&font.family)?;
        let metrics = face.metrics();
        let scale = metrics.scale(font.size);

        let lines = face.with_face(|f| {
            wrap_lines(text, constraint.width, |c| {
                f32::from(advance_units(f, c)) * scale
            })
        })?;

        let width = lines.iter().map(|line| line.width).fold(0.0, f32::max);
        let height = lines.len() as f32 * metrics.line_height(font.size);

        // Round up to whole device pixels so the box never clips a glyph
        let (sx, sy) = dpi.scale_factor();
        Ok(Size::new(
            snap_to_device(width, sx),
            snap_to_device(height, sy),
        ))
    }

    fn outline(
        &self,
        text: &str,
        font: &FontDescriptor,
        sink: &mut dyn OutlineSink,
    ) -> std::result::Result<(), ShapingError> {
        let face = self.resolve(&font.family)?;
        let metrics = face.metrics();
        let scale = metrics.scale(font.size);
        let baseline = metrics.ascent(font.size);

        face.with_face(|f| {
            let mut pen_x = 0.0;
            for c in text.chars().filter(|c| !c.is_control()) {
                let mut adapter = SinkAdapter {
                    sink: &mut *sink,
                    scale,
                    origin_x: pen_x,
                    baseline,
                };
                // Glyphs without an outline (spaces) only advance the pen
                f.outline_glyph(glyph_for(f, c), &mut adapter);
                pen_x += f32::from(advance_units(f, c)) * scale;
            }
        })?;
        Ok(())
    }
}

impl std::fmt::Debug for FontShaper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontShaper")
            .field("families", &self.families())
            .finish()
    }
}
