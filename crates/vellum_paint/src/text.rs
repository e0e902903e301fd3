//! Text formats, text layouts and glyph outline capture

use vellum_core::{
    BezierSegment, FontDescriptor, OutlineSink, ParagraphAlignment, Point, Size, TextAlignment,
};

use crate::error::{PaintError, Result};
use crate::geometry::PathGeometry;
use crate::resource::{impl_device_resource, ResourceHandle};

/// Reusable font plus alignment
pub struct TextFormat {
    pub(crate) handle: ResourceHandle,
    font: FontDescriptor,
    alignment: TextAlignment,
    paragraph: ParagraphAlignment,
}

impl_device_resource!(TextFormat);

impl TextFormat {
    pub(crate) fn new(
        handle: ResourceHandle,
        font: FontDescriptor,
        alignment: TextAlignment,
        paragraph: ParagraphAlignment,
    ) -> Self {
        Self {
            handle,
            font,
            alignment,
            paragraph,
        }
    }

    pub fn font(&self) -> &FontDescriptor {
        &self.font
    }

    pub fn alignment(&self) -> TextAlignment {
        self.alignment
    }

    pub fn paragraph_alignment(&self) -> ParagraphAlignment {
        self.paragraph
    }
}

impl std::fmt::Debug for TextFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextFormat")
            .field("handle", &self.handle)
            .field("font", &self.font)
            .finish()
    }
}

/// Pre-laid-out text bound to a format and a maximum size
pub struct TextLayout {
    pub(crate) handle: ResourceHandle,
    text: String,
    font: FontDescriptor,
    max_size: Size,
}

impl_device_resource!(TextLayout);

impl TextLayout {
    pub(crate) fn new(
        handle: ResourceHandle,
        text: String,
        font: FontDescriptor,
        max_size: Size,
    ) -> Self {
        Self {
            handle,
            text,
            font,
            max_size,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font(&self) -> &FontDescriptor {
        &self.font
    }

    pub fn max_size(&self) -> Size {
        self.max_size
    }
}

impl std::fmt::Debug for TextLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextLayout")
            .field("handle", &self.handle)
            .field("text", &self.text)
            .field("max_size", &self.max_size)
            .finish()
    }
}

/// Feeds shaper outlines into an open [`PathGeometry`]
///
/// The sink trait is infallible, so the first geometry error is kept and
/// reported by [`GeometrySink::finish`].
pub(crate) struct GeometrySink<'g> {
    geometry: &'g mut PathGeometry,
    origin: Point,
    current: Point,
    error: Option<PaintError>,
}

impl<'g> GeometrySink<'g> {
    pub(crate) fn new(geometry: &'g mut PathGeometry, origin: Point) -> Self {
        Self {
            geometry,
            origin,
            current: origin,
            error: None,
        }
    }

    fn place(&self, p: Point) -> Point {
        p.offset(self.origin.x, self.origin.y)
    }

    fn record(&mut self, result: Result<()>) {
        if let Err(err) = result {
            self.error.get_or_insert(err);
        }
    }

    pub(crate) fn finish(self) -> Result<()> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl OutlineSink for GeometrySink<'_> {
    fn move_to(&mut self, to: Point) {
        let to = self.place(to);
        self.current = to;
        let result = self.geometry.set_start_point(to);
        self.record(result);
    }

    fn line_to(&mut self, to: Point) {
        let to = self.place(to);
        self.current = to;
        let result = self.geometry.add_line(to);
        self.record(result);
    }

    fn quad_to(&mut self, control: Point, to: Point) {
        let (control, to) = (self.place(control), self.place(to));
        let segment = BezierSegment::from_quadratic(self.current, control, to);
        self.current = to;
        let result = self.geometry.add_bezier(segment);
        self.record(result);
    }

    fn cubic_to(&mut self, control1: Point, control2: Point, to: Point) {
        let segment =
            BezierSegment::new(self.place(control1), self.place(control2), self.place(to));
        self.current = segment.end;
        let result = self.geometry.add_bezier(segment);
        self.record(result);
    }

    fn close(&mut self) {
        let result = self.geometry.close_figure();
        self.record(result);
    }
}
