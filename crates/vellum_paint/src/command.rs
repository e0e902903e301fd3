//! Canonical draw commands and per-call options
//!
//! The session resolves every public overload (coordinate vs point forms,
//! bounding box vs center+radii, omitted weights and dash styles) into exactly
//! one [`DrawCommand`] before it reaches the backend. Backends and test
//! recorders only ever see this normalized form.

use std::sync::Arc;

use smallvec::SmallVec;
use vellum_core::{
    Affine2D, AntialiasMode, BezierSegment, CapStyle, Color, DashStyle, Ellipse, FontDescriptor,
    InterpolationMode, ParagraphAlignment, Point, Rect, RoundedRect, TextAlignment,
    TextAntialiasMode,
};

use crate::geometry::PathData;
use crate::resource::ResourceId;

/// Outline parameters for stroking calls
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeOptions {
    pub width: f32,
    pub dash_style: DashStyle,
    pub start_cap: CapStyle,
    pub end_cap: CapStyle,
    pub dash_cap: CapStyle,
    pub miter_limit: f32,
    pub dash_offset: f32,
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self {
            width: 1.0,
            dash_style: DashStyle::Solid,
            start_cap: CapStyle::Flat,
            end_cap: CapStyle::Flat,
            dash_cap: CapStyle::Round,
            miter_limit: 10.0,
            dash_offset: 0.0,
        }
    }
}

impl StrokeOptions {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            ..Default::default()
        }
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn with_dash_style(mut self, dash_style: DashStyle) -> Self {
        self.dash_style = dash_style;
        self
    }

    pub fn with_caps(mut self, start: CapStyle, end: CapStyle) -> Self {
        self.start_cap = start;
        self.end_cap = end;
        self
    }

    pub fn with_dash_cap(mut self, cap: CapStyle) -> Self {
        self.dash_cap = cap;
        self
    }

    pub fn with_dash_offset(mut self, offset: f32) -> Self {
        self.dash_offset = offset;
        self
    }
}

/// Options for bitmap draws
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BitmapOptions {
    pub opacity: f32,
    pub interpolation: InterpolationMode,
    /// Region of the bitmap to draw; `None` means all of it
    pub source: Option<Rect>,
}

impl Default for BitmapOptions {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            interpolation: InterpolationMode::Linear,
            source: None,
        }
    }
}

impl BitmapOptions {
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_interpolation(mut self, interpolation: InterpolationMode) -> Self {
        self.interpolation = interpolation;
        self
    }

    pub fn with_source(mut self, source: Rect) -> Self {
        self.source = Some(source);
        self
    }
}

/// Placement of text inside its layout box
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextOptions {
    pub alignment: TextAlignment,
    pub paragraph: ParagraphAlignment,
}

impl TextOptions {
    pub fn centered() -> Self {
        Self {
            alignment: TextAlignment::Center,
            paragraph: ParagraphAlignment::Center,
        }
    }
}

/// Opaque platform image handle passed through to the backend untouched
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NativeBitmapHandle(pub u64);

/// A fill source after validation
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Fill {
    Color(Color),
    Brush(ResourceId),
}

/// An outline source after validation
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outline {
    Color(Color),
    Pen(ResourceId),
}

/// Fully resolved outline
#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub paint: Outline,
    pub options: StrokeOptions,
    /// Custom dash array; present only with [`DashStyle::Custom`]
    pub dashes: Option<SmallVec<[f32; 8]>>,
    /// Device stroke style that supplies caps and dashes
    pub style: Option<ResourceId>,
}

impl Stroke {
    pub fn color(color: Color, options: StrokeOptions) -> Self {
        Self {
            paint: Outline::Color(color),
            options,
            dashes: None,
            style: None,
        }
    }
}

/// A frozen path geometry snapshot referenced by a command
#[derive(Clone, Debug)]
pub struct GeometryRef {
    pub id: ResourceId,
    pub data: Arc<PathData>,
}

impl PartialEq for GeometryRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && (Arc::ptr_eq(&self.data, &other.data) || self.data == other.data)
    }
}

/// One normalized drawing instruction
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    SetAntialias(AntialiasMode),
    SetTextAntialias(TextAntialiasMode),
    SetTransform(Affine2D),
    PushClip(Rect),
    PopClip,
    PushLayer {
        layer: ResourceId,
        bounds: Rect,
        mask: Option<GeometryRef>,
        opacity_brush: Option<ResourceId>,
    },
    PopLayer,
    Line {
        start: Point,
        end: Point,
        stroke: Stroke,
    },
    /// A connected open polyline
    Polyline {
        points: Vec<Point>,
        stroke: Stroke,
    },
    /// Independent segments from consecutive point pairs
    UnconnectedLines {
        segments: Vec<[Point; 2]>,
        stroke: Stroke,
    },
    Beziers {
        start: Point,
        segments: Vec<BezierSegment>,
        stroke: Stroke,
    },
    Ellipse {
        ellipse: Ellipse,
        fill: Option<Fill>,
        stroke: Option<Stroke>,
    },
    Rectangle {
        rect: Rect,
        fill: Option<Fill>,
        stroke: Option<Stroke>,
    },
    RoundedRectangle {
        rect: RoundedRect,
        fill: Option<Fill>,
        stroke: Option<Stroke>,
    },
    Polygon {
        points: Vec<Point>,
        fill: Option<Fill>,
        stroke: Option<Stroke>,
    },
    Path {
        geometry: GeometryRef,
        fill: Option<Fill>,
        stroke: Option<Stroke>,
    },
    Bitmap {
        bitmap: ResourceId,
        dest: Rect,
        source: Option<Rect>,
        opacity: f32,
        interpolation: InterpolationMode,
    },
    BitmapTarget {
        target: ResourceId,
        dest: Rect,
        opacity: f32,
        interpolation: InterpolationMode,
    },
    NativeBitmap {
        handle: NativeBitmapHandle,
        dest: Rect,
        source: Option<Rect>,
        opacity: f32,
        interpolation: InterpolationMode,
        alpha: bool,
    },
    Text {
        text: String,
        fill: Fill,
        font: FontDescriptor,
        rect: Rect,
        options: TextOptions,
    },
    TextWithFormat {
        text: String,
        brush: ResourceId,
        format: ResourceId,
        rect: Rect,
    },
    TextLayout {
        layout: ResourceId,
        brush: ResourceId,
        origin: Point,
    },
}

impl DrawCommand {
    /// Short name used in trace output
    pub fn name(&self) -> &'static str {
        match self {
            DrawCommand::Clear(_) => "clear",
            DrawCommand::SetAntialias(_) => "set_antialias",
            DrawCommand::SetTextAntialias(_) => "set_text_antialias",
            DrawCommand::SetTransform(_) => "set_transform",
            DrawCommand::PushClip(_) => "push_clip",
            DrawCommand::PopClip => "pop_clip",
            DrawCommand::PushLayer { .. } => "push_layer",
            DrawCommand::PopLayer => "pop_layer",
            DrawCommand::Line { .. } => "line",
            DrawCommand::Polyline { .. } => "polyline",
            DrawCommand::UnconnectedLines { .. } => "unconnected_lines",
            DrawCommand::Beziers { .. } => "beziers",
            DrawCommand::Ellipse { .. } => "ellipse",
            DrawCommand::Rectangle { .. } => "rectangle",
            DrawCommand::RoundedRectangle { .. } => "rounded_rectangle",
            DrawCommand::Polygon { .. } => "polygon",
            DrawCommand::Path { .. } => "path",
            DrawCommand::Bitmap { .. } => "bitmap",
            DrawCommand::BitmapTarget { .. } => "bitmap_target",
            DrawCommand::NativeBitmap { .. } => "native_bitmap",
            DrawCommand::Text { .. } => "text",
            DrawCommand::TextWithFormat { .. } => "text_with_format",
            DrawCommand::TextLayout { .. } => "text_layout",
        }
    }
}
