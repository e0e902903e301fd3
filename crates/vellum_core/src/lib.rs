//! Vellum core value types
//!
//! The leaf crate of the Vellum workspace. Everything here is plain data that
//! both the paint core and its collaborators (backends, text shapers) agree on:
//!
//! - **Geometry**: points, sizes, rectangles, ellipses, Bézier and arc segments
//! - **Color**: straight-alpha RGBA
//! - **Transforms**: 2D affine matrices with pivoted elementary transforms
//! - **Stroke and quality enums**: dash/cap styles, antialias and interpolation modes
//! - **Text seam**: font description and the [`TextShaper`] trait

pub mod color;
pub mod geometry;
pub mod modes;
pub mod stroke;
pub mod text;
pub mod transform;

pub use color::{Color, GradientStop};
pub use geometry::{
    ArcSegment, ArcSize, BezierSegment, Ellipse, Point, Rect, RoundedRect, Size, SweepDirection,
};
pub use modes::{AntialiasMode, Dpi, InterpolationMode, TextAntialiasMode};
pub use stroke::{CapStyle, DashStyle};
pub use text::{
    FontDescriptor, FontStretch, FontStyle, FontWeight, OutlineSink, ParagraphAlignment,
    ShapingError, TextAlignment, TextShaper,
};
pub use transform::Affine2D;
