//! Vellum paint core
//!
//! An immediate-mode 2D drawing layer over a pluggable native backend.
//!
//! # Features
//!
//! - Begin/end render bracket with flush, clear and background
//! - Transform and clip/layer stacks with balance checking
//! - Lines, ellipses, rectangles, rounded rectangles, polygons, Béziers
//! - Bitmaps, offscreen bitmap targets and native image handles
//! - Text by font description, text format or pre-built layout
//! - Path geometry with fill and stroke hit-testing
//! - Device-owned resources with explicit, idempotent release
//!
//! # Example
//!
//! ```
//! use vellum_core::{Color, Point, Rect};
//! use vellum_paint::{RecordingBackend, ResourceDevice};
//!
//! let device = ResourceDevice::new(RecordingBackend::new());
//! let mut session = device.session();
//!
//! session.begin_render_with_color(Color::WHITE)?;
//! session.draw_line(Point::new(0.0, 0.0), Point::new(100.0, 100.0), Color::BLACK)?;
//! session.fill_rectangle(Rect::new(10.0, 10.0, 40.0, 20.0), Color::RED)?;
//! session.end_render()?;
//! # Ok::<(), vellum_paint::PaintError>(())
//! ```

pub mod backend;
pub mod bitmap;
pub mod brush;
pub mod command;
pub mod config;
pub mod device;
pub mod error;
pub mod geometry;
pub mod layer;
pub mod resource;
pub mod session;
pub mod stack;
pub mod stroke;
pub mod text;

pub use backend::{
    BackendError, Background, BitmapSource, CallLog, RecordedCall, RecordingBackend,
    RenderBackend, RenderTarget, ResourceDesc,
};
pub use bitmap::{Bitmap, BitmapTarget};
pub use brush::{Brush, BrushKind, Paint};
pub use command::{
    BitmapOptions, DrawCommand, Fill, GeometryRef, NativeBitmapHandle, Outline, Stroke,
    StrokeOptions, TextOptions,
};
pub use config::{ConfigError, DeviceConfig};
pub use device::{DeviceBuilder, ResourceDevice};
pub use error::{
    GeometryStateError, InvalidReason, PaintError, Result, SessionStateError,
    StackImbalanceError, StackKind,
};
pub use geometry::{Figure, GeometryState, PathData, PathGeometry, PathSegment};
pub use layer::{Layer, LayerParams};
pub use resource::{DeviceResource, ResourceHandle, ResourceId, ResourceKind};
pub use session::RenderSession;
pub use stack::{ClipEntry, ClipStack, PushedLayer, TransformStack};
pub use stroke::{Pen, StrokeStyle};
pub use text::{TextFormat, TextLayout};
