//! Brushes
//!
//! Solid and gradient paint sources created on a device. Anything that accepts
//! a fill takes a [`Paint`], which is either a bare color or a brush.

use vellum_core::{Color, GradientStop, Point};

use crate::resource::{impl_device_resource, ResourceHandle};

/// What a brush paints with
#[derive(Clone, Debug, PartialEq)]
pub enum BrushKind {
    Solid(Color),
    LinearGradient {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
    },
    RadialGradient {
        center: Point,
        origin_offset: Point,
        radius_x: f32,
        radius_y: f32,
        stops: Vec<GradientStop>,
    },
}

pub struct Brush {
    pub(crate) handle: ResourceHandle,
    kind: BrushKind,
}

impl_device_resource!(Brush);

impl Brush {
    pub(crate) fn new(handle: ResourceHandle, kind: BrushKind) -> Self {
        Self { handle, kind }
    }

    pub fn kind(&self) -> &BrushKind {
        &self.kind
    }

    /// The color of a solid brush
    pub fn solid_color(&self) -> Option<Color> {
        match self.kind {
            BrushKind::Solid(color) => Some(color),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Brush {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Brush")
            .field("handle", &self.handle)
            .field("kind", &self.kind)
            .finish()
    }
}

/// A fill source before validation
#[derive(Clone, Copy, Debug)]
pub enum Paint<'a> {
    Color(Color),
    Brush(&'a Brush),
}

impl From<Color> for Paint<'_> {
    fn from(color: Color) -> Self {
        Paint::Color(color)
    }
}

impl<'a> From<&'a Brush> for Paint<'a> {
    fn from(brush: &'a Brush) -> Self {
        Paint::Brush(brush)
    }
}
