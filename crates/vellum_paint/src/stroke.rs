//! Stroke styles and pens

use smallvec::SmallVec;
use vellum_core::{CapStyle, Color, DashStyle};

use crate::resource::{impl_device_resource, ResourceHandle};

/// Immutable dash and cap description attached to stroking calls
pub struct StrokeStyle {
    pub(crate) handle: ResourceHandle,
    dashes: Option<SmallVec<[f32; 8]>>,
    dash_offset: f32,
    start_cap: CapStyle,
    end_cap: CapStyle,
}

impl_device_resource!(StrokeStyle);

impl StrokeStyle {
    pub(crate) fn new(
        handle: ResourceHandle,
        dashes: Option<&[f32]>,
        dash_offset: f32,
        start_cap: CapStyle,
        end_cap: CapStyle,
    ) -> Self {
        Self {
            handle,
            dashes: dashes.map(SmallVec::from_slice),
            dash_offset,
            start_cap,
            end_cap,
        }
    }

    /// Dash lengths in multiples of the stroke width
    pub fn dashes(&self) -> Option<&[f32]> {
        self.dashes.as_deref()
    }

    pub fn dash_offset(&self) -> f32 {
        self.dash_offset
    }

    pub fn start_cap(&self) -> CapStyle {
        self.start_cap
    }

    pub fn end_cap(&self) -> CapStyle {
        self.end_cap
    }

    /// Identity comparison: two styles are the same only if they are one resource.
    pub fn same_resource(&self, other: &StrokeStyle) -> bool {
        self.handle.id() == other.handle.id() && self.handle.device().ptr_eq(other.handle.device())
    }
}

impl std::fmt::Debug for StrokeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrokeStyle")
            .field("handle", &self.handle)
            .field("dashes", &self.dashes)
            .field("dash_offset", &self.dash_offset)
            .field("start_cap", &self.start_cap)
            .field("end_cap", &self.end_cap)
            .finish()
    }
}

/// A colored outline with its own dash pattern
pub struct Pen {
    pub(crate) handle: ResourceHandle,
    color: Color,
    dash_style: DashStyle,
    dashes: Option<SmallVec<[f32; 8]>>,
    dash_offset: f32,
}

impl_device_resource!(Pen);

impl Pen {
    pub(crate) fn new(
        handle: ResourceHandle,
        color: Color,
        dash_style: DashStyle,
        dashes: Option<&[f32]>,
        dash_offset: f32,
    ) -> Self {
        Self {
            handle,
            color,
            dash_style,
            dashes: dashes.map(SmallVec::from_slice),
            dash_offset,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn dash_style(&self) -> DashStyle {
        self.dash_style
    }

    pub fn dashes(&self) -> Option<&[f32]> {
        self.dashes.as_deref()
    }

    pub fn dash_offset(&self) -> f32 {
        self.dash_offset
    }
}

impl std::fmt::Debug for Pen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pen")
            .field("handle", &self.handle)
            .field("color", &self.color)
            .field("dash_style", &self.dash_style)
            .finish()
    }
}
