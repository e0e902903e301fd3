//! Layers

use vellum_core::Rect;

use crate::brush::Brush;
use crate::geometry::PathGeometry;
use crate::resource::{impl_device_resource, ResourceHandle};

/// Offscreen compositing surface pushed onto the clip/layer stack
pub struct Layer {
    pub(crate) handle: ResourceHandle,
}

impl_device_resource!(Layer);

impl Layer {
    pub(crate) fn new(handle: ResourceHandle) -> Self {
        Self { handle }
    }
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer").field("handle", &self.handle).finish()
    }
}

/// How a pushed layer is bounded and masked
#[derive(Clone, Copy, Debug)]
pub struct LayerParams<'a> {
    /// Content bounds; unbounded by default
    pub bounds: Rect,
    /// Geometric mask; must be a closed geometry
    pub mask: Option<&'a PathGeometry>,
    /// Brush whose alpha modulates the layer
    pub opacity_brush: Option<&'a Brush>,
}

impl Default for LayerParams<'_> {
    fn default() -> Self {
        Self {
            bounds: Rect::INFINITE,
            mask: None,
            opacity_brush: None,
        }
    }
}

impl<'a> LayerParams<'a> {
    pub fn bounded(bounds: Rect) -> Self {
        Self {
            bounds,
            ..Default::default()
        }
    }

    pub fn with_mask(mut self, mask: &'a PathGeometry) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn with_opacity_brush(mut self, brush: &'a Brush) -> Self {
        self.opacity_brush = Some(brush);
        self
    }
}
