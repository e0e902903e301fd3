//! Bitmaps and offscreen bitmap targets

use vellum_core::Size;

use crate::resource::{impl_device_resource, ResourceHandle};

/// Device-side image
pub struct Bitmap {
    pub(crate) handle: ResourceHandle,
    width: u32,
    height: u32,
}

impl_device_resource!(Bitmap);

impl Bitmap {
    pub(crate) fn new(handle: ResourceHandle, width: u32, height: u32) -> Self {
        Self {
            handle,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("handle", &self.handle)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Offscreen surface a session can render into and then draw elsewhere
pub struct BitmapTarget {
    pub(crate) handle: ResourceHandle,
    width: u32,
    height: u32,
}

impl_device_resource!(BitmapTarget);

impl BitmapTarget {
    pub(crate) fn new(handle: ResourceHandle, width: u32, height: u32) -> Self {
        Self {
            handle,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width as f32, self.height as f32)
    }
}

impl std::fmt::Debug for BitmapTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitmapTarget")
            .field("handle", &self.handle)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}
