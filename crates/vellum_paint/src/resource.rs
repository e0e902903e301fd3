//! Device-owned resource handles
//!
//! Every resource a [`ResourceDevice`](crate::ResourceDevice) creates carries a
//! [`ResourceHandle`]: a registry key plus a weak back-reference to the device
//! that owns it. Releasing is idempotent and also happens on drop, so a handle
//! can never outlive the backend object it names.

use std::rc::Weak;

use slotmap::new_key_type;
use tracing::trace;

use crate::device::DeviceShared;
use crate::error::{InvalidReason, PaintError, Result};

new_key_type! {
    /// Key of a resource in its device's registry
    pub struct ResourceId;
}

/// The kind of backend object a handle names
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    PathGeometry,
    StrokeStyle,
    Layer,
    SolidBrush,
    LinearGradientBrush,
    RadialGradientBrush,
    Pen,
    TextFormat,
    TextLayout,
    Bitmap,
    BitmapTarget,
}

/// Registry entry plus owner back-reference
pub struct ResourceHandle {
    id: ResourceId,
    kind: ResourceKind,
    device: Weak<DeviceShared>,
    released: bool,
}

impl ResourceHandle {
    pub(crate) fn new(id: ResourceId, kind: ResourceKind, device: Weak<DeviceShared>) -> Self {
        Self {
            id,
            kind,
            device,
            released: false,
        }
    }

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub(crate) fn device(&self) -> &Weak<DeviceShared> {
        &self.device
    }

    /// Check that the handle is still usable without consulting a session.
    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.released {
            return Err(PaintError::ResourceInvalid(InvalidReason::Released));
        }
        match self.device.upgrade() {
            Some(shared) if !shared.is_lost() => Ok(()),
            _ => Err(PaintError::DeviceLost),
        }
    }

    /// Release the backend object. Releasing twice is a no-op.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        trace!("Releasing {:?} {:?}", self.kind, self.id);
        if let Some(shared) = self.device.upgrade() {
            shared.forget(self.id);
        }
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("released", &self.released)
            .finish()
    }
}

/// Implemented by every resource type a device hands out
pub trait DeviceResource {
    fn handle(&self) -> &ResourceHandle;

    fn handle_mut(&mut self) -> &mut ResourceHandle;

    fn id(&self) -> ResourceId {
        self.handle().id()
    }

    fn is_released(&self) -> bool {
        self.handle().is_released()
    }

    /// Release the backend object early. Dropping the resource does the same.
    fn release(&mut self) {
        self.handle_mut().release();
    }
}

macro_rules! impl_device_resource {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::resource::DeviceResource for $ty {
                fn handle(&self) -> &$crate::resource::ResourceHandle {
                    &self.handle
                }

                fn handle_mut(&mut self) -> &mut $crate::resource::ResourceHandle {
                    &mut self.handle
                }
            }
        )*
    };
}

pub(crate) use impl_device_resource;
