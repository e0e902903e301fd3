//! Backend seam
//!
//! A [`RenderBackend`] is the native drawing API behind a device. The paint
//! core never rasterizes anything itself; it validates, normalizes and then
//! forwards one call per operation through this trait.
//!
//! [`RecordingBackend`] keeps every call in a shared log so tests can assert
//! on exactly what a session produced.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use thiserror::Error;
use vellum_core::{
    CapStyle, Color, DashStyle, Dpi, FontDescriptor, GradientStop, ParagraphAlignment, Point,
    Size, TextAlignment,
};

use crate::command::{DrawCommand, NativeBitmapHandle};
use crate::resource::{ResourceId, ResourceKind};

/// Failure reported by a backend for a single call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The native context is gone; the device must be recreated
    #[error("device lost")]
    DeviceLost,

    #[error("backend rejected the call: {0}")]
    Rejected(String),

    #[error("not supported by this backend: {0}")]
    Unsupported(&'static str),
}

pub type BackendResult = std::result::Result<(), BackendError>;

/// Where a session draws
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    /// The device's own window surface
    Surface,
    /// An offscreen bitmap target created on the device
    Bitmap(ResourceId),
}

/// What a target is cleared to when a render bracket opens
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Background {
    Color(Color),
    Bitmap(ResourceId),
}

/// Pixel source for a bitmap resource
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BitmapSource<'a> {
    /// Tightly packed straight-alpha RGBA8 rows
    Rgba8(&'a [u8]),
    Native(NativeBitmapHandle),
}

/// Everything a backend needs to materialize a resource
#[derive(Clone, Debug, PartialEq)]
pub enum ResourceDesc<'a> {
    PathGeometry,
    StrokeStyle {
        dashes: Option<&'a [f32]>,
        dash_offset: f32,
        start_cap: CapStyle,
        end_cap: CapStyle,
    },
    Layer,
    SolidBrush(Color),
    LinearGradientBrush {
        start: Point,
        end: Point,
        stops: &'a [GradientStop],
    },
    RadialGradientBrush {
        center: Point,
        origin_offset: Point,
        radius_x: f32,
        radius_y: f32,
        stops: &'a [GradientStop],
    },
    Pen {
        color: Color,
        dash_style: DashStyle,
        dashes: Option<&'a [f32]>,
        dash_offset: f32,
    },
    TextFormat {
        font: &'a FontDescriptor,
        alignment: TextAlignment,
        paragraph: ParagraphAlignment,
    },
    TextLayout {
        text: &'a str,
        format: ResourceId,
        max_size: Size,
    },
    Bitmap {
        width: u32,
        height: u32,
        source: BitmapSource<'a>,
    },
    BitmapTarget {
        width: u32,
        height: u32,
    },
}

impl ResourceDesc<'_> {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceDesc::PathGeometry => ResourceKind::PathGeometry,
            ResourceDesc::StrokeStyle { .. } => ResourceKind::StrokeStyle,
            ResourceDesc::Layer => ResourceKind::Layer,
            ResourceDesc::SolidBrush(_) => ResourceKind::SolidBrush,
            ResourceDesc::LinearGradientBrush { .. } => ResourceKind::LinearGradientBrush,
            ResourceDesc::RadialGradientBrush { .. } => ResourceKind::RadialGradientBrush,
            ResourceDesc::Pen { .. } => ResourceKind::Pen,
            ResourceDesc::TextFormat { .. } => ResourceKind::TextFormat,
            ResourceDesc::TextLayout { .. } => ResourceKind::TextLayout,
            ResourceDesc::Bitmap { .. } => ResourceKind::Bitmap,
            ResourceDesc::BitmapTarget { .. } => ResourceKind::BitmapTarget,
        }
    }
}

/// The native drawing API behind a [`ResourceDevice`](crate::ResourceDevice)
pub trait RenderBackend {
    fn create_resource(&mut self, id: ResourceId, desc: &ResourceDesc<'_>) -> BackendResult;

    /// Release never fails; unknown ids are ignored.
    fn release_resource(&mut self, id: ResourceId);

    fn begin(&mut self, target: RenderTarget, background: Option<Background>) -> BackendResult;

    fn execute(&mut self, target: RenderTarget, command: &DrawCommand) -> BackendResult;

    fn flush(&mut self, target: RenderTarget) -> BackendResult;

    fn end(&mut self, target: RenderTarget) -> BackendResult;

    fn set_dpi(&mut self, _dpi: Dpi) -> BackendResult {
        Ok(())
    }

    /// Polled by the device before work is issued
    fn is_device_lost(&self) -> bool {
        false
    }
}

/// One call observed by a [`RecordingBackend`]
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedCall {
    CreateResource { id: ResourceId, kind: ResourceKind },
    ReleaseResource(ResourceId),
    Begin {
        target: RenderTarget,
        background: Option<Background>,
    },
    Execute {
        target: RenderTarget,
        command: DrawCommand,
    },
    Flush(RenderTarget),
    End(RenderTarget),
    SetDpi(Dpi),
}

#[derive(Default)]
struct LogState {
    calls: RefCell<Vec<RecordedCall>>,
    lost: Cell<bool>,
    reject_next: RefCell<Option<String>>,
}

/// Shared view of a [`RecordingBackend`]'s call log
#[derive(Clone, Default)]
pub struct CallLog {
    state: Rc<LogState>,
}

impl CallLog {
    pub fn calls(&self) -> Ref<'_, Vec<RecordedCall>> {
        self.state.calls.borrow()
    }

    /// Draw commands only, in submission order
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.state
            .calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                RecordedCall::Execute { command, .. } => Some(command.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.calls.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.calls.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.state.calls.borrow_mut().clear();
    }

    /// Simulate the native context going away
    pub fn set_device_lost(&self, lost: bool) {
        self.state.lost.set(lost);
    }

    /// Make the next fallible call fail with [`BackendError::Rejected`]
    pub fn reject_next(&self, reason: impl Into<String>) {
        *self.state.reject_next.borrow_mut() = Some(reason.into());
    }
}

/// Backend that draws nothing and records everything
#[derive(Default)]
pub struct RecordingBackend {
    log: CallLog,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    fn record(&mut self, call: RecordedCall) -> BackendResult {
        let state = &self.log.state;
        if state.lost.get() {
            return Err(BackendError::DeviceLost);
        }
        if let Some(reason) = state.reject_next.borrow_mut().take() {
            return Err(BackendError::Rejected(reason));
        }
        state.calls.borrow_mut().push(call);
        Ok(())
    }
}

impl RenderBackend for RecordingBackend {
    fn create_resource(&mut self, id: ResourceId, desc: &ResourceDesc<'_>) -> BackendResult {
        self.record(RecordedCall::CreateResource {
            id,
            kind: desc.kind(),
        })
    }

    fn release_resource(&mut self, id: ResourceId) {
        self.log
            .state
            .calls
            .borrow_mut()
            .push(RecordedCall::ReleaseResource(id));
    }

    fn begin(&mut self, target: RenderTarget, background: Option<Background>) -> BackendResult {
        self.record(RecordedCall::Begin { target, background })
    }

    fn execute(&mut self, target: RenderTarget, command: &DrawCommand) -> BackendResult {
        self.record(RecordedCall::Execute {
            target,
            command: command.clone(),
        })
    }

    fn flush(&mut self, target: RenderTarget) -> BackendResult {
        self.record(RecordedCall::Flush(target))
    }

    fn end(&mut self, target: RenderTarget) -> BackendResult {
        self.record(RecordedCall::End(target))
    }

    fn set_dpi(&mut self, dpi: Dpi) -> BackendResult {
        self.record(RecordedCall::SetDpi(dpi))
    }

    fn is_device_lost(&self) -> bool {
        self.log.state.lost.get()
    }
}
