//! Resource device
//!
//! The device owns the backend, the resource registry and the device-wide
//! DPI. Every resource it creates holds a weak back-reference to it, which is
//! how use of a released resource, of another device's resource, or of any
//! resource after device loss is detected.
//!
//! A device and everything created from it belong to one thread. Separate
//! devices on separate threads never share state.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use rustc_hash::FxHashSet;
use slotmap::SlotMap;
use tracing::{debug, trace, warn};
use vellum_core::{
    ArcSegment, CapStyle, Color, DashStyle, Dpi, Ellipse, FontDescriptor, GradientStop,
    ParagraphAlignment, Point, Rect, Size, TextAlignment, TextShaper,
};

use crate::backend::{BackendError, BitmapSource, RenderBackend, RenderTarget, ResourceDesc};
use crate::bitmap::{Bitmap, BitmapTarget};
use crate::brush::{Brush, BrushKind};
use crate::command::NativeBitmapHandle;
use crate::config::DeviceConfig;
use crate::error::{InvalidReason, PaintError, Result, SessionStateError};
use crate::geometry::PathGeometry;
use crate::layer::Layer;
use crate::resource::{ResourceHandle, ResourceId, ResourceKind};
use crate::session::RenderSession;
use crate::stroke::{Pen, StrokeStyle};
use crate::text::{GeometrySink, TextFormat, TextLayout};

/// State shared between a device and the handles it issued
pub(crate) struct DeviceShared {
    backend: RefCell<Box<dyn RenderBackend>>,
    registry: RefCell<SlotMap<ResourceId, ResourceKind>>,
    dpi: Cell<Dpi>,
    lost: Cell<bool>,
    busy_targets: RefCell<FxHashSet<RenderTarget>>,
    /// Backend releases that arrived while the backend was borrowed
    pending_release: RefCell<Vec<ResourceId>>,
    text_shaper: Option<Box<dyn TextShaper>>,
    config: DeviceConfig,
}

impl DeviceShared {
    /// Sticky once set; also polls the backend.
    pub(crate) fn is_lost(&self) -> bool {
        if self.lost.get() {
            return true;
        }
        let backend_lost = self
            .backend
            .try_borrow()
            .map(|backend| backend.is_device_lost())
            .unwrap_or(false);
        if backend_lost {
            self.mark_lost();
        }
        backend_lost
    }

    pub(crate) fn mark_lost(&self) {
        if self.lost.replace(true) {
            return;
        }
        let mut registry = self.registry.borrow_mut();
        warn!(
            "Render device lost; {} live resource(s) invalidated",
            registry.len()
        );
        registry.clear();
        self.busy_targets.borrow_mut().clear();
    }

    /// Drop a resource from the registry and release its backend object.
    pub(crate) fn forget(&self, id: ResourceId) {
        if self.registry.borrow_mut().remove(id).is_none() {
            return;
        }
        match self.backend.try_borrow_mut() {
            Ok(mut backend) => backend.release_resource(id),
            Err(_) => {
                // Released from inside a backend call; retried once the call returns
                debug!("Deferring release of {:?}", id);
                self.pending_release.borrow_mut().push(id);
            }
        }
    }

    fn release_pending(&self, backend: &mut dyn RenderBackend) {
        let pending = std::mem::take(&mut *self.pending_release.borrow_mut());
        for id in pending {
            backend.release_resource(id);
        }
    }

    /// Run one backend call, translating device loss.
    pub(crate) fn dispatch<T>(
        &self,
        call: impl FnOnce(&mut dyn RenderBackend) -> std::result::Result<T, BackendError>,
    ) -> Result<T> {
        if self.is_lost() {
            return Err(PaintError::DeviceLost);
        }
        let result = {
            let mut backend = self.backend.borrow_mut();
            let result = call(backend.as_mut());
            self.release_pending(backend.as_mut());
            result
        };
        result.map_err(|err| {
            if err == BackendError::DeviceLost {
                self.mark_lost();
            } else {
                debug!("Backend call failed: {}", err);
            }
            PaintError::from(err)
        })
    }
}

/// Builds a [`ResourceDevice`]
pub struct DeviceBuilder {
    backend: Box<dyn RenderBackend>,
    config: DeviceConfig,
    text_shaper: Option<Box<dyn TextShaper>>,
}

impl DeviceBuilder {
    pub fn config(mut self, config: DeviceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn text_shaper(mut self, shaper: impl TextShaper + 'static) -> Self {
        self.text_shaper = Some(Box::new(shaper));
        self
    }

    pub fn build(self) -> Result<ResourceDevice> {
        let dpi = self.config.dpi;
        let device = ResourceDevice {
            shared: Rc::new(DeviceShared {
                backend: RefCell::new(self.backend),
                registry: RefCell::new(SlotMap::with_key()),
                dpi: Cell::new(dpi),
                lost: Cell::new(false),
                busy_targets: RefCell::new(FxHashSet::default()),
                pending_release: RefCell::new(Vec::new()),
                text_shaper: self.text_shaper,
                config: self.config,
            }),
        };
        if dpi != Dpi::DEFAULT {
            device.shared.dispatch(|backend| backend.set_dpi(dpi))?;
        }
        debug!("Created render device at {}x{} dpi", dpi.x, dpi.y);
        Ok(device)
    }
}

/// Owner of a backend and of every resource created on it
pub struct ResourceDevice {
    shared: Rc<DeviceShared>,
}

impl ResourceDevice {
    /// Device with default configuration and no text shaper
    pub fn new(backend: impl RenderBackend + 'static) -> Self {
        Self {
            shared: Rc::new(DeviceShared {
                backend: RefCell::new(Box::new(backend)),
                registry: RefCell::new(SlotMap::with_key()),
                dpi: Cell::new(Dpi::DEFAULT),
                lost: Cell::new(false),
                busy_targets: RefCell::new(FxHashSet::default()),
                pending_release: RefCell::new(Vec::new()),
                text_shaper: None,
                config: DeviceConfig::default(),
            }),
        }
    }

    pub fn builder(backend: impl RenderBackend + 'static) -> DeviceBuilder {
        DeviceBuilder {
            backend: Box::new(backend),
            config: DeviceConfig::default(),
            text_shaper: None,
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.shared.config
    }

    pub fn is_lost(&self) -> bool {
        self.shared.is_lost()
    }

    /// Treat the backend context as gone; all resources become invalid.
    pub fn mark_lost(&self) {
        self.shared.mark_lost();
    }

    /// Number of live resources
    pub fn resource_count(&self) -> usize {
        self.shared.registry.borrow().len()
    }

    pub fn dpi(&self) -> Dpi {
        self.shared.dpi.get()
    }

    /// Change the device-wide DPI. Sessions on this device see it immediately.
    pub fn set_dpi(&self, dpi: Dpi) -> Result<()> {
        self.shared.dispatch(|backend| backend.set_dpi(dpi))?;
        self.shared.dpi.set(dpi);
        debug!("Device dpi set to {}x{}", dpi.x, dpi.y);
        Ok(())
    }

    pub fn has_text_shaper(&self) -> bool {
        self.shared.text_shaper.is_some()
    }

    /// Session drawing to the device's own surface
    pub fn session(&self) -> RenderSession<'_> {
        RenderSession::new(self)
    }

    /// Session drawing into an offscreen bitmap target
    pub fn bitmap_session<'d>(&'d self, target: &'d BitmapTarget) -> Result<RenderSession<'d>> {
        RenderSession::for_bitmap_target(self, target)
    }

    // Resources

    pub fn create_path_geometry(&self) -> Result<PathGeometry> {
        let handle = self.register(&ResourceDesc::PathGeometry)?;
        Ok(PathGeometry::new(handle, self.shared.config.hit_test_tolerance))
    }

    /// A closed four-sided geometry
    pub fn create_rectangle_geometry(&self, rect: Rect) -> Result<PathGeometry> {
        let mut path = self.create_path_geometry()?;
        path.set_start_point(rect.origin())?;
        path.add_lines(&[
            Point::new(rect.right(), rect.y),
            Point::new(rect.right(), rect.bottom()),
            Point::new(rect.x, rect.bottom()),
        ])?;
        path.close_path()?;
        Ok(path)
    }

    /// A closed geometry made of two half-ellipse arcs
    pub fn create_ellipse_geometry(&self, ellipse: Ellipse) -> Result<PathGeometry> {
        let Ellipse {
            center,
            radius_x,
            radius_y,
        } = ellipse;
        let radii = Size::new(radius_x, radius_y);

        let mut path = self.create_path_geometry()?;
        path.set_start_point(Point::new(center.x - radius_x, center.y))?;
        path.add_arc(ArcSegment::new(
            Point::new(center.x + radius_x, center.y),
            radii,
            0.0,
        ))?;
        path.add_arc(ArcSegment::new(
            Point::new(center.x - radius_x, center.y),
            radii,
            0.0,
        ))?;
        path.close_path()?;
        Ok(path)
    }

    /// Geometry of the glyph outlines of `text`, laid out as one line from the origin.
    pub fn create_text_path_geometry(
        &self,
        text: &str,
        font: &FontDescriptor,
    ) -> Result<PathGeometry> {
        let shaper = self.text_shaper()?;
        let mut path = self.create_path_geometry()?;

        let mut sink = GeometrySink::new(&mut path, Point::ZERO);
        shaper.outline(text, font, &mut sink)?;
        sink.finish()?;

        path.close_path()?;
        Ok(path)
    }

    pub fn create_stroke_style(
        &self,
        dashes: Option<&[f32]>,
        dash_offset: f32,
        start_cap: CapStyle,
        end_cap: CapStyle,
    ) -> Result<StrokeStyle> {
        let handle = self.register(&ResourceDesc::StrokeStyle {
            dashes,
            dash_offset,
            start_cap,
            end_cap,
        })?;
        Ok(StrokeStyle::new(
            handle,
            dashes,
            dash_offset,
            start_cap,
            end_cap,
        ))
    }

    pub fn create_layer(&self) -> Result<Layer> {
        let handle = self.register(&ResourceDesc::Layer)?;
        Ok(Layer::new(handle))
    }

    pub fn create_solid_brush(&self, color: Color) -> Result<Brush> {
        let handle = self.register(&ResourceDesc::SolidBrush(color))?;
        Ok(Brush::new(handle, BrushKind::Solid(color)))
    }

    pub fn create_linear_gradient_brush(
        &self,
        start: Point,
        end: Point,
        stops: &[GradientStop],
    ) -> Result<Brush> {
        let handle = self.register(&ResourceDesc::LinearGradientBrush { start, end, stops })?;
        Ok(Brush::new(
            handle,
            BrushKind::LinearGradient {
                start,
                end,
                stops: stops.to_vec(),
            },
        ))
    }

    pub fn create_radial_gradient_brush(
        &self,
        center: Point,
        origin_offset: Point,
        radius_x: f32,
        radius_y: f32,
        stops: &[GradientStop],
    ) -> Result<Brush> {
        let handle = self.register(&ResourceDesc::RadialGradientBrush {
            center,
            origin_offset,
            radius_x,
            radius_y,
            stops,
        })?;
        Ok(Brush::new(
            handle,
            BrushKind::RadialGradient {
                center,
                origin_offset,
                radius_x,
                radius_y,
                stops: stops.to_vec(),
            },
        ))
    }

    pub fn create_pen(
        &self,
        color: Color,
        dash_style: DashStyle,
        dashes: Option<&[f32]>,
        dash_offset: f32,
    ) -> Result<Pen> {
        let handle = self.register(&ResourceDesc::Pen {
            color,
            dash_style,
            dashes,
            dash_offset,
        })?;
        Ok(Pen::new(handle, color, dash_style, dashes, dash_offset))
    }

    pub fn create_text_format(
        &self,
        font: FontDescriptor,
        alignment: TextAlignment,
        paragraph: ParagraphAlignment,
    ) -> Result<TextFormat> {
        let handle = self.register(&ResourceDesc::TextFormat {
            font: &font,
            alignment,
            paragraph,
        })?;
        Ok(TextFormat::new(handle, font, alignment, paragraph))
    }

    pub fn create_text_layout(
        &self,
        text: &str,
        format: &TextFormat,
        max_size: Size,
    ) -> Result<TextLayout> {
        let format_id = self.validate(&format.handle)?;
        let handle = self.register(&ResourceDesc::TextLayout {
            text,
            format: format_id,
            max_size,
        })?;
        Ok(TextLayout::new(
            handle,
            text.to_owned(),
            format.font().clone(),
            max_size,
        ))
    }

    /// Bitmap from tightly packed RGBA8 pixels
    pub fn create_bitmap(&self, width: u32, height: u32, pixels: &[u8]) -> Result<Bitmap> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(PaintError::InvalidBitmapData {
                expected,
                actual: pixels.len(),
            });
        }
        let handle = self.register(&ResourceDesc::Bitmap {
            width,
            height,
            source: BitmapSource::Rgba8(pixels),
        })?;
        Ok(Bitmap::new(handle, width, height))
    }

    /// Bitmap wrapping a platform-native image
    pub fn create_bitmap_from_native(
        &self,
        native: NativeBitmapHandle,
        width: u32,
        height: u32,
    ) -> Result<Bitmap> {
        let handle = self.register(&ResourceDesc::Bitmap {
            width,
            height,
            source: BitmapSource::Native(native),
        })?;
        Ok(Bitmap::new(handle, width, height))
    }

    pub fn create_bitmap_target(&self, width: u32, height: u32) -> Result<BitmapTarget> {
        let handle = self.register(&ResourceDesc::BitmapTarget { width, height })?;
        Ok(BitmapTarget::new(handle, width, height))
    }

    // Text measurement

    pub(crate) fn text_shaper(&self) -> Result<&dyn TextShaper> {
        self.shared
            .text_shaper
            .as_deref()
            .ok_or(PaintError::MissingTextShaper)
    }

    pub(crate) fn measure(&self, text: &str, font: &FontDescriptor, constraint: Size) -> Result<Size> {
        let shaper = self.text_shaper()?;
        if self.is_lost() {
            return Err(PaintError::DeviceLost);
        }
        Ok(shaper.measure(text, font, constraint, self.dpi())?)
    }

    // Internals shared with sessions

    pub(crate) fn shared(&self) -> &DeviceShared {
        &self.shared
    }

    fn owns(&self, device: &Weak<DeviceShared>) -> bool {
        std::ptr::eq(device.as_ptr(), Rc::as_ptr(&self.shared))
    }

    /// Check that a handle names a live resource of this device.
    pub(crate) fn validate(&self, handle: &ResourceHandle) -> Result<ResourceId> {
        if handle.is_released() {
            return Err(PaintError::ResourceInvalid(InvalidReason::Released));
        }
        if !self.owns(handle.device()) {
            return Err(PaintError::ResourceInvalid(InvalidReason::ForeignDevice));
        }
        if self.is_lost() {
            return Err(PaintError::DeviceLost);
        }
        match self.shared.registry.borrow().get(handle.id()) {
            Some(kind) if *kind == handle.kind() => Ok(handle.id()),
            Some(_) => Err(PaintError::ResourceInvalid(InvalidReason::KindMismatch)),
            None => Err(PaintError::ResourceInvalid(InvalidReason::Released)),
        }
    }

    /// Check that an id validated earlier still names a live resource.
    pub(crate) fn revalidate(&self, id: ResourceId) -> Result<()> {
        if self.is_lost() {
            return Err(PaintError::DeviceLost);
        }
        if self.shared.registry.borrow().contains_key(id) {
            Ok(())
        } else {
            Err(PaintError::ResourceInvalid(InvalidReason::Released))
        }
    }

    fn register(&self, desc: &ResourceDesc<'_>) -> Result<ResourceHandle> {
        if self.is_lost() {
            return Err(PaintError::DeviceLost);
        }
        let kind = desc.kind();
        let id = self.shared.registry.borrow_mut().insert(kind);

        if let Err(err) = self
            .shared
            .dispatch(|backend| backend.create_resource(id, desc))
        {
            self.shared.registry.borrow_mut().remove(id);
            return Err(err);
        }

        trace!("Created {:?} {:?}", kind, id);
        Ok(ResourceHandle::new(id, kind, Rc::downgrade(&self.shared)))
    }

    /// Claim a render target for one open session.
    pub(crate) fn acquire_target(&self, target: RenderTarget) -> Result<()> {
        if !self.shared.busy_targets.borrow_mut().insert(target) {
            return Err(SessionStateError::TargetBusy.into());
        }
        Ok(())
    }

    pub(crate) fn release_target(&self, target: RenderTarget) {
        self.shared.busy_targets.borrow_mut().remove(&target);
    }

    pub(crate) fn is_target_busy(&self, target: RenderTarget) -> bool {
        self.shared.busy_targets.borrow().contains(&target)
    }
}

impl Drop for ResourceDevice {
    fn drop(&mut self) {
        let live = self.shared.registry.borrow().len();
        if live > 0 {
            debug!("Dropping render device with {} live resource(s)", live);
        }
    }
}

impl std::fmt::Debug for ResourceDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceDevice")
            .field("dpi", &self.dpi())
            .field("lost", &self.shared.lost.get())
            .field("resources", &self.resource_count())
            .finish()
    }
}
