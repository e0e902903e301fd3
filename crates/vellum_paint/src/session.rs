//! Render session - the main drawing API
//!
//! A session draws to one target (the device surface or an offscreen bitmap
//! target) inside a `begin_render`/`end_render` bracket. It owns the
//! transform and clip/layer stacks for that bracket and resolves every
//! drawing overload into a single canonical [`DrawCommand`].
//!
//! The session borrows its device, so it cannot outlive it. Dropping a
//! session that is still open ends the bracket.

use smallvec::SmallVec;
use tracing::{debug, trace, warn};
use vellum_core::{
    Affine2D, AntialiasMode, BezierSegment, Color, DashStyle, Dpi, Ellipse, FontDescriptor,
    Point, Rect, RoundedRect, Size, TextAntialiasMode,
};

use crate::backend::{Background, RenderTarget};
use crate::bitmap::{Bitmap, BitmapTarget};
use crate::brush::{Brush, Paint};
use crate::command::{
    BitmapOptions, DrawCommand, Fill, GeometryRef, NativeBitmapHandle, Outline, Stroke,
    StrokeOptions, TextOptions,
};
use crate::device::ResourceDevice;
use crate::error::{Result, SessionStateError, StackImbalanceError};
use crate::geometry::PathGeometry;
use crate::layer::{Layer, LayerParams};
use crate::resource::ResourceId;
use crate::stack::{ClipEntry, ClipStack, PushedLayer, TransformStack};
use crate::stroke::{Pen, StrokeStyle};
use crate::text::{TextFormat, TextLayout};

/// Drawing surface for one render target
pub struct RenderSession<'d> {
    device: &'d ResourceDevice,
    target: RenderTarget,
    bitmap_target: Option<&'d BitmapTarget>,
    is_open: bool,
    antialias: AntialiasMode,
    text_antialias: TextAntialiasMode,
    transforms: TransformStack,
    clips: ClipStack,
    /// Layers created by `push_new_layer`, released once popped
    owned_layers: Vec<Layer>,
}

impl<'d> RenderSession<'d> {
    /// Session drawing to the device's own surface
    pub fn new(device: &'d ResourceDevice) -> Self {
        let config = device.config();
        Self {
            device,
            target: RenderTarget::Surface,
            bitmap_target: None,
            is_open: false,
            antialias: AntialiasMode::from_enabled(config.antialias),
            text_antialias: config.text_antialias,
            transforms: TransformStack::new(),
            clips: ClipStack::new(),
            owned_layers: Vec::new(),
        }
    }

    /// Session drawing into an offscreen target created on `device`
    pub fn for_bitmap_target(device: &'d ResourceDevice, target: &'d BitmapTarget) -> Result<Self> {
        let id = device.validate(&target.handle)?;
        let mut session = Self::new(device);
        session.target = RenderTarget::Bitmap(id);
        session.bitmap_target = Some(target);
        Ok(session)
    }

    pub fn device(&self) -> &'d ResourceDevice {
        self.device
    }

    pub fn target(&self) -> RenderTarget {
        self.target
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    // === Bracket ===

    /// Open the render bracket without clearing.
    pub fn begin_render(&mut self) -> Result<()> {
        self.begin(None)
    }

    /// Open the render bracket and clear to `color`.
    pub fn begin_render_with_color(&mut self, color: Color) -> Result<()> {
        self.begin(Some(Background::Color(color)))
    }

    /// Open the render bracket with `bitmap` as the background.
    pub fn begin_render_with_bitmap(&mut self, bitmap: &Bitmap) -> Result<()> {
        if self.is_open {
            return Err(SessionStateError::AlreadyOpen.into());
        }
        let id = self.device.validate(&bitmap.handle)?;
        self.begin(Some(Background::Bitmap(id)))
    }

    fn begin(&mut self, background: Option<Background>) -> Result<()> {
        if self.is_open {
            return Err(SessionStateError::AlreadyOpen.into());
        }
        if let Some(target) = self.bitmap_target {
            self.device.validate(&target.handle)?;
        }

        let target = self.target;
        self.device.acquire_target(target)?;
        if let Err(err) = self
            .device
            .shared()
            .dispatch(|backend| backend.begin(target, background))
        {
            self.device.release_target(target);
            return Err(err);
        }

        self.is_open = true;
        self.transforms.reset();
        self.clips = ClipStack::new();
        self.owned_layers.clear();

        // Quality modes persist across brackets; the backend starts each one at defaults
        if let Err(err) = self.reapply_quality_modes() {
            warn!("Begin render on {:?} failed: {}", target, err);
            // Best effort; the bracket is abandoned either way
            let _ = self.device.shared().dispatch(|backend| backend.end(target));
            self.is_open = false;
            self.device.release_target(target);
            return Err(err);
        }
        debug!("Begin render on {:?}", target);
        Ok(())
    }

    fn reapply_quality_modes(&mut self) -> Result<()> {
        if self.antialias != AntialiasMode::default() {
            self.submit(DrawCommand::SetAntialias(self.antialias))?;
        }
        if self.text_antialias != TextAntialiasMode::default() {
            self.submit(DrawCommand::SetTextAntialias(self.text_antialias))?;
        }
        Ok(())
    }

    /// Close the render bracket and present.
    ///
    /// Clips and layers still pushed are popped first and the call then fails
    /// with [`StackImbalanceError::UnbalancedAtEnd`]; the bracket is closed
    /// either way.
    pub fn end_render(&mut self) -> Result<()> {
        self.ensure_open()?;
        let target = self.target;
        let transforms = self.transforms.depth();
        let clips = self.clips.clip_depth();
        let layers = self.clips.layer_depth();

        let mut unwind_error = None;
        if clips + layers > 0 {
            warn!(
                "Ending render with {} clip(s) and {} layer(s) still pushed",
                clips, layers
            );
            let entries: SmallVec<[ClipEntry; 8]> = self.clips.drain().collect();
            for entry in entries {
                let command = match entry {
                    ClipEntry::Clip(_) => DrawCommand::PopClip,
                    ClipEntry::Layer(_) => DrawCommand::PopLayer,
                };
                if let Err(err) = self
                    .device
                    .shared()
                    .dispatch(|backend| backend.execute(target, &command))
                {
                    unwind_error.get_or_insert(err);
                }
            }
        }
        self.transforms.reset();

        let ended = self.device.shared().dispatch(|backend| backend.end(target));
        self.is_open = false;
        self.owned_layers.clear();
        self.device.release_target(target);
        debug!("End render on {:?}", target);

        ended?;
        if let Some(err) = unwind_error {
            return Err(err);
        }
        if transforms + clips + layers > 0 {
            return Err(StackImbalanceError::UnbalancedAtEnd {
                transforms,
                clips,
                layers,
            }
            .into());
        }
        Ok(())
    }

    /// Submit pending work without ending the bracket.
    pub fn flush(&mut self) -> Result<()> {
        self.ensure_open()?;
        let target = self.target;
        self.device
            .shared()
            .dispatch(|backend| backend.flush(target))
    }

    pub fn clear(&mut self, color: Color) -> Result<()> {
        self.ensure_open()?;
        self.submit(DrawCommand::Clear(color))
    }

    // === Quality and DPI ===

    pub fn antialias(&self) -> bool {
        self.antialias.is_enabled()
    }

    /// Takes effect immediately when open, otherwise at the next `begin_render`.
    pub fn set_antialias(&mut self, enabled: bool) -> Result<()> {
        let mode = AntialiasMode::from_enabled(enabled);
        if mode == self.antialias {
            return Ok(());
        }
        if self.is_open {
            self.submit(DrawCommand::SetAntialias(mode))?;
        }
        self.antialias = mode;
        Ok(())
    }

    pub fn text_antialias(&self) -> TextAntialiasMode {
        self.text_antialias
    }

    pub fn set_text_antialias(&mut self, mode: TextAntialiasMode) -> Result<()> {
        if mode == self.text_antialias {
            return Ok(());
        }
        if self.is_open {
            self.submit(DrawCommand::SetTextAntialias(mode))?;
        }
        self.text_antialias = mode;
        Ok(())
    }

    /// The device DPI; shared by every session on the device
    pub fn dpi(&self) -> Dpi {
        self.device.dpi()
    }

    pub fn set_dpi(&self, dpi: Dpi) -> Result<()> {
        self.device.set_dpi(dpi)
    }

    // === Transforms ===

    pub fn transform(&self) -> Affine2D {
        self.transforms.current()
    }

    pub fn transform_depth(&self) -> usize {
        self.transforms.depth()
    }

    pub fn set_transform(&mut self, transform: Affine2D) -> Result<()> {
        self.ensure_open()?;
        self.transforms.set(transform);
        self.submit(DrawCommand::SetTransform(transform))
    }

    pub fn reset_transform(&mut self) -> Result<()> {
        self.set_transform(Affine2D::IDENTITY)
    }

    /// Save the current transform.
    pub fn push_transform(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.transforms.push();
        Ok(())
    }

    /// Restore the transform saved by the matching `push_transform`.
    pub fn pop_transform(&mut self) -> Result<()> {
        self.ensure_open()?;
        let restored = self.transforms.pop()?;
        self.submit(DrawCommand::SetTransform(restored))
    }

    /// Rotate clockwise by `degrees` about the local origin.
    pub fn rotate_transform(&mut self, degrees: f32) -> Result<()> {
        self.compose(Affine2D::rotation(degrees))
    }

    pub fn rotate_transform_about(&mut self, degrees: f32, center: Point) -> Result<()> {
        self.compose(Affine2D::rotation_about(degrees, center))
    }

    pub fn translate_transform(&mut self, x: f32, y: f32) -> Result<()> {
        self.compose(Affine2D::translation(x, y))
    }

    pub fn scale_transform(&mut self, sx: f32, sy: f32) -> Result<()> {
        self.compose(Affine2D::scale(sx, sy))
    }

    pub fn scale_transform_about(&mut self, sx: f32, sy: f32, center: Point) -> Result<()> {
        self.compose(Affine2D::scale_about(sx, sy, center))
    }

    pub fn skew_transform(&mut self, angle_x: f32, angle_y: f32) -> Result<()> {
        self.compose(Affine2D::skew_about(angle_x, angle_y, Point::ZERO))
    }

    pub fn skew_transform_about(&mut self, angle_x: f32, angle_y: f32, center: Point) -> Result<()> {
        self.compose(Affine2D::skew_about(angle_x, angle_y, center))
    }

    fn compose(&mut self, elementary: Affine2D) -> Result<()> {
        self.ensure_open()?;
        self.transforms.compose(&elementary);
        self.submit(DrawCommand::SetTransform(self.transforms.current()))
    }

    // === Clipping and layers ===

    pub fn clip_depth(&self) -> usize {
        self.clips.depth()
    }

    /// Push an axis-aligned clip in the current transform's space.
    pub fn push_clip(&mut self, rect: Rect) -> Result<()> {
        self.ensure_open()?;
        self.submit(DrawCommand::PushClip(rect))?;
        self.clips.push_clip(rect);
        Ok(())
    }

    pub fn pop_clip(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.clips.pop_clip()?;
        self.submit(DrawCommand::PopClip)
    }

    /// Push a caller-owned layer.
    ///
    /// The layer, its mask and its opacity brush must stay alive until the
    /// matching [`pop_layer`](Self::pop_layer); releasing any of them first
    /// makes that pop fail.
    pub fn push_layer(&mut self, layer: &Layer, params: &LayerParams<'_>) -> Result<()> {
        self.ensure_open()?;
        let layer_id = self.device.validate(&layer.handle)?;
        let mask = params
            .mask
            .map(|mask| self.geometry_ref(mask))
            .transpose()?;
        let opacity_brush = params
            .opacity_brush
            .map(|brush| self.device.validate(&brush.handle))
            .transpose()?;

        let pushed = PushedLayer {
            layer: layer_id,
            mask: mask.as_ref().map(|mask| mask.id),
            opacity_brush,
        };
        self.submit(DrawCommand::PushLayer {
            layer: layer_id,
            bounds: params.bounds,
            mask,
            opacity_brush,
        })?;
        self.clips.push_layer(pushed);
        Ok(())
    }

    /// Create a layer on the device and push it.
    ///
    /// The session keeps the layer alive until it is popped and then releases
    /// it. Returns the layer's id.
    pub fn push_new_layer(&mut self, params: &LayerParams<'_>) -> Result<ResourceId> {
        self.ensure_open()?;
        let layer = self.device.create_layer()?;
        self.push_layer(&layer, params)?;
        let id = layer.handle.id();
        self.owned_layers.push(layer);
        Ok(id)
    }

    /// Pop the innermost layer.
    ///
    /// Fails with [`PaintError::ResourceInvalid`](crate::PaintError::ResourceInvalid)
    /// and leaves the layer pushed if it or its mask or opacity brush was
    /// released after the push.
    pub fn pop_layer(&mut self) -> Result<()> {
        self.ensure_open()?;
        let pushed = self.clips.top_layer()?;
        for id in pushed.resources() {
            self.device.revalidate(id)?;
        }
        self.submit(DrawCommand::PopLayer)?;
        self.clips.pop_layer()?;
        if let Some(index) = self
            .owned_layers
            .iter()
            .rposition(|layer| layer.handle.id() == pushed.layer)
        {
            self.owned_layers.remove(index);
        }
        Ok(())
    }

    // === Lines ===

    pub fn draw_line(&mut self, start: impl Into<Point>, end: impl Into<Point>, color: Color) -> Result<()> {
        self.draw_line_with(start, end, color, &StrokeOptions::default())
    }

    pub fn draw_line_with(
        &mut self,
        start: impl Into<Point>,
        end: impl Into<Point>,
        color: Color,
        options: &StrokeOptions,
    ) -> Result<()> {
        self.ensure_open()?;
        self.submit(DrawCommand::Line {
            start: start.into(),
            end: end.into(),
            stroke: Stroke::color(color, *options),
        })
    }

    /// Line outlined with the caps and dashes of a stroke style
    pub fn draw_line_styled(
        &mut self,
        start: impl Into<Point>,
        end: impl Into<Point>,
        color: Color,
        width: f32,
        style: &StrokeStyle,
    ) -> Result<()> {
        self.ensure_open()?;
        let stroke = self.styled_stroke(Outline::Color(color), width, style)?;
        self.submit(DrawCommand::Line {
            start: start.into(),
            end: end.into(),
            stroke,
        })
    }

    /// Connected polyline through `points`. Fewer than two points draws nothing.
    pub fn draw_lines(&mut self, points: &[Point], color: Color) -> Result<()> {
        self.draw_lines_with(points, color, &[], &StrokeOptions::default())
    }

    /// A non-empty `pattern` overrides the dash style with a custom dash array.
    pub fn draw_lines_with(
        &mut self,
        points: &[Point],
        color: Color,
        pattern: &[f32],
        options: &StrokeOptions,
    ) -> Result<()> {
        self.ensure_open()?;
        if points.len() < 2 {
            return Ok(());
        }
        let mut stroke = Stroke::color(color, *options);
        if !pattern.is_empty() {
            stroke.options.dash_style = DashStyle::Custom;
            stroke.dashes = Some(SmallVec::from_slice(pattern));
        }
        self.submit(DrawCommand::Polyline {
            points: points.to_vec(),
            stroke,
        })
    }

    /// Independent segments from consecutive point pairs; a trailing odd point is ignored.
    pub fn draw_unconnected_lines(&mut self, points: &[Point], color: Color, width: f32) -> Result<()> {
        self.ensure_open()?;
        let segments: Vec<[Point; 2]> = points
            .chunks_exact(2)
            .map(|pair| [pair[0], pair[1]])
            .collect();
        if segments.is_empty() {
            return Ok(());
        }
        self.submit(DrawCommand::UnconnectedLines {
            segments,
            stroke: Stroke::color(color, StrokeOptions::new(width)),
        })
    }

    /// Connected cubic Béziers starting at `start`
    pub fn draw_beziers(
        &mut self,
        start: impl Into<Point>,
        segments: &[BezierSegment],
        color: Color,
        options: &StrokeOptions,
    ) -> Result<()> {
        self.ensure_open()?;
        self.submit(DrawCommand::Beziers {
            start: start.into(),
            segments: segments.to_vec(),
            stroke: Stroke::color(color, *options),
        })
    }

    // === Ellipses ===

    pub fn draw_ellipse(&mut self, ellipse: Ellipse, color: Color) -> Result<()> {
        self.draw_ellipse_with(ellipse, color, &StrokeOptions::default())
    }

    pub fn draw_ellipse_with(
        &mut self,
        ellipse: Ellipse,
        color: Color,
        options: &StrokeOptions,
    ) -> Result<()> {
        self.ensure_open()?;
        self.submit(DrawCommand::Ellipse {
            ellipse,
            fill: None,
            stroke: Some(Stroke::color(color, *options)),
        })
    }

    /// Outline the ellipse inscribed in `bounds`.
    pub fn draw_ellipse_in(&mut self, bounds: Rect, color: Color, options: &StrokeOptions) -> Result<()> {
        self.draw_ellipse_with(
            Ellipse::from_bounds(bounds.x, bounds.y, bounds.width, bounds.height),
            color,
            options,
        )
    }

    pub fn fill_ellipse<'p>(&mut self, ellipse: Ellipse, paint: impl Into<Paint<'p>>) -> Result<()> {
        self.ensure_open()?;
        let fill = self.resolve_fill(paint.into())?;
        self.submit(DrawCommand::Ellipse {
            ellipse,
            fill: Some(fill),
            stroke: None,
        })
    }

    /// Fill the ellipse inscribed in `bounds`.
    pub fn fill_ellipse_in<'p>(&mut self, bounds: Rect, paint: impl Into<Paint<'p>>) -> Result<()> {
        self.fill_ellipse(
            Ellipse::from_bounds(bounds.x, bounds.y, bounds.width, bounds.height),
            paint,
        )
    }

    // === Rectangles ===

    pub fn draw_rectangle(&mut self, rect: Rect, color: Color) -> Result<()> {
        self.draw_rectangle_with(rect, color, &StrokeOptions::default())
    }

    pub fn draw_rectangle_with(&mut self, rect: Rect, color: Color, options: &StrokeOptions) -> Result<()> {
        self.ensure_open()?;
        self.submit(DrawCommand::Rectangle {
            rect,
            fill: None,
            stroke: Some(Stroke::color(color, *options)),
        })
    }

    pub fn draw_rectangle_with_pen(&mut self, rect: Rect, pen: &Pen, width: f32) -> Result<()> {
        self.ensure_open()?;
        let stroke = self.pen_stroke(pen, width)?;
        self.submit(DrawCommand::Rectangle {
            rect,
            fill: None,
            stroke: Some(stroke),
        })
    }

    pub fn fill_rectangle<'p>(&mut self, rect: Rect, paint: impl Into<Paint<'p>>) -> Result<()> {
        self.ensure_open()?;
        let fill = self.resolve_fill(paint.into())?;
        self.submit(DrawCommand::Rectangle {
            rect,
            fill: Some(fill),
            stroke: None,
        })
    }

    /// Fill and outline in one call.
    pub fn draw_fill_rectangle<'p>(
        &mut self,
        rect: Rect,
        fill: impl Into<Paint<'p>>,
        pen: &Pen,
        width: f32,
    ) -> Result<()> {
        self.ensure_open()?;
        let fill = self.resolve_fill(fill.into())?;
        let stroke = self.pen_stroke(pen, width)?;
        self.submit(DrawCommand::Rectangle {
            rect,
            fill: Some(fill),
            stroke: Some(stroke),
        })
    }

    /// Rounded rectangle; a transparent `fill` color leaves it unfilled.
    pub fn draw_rounded_rectangle(
        &mut self,
        rect: RoundedRect,
        stroke_color: Color,
        fill_color: Color,
        options: &StrokeOptions,
    ) -> Result<()> {
        self.ensure_open()?;
        self.submit(DrawCommand::RoundedRectangle {
            rect,
            fill: (!fill_color.is_transparent()).then_some(Fill::Color(fill_color)),
            stroke: visible_stroke(stroke_color, options),
        })
    }

    pub fn draw_rounded_rectangle_with_pen<'p>(
        &mut self,
        rect: RoundedRect,
        pen: &Pen,
        fill: impl Into<Paint<'p>>,
        width: f32,
    ) -> Result<()> {
        self.ensure_open()?;
        let fill = self.optional_fill(fill.into())?;
        let stroke = self.pen_stroke(pen, width)?;
        self.submit(DrawCommand::RoundedRectangle {
            rect,
            fill,
            stroke: Some(stroke),
        })
    }

    // === Polygons ===

    /// Closed polygon; a transparent fill or a zero-width transparent outline is omitted.
    pub fn draw_polygon<'p>(
        &mut self,
        points: &[Point],
        stroke_color: Color,
        options: &StrokeOptions,
        fill: impl Into<Paint<'p>>,
    ) -> Result<()> {
        self.ensure_open()?;
        let fill = self.optional_fill(fill.into())?;
        self.submit(DrawCommand::Polygon {
            points: points.to_vec(),
            fill,
            stroke: visible_stroke(stroke_color, options),
        })
    }

    pub fn fill_polygon<'p>(&mut self, points: &[Point], paint: impl Into<Paint<'p>>) -> Result<()> {
        self.ensure_open()?;
        let fill = self.resolve_fill(paint.into())?;
        self.submit(DrawCommand::Polygon {
            points: points.to_vec(),
            fill: Some(fill),
            stroke: None,
        })
    }

    // === Paths ===

    pub fn draw_path(&mut self, path: &PathGeometry, color: Color) -> Result<()> {
        self.draw_path_with(path, color, &StrokeOptions::default())
    }

    pub fn draw_path_with(&mut self, path: &PathGeometry, color: Color, options: &StrokeOptions) -> Result<()> {
        self.ensure_open()?;
        let geometry = self.geometry_ref(path)?;
        self.submit(DrawCommand::Path {
            geometry,
            fill: None,
            stroke: Some(Stroke::color(color, *options)),
        })
    }

    pub fn draw_path_with_pen(&mut self, path: &PathGeometry, pen: &Pen, width: f32) -> Result<()> {
        self.ensure_open()?;
        let geometry = self.geometry_ref(path)?;
        let stroke = self.pen_stroke(pen, width)?;
        self.submit(DrawCommand::Path {
            geometry,
            fill: None,
            stroke: Some(stroke),
        })
    }

    pub fn draw_path_styled(
        &mut self,
        path: &PathGeometry,
        color: Color,
        width: f32,
        style: &StrokeStyle,
    ) -> Result<()> {
        self.ensure_open()?;
        let geometry = self.geometry_ref(path)?;
        let stroke = self.styled_stroke(Outline::Color(color), width, style)?;
        self.submit(DrawCommand::Path {
            geometry,
            fill: None,
            stroke: Some(stroke),
        })
    }

    pub fn fill_path<'p>(&mut self, path: &PathGeometry, paint: impl Into<Paint<'p>>) -> Result<()> {
        self.ensure_open()?;
        let geometry = self.geometry_ref(path)?;
        let fill = self.resolve_fill(paint.into())?;
        self.submit(DrawCommand::Path {
            geometry,
            fill: Some(fill),
            stroke: None,
        })
    }

    // === Bitmaps ===

    pub fn draw_bitmap(&mut self, bitmap: &Bitmap, dest: Rect) -> Result<()> {
        self.draw_bitmap_with(bitmap, dest, &BitmapOptions::default())
    }

    pub fn draw_bitmap_with(&mut self, bitmap: &Bitmap, dest: Rect, options: &BitmapOptions) -> Result<()> {
        self.ensure_open()?;
        let id = self.device.validate(&bitmap.handle)?;
        self.submit(DrawCommand::Bitmap {
            bitmap: id,
            dest,
            source: options.source,
            opacity: options.opacity,
            interpolation: options.interpolation,
        })
    }

    /// Draw the contents of an offscreen target. The target must not be open.
    pub fn draw_bitmap_target(
        &mut self,
        target: &BitmapTarget,
        dest: Rect,
        options: &BitmapOptions,
    ) -> Result<()> {
        self.ensure_open()?;
        let id = self.device.validate(&target.handle)?;
        if self.device.is_target_busy(RenderTarget::Bitmap(id)) {
            return Err(SessionStateError::TargetBusy.into());
        }
        self.submit(DrawCommand::BitmapTarget {
            target: id,
            dest,
            opacity: options.opacity,
            interpolation: options.interpolation,
        })
    }

    /// Draw an offscreen target at its own size with its top-left at `origin`.
    pub fn draw_bitmap_target_at(
        &mut self,
        target: &BitmapTarget,
        origin: Point,
        options: &BitmapOptions,
    ) -> Result<()> {
        let dest = Rect::from_origin_size(origin, target.size());
        self.draw_bitmap_target(target, dest, options)
    }

    /// Draw a platform-native image; `alpha` selects whether its alpha channel is honored.
    pub fn draw_native_bitmap(
        &mut self,
        handle: NativeBitmapHandle,
        dest: Rect,
        alpha: bool,
        options: &BitmapOptions,
    ) -> Result<()> {
        self.ensure_open()?;
        self.submit(DrawCommand::NativeBitmap {
            handle,
            dest,
            source: options.source,
            opacity: options.opacity,
            interpolation: options.interpolation,
            alpha,
        })
    }

    // === Text ===

    pub fn draw_text(&mut self, text: &str, color: Color, font: &FontDescriptor, rect: Rect) -> Result<()> {
        self.draw_text_with(text, color, font, rect, &TextOptions::default())
    }

    pub fn draw_text_with<'p>(
        &mut self,
        text: &str,
        paint: impl Into<Paint<'p>>,
        font: &FontDescriptor,
        rect: Rect,
        options: &TextOptions,
    ) -> Result<()> {
        self.ensure_open()?;
        let fill = self.resolve_fill(paint.into())?;
        self.submit(DrawCommand::Text {
            text: text.to_owned(),
            fill,
            font: font.clone(),
            rect,
            options: *options,
        })
    }

    /// Draw unwrapped text with its layout box anchored at `origin`.
    pub fn draw_text_at(
        &mut self,
        text: &str,
        color: Color,
        font: &FontDescriptor,
        origin: impl Into<Point>,
    ) -> Result<()> {
        let origin = origin.into();
        let rect = Rect::new(origin.x, origin.y, f32::INFINITY, f32::INFINITY);
        self.draw_text(text, color, font, rect)
    }

    /// Draw text centered both ways inside `rect`.
    pub fn draw_text_centered(
        &mut self,
        text: &str,
        color: Color,
        font: &FontDescriptor,
        rect: Rect,
    ) -> Result<()> {
        self.draw_text_with(text, color, font, rect, &TextOptions::centered())
    }

    pub fn draw_text_with_format(
        &mut self,
        text: &str,
        brush: &Brush,
        format: &TextFormat,
        rect: Rect,
    ) -> Result<()> {
        self.ensure_open()?;
        let brush = self.device.validate(&brush.handle)?;
        let format = self.device.validate(&format.handle)?;
        self.submit(DrawCommand::TextWithFormat {
            text: text.to_owned(),
            brush,
            format,
            rect,
        })
    }

    pub fn draw_text_layout(&mut self, layout: &TextLayout, brush: &Brush, origin: impl Into<Point>) -> Result<()> {
        self.ensure_open()?;
        let layout = self.device.validate(&layout.handle)?;
        let brush = self.device.validate(&brush.handle)?;
        self.submit(DrawCommand::TextLayout {
            layout,
            brush,
            origin: origin.into(),
        })
    }

    /// Fill then outline the glyph outlines of `text` with the line's top-left at `origin`.
    ///
    /// The transform in effect before the call is restored even on failure.
    pub fn draw_stroked_text(
        &mut self,
        text: &str,
        origin: impl Into<Point>,
        stroke_color: Color,
        stroke_width: f32,
        fill_color: Color,
        font: &FontDescriptor,
    ) -> Result<()> {
        self.ensure_open()?;
        let origin = origin.into();
        let path = self.device.create_text_path_geometry(text, font)?;

        let saved = self.transforms.current();
        let drawn = self
            .translate_transform(origin.x, origin.y)
            .and_then(|_| self.fill_path(&path, fill_color))
            .and_then(|_| {
                self.draw_path_with(&path, stroke_color, &StrokeOptions::new(stroke_width))
            });
        let restored = self.set_transform(saved);
        drawn.and(restored)
    }

    /// Size of `text` laid out inside `constraint`, at the device DPI.
    pub fn measure_text(&self, text: &str, font: &FontDescriptor, constraint: Size) -> Result<Size> {
        self.device.measure(text, font, constraint)
    }

    pub fn measure_text_with_format(&self, text: &str, format: &TextFormat, constraint: Size) -> Result<Size> {
        self.device.validate(&format.handle)?;
        self.device.measure(text, format.font(), constraint)
    }

    pub fn measure_text_layout(&self, layout: &TextLayout) -> Result<Size> {
        self.device.validate(&layout.handle)?;
        self.device
            .measure(layout.text(), layout.font(), layout.max_size())
    }

    // === Internals ===

    fn ensure_open(&self) -> Result<()> {
        if !self.is_open {
            return Err(SessionStateError::NotOpen.into());
        }
        Ok(())
    }

    fn submit(&mut self, command: DrawCommand) -> Result<()> {
        let target = self.target;
        trace!("{} on {:?}", command.name(), target);
        self.device
            .shared()
            .dispatch(|backend| backend.execute(target, &command))
    }

    fn resolve_fill(&self, paint: Paint<'_>) -> Result<Fill> {
        match paint {
            Paint::Color(color) => Ok(Fill::Color(color)),
            Paint::Brush(brush) => Ok(Fill::Brush(self.device.validate(&brush.handle)?)),
        }
    }

    /// Like `resolve_fill`, but a transparent color means no fill.
    fn optional_fill(&self, paint: Paint<'_>) -> Result<Option<Fill>> {
        match paint {
            Paint::Color(color) if color.is_transparent() => Ok(None),
            paint => self.resolve_fill(paint).map(Some),
        }
    }

    fn pen_stroke(&self, pen: &Pen, width: f32) -> Result<Stroke> {
        let id = self.device.validate(&pen.handle)?;
        Ok(Stroke {
            paint: Outline::Pen(id),
            options: StrokeOptions::new(width)
                .with_dash_style(pen.dash_style())
                .with_dash_offset(pen.dash_offset()),
            dashes: pen.dashes().map(SmallVec::from_slice),
            style: None,
        })
    }

    fn styled_stroke(&self, paint: Outline, width: f32, style: &StrokeStyle) -> Result<Stroke> {
        let id = self.device.validate(&style.handle)?;
        let mut options = StrokeOptions::new(width)
            .with_caps(style.start_cap(), style.end_cap())
            .with_dash_offset(style.dash_offset());
        if style.dashes().is_some() {
            options.dash_style = DashStyle::Custom;
        }
        Ok(Stroke {
            paint,
            options,
            dashes: style.dashes().map(SmallVec::from_slice),
            style: Some(id),
        })
    }

    fn geometry_ref(&self, path: &PathGeometry) -> Result<GeometryRef> {
        let id = self.device.validate(&path.handle)?;
        let data = path.data()?;
        Ok(GeometryRef { id, data })
    }
}

/// Outline unless it would be invisible (transparent at zero width)
fn visible_stroke(color: Color, options: &StrokeOptions) -> Option<Stroke> {
    if color.is_transparent() && options.width <= 0.0 {
        None
    } else {
        Some(Stroke::color(color, *options))
    }
}

impl Drop for RenderSession<'_> {
    fn drop(&mut self) {
        if self.is_open {
            warn!("Render session dropped while open; ending render");
            if let Err(err) = self.end_render() {
                warn!("Implicit end_render failed: {}", err);
            }
        }
    }
}

impl std::fmt::Debug for RenderSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSession")
            .field("target", &self.target)
            .field("is_open", &self.is_open)
            .field("antialias", &self.antialias)
            .field("transform_depth", &self.transforms.depth())
            .field("clip_depth", &self.clips.depth())
            .finish()
    }
}
