//! Path geometry
//!
//! A [`PathGeometry`] is built incrementally (start point, then line, Bézier
//! and arc segments) and must be closed before it can be drawn or queried.
//! Closing freezes the recorded figures into an immutable [`PathData`] that
//! draw commands share by reference.
//!
//! Hit-testing runs on lyon path events built from the frozen figures:
//! fill containment uses lyon's winding hit-test, stroke containment walks
//! the flattened outline and measures distance to each segment.

use std::sync::Arc;

use lyon::algorithms::hit_test::hit_test_path;
use lyon::geom::{ArcFlags, SvgArc};
use lyon::math::{point, vector, Angle};
use lyon::path::iterator::PathIterator;
use lyon::path::{FillRule, PathEvent};
use smallvec::SmallVec;
use tracing::trace;
use vellum_core::{
    ArcSegment, ArcSize, BezierSegment, CapStyle, DashStyle, Point, SweepDirection,
};

use crate::command::StrokeOptions;
use crate::error::{GeometryStateError, Result};
use crate::resource::{impl_device_resource, DeviceResource, ResourceHandle};
use crate::stroke::StrokeStyle;

/// One segment of a figure, continuing from the previous end point
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathSegment {
    Line(Point),
    Bezier(BezierSegment),
    Arc(ArcSegment),
}

impl PathSegment {
    pub fn end(&self) -> Point {
        match self {
            PathSegment::Line(p) => *p,
            PathSegment::Bezier(b) => b.end,
            PathSegment::Arc(a) => a.end,
        }
    }
}

/// A connected run of segments from one start point
#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    pub start: Point,
    pub segments: SmallVec<[PathSegment; 8]>,
    /// Closed figures stroke back to `start`; open ones do not
    pub closed: bool,
}

impl Figure {
    fn new(start: Point) -> Self {
        Self {
            start,
            segments: SmallVec::new(),
            closed: false,
        }
    }

    pub fn current_point(&self) -> Point {
        self.segments.last().map_or(self.start, PathSegment::end)
    }
}

/// Frozen figures of a closed geometry
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathData {
    figures: Vec<Figure>,
}

impl PathData {
    pub fn figures(&self) -> &[Figure] {
        &self.figures
    }

    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }
}

/// Build/close lifecycle of a geometry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeometryState {
    /// Created; no start point yet
    Empty,
    /// Accepting segments
    Building,
    /// Frozen; drawable and hit-testable
    Closed,
}

struct Frozen {
    data: Arc<PathData>,
    fill_events: Vec<PathEvent>,
    stroke_events: Vec<PathEvent>,
}

/// A device-owned path built from figures of lines, Béziers and arcs
pub struct PathGeometry {
    pub(crate) handle: ResourceHandle,
    state: GeometryState,
    figures: Vec<Figure>,
    /// Whether the last figure still accepts segments
    figure_open: bool,
    frozen: Option<Frozen>,
    tolerance: f32,
}

impl_device_resource!(PathGeometry);

impl PathGeometry {
    pub(crate) fn new(handle: ResourceHandle, tolerance: f32) -> Self {
        Self {
            handle,
            state: GeometryState::Empty,
            figures: Vec::new(),
            figure_open: false,
            frozen: None,
            tolerance,
        }
    }

    pub fn state(&self) -> GeometryState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == GeometryState::Closed
    }

    /// Begin a new figure at `point`.
    ///
    /// If the current figure has no segments yet its start point is moved
    /// instead; otherwise the current figure is ended open.
    pub fn set_start_point(&mut self, point: impl Into<Point>) -> Result<()> {
        self.ensure_building()?;
        let point = point.into();

        match self.figures.last_mut() {
            Some(figure) if self.figure_open && figure.segments.is_empty() => {
                figure.start = point;
            }
            _ => {
                self.figures.push(Figure::new(point));
            }
        }
        self.figure_open = true;
        self.state = GeometryState::Building;
        Ok(())
    }

    pub fn add_line(&mut self, to: impl Into<Point>) -> Result<()> {
        self.current_figure()?
            .segments
            .push(PathSegment::Line(to.into()));
        Ok(())
    }

    pub fn add_lines(&mut self, points: &[Point]) -> Result<()> {
        let figure = self.current_figure()?;
        figure
            .segments
            .extend(points.iter().copied().map(PathSegment::Line));
        Ok(())
    }

    pub fn add_bezier(&mut self, segment: BezierSegment) -> Result<()> {
        self.current_figure()?
            .segments
            .push(PathSegment::Bezier(segment));
        Ok(())
    }

    pub fn add_beziers(&mut self, segments: &[BezierSegment]) -> Result<()> {
        let figure = self.current_figure()?;
        figure
            .segments
            .extend(segments.iter().copied().map(PathSegment::Bezier));
        Ok(())
    }

    /// Quadratic segments are stored as equivalent cubics.
    pub fn add_quadratic(&mut self, control: Point, to: Point) -> Result<()> {
        let figure = self.current_figure()?;
        let from = figure.current_point();
        figure
            .segments
            .push(PathSegment::Bezier(BezierSegment::from_quadratic(
                from, control, to,
            )));
        Ok(())
    }

    pub fn add_arc(&mut self, arc: ArcSegment) -> Result<()> {
        self.current_figure()?.segments.push(PathSegment::Arc(arc));
        Ok(())
    }

    /// End the current figure closed and keep building.
    ///
    /// The next segment needs a new start point.
    pub fn close_figure(&mut self) -> Result<()> {
        let figure = self.current_figure()?;
        figure.closed = true;
        self.figure_open = false;
        Ok(())
    }

    /// Close the current figure and freeze the geometry.
    pub fn close_path(&mut self) -> Result<()> {
        self.finish(true)
    }

    /// Freeze the geometry leaving the current figure open for stroking.
    ///
    /// Filling still treats the figure as closed.
    pub fn close_path_open(&mut self) -> Result<()> {
        self.finish(false)
    }

    /// Whether `point` lies inside the filled area (even-odd rule).
    pub fn fill_contains_point(&self, point: impl Into<Point>) -> Result<bool> {
        let frozen = self.frozen()?;
        let point = point.into();
        Ok(hit_test_path(
            &lyon::math::point(point.x, point.y),
            frozen.fill_events.iter().copied(),
            FillRule::EvenOdd,
            self.tolerance,
        ))
    }

    /// Whether `point` lies on the outline stroked at `width` with `dash_style`.
    pub fn stroke_contains_point(
        &self,
        point: impl Into<Point>,
        width: f32,
        dash_style: DashStyle,
    ) -> Result<bool> {
        self.stroke_contains_point_with(
            point,
            &StrokeOptions::new(width).with_dash_style(dash_style),
        )
    }

    pub fn stroke_contains_point_with(
        &self,
        point: impl Into<Point>,
        options: &StrokeOptions,
    ) -> Result<bool> {
        let frozen = self.frozen()?;
        let probe = StrokeProbe::from_options(options, options.dash_style.intervals());
        Ok(probe.hits(&frozen.stroke_events, point.into(), self.tolerance))
    }

    /// Stroke hit-test using the caps and dash array of a stroke style.
    pub fn stroke_contains_point_styled(
        &self,
        point: impl Into<Point>,
        width: f32,
        style: &StrokeStyle,
    ) -> Result<bool> {
        let frozen = self.frozen()?;
        style.handle.ensure_live()?;
        let options = StrokeOptions::new(width)
            .with_caps(style.start_cap(), style.end_cap())
            .with_dash_offset(style.dash_offset());
        let probe = StrokeProbe::from_options(&options, style.dashes());
        Ok(probe.hits(&frozen.stroke_events, point.into(), self.tolerance))
    }

    /// The frozen figures, once closed.
    pub fn data(&self) -> Result<Arc<PathData>> {
        Ok(Arc::clone(&self.frozen()?.data))
    }

    fn frozen(&self) -> Result<&Frozen> {
        self.handle.ensure_live()?;
        self.frozen
            .as_ref()
            .ok_or_else(|| GeometryStateError::NotClosed.into())
    }

    fn ensure_building(&self) -> Result<()> {
        self.handle.ensure_live()?;
        if self.state == GeometryState::Closed {
            return Err(GeometryStateError::Closed.into());
        }
        Ok(())
    }

    fn current_figure(&mut self) -> Result<&mut Figure> {
        self.ensure_building()?;
        if !self.figure_open {
            return Err(GeometryStateError::NotStarted.into());
        }
        self.figures
            .last_mut()
            .ok_or_else(|| GeometryStateError::NotStarted.into())
    }

    fn finish(&mut self, close_figure: bool) -> Result<()> {
        self.handle.ensure_live()?;
        if self.state == GeometryState::Closed {
            return Err(GeometryStateError::AlreadyClosed.into());
        }
        if self.figure_open {
            if let Some(figure) = self.figures.last_mut() {
                figure.closed = close_figure;
            }
            self.figure_open = false;
        }

        let data = PathData {
            figures: std::mem::take(&mut self.figures),
        };
        trace!(
            "Closing path geometry {:?} with {} figure(s)",
            self.handle.id(),
            data.figures.len()
        );
        self.frozen = Some(Frozen {
            fill_events: path_events(&data, true),
            stroke_events: path_events(&data, false),
            data: Arc::new(data),
        });
        self.state = GeometryState::Closed;
        Ok(())
    }
}

impl std::fmt::Debug for PathGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathGeometry")
            .field("id", &self.id())
            .field("state", &self.state)
            .finish()
    }
}

fn to_lyon(p: Point) -> lyon::math::Point {
    point(p.x, p.y)
}

/// Convert frozen figures to lyon path events.
///
/// With `close_all` every figure is closed, which is how fills treat them.
fn path_events(data: &PathData, close_all: bool) -> Vec<PathEvent> {
    let mut events = Vec::new();

    for figure in &data.figures {
        let first = to_lyon(figure.start);
        let mut current = first;
        events.push(PathEvent::Begin { at: first });

        for segment in &figure.segments {
            match segment {
                PathSegment::Line(p) => {
                    let to = to_lyon(*p);
                    events.push(PathEvent::Line { from: current, to });
                    current = to;
                }
                PathSegment::Bezier(b) => {
                    let to = to_lyon(b.end);
                    events.push(PathEvent::Cubic {
                        from: current,
                        ctrl1: to_lyon(b.control1),
                        ctrl2: to_lyon(b.control2),
                        to,
                    });
                    current = to;
                }
                PathSegment::Arc(a) => {
                    let to = to_lyon(a.end);
                    let arc = SvgArc {
                        from: current,
                        to,
                        radii: vector(a.radii.width.abs(), a.radii.height.abs()),
                        x_rotation: Angle::degrees(a.rotation),
                        flags: ArcFlags {
                            large_arc: a.arc_size == ArcSize::Large,
                            // y-down: clockwise on screen is the positive sweep
                            sweep: a.sweep == SweepDirection::Clockwise,
                        },
                    };
                    if arc.is_straight_line() {
                        events.push(PathEvent::Line { from: current, to });
                    } else {
                        arc.for_each_quadratic_bezier(&mut |q| {
                            events.push(PathEvent::Quadratic {
                                from: q.from,
                                ctrl: q.ctrl,
                                to: q.to,
                            });
                        });
                    }
                    current = to;
                }
            }
        }

        events.push(PathEvent::End {
            last: current,
            first,
            close: close_all || figure.closed,
        });
    }

    events
}

/// Stroke geometry used for containment tests
struct StrokeProbe<'a> {
    width: f32,
    /// Dash pattern in multiples of the width
    dashes: Option<&'a [f32]>,
    dash_offset: f32,
    start_cap: CapStyle,
    end_cap: CapStyle,
    dash_cap: CapStyle,
}

impl<'a> StrokeProbe<'a> {
    fn from_options(options: &StrokeOptions, dashes: Option<&'a [f32]>) -> Self {
        Self {
            width: options.width.abs(),
            dashes: dashes.filter(|d| d.iter().sum::<f32>() > 0.0),
            dash_offset: options.dash_offset,
            start_cap: options.start_cap,
            end_cap: options.end_cap,
            dash_cap: options.dash_cap,
        }
    }

    fn hits(&self, events: &[PathEvent], p: Point, tolerance: f32) -> bool {
        let p = to_lyon(p);
        let mut polyline: SmallVec<[lyon::math::Point; 32]> = SmallVec::new();

        for event in events.iter().copied().flattened(tolerance) {
            match event {
                PathEvent::Begin { at } => {
                    polyline.clear();
                    polyline.push(at);
                }
                PathEvent::Line { to, .. } => polyline.push(to),
                PathEvent::End { first, close, .. } => {
                    if close {
                        polyline.push(first);
                    }
                    if self.hits_polyline(&polyline, p, close) {
                        return true;
                    }
                }
                _ => {}
            }
        }
        false
    }

    fn hits_polyline(&self, points: &[lyon::math::Point], p: lyon::math::Point, closed: bool) -> bool {
        if points.len() < 2 {
            return false;
        }
        let half = self.width * 0.5;
        let last_index = points.len() - 2;
        let mut travelled = 0.0;

        for (i, pair) in points.windows(2).enumerate() {
            let (a, b) = (pair[0], pair[1]);
            let ab = b - a;
            let len = ab.length();
            if len <= f32::EPSILON {
                continue;
            }
            let ap = p - a;
            let along = ap.dot(ab) / len;
            let across = (ab.cross(ap) / len).abs();

            let arc_length = if along < 0.0 {
                let reaches = if i == 0 && !closed {
                    cap_reaches(self.start_cap, -along, across, half)
                } else {
                    ap.length() <= half
                };
                reaches.then_some(travelled)
            } else if along > len {
                let reaches = if i == last_index && !closed {
                    cap_reaches(self.end_cap, along - len, across, half)
                } else {
                    (p - b).length() <= half
                };
                reaches.then_some(travelled + len)
            } else {
                (across <= half).then_some(travelled + along)
            };

            if let Some(s) = arc_length {
                if self.on_dash(s) {
                    return true;
                }
            }
            travelled += len;
        }
        false
    }

    /// Whether arc length `s` falls on a dash, including the dash caps.
    fn on_dash(&self, s: f32) -> bool {
        let Some(pattern) = self.dashes else {
            return true;
        };
        let period: f32 = pattern.iter().sum::<f32>() * self.width;
        // Dashes scale with the width, so a hairline has no pattern to follow
        if period <= 0.0 || !period.is_finite() {
            return true;
        }
        let phase = (s + self.dash_offset * self.width).rem_euclid(period);
        let reach = self.dash_cap.extent() * self.width;

        let mut position = 0.0;
        for (index, interval) in pattern.iter().enumerate() {
            let length = interval * self.width;
            if index % 2 == 0 {
                let (start, end) = (position - reach, position + length + reach);
                if [phase - period, phase, phase + period]
                    .iter()
                    .any(|&x| x >= start && x <= end)
                {
                    return true;
                }
            }
            position += length;
        }
        false
    }
}

/// Whether a point `overshoot` past an open end and `across` off the axis is under the cap.
fn cap_reaches(cap: CapStyle, overshoot: f32, across: f32, half: f32) -> bool {
    match cap {
        CapStyle::Flat => false,
        CapStyle::Square => overshoot <= half && across <= half,
        CapStyle::Round => overshoot * overshoot + across * across <= half * half,
        CapStyle::Triangle => overshoot + across <= half,
    }
}
