//! Geometric value types shared by every layer of the stack

use bytemuck::{Pod, Zeroable};

/// A 2D point in device-independent pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// A 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect::new(0.0, 0.0, 0.0, 0.0);

    /// A rectangle that places no bound on anything clipped against it.
    pub const INFINITE: Rect = Rect {
        x: f32::MIN,
        y: f32::MIN,
        width: f32::INFINITY,
        height: f32::INFINITY,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn from_points(p1: Point, p2: Point) -> Self {
        Self::new(
            p1.x.min(p2.x),
            p1.y.min(p2.y),
            (p2.x - p1.x).abs(),
            (p2.y - p1.y).abs(),
        )
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_infinite(&self) -> bool {
        self.width.is_infinite() || self.height.is_infinite()
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }
}

/// A rectangle with elliptical corners
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct RoundedRect {
    pub rect: Rect,
    pub radius_x: f32,
    pub radius_y: f32,
}

impl RoundedRect {
    pub const fn new(rect: Rect, radius_x: f32, radius_y: f32) -> Self {
        Self {
            rect,
            radius_x,
            radius_y,
        }
    }

    pub const fn uniform(rect: Rect, radius: f32) -> Self {
        Self::new(rect, radius, radius)
    }
}

/// An ellipse in canonical center + radii form
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Ellipse {
    pub center: Point,
    pub radius_x: f32,
    pub radius_y: f32,
}

impl Ellipse {
    pub const fn new(center: Point, radius_x: f32, radius_y: f32) -> Self {
        Self {
            center,
            radius_x,
            radius_y,
        }
    }

    pub const fn circle(center: Point, radius: f32) -> Self {
        Self::new(center, radius, radius)
    }

    /// The ellipse inscribed in a bounding box whose top-left corner is `(x, y)`.
    ///
    /// The origin is shifted by the radii so the result is centered in the box.
    pub fn from_bounds(x: f32, y: f32, width: f32, height: f32) -> Self {
        let radius_x = width / 2.0;
        let radius_y = height / 2.0;
        Self::new(Point::new(x + radius_x, y + radius_y), radius_x, radius_y)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.radius_x,
            self.center.y - self.radius_y,
            self.radius_x * 2.0,
            self.radius_y * 2.0,
        )
    }
}

/// A cubic Bézier segment continuing from the current point
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BezierSegment {
    pub control1: Point,
    pub control2: Point,
    pub end: Point,
}

impl BezierSegment {
    pub const fn new(control1: Point, control2: Point, end: Point) -> Self {
        Self {
            control1,
            control2,
            end,
        }
    }

    /// Degree-elevate a quadratic segment starting at `from`.
    pub fn from_quadratic(from: Point, control: Point, end: Point) -> Self {
        let c1 = Point::new(
            from.x + 2.0 / 3.0 * (control.x - from.x),
            from.y + 2.0 / 3.0 * (control.y - from.y),
        );
        let c2 = Point::new(
            end.x + 2.0 / 3.0 * (control.x - end.x),
            end.y + 2.0 / 3.0 * (control.y - end.y),
        );
        Self::new(c1, c2, end)
    }
}

/// Whether an arc takes the short or the long way round
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ArcSize {
    #[default]
    Small,
    Large,
}

/// Angular direction of an arc in y-down coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SweepDirection {
    CounterClockwise,
    #[default]
    Clockwise,
}

/// An elliptical arc segment continuing from the current point
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcSegment {
    pub end: Point,
    pub radii: Size,
    /// Rotation of the ellipse's x axis, in degrees
    pub rotation: f32,
    pub arc_size: ArcSize,
    pub sweep: SweepDirection,
}

impl ArcSegment {
    pub fn new(end: Point, radii: Size, rotation: f32) -> Self {
        Self {
            end,
            radii,
            rotation,
            arc_size: ArcSize::default(),
            sweep: SweepDirection::default(),
        }
    }

    pub fn with_arc_size(mut self, arc_size: ArcSize) -> Self {
        self.arc_size = arc_size;
        self
    }

    pub fn with_sweep(mut self, sweep: SweepDirection) -> Self {
        self.sweep = sweep;
        self
    }
}
