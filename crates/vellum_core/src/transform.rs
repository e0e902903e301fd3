//! 2D affine transforms

use crate::geometry::Point;
use bytemuck::{Pod, Zeroable};

/// 2D affine transformation
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Affine2D {
    /// Matrix elements [a, b, c, d, tx, ty]
    /// | a  c  tx |
    /// | b  d  ty |
    /// | 0  0   1 |
    pub elements: [f32; 6],
}

impl Default for Affine2D {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine2D {
    pub const IDENTITY: Affine2D = Affine2D {
        elements: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    pub const fn new(elements: [f32; 6]) -> Self {
        Self { elements }
    }

    pub fn translation(x: f32, y: f32) -> Self {
        Self::new([1.0, 0.0, 0.0, 1.0, x, y])
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self::new([sx, 0.0, 0.0, sy, 0.0, 0.0])
    }

    /// Scale about `center` instead of the origin.
    pub fn scale_about(sx: f32, sy: f32, center: Point) -> Self {
        Self::new([
            sx,
            0.0,
            0.0,
            sy,
            center.x - sx * center.x,
            center.y - sy * center.y,
        ])
    }

    /// Rotation by `degrees`, clockwise in y-down coordinates.
    pub fn rotation(degrees: f32) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self::new([c, s, -s, c, 0.0, 0.0])
    }

    pub fn rotation_about(degrees: f32, center: Point) -> Self {
        Affine2D::translation(center.x, center.y)
            .then(&Affine2D::rotation(degrees))
            .then(&Affine2D::translation(-center.x, -center.y))
    }

    /// Skew by the given angles in degrees, keeping `center` fixed.
    pub fn skew_about(angle_x: f32, angle_y: f32, center: Point) -> Self {
        let tx = angle_x.to_radians().tan();
        let ty = angle_y.to_radians().tan();
        Self::new([1.0, ty, tx, 1.0, -center.y * tx, -center.x * ty])
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    pub fn determinant(&self) -> f32 {
        let [a, b, c, d, ..] = self.elements;
        a * d - b * c
    }

    /// The inverse transform, or `None` when the matrix is singular.
    pub fn invert(&self) -> Option<Affine2D> {
        let det = self.determinant();
        if det.abs() <= f32::EPSILON {
            return None;
        }
        let [a, b, c, d, tx, ty] = self.elements;
        let inv = 1.0 / det;
        Some(Self::new([
            d * inv,
            -b * inv,
            -c * inv,
            a * inv,
            (c * ty - d * tx) * inv,
            (b * tx - a * ty) * inv,
        ]))
    }

    pub fn transform_point(&self, point: Point) -> Point {
        let [a, b, c, d, tx, ty] = self.elements;
        Point::new(a * point.x + c * point.y + tx, b * point.x + d * point.y + ty)
    }

    /// Concatenate this transform with another (self * other)
    /// The resulting transform first applies `other`, then `self`.
    pub fn then(&self, other: &Affine2D) -> Affine2D {
        let [a1, b1, c1, d1, tx1, ty1] = self.elements;
        let [a2, b2, c2, d2, tx2, ty2] = other.elements;

        Affine2D::new([
            a1 * a2 + c1 * b2,
            b1 * a2 + d1 * b2,
            a1 * c2 + c1 * d2,
            b1 * c2 + d1 * d2,
            a1 * tx2 + c1 * ty2 + tx1,
            b1 * tx2 + d1 * ty2 + ty1,
        ])
    }

    pub fn approx_eq(&self, other: &Affine2D, epsilon: f32) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}
