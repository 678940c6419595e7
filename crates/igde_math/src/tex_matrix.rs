//! 2x3 affine matrix for 2D canvas placement
//!
//! Layout matches a texture matrix:
//!
//! ```text
//! [ a11 a12 a13 ]   x' = a11 * x + a12 * y + a13
//! [ a21 a22 a23 ]   y' = a21 * x + a22 * y + a23
//! ```
//!
//! Multiplication chains transformations in application order: `a * b`
//! applies `a` first and `b` second. A node placed inside a group therefore
//! has the screen matrix `node_local * group_screen`.

use core::ops::{Mul, MulAssign};

use crate::consts::EPSILON;
use crate::vector::Vec2;

/// 2D affine transformation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TexMatrix2 {
    pub a11: f32,
    pub a12: f32,
    pub a13: f32,
    pub a21: f32,
    pub a22: f32,
    pub a23: f32,
}

impl TexMatrix2 {
    pub const IDENTITY: Self = Self {
        a11: 1.0,
        a12: 0.0,
        a13: 0.0,
        a21: 0.0,
        a22: 1.0,
        a23: 0.0,
    };

    /// Build from the images of the unit axes and the origin
    #[inline]
    pub const fn from_axes(axis_x: Vec2, axis_y: Vec2, position: Vec2) -> Self {
        Self {
            a11: axis_x.x,
            a12: axis_y.x,
            a13: position.x,
            a21: axis_x.y,
            a22: axis_y.y,
            a23: position.y,
        }
    }

    #[inline]
    pub fn translation(offset: Vec2) -> Self {
        Self::from_axes(Vec2::X, Vec2::Y, offset)
    }

    #[inline]
    pub fn scale(sx: f32, sy: f32) -> Self {
        Self::from_axes(Vec2::new(sx, 0.0), Vec2::new(0.0, sy), Vec2::ZERO)
    }

    /// Counter-clockwise rotation in radians
    #[inline]
    pub fn rotation(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::from_axes(Vec2::new(cos, sin), Vec2::new(-sin, cos), Vec2::ZERO)
    }

    /// Shear with `x' = x + shear_x * y` and `y' = y + shear_y * x`
    #[inline]
    pub fn shear(shear_x: f32, shear_y: f32) -> Self {
        Self::from_axes(Vec2::new(1.0, shear_y), Vec2::new(shear_x, 1.0), Vec2::ZERO)
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.a13, self.a23)
    }

    #[inline]
    pub fn axis_x(&self) -> Vec2 {
        Vec2::new(self.a11, self.a21)
    }

    #[inline]
    pub fn axis_y(&self) -> Vec2 {
        Vec2::new(self.a12, self.a22)
    }

    /// The matrix without its translation
    #[inline]
    pub fn linear(&self) -> Self {
        Self::from_axes(self.axis_x(), self.axis_y(), Vec2::ZERO)
    }

    #[inline]
    pub fn determinant(&self) -> f32 {
        self.a11 * self.a22 - self.a12 * self.a21
    }

    /// Rotation of the X axis in radians
    #[inline]
    pub fn rotation_angle(&self) -> f32 {
        self.axis_x().angle()
    }

    /// Lengths of both axes
    #[inline]
    pub fn scaling(&self) -> Vec2 {
        Vec2::new(self.axis_x().length(), self.axis_y().length())
    }

    /// Apply only the linear part to a direction
    #[inline]
    pub fn transform_vector(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.a11 * v.x + self.a12 * v.y, self.a21 * v.x + self.a22 * v.y)
    }

    /// Inverse transformation.
    ///
    /// A singular matrix has no inverse; in that case only the translation
    /// is undone so callers always receive a usable matrix.
    pub fn inverse(&self) -> Self {
        let det = self.determinant();
        if det.abs() < EPSILON {
            return Self::translation(-self.position());
        }
        let inv = 1.0 / det;
        let a11 = self.a22 * inv;
        let a12 = -self.a12 * inv;
        let a21 = -self.a21 * inv;
        let a22 = self.a11 * inv;
        Self {
            a11,
            a12,
            a13: -(a11 * self.a13 + a12 * self.a23),
            a21,
            a22,
            a23: -(a21 * self.a13 + a22 * self.a23),
        }
    }

    /// Component-wise comparison with a tolerance
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        (self.a11 - other.a11).abs() <= epsilon
            && (self.a12 - other.a12).abs() <= epsilon
            && (self.a13 - other.a13).abs() <= epsilon
            && (self.a21 - other.a21).abs() <= epsilon
            && (self.a22 - other.a22).abs() <= epsilon
            && (self.a23 - other.a23).abs() <= epsilon
    }
}

impl Default for TexMatrix2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// `self * rhs` applies `self` first, then `rhs`
impl Mul for TexMatrix2 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self {
            a11: rhs.a11 * self.a11 + rhs.a12 * self.a21,
            a12: rhs.a11 * self.a12 + rhs.a12 * self.a22,
            a13: rhs.a11 * self.a13 + rhs.a12 * self.a23 + rhs.a13,
            a21: rhs.a21 * self.a11 + rhs.a22 * self.a21,
            a22: rhs.a21 * self.a12 + rhs.a22 * self.a22,
            a23: rhs.a21 * self.a13 + rhs.a22 * self.a23 + rhs.a23,
        }
    }
}

impl MulAssign for TexMatrix2 {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul<Vec2> for TexMatrix2 {
    type Output = Vec2;

    #[inline]
    fn mul(self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.a11 * v.x + self.a12 * v.y + self.a13,
            self.a21 * v.x + self.a22 * v.y + self.a23,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_vec(a: Vec2, b: Vec2) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-4);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-4);
    }

    #[test]
    fn test_composition_order() {
        let m = TexMatrix2::scale(2.0, 2.0) * TexMatrix2::translation(Vec2::new(10.0, 0.0));
        assert_vec(m * Vec2::new(1.0, 1.0), Vec2::new(12.0, 2.0));

        let m = TexMatrix2::translation(Vec2::new(10.0, 0.0)) * TexMatrix2::scale(2.0, 2.0);
        assert_vec(m * Vec2::new(1.0, 1.0), Vec2::new(22.0, 2.0));
    }

    #[test]
    fn test_rotation_is_counter_clockwise() {
        let m = TexMatrix2::rotation(core::f32::consts::FRAC_PI_2);
        assert_vec(m * Vec2::X, Vec2::Y);
        assert_relative_eq!(m.rotation_angle(), core::f32::consts::FRAC_PI_2, epsilon = 1e-5);
    }

    #[test]
    fn test_shear() {
        let m = TexMatrix2::shear(0.5, 0.0);
        assert_vec(m * Vec2::new(0.0, 2.0), Vec2::new(1.0, 2.0));
        assert_relative_eq!(m.determinant(), 1.0);
    }

    #[test]
    fn test_inverse() {
        let m = TexMatrix2::shear(0.3, 0.0)
            * TexMatrix2::rotation(0.7)
            * TexMatrix2::scale(2.0, 0.5)
            * TexMatrix2::translation(Vec2::new(5.0, -3.0));
        let round_trip = m * m.inverse();
        assert!(round_trip.approx_eq(&TexMatrix2::IDENTITY, 1e-5));
    }

    #[test]
    fn test_singular_inverse_falls_back_to_translation() {
        let m = TexMatrix2::scale(0.0, 1.0) * TexMatrix2::translation(Vec2::new(4.0, 2.0));
        assert_vec(m.inverse().position(), Vec2::new(-4.0, -2.0));
    }
}
