//! # igde_math - Editor Math Primitives
//!
//! Small, copyable math types used by the editors:
//! - [`Vec2`]/[`Vec3`]/[`Vec4`] float vectors and [`Point`]/[`Point3`] pixel coordinates
//! - [`TexMatrix2`], the 2x3 affine matrix placing constructed-skin nodes
//! - [`Mat4`], the column-major matrix used for rig bone placement

pub mod matrix;
pub mod tex_matrix;
pub mod vector;

pub use matrix::*;
pub use tex_matrix::*;
pub use vector::*;

/// Common math constants
pub mod consts {
    pub const PI: f32 = core::f32::consts::PI;
    pub const TAU: f32 = PI * 2.0;
    pub const DEG_TO_RAD: f32 = PI / 180.0;
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
    pub const EPSILON: f32 = 1e-6;
    /// Tolerance used when comparing angles and matrix entries
    pub const FLOAT_SAFE_EPSILON: f32 = 1e-5;
}

/// Convert degrees to radians
#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees * consts::DEG_TO_RAD
}

/// Convert radians to degrees
#[inline]
pub fn degrees(radians: f32) -> f32 {
    radians * consts::RAD_TO_DEG
}

/// Wrap an angle in radians into `(-PI, PI]`
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + consts::PI).rem_euclid(consts::TAU) - consts::PI;
    if wrapped <= -consts::PI {
        wrapped + consts::TAU
    } else {
        wrapped
    }
}

/// Float comparison with an absolute tolerance
#[inline]
pub fn approx_equal(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() <= epsilon
}

pub mod prelude {
    pub use crate::matrix::Mat4;
    pub use crate::tex_matrix::TexMatrix2;
    pub use crate::vector::{Point, Point3, Vec2, Vec3, Vec4};
    pub use crate::{approx_equal, degrees, radians, wrap_angle};
}
