use super::{Point2d, Vector2d};
use cgmath::prelude::*;

/// Projects a point onto a local coordinate system.
///
/// # Parameters
/// * `point` - The point to project
/// * `origin` - The origin of the coordinate system
/// * `x_axis` - The basis vector pointing in the positive x-axis.
/// * `y_axis` - The basis vector pointing in the positive y-axis.
pub fn project_local(
    point: Point2d,
    origin: Point2d,
    x_axis: Vector2d,
    y_axis: Vector2d,
) -> Point2d {
    let point = point - origin;
    Point2d::new(point.dot(x_axis), point.dot(y_axis))
}

/// Rotates a vector 90 degrees clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// A unit vector pointing along the given heading, in radians.
pub fn heading_vector(angle: f64) -> Vector2d {
    let (sin, cos) = angle.sin_cos();
    Vector2d::new(cos, sin)
}

/// The heading of a vector in radians, or `None` if it has no length.
pub fn vector_heading(vec: Vector2d) -> Option<f64> {
    if vec.magnitude2() > 1e-12 {
        Some(vec.y.atan2(vec.x))
    } else {
        None
    }
}

/// Linear interpolation between two scalars.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
