use super::curve::ParametricCurve2d;
use super::{Point2d, Vector2d};
use crate::util::Interval;
use cgmath::prelude::*;

/// A cubic bezier curve
#[derive(Copy, Clone, Debug)]
pub struct CubicBezier2d {
    points: [Point2d; 4],
}

impl CubicBezier2d {
    pub const fn new(points: &[Point2d; 4]) -> Self {
        Self { points: *points }
    }

    /// The polynomial coefficients `[a, b, c]` of the curve, such that
    /// `B(t) = a t^3 + b t^2 + c t + p0`.
    fn coefficients(&self) -> [Vector2d; 3] {
        let [p0, p1, p2, p3] = self.points.map(|p| p.to_vec());
        let c = 3.0 * (p1 - p0);
        let b = 3.0 * (p2 - p1) - c;
        let a = p3 - p0 - c - b;
        [a, b, c]
    }
}

impl ParametricCurve2d for CubicBezier2d {
    fn sample(&self, t: f64) -> Point2d {
        let [a, b, c] = self.coefficients();
        let t2 = t * t;
        let t3 = t2 * t;
        self.points[0] + (a * t3 + b * t2 + c * t)
    }

    fn bounds(&self) -> Interval<f64> {
        Interval { min: 0.0, max: 1.0 }
    }
}
