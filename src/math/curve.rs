use super::Point2d;
use crate::util::Interval;
use cgmath::prelude::*;

/// A parametric curve in 2D space.
pub trait ParametricCurve2d {
    /// Samples the parametric curve.
    fn sample(&self, t: f64) -> Point2d;

    /// Returns the minimum and maximum t-values that define the bounds of the curve.
    fn bounds(&self) -> Interval<f64>;
}

impl<T: ParametricCurve2d + ?Sized> ParametricCurve2d for &T {
    fn sample(&self, t: f64) -> Point2d {
        (**self).sample(t)
    }

    fn bounds(&self) -> Interval<f64> {
        (**self).bounds()
    }
}

/// A straight line segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineSegment2d {
    pub start: Point2d,
    pub end: Point2d,
}

impl LineSegment2d {
    /// Creates a line segment from its two end points.
    pub const fn from_ends(start: Point2d, end: Point2d) -> Self {
        Self { start, end }
    }

    /// The length of the segment.
    pub fn length(&self) -> f64 {
        (self.end - self.start).magnitude()
    }

    /// The midpoint of the segment.
    pub fn midpoint(&self) -> Point2d {
        self.start.midpoint(self.end)
    }
}

impl ParametricCurve2d for LineSegment2d {
    fn sample(&self, t: f64) -> Point2d {
        self.start + t * (self.end - self.start)
    }

    fn bounds(&self) -> Interval<f64> {
        Interval::new(0.0, 1.0)
    }
}
