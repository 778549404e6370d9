// src/geometry.rs
use nalgebra::Point2;

/// A position in normalized frame coordinates (x right, y down, both 0-1).
pub type Point = Point2<f64>;

/// Unsigned angle at vertex `b` between rays `b->a` and `b->c`, in degrees.
///
/// Always lands in `[0, 180]`.
pub fn angle_degrees(a: &Point, b: &Point, c: &Point) -> f64 {
    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let angle = radians.to_degrees().abs();

    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

pub fn distance(a: &Point, b: &Point) -> f64 {
    nalgebra::distance(a, b)
}

pub fn midpoint(a: &Point, b: &Point) -> Point {
    nalgebra::center(a, b)
}

/// `numerator / denominator`, or 0 when the denominator has collapsed.
pub(crate) fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < 1e-9 {
        0.0
    } else {
        numerator / denominator
    }
}
