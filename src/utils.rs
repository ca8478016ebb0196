use std::cmp::Ordering;

use geo::Coordinate;

/// Absolute tolerance used by every geometric predicate.
pub const EPSILON: f64 = 1e-8;

#[inline]
pub fn is_zero(a: f64) -> bool {
    a.abs() <= EPSILON
}

/// Tolerant equality. Equal infinities compare equal.
#[inline]
pub fn is_equal(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= EPSILON
}

/// Three-way comparison that treats values within [`EPSILON`] as
/// equal.
#[inline]
pub fn compare(a: f64, b: f64) -> Ordering {
    if is_equal(a, b) {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Lexicographic (`x`, then `y`) tolerant comparison of coordinates.
#[inline]
pub fn lex_compare(a: Coordinate<f64>, b: Coordinate<f64>) -> Ordering {
    compare(a.x, b.x).then_with(|| compare(a.y, b.y))
}

#[inline]
pub fn coords_equal(a: Coordinate<f64>, b: Coordinate<f64>) -> bool {
    is_equal(a.x, b.x) && is_equal(a.y, b.y)
}

/// Signed doubled area of the triangle `p, q, r`.
///
/// Positive if the triangle is counter-clockwise, negative if
/// clockwise. Callers test the result with [`is_zero`] for
/// collinearity.
#[inline]
pub fn orientation(p: Coordinate<f64>, q: Coordinate<f64>, r: Coordinate<f64>) -> f64 {
    (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x)
}

/// Quadrant of the vector `(x, y)`.
///
/// The positive x-axis belongs to the first quadrant and the positive
/// y-axis to the second; the negative axes fall in the third (`x < 0`)
/// and fourth (`y < 0`) respectively. Returns `None` for the zero
/// vector.
pub fn quadrant(x: f64, y: f64) -> Option<u8> {
    if x > 0. && y >= 0. {
        Some(1)
    } else if x <= 0. && y > 0. {
        Some(2)
    } else if x < 0. {
        Some(3)
    } else if y < 0. {
        Some(4)
    } else {
        None
    }
}

#[inline]
pub fn norm(c: Coordinate<f64>) -> f64 {
    c.x.hypot(c.y)
}

#[inline]
pub fn dot(a: Coordinate<f64>, b: Coordinate<f64>) -> f64 {
    a.x * b.x + a.y * b.y
}

#[inline]
pub fn cross(a: Coordinate<f64>, b: Coordinate<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}
