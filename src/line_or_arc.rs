use std::cmp::Ordering;

use geo::Coordinate;
use smallvec::SmallVec;

use crate::{
    events::Event,
    shape::{check_finite, ShapeError},
    utils::{coords_equal, dot, is_equal, is_zero, lex_compare, norm, orientation, EPSILON},
};

/// A line segment with its end points in sweep order.
///
/// The start point is lexicographically smaller than the end point
/// (see [`SweepPoint`](crate::SweepPoint)), so a vertical segment
/// starts at its bottom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    start: Coordinate<f64>,
    end: Coordinate<f64>,
}

impl Segment {
    /// Create a segment between two distinct finite points given in
    /// any order.
    pub fn new<C: Into<Coordinate<f64>>>(a: C, b: C) -> Result<Self, ShapeError> {
        let (a, b) = (a.into(), b.into());
        check_finite(a)?;
        check_finite(b)?;
        if coords_equal(a, b) {
            return Err(ShapeError::Degenerate("segment"));
        }
        Ok(Self::between(a, b))
    }

    /// Order two points that are known to be distinct.
    pub(crate) fn between(a: Coordinate<f64>, b: Coordinate<f64>) -> Self {
        if lex_compare(a, b) == Ordering::Greater {
            Segment { start: b, end: a }
        } else {
            Segment { start: a, end: b }
        }
    }

    #[inline]
    pub fn start(&self) -> Coordinate<f64> {
        self.start
    }

    #[inline]
    pub fn end(&self) -> Coordinate<f64> {
        self.end
    }

    #[inline]
    pub fn direction(&self) -> Coordinate<f64> {
        self.end - self.start
    }

    /// Coefficients `(a, b, c)` of the supporting line `a·x + b·y = c`.
    pub fn coefficients(&self) -> (f64, f64, f64) {
        let a = self.start.y - self.end.y;
        let b = self.end.x - self.start.x;
        (a, b, b * self.start.y + a * self.start.x)
    }

    #[inline]
    pub fn is_vertical(&self) -> bool {
        is_equal(self.start.x, self.end.x)
    }

    #[inline]
    pub fn is_horizontal(&self) -> bool {
        is_equal(self.start.y, self.end.y)
    }

    /// Slope of the segment; `+∞` for vertical segments.
    pub fn slope(&self) -> f64 {
        if self.is_vertical() {
            f64::INFINITY
        } else {
            let d = self.direction();
            d.y / d.x
        }
    }

    /// The `y` of the segment at `x` (clamped to the segment), or `None`
    /// if the segment is vertical.
    ///
    /// Solves the standard form of the supporting line for `y`.
    pub fn eval_y(&self, x: f64) -> Option<f64> {
        if self.is_vertical() {
            return None;
        }
        if self.is_horizontal() {
            return Some(self.start.y);
        }
        let x = x.max(self.start.x).min(self.end.x);
        let (a, b, c) = self.coefficients();
        Some((c - a * x) / b)
    }

    #[inline]
    fn interpolate_y(&self, x: f64) -> f64 {
        let d = self.direction();
        self.start.y + (x - self.start.x) * d.y / d.x
    }

    #[inline]
    fn interpolate_x(&self, y: f64) -> f64 {
        let d = self.direction();
        self.start.x + (y - self.start.y) * d.x / d.y
    }

    /// Checks if `p` lies on the segment, within [`EPSILON`].
    pub fn contains(&self, p: Coordinate<f64>) -> bool {
        let (lo, hi) = if self.start.y <= self.end.y {
            (self.start.y, self.end.y)
        } else {
            (self.end.y, self.start.y)
        };
        if p.x < self.start.x - EPSILON
            || p.x > self.end.x + EPSILON
            || p.y < lo - EPSILON
            || p.y > hi + EPSILON
        {
            return false;
        }
        let d = self.direction();
        if d.x.abs() >= d.y.abs() {
            is_equal(self.interpolate_y(p.x), p.y)
        } else {
            is_equal(self.interpolate_x(p.y), p.x)
        }
    }
}

/// One of the four x-monotone quarters of a circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quarter {
    /// From the leftmost point up to the top.
    UpperLeft,
    /// From the top down to the rightmost point.
    UpperRight,
    /// From the leftmost point down to the bottom.
    LowerLeft,
    /// From the bottom up to the rightmost point.
    LowerRight,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [
        Quarter::UpperLeft,
        Quarter::UpperRight,
        Quarter::LowerLeft,
        Quarter::LowerRight,
    ];

    #[inline]
    fn sign(self) -> f64 {
        match self {
            Quarter::UpperLeft | Quarter::UpperRight => 1.,
            Quarter::LowerLeft | Quarter::LowerRight => -1.,
        }
    }
}

/// A quarter of a circle between two cardinal points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    center: Coordinate<f64>,
    radius: f64,
    quarter: Quarter,
}

impl Arc {
    pub(crate) fn new(center: Coordinate<f64>, radius: f64, quarter: Quarter) -> Self {
        Arc {
            center,
            radius,
            quarter,
        }
    }

    #[inline]
    pub fn center(&self) -> Coordinate<f64> {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn quarter(&self) -> Quarter {
        self.quarter
    }

    pub fn left(&self) -> Coordinate<f64> {
        let Coordinate { x, y } = self.center;
        let r = self.radius;
        match self.quarter {
            Quarter::UpperLeft | Quarter::LowerLeft => Coordinate { x: x - r, y },
            Quarter::UpperRight => Coordinate { x, y: y + r },
            Quarter::LowerRight => Coordinate { x, y: y - r },
        }
    }

    pub fn right(&self) -> Coordinate<f64> {
        let Coordinate { x, y } = self.center;
        let r = self.radius;
        match self.quarter {
            Quarter::UpperLeft => Coordinate { x, y: y + r },
            Quarter::LowerLeft => Coordinate { x, y: y - r },
            Quarter::UpperRight | Quarter::LowerRight => Coordinate { x: x + r, y },
        }
    }

    /// Vertical distance from the centre line at `x`.
    #[inline]
    fn half_height(&self, x: f64) -> f64 {
        let dx = x - self.center.x;
        (self.radius * self.radius - dx * dx).max(0.).sqrt()
    }

    pub fn eval_y(&self, x: f64) -> f64 {
        let x = x.max(self.left().x).min(self.right().x);
        self.center.y + self.quarter.sign() * self.half_height(x)
    }

    /// Slope of the tangent at `x`; infinite at the leftmost and
    /// rightmost points of the circle.
    pub fn slope_at(&self, x: f64) -> f64 {
        let dx = x - self.center.x;
        let h = self.half_height(x);
        let s = self.quarter.sign();
        if is_zero(h) {
            -s * dx.signum() * f64::INFINITY
        } else {
            -s * dx / h
        }
    }

    /// Second derivative of `y` at `x`.
    pub fn curvature_at(&self, x: f64) -> f64 {
        let h = self.half_height(x);
        let s = self.quarter.sign();
        if is_zero(h) {
            -s * f64::INFINITY
        } else {
            -s * self.radius * self.radius / (h * h * h)
        }
    }

    /// Checks if `p` lies on the arc, within [`EPSILON`].
    pub fn contains(&self, p: Coordinate<f64>) -> bool {
        let (left, right) = (self.left(), self.right());
        if p.x < left.x - EPSILON || p.x > right.x + EPSILON {
            return false;
        }
        let within_half = if self.quarter.sign() > 0. {
            p.y >= self.center.y - EPSILON
        } else {
            p.y <= self.center.y + EPSILON
        };
        within_half && is_equal(norm(p - self.center), self.radius)
    }
}

/// A x-monotone piece of input: either a line segment or a quarter
/// arc.
///
/// Rays and infinite lines become a single `Line` piece once clipped;
/// a circle becomes four `Arc` pieces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineOrArc {
    Line(Segment),
    Arc(Arc),
}

impl LineOrArc {
    #[inline]
    pub fn is_arc(&self) -> bool {
        matches!(self, LineOrArc::Arc(_))
    }

    /// The lexicographically smaller end point.
    pub fn left(&self) -> Coordinate<f64> {
        match self {
            LineOrArc::Line(s) => s.start(),
            LineOrArc::Arc(a) => a.left(),
        }
    }

    /// The lexicographically larger end point.
    pub fn right(&self) -> Coordinate<f64> {
        match self {
            LineOrArc::Line(s) => s.end(),
            LineOrArc::Arc(a) => a.right(),
        }
    }

    /// The left event (carrying `key`) and the right event of the
    /// piece.
    pub(crate) fn events(&self, key: usize) -> [Event; 2] {
        [Event::left(self.left(), key), Event::right(self.right())]
    }

    /// Evaluate `y` at `x`. Returns `None` for vertical segments.
    pub fn eval_y(&self, x: f64) -> Option<f64> {
        match self {
            LineOrArc::Line(s) => s.eval_y(x),
            LineOrArc::Arc(a) => Some(a.eval_y(x)),
        }
    }

    /// Height of the piece on the sweep line through `at`.
    ///
    /// A vertical segment is placed at `at.y`, clamped to its extent.
    pub fn y_at(&self, at: Coordinate<f64>) -> f64 {
        match self.eval_y(at.x) {
            Some(y) => y,
            None => at.y.max(self.left().y).min(self.right().y),
        }
    }

    pub fn slope_at(&self, x: f64) -> f64 {
        match self {
            LineOrArc::Line(s) => s.slope(),
            LineOrArc::Arc(a) => a.slope_at(x),
        }
    }

    pub fn curvature_at(&self, x: f64) -> f64 {
        match self {
            LineOrArc::Line(_) => 0.,
            LineOrArc::Arc(a) => a.curvature_at(x),
        }
    }

    pub fn contains(&self, p: Coordinate<f64>) -> bool {
        match self {
            LineOrArc::Line(s) => s.contains(p),
            LineOrArc::Arc(a) => a.contains(p),
        }
    }

    /// Intersect two pieces and return up to two points.
    ///
    /// Collinear segments only intersect if they touch at a single end
    /// point. Two arcs never intersect.
    pub fn intersect(&self, other: &Self) -> SmallVec<[Coordinate<f64>; 2]> {
        match (self, other) {
            (LineOrArc::Line(a), LineOrArc::Line(b)) => {
                segment_intersection(a, b).into_iter().collect()
            }
            (LineOrArc::Line(s), LineOrArc::Arc(a)) | (LineOrArc::Arc(a), LineOrArc::Line(s)) => {
                segment_arc_intersection(s, a)
            }
            (LineOrArc::Arc(_), LineOrArc::Arc(_)) => SmallVec::new(),
        }
    }
}

/// Both values strictly on the same side of zero.
#[inline]
fn same_side(a: f64, b: f64) -> bool {
    (a > EPSILON && b > EPSILON) || (a < -EPSILON && b < -EPSILON)
}

fn segment_intersection(a: &Segment, b: &Segment) -> Option<Coordinate<f64>> {
    let (p1, p2) = (a.start(), a.end());
    let (q1, q2) = (b.start(), b.end());

    let d1 = orientation(p1, p2, q1);
    let d2 = orientation(p1, p2, q2);
    if is_zero(d1) && is_zero(d2) {
        // Collinear; an overlap is not a point of intersection.
        return if coords_equal(p2, q1) {
            Some(q1)
        } else if coords_equal(q2, p1) {
            Some(p1)
        } else {
            None
        };
    }
    if same_side(d1, d2) {
        return None;
    }

    let d3 = orientation(q1, q2, p1);
    let d4 = orientation(q1, q2, p2);
    if same_side(d3, d4) {
        return None;
    }

    // End points on the other segment are returned as is.
    if is_zero(d1) {
        return Some(q1);
    }
    if is_zero(d2) {
        return Some(q2);
    }
    if is_zero(d3) {
        return Some(p1);
    }
    if is_zero(d4) {
        return Some(p2);
    }

    let t = d3 / (d3 - d4);
    Some(p1 + (p2 - p1) * t)
}

fn segment_arc_intersection(s: &Segment, a: &Arc) -> SmallVec<[Coordinate<f64>; 2]> {
    let mut points = SmallVec::new();

    let d = s.direction();
    let u = d / norm(d);
    let center = a.center();
    let foot = s.start() + u * dot(center - s.start(), u);
    let dist = norm(center - foot);
    if dist > a.radius() + EPSILON {
        return points;
    }

    let half = (a.radius() * a.radius() - dist * dist).max(0.).sqrt();
    let mut candidates: SmallVec<[Coordinate<f64>; 2]> = SmallVec::new();
    if is_zero(half) {
        candidates.push(foot);
    } else {
        candidates.push(foot - u * half);
        candidates.push(foot + u * half);
    }
    points.extend(
        candidates
            .into_iter()
            .filter(|&p| s.contains(p) && a.contains(p)),
    );
    points
}
