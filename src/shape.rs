use std::convert::TryFrom;

use geo::{Coordinate, Rect};
use itertools::Itertools;
use smallvec::{smallvec, SmallVec};
use thiserror::Error;

use crate::{
    line_or_arc::{Arc, LineOrArc, Quarter, Segment},
    utils::{coords_equal, cross, dot, is_equal, is_zero, norm, quadrant, EPSILON},
};

/// Errors raised when constructing a [`Shape`].
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum ShapeError {
    #[error("coordinates must be finite")]
    NonFinite,
    #[error("the defining points of a {0} must be distinct")]
    Degenerate(&'static str),
    #[error("circle radius must be positive and finite, got {0}")]
    InvalidRadius(f64),
}

pub(crate) fn check_finite(c: Coordinate<f64>) -> Result<(), ShapeError> {
    if c.x.is_finite() && c.y.is_finite() {
        Ok(())
    } else {
        Err(ShapeError::NonFinite)
    }
}

/// Index of a shape in the input slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeId(pub usize);

/// A half-infinite line from `origin` through `through`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    origin: Coordinate<f64>,
    through: Coordinate<f64>,
}

impl Ray {
    pub fn new<C: Into<Coordinate<f64>>>(origin: C, through: C) -> Result<Self, ShapeError> {
        let (origin, through) = (origin.into(), through.into());
        check_finite(origin)?;
        check_finite(through)?;
        if coords_equal(origin, through) {
            return Err(ShapeError::Degenerate("ray"));
        }
        Ok(Ray { origin, through })
    }

    #[inline]
    pub fn origin(&self) -> Coordinate<f64> {
        self.origin
    }

    #[inline]
    pub fn through(&self) -> Coordinate<f64> {
        self.through
    }

    #[inline]
    pub fn direction(&self) -> Coordinate<f64> {
        self.through - self.origin
    }

    pub fn contains(&self, p: Coordinate<f64>) -> bool {
        let d = self.direction();
        let len = norm(d);
        is_zero(cross(d, p - self.origin) / len) && dot(d, p - self.origin) / len >= -EPSILON
    }
}

/// An infinite line through two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    p: Coordinate<f64>,
    q: Coordinate<f64>,
}

impl Line {
    pub fn new<C: Into<Coordinate<f64>>>(p: C, q: C) -> Result<Self, ShapeError> {
        let (p, q) = (p.into(), q.into());
        check_finite(p)?;
        check_finite(q)?;
        if coords_equal(p, q) {
            return Err(ShapeError::Degenerate("line"));
        }
        Ok(Line { p, q })
    }

    #[inline]
    pub fn points(&self) -> (Coordinate<f64>, Coordinate<f64>) {
        (self.p, self.q)
    }

    #[inline]
    pub fn direction(&self) -> Coordinate<f64> {
        self.q - self.p
    }

    pub fn contains(&self, p: Coordinate<f64>) -> bool {
        let d = self.direction();
        is_zero(cross(d, p - self.p) / norm(d))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    center: Coordinate<f64>,
    radius: f64,
}

impl Circle {
    pub fn new<C: Into<Coordinate<f64>>>(center: C, radius: f64) -> Result<Self, ShapeError> {
        let center = center.into();
        check_finite(center)?;
        if !radius.is_finite() || radius <= EPSILON {
            return Err(ShapeError::InvalidRadius(radius));
        }
        Ok(Circle { center, radius })
    }

    #[inline]
    pub fn center(&self) -> Coordinate<f64> {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn contains(&self, p: Coordinate<f64>) -> bool {
        is_equal(norm(p - self.center), self.radius)
    }

    /// The four x-monotone quarters.
    pub fn arcs(&self) -> [Arc; 4] {
        let arc = |q| Arc::new(self.center, self.radius, q);
        [
            arc(Quarter::UpperLeft),
            arc(Quarter::UpperRight),
            arc(Quarter::LowerLeft),
            arc(Quarter::LowerRight),
        ]
    }
}

/// An input shape.
///
/// Construct through the validating constructors ([`Shape::segment`]
/// and friends), or convert a [`geo::Line`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Segment(Segment),
    Ray(Ray),
    Line(Line),
    Circle(Circle),
}

impl Shape {
    pub fn segment<C: Into<Coordinate<f64>>>(a: C, b: C) -> Result<Self, ShapeError> {
        Segment::new(a, b).map(Shape::Segment)
    }

    pub fn ray<C: Into<Coordinate<f64>>>(origin: C, through: C) -> Result<Self, ShapeError> {
        Ray::new(origin, through).map(Shape::Ray)
    }

    pub fn line<C: Into<Coordinate<f64>>>(p: C, q: C) -> Result<Self, ShapeError> {
        Line::new(p, q).map(Shape::Line)
    }

    pub fn circle<C: Into<Coordinate<f64>>>(center: C, radius: f64) -> Result<Self, ShapeError> {
        Circle::new(center, radius).map(Shape::Circle)
    }

    /// Checks if the shape is straight (everything but circles).
    #[inline]
    pub fn is_linear(&self) -> bool {
        !matches!(self, Shape::Circle(_))
    }

    /// Checks if `p` lies on the shape, within [`EPSILON`].
    pub fn contains(&self, p: Coordinate<f64>) -> bool {
        match self {
            Shape::Segment(s) => s.contains(p),
            Shape::Ray(r) => r.contains(p),
            Shape::Line(l) => l.contains(p),
            Shape::Circle(c) => c.contains(p),
        }
    }

    /// Split into x-monotone pieces, clipping unbounded shapes to
    /// `clip`.
    ///
    /// The clip box must contain every point defining the shape in its
    /// interior (see [`clip_box`]).
    pub fn preprocess(&self, clip: &Rect<f64>) -> SmallVec<[LineOrArc; 4]> {
        match self {
            Shape::Segment(s) => smallvec![LineOrArc::Line(*s)],
            Shape::Ray(r) => {
                let exit = exit_point(r.origin, r.direction(), clip);
                smallvec![LineOrArc::Line(Segment::between(r.origin, exit))]
            }
            Shape::Line(l) => {
                let d = l.direction();
                let forward = exit_point(l.p, d, clip);
                let backward = exit_point(l.p, -d, clip);
                smallvec![LineOrArc::Line(Segment::between(backward, forward))]
            }
            Shape::Circle(c) => c.arcs().iter().map(|a| LineOrArc::Arc(*a)).collect(),
        }
    }

    /// Points that the clip box must cover.
    fn extent(&self) -> [Coordinate<f64>; 2] {
        match self {
            Shape::Segment(s) => [s.start(), s.end()],
            Shape::Ray(r) => [r.origin, r.through],
            Shape::Line(l) => [l.p, l.q],
            Shape::Circle(c) => {
                let r = Coordinate {
                    x: c.radius,
                    y: c.radius,
                };
                [c.center - r, c.center + r]
            }
        }
    }

    /// Supporting line `(origin, direction)` of an unbounded shape,
    /// and whether it is only half of it.
    fn support(&self) -> Option<(Coordinate<f64>, Coordinate<f64>, bool)> {
        match self {
            Shape::Ray(r) => Some((r.origin, r.direction(), true)),
            Shape::Line(l) => Some((l.p, l.direction(), false)),
            _ => None,
        }
    }
}

impl TryFrom<geo::Line<f64>> for Shape {
    type Error = ShapeError;

    fn try_from(line: geo::Line<f64>) -> Result<Self, Self::Error> {
        Shape::segment(line.start, line.end)
    }
}

/// Bounding box used to clip rays and lines.
///
/// Covers every point defining an input shape and every crossing of
/// two unbounded shapes, grown by `margin` on each side.
pub fn clip_box(shapes: &[Shape], margin: f64) -> Rect<f64> {
    let mut points: Vec<Coordinate<f64>> = shapes.iter().flat_map(|s| s.extent()).collect();

    let unbounded: Vec<_> = shapes.iter().filter_map(Shape::support).collect();
    for (a, b) in unbounded.iter().tuple_combinations() {
        if let Some(p) = support_crossing(a, b) {
            points.push(p);
        }
    }

    let pad = Coordinate {
        x: margin,
        y: margin,
    };
    let mut iter = points.into_iter();
    let first = match iter.next() {
        Some(p) => p,
        None => return Rect::new(-pad, pad),
    };
    let (min, max) = iter.fold((first, first), |(min, max), p| {
        (
            Coordinate {
                x: min.x.min(p.x),
                y: min.y.min(p.y),
            },
            Coordinate {
                x: max.x.max(p.x),
                y: max.y.max(p.y),
            },
        )
    });
    Rect::new(min - pad, max + pad)
}

type Support = (Coordinate<f64>, Coordinate<f64>, bool);

fn support_crossing(a: &Support, b: &Support) -> Option<Coordinate<f64>> {
    let &(o1, d1, half1) = a;
    let &(o2, d2, half2) = b;
    let denom = cross(d1, d2);
    if is_zero(denom / (norm(d1) * norm(d2))) {
        return None;
    }
    let t = cross(o2 - o1, d2) / denom;
    let s = cross(o2 - o1, d1) / denom;
    if (half1 && t < 0.) || (half2 && s < 0.) {
        return None;
    }
    Some(o1 + d1 * t)
}

/// Where the ray from `origin` along `dir` leaves `clip`.
///
/// The quadrant of `dir` picks the corner the ray heads for; the exit
/// is at the nearest of the two boundary lines through that corner.
fn exit_point(origin: Coordinate<f64>, dir: Coordinate<f64>, clip: &Rect<f64>) -> Coordinate<f64> {
    let (min, max) = (clip.min(), clip.max());
    let corner = match quadrant(dir.x, dir.y) {
        Some(1) => max,
        Some(2) => Coordinate { x: min.x, y: max.y },
        Some(3) => min,
        Some(4) => Coordinate { x: max.x, y: min.y },
        _ => return origin,
    };
    let mut t = f64::INFINITY;
    if dir.x != 0. {
        t = t.min((corner.x - origin.x) / dir.x);
    }
    if dir.y != 0. {
        t = t.min((corner.y - origin.y) / dir.y);
    }
    origin + dir * t
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn c(x: f64, y: f64) -> Coordinate<f64> {
        Coordinate { x, y }
    }

    #[test]
    fn constructors_validate() {
        assert!(Shape::segment((0., 0.), (1., 1.)).is_ok());
        assert_eq!(
            Shape::segment((0., 0.), (0., 0.)),
            Err(ShapeError::Degenerate("segment"))
        );
        assert_eq!(
            Shape::ray((0., 0.), (0., 0.)),
            Err(ShapeError::Degenerate("ray"))
        );
        assert_eq!(
            Shape::line((1., f64::INFINITY), (0., 0.)),
            Err(ShapeError::NonFinite)
        );
        assert_eq!(
            Shape::circle((0., 0.), -1.),
            Err(ShapeError::InvalidRadius(-1.))
        );
        assert_eq!(
            Shape::circle((0., 0.), 0.),
            Err(ShapeError::InvalidRadius(0.))
        );
        assert!(Shape::circle((0., 0.), f64::NAN).is_err());

        let line = geo::Line::from([(3., 1.), (1., 1.)]);
        let shape = Shape::try_from(line).unwrap();
        assert_eq!(shape, Shape::segment((1., 1.), (3., 1.)).unwrap());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ShapeError::Degenerate("ray").to_string(),
            "the defining points of a ray must be distinct"
        );
        assert_eq!(
            ShapeError::InvalidRadius(-2.).to_string(),
            "circle radius must be positive and finite, got -2"
        );
    }

    #[test]
    fn shape_contains() {
        let ray = Shape::ray((0., 0.), (1., 1.)).unwrap();
        assert!(ray.contains(c(5., 5.)));
        assert!(ray.contains(c(0., 0.)));
        assert!(!ray.contains(c(-1., -1.)));

        let line = Shape::line((0., 0.), (1., 1.)).unwrap();
        assert!(line.contains(c(-1., -1.)));
        assert!(!line.contains(c(-1., 1.)));

        let circle = Shape::circle((1., 1.), 2.).unwrap();
        assert!(circle.contains(c(3., 1.)));
        assert!(!circle.contains(c(1., 1.)));
    }

    #[test]
    fn clip_box_covers_shapes_with_margin() {
        let shapes = vec![
            Shape::segment((0., 0.), (4., 2.)).unwrap(),
            Shape::circle((10., 10.), 1.).unwrap(),
        ];
        let rect = clip_box(&shapes, 10.);
        assert_eq!(rect.min(), c(-10., -10.));
        assert_eq!(rect.max(), c(21., 21.));

        let empty = clip_box(&[], 5.);
        assert_eq!(empty.min(), c(-5., -5.));
        assert_eq!(empty.max(), c(5., 5.));
    }

    #[test]
    fn clip_box_covers_unbounded_crossings() {
        let shapes = vec![
            Shape::line((0., 0.), (1., 1.)).unwrap(),
            Shape::ray((100., 0.), (101., 0.)).unwrap(),
            Shape::line((200., 0.), (199., 1.)).unwrap(),
        ];
        let rect = clip_box(&shapes, 1.);
        // The two lines cross at (100, 100); the ray heads away from
        // the first line, so that crossing does not count.
        assert_relative_eq!(rect.max().y, 101.);
        assert_relative_eq!(rect.max().x, 201.);
        assert_relative_eq!(rect.min().x, -1.);
    }

    #[test]
    fn rays_clip_towards_their_quadrant() {
        let rect = Rect::new([-10., -10.], [10., 10.]);
        let cases = vec![
            ((1., 0.), c(10., 0.)),
            ((0., 1.), c(0., 10.)),
            ((-1., 0.), c(-10., 0.)),
            ((0., -1.), c(0., -10.)),
            ((1., 2.), c(5., 10.)),
            ((-2., -1.), c(-10., -5.)),
        ];
        for (dir, expected) in cases {
            let ray = Shape::ray((0., 0.), dir).unwrap();
            let pieces = ray.preprocess(&rect);
            assert_eq!(pieces.len(), 1);
            let exit = if pieces[0].left() == c(0., 0.) {
                pieces[0].right()
            } else {
                pieces[0].left()
            };
            assert_relative_eq!(exit.x, expected.x);
            assert_relative_eq!(exit.y, expected.y);
        }
    }

    #[test]
    fn lines_clip_both_ways() {
        let rect = Rect::new([-10., -10.], [10., 10.]);
        let line = Shape::line((1., 1.), (2., 2.)).unwrap();
        let pieces = line.preprocess(&rect);
        assert_eq!(pieces.len(), 1);
        assert_relative_eq!(pieces[0].left().x, -10.);
        assert_relative_eq!(pieces[0].left().y, -10.);
        assert_relative_eq!(pieces[0].right().x, 10.);
        assert_relative_eq!(pieces[0].right().y, 10.);
    }

    #[test]
    fn circles_split_into_quarters() {
        let rect = Rect::new([-10., -10.], [10., 10.]);
        let circle = Shape::circle((0., 0.), 2.).unwrap();
        let pieces = circle.preprocess(&rect);
        assert_eq!(pieces.len(), 4);
        assert!(pieces.iter().all(|p| p.is_arc()));
        assert!(!circle.is_linear());
    }
}
