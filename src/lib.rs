//! Plane-sweep intersections of segments, rays, lines and circles.
//!
//! 1. [Intersections](#intersections)
//! 1. [Overlap Merging](#overlap-merging)
//! 1. [Red-Black Tree](#red-black-tree)
//!
//! # Intersections
//!
//! This is an implementation of the [Bentley-Ottman] algorithm to
//! efficiently compute all points where two or more of a collection of
//! [`Shape`]s meet. The simplest usage is [`find_intersections`];
//! the [`Intersections`] iterator yields the same points lazily, in
//! sweep order. This is essentially a drop-in replacement for
//! [`brute_force`], which tests every pair of shapes, but is
//! typically more efficient.
//!
//! Rays and infinite lines are clipped to a box around the input
//! before the sweep (see [`Options`]). Circles are swept as four
//! quarter arcs; circles are expected not to cross one another, and
//! points where only circles meet are not reported.
//!
//! All predicates use an absolute tolerance of [`EPSILON`].
//!
//! ## Usage
//!
//! ```rust
//! use shape_crossings::{find_intersections, Shape, ShapeError};
//!
//! let input = vec![
//!     Shape::segment((0., 0.), (2., 2.))?,
//!     Shape::segment((0., 2.), (2., 0.))?,
//!     Shape::circle((1., 1.), 1.)?,
//! ];
//! // The diagonals cross at the centre and each meets the circle twice.
//! assert_eq!(find_intersections(&input).len(), 5);
//! # Ok::<(), ShapeError>(())
//! ```
//!
//! # Overlap Merging
//!
//! [`merge`] replaces collinear segments that overlap by their union.
//! The sweep does this internally (for rays and lines too) and reports
//! every merged shape passing through an intersection point.
//!
//! # Red-Black Tree
//!
//! [`RedBlackTree`] is the ordered map used both as the event queue and
//! as the sweep-line status. Its order comes from an injected
//! [`Comparator`] that may carry state of its own.
//!
//! [Bentley-Ottman]: //en.wikipedia.org/wiki/Bentley%E2%80%93Ottmann_algorithm
mod events;
pub use events::SweepPoint;

mod line_or_arc;
pub use line_or_arc::{Arc, LineOrArc, Quarter, Segment};

mod shape;
pub use shape::{clip_box, Circle, Line, Ray, Shape, ShapeError, ShapeId};

mod active;

pub mod crossings;
pub use crossings::{
    brute_force, brute_force_with_options, find_intersections, IntersectionPoint,
    Intersections, Options, DEFAULT_CLIP_MARGIN,
};

pub mod merge;
pub use merge::merge;

pub mod rbtree;
pub use rbtree::{Comparator, Natural, RedBlackTree};

#[cfg(test)]
#[path = "../benches/utils/random.rs"]
pub mod random;

pub(crate) mod utils;
pub use utils::EPSILON;
