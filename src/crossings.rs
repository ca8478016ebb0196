use std::collections::BTreeSet;

use geo::Coordinate;
use itertools::Itertools;

use crate::{
    events::{IdAllocator, SweepPoint},
    rbtree::RedBlackTree,
    shape::{clip_box, Shape, ShapeId},
};

mod sweep;
use sweep::{decompose, report, Sweep};

/// Default padding of the box that rays and lines are clipped to.
pub const DEFAULT_CLIP_MARGIN: f64 = 10.;

/// A point where two or more input shapes meet.
///
/// Besides the shapes through the point, records how each of them
/// meets it. A shape may appear in more than one of `starts`, `ends`
/// and `through`: a circle ends one quarter and starts the next at its
/// top and bottom points.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionPoint {
    /// Identifier of the point, unique within one run.
    pub id: usize,
    pub point: Coordinate<f64>,
    /// Every input shape passing through the point.
    pub shapes: BTreeSet<ShapeId>,
    /// Shapes with a piece whose left (lower, if vertical) end is the
    /// point.
    pub starts: BTreeSet<ShapeId>,
    /// Shapes with a piece whose right (upper, if vertical) end is the
    /// point.
    pub ends: BTreeSet<ShapeId>,
    /// Shapes with a piece containing the point in its interior.
    pub through: BTreeSet<ShapeId>,
}

/// Tunables of a run.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Padding added on every side of the box rays and lines are
    /// clipped to. Must be positive.
    pub clip_margin: f64,
    /// Only points accepted by this filter are yielded. Every point is
    /// kept when unset.
    pub keep: Option<fn(&IntersectionPoint) -> bool>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            clip_margin: DEFAULT_CLIP_MARGIN,
            keep: None,
        }
    }
}

/// Iterator that yields all intersection points.
///
/// Yields every point where at least two of the input shapes meet,
/// exactly once and in lexicographic order. Points where only circles
/// meet are not reported: circles are expected not to cross each
/// other.
///
/// The implementation uses the [Bentley-Ottman] algorithm and runs in
/// O((n + k) log(n)) time; this is faster than a brute-force
/// search for intersections across all pairs of input shapes if k,
/// the number of intersections is small compared to n^2.
///
/// [Bentley-Ottman]: //en.wikipedia.org/wiki/Bentley%E2%80%93Ottmann_algorithm
pub struct Intersections {
    sweep: Sweep,
}

impl Intersections {
    pub fn new(shapes: &[Shape]) -> Self {
        Self::with_options(shapes, Options::default())
    }

    pub fn with_options(shapes: &[Shape], options: Options) -> Self {
        debug_assert!(options.clip_margin > 0., "clip margin must be positive");
        Intersections {
            sweep: Sweep::new(shapes, &options),
        }
    }
}

impl Iterator for Intersections {
    type Item = IntersectionPoint;

    fn next(&mut self) -> Option<Self::Item> {
        self.sweep.next_intersection()
    }
}

/// Find all intersection points of `shapes`.
pub fn find_intersections(shapes: &[Shape]) -> Vec<IntersectionPoint> {
    Intersections::new(shapes).collect()
}

/// Find all intersection points by testing every pair of pieces.
///
/// Takes O(n^2) time. Clips and merges the input like the sweep does,
/// and so reports the same points as [`find_intersections`], which
/// makes it useful to cross-check results.
pub fn brute_force(shapes: &[Shape]) -> Vec<IntersectionPoint> {
    brute_force_with_options(shapes, Options::default())
}

/// [`brute_force`] with the clip margin and filter of `options`.
pub fn brute_force_with_options(shapes: &[Shape], options: Options) -> Vec<IntersectionPoint> {
    let clip = clip_box(shapes, options.clip_margin);
    let split = decompose(shapes, &clip);

    let mut ids = IdAllocator::default();
    let mut found: RedBlackTree<SweepPoint, BTreeSet<usize>> = RedBlackTree::new();
    for ((ka, a), (kb, b)) in split.pieces.iter().enumerate().tuple_combinations() {
        if a.members[0] == b.members[0] || (a.geom.is_arc() && b.geom.is_arc()) {
            continue;
        }
        for q in a.geom.intersect(&b.geom) {
            let key = SweepPoint::new(q, usize::MAX);
            match found.get_mut(&key) {
                Some(keys) => {
                    keys.insert(ka);
                    keys.insert(kb);
                }
                None => {
                    found.put(ids.point(q), [ka, kb].iter().copied().collect());
                }
            }
        }
    }

    found
        .iter()
        .filter_map(|(p, keys)| report(&split, keys.iter().copied(), *p))
        .filter(|p| options.keep.map_or(true, |keep| keep(p)))
        .collect()
}
