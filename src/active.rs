use std::{cmp::Ordering, fmt::Debug, rc::Rc};

use geo::Coordinate;
use smallvec::SmallVec;

use crate::{line_or_arc::LineOrArc, rbtree::Comparator, shape::ShapeId, utils::compare};

/// A x-monotone piece of the input, with the input shapes it stands
/// for.
///
/// A piece from a merged run of segments has every segment of the run
/// as a member.
#[derive(Debug, Clone)]
pub(crate) struct Piece {
    pub geom: LineOrArc,
    pub members: SmallVec<[ShapeId; 2]>,
}

/// Orders active pieces bottom to top along the sweep line.
///
/// Pieces are compared by their height on the vertical line through
/// the current sweep position. Pieces at the same height are ordered
/// as they are immediately to the right of that position: by slope,
/// then by curvature. Vertical segments have infinite slope and so sit
/// above every other piece through the same point.
pub(crate) struct StatusOrder {
    pieces: Rc<[Piece]>,
    at: Coordinate<f64>,
}

impl Debug for StatusOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusOrder")
            .field("pieces", &self.pieces.len())
            .field("at", &self.at)
            .finish()
    }
}

impl StatusOrder {
    pub fn new(pieces: Rc<[Piece]>) -> Self {
        StatusOrder {
            pieces,
            at: Coordinate { x: f64::NEG_INFINITY, y: 0. },
        }
    }

    /// Move the sweep position.
    ///
    /// Pieces stored in the status must not cross strictly between the
    /// old and the new position.
    #[inline]
    pub fn set_position(&mut self, at: Coordinate<f64>) {
        self.at = at;
    }
}

impl Comparator<usize> for StatusOrder {
    fn compare(&self, a: &usize, b: &usize) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let (pa, pb) = (&self.pieces[*a].geom, &self.pieces[*b].geom);
        let x = self.at.x;
        compare(pa.y_at(self.at), pb.y_at(self.at))
            .then_with(|| compare(pa.slope_at(x), pb.slope_at(x)))
            .then_with(|| compare(pa.curvature_at(x), pb.curvature_at(x)))
            .then_with(|| a.cmp(b))
    }
}

/// Locate `at` relative to an active piece.
///
/// Pieces through `at` match; the others are below or above it. Use
/// as a probe into the status tree.
pub(crate) fn locate(pieces: &[Piece], key: usize, at: Coordinate<f64>) -> Ordering {
    let geom = &pieces[key].geom;
    if geom.contains(at) {
        Ordering::Equal
    } else {
        compare(geom.y_at(at), at.y)
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;
    use crate::{
        line_or_arc::{Arc, Quarter, Segment},
        rbtree::RedBlackTree,
    };

    fn line(a: (f64, f64), b: (f64, f64)) -> Piece {
        Piece {
            geom: LineOrArc::Line(Segment::new(a, b).unwrap()),
            members: smallvec![ShapeId(0)],
        }
    }

    fn arc(center: (f64, f64), radius: f64, quarter: Quarter) -> Piece {
        Piece {
            geom: LineOrArc::Arc(Arc::new(center.into(), radius, quarter)),
            members: smallvec![ShapeId(1)],
        }
    }

    fn status(pieces: Vec<Piece>) -> RedBlackTree<usize, (), StatusOrder> {
        RedBlackTree::with_comparator(StatusOrder::new(pieces.into()))
    }

    fn order(tree: &RedBlackTree<usize, (), StatusOrder>) -> Vec<usize> {
        tree.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn orders_by_height() {
        let mut tree = status(vec![
            line((0., 2.), (4., 2.)),
            line((0., 0.), (4., 4.)),
            line((0., -1.), (4., -1.)),
        ]);
        tree.comparator_mut().set_position(Coordinate { x: 0., y: 0. });
        for k in 0..3 {
            tree.put(k, ());
        }
        assert_eq!(order(&tree), vec![2, 1, 0]);
        assert!(tree.check());
    }

    #[test]
    fn ties_broken_by_slope_with_verticals_on_top() {
        let at = Coordinate { x: 1., y: 1. };
        let mut tree = status(vec![
            line((1., 0.), (1., 3.)),
            line((0., 0.), (2., 2.)),
            line((0., 2.), (2., 0.)),
            line((0., 1.), (2., 1.)),
        ]);
        tree.comparator_mut().set_position(at);
        for k in 0..4 {
            tree.put(k, ());
        }
        assert_eq!(order(&tree), vec![2, 3, 1, 0]);
    }

    #[test]
    fn tangent_arc_sits_below_line() {
        let at = Coordinate { x: 0., y: 1. };
        let mut tree = status(vec![
            line((-1., 1.), (1., 1.)),
            arc((0., 0.), 1., Quarter::UpperRight),
        ]);
        tree.comparator_mut().set_position(at);
        tree.put(0, ());
        tree.put(1, ());
        assert_eq!(order(&tree), vec![1, 0]);
    }

    #[test]
    fn locate_matches_pieces_through_point() {
        let pieces = vec![
            line((0., 0.), (2., 2.)),
            line((0., 2.), (2., 0.)),
            line((0., 3.), (2., 3.)),
        ];
        let at = Coordinate { x: 1., y: 1. };
        assert_eq!(locate(&pieces, 0, at), Ordering::Equal);
        assert_eq!(locate(&pieces, 1, at), Ordering::Equal);
        assert_eq!(locate(&pieces, 2, at), Ordering::Greater);
        assert_eq!(
            locate(&pieces, 2, Coordinate { x: 1., y: 4. }),
            Ordering::Less
        );
    }
}
