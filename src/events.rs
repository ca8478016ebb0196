use std::cmp::Ordering;

use geo::Coordinate;
use smallvec::SmallVec;

use crate::{rbtree::RedBlackTree, utils::lex_compare};

/// A sweep event for sweep-line algorithms.
///
/// Only left events carry the piece they start; a piece is found
/// again at its other events by searching the status structure.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Event {
    pub point: Coordinate<f64>,
    pub ty: EventType,
    pub piece: Option<usize>,
}

impl Event {
    pub fn left(point: Coordinate<f64>, piece: usize) -> Self {
        Event {
            point,
            ty: EventType::Left,
            piece: Some(piece),
        }
    }

    pub fn right(point: Coordinate<f64>) -> Self {
        Event {
            point,
            ty: EventType::Right,
            piece: None,
        }
    }

    pub fn intersection(point: Coordinate<f64>) -> Self {
        Event {
            point,
            ty: EventType::Intersection,
            piece: None,
        }
    }
}

/// Event type to associate with event.
///
/// The ordering of the variants is the order in which events at the
/// same point are handled.
#[derive(Debug, PartialOrd, Ord, PartialEq, Eq, Clone, Copy)]
pub(crate) enum EventType {
    Left,
    Intersection,
    Right,
}

/// Wraps a [`Coordinate`] to support lexicographic ordering.
///
/// The ordering is by `x` and then by `y`, with coordinates that
/// differ by at most [`EPSILON`](crate::EPSILON) treated as equal.
/// Each point also carries an identifier that is kept when other
/// events at an equal position are merged into it; the identifier
/// does not take part in comparisons.
#[derive(Debug, Clone, Copy)]
pub struct SweepPoint {
    coord: Coordinate<f64>,
    id: usize,
}

impl SweepPoint {
    /// Create a sweep point while checking the components are finite.
    pub fn new(coord: Coordinate<f64>, id: usize) -> Self {
        assert!(
            coord.x.is_finite(),
            "sweep point requires a finite x-coordinate"
        );
        assert!(
            coord.y.is_finite(),
            "sweep point requires a finite y-coordinate"
        );
        SweepPoint { coord, id }
    }

    #[inline]
    pub fn coord(&self) -> Coordinate<f64> {
        self.coord
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }
}

impl PartialEq for SweepPoint {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SweepPoint {}

impl PartialOrd for SweepPoint {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SweepPoint {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        lex_compare(self.coord, other.coord)
    }
}

/// Hands out point identifiers for one run.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    next: usize,
}

impl IdAllocator {
    pub fn point(&mut self, coord: Coordinate<f64>) -> SweepPoint {
        let id = self.next;
        self.next += 1;
        SweepPoint::new(coord, id)
    }
}

/// Batches of events ordered by position.
///
/// Events pushed at a position equal to an existing batch join that
/// batch, so every distinct position is handled exactly once.
#[derive(Default)]
pub(crate) struct EventQueue {
    batches: RedBlackTree<SweepPoint, SmallVec<[Event; 2]>>,
    ids: IdAllocator,
}

impl EventQueue {
    pub fn push(&mut self, event: Event) {
        let probe = SweepPoint::new(event.point, usize::MAX);
        match self.batches.get_mut(&probe) {
            Some(batch) => batch.push(event),
            None => {
                let point = self.ids.point(event.point);
                let mut batch = SmallVec::new();
                batch.push(event);
                self.batches.put(point, batch);
            }
        }
    }

    /// Remove the lowest position and its events, sorted by type.
    pub fn pop(&mut self) -> Option<(SweepPoint, SmallVec<[Event; 2]>)> {
        let (point, mut batch) = self.batches.delete_min()?;
        batch.sort_by_key(|e| e.ty);
        Some((point, batch))
    }
}

#[cfg(test)]
mod tests {
    use std::iter::from_fn;

    use super::*;

    fn pt(x: f64, y: f64) -> SweepPoint {
        SweepPoint::new(Coordinate { x, y }, 0)
    }

    #[test]
    fn test_sweep_point_ordering() {
        let p1 = pt(0., 0.);
        let p2 = pt(1., 0.);
        let p3 = pt(1., 1.);
        let p4 = pt(1., 1.);
        let p5 = pt(1., 1. + 1e-10);

        assert!(p1 < p2);
        assert!(p1 < p3);
        assert!(p2 < p3);
        assert!(p3 <= p4);
        assert_eq!(p3, p5);
    }

    #[test]
    #[should_panic]
    fn test_sweep_point_rejects_nan() {
        pt(f64::NAN, 0.);
    }

    #[test]
    fn test_event_ordering() {
        let mut queue = EventQueue::default();
        queue.push(Event::right(Coordinate { x: 1., y: 1. }));
        queue.push(Event::left(Coordinate { x: 1., y: 0. }, 2));
        queue.push(Event::intersection(Coordinate { x: 1., y: 1. }));
        queue.push(Event::left(Coordinate { x: 0., y: 0. }, 0));
        queue.push(Event::left(Coordinate { x: 1., y: 1. + 1e-10 }, 3));

        let order: Vec<_> = from_fn(|| queue.pop())
            .map(|(p, batch)| {
                (
                    p.coord(),
                    batch.iter().map(|e| e.ty).collect::<Vec<_>>(),
                )
            })
            .collect();
        assert_eq!(
            order,
            vec![
                (Coordinate { x: 0., y: 0. }, vec![EventType::Left]),
                (Coordinate { x: 1., y: 0. }, vec![EventType::Left]),
                (
                    Coordinate { x: 1., y: 1. },
                    vec![EventType::Left, EventType::Intersection, EventType::Right]
                ),
            ]
        );
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_merged_batch_keeps_first_id() {
        let mut queue = EventQueue::default();
        queue.push(Event::intersection(Coordinate { x: 2., y: 2. }));
        queue.push(Event::left(Coordinate { x: 0., y: 0. }, 0));
        queue.push(Event::intersection(Coordinate { x: 2., y: 2. + 5e-9 }));

        let (first, _) = queue.pop().unwrap();
        assert_eq!(first.id(), 1);
        let (second, batch) = queue.pop().unwrap();
        assert_eq!(second.id(), 0);
        assert_eq!(batch.len(), 2);
    }
}
