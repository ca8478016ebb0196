use std::{collections::BTreeSet, rc::Rc};

use geo::{Coordinate, Rect};
use itertools::Itertools;
use log::{debug, trace, warn};
use smallvec::{smallvec, SmallVec};

use super::{IntersectionPoint, Options};
use crate::{
    active::{locate, Piece, StatusOrder},
    events::{Event, EventQueue, SweepPoint},
    line_or_arc::LineOrArc,
    merge::merge_runs,
    rbtree::{Comparator, RedBlackTree},
    shape::{clip_box, Shape, ShapeId},
    utils::{coords_equal, lex_compare},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PieceState {
    Inactive,
    Active,
    Retired,
}

/// Sweep algorithm for detecting all intersections.
///
/// This is an internal data-structure that implements the
/// [Bentley-Ottman] sweep over x-monotone pieces. Maintains a queue of
/// event points, and the currently active pieces ordered along the
/// sweep line. End-users should use the iterator interface built
/// around this sweep.
///
/// [Bentley-Ottman]: //en.wikipedia.org/wiki/Bentley%E2%80%93Ottmann_algorithm
pub(crate) struct Sweep {
    split: Decomposition,
    events: EventQueue,
    status: RedBlackTree<usize, (), StatusOrder>,
    states: Vec<PieceState>,
    keep: Option<fn(&IntersectionPoint) -> bool>,
}

impl Sweep {
    pub fn new(shapes: &[Shape], options: &Options) -> Self {
        let clip = clip_box(shapes, options.clip_margin);
        let split = decompose(shapes, &clip);

        let mut events = EventQueue::default();
        for (key, piece) in split.pieces.iter().enumerate() {
            for event in piece.geom.events(key).iter() {
                events.push(*event);
            }
        }
        debug!(
            "sweeping {} shapes as {} pieces",
            shapes.len(),
            split.pieces.len()
        );

        Sweep {
            states: vec![PieceState::Inactive; split.pieces.len()],
            status: RedBlackTree::with_comparator(StatusOrder::new(split.pieces.clone())),
            keep: options.keep,
            split,
            events,
        }
    }

    /// Process events until the next reportable point.
    pub fn next_intersection(&mut self) -> Option<IntersectionPoint> {
        while let Some((point, batch)) = self.events.pop() {
            let found = match self.handle_event_point(point, &batch) {
                Some(found) => found,
                None => continue,
            };
            if self.keep.map_or(true, |keep| keep(&found)) {
                return Some(found);
            }
            trace!("point {:?} rejected by the report filter", found.point);
        }
        None
    }

    /// Handle every event at `point`.
    fn handle_event_point(
        &mut self,
        point: SweepPoint,
        batch: &[Event],
    ) -> Option<IntersectionPoint> {
        let at = point.coord();
        trace!("handling {} events at {:?}", batch.len(), at);
        self.status.comparator_mut().set_position(at);

        let lefts: SmallVec<[usize; 4]> = batch.iter().filter_map(|e| e.piece).collect();

        // Pull out every active piece through the point.
        let pieces = self.split.pieces.clone();
        let mut interiors: SmallVec<[usize; 4]> = SmallVec::new();
        let mut rights: SmallVec<[usize; 4]> = SmallVec::new();
        while let Some((key, ())) = self.status.delete_by(|k: &usize| locate(&pieces, *k, at)) {
            debug_assert_eq!(self.states[key], PieceState::Active);
            if coords_equal(pieces[key].geom.right(), at) {
                self.states[key] = PieceState::Retired;
                rights.push(key);
            } else {
                interiors.push(key);
            }
        }

        let found = report(
            &self.split,
            lefts.iter().chain(interiors.iter()).chain(rights.iter()).copied(),
            point,
        );

        // Re-insert in the order just right of the point.
        let mut through: SmallVec<[usize; 4]> =
            lefts.iter().chain(interiors.iter()).copied().collect();
        for &key in through.iter() {
            debug_assert_ne!(self.states[key], PieceState::Retired);
            self.states[key] = PieceState::Active;
            self.status.put(key, ());
        }

        let mut pairs: SmallVec<[(usize, usize); 4]> = smallvec![];
        if through.is_empty() {
            let below = self
                .status
                .lower_by(|k: &usize| locate(&pieces, *k, at))
                .map(|(k, _)| *k);
            let above = self
                .status
                .higher_by(|k: &usize| locate(&pieces, *k, at))
                .map(|(k, _)| *k);
            pairs.extend(below.zip(above));
        } else {
            let order = self.status.comparator();
            through.sort_by(|a, b| order.compare(a, b));

            // A segment and an arc meeting here may meet again further
            // right, so pieces adjacent within the bundle are tested too.
            pairs.extend(
                through
                    .iter()
                    .copied()
                    .tuple_windows()
                    .filter(|&(a, b)| pieces[a].geom.is_arc() || pieces[b].geom.is_arc()),
            );

            let (lowest, highest) = (through[0], through[through.len() - 1]);
            if let Some((&below, _)) = self.status.lower(&lowest) {
                pairs.push((below, lowest));
            }
            if let Some((&above, _)) = self.status.higher(&highest) {
                pairs.push((highest, above));
            }
        }
        for (below, above) in pairs {
            self.find_new_event(below, above, point);
        }

        found
    }

    /// Schedule the crossings of two neighbouring pieces that lie ahead
    /// of the sweep.
    fn find_new_event(&mut self, below: usize, above: usize, point: SweepPoint) {
        let pieces = &self.split.pieces;
        let (a, b) = (&pieces[below].geom, &pieces[above].geom);
        if a.is_arc() && b.is_arc() {
            return;
        }
        for q in a.intersect(b) {
            if lex_compare(q, point.coord()).is_gt() {
                trace!("scheduling intersection of {} and {} at {:?}", below, above, q);
                self.events.push(Event::intersection(q));
            }
        }
    }
}

/// The pieces swept for one input, and each shape's own pieces.
pub(crate) struct Decomposition {
    pub pieces: Rc<[Piece]>,
    /// Clipped pieces of every input shape, before merging.
    outlines: Vec<SmallVec<[LineOrArc; 4]>>,
}

/// Clip, merge and split the input into the pieces swept.
pub(crate) fn decompose(shapes: &[Shape], clip: &Rect<f64>) -> Decomposition {
    let outlines: Vec<_> = shapes.iter().map(|s| s.preprocess(clip)).collect();

    let mut pieces = vec![];
    let mut linear = vec![];
    for (i, outline) in outlines.iter().enumerate() {
        for &geom in outline.iter() {
            match geom {
                LineOrArc::Line(segment) => linear.push((segment, ShapeId(i))),
                LineOrArc::Arc(_) => pieces.push(Piece {
                    geom,
                    members: smallvec![ShapeId(i)],
                }),
            }
        }
    }
    pieces.extend(merge_runs(linear).into_iter().map(|run| Piece {
        geom: LineOrArc::Line(run.segment),
        members: run.members,
    }));

    Decomposition {
        pieces: pieces.into(),
        outlines,
    }
}

/// How a shape meets a point.
#[derive(Debug, Default, Clone, Copy)]
struct Roles {
    starts: bool,
    ends: bool,
    through: bool,
}

impl Roles {
    fn of<'a, I: IntoIterator<Item = &'a LineOrArc>>(geoms: I, at: Coordinate<f64>) -> Self {
        let mut roles = Roles::default();
        for geom in geoms {
            if coords_equal(geom.left(), at) {
                roles.starts = true;
            } else if coords_equal(geom.right(), at) {
                roles.ends = true;
            } else if geom.contains(at) {
                roles.through = true;
            }
        }
        roles
    }

    fn any(self) -> bool {
        self.starts || self.ends || self.through
    }
}

/// Describe `point` from the pieces meeting there.
///
/// Returns `None` unless pieces of at least two owners meet, where the
/// owner of a piece is its circle, its merged run or its lone shape,
/// and unless some of them is straight: circles are assumed not to
/// cross, so arcs meeting each other are never reported.
pub(crate) fn report<I: IntoIterator<Item = usize>>(
    split: &Decomposition,
    keys: I,
    point: SweepPoint,
) -> Option<IntersectionPoint> {
    let at = point.coord();
    let mut only_arcs = true;
    let mut owners = BTreeSet::new();
    let mut roles: Vec<(ShapeId, Roles)> = vec![];
    for key in keys {
        let piece = &split.pieces[key];
        only_arcs &= piece.geom.is_arc();
        owners.insert(piece.members[0]);
        if piece.members.len() == 1 {
            roles.push((piece.members[0], Roles::of(Some(&piece.geom), at)));
            continue;
        }

        // Members of a run overlap each other; only those through the
        // point are reported.
        let before = roles.len();
        for &id in piece.members.iter() {
            let own = Roles::of(split.outlines[id.0].iter(), at);
            if own.any() {
                roles.push((id, own));
            }
        }
        if roles.len() == before {
            warn!("no member of merged piece {} passes through {:?}", key, at);
            let fallback = Roles::of(Some(&piece.geom), at);
            roles.extend(piece.members.iter().map(|&id| (id, fallback)));
        }
    }

    if only_arcs || owners.len() < 2 {
        return None;
    }

    let mut found = IntersectionPoint {
        id: point.id(),
        point: at,
        shapes: BTreeSet::new(),
        starts: BTreeSet::new(),
        ends: BTreeSet::new(),
        through: BTreeSet::new(),
    };
    for (id, r) in roles {
        found.shapes.insert(id);
        if r.starts {
            found.starts.insert(id);
        }
        if r.ends {
            found.ends.insert(id);
        }
        if r.through {
            found.through.insert(id);
        }
    }
    debug!("intersection at {:?}: {:?}", at, found.shapes);
    Some(found)
}
