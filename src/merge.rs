//! Merging of overlapping collinear segments.
//!
//! Segments lying on a common line that overlap in more than a single
//! point are replaced by their union before the sweep, so the sweep
//! never has to order two pieces that coincide over an interval.
//! Segments that merely touch at an end point are kept apart.
use std::cmp::Ordering;

use log::debug;
use smallvec::{smallvec, SmallVec};

use crate::{
    line_or_arc::Segment,
    shape::{Shape, ShapeId},
    utils::{cross, is_equal, is_zero, lex_compare, norm, orientation},
};

/// A maximal union of overlapping collinear segments.
#[derive(Debug, Clone)]
pub(crate) struct Run {
    pub segment: Segment,
    pub members: SmallVec<[ShapeId; 2]>,
}

/// Merge overlapping collinear segments and return the runs sorted by
/// start and then end point.
pub(crate) fn merge_runs(mut segments: Vec<(Segment, ShapeId)>) -> Vec<Run> {
    segments.sort_by(|a, b| a.0.slope().total_cmp(&b.0.slope()));

    let mut runs = vec![];
    for parallel in groups(&segments, |a, b| is_parallel(&a.0, &b.0)) {
        let reference = parallel[0].0;
        let mut offsets: Vec<_> = parallel
            .iter()
            .map(|&(s, id)| (offset(&reference, &s), s, id))
            .collect();
        offsets.sort_by(|a, b| a.0.total_cmp(&b.0));

        for same_line in groups(&offsets, |a, b| is_equal(a.0, b.0)) {
            let mut same_line: Vec<_> = same_line.iter().map(|&(_, s, id)| (s, id)).collect();
            same_line.sort_by(|a, b| lex_compare(a.0.start(), b.0.start()));
            absorb(&same_line, &mut runs);
        }
    }

    runs.sort_by(|a, b| {
        lex_compare(a.segment.start(), b.segment.start())
            .then_with(|| lex_compare(a.segment.end(), b.segment.end()))
    });
    runs
}

/// Greedily merge segments of one line, sorted by start point.
fn absorb(sorted: &[(Segment, ShapeId)], runs: &mut Vec<Run>) {
    let mut iter = sorted.iter();
    let mut run = match iter.next() {
        Some(&(segment, id)) => Run {
            segment,
            members: smallvec![id],
        },
        None => return,
    };

    for &(segment, id) in iter {
        // Starting at the running end is a touch, not an overlap.
        if lex_compare(segment.start(), run.segment.end()) == Ordering::Less {
            if lex_compare(segment.end(), run.segment.end()) == Ordering::Greater {
                run.segment = Segment::between(run.segment.start(), segment.end());
            }
            run.members.push(id);
        } else {
            flush(run, runs);
            run = Run {
                segment,
                members: smallvec![id],
            };
        }
    }
    flush(run, runs);
}

fn flush(run: Run, runs: &mut Vec<Run>) {
    if run.members.len() > 1 {
        debug!("merged {:?} into {:?}", run.members, run.segment);
    }
    runs.push(run);
}

/// Split a sorted slice into maximal groups of items related to the
/// first item of their group.
fn groups<T, F: Fn(&T, &T) -> bool>(items: &[T], related: F) -> Vec<&[T]> {
    let mut groups = vec![];
    let mut start = 0;
    for i in 1..items.len() {
        if !related(&items[start], &items[i]) {
            groups.push(&items[start..i]);
            start = i;
        }
    }
    if start < items.len() {
        groups.push(&items[start..]);
    }
    groups
}

fn is_parallel(a: &Segment, b: &Segment) -> bool {
    let (da, db) = (a.direction(), b.direction());
    is_zero(cross(da, db) / (norm(da) * norm(db)))
}

/// Signed distance of `s` from the line through `reference`.
fn offset(reference: &Segment, s: &Segment) -> f64 {
    orientation(reference.start(), reference.end(), s.start()) / norm(reference.direction())
}

/// Replace overlapping collinear segments by their union.
///
/// Shapes other than segments are returned first, in input order,
/// followed by the merged segments in lexicographic order. Merging the
/// output again returns it unchanged.
pub fn merge(shapes: &[Shape]) -> Vec<Shape> {
    let mut merged: Vec<Shape> = shapes
        .iter()
        .filter(|s| !matches!(s, Shape::Segment(_)))
        .copied()
        .collect();

    let segments = shapes
        .iter()
        .enumerate()
        .filter_map(|(i, s)| match s {
            Shape::Segment(seg) => Some((*seg, ShapeId(i))),
            _ => None,
        })
        .collect();
    merged.extend(
        merge_runs(segments)
            .into_iter()
            .map(|run| Shape::Segment(run.segment)),
    );
    merged
}
