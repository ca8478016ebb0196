use std::convert::TryFrom;

use criterion::*;
use geo::Rect;

const BBOX: [f64; 2] = [1024., 1024.];

#[path = "utils/random.rs"]
mod random;
use rand::thread_rng;
use random::*;
use shape_crossings::{brute_force, Intersections, Shape};

fn segments(lines: Vec<geo::Line<f64>>) -> Vec<Shape> {
    lines
        .into_iter()
        .filter_map(|l| Shape::try_from(l).ok())
        .collect()
}

fn length_lc(c: &mut Criterion) {
    const NUM_LINES: usize = 1024;

    let bbox: Rect<f64> = Rect::new([0., 0.], BBOX);
    let line_len = BBOX[0] / 5.;

    let shapes = segments(
        (0..NUM_LINES)
            .map(|_| uniform_line_with_length(&mut thread_rng(), bbox, line_len))
            .collect(),
    );
    c.bench_function("Bentley-Ottman - short random lines", |b| {
        b.iter(|| Intersections::new(&shapes).count())
    });
    c.bench_function("Brute-Force - short random lines", |b| {
        b.iter(|| black_box(brute_force(&shapes)))
    });
}

fn uniform_lc(c: &mut Criterion) {
    const NUM_LINES: usize = 256;
    let bbox: Rect<f64> = Rect::new([0., 0.], BBOX);

    let shapes = segments(
        (0..NUM_LINES)
            .map(|_| uniform_line(&mut thread_rng(), bbox))
            .collect(),
    );
    c.bench_function("Bentley-Ottman - uniform random lines", |b| {
        b.iter(|| Intersections::new(&shapes).count())
    });
    c.bench_function("Brute-Force - uniform random lines", |b| {
        b.iter(|| black_box(brute_force(&shapes)))
    });
}

criterion_group!(random, uniform_lc, length_lc);
criterion_main!(random);
