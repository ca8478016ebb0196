use std::f64::consts::PI;

use geo::{rotate::RotatePoint, Coordinate, Line, Rect};

use rand::Rng;
use rand_distr::Standard;

#[inline]
#[allow(dead_code)]
pub fn uniform_point<R: Rng>(rng: &mut R, bounds: Rect<f64>) -> Coordinate<f64> {
    let coords: [f64; 2] = rng.sample(Standard);
    let dims = bounds.max() - bounds.min();
    Coordinate {
        x: bounds.min().x + dims.x * coords[0],
        y: bounds.min().y + dims.y * coords[1],
    }
}

#[inline]
#[allow(dead_code)]
pub fn uniform_line<R: Rng>(rng: &mut R, bounds: Rect<f64>) -> Line<f64> {
    Line::new(uniform_point(rng, bounds), uniform_point(rng, bounds))
}

#[inline]
#[allow(dead_code)]
pub fn uniform_line_with_length<R: Rng>(rng: &mut R, bounds: Rect<f64>, length: f64) -> Line<f64> {
    let start = uniform_point(rng, bounds);
    let line = Line::new(start, start + (length, 0.).into());
    let angle = rng.sample::<f64, _>(Standard) * 2. * PI;
    line.rotate_around_point(angle, start.into())
}

/// Centres and radii of `n * n` disjoint circles, one per cell of an
/// even grid over `bounds`.
#[allow(dead_code)]
pub fn grid_circles<R: Rng>(rng: &mut R, bounds: Rect<f64>, n: usize) -> Vec<(Coordinate<f64>, f64)> {
    let cell = Coordinate {
        x: bounds.width() / n as f64,
        y: bounds.height() / n as f64,
    };
    let max_radius = 0.45 * cell.x.min(cell.y);
    let mut circles = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            let center = Coordinate {
                x: bounds.min().x + cell.x * (i as f64 + 0.5),
                y: bounds.min().y + cell.y * (j as f64 + 0.5),
            };
            let radius = max_radius * (0.2 + 0.8 * rng.sample::<f64, _>(Standard));
            circles.push((center, radius));
        }
    }
    circles
}
