//! Contour smoothing with the Ramer-Douglas-Peucker algorithm.
//!
//! The tolerance scales with the contour's closed perimeter so that the
//! same ratio smooths large and small frames alike. The curve itself is
//! treated as open: its first and last points are always kept and never
//! joined.

use crate::types::{Point, Polyline};

/// Simplification tolerance for `contour`: `ratio` times its closed
/// perimeter.
#[must_use]
pub fn epsilon_for(contour: &Polyline, ratio: f64) -> f64 {
    ratio * contour.closed_length()
}

/// Simplify an open polyline.
///
/// Points within `tolerance` pixels of the line through their bracketing
/// kept points are removed. Polylines with fewer than 3 points are
/// returned unchanged.
#[must_use = "returns the simplified polyline"]
pub fn simplify(polyline: &Polyline, tolerance: f64) -> Polyline {
    let points = polyline.points();
    if points.len() < 3 {
        return polyline.clone();
    }

    let mut kept = vec![false; points.len()];
    kept[0] = true;
    kept[points.len() - 1] = true;

    rdp_recurse(points, 0, points.len() - 1, tolerance, &mut kept);

    Polyline::new(
        points
            .iter()
            .zip(&kept)
            .filter(|&(_, k)| *k)
            .map(|(&p, _)| p)
            .collect(),
    )
}

fn rdp_recurse(points: &[Point], start: usize, end: usize, tolerance: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for (i, &p) in points.iter().enumerate().take(end).skip(start + 1) {
        let d = perpendicular_distance(p, points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, tolerance, kept);
        rdp_recurse(points, max_idx, end, tolerance, kept);
    }
}

/// Distance from `p` to the infinite line through `a` and `b`, or to `a`
/// when the two coincide.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(a.y - p.y, -(dy * (a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}
