//! Candidate scoring against the land mask.
//!
//! A polar line is turned into a full-width segment, the segment splits
//! the frame into an upper (Sky) and lower (Land) half-plane, and the
//! cost is the number of pixels where that split disagrees with the
//! mask. This is a symmetric-difference count: false land and false sky
//! are penalised equally.

use crate::mask::{BinaryMask, Region};
use crate::types::{Dimensions, LineSegment, PipelineConfig, PolarLine, ScoredCandidate};

/// Reconstruct full-width endpoints from a polar line.
///
/// With `a = cos(theta)`, `b = sin(theta)`, `y0 = b * rho`:
///
/// - left endpoint: `(0, y0 + height * a)`
/// - right endpoint: `(width - 1, y0 - height * a)`
///
/// y values are truncated toward zero. The vertical offset uses `cos`
/// where the true line slope would call for `cos/sin` scaled by the
/// width; this projection is kept as-is because every existing
/// annotation and tuned threshold was produced with it.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn reconstruct(line: &PolarLine, dimensions: Dimensions) -> LineSegment {
    let a = line.theta.cos();
    let b = line.theta.sin();
    let y0 = b * line.rho;
    let h = f64::from(dimensions.height);

    LineSegment {
        x1: 0,
        y1: h.mul_add(a, y0) as i32,
        x2: dimensions.width.saturating_sub(1) as i32,
        y2: (-h).mul_add(a, y0) as i32,
    }
}

/// Rasterize the half-plane split of a segment.
///
/// Pixels on or above the segment are [`Region::Sky`], pixels below are
/// [`Region::Land`].
#[must_use = "returns the candidate mask"]
pub fn candidate_mask(segment: LineSegment, dimensions: Dimensions) -> BinaryMask {
    BinaryMask::from_fn(dimensions.width, dimensions.height, |x, y| {
        if f64::from(y) <= segment.y_at(f64::from(x)) {
            Region::Sky
        } else {
            Region::Land
        }
    })
}

/// Number of pixels classified differently by the two masks.
///
/// Both masks must have the same dimensions.
#[must_use]
pub fn mismatch_count(candidate: &BinaryMask, mask: &BinaryMask) -> u64 {
    debug_assert_eq!(candidate.dimensions(), mask.dimensions());
    candidate
        .regions()
        .iter()
        .zip(mask.regions())
        .filter(|(a, b)| a != b)
        .count() as u64
}

/// Score a single line against a mask whose polarity is already
/// normalised (sky on top).
fn score_normalised(line: PolarLine, mask: &BinaryMask) -> ScoredCandidate {
    let dimensions = mask.dimensions();
    let segment = reconstruct(&line, dimensions);
    let cost = mismatch_count(&candidate_mask(segment, dimensions), mask);
    ScoredCandidate {
        line,
        segment,
        cost,
    }
}

/// Score one candidate line against the land mask.
///
/// The mask's polarity is normalised first (see
/// [`BinaryMask::sky_on_top`]). `config.alpha` is accepted for a future
/// weighted cost and currently has no effect.
#[must_use]
pub fn score(line: PolarLine, mask: &BinaryMask, config: &PipelineConfig) -> ScoredCandidate {
    score_normalised(line, &mask.sky_on_top(config.polarity_rows))
}

/// Score every line against the land mask, in input order.
///
/// Polarity is normalised once for the whole set.
#[must_use]
pub fn score_all(
    lines: &[PolarLine],
    mask: &BinaryMask,
    config: &PipelineConfig,
) -> Vec<ScoredCandidate> {
    let normalised = mask.sky_on_top(config.polarity_rows);
    lines
        .iter()
        .map(|&line| {
            let scored = score_normalised(line, &normalised);
            log::debug!(
                "candidate rho={:.1} theta={:.4} votes={} -> {:?} cost {}",
                line.rho,
                line.theta,
                line.votes,
                scored.segment,
                scored.cost,
            );
            scored
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_3};

    const HD: Dimensions = Dimensions {
        width: 1920,
        height: 1080,
    };

    const SQUARE: Dimensions = Dimensions {
        width: 100,
        height: 100,
    };

    fn polar(rho: f64, theta: f64) -> PolarLine {
        PolarLine {
            rho,
            theta,
            votes: 0,
        }
    }

    fn horizon_mask(boundary: u32, top: Region) -> BinaryMask {
        BinaryMask::from_fn(100, 100, |_, y| if y < boundary { top } else { top.opposite() })
    }

    #[test]
    fn reconstruct_origin_line() {
        let seg = reconstruct(&polar(0.0, 0.0), HD);
        assert_eq!(seg, LineSegment::new(0, 1080, 1919, -1080));
    }

    #[test]
    fn reconstruct_spans_full_width() {
        let seg = reconstruct(&polar(300.0, 1.2), HD);
        assert_eq!(seg.x1, 0);
        assert_eq!(seg.x2, 1919);
    }

    #[test]
    fn reconstruct_horizontal_line() {
        let seg = reconstruct(&polar(50.0, FRAC_PI_2), SQUARE);
        assert_eq!(seg.y1, 50);
        // cos(pi/2) is a tiny positive float, so truncation can drop the
        // right endpoint by one row.
        assert!((49..=50).contains(&seg.y2), "y2 = {}", seg.y2);
    }

    #[test]
    fn reconstruct_follows_cosine_projection() {
        // theta = pi/3: y0 = 60 * sin = 51.96, height * cos = 50.
        let seg = reconstruct(&polar(60.0, FRAC_PI_3), SQUARE);
        assert_eq!(seg, LineSegment::new(0, 101, 99, 1));
    }

    #[test]
    fn candidate_mask_splits_at_segment() {
        let mask = candidate_mask(LineSegment::new(0, 10, 9, 10), Dimensions {
            width: 10,
            height: 20,
        });
        assert_eq!(mask.region(5, 10), Region::Sky);
        assert_eq!(mask.region(5, 11), Region::Land);
        assert_eq!(mask.count(Region::Sky), 110);
    }

    #[test]
    fn exact_diagonal_fit_costs_zero() {
        let line = polar(60.0, FRAC_PI_3);
        let seg = reconstruct(&line, SQUARE);
        let mask = BinaryMask::from_fn(100, 100, |x, y| {
            let boundary = 101.0 - 100.0 * f64::from(x) / 99.0;
            if f64::from(y) <= boundary {
                Region::Sky
            } else {
                Region::Land
            }
        });
        assert_eq!(seg, LineSegment::new(0, 101, 99, 1));
        let scored = score(line, &mask, &PipelineConfig::default());
        assert_eq!(scored.cost, 0);
        assert_eq!(scored.segment, seg);
    }

    #[test]
    fn offset_line_costs_the_band_between() {
        let mask = horizon_mask(50, Region::Sky);
        let scored = score(polar(40.0, FRAC_PI_2), &mask, &PipelineConfig::default());
        // Rows 41..=49 are sky but fall below the candidate: ~9 rows.
        assert!(
            (800..=1000).contains(&scored.cost),
            "cost {} outside expected band",
            scored.cost,
        );
    }

    #[test]
    fn land_on_top_is_normalised() {
        let config = PipelineConfig::default();
        let line = polar(49.0, FRAC_PI_2);
        let sky_top = score(line, &horizon_mask(50, Region::Sky), &config);
        let land_top = score(line, &horizon_mask(50, Region::Land), &config);
        assert_eq!(sky_top.cost, land_top.cost);
        assert!(sky_top.cost <= 100);
    }

    #[test]
    fn cost_is_bounded_by_pixel_count() {
        let mask = horizon_mask(50, Region::Sky);
        for theta in [0.0, 0.5, 1.0, 2.0, 3.0] {
            let scored = score(polar(500.0, theta), &mask, &PipelineConfig::default());
            assert!(scored.cost <= SQUARE.pixel_count());
        }
    }

    #[test]
    fn score_all_preserves_order() {
        let mask = horizon_mask(50, Region::Sky);
        let lines = [polar(10.0, FRAC_PI_2), polar(49.0, FRAC_PI_2)];
        let scored = score_all(&lines, &mask, &PipelineConfig::default());
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].line, lines[0]);
        assert!(scored[0].cost > scored[1].cost);
    }

    #[test]
    fn mismatch_count_is_symmetric() {
        let a = horizon_mask(30, Region::Sky);
        let b = horizon_mask(60, Region::Sky);
        assert_eq!(mismatch_count(&a, &b), 3000);
        assert_eq!(mismatch_count(&b, &a), 3000);
    }
}
