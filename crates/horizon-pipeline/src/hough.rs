//! Hough line transform over the boundary contour image.
//!
//! Every stroke pixel votes for all `(rho, theta)` cells of lines passing
//! through it, with `x*cos(theta) + y*sin(theta) = rho`, theta in
//! `[0, pi)` and rho quantised to `rho_step`. Cells with at least
//! `vote_threshold` votes become candidate lines, strongest first.

use std::f64::consts::PI;

use image::GrayImage;

use crate::types::{PipelineConfig, PipelineError, PolarLine};

/// Number of candidate lines scored per frame.
pub const CANDIDATE_COUNT: usize = 2;

/// Upper bound on accumulator cells (512 MiB of `u32` votes).
pub const MAX_ACCUMULATOR_CELLS: usize = 1 << 27;

/// Vote accumulator over `(theta, rho)` cells.
struct Accumulator {
    votes: Vec<u32>,
    rho_bins: usize,
    theta_bins: usize,
    /// Bin offset of rho = 0.
    rho_offset: i64,
    rho_step: f64,
    theta_step: f64,
    cos_table: Vec<f64>,
    sin_table: Vec<f64>,
}

impl Accumulator {
    /// Size the accumulator for a `width` x `height` image.
    ///
    /// Fails with [`PipelineError::InvalidConfig`] when the steps would
    /// need more than [`MAX_ACCUMULATOR_CELLS`] cells for this frame.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn new(width: u32, height: u32, rho_step: f64, theta_step: f64) -> Result<Self, PipelineError> {
        let too_large = || {
            PipelineError::InvalidConfig(format!(
                "Hough steps rho {rho_step} theta {theta_step} need more than \
                 {MAX_ACCUMULATOR_CELLS} accumulator cells for a {width}x{height} frame",
            ))
        };
        let bin_count = |value: f64| {
            (value.is_finite() && value >= 0.0 && value <= MAX_ACCUMULATOR_CELLS as f64)
                .then_some(value as usize)
        };

        let diagonal = f64::from(width).hypot(f64::from(height));
        let rho_offset = bin_count((diagonal / rho_step).ceil()).ok_or_else(too_large)?;
        // Tolerate rounding in `pi / step` so one degree gives 180 bins.
        let theta_bins =
            bin_count(((PI / theta_step) - 1e-9).ceil().max(1.0)).ok_or_else(too_large)?;
        let rho_bins = rho_offset
            .checked_mul(2)
            .and_then(|n| n.checked_add(1))
            .ok_or_else(too_large)?;
        let cells = rho_bins
            .checked_mul(theta_bins)
            .filter(|&n| n <= MAX_ACCUMULATOR_CELLS)
            .ok_or_else(too_large)?;
        let rho_offset = i64::try_from(rho_offset).map_err(|_| too_large())?;

        let (cos_table, sin_table) = (0..theta_bins)
            .map(|n| {
                let theta = n as f64 * theta_step;
                (theta.cos(), theta.sin())
            })
            .unzip();

        Ok(Self {
            votes: vec![0; cells],
            rho_bins,
            theta_bins,
            rho_offset,
            rho_step,
            theta_step,
            cos_table,
            sin_table,
        })
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn vote(&mut self, x: u32, y: u32) {
        let (x, y) = (f64::from(x), f64::from(y));
        for theta in 0..self.theta_bins {
            let rho = x.mul_add(self.cos_table[theta], y * self.sin_table[theta]);
            let bin = (rho / self.rho_step).round() as i64 + self.rho_offset;
            // |rho| never exceeds the diagonal, so the bin is in range.
            if let Ok(bin) = usize::try_from(bin)
                && bin < self.rho_bins
            {
                let cell = &mut self.votes[theta * self.rho_bins + bin];
                *cell = cell.saturating_add(1);
            }
        }
    }

    fn get(&self, theta: usize, rho_bin: usize) -> u32 {
        self.votes[theta * self.rho_bins + rho_bin]
    }

    /// Returns `true` if no cell within `radius` of `(theta, rho_bin)` has
    /// strictly more votes.
    ///
    /// Theta wraps around the half turn: stepping past either end lands on
    /// the other with rho negated, since `(rho, pi)` and `(-rho, 0)` are the
    /// same line.
    #[allow(clippy::cast_possible_wrap)]
    fn is_local_max(&self, theta: usize, rho_bin: usize, radius: usize) -> bool {
        let votes = self.get(theta, rho_bin);
        let r_window = |center: usize| {
            center.saturating_sub(radius)..=(center + radius).min(self.rho_bins - 1)
        };
        let mirrored = self.rho_bins - 1 - rho_bin;
        let theta_bins = self.theta_bins as i64;
        let theta = theta as i64;
        let radius_i = radius.min(self.theta_bins) as i64;

        (theta - radius_i..=theta + radius_i).all(|t| {
            let wrapped = usize::try_from(t.rem_euclid(theta_bins)).unwrap_or(0);
            let center = if t.div_euclid(theta_bins) % 2 == 0 {
                rho_bin
            } else {
                mirrored
            };
            r_window(center).all(|r| self.get(wrapped, r) <= votes)
        })
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
    fn line(&self, theta: usize, rho_bin: usize) -> PolarLine {
        PolarLine {
            rho: (rho_bin as i64 - self.rho_offset) as f64 * self.rho_step,
            theta: theta as f64 * self.theta_step,
            votes: self.get(theta, rho_bin),
        }
    }
}

/// Run the Hough transform over a binary image (non-zero pixels vote).
///
/// Returns every cell with at least `config.hough_vote_threshold` votes,
/// minus cells suppressed by a stronger neighbour when
/// `config.hough_suppression_radius > 0`. Lines are ordered by votes,
/// descending; equal votes keep scan order (theta, then rho).
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] when the accumulator for this
/// image would exceed [`MAX_ACCUMULATOR_CELLS`].
pub fn detect_lines(
    image: &GrayImage,
    config: &PipelineConfig,
) -> Result<Vec<PolarLine>, PipelineError> {
    let mut acc = Accumulator::new(
        image.width(),
        image.height(),
        config.hough_rho_step,
        config.hough_theta_step,
    )?;

    for (x, y, p) in image.enumerate_pixels() {
        if p.0[0] > 0 {
            acc.vote(x, y);
        }
    }

    let radius = config.hough_suppression_radius as usize;
    let mut lines = Vec::new();
    for theta in 0..acc.theta_bins {
        for rho_bin in 0..acc.rho_bins {
            if acc.get(theta, rho_bin) < config.hough_vote_threshold {
                continue;
            }
            if radius > 0 && !acc.is_local_max(theta, rho_bin, radius) {
                continue;
            }
            lines.push(acc.line(theta, rho_bin));
        }
    }

    lines.sort_by(|a, b| b.votes.cmp(&a.votes));
    Ok(lines)
}

/// The [`CANDIDATE_COUNT`] strongest lines of the contour image.
///
/// # Errors
///
/// Returns [`PipelineError::InsufficientLines`] when fewer lines clear the
/// vote threshold, and the errors of [`detect_lines`].
pub fn candidates(
    contour_image: &GrayImage,
    config: &PipelineConfig,
) -> Result<Vec<PolarLine>, PipelineError> {
    let lines = detect_lines(contour_image, config)?;
    log::debug!(
        "{} Hough line(s) at threshold {}",
        lines.len(),
        config.hough_vote_threshold,
    );
    strongest(lines)
}

/// Keep the first [`CANDIDATE_COUNT`] lines of a vote-ordered list.
///
/// # Errors
///
/// Returns [`PipelineError::InsufficientLines`] when the list is shorter.
pub fn strongest(mut lines: Vec<PolarLine>) -> Result<Vec<PolarLine>, PipelineError> {
    if lines.len() < CANDIDATE_COUNT {
        return Err(PipelineError::InsufficientLines {
            found: lines.len(),
            required: CANDIDATE_COUNT,
        });
    }
    lines.truncate(CANDIDATE_COUNT);
    Ok(lines)
}
