//! Shared types for the horizon detection pipeline.

use serde::{Deserialize, Serialize};

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// A sequence of connected points forming an open path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a new polyline from a vector of points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of points in the polyline.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Length of the path through every point, in pixels.
    #[must_use]
    pub fn open_length(&self) -> f64 {
        self.0.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// Perimeter of the path treated as a closed loop (last point
    /// connected back to the first).
    #[must_use]
    pub fn closed_length(&self) -> f64 {
        match (self.0.first(), self.0.last()) {
            (Some(&first), Some(&last)) if self.0.len() > 1 => {
                self.open_length() + last.distance(first)
            }
            _ => 0.0,
        }
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Total pixel count.
    #[must_use]
    pub fn pixel_count(self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// A line in Hough (polar) form: `x*cos(theta) + y*sin(theta) = rho`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolarLine {
    /// Signed perpendicular distance from the origin, in pixels.
    pub rho: f64,
    /// Angle of the line normal, in radians, within `[0, pi)`.
    pub theta: f64,
    /// Accumulator votes this line received.
    pub votes: u32,
}

/// A line segment with integer endpoints spanning the full image width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSegment {
    /// Left endpoint x (always 0 for reconstructed candidates).
    pub x1: i32,
    /// Left endpoint y.
    pub y1: i32,
    /// Right endpoint x (always `width - 1` for reconstructed candidates).
    pub x2: i32,
    /// Right endpoint y.
    pub y2: i32,
}

impl LineSegment {
    /// Create a segment from its two endpoints.
    #[must_use]
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Endpoints as `[x1, y1, x2, y2]`.
    #[must_use]
    pub fn coordinates(self) -> [f64; 4] {
        [
            f64::from(self.x1),
            f64::from(self.y1),
            f64::from(self.x2),
            f64::from(self.y2),
        ]
    }

    /// The segment's y coordinate at column `x`, by linear interpolation
    /// through both endpoints (extrapolated outside them).
    #[must_use]
    pub fn y_at(self, x: f64) -> f64 {
        let dx = f64::from(self.x2 - self.x1);
        if dx == 0.0 {
            return f64::from(self.y1.min(self.y2));
        }
        let t = (x - f64::from(self.x1)) / dx;
        t.mul_add(f64::from(self.y2 - self.y1), f64::from(self.y1))
    }
}

/// A candidate segment together with its mismatch cost.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// The Hough line the candidate was built from.
    pub line: PolarLine,
    /// Endpoints reconstructed from `line`.
    pub segment: LineSegment,
    /// Number of pixels where the candidate disagrees with the mask.
    pub cost: u64,
}

/// Result of detecting the horizon in a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// The selected horizon line.
    pub horizon: LineSegment,
    /// Cost of the selected line.
    pub cost: u64,
    /// Every scored candidate, in generation order.
    pub candidates: Vec<ScoredCandidate>,
    /// Dimensions of the processed frame.
    pub dimensions: Dimensions,
}

/// Configuration for the horizon detection pipeline.
///
/// The defaults reproduce the established parameter set; changing them
/// changes which line is chosen on real footage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Side length of the square Gaussian kernel. Must be odd.
    pub blur_kernel_size: u32,

    /// Gaussian kernel sigma.
    pub blur_sigma: f32,

    /// Radius of the square structuring element used for opening and
    /// closing. A radius of 10 is a 21x21 square.
    pub morphology_radius: u8,

    /// Canny low (hysteresis) threshold.
    pub canny_low: f32,

    /// Canny high threshold.
    pub canny_high: f32,

    /// Polygon simplification tolerance as a fraction of the selected
    /// contour's closed perimeter.
    pub simplify_epsilon_ratio: f64,

    /// Stroke width of the rasterized boundary contour, in pixels.
    pub contour_stroke_width: u32,

    /// Hough accumulator distance resolution, in pixels.
    pub hough_rho_step: f64,

    /// Hough accumulator angle resolution, in radians.
    pub hough_theta_step: f64,

    /// Minimum votes for an accumulator cell to become a candidate.
    pub hough_vote_threshold: u32,

    /// Neighbourhood radius (in accumulator cells) for peak suppression.
    /// Zero disables suppression.
    pub hough_suppression_radius: u32,

    /// Number of top rows inspected to decide mask polarity.
    pub polarity_rows: u32,

    /// Cost weighting factor. Reserved; the current cost ignores it.
    pub alpha: f64,
}

impl PipelineConfig {
    /// Default Gaussian kernel size.
    pub const DEFAULT_BLUR_KERNEL_SIZE: u32 = 15;
    /// Default Gaussian sigma.
    pub const DEFAULT_BLUR_SIGMA: f32 = 9.0;
    /// Default morphology radius (21x21 square).
    pub const DEFAULT_MORPHOLOGY_RADIUS: u8 = 10;
    /// Default Canny low threshold.
    pub const DEFAULT_CANNY_LOW: f32 = 100.0;
    /// Default Canny high threshold.
    pub const DEFAULT_CANNY_HIGH: f32 = 200.0;
    /// Default simplification tolerance ratio.
    pub const DEFAULT_SIMPLIFY_EPSILON_RATIO: f64 = 0.002;
    /// Default contour stroke width.
    pub const DEFAULT_CONTOUR_STROKE_WIDTH: u32 = 2;
    /// Default Hough distance resolution.
    pub const DEFAULT_HOUGH_RHO_STEP: f64 = 1.0;
    /// Default Hough angle resolution (one degree).
    pub const DEFAULT_HOUGH_THETA_STEP: f64 = std::f64::consts::PI / 180.0;
    /// Finest accepted Hough distance resolution.
    pub const MIN_HOUGH_RHO_STEP: f64 = 0.1;
    /// Finest accepted Hough angle resolution (a tenth of a degree).
    pub const MIN_HOUGH_THETA_STEP: f64 = std::f64::consts::PI / 1800.0;
    /// Default Hough vote threshold.
    pub const DEFAULT_HOUGH_VOTE_THRESHOLD: u32 = 75;
    /// Default Hough suppression radius (disabled).
    pub const DEFAULT_HOUGH_SUPPRESSION_RADIUS: u32 = 0;
    /// Default number of rows used for the polarity check.
    pub const DEFAULT_POLARITY_ROWS: u32 = 10;
    /// Default cost weighting factor.
    pub const DEFAULT_ALPHA: f64 = 1.0;

    /// Check the configuration for values the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "blur_kernel_size must be odd and positive, got {}",
                self.blur_kernel_size,
            )));
        }
        if self.blur_sigma.is_nan() || self.blur_sigma <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "blur_sigma must be positive, got {}",
                self.blur_sigma,
            )));
        }
        if self.simplify_epsilon_ratio.is_nan() || self.simplify_epsilon_ratio < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "simplify_epsilon_ratio must be non-negative, got {}",
                self.simplify_epsilon_ratio,
            )));
        }
        if self.contour_stroke_width == 0 {
            return Err(PipelineError::InvalidConfig(
                "contour_stroke_width must be at least 1".to_string(),
            ));
        }
        if !self.hough_rho_step.is_finite() || self.hough_rho_step < Self::MIN_HOUGH_RHO_STEP {
            return Err(PipelineError::InvalidConfig(format!(
                "hough_rho_step must be finite and at least {}, got {}",
                Self::MIN_HOUGH_RHO_STEP,
                self.hough_rho_step,
            )));
        }
        if !self.hough_theta_step.is_finite()
            || self.hough_theta_step < Self::MIN_HOUGH_THETA_STEP
        {
            return Err(PipelineError::InvalidConfig(format!(
                "hough_theta_step must be finite and at least {}, got {}",
                Self::MIN_HOUGH_THETA_STEP,
                self.hough_theta_step,
            )));
        }
        if self.hough_vote_threshold == 0 {
            return Err(PipelineError::InvalidConfig(
                "hough_vote_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            blur_kernel_size: Self::DEFAULT_BLUR_KERNEL_SIZE,
            blur_sigma: Self::DEFAULT_BLUR_SIGMA,
            morphology_radius: Self::DEFAULT_MORPHOLOGY_RADIUS,
            canny_low: Self::DEFAULT_CANNY_LOW,
            canny_high: Self::DEFAULT_CANNY_HIGH,
            simplify_epsilon_ratio: Self::DEFAULT_SIMPLIFY_EPSILON_RATIO,
            contour_stroke_width: Self::DEFAULT_CONTOUR_STROKE_WIDTH,
            hough_rho_step: Self::DEFAULT_HOUGH_RHO_STEP,
            hough_theta_step: Self::DEFAULT_HOUGH_THETA_STEP,
            hough_vote_threshold: Self::DEFAULT_HOUGH_VOTE_THRESHOLD,
            hough_suppression_radius: Self::DEFAULT_HOUGH_SUPPRESSION_RADIUS,
            polarity_rows: Self::DEFAULT_POLARITY_ROWS,
            alpha: Self::DEFAULT_ALPHA,
        }
    }
}

/// Errors that can occur while detecting the horizon in one frame.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// Edge detection on the mask produced no external contours.
    #[error("no contours found in the land mask")]
    NoContours,

    /// The Hough transform returned fewer lines than are scored per frame.
    #[error("found {found} Hough line(s), need {required}")]
    InsufficientLines {
        /// Number of lines that cleared the vote threshold.
        found: usize,
        /// Number of lines the selector requires.
        required: usize,
    },

    /// The selector was handed no candidates.
    #[error("no scored candidates to select from")]
    NoCandidates,
}
