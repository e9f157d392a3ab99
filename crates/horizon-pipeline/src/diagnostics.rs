//! Per-frame diagnostics: timing and counts for each pipeline stage.
//!
//! [`detect_with_diagnostics`] runs the same stages as
//! [`detect`](crate::detect) and records how long each took along with
//! the numbers that matter when tuning thresholds.
//!
//! Durations are serialized as fractional seconds (`f64`) since
//! `std::time::Duration` does not implement serde traits.

use std::time::{Duration, Instant};

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::mask::Region;
use crate::types::{Detection, PipelineConfig, PipelineError};
use crate::{boundary, decode, hough, score, segment};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected while detecting the horizon in one frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameDiagnostics {
    /// Image decoding.
    pub decode: StageDiagnostics,
    /// Blue channel, blur, Otsu and morphology.
    pub segment: StageDiagnostics,
    /// Canny, contour selection, smoothing and rasterization.
    pub boundary: StageDiagnostics,
    /// Hough transform and candidate selection.
    pub hough: StageDiagnostics,
    /// Candidate scoring and minimum-cost selection.
    pub scoring: StageDiagnostics,
    /// Wall-clock duration of the whole frame (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the encoded input.
        input_bytes: usize,
        /// Decoded width in pixels.
        width: u32,
        /// Decoded height in pixels.
        height: u32,
    },
    /// Land mask metrics.
    Segment {
        /// Fraction of pixels classified as sky, in `[0, 1]`.
        sky_fraction: f64,
        /// Morphology radius that was applied.
        morphology_radius: u8,
    },
    /// Boundary extraction metrics.
    Boundary {
        /// Edge pixels in the mask's Canny map.
        edge_pixel_count: u64,
        /// External contours found.
        contour_count: usize,
        /// Points in the selected contour.
        contour_points: usize,
        /// Points after smoothing.
        simplified_points: usize,
    },
    /// Hough metrics.
    Hough {
        /// Lines at or above the vote threshold.
        lines_found: usize,
        /// Votes of the strongest line.
        max_votes: u32,
    },
    /// Scoring metrics.
    Scoring {
        /// Cost of each candidate, in candidate order.
        candidate_costs: Vec<u64>,
        /// Cost of the selected candidate.
        selected_cost: u64,
    },
}

/// Run the pipeline on encoded bytes, recording per-stage diagnostics.
///
/// # Errors
///
/// Same as [`detect`](crate::detect).
pub fn detect_with_diagnostics(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<(Detection, FrameDiagnostics), PipelineError> {
    config.validate()?;
    let (image, decode) = decode_with_diagnostics(image_bytes)?;
    detect_image_with_diagnostics(&image, decode, config)
}

/// Decode a frame and record the decode stage.
///
/// # Errors
///
/// Same as [`decode_rgb`](crate::decode::decode_rgb).
pub fn decode_with_diagnostics(
    image_bytes: &[u8],
) -> Result<(RgbImage, StageDiagnostics), PipelineError> {
    let start = Instant::now();
    let image = decode::decode_rgb(image_bytes)?;
    let decode = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Decode {
            input_bytes: image_bytes.len(),
            width: image.width(),
            height: image.height(),
        },
    };
    Ok((image, decode))
}

/// Run the pipeline on a frame decoded by [`decode_with_diagnostics`].
///
/// The total duration includes the decode stage.
///
/// # Errors
///
/// Same as [`detect_image`](crate::detect_image).
pub fn detect_image_with_diagnostics(
    image: &RgbImage,
    decode: StageDiagnostics,
    config: &PipelineConfig,
) -> Result<(Detection, FrameDiagnostics), PipelineError> {
    config.validate()?;
    let total_start = Instant::now();

    let start = Instant::now();
    let mask = segment::segment(image, config);
    #[allow(clippy::cast_precision_loss)]
    let sky_fraction = mask.count(Region::Sky) as f64 / mask.dimensions().pixel_count() as f64;
    let segment = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Segment {
            sky_fraction,
            morphology_radius: config.morphology_radius,
        },
    };

    let start = Instant::now();
    let extracted = boundary::extract(&mask, config)?;
    let boundary = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Boundary {
            edge_pixel_count: extracted.edge_pixel_count,
            contour_count: extracted.contour_count,
            contour_points: extracted.contour.len(),
            simplified_points: extracted.simplified.len(),
        },
    };

    let start = Instant::now();
    let lines = hough::detect_lines(&extracted.contour_image, config)?;
    let lines_found = lines.len();
    let max_votes = lines.first().map_or(0, |l| l.votes);
    let lines = hough::strongest(lines)?;
    let hough = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Hough {
            lines_found,
            max_votes,
        },
    };

    let start = Instant::now();
    let scored = score::score_all(&lines, &mask, config);
    let detection = crate::assemble(scored, mask.dimensions())?;
    let scoring = StageDiagnostics {
        duration: start.elapsed(),
        metrics: StageMetrics::Scoring {
            candidate_costs: detection.candidates.iter().map(|c| c.cost).collect(),
            selected_cost: detection.cost,
        },
    };

    let diagnostics = FrameDiagnostics {
        segment,
        boundary,
        hough,
        scoring,
        total_duration: decode.duration + total_start.elapsed(),
        decode,
    };
    Ok((detection, diagnostics))
}

impl FrameDiagnostics {
    /// Human-readable per-stage breakdown.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Frame Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());
        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        for (name, diag) in self.stages() {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.join("\n")
    }

    /// Stages in execution order, with display names.
    #[must_use]
    pub fn stages(&self) -> [(&'static str, &StageDiagnostics); 5] {
        [
            ("Decode", &self.decode),
            ("Segment", &self.segment),
            ("Boundary", &self.boundary),
            ("Hough", &self.hough),
            ("Scoring", &self.scoring),
        ]
    }
}

fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Segment {
            sky_fraction,
            morphology_radius,
        } => format!(
            "sky={:.1}% morphology r={morphology_radius}",
            sky_fraction * 100.0
        ),
        StageMetrics::Boundary {
            edge_pixel_count,
            contour_count,
            contour_points,
            simplified_points,
        } => format!(
            "edges={edge_pixel_count} {contour_count} contours, longest {contour_points}->{simplified_points} pts",
        ),
        StageMetrics::Hough {
            lines_found,
            max_votes,
        } => format!("{lines_found} lines, max votes {max_votes}"),
        StageMetrics::Scoring {
            candidate_costs,
            selected_cost,
        } => format!("costs={candidate_costs:?} selected={selected_cost}"),
    }
}
