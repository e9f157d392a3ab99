//! horizon-pipeline: horizon line detection for single frames (sans-IO).
//!
//! A frame goes through:
//! blue channel -> Gaussian blur -> Otsu threshold -> morphology (land
//! mask) -> Canny -> largest external contour -> RDP smoothing ->
//! Hough lines -> mask-agreement scoring -> minimum-cost selection.
//!
//! This crate has **no I/O dependencies**. It takes encoded bytes or
//! decoded images and returns structured data. Directory traversal,
//! ground-truth files and annotated output live in `horizon-io`.

pub mod blur;
pub mod boundary;
pub mod canny;
pub mod contour;
pub mod decode;
pub mod diagnostics;
pub mod draw;
pub mod edge;
pub mod evaluate;
pub mod hough;
pub mod mask;
pub mod score;
pub mod segment;
pub mod select;
pub mod simplify;
pub mod types;

pub use diagnostics::{
    FrameDiagnostics, decode_with_diagnostics, detect_image_with_diagnostics, detect_with_diagnostics,
};
pub use evaluate::{BatchMetrics, GroundTruth, GroundTruthEntry};
pub use mask::{BinaryMask, Region};
pub use types::{
    Detection, Dimensions, LineSegment, PipelineConfig, PipelineError, Point, PolarLine, Polyline,
    ScoredCandidate,
};

/// Detect the horizon in an encoded frame (PNG, JPEG, BMP, WebP).
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] for an unusable configuration,
/// [`PipelineError::EmptyInput`] or [`PipelineError::ImageDecode`] for
/// unreadable bytes, and the errors of [`detect_from_mask`] otherwise.
pub fn detect(image_bytes: &[u8], config: &PipelineConfig) -> Result<Detection, PipelineError> {
    config.validate()?;
    let image = decode::decode_rgb(image_bytes)?;
    locate(&segment::segment(&image, config), config)
}

/// Detect the horizon in a decoded RGB frame.
///
/// # Errors
///
/// See [`detect_from_mask`].
pub fn detect_image(image: &image::RgbImage, config: &PipelineConfig) -> Result<Detection, PipelineError> {
    config.validate()?;
    locate(&segment::segment(image, config), config)
}

/// Detect the horizon given an already segmented land mask.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] for an unusable configuration,
/// [`PipelineError::NoContours`] when the mask has no boundary and
/// [`PipelineError::InsufficientLines`] when the boundary yields fewer
/// than two Hough lines.
pub fn detect_from_mask(
    mask: &BinaryMask,
    config: &PipelineConfig,
) -> Result<Detection, PipelineError> {
    config.validate()?;
    locate(mask, config)
}

fn locate(mask: &BinaryMask, config: &PipelineConfig) -> Result<Detection, PipelineError> {
    let boundary = boundary::extract(mask, config)?;
    let lines = hough::candidates(&boundary.contour_image, config)?;
    let scored = score::score_all(&lines, mask, config);
    assemble(scored, mask.dimensions())
}

/// Select the winner among scored candidates and package the result.
pub(crate) fn assemble(
    candidates: Vec<ScoredCandidate>,
    dimensions: Dimensions,
) -> Result<Detection, PipelineError> {
    let best = *select::select_best(&candidates)?;
    log::debug!("selected {:?} with cost {}", best.segment, best.cost);
    Ok(Detection {
        horizon: best.segment,
        cost: best.cost,
        candidates,
        dimensions,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn split_mask(width: u32, height: u32, boundary: u32, top: Region) -> BinaryMask {
        BinaryMask::from_fn(width, height, |_, y| {
            if y < boundary { top } else { top.opposite() }
        })
    }

    #[test]
    fn empty_input() {
        let result = detect(&[], &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_input() {
        let result = detect(&[0xFF, 0x00], &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn invalid_config_is_rejected_before_work() {
        let config = PipelineConfig {
            blur_kernel_size: 4,
            ..PipelineConfig::default()
        };
        let result = detect(&[], &config);
        assert!(matches!(result, Err(PipelineError::InvalidConfig(_))));
    }

    #[test]
    fn uniform_mask_has_no_contours() {
        let mask = BinaryMask::filled(100, 100, Region::Land);
        let result = detect_from_mask(&mask, &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::NoContours)));
    }

    #[test]
    fn land_above_row_fifty_yields_horizontal_horizon() {
        let mask = split_mask(100, 100, 50, Region::Land);
        let detection = detect_from_mask(&mask, &PipelineConfig::default()).unwrap();

        assert_eq!(detection.candidates.len(), hough::CANDIDATE_COUNT);
        assert_eq!(detection.horizon.x1, 0);
        assert_eq!(detection.horizon.x2, 99);
        for y in [detection.horizon.y1, detection.horizon.y2] {
            assert!((46..=54).contains(&y), "endpoint y {y} far from 50");
        }
        assert!(detection.cost <= 300, "cost {}", detection.cost);
    }

    #[test]
    fn chosen_candidate_has_minimum_cost() {
        let mask = split_mask(120, 90, 40, Region::Sky);
        let detection = detect_from_mask(&mask, &PipelineConfig::default()).unwrap();
        assert!(detection.candidates.iter().all(|c| detection.cost <= c.cost));
        assert!(
            detection
                .candidates
                .iter()
                .any(|c| c.segment == detection.horizon && c.cost == detection.cost)
        );
    }

    #[test]
    fn short_boundary_has_insufficient_lines() {
        // 40 px wide: no line can reach 75 votes.
        let mask = split_mask(40, 40, 20, Region::Sky);
        let result = detect_from_mask(&mask, &PipelineConfig::default());
        assert!(matches!(
            result,
            Err(PipelineError::InsufficientLines { required: 2, .. })
        ));
    }

    #[test]
    fn assemble_without_candidates_fails() {
        let result = assemble(Vec::new(), Dimensions {
            width: 1,
            height: 1,
        });
        assert!(matches!(result, Err(PipelineError::NoCandidates)));
    }
}
