//! Boundary extraction: from land mask to a thin, smoothed contour image.
//!
//! 1. Canny edges of the mask.
//! 2. External contours of the edge map.
//! 3. The contour with the most points.
//! 4. RDP smoothing with tolerance proportional to its perimeter.
//! 5. Rasterization onto a blank canvas as a fixed-width stroke.

use image::{GrayImage, Luma};

use crate::mask::BinaryMask;
use crate::types::{PipelineConfig, PipelineError, Polyline};
use crate::{contour, draw, edge, simplify};

/// Value of stroke pixels in [`Boundary::contour_image`].
pub const STROKE: u8 = 255;

/// The horizon boundary traced from a land mask.
#[derive(Debug, Clone)]
pub struct Boundary {
    /// Smoothed contour rasterized as a stroke on a black canvas, same
    /// size as the mask. This is the Hough transform input.
    pub contour_image: GrayImage,
    /// The selected contour before smoothing.
    pub contour: Polyline,
    /// The selected contour after smoothing.
    pub simplified: Polyline,
    /// Number of external contours found.
    pub contour_count: usize,
    /// Number of edge pixels in the mask's edge map.
    pub edge_pixel_count: u64,
}

/// Extract the horizon boundary of a land mask.
///
/// # Errors
///
/// Returns [`PipelineError::NoContours`] if the mask has no Land/Sky
/// boundary (for example a single-class mask).
pub fn extract(mask: &BinaryMask, config: &PipelineConfig) -> Result<Boundary, PipelineError> {
    let edges = edge::mask_edges(mask, config.canny_low, config.canny_high);
    let edge_pixel_count = edge::count_edge_pixels(&edges);

    let contours = contour::trace_external(&edges);
    let selected = contour::longest(&contours).ok_or(PipelineError::NoContours)?;

    let epsilon = simplify::epsilon_for(selected, config.simplify_epsilon_ratio);
    let simplified = simplify::simplify(selected, epsilon);
    log::debug!(
        "{} contours, longest {} pts, simplified to {} pts (epsilon {epsilon:.3})",
        contours.len(),
        selected.len(),
        simplified.len(),
    );

    let mut contour_image = GrayImage::new(mask.width(), mask.height());
    draw::draw_polyline(
        &mut contour_image,
        &simplified,
        config.contour_stroke_width,
        Luma([STROKE]),
    );

    Ok(Boundary {
        contour_image,
        contour: selected.clone(),
        simplified,
        contour_count: contours.len(),
        edge_pixel_count,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mask::Region;

    fn stroke_rows(img: &GrayImage, x: u32) -> Vec<u32> {
        (0..img.height())
            .filter(|&y| img.get_pixel(x, y).0[0] == STROKE)
            .collect()
    }

    #[test]
    fn uniform_mask_has_no_contours() {
        let mask = BinaryMask::filled(50, 50, Region::Sky);
        let result = extract(&mask, &PipelineConfig::default());
        assert!(matches!(result, Err(PipelineError::NoContours)));
    }

    #[test]
    fn horizontal_boundary_becomes_horizontal_stroke() {
        let mask = BinaryMask::from_fn(100, 100, |_, y| if y < 50 { Region::Sky } else { Region::Land });
        let boundary = extract(&mask, &PipelineConfig::default()).unwrap();

        assert_eq!(boundary.contour_count, 1);
        assert!(boundary.simplified.len() < boundary.contour.len());
        assert_eq!(boundary.contour_image.dimensions(), (100, 100));

        for x in [10, 50, 90] {
            let rows = stroke_rows(&boundary.contour_image, x);
            assert!(!rows.is_empty(), "no stroke in column {x}");
            assert!(
                rows.iter().all(|&y| (48..=52).contains(&y)),
                "column {x} stroke rows {rows:?} stray from the boundary",
            );
        }
    }

    #[test]
    fn largest_boundary_wins_over_noise() {
        // Horizon at row 60 plus an isolated land speck in the sky.
        let mask = BinaryMask::from_fn(120, 120, |x, y| {
            if y >= 60 || ((20..24).contains(&x) && (20..24).contains(&y)) {
                Region::Land
            } else {
                Region::Sky
            }
        });
        let boundary = extract(&mask, &PipelineConfig::default()).unwrap();
        assert!(boundary.contour_count >= 2);
        assert!(boundary.contour.points().iter().all(|p| p.y > 50.0));
    }
}
