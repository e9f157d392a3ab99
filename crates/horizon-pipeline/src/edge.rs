//! Edge detection on the land mask.
//!
//! Wraps [`crate::canny::canny`] with threshold clamping and renders the
//! typed mask to a raster first. Returns a binary image where 255 marks
//! boundary pixels between Land and Sky.

use image::GrayImage;

use crate::mask::BinaryMask;

/// Minimum allowed Canny threshold.
///
/// A threshold of zero turns every pixel into a weak edge, and the flood
/// fill in hysteresis then visits the whole frame.
pub const MIN_THRESHOLD: f32 = 1.0;
const _: () = assert!(MIN_THRESHOLD > 0.0);

/// Detect edges using the Canny algorithm.
///
/// Both thresholds are clamped to at least [`MIN_THRESHOLD`] and
/// `low_threshold` is clamped to at most `high_threshold`.
#[must_use = "returns the binary edge map"]
pub fn canny(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let high = high_threshold.max(MIN_THRESHOLD);
    let low = low_threshold.max(MIN_THRESHOLD).min(high);
    crate::canny::canny(image, low, high)
}

/// Detect the Land/Sky boundary of a mask.
#[must_use = "returns the binary edge map"]
pub fn mask_edges(mask: &BinaryMask, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(&mask.to_land_raster(), low_threshold, high_threshold)
}

/// Count edge pixels (value == 255) in a binary edge map.
#[must_use]
pub fn count_edge_pixels(edges: &GrayImage) -> u64 {
    edges
        .pixels()
        .map(|p| u64::from(u8::from(p.0[0] == crate::canny::EDGE)))
        .sum()
}
