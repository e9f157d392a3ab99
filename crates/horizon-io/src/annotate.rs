//! Annotated output frames: the original image with the detected horizon
//! drawn over it.

use std::path::Path;

use horizon_pipeline::LineSegment;
use horizon_pipeline::draw;
use image::{Rgb, RgbImage};

/// Horizon stroke colour.
pub const LINE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Horizon stroke width in pixels.
pub const LINE_WIDTH: u32 = 2;

/// Copy of `frame` with `horizon` drawn as a [`LINE_WIDTH`] px
/// [`LINE_COLOR`] line.
#[must_use = "returns the annotated copy"]
pub fn annotate(frame: &RgbImage, horizon: LineSegment) -> RgbImage {
    let mut annotated = frame.clone();
    draw::draw_segment(&mut annotated, horizon, LINE_WIDTH, LINE_COLOR);
    annotated
}

/// Save an annotated frame. The format follows the path's extension.
///
/// # Errors
///
/// Returns the encoder or I/O error from `image`.
pub fn save(image: &RgbImage, path: &Path) -> Result<(), image::ImageError> {
    image.save(path)
}
