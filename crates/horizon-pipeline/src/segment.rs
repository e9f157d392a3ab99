//! Land/sky segmentation of a raw frame.
//!
//! Steps:
//!
//! 1. Gaussian blur of the blue channel (fixed 15x15 kernel, sigma 9).
//! 2. Otsu global threshold: pixels brighter than the level are Sky.
//! 3. Morphological opening then closing with a square structuring
//!    element to drop small blobs and fill small gaps in the land region.
//!
//! A featureless frame still produces a mask (Otsu always picks a level),
//! but it carries no usable boundary. This is reported with a warning and
//! surfaces downstream as [`PipelineError::NoContours`](crate::PipelineError::NoContours).

use image::{GrayImage, RgbImage};
use imageproc::distance_transform::Norm;

use crate::blur;
use crate::decode;
use crate::mask::{BinaryMask, Region};
use crate::types::PipelineConfig;

/// Classify each pixel of a grey image against its Otsu level.
///
/// Pixels strictly brighter than the level become [`Region::Sky`], the
/// rest [`Region::Land`].
#[must_use = "returns the thresholded mask"]
pub fn otsu_binarize(image: &GrayImage) -> BinaryMask {
    let level = imageproc::contrast::otsu_level(image);
    log::debug!("otsu level {level}");
    BinaryMask::from_fn(image.width(), image.height(), |x, y| {
        if image.get_pixel(x, y).0[0] > level {
            Region::Sky
        } else {
            Region::Land
        }
    })
}

/// Morphological opening followed by closing of the land region.
///
/// `radius` is the half-width of the square structuring element under
/// the L-infinity norm; radius 10 is a 21x21 square. Zero leaves the
/// mask unchanged.
#[must_use = "returns the cleaned mask"]
pub fn clean(mask: &BinaryMask, radius: u8) -> BinaryMask {
    if radius == 0 {
        return mask.clone();
    }
    let land = mask.to_land_raster();
    let opened = imageproc::morphology::open(&land, Norm::LInf, radius);
    let closed = imageproc::morphology::close(&opened, Norm::LInf, radius);
    BinaryMask::from_land_raster(&closed)
}

/// Segment a decoded frame into a land/sky mask.
#[must_use = "returns the land/sky mask"]
pub fn segment(image: &RgbImage, config: &PipelineConfig) -> BinaryMask {
    let blue = decode::blue_channel(image);
    let blurred = blur::gaussian_blur(&blue, config.blur_kernel_size, config.blur_sigma);
    let mask = clean(&otsu_binarize(&blurred), config.morphology_radius);

    if mask.is_uniform() {
        log::warn!(
            "segmentation of {}x{} frame produced a single class; no horizon boundary",
            image.width(),
            image.height(),
        );
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKY_BLUE: image::Rgb<u8> = image::Rgb([135, 206, 250]);
    const DARK_LAND: image::Rgb<u8> = image::Rgb([40, 70, 30]);

    fn two_tone(width: u32, height: u32, horizon: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |_, y| {
            if y < horizon { SKY_BLUE } else { DARK_LAND }
        })
    }

    #[test]
    fn otsu_splits_bright_and_dark() {
        let img = GrayImage::from_fn(10, 10, |x, _| {
            if x < 5 {
                image::Luma([20])
            } else {
                image::Luma([230])
            }
        });
        let mask = otsu_binarize(&img);
        assert_eq!(mask.region(0, 0), Region::Land);
        assert_eq!(mask.region(9, 9), Region::Sky);
        assert_eq!(mask.count(Region::Sky), 50);
    }

    #[test]
    fn opening_removes_small_land_blob() {
        let mask = BinaryMask::from_fn(40, 40, |x, y| {
            if (10..15).contains(&x) && (10..15).contains(&y) {
                Region::Land
            } else {
                Region::Sky
            }
        });
        let cleaned = clean(&mask, 3);
        assert_eq!(cleaned.count(Region::Land), 0);
    }

    #[test]
    fn closing_fills_small_sky_hole() {
        let mask = BinaryMask::from_fn(40, 40, |x, y| {
            if (20..23).contains(&x) && (20..23).contains(&y) {
                Region::Sky
            } else {
                Region::Land
            }
        });
        let cleaned = clean(&mask, 3);
        assert_eq!(cleaned.count(Region::Sky), 0);
    }

    #[test]
    fn large_regions_survive_cleaning() {
        let mask = BinaryMask::from_fn(60, 60, |_, y| if y < 30 { Region::Sky } else { Region::Land });
        assert_eq!(clean(&mask, 10), mask);
    }

    #[test]
    fn zero_radius_is_identity() {
        let mask = BinaryMask::from_fn(8, 8, |x, _| if x == 3 { Region::Land } else { Region::Sky });
        assert_eq!(clean(&mask, 0), mask);
    }

    #[test]
    fn segment_two_tone_frame() {
        let mask = segment(&two_tone(80, 60, 30), &PipelineConfig::default());
        assert_eq!(mask.dimensions().width, 80);
        assert_eq!(mask.region(40, 2), Region::Sky);
        assert_eq!(mask.region(40, 57), Region::Land);
        // The boundary stays within a couple of rows of the true horizon.
        for y in 0..27 {
            assert_eq!(mask.region(40, y), Region::Sky, "row {y}");
        }
        for y in 33..60 {
            assert_eq!(mask.region(40, y), Region::Land, "row {y}");
        }
    }

    #[test]
    fn featureless_frame_degrades_to_single_class() {
        let img = RgbImage::from_pixel(30, 30, SKY_BLUE);
        let mask = segment(&img, &PipelineConfig::default());
        assert!(mask.is_uniform());
    }
}
