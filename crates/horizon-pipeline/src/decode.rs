//! Image decoding and channel extraction.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces the
//! three-channel frame the segmenter works from.

use image::{GrayImage, RgbImage};

use crate::types::PipelineError;

/// Index of the blue channel in an `image::Rgb` pixel.
pub const BLUE_CHANNEL: usize = 2;

/// Decode raw image bytes into an RGB frame.
///
/// Alpha, if present, is dropped.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgb8())
}

/// Extract channel `channel` (0, 1 or 2) of an RGB frame as a grey image.
fn channel(image: &RgbImage, channel: usize) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        image::Luma([image.get_pixel(x, y).0[channel]])
    })
}

/// Extract the blue channel, which separates sky from land and water
/// better than luminance on typical footage.
#[must_use = "returns the blue channel"]
pub fn blue_channel(image: &RgbImage) -> GrayImage {
    channel(image, BLUE_CHANNEL)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Helper: encode an RGB image as a PNG byte buffer.
    fn encode_png(img: &RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        assert!(matches!(decode_rgb(&[]), Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode_rgb(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn valid_png_decodes_with_dimensions() {
        let img = RgbImage::from_pixel(17, 31, image::Rgb([10, 20, 30]));
        let decoded = decode_rgb(&encode_png(&img)).unwrap();
        assert_eq!(decoded.dimensions(), (17, 31));
        assert_eq!(decoded.get_pixel(3, 3).0, [10, 20, 30]);
    }

    #[test]
    fn rgba_input_drops_alpha() {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([1, 2, 3, 128]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            2,
            2,
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        let decoded = decode_rgb(&buf).unwrap();
        assert_eq!(decoded.get_pixel(0, 0).0, [1, 2, 3]);
    }

    #[test]
    fn blue_channel_selects_third_component() {
        let img = RgbImage::from_fn(4, 1, |x, _| {
            let v = u8::try_from(x * 10).unwrap();
            image::Rgb([200, 100, v])
        });
        let blue = blue_channel(&img);
        assert_eq!(blue.get_pixel(0, 0).0[0], 0);
        assert_eq!(blue.get_pixel(3, 0).0[0], 30);
    }

    #[test]
    fn channel_indexes_rgb_components() {
        let img = RgbImage::from_pixel(3, 2, image::Rgb([7, 8, 9]));
        for (index, expected) in [(0, 7), (1, 8), (BLUE_CHANNEL, 9)] {
            let extracted = channel(&img, index);
            assert_eq!(extracted.dimensions(), (3, 2));
            assert!(extracted.pixels().all(|p| p.0[0] == expected));
        }
    }
}
