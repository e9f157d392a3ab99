//! Thick line rasterization.
//!
//! `imageproc::drawing::draw_line_segment_mut` draws one-pixel lines. The
//! boundary contour and the output annotation both need a fixed stroke
//! width, so each Bresenham step is stamped with a square brush.

use image::GenericImage;
use imageproc::drawing::BresenhamLineIter;

use crate::types::{LineSegment, Polyline};

/// Offsets covered by a brush of `width` pixels, relative to the line
/// pixel. Width 2 covers the line pixel and its right/lower neighbour.
fn brush_offsets(width: u32) -> std::ops::Range<i64> {
    let width = i64::from(width.max(1));
    let lo = -((width - 1) / 2);
    lo..lo + width
}

/// Draw a line from `start` to `end` with a square brush of `width`
/// pixels. Pixels falling outside the canvas are skipped.
pub fn draw_thick_line<I: GenericImage>(
    canvas: &mut I,
    start: (f32, f32),
    end: (f32, f32),
    width: u32,
    color: I::Pixel,
) {
    let (w, h) = canvas.dimensions();
    for (x, y) in BresenhamLineIter::new(start, end) {
        for dy in brush_offsets(width) {
            for dx in brush_offsets(width) {
                let (Ok(px), Ok(py)) = (
                    u32::try_from(i64::from(x) + dx),
                    u32::try_from(i64::from(y) + dy),
                ) else {
                    continue;
                };
                if px < w && py < h {
                    canvas.put_pixel(px, py, color);
                }
            }
        }
    }
}

/// Draw a full-width line segment.
#[allow(clippy::cast_precision_loss)]
pub fn draw_segment<I: GenericImage>(
    canvas: &mut I,
    segment: LineSegment,
    width: u32,
    color: I::Pixel,
) {
    draw_thick_line(
        canvas,
        (segment.x1 as f32, segment.y1 as f32),
        (segment.x2 as f32, segment.y2 as f32),
        width,
        color,
    );
}

/// Draw every edge of an open polyline.
#[allow(clippy::cast_possible_truncation)]
pub fn draw_polyline<I: GenericImage>(
    canvas: &mut I,
    polyline: &Polyline,
    width: u32,
    color: I::Pixel,
) {
    let points = polyline.points();
    if let [only] = points {
        let p = (only.x as f32, only.y as f32);
        draw_thick_line(canvas, p, p, width, color);
        return;
    }
    for pair in points.windows(2) {
        draw_thick_line(
            canvas,
            (pair[0].x as f32, pair[0].y as f32),
            (pair[1].x as f32, pair[1].y as f32),
            width,
            color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    fn lit(img: &GrayImage) -> usize {
        img.pixels().filter(|p| p.0[0] > 0).count()
    }

    #[test]
    fn brush_offsets_cover_width() {
        assert_eq!(brush_offsets(1), 0..1);
        assert_eq!(brush_offsets(2), 0..2);
        assert_eq!(brush_offsets(3), -1..2);
        assert_eq!(brush_offsets(0), 0..1);
    }

    #[test]
    fn two_pixel_horizontal_line_covers_two_rows() {
        let mut img = GrayImage::new(10, 10);
        draw_thick_line(&mut img, (0.0, 4.0), (9.0, 4.0), 2, Luma([255]));
        assert_eq!(lit(&img), 20);
        assert_eq!(img.get_pixel(0, 4).0[0], 255);
        assert_eq!(img.get_pixel(9, 5).0[0], 255);
        assert_eq!(img.get_pixel(5, 3).0[0], 0);
    }

    #[test]
    fn off_canvas_pixels_are_clipped() {
        let mut img = GrayImage::new(10, 10);
        draw_thick_line(&mut img, (-5.0, -5.0), (20.0, 20.0), 2, Luma([255]));
        assert!(lit(&img) > 0);
        assert_eq!(img.get_pixel(0, 0).0[0], 255);
        assert_eq!(img.get_pixel(9, 9).0[0], 255);
    }

    #[test]
    fn segment_is_drawn_in_colour() {
        let mut img = RgbImage::new(20, 10);
        draw_segment(&mut img, LineSegment::new(0, 5, 19, 5), 2, Rgb([255, 0, 0]));
        assert_eq!(img.get_pixel(10, 5).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(10, 6).0, [255, 0, 0]);
        assert_eq!(img.get_pixel(10, 7).0, [0, 0, 0]);
    }

    #[test]
    fn polyline_edges_are_connected() {
        let mut img = GrayImage::new(20, 20);
        let pl = Polyline::new(vec![
            Point::new(2.0, 2.0),
            Point::new(15.0, 2.0),
            Point::new(15.0, 15.0),
        ]);
        draw_polyline(&mut img, &pl, 1, Luma([255]));
        assert_eq!(img.get_pixel(8, 2).0[0], 255);
        assert_eq!(img.get_pixel(15, 8).0[0], 255);
        assert_eq!(img.get_pixel(8, 8).0[0], 0);
    }

    #[test]
    fn single_point_polyline_draws_a_dot() {
        let mut img = GrayImage::new(5, 5);
        draw_polyline(&mut img, &Polyline::new(vec![Point::new(2.0, 2.0)]), 1, Luma([255]));
        assert_eq!(lit(&img), 1);
    }
}
