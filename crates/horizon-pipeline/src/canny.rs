//! Canny edge detection over an unblurred grey image.
//!
//! Follows the structure of `imageproc::edges::canny` (Sobel gradients,
//! non-maximum suppression, hysteresis) with two differences:
//!
//! - No internal Gaussian pre-blur. The input here is a binary land mask,
//!   and the edge must sit exactly on the class boundary.
//! - Hysteresis checks all 8 neighbours and bounds-checks them, so growth
//!   that reaches the image border cannot underflow `u32` coordinates
//!   (see <https://github.com/image-rs/imageproc/issues/705>).

use image::{GrayImage, Luma};
use imageproc::definitions::Image;

/// Output value of edge pixels.
pub const EDGE: u8 = 255;

/// Runs Canny edge detection with the given hysteresis thresholds.
///
/// Returns a binary image: [`EDGE`] for edge pixels, 0 otherwise. Images
/// narrower or shorter than 3 pixels have no interior and produce no
/// edges.
#[must_use = "returns the binary edge map"]
pub fn canny(image: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let (w, h) = image.dimensions();
    if w < 3 || h < 3 {
        return GrayImage::new(w, h);
    }

    let gx = imageproc::gradients::horizontal_sobel(image);
    let gy = imageproc::gradients::vertical_sobel(image);
    let magnitude: Image<Luma<f32>> = Image::from_fn(w, h, |x, y| {
        let hx = f32::from(gx.get_pixel(x, y).0[0]);
        let vy = f32::from(gy.get_pixel(x, y).0[0]);
        Luma([hx.hypot(vy)])
    });

    let thinned = non_maximum_suppression(&magnitude, &gx, &gy);
    hysteresis(&thinned, low_threshold, high_threshold)
}

/// Quantised gradient direction used to pick comparison neighbours.
#[derive(Clone, Copy)]
enum Direction {
    Horizontal,
    Diagonal,
    Vertical,
    AntiDiagonal,
}

impl Direction {
    fn from_gradient(gx: f32, gy: f32) -> Self {
        let mut angle = gy.atan2(gx).to_degrees();
        if angle < 0.0 {
            angle += 180.0;
        }
        if (22.5..67.5).contains(&angle) {
            Self::Diagonal
        } else if (67.5..112.5).contains(&angle) {
            Self::Vertical
        } else if (112.5..157.5).contains(&angle) {
            Self::AntiDiagonal
        } else {
            Self::Horizontal
        }
    }

    /// Offsets of the two neighbours across the edge.
    const fn neighbours(self) -> [(i64, i64); 2] {
        match self {
            Self::Horizontal => [(-1, 0), (1, 0)],
            Self::Diagonal => [(1, 1), (-1, -1)],
            Self::Vertical => [(0, -1), (0, 1)],
            Self::AntiDiagonal => [(-1, 1), (1, -1)],
        }
    }
}

/// Keep only pixels that are local maxima across the edge direction.
///
/// Border pixels are always suppressed.
fn non_maximum_suppression(
    g: &Image<Luma<f32>>,
    gx: &Image<Luma<i16>>,
    gy: &Image<Luma<i16>>,
) -> Image<Luma<f32>> {
    let (w, h) = g.dimensions();
    let mut out = Image::from_pixel(w, h, Luma([0.0_f32]));
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let direction = Direction::from_gradient(
                f32::from(gx.get_pixel(x, y).0[0]),
                f32::from(gy.get_pixel(x, y).0[0]),
            );
            let value = g.get_pixel(x, y).0[0];
            let is_max = direction.neighbours().iter().all(|&(dx, dy)| {
                let nx = u32::try_from(i64::from(x) + dx).unwrap_or(x);
                let ny = u32::try_from(i64::from(y) + dy).unwrap_or(y);
                value >= g.get_pixel(nx, ny).0[0]
            });
            if is_max {
                out.put_pixel(x, y, Luma([value]));
            }
        }
    }
    out
}

/// Grow strong edges (>= `high`) through connected weak edges (>= `low`).
///
/// Non-recursive flood fill over the 8-neighbourhood.
fn hysteresis(input: &Image<Luma<f32>>, low: f32, high: f32) -> GrayImage {
    let (w, h) = input.dimensions();
    let mut out = GrayImage::new(w, h);
    let mut stack = Vec::new();

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            if input.get_pixel(x, y).0[0] < high || out.get_pixel(x, y).0[0] != 0 {
                continue;
            }
            out.put_pixel(x, y, Luma([EDGE]));
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                for dy in -1_i64..=1 {
                    for dx in -1_i64..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let (Ok(nx), Ok(ny)) = (
                            u32::try_from(i64::from(cx) + dx),
                            u32::try_from(i64::from(cy) + dy),
                        ) else {
                            continue;
                        };
                        if nx >= w || ny >= h {
                            continue;
                        }
                        if input.get_pixel(nx, ny).0[0] >= low && out.get_pixel(nx, ny).0[0] == 0 {
                            out.put_pixel(nx, ny, Luma([EDGE]));
                            stack.push((nx, ny));
                        }
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_rows(edges: &GrayImage, x: u32) -> Vec<u32> {
        (0..edges.height())
            .filter(|&y| edges.get_pixel(x, y).0[0] == EDGE)
            .collect()
    }

    #[test]
    fn tiny_image_has_no_edges() {
        let img = GrayImage::from_pixel(2, 10, Luma([255]));
        let edges = canny(&img, 100.0, 200.0);
        assert_eq!(edges.dimensions(), (2, 10));
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn uniform_image_has_no_edges() {
        let img = GrayImage::from_pixel(20, 20, Luma([128]));
        let edges = canny(&img, 100.0, 200.0);
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn horizontal_step_marks_both_boundary_rows() {
        let img = GrayImage::from_fn(30, 30, |_, y| if y < 15 { Luma([255]) } else { Luma([0]) });
        let edges = canny(&img, 100.0, 200.0);
        assert_eq!(edge_rows(&edges, 10), vec![14, 15]);
        // Border columns are never edges.
        assert!(edge_rows(&edges, 0).is_empty());
        assert!(edge_rows(&edges, 29).is_empty());
    }

    #[test]
    fn border_edge_does_not_panic() {
        // Strong gradient right next to the left border; low thresholds let
        // hysteresis try to grow past it.
        let img = GrayImage::from_fn(10, 10, |x, _| if x == 1 { Luma([255]) } else { Luma([0]) });
        let _edges = canny(&img, 1.0, 2.0);
    }

    #[test]
    fn weak_edges_need_strong_anchor() {
        // A faint step (gradient 4*10 = 40) never clears a high threshold of 200.
        let img = GrayImage::from_fn(20, 20, |x, _| if x < 10 { Luma([100]) } else { Luma([110]) });
        let edges = canny(&img, 10.0, 200.0);
        assert!(edges.pixels().all(|p| p.0[0] == 0));
        let edges = canny(&img, 10.0, 30.0);
        assert!(edges.pixels().any(|p| p.0[0] == EDGE));
    }
}
