//! Contour tracing: extract external borders from a binary edge map.
//!
//! Uses Suzuki-Abe border following via
//! `imageproc::contours::find_contours` and keeps only outermost borders
//! (no parent, not a hole), matching an external-only retrieval mode.

use image::GrayImage;
use imageproc::contours::BorderType;

use crate::types::{Point, Polyline};

/// Trace every external contour in a binary edge map.
///
/// Non-zero pixels are foreground. Contour points are converted from
/// integer grid coordinates to floating-point [`Point`]s.
#[must_use = "returns the traced contours"]
pub fn trace_external(edges: &GrayImage) -> Vec<Polyline> {
    let contours: Vec<imageproc::contours::Contour<u32>> =
        imageproc::contours::find_contours(edges);

    contours
        .into_iter()
        .filter(|c| c.parent.is_none() && matches!(c.border_type, BorderType::Outer))
        .map(|c| {
            let points = c
                .points
                .into_iter()
                .map(|p| Point::new(f64::from(p.x), f64::from(p.y)))
                .collect();
            Polyline::new(points)
        })
        .collect()
}

/// The contour with the most points.
///
/// Point count stands in for boundary length: a short but jagged contour
/// can outrank a longer smooth one. Ties go to the earliest contour in
/// trace order. Returns `None` for an empty slice.
#[must_use]
pub fn longest(contours: &[Polyline]) -> Option<&Polyline> {
    contours.iter().fold(None, |best, c| match best {
        Some(b) if b.len() >= c.len() => Some(b),
        _ => Some(c),
    })
}
