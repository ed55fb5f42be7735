//! Rectification of a detected quadrilateral into the canonical marker
//! image.

use ar_markers_core::{homography_from_4pt, warp_perspective_gray, Quad};
use image::GrayImage;
use nalgebra::Point2;

/// Side length of the canonical marker image, in pixels.
pub const CANONICAL_SIZE: u32 = 242;

/// Inset of the quad corners from each canonical edge.
///
/// The detected square maps to an interior rectangle so the sample grid
/// also covers the cells just outside the printed border.
pub const CANONICAL_INSET: u32 = 44;

/// The four canonical points the ordered quad corners map to:
/// TL, TR, BR, BL of the inset rectangle.
pub fn canonical_corners() -> Quad {
    let lo = CANONICAL_INSET as f32;
    let hi = (CANONICAL_SIZE - 1 - CANONICAL_INSET) as f32;
    [
        Point2::new(lo, lo),
        Point2::new(hi, lo),
        Point2::new(hi, hi),
        Point2::new(lo, hi),
    ]
}

/// Resample `src` through the quad-to-canonical perspective transform.
///
/// `quad` must already be ordered TL, TR, BR, BL. Returns `None` when the
/// transform cannot be estimated (degenerate corner sets); such
/// candidates are dropped upstream without an error.
pub fn rectify_canonical(src: &GrayImage, quad: &Quad) -> Option<GrayImage> {
    let h_img_from_canon = homography_from_4pt(&canonical_corners(), quad)?;
    Some(warp_perspective_gray(
        src,
        h_img_from_canon,
        CANONICAL_SIZE,
        CANONICAL_SIZE,
    ))
}
