//! Core primitives for square fiducial marker detection and overlay.
//!
//! This crate is intentionally small: 2D geometry over quadrilaterals,
//! a normalized 4-point homography solve, inverse-map perspective warps
//! over `image` buffers, and a minimal process logger. It knows nothing
//! about contours, template banks or frame loops.

mod geometry;
mod homography;
mod logger;
mod warp;

pub use geometry::{
    angle_cosine, is_convex, max_corner_cosine, order_corners, polygon_area, rotate_corners, Quad,
};
pub use homography::{homography_from_4pt, Homography};
pub use logger::init_with_level;
pub use warp::{sample_bilinear, warp_perspective_gray, warp_rgb_onto, warp_solid_onto};
