//! Square candidate detection for fiducial markers.
//!
//! The detector scans a color image over every channel and a ladder of
//! threshold levels, extracts closed contours from each binarization,
//! simplifies them to polygons and keeps the convex, near-right-angled
//! quadrilaterals. The sweep is a deliberate recall-over-precision
//! ensemble: the same physical square usually surfaces several times and
//! consumers deduplicate as needed.

mod detector;
mod params;

pub use detector::{find_squares, find_squares_in_edges, prepare_edge_map};
pub use params::DetectParams;
