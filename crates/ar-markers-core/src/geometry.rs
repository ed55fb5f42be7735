//! Quadrilateral geometry: angle cosines, corner ordering and rotation.

use nalgebra::Point2;

/// Four corners of a quadrilateral candidate, in image coordinates.
///
/// Once a candidate has been ordered (see [`order_corners`]) the layout is
/// `[top-left, top-right, bottom-right, bottom-left]`.
pub type Quad = [Point2<f32>; 4];

/// Cosine of the angle at vertex `p0` formed by the rays `p0 -> p1` and
/// `p0 -> p2`.
///
/// A small epsilon in the denominator keeps degenerate (zero-length)
/// edges from dividing by zero; such edges yield a cosine near 0.
pub fn angle_cosine(p1: Point2<f32>, p2: Point2<f32>, p0: Point2<f32>) -> f64 {
    let dx1 = (p1.x - p0.x) as f64;
    let dy1 = (p1.y - p0.y) as f64;
    let dx2 = (p2.x - p0.x) as f64;
    let dy2 = (p2.y - p0.y) as f64;
    (dx1 * dx2 + dy1 * dy2) / ((dx1 * dx1 + dy1 * dy1) * (dx2 * dx2 + dy2 * dy2) + 1e-10).sqrt()
}

/// Maximum absolute interior-angle cosine over the four cyclic vertex
/// triples of `quad`.
///
/// A perfect square scores ~0; the detector accepts candidates below 0.3
/// (all angles within ~17 degrees of 90).
pub fn max_corner_cosine(quad: &Quad) -> f64 {
    let mut max_cos = 0.0_f64;
    for i in 0..4 {
        let prev = quad[(i + 3) % 4];
        let next = quad[(i + 1) % 4];
        let c = angle_cosine(prev, next, quad[i]).abs();
        if c > max_cos {
            max_cos = c;
        }
    }
    max_cos
}

/// Absolute area of a closed polygon via the shoelace formula.
pub fn polygon_area(points: &[Point2<f32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc = 0.0_f64;
    for i in 0..points.len() {
        let a = points[i];
        let b = points[(i + 1) % points.len()];
        acc += (a.x as f64) * (b.y as f64) - (b.x as f64) * (a.y as f64);
    }
    (acc * 0.5).abs()
}

/// Whether a closed polygon is convex: all consecutive edge cross
/// products share one sign. Collinear (zero-cross) vertices count as
/// non-convex.
pub fn is_convex(points: &[Point2<f32>]) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut pos = false;
    let mut neg = false;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let cross =
            ((b.x - a.x) as f64) * ((c.y - b.y) as f64) - ((b.y - a.y) as f64) * ((c.x - b.x) as f64);
        if cross > 0.0 {
            pos = true;
        } else if cross < 0.0 {
            neg = true;
        } else {
            return false;
        }
        if pos && neg {
            return false;
        }
    }
    true
}

/// Reorder four points into `[TL, TR, BR, BL]` by quadrant relative to
/// their centroid.
///
/// Each output slot takes the input point nearest to the corresponding
/// corner of the points' bounding box. Returns `None` when that
/// assignment is not a permutation of the input (degenerate or
/// effectively non-convex candidates), so callers can drop the candidate
/// instead of working with a short corner list.
pub fn order_corners(points: &[Point2<f32>]) -> Option<Quad> {
    if points.len() != 4 {
        return None;
    }

    let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
    let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let ideals = [
        Point2::new(min_x, min_y), // TL
        Point2::new(max_x, min_y), // TR
        Point2::new(max_x, max_y), // BR
        Point2::new(min_x, max_y), // BL
    ];

    let mut chosen = [usize::MAX; 4];
    for (slot, ideal) in ideals.iter().enumerate() {
        let mut best = 0usize;
        let mut best_d2 = f32::INFINITY;
        for (i, p) in points.iter().enumerate() {
            let dx = p.x - ideal.x;
            let dy = p.y - ideal.y;
            let d2 = dx * dx + dy * dy;
            if d2 < best_d2 {
                best_d2 = d2;
                best = i;
            }
        }
        chosen[slot] = best;
    }

    // The four slots must pick four distinct points.
    for i in 0..4 {
        for j in (i + 1)..4 {
            if chosen[i] == chosen[j] {
                return None;
            }
        }
    }

    Some([
        points[chosen[0]],
        points[chosen[1]],
        points[chosen[2]],
        points[chosen[3]],
    ])
}

/// Cyclically rotate a quad by `offset mod 4` positions.
///
/// Used to align canonical overlay-content corners with the physical
/// orientation implied by a decoded identity.
pub fn rotate_corners(quad: &Quad, offset: usize) -> Quad {
    let s = offset % 4;
    [
        quad[s],
        quad[(s + 1) % 4],
        quad[(s + 2) % 4],
        quad[(s + 3) % 4],
    ]
}
