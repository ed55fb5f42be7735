//! Plane-projective transforms between content/canonical rectangles and
//! image quadrilaterals.

use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

/// A 3x3 plane projective transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

fn normalizing_transform(pts: &[Point2<f32>; 4]) -> Matrix3<f64> {
    // Hartley normalization: translate to the centroid, scale so the mean
    // distance from it is sqrt(2).
    let mut cx = 0.0_f64;
    let mut cy = 0.0_f64;
    for p in pts {
        cx += p.x as f64;
        cy += p.y as f64;
    }
    cx /= 4.0;
    cy /= 4.0;

    let mut mean_dist = 0.0_f64;
    for p in pts {
        let dx = p.x as f64 - cx;
        let dy = p.y as f64 - cy;
        mean_dist += (dx * dx + dy * dy).sqrt();
    }
    mean_dist /= 4.0;

    let s = if mean_dist > 1e-12 {
        (2.0_f64).sqrt() / mean_dist
    } else {
        1.0
    };

    Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

fn apply_transform(t: &Matrix3<f64>, pts: &[Point2<f32>; 4]) -> [Point2<f64>; 4] {
    let mut out = [Point2::new(0.0_f64, 0.0); 4];
    for (o, p) in out.iter_mut().zip(pts.iter()) {
        let v = t * Vector3::new(p.x as f64, p.y as f64, 1.0);
        *o = Point2::new(v[0], v[1]);
    }
    out
}

/// Compute H such that `dst ~ H * src` from 4 point correspondences.
///
/// Corner order must be consistent between `src` and `dst`. Returns
/// `None` when the linear system is singular (collinear or repeated
/// points); the four correspondences make this an exact fit.
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    let t_src = normalizing_transform(src);
    let t_dst = normalizing_transform(dst);
    let src_n = apply_transform(&t_src, src);
    let dst_n = apply_transform(&t_dst, dst);

    // Unknowns [h11 h12 h13 h21 h22 h23 h31 h32] with h33 = 1; each
    // correspondence (x,y) -> (u,v) contributes:
    //   h11 x + h12 y + h13 - u h31 x - u h32 y = u
    //   h21 x + h22 y + h23 - v h31 x - v h32 y = v
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for k in 0..4 {
        let x = src_n[k].x;
        let y = src_n[k].y;
        let u = dst_n[k].x;
        let v = dst_n[k].y;

        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        let r1 = 2 * k + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let lu = a.lu();
    // Normalized coordinates are O(1), so a tiny determinant means the
    // correspondences are (near-)degenerate rather than badly scaled.
    if lu.determinant().abs() < 1e-8 {
        return None;
    }
    let x = lu.solve(&b)?;

    let hn = Matrix3::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    // Denormalize and rescale so h33 = 1.
    let h = t_dst.try_inverse()? * hn * t_src;
    let s = h[(2, 2)];
    if s.abs() < 1e-12 {
        return None;
    }
    Some(Homography::new(h / s))
}
