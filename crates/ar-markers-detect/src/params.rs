use serde::{Deserialize, Serialize};

/// Configuration for the square detector.
///
/// Defaults are empirically tuned constants; they are not robust under
/// extreme lighting and are expected to stay fixed at runtime.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DetectParams {
    /// Lower Canny hysteresis threshold. Kept small so faint edge
    /// segments under gradient shading still connect; the dilation pass
    /// closes the remaining gaps. Must be positive: a zero threshold
    /// floods hysteresis across every pixel.
    pub canny_low: f32,
    /// Upper Canny threshold for the edge passes.
    pub canny_high: f32,
    /// Number of threshold levels per channel (level 0 is the edge pass).
    pub threshold_levels: u32,
    /// Minimum absolute polygon area, in px^2, for a candidate.
    pub min_area: f64,
    /// Maximum absolute interior-angle cosine (0.3 keeps all angles
    /// within ~17 degrees of 90).
    pub max_corner_cosine: f64,
    /// Polygon simplification tolerance as a fraction of the contour
    /// perimeter.
    pub approx_eps_frac: f64,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            canny_low: 10.0,
            canny_high: 50.0,
            threshold_levels: 11,
            min_area: 1000.0,
            max_corner_cosine: 0.3,
            approx_eps_frac: 0.02,
        }
    }
}
