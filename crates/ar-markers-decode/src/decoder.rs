//! Decoding a quadrilateral candidate into marker identities.

use ar_markers_core::Quad;
use image::GrayImage;
use imageproc::contrast::otsu_level;

use crate::{rectify_canonical, MarkerId, MarkerMatrix, Template, TemplateBank};

/// Fixed cutoff used by the real-time decode path, where the source is
/// an already-binarized frame.
const REALTIME_CUTOFF: u8 = 64;

/// Decoder over an immutable template bank.
///
/// The bank is loaded once at startup and shared read-only by every
/// decode call; holding it here keeps the decoder testable against
/// synthetic banks.
#[derive(Clone, Debug)]
pub struct MarkerDecoder {
    bank: TemplateBank,
}

impl MarkerDecoder {
    pub fn new(bank: TemplateBank) -> Self {
        Self { bank }
    }

    pub fn bank(&self) -> &TemplateBank {
        &self.bank
    }

    /// Decode all matching identities, in bank order.
    ///
    /// The canonical image is binarized with an automatic bimodal split
    /// (Otsu), so this path also works on grayscale sources. Border
    /// failure or zero matches yield an empty set, never an error.
    pub fn decode_all(&self, src: &GrayImage, quad: &Quad) -> Vec<MarkerId> {
        let Some(matrix) = self.sample_matrix(src, quad, None) else {
            return Vec::new();
        };
        self.bank
            .templates()
            .iter()
            .enumerate()
            .filter(|(_, t)| template_matches(t, &matrix))
            .map(|(id, _)| id)
            .collect()
    }

    /// Decode the first matching identity, using the fixed real-time
    /// cutoff. `None` when the candidate is not a marker or matches no
    /// template.
    pub fn decode_first(&self, src: &GrayImage, quad: &Quad) -> Option<MarkerId> {
        let matrix = self.sample_matrix(src, quad, Some(REALTIME_CUTOFF))?;
        self.bank
            .templates()
            .iter()
            .position(|t| template_matches(t, &matrix))
    }

    fn sample_matrix(&self, src: &GrayImage, quad: &Quad, cutoff: Option<u8>) -> Option<MarkerMatrix> {
        let canonical = rectify_canonical(src, quad)?;
        let cutoff = cutoff.unwrap_or_else(|| otsu_level(&canonical));
        let matrix = MarkerMatrix::sample(&canonical, cutoff);
        matrix.border_ok().then_some(matrix)
    }
}

/// A template matches iff every listed cell is background (0) in the
/// sampled matrix. Cells falling outside the grid count as mismatches.
fn template_matches(template: &Template, matrix: &MarkerMatrix) -> bool {
    template.cells.iter().all(|&(x, y)| {
        let row = y + 3;
        let col = x + 3;
        if row < 0 || col < 0 {
            return false;
        }
        matrix.get(row as usize, col as usize) == Some(0)
    })
}
