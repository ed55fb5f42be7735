//! The 11x11 bit matrix sampled from a canonical marker image.

use image::GrayImage;

/// Cells per side of the sample grid.
pub const GRID_CELLS: usize = 11;

const SAMPLE_OFFSET: u32 = 11;
const SAMPLE_STEP: u32 = 22;

/// One decode attempt's bit matrix; 1 = bright cell, 0 = dark cell.
/// Ephemeral, recomputed per candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkerMatrix {
    bits: [[u8; GRID_CELLS]; GRID_CELLS],
}

impl MarkerMatrix {
    /// Sample the canonical image at the fixed grid offsets
    /// `(11 + 22*col, 11 + 22*row)`, thresholding at `cutoff`.
    pub fn sample(canonical: &GrayImage, cutoff: u8) -> Self {
        let mut bits = [[0u8; GRID_CELLS]; GRID_CELLS];
        for (row, row_bits) in bits.iter_mut().enumerate() {
            for (col, bit) in row_bits.iter_mut().enumerate() {
                let x = SAMPLE_OFFSET + SAMPLE_STEP * col as u32;
                let y = SAMPLE_OFFSET + SAMPLE_STEP * row as u32;
                *bit = u8::from(canonical.get_pixel(x, y)[0] > cutoff);
            }
        }
        Self { bits }
    }

    /// Build a matrix directly from bits (synthetic matrices in tests).
    pub fn from_bits(bits: [[u8; GRID_CELLS]; GRID_CELLS]) -> Self {
        Self { bits }
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        self.bits.get(row)?.get(col).copied()
    }

    /// Validate the mandatory border ring: every cell on row/column 2
    /// and 8 (within 2..=8) must be 1, or the candidate is not a marker.
    pub fn border_ok(&self) -> bool {
        for i in 2..9 {
            if self.bits[i][2] == 0
                || self.bits[i][8] == 0
                || self.bits[2][i] == 0
                || self.bits[8][i] == 0
            {
                return false;
            }
        }
        true
    }
}
