//! Marker identity decoding.
//!
//! A detected quadrilateral is rectified into a canonical 242x242 image,
//! sampled into an 11x11 bit matrix, validated against the mandatory
//! border ring and finally matched against an immutable template bank.
//! Candidates that fail any step simply yield no identity; only bank
//! loading can fail with an error.

mod bank;
mod canonical;
mod decoder;
mod matrix;

pub use bank::{BankError, Template, TemplateBank};
pub use canonical::{canonical_corners, rectify_canonical, CANONICAL_INSET, CANONICAL_SIZE};
pub use decoder::MarkerDecoder;
pub use matrix::{MarkerMatrix, GRID_CELLS};

/// Index into the template bank's fixed load order.
pub type MarkerId = usize;
