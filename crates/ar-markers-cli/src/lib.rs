//! Frame loop, overlay compositing and I/O for the AR marker demos.
//!
//! The binary wires these pieces together; they live in a library so the
//! per-frame pipeline can be exercised end-to-end from integration
//! tests without spawning a process.

pub mod composite;
pub mod overlay;
pub mod pipeline;
pub mod sink;
pub mod source;
