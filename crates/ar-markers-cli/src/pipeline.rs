//! Per-frame orchestration: acquire, detect, decode, composite, persist.
//!
//! Every frame is processed independently; transient misdetections show
//! up as one-frame flicker instead of being smoothed temporally. The
//! only cross-frame state is the sink's frame counter and the immutable
//! template bank inside the decoder.

use ar_markers_core::{homography_from_4pt, order_corners, rotate_corners, warp_rgb_onto, warp_solid_onto, Quad};
use ar_markers_decode::{MarkerDecoder, MarkerId};
use ar_markers_detect::{find_squares_in_edges, prepare_edge_map, DetectParams};
use image::{imageops, GrayImage, RgbImage};
use nalgebra::Point2;

use crate::composite::{build_composite, FRAME_H, FRAME_W};
use crate::overlay::{swatch_color, CostumeContent, GREEN, SWATCH_SIZE};
use crate::sink::{FrameSink, SinkError};
use crate::source::{FrameSource, SourceError};

/// Binarization cutoff for the real-time marker path.
const BINARY_CUTOFF: u8 = 64;

#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Frame-local products of the detection front half of the pipeline.
pub struct FrameAnalysis {
    /// Working-resolution frame; overlays composite into this buffer.
    pub frame: RgbImage,
    /// Fixed-cutoff binarization; also the decode source.
    pub binary: GrayImage,
    /// Edge map the contour search ran on.
    pub edges: GrayImage,
    /// Accepted candidates, corners already ordered TL,TR,BR,BL.
    /// Candidates whose ordering failed have been dropped.
    pub quads: Vec<Quad>,
}

/// Normalize a raw frame to the working resolution and run detection.
pub fn analyze_frame(raw: &RgbImage, params: &DetectParams) -> FrameAnalysis {
    let frame = if raw.dimensions() == (FRAME_W, FRAME_H) {
        raw.clone()
    } else {
        imageops::resize(raw, FRAME_W, FRAME_H, imageops::FilterType::Triangle)
    };

    let gray = imageops::grayscale(&frame);
    let (binary, edges) = prepare_edge_map(&gray, BINARY_CUTOFF, params);

    let quads: Vec<Quad> = find_squares_in_edges(&edges, params)
        .iter()
        .filter_map(|q| order_corners(q))
        .collect();

    FrameAnalysis {
        frame,
        binary,
        edges,
        quads,
    }
}

fn content_rect(w: f32, h: f32) -> Quad {
    [
        Point2::new(0.0, 0.0),
        Point2::new(w, 0.0),
        Point2::new(w, h),
        Point2::new(0.0, h),
    ]
}

/// Costume policy: first identity per candidate; the identity picks the
/// pose image and the corner rotation so content is drawn right-side-up.
pub fn composite_costume(
    frame: &mut RgbImage,
    binary: &GrayImage,
    quads: &[Quad],
    decoder: &MarkerDecoder,
    content: &CostumeContent,
) -> Vec<MarkerId> {
    let mut found = Vec::new();
    for quad in quads {
        let Some(id) = decoder.decode_first(binary, quad) else {
            continue;
        };
        log::info!("marker id {id}");

        let img = content.select(id);
        let rect = content_rect(img.width() as f32, img.height() as f32);
        let target = rotate_corners(quad, id);
        if let Some(h) = homography_from_4pt(&rect, &target) {
            warp_rgb_onto(img, h, frame);
        }
        found.push(id);
    }
    found
}

/// Color policy: every identity a candidate matches contributes a
/// swatch; exactly two simultaneous identities add a green one on top.
pub fn composite_color(
    frame: &mut RgbImage,
    binary: &GrayImage,
    quads: &[Quad],
    decoder: &MarkerDecoder,
) -> Vec<MarkerId> {
    let mut found = Vec::new();
    for quad in quads {
        let ids = decoder.decode_all(binary, quad);
        if ids.is_empty() {
            continue;
        }

        let rect = content_rect(SWATCH_SIZE as f32, SWATCH_SIZE as f32);
        let Some(h) = homography_from_4pt(&rect, quad) else {
            continue;
        };
        for &id in &ids {
            log::info!("marker id {id}");
            warp_solid_onto(swatch_color(id), SWATCH_SIZE, SWATCH_SIZE, h, frame);
        }
        if ids.len() == 2 {
            warp_solid_onto(GREEN, SWATCH_SIZE, SWATCH_SIZE, h, frame);
        }
        found.extend(ids);
    }
    found
}

/// Overlay policy applied per frame by [`run_loop`].
pub enum OverlayMode {
    Costume(CostumeContent),
    Color,
}

/// Drive the loop to the end of the source: one full
/// acquire -> detect -> decode -> composite -> persist pass per frame.
/// Returns the number of frames processed.
pub fn run_loop(
    source: &mut dyn FrameSource,
    params: &DetectParams,
    decoder: &MarkerDecoder,
    mode: &OverlayMode,
    sink: &mut FrameSink,
) -> Result<u32, RunError> {
    if decoder.bank().is_empty() {
        log::warn!("template bank is empty; no marker will ever decode");
    }

    let mut frames = 0u32;
    while let Some(raw) = source.next_frame()? {
        let mut analysis = analyze_frame(&raw, params);
        let raw_pane = analysis.frame.clone();

        let ids = match mode {
            OverlayMode::Costume(content) => composite_costume(
                &mut analysis.frame,
                &analysis.binary,
                &analysis.quads,
                decoder,
                content,
            ),
            OverlayMode::Color => {
                composite_color(&mut analysis.frame, &analysis.binary, &analysis.quads, decoder)
            }
        };
        log::debug!(
            "frame {frames}: {} candidate(s), {} identity(ies)",
            analysis.quads.len(),
            ids.len()
        );

        let canvas = build_composite(&raw_pane, &analysis.binary, &analysis.edges, &analysis.frame);
        sink.write(&canvas)?;
        frames += 1;
    }
    Ok(frames)
}
