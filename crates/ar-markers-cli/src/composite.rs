//! The 4-pane diagnostic canvas.

use image::{imageops, GrayImage, Rgb, RgbImage};

/// Working resolution of one pane; frames are normalized to this before
/// processing.
pub const FRAME_W: u32 = 640;
pub const FRAME_H: u32 = 360;

pub fn gray_to_rgb(gray: &GrayImage) -> RgbImage {
    let mut out = RgbImage::new(gray.width(), gray.height());
    for (x, y, px) in gray.enumerate_pixels() {
        out.put_pixel(x, y, Rgb([px[0], px[0], px[0]]));
    }
    out
}

/// Assemble the 2x2 diagnostic canvas: raw input (top-left), binarized
/// view (top-right), edge map (bottom-left), final overlaid output
/// (bottom-right). Rebuilt from scratch every frame.
pub fn build_composite(
    raw: &RgbImage,
    binary: &GrayImage,
    edges: &GrayImage,
    output: &RgbImage,
) -> RgbImage {
    let mut canvas = RgbImage::new(FRAME_W * 2, FRAME_H * 2);
    imageops::replace(&mut canvas, raw, 0, 0);
    imageops::replace(&mut canvas, &gray_to_rgb(binary), FRAME_W as i64, 0);
    imageops::replace(&mut canvas, &gray_to_rgb(edges), 0, FRAME_H as i64);
    imageops::replace(&mut canvas, output, FRAME_W as i64, FRAME_H as i64);
    canvas
}
