//! Inverse-map perspective warps over `image` buffers.

use crate::Homography;
use image::{GrayImage, Rgb, RgbImage};
use nalgebra::Point2;

#[inline]
fn get_gray(src: &GrayImage, x: i32, y: i32) -> u8 {
    if x < 0 || y < 0 || x >= src.width() as i32 || y >= src.height() as i32 {
        return 0;
    }
    src.get_pixel(x as u32, y as u32)[0]
}

/// Bilinear sample of a grayscale image at a fractional position.
/// Out-of-bounds taps read as 0.
#[inline]
pub fn sample_bilinear(src: &GrayImage, x: f32, y: f32) -> u8 {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_gray(src, x0, y0) as f32;
    let p10 = get_gray(src, x0 + 1, y0) as f32;
    let p01 = get_gray(src, x0, y0 + 1) as f32;
    let p11 = get_gray(src, x0 + 1, y0 + 1) as f32;

    let a = p00 + fx * (p10 - p00);
    let b = p01 + fx * (p11 - p01);
    (a + fy * (b - a)).clamp(0.0, 255.0) as u8
}

/// Resample `src` into a new `out_w x out_h` buffer through
/// `h_img_from_out`: every output pixel center is mapped into `src`
/// coordinates and sampled bilinearly. Both sides use the pixel-center
/// convention (pixel `(i, j)` sits at `(i + 0.5, j + 0.5)`), so an
/// identity transform reproduces the source exactly.
///
/// Used to rectify a detected quadrilateral into the canonical marker
/// image before bit sampling.
pub fn warp_perspective_gray(
    src: &GrayImage,
    h_img_from_out: Homography,
    out_w: u32,
    out_h: u32,
) -> GrayImage {
    let mut out = GrayImage::new(out_w, out_h);
    for y in 0..out_h {
        for x in 0..out_w {
            let p = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
            let q = h_img_from_out.apply(p);
            out.put_pixel(
                x,
                y,
                image::Luma([sample_bilinear(src, q.x - 0.5, q.y - 0.5)]),
            );
        }
    }
    out
}

#[inline]
fn get_rgb_clamped(src: &RgbImage, x: i32, y: i32) -> Rgb<u8> {
    let cx = x.clamp(0, src.width() as i32 - 1) as u32;
    let cy = y.clamp(0, src.height() as i32 - 1) as u32;
    *src.get_pixel(cx, cy)
}

/// Bilinear sample of an RGB image at a fractional position; taps are
/// clamped to the image bounds so content edges do not bleed to black.
fn sample_bilinear_rgb(src: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_rgb_clamped(src, x0, y0);
    let p10 = get_rgb_clamped(src, x0 + 1, y0);
    let p01 = get_rgb_clamped(src, x0, y0 + 1);
    let p11 = get_rgb_clamped(src, x0 + 1, y0 + 1);

    let mut out = [0u8; 3];
    for (c, o) in out.iter_mut().enumerate() {
        let a = p00[c] as f32 + fx * (p10[c] as f32 - p00[c] as f32);
        let b = p01[c] as f32 + fx * (p11[c] as f32 - p01[c] as f32);
        *o = (a + fy * (b - a)).clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

/// Warp `content` onto `frame` through `h_frame_from_content`, leaving
/// every frame pixel whose inverse image falls outside the content
/// rectangle untouched (transparent-border compositing). Covered pixels
/// are sampled bilinearly.
///
/// Returns `false` without touching the frame when the transform cannot
/// be inverted.
pub fn warp_rgb_onto(content: &RgbImage, h_frame_from_content: Homography, frame: &mut RgbImage) -> bool {
    let Some(h_content_from_frame) = h_frame_from_content.inverse() else {
        return false;
    };

    let cw = content.width() as f32;
    let ch = content.height() as f32;

    for y in 0..frame.height() {
        for x in 0..frame.width() {
            let p = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
            let q = h_content_from_frame.apply(p);
            if q.x < 0.0 || q.y < 0.0 || q.x >= cw || q.y >= ch {
                continue;
            }
            frame.put_pixel(x, y, sample_bilinear_rgb(content, q.x - 0.5, q.y - 0.5));
        }
    }
    true
}

/// Convenience wrapper for solid-color overlays: composites a `w x h`
/// rectangle of `color` through the same transparent-border warp.
pub fn warp_solid_onto(
    color: Rgb<u8>,
    w: u32,
    h: u32,
    h_frame_from_content: Homography,
    frame: &mut RgbImage,
) -> bool {
    let mut swatch = RgbImage::new(w, h);
    for p in swatch.pixels_mut() {
        *p = color;
    }
    warp_rgb_onto(&swatch, h_frame_from_content, frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::homography_from_4pt;
    use image::Luma;

    #[test]
    fn identity_warp_reproduces_source() {
        let mut src = GrayImage::new(16, 16);
        for y in 0..16 {
            for x in 0..16 {
                src.put_pixel(x, y, Luma([(x * 16 + y) as u8]));
            }
        }
        let ident = Homography::new(nalgebra::Matrix3::identity());
        let out = warp_perspective_gray(&src, ident, 16, 16);
        // Pixel-center sampling makes the identity exact, border included.
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(out.get_pixel(x, y)[0], src.get_pixel(x, y)[0], "at ({x},{y})");
            }
        }
    }

    #[test]
    fn rgb_warp_interpolates_between_content_pixels() {
        // Left column black, right column white.
        let mut content = RgbImage::new(2, 2);
        content.put_pixel(1, 0, image::Rgb([255, 255, 255]));
        content.put_pixel(1, 1, image::Rgb([255, 255, 255]));

        let mut frame = RgbImage::new(40, 40);
        let src = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let dst = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(40.0, 0.0),
            Point2::new(40.0, 40.0),
            Point2::new(0.0, 40.0),
        ];
        let h = homography_from_4pt(&src, &dst).expect("solvable");
        assert!(warp_rgb_onto(&content, h, &mut frame));

        assert_eq!(frame.get_pixel(2, 20), &image::Rgb([0, 0, 0]));
        assert_eq!(frame.get_pixel(38, 20), &image::Rgb([255, 255, 255]));
        let mid = frame.get_pixel(20, 20)[0];
        assert!((60..=200).contains(&mid), "mid sample {mid} not blended");
    }

    #[test]
    fn transparent_warp_touches_only_the_target_quad() {
        let mut content = RgbImage::new(10, 10);
        for p in content.pixels_mut() {
            *p = image::Rgb([255, 0, 0]);
        }

        let mut frame = RgbImage::new(100, 100);
        for p in frame.pixels_mut() {
            *p = image::Rgb([0, 0, 255]);
        }

        let src = [
            nalgebra::Point2::new(0.0_f32, 0.0),
            nalgebra::Point2::new(10.0, 0.0),
            nalgebra::Point2::new(10.0, 10.0),
            nalgebra::Point2::new(0.0, 10.0),
        ];
        let dst = [
            nalgebra::Point2::new(30.0_f32, 30.0),
            nalgebra::Point2::new(60.0, 30.0),
            nalgebra::Point2::new(60.0, 60.0),
            nalgebra::Point2::new(30.0, 60.0),
        ];
        let h = homography_from_4pt(&src, &dst).expect("solvable");
        assert!(warp_rgb_onto(&content, h, &mut frame));

        assert_eq!(frame.get_pixel(45, 45), &image::Rgb([255, 0, 0]));
        assert_eq!(frame.get_pixel(5, 5), &image::Rgb([0, 0, 255]));
        assert_eq!(frame.get_pixel(90, 90), &image::Rgb([0, 0, 255]));
    }
}
