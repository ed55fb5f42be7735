//! Overlay content selection.

use std::path::{Path, PathBuf};

use ar_markers_decode::MarkerId;
use image::{Rgb, RgbImage};

#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
    #[error("no content image named {stem}.* in {dir}")]
    Missing { stem: &'static str, dir: PathBuf },
    #[error("content image {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Costume overlay content: four poses keyed by identity range.
pub struct CostumeContent {
    boy_front: RgbImage,
    boy_back: RgbImage,
    girl_front: RgbImage,
    girl_back: RgbImage,
}

impl CostumeContent {
    /// Load `boy_front`, `boy_back`, `girl_front` and `girl_back` images
    /// (any common raster extension) from `dir`.
    pub fn load_dir(dir: &Path) -> Result<Self, OverlayError> {
        Ok(Self {
            boy_front: load_stem(dir, "boy_front")?,
            boy_back: load_stem(dir, "boy_back")?,
            girl_front: load_stem(dir, "girl_front")?,
            girl_back: load_stem(dir, "girl_back")?,
        })
    }

    pub fn from_images(
        boy_front: RgbImage,
        boy_back: RgbImage,
        girl_front: RgbImage,
        girl_back: RgbImage,
    ) -> Self {
        Self {
            boy_front,
            boy_back,
            girl_front,
            girl_back,
        }
    }

    /// Identity ranges 0-3 / 4-7 / 8-11 select a pose; anything above
    /// falls through to the last one.
    pub fn select(&self, id: MarkerId) -> &RgbImage {
        match id {
            0..=3 => &self.boy_front,
            4..=7 => &self.boy_back,
            8..=11 => &self.girl_front,
            _ => &self.girl_back,
        }
    }
}

fn load_stem(dir: &Path, stem: &'static str) -> Result<RgbImage, OverlayError> {
    for ext in ["jpg", "jpeg", "png", "bmp"] {
        let path = dir.join(format!("{stem}.{ext}"));
        if path.is_file() {
            return image::open(&path)
                .map(|i| i.to_rgb8())
                .map_err(|source| OverlayError::Image { path, source });
        }
    }
    Err(OverlayError::Missing {
        stem,
        dir: dir.to_path_buf(),
    })
}

/// Swatch colors for the color demo.
pub const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
pub const GREEN: Rgb<u8> = Rgb([0, 128, 0]);

/// Side length of the solid color swatch composited over a marker.
pub const SWATCH_SIZE: u32 = 11;

/// Swatch color for one identity: bank indices 0..=7 read yellow,
/// everything above blue.
pub fn swatch_color(id: MarkerId) -> Rgb<u8> {
    if id / 8 == 0 {
        YELLOW
    } else {
        BLUE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_ranges_select_poses() {
        let tag = |v: u8| RgbImage::from_pixel(2, 2, Rgb([v, 0, 0]));
        let content = CostumeContent::from_images(tag(1), tag(2), tag(3), tag(4));
        assert_eq!(content.select(0).get_pixel(0, 0)[0], 1);
        assert_eq!(content.select(3).get_pixel(0, 0)[0], 1);
        assert_eq!(content.select(4).get_pixel(0, 0)[0], 2);
        assert_eq!(content.select(11).get_pixel(0, 0)[0], 3);
        assert_eq!(content.select(12).get_pixel(0, 0)[0], 4);
        assert_eq!(content.select(40).get_pixel(0, 0)[0], 4);
    }

    #[test]
    fn swatch_colors_split_at_eight() {
        assert_eq!(swatch_color(0), YELLOW);
        assert_eq!(swatch_color(7), YELLOW);
        assert_eq!(swatch_color(8), BLUE);
        assert_eq!(swatch_color(15), BLUE);
    }
}
