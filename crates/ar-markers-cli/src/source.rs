//! Frame acquisition.
//!
//! Live cameras and video codecs stay outside this project; an image
//! sequence directory stands in for a video feed and a single still
//! image for one-shot processing. Acquisition failures are fatal by
//! design (the loop has no retry or backoff), so they surface as errors
//! rather than empty frames.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbImage;

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("frame source {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("frame {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("frame source {path} contains no frames")]
    Empty { path: PathBuf },
}

/// One frame per call; `Ok(None)` is the clean end of the sequence.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, SourceError>;
}

/// Plays the image files of a directory in lexicographic name order.
pub struct ImageDirSource {
    paths: Vec<PathBuf>,
    next: usize,
}

impl ImageDirSource {
    pub fn open(dir: &Path) -> Result<Self, SourceError> {
        let io_err = |source| SourceError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if entry.file_type().map_err(io_err)?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(SourceError::Empty {
                path: dir.to_path_buf(),
            });
        }
        Ok(Self { paths, next: 0 })
    }
}

impl FrameSource for ImageDirSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, SourceError> {
        let Some(path) = self.paths.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;
        let img = image::open(path)
            .map_err(|source| SourceError::Decode {
                path: path.clone(),
                source,
            })?
            .to_rgb8();
        Ok(Some(img))
    }
}

/// Yields a single still image, then ends.
pub struct StillSource {
    frame: Option<RgbImage>,
}

impl StillSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let img = image::open(path)
            .map_err(|source| SourceError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgb8();
        Ok(Self { frame: Some(img) })
    }

    pub fn from_image(frame: RgbImage) -> Self {
        Self { frame: Some(frame) }
    }
}

impl FrameSource for StillSource {
    fn next_frame(&mut self) -> Result<Option<RgbImage>, SourceError> {
        Ok(self.frame.take())
    }
}
