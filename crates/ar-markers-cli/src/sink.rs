//! Numbered frame output.

use std::path::{Path, PathBuf};

use image::RgbImage;

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error("output directory {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("writing frame {path}: {source}")]
    Encode {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Writes each frame as `NNNN.jpg` (4-digit zero-padded, starting at 0)
/// into a fixed directory. The counter is the only state the loop
/// carries across frames.
pub struct FrameSink {
    dir: PathBuf,
    counter: u32,
}

impl FrameSink {
    pub fn create(dir: &Path) -> Result<Self, SinkError> {
        std::fs::create_dir_all(dir).map_err(|source| SinkError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            dir: dir.to_path_buf(),
            counter: 0,
        })
    }

    pub fn write(&mut self, frame: &RgbImage) -> Result<PathBuf, SinkError> {
        let path = self.dir.join(format!("{:04}.jpg", self.counter));
        frame.save(&path).map_err(|source| SinkError::Encode {
            path: path.clone(),
            source,
        })?;
        self.counter += 1;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_numbered_sequentially_from_zero() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("frames");
        let mut sink = FrameSink::create(&out).expect("create");

        let frame = RgbImage::new(8, 8);
        let first = sink.write(&frame).expect("write");
        let second = sink.write(&frame).expect("write");

        assert!(first.ends_with("0000.jpg"));
        assert!(second.ends_with("0001.jpg"));
        assert!(first.exists() && second.exists());
    }
}
