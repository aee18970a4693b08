use frame_motion_common::frame::{PixelBuffer, TimestampedFrame};
use image::imageops::FilterType;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::traits::{CaptureError, FrameSource};

const EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Replays still images from a directory, in file-name order.
///
/// Every image is decoded, resized to the comparison grid and converted to
/// RGBA8, so frames of any resolution come out with identical dimensions.
pub struct DirectorySource {
    files: Vec<PathBuf>,
    next: usize,
    seq: u64,
    grid_width: u32,
    grid_height: u32,
    repeat: bool,
}

impl DirectorySource {
    pub fn open(
        dir: &Path,
        grid_width: u32,
        grid_height: u32,
        repeat: bool,
    ) -> Result<Self, CaptureError> {
        let io_err = |source| CaptureError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.is_file() && has_image_extension(&path) {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(CaptureError::Unavailable(format!(
                "no images found in {}",
                dir.display()
            )));
        }

        info!(
            dir = %dir.display(),
            frames = files.len(),
            grid_width,
            grid_height,
            repeat,
            "directory frame source opened"
        );

        Ok(Self {
            files,
            next: 0,
            seq: 0,
            grid_width,
            grid_height,
            repeat,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.files.len()
    }

    fn load(&self, path: &Path) -> Result<PixelBuffer, CaptureError> {
        let img = image::open(path).map_err(|source| CaptureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = img
            .resize_exact(self.grid_width, self.grid_height, FilterType::Triangle)
            .to_rgba8();
        Ok(PixelBuffer::from(rgba))
    }
}

impl FrameSource for DirectorySource {
    fn capture_frame(&mut self) -> Result<TimestampedFrame, CaptureError> {
        if self.next >= self.files.len() {
            if !self.repeat {
                return Err(CaptureError::Exhausted);
            }
            debug!("wrapping around to first frame");
            self.next = 0;
        }

        let path = self.files[self.next].clone();
        self.next += 1;

        let buffer = self.load(&path)?;
        let frame = TimestampedFrame::now(buffer, self.seq);
        self.seq += 1;
        debug!(path = %path.display(), seq = frame.seq, "frame captured");
        Ok(frame)
    }

    fn name(&self) -> &str {
        "directory"
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| EXTENSIONS.iter().any(|known| e.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}
