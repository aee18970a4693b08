use frame_motion_common::frame::TimestampedFrame;
use std::path::PathBuf;

/// Supplies one still frame per call.
///
/// Implementations own whatever capture machinery they need; the driver only
/// ever sees finished, immutable frames.
pub trait FrameSource: Send {
    fn capture_frame(&mut self) -> Result<TimestampedFrame, CaptureError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// No frame right now; try again next tick.
    #[error("no frame available: {0}")]
    Unavailable(String),
    /// The source will never produce another frame.
    #[error("frame source exhausted")]
    Exhausted,
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
