//! Frame differencing: quantize each channel, threshold the bucket distance,
//! and box every pixel that moved.

pub mod bbox;
pub mod compare;
pub mod quantize;

pub use bbox::{BoundingBox, Point};
pub use compare::{
    compare, compare_frames, compare_parallel, Detection, FrameDiffer, InvalidInput,
};
