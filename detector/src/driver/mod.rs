pub mod runner;
pub mod slots;

pub use runner::{run, DriverError, MotionDriver, RunSummary, TickOutcome};
pub use slots::FrameSlots;
