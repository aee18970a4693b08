pub mod jsonl;
pub mod log;
pub mod traits;

pub use jsonl::JsonLinesSink;
pub use log::LogSink;
pub use traits::{PresentationSink, Region};
