use tracing::{debug, info};

use super::traits::{PresentationSink, Region};

/// Reports regions as tracing events.
#[derive(Debug, Default)]
pub struct LogSink;

impl PresentationSink for LogSink {
    fn show_region(&mut self, region: &Region) {
        match *region {
            Region::Hidden => debug!("no motion"),
            Region::Rect {
                left,
                top,
                width,
                height,
            } => info!(left, top, width, height, "motion"),
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
