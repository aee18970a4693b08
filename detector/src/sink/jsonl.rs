use serde::Serialize;
use std::io::Write;
use tracing::warn;

use super::traits::{PresentationSink, Region};

#[derive(Serialize)]
struct RegionLine<'a> {
    at_ms: i64,
    #[serde(flatten)]
    region: &'a Region,
}

/// Writes one JSON object per region, newline separated.
///
/// Line format:
///   {"at_ms":1708300000000,"region":"hidden"}
///   {"at_ms":1708300000016,"region":"rect","left":20,"top":30,"width":100,"height":40}
pub struct JsonLinesSink<W> {
    out: W,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, region: &Region) -> std::io::Result<()> {
        let line = RegionLine {
            at_ms: chrono::Utc::now().timestamp_millis(),
            region,
        };
        serde_json::to_writer(&mut self.out, &line)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}

impl<W: Write + Send> PresentationSink for JsonLinesSink<W> {
    fn show_region(&mut self, region: &Region) {
        if let Err(e) = self.write_line(region) {
            warn!(error = %e, "failed to write region line");
        }
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}
