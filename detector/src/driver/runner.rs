use std::future::Future;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::diff::{Detection, FrameDiffer, InvalidInput};
use crate::sink::{PresentationSink, Region};
use crate::source::{CaptureError, FrameSource};

use super::slots::FrameSlots;

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Capture failed this tick; slots left untouched.
    Skipped,
    /// Only one frame held so far.
    Warming,
    Compared(Detection),
    /// The source has no more frames.
    Finished,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub compared: u64,
    pub motion: u64,
    pub skipped: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("frame comparison rejected its input: {0}")]
    InvalidInput(#[from] InvalidInput),
}

/// Pulls frames, diffs each against its predecessor and forwards the
/// scaled result to the sink.
pub struct MotionDriver<S, P> {
    source: S,
    sink: P,
    differ: FrameDiffer,
    scale: u32,
    slots: FrameSlots,
    summary: RunSummary,
}

impl<S: FrameSource, P: PresentationSink> MotionDriver<S, P> {
    pub fn new(source: S, sink: P, differ: FrameDiffer, scale: u32) -> Self {
        Self {
            source,
            sink,
            differ,
            scale,
            slots: FrameSlots::new(),
            summary: RunSummary::default(),
        }
    }

    pub fn sink(&self) -> &P {
        &self.sink
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// One step of the loop. Only a rejected comparison is an error.
    pub fn tick(&mut self) -> Result<TickOutcome, InvalidInput> {
        self.summary.ticks += 1;

        let frame = match self.source.capture_frame() {
            Ok(f) => f,
            Err(CaptureError::Exhausted) => {
                info!(source = self.source.name(), "frame source exhausted");
                return Ok(TickOutcome::Finished);
            }
            Err(e) => {
                warn!(error = %e, source = self.source.name(), "capture failed, skipping tick");
                self.summary.skipped += 1;
                return Ok(TickOutcome::Skipped);
            }
        };

        self.slots.rotate(frame);
        let Some((current, previous)) = self.slots.pair() else {
            debug!("holding first frame");
            return Ok(TickOutcome::Warming);
        };

        let detection = self.differ.diff(current, previous)?;
        self.summary.compared += 1;
        if detection.is_motion() {
            self.summary.motion += 1;
        }

        debug!(
            seq = current.seq,
            prev_seq = previous.seq,
            motion = detection.is_motion(),
            "frames compared"
        );

        let region = Region::from_detection(&detection, self.scale);
        self.sink.show_region(&region);
        Ok(TickOutcome::Compared(detection))
    }
}

/// Tick `driver` every `period` until the source runs dry, `max_ticks` is
/// reached, `shutdown` resolves, or a comparison is rejected.
///
/// Late ticks are dropped rather than bursted.
pub async fn run<S, P, F>(
    driver: &mut MotionDriver<S, P>,
    period: Duration,
    max_ticks: Option<u64>,
    shutdown: F,
) -> Result<RunSummary, DriverError>
where
    S: FrameSource,
    P: PresentationSink,
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    info!(
        period_ms = period.as_millis() as u64,
        max_ticks,
        source = driver.source.name(),
        sink = driver.sink.name(),
        "entering frame loop"
    );

    loop {
        if max_ticks.is_some_and(|max| driver.summary.ticks >= max) {
            info!(ticks = driver.summary.ticks, "tick limit reached");
            break;
        }

        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown requested");
                break;
            }
            _ = ticker.tick() => {
                match driver.tick() {
                    Ok(TickOutcome::Finished) => break,
                    Ok(_) => {}
                    Err(e) => {
                        error!(error = %e, "comparison failed, stopping frame loop");
                        return Err(e.into());
                    }
                }
            }
        }
    }

    let summary = driver.summary();
    info!(
        ticks = summary.ticks,
        compared = summary.compared,
        motion = summary.motion,
        skipped = summary.skipped,
        "frame loop finished"
    );
    Ok(summary)
}
