use frame_motion_common::frame::TimestampedFrame;

/// The two frames the driver keeps between ticks.
#[derive(Debug, Default)]
pub struct FrameSlots {
    current: Option<TimestampedFrame>,
    previous: Option<TimestampedFrame>,
}

impl FrameSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Age `current` into `previous` and store `frame` as the new current.
    /// Whatever was in `previous` is dropped.
    pub fn rotate(&mut self, frame: TimestampedFrame) {
        self.previous = self.current.replace(frame);
    }

    /// `(current, previous)` once both are populated.
    pub fn pair(&self) -> Option<(&TimestampedFrame, &TimestampedFrame)> {
        Some((self.current.as_ref()?, self.previous.as_ref()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_motion_common::frame::PixelBuffer;

    fn frame(seq: u64) -> TimestampedFrame {
        TimestampedFrame::new(PixelBuffer::filled(1, 1, [0; 4]), 0, seq)
    }

    #[test]
    fn pair_needs_two_frames() {
        let mut slots = FrameSlots::new();
        assert!(slots.pair().is_none());

        slots.rotate(frame(0));
        assert!(slots.pair().is_none());

        slots.rotate(frame(1));
        let (current, previous) = slots.pair().unwrap();
        assert_eq!((current.seq, previous.seq), (1, 0));
    }

    #[test]
    fn rotate_drops_oldest() {
        let mut slots = FrameSlots::new();
        for seq in 0..4 {
            slots.rotate(frame(seq));
        }
        let (current, previous) = slots.pair().unwrap();
        assert_eq!((current.seq, previous.seq), (3, 2));
    }
}
