use frame_motion_common::frame::{PixelBuffer, TimestampedFrame};
use rayon::prelude::*;

use super::bbox::{BoundingBox, BoxAccumulator};
use super::quantize::pixels_match;

/// Outcome of one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// Every pixel compared equal enough.
    NoMotion,
    Motion(BoundingBox),
}

impl Detection {
    pub fn is_motion(&self) -> bool {
        matches!(self, Detection::Motion(_))
    }

    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        match self {
            Detection::Motion(bbox) => Some(bbox),
            Detection::NoMotion => None,
        }
    }
}

impl From<Option<BoundingBox>> for Detection {
    fn from(bbox: Option<BoundingBox>) -> Self {
        bbox.map_or(Detection::NoMotion, Detection::Motion)
    }
}

/// Malformed comparison input. Nothing is compared when any of these hold.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("comparison grid must be non-empty, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },
    #[error("tolerance must be >= 0, got {0}")]
    NegativeTolerance(i32),
    #[error("frame dimensions differ: {a_width}x{a_height} vs {b_width}x{b_height}")]
    DimensionMismatch {
        a_width: u32,
        a_height: u32,
        b_width: u32,
        b_height: u32,
    },
    #[error("{frame_width}x{frame_height} frame cannot hold the {width}x{height} comparison grid")]
    BufferTooShort {
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },
}

/// Compare two frames over a `width` x `height` grid.
///
/// The grid is the top-left `width` x `height` corner of both frames, and
/// pixel (x, y) is the frames' own pixel (x, y). A pixel counts as changed when any channel fails the quantize-then-threshold
/// test in [`pixels_match`]; the result is the tight box around all changed
/// pixels, or `NoMotion`.
pub fn compare(
    a: &PixelBuffer,
    b: &PixelBuffer,
    width: u32,
    height: u32,
    tolerance: i32,
) -> Result<Detection, InvalidInput> {
    validate(a, b, width, height, tolerance)?;

    let mut acc = BoxAccumulator::new();
    for y in 0..height {
        scan_row(a, b, width, y, tolerance, &mut acc);
    }
    Ok(acc.finish().into())
}

/// Same contract and result as [`compare`], with rows spread over the rayon pool.
pub fn compare_parallel(
    a: &PixelBuffer,
    b: &PixelBuffer,
    width: u32,
    height: u32,
    tolerance: i32,
) -> Result<Detection, InvalidInput> {
    validate(a, b, width, height, tolerance)?;

    let acc = (0..height)
        .into_par_iter()
        .map(|y| {
            let mut row = BoxAccumulator::new();
            scan_row(a, b, width, y, tolerance, &mut row);
            row
        })
        .reduce(BoxAccumulator::new, BoxAccumulator::merge);
    Ok(acc.finish().into())
}

/// Compare using `a`'s own dimensions as the grid.
pub fn compare_frames(
    a: &PixelBuffer,
    b: &PixelBuffer,
    tolerance: i32,
) -> Result<Detection, InvalidInput> {
    compare(a, b, a.width(), a.height(), tolerance)
}

/// Strategy handle so the driver can pick sequential or row-parallel scanning
/// from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDiffer {
    pub tolerance: i32,
    pub parallel: bool,
}

impl FrameDiffer {
    pub fn new(tolerance: i32, parallel: bool) -> Self {
        Self {
            tolerance,
            parallel,
        }
    }

    /// Compare two captured frames over the first frame's grid.
    pub fn diff(
        &self,
        current: &TimestampedFrame,
        previous: &TimestampedFrame,
    ) -> Result<Detection, InvalidInput> {
        let (a, b) = (&current.buffer, &previous.buffer);
        if self.parallel {
            compare_parallel(a, b, a.width(), a.height(), self.tolerance)
        } else {
            compare(a, b, a.width(), a.height(), self.tolerance)
        }
    }
}

fn validate(
    a: &PixelBuffer,
    b: &PixelBuffer,
    width: u32,
    height: u32,
    tolerance: i32,
) -> Result<(), InvalidInput> {
    if width == 0 || height == 0 {
        return Err(InvalidInput::EmptyDimensions { width, height });
    }
    if tolerance < 0 {
        return Err(InvalidInput::NegativeTolerance(tolerance));
    }
    if a.width() != b.width() || a.height() != b.height() {
        return Err(InvalidInput::DimensionMismatch {
            a_width: a.width(),
            a_height: a.height(),
            b_width: b.width(),
            b_height: b.height(),
        });
    }
    if width > a.width() || height > a.height() {
        return Err(InvalidInput::BufferTooShort {
            width,
            height,
            frame_width: a.width(),
            frame_height: a.height(),
        });
    }
    Ok(())
}

fn scan_row(
    a: &PixelBuffer,
    b: &PixelBuffer,
    width: u32,
    y: u32,
    tolerance: i32,
    acc: &mut BoxAccumulator,
) {
    // rows are laid out at the frame's stride, not the grid's
    let row_start = y as usize * a.width() as usize;
    for x in 0..width {
        let index = row_start + x as usize;
        if !pixels_match(a.pixel_at(index), b.pixel_at(index), tolerance) {
            acc.include(x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::bbox::Point;
    use proptest::prelude::*;

    const BLACK: [u8; 4] = [0, 0, 0, 0];
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn motion(tl: (u32, u32), br: (u32, u32)) -> Detection {
        Detection::Motion(BoundingBox {
            top_left: Point::new(tl.0, tl.1),
            bottom_right: Point::new(br.0, br.1),
        })
    }

    #[test]
    fn single_changed_pixel() {
        let a = PixelBuffer::filled(3, 3, BLACK);
        let b = a.with_pixel(1, 1, WHITE);
        assert_eq!(compare(&a, &b, 3, 3, 40), Ok(motion((1, 1), (1, 1))));
    }

    #[test]
    fn below_tolerance_is_no_motion() {
        let a = PixelBuffer::filled(1, 1, [100, 100, 100, 255]);
        let b = PixelBuffer::filled(1, 1, [105, 105, 105, 255]);
        assert_eq!(compare(&a, &b, 1, 1, 40), Ok(Detection::NoMotion));
    }

    #[test]
    fn full_frame_change() {
        let a = PixelBuffer::filled(5, 4, BLACK);
        let b = PixelBuffer::filled(5, 4, WHITE);
        for tolerance in [0, 40, 254] {
            assert_eq!(
                compare(&a, &b, 5, 4, tolerance),
                Ok(motion((0, 0), (4, 3)))
            );
        }
    }

    #[test]
    fn tolerance_at_bucket_distance_still_matches() {
        let a = PixelBuffer::filled(2, 2, [100, 100, 100, 255]);
        let b = a.with_pixel(0, 1, [140, 100, 100, 255]);
        assert_eq!(compare(&a, &b, 2, 2, 40), Ok(Detection::NoMotion));
        assert_eq!(compare(&a, &b, 2, 2, 39), Ok(motion((0, 1), (0, 1))));
    }

    #[test]
    fn box_spans_scattered_changes() {
        let a = PixelBuffer::filled(8, 6, BLACK);
        let b = a
            .with_pixel(6, 1, WHITE)
            .with_pixel(2, 4, WHITE)
            .with_pixel(3, 2, WHITE);
        assert_eq!(compare(&a, &b, 8, 6, 40), Ok(motion((2, 1), (6, 4))));
    }

    #[test]
    fn alpha_only_change_counts() {
        let a = PixelBuffer::filled(2, 1, [50, 50, 50, 255]);
        let b = a.with_pixel(1, 0, [50, 50, 50, 0]);
        assert_eq!(compare(&a, &b, 2, 1, 40), Ok(motion((1, 0), (1, 0))));
    }

    #[test]
    fn dimension_mismatch() {
        let a = PixelBuffer::filled(4, 4, BLACK);
        let b = PixelBuffer::filled(4, 5, BLACK);
        assert_eq!(
            compare(&a, &b, 4, 4, 40),
            Err(InvalidInput::DimensionMismatch {
                a_width: 4,
                a_height: 4,
                b_width: 4,
                b_height: 5
            })
        );
    }

    #[test]
    fn empty_grid_rejected() {
        let a = PixelBuffer::filled(2, 2, BLACK);
        assert_eq!(
            compare(&a, &a, 0, 2, 40),
            Err(InvalidInput::EmptyDimensions {
                width: 0,
                height: 2
            })
        );
        assert!(matches!(
            compare(&a, &a, 2, 0, 40),
            Err(InvalidInput::EmptyDimensions { .. })
        ));
    }

    #[test]
    fn negative_tolerance_rejected() {
        let a = PixelBuffer::filled(2, 2, BLACK);
        assert_eq!(
            compare(&a, &a, 2, 2, -1),
            Err(InvalidInput::NegativeTolerance(-1))
        );
    }

    #[test]
    fn grid_larger_than_buffer_rejected() {
        let a = PixelBuffer::filled(2, 2, BLACK);
        assert_eq!(
            compare(&a, &a, 3, 3, 40),
            Err(InvalidInput::BufferTooShort {
                width: 3,
                height: 3,
                frame_width: 2,
                frame_height: 2
            })
        );
        assert!(matches!(
            compare(&a, &a, 3, 1, 40),
            Err(InvalidInput::BufferTooShort { .. })
        ));
    }

    #[test]
    fn change_outside_smaller_grid_is_ignored() {
        let a = PixelBuffer::filled(4, 4, BLACK);
        let b = a.with_pixel(2, 0, WHITE);
        assert_eq!(compare(&a, &b, 2, 2, 40), Ok(Detection::NoMotion));
        assert_eq!(compare_parallel(&a, &b, 2, 2, 40), Ok(Detection::NoMotion));
    }

    #[test]
    fn smaller_grid_reads_frame_coordinates() {
        let a = PixelBuffer::filled(4, 4, BLACK);
        let b = a.with_pixel(0, 1, WHITE);
        assert_eq!(compare(&a, &b, 2, 2, 40), Ok(motion((0, 1), (0, 1))));
        assert_eq!(
            compare_parallel(&a, &b, 2, 2, 40),
            Ok(motion((0, 1), (0, 1)))
        );
    }

    #[test]
    fn parallel_rejects_what_sequential_rejects() {
        let a = PixelBuffer::filled(4, 4, BLACK);
        let b = PixelBuffer::filled(4, 5, BLACK);
        assert!(compare_parallel(&a, &b, 4, 4, 40).is_err());
        assert!(compare_parallel(&a, &a, 4, 4, -3).is_err());
    }

    #[test]
    fn compare_frames_uses_buffer_dimensions() {
        let a = PixelBuffer::filled(4, 2, BLACK);
        let b = a.with_pixel(3, 1, WHITE);
        assert_eq!(compare_frames(&a, &b, 40), Ok(motion((3, 1), (3, 1))));
    }

    #[test]
    fn differ_honours_parallel_flag() {
        let a = TimestampedFrame::new(PixelBuffer::filled(6, 6, BLACK), 0, 0);
        let b = TimestampedFrame::new(a.buffer.with_pixel(4, 2, WHITE), 1, 1);
        let seq = FrameDiffer::new(40, false).diff(&b, &a).unwrap();
        let par = FrameDiffer::new(40, true).diff(&b, &a).unwrap();
        assert_eq!(seq, motion((4, 2), (4, 2)));
        assert_eq!(seq, par);
    }

    fn buffer_pair(max_side: u32) -> impl Strategy<Value = (PixelBuffer, PixelBuffer)> {
        (1..=max_side, 1..=max_side).prop_flat_map(|(w, h)| {
            let len = (w * h * 4) as usize;
            (
                proptest::collection::vec(any::<u8>(), len),
                proptest::collection::vec(any::<u8>(), len),
            )
                .prop_map(move |(a, b)| {
                    (
                        PixelBuffer::from_rgba(w, h, a).unwrap(),
                        PixelBuffer::from_rgba(w, h, b).unwrap(),
                    )
                })
        })
    }

    /// `a` is random; `b` is `a` with up to four channels nudged, each either
    /// by sensor-noise amounts or by a large jump.
    fn edited_pair(max_side: u32) -> impl Strategy<Value = (PixelBuffer, PixelBuffer)> {
        (1..=max_side, 1..=max_side).prop_flat_map(|(w, h)| {
            let len = (w * h * 4) as usize;
            let edit = (
                any::<proptest::sample::Index>(),
                0usize..4,
                prop_oneof![-12i16..=12, -255i16..=255],
            );
            (
                proptest::collection::vec(any::<u8>(), len),
                proptest::collection::vec(edit, 0..=4),
            )
                .prop_map(move |(data, edits)| {
                    let a = PixelBuffer::from_rgba(w, h, data).unwrap();
                    let mut b = a.clone();
                    for (index, channel, delta) in edits {
                        let i = index.index((w * h) as usize) as u32;
                        let (x, y) = (i % w, i / w);
                        let mut px = b.pixel(x, y).unwrap();
                        px[channel] = (px[channel] as i16 + delta).clamp(0, 255) as u8;
                        b = b.with_pixel(x, y, px);
                    }
                    (a, b)
                })
        })
    }

    #[test]
    fn edited_pairs_reach_quiet_and_partial_cases() {
        use proptest::strategy::ValueTree;
        use proptest::test_runner::TestRunner;

        let mut runner = TestRunner::deterministic();
        let strategy = edited_pair(10);
        let (mut quiet, mut partial) = (0, 0);
        for _ in 0..256 {
            let (a, b) = strategy.new_tree(&mut runner).unwrap().current();
            match compare(&a, &b, a.width(), a.height(), 40).unwrap() {
                Detection::NoMotion => quiet += 1,
                Detection::Motion(bbox)
                    if bbox.width() < a.width() || bbox.height() < a.height() =>
                {
                    partial += 1
                }
                Detection::Motion(_) => {}
            }
        }
        assert!(quiet > 0, "no quiet pairs generated");
        assert!(partial > 0, "no partial boxes generated");
    }

    proptest! {
        #[test]
        fn identical_buffers_never_move(
            (a, _) in buffer_pair(12),
            tolerance in 0i32..300,
        ) {
            prop_assert_eq!(
                compare(&a, &a, a.width(), a.height(), tolerance),
                Ok(Detection::NoMotion)
            );
        }

        #[test]
        fn raising_tolerance_never_adds_motion(
            (a, b) in edited_pair(10),
            t1 in 0i32..260,
            extra in 0i32..100,
        ) {
            let (w, h) = (a.width(), a.height());
            if compare(&a, &b, w, h, t1) == Ok(Detection::NoMotion) {
                prop_assert_eq!(compare(&a, &b, w, h, t1 + extra), Ok(Detection::NoMotion));
            }
        }

        #[test]
        fn detection_is_symmetric(
            (a, b) in edited_pair(10),
            tolerance in 0i32..100,
        ) {
            let (w, h) = (a.width(), a.height());
            let ab = compare(&a, &b, w, h, tolerance).unwrap();
            let ba = compare(&b, &a, w, h, tolerance).unwrap();
            prop_assert_eq!(ab.is_motion(), ba.is_motion());
        }

        #[test]
        fn box_is_tight(
            (a, b) in edited_pair(10),
            tolerance in 0i32..100,
        ) {
            let (w, h) = (a.width(), a.height());
            let changed = |x: u32, y: u32| {
                !pixels_match(a.pixel(x, y).unwrap(), b.pixel(x, y).unwrap(), tolerance)
            };
            match compare(&a, &b, w, h, tolerance).unwrap() {
                Detection::NoMotion => {
                    for y in 0..h {
                        for x in 0..w {
                            prop_assert!(!changed(x, y));
                        }
                    }
                }
                Detection::Motion(bbox) => {
                    let (tl, br) = (bbox.top_left, bbox.bottom_right);
                    prop_assert!(tl.x <= br.x && tl.y <= br.y);
                    for y in 0..h {
                        for x in 0..w {
                            if !bbox.contains(x, y) {
                                prop_assert!(!changed(x, y));
                            }
                        }
                    }
                    prop_assert!((tl.y..=br.y).any(|y| changed(tl.x, y)));
                    prop_assert!((tl.y..=br.y).any(|y| changed(br.x, y)));
                    prop_assert!((tl.x..=br.x).any(|x| changed(x, tl.y)));
                    prop_assert!((tl.x..=br.x).any(|x| changed(x, br.y)));
                }
            }
        }

        #[test]
        fn box_lies_within_edited_pixels(
            (a, b) in edited_pair(10),
            tolerance in 0i32..100,
        ) {
            let (w, h) = (a.width(), a.height());
            let edited: Vec<(u32, u32)> = (0..h)
                .flat_map(|y| (0..w).map(move |x| (x, y)))
                .filter(|&(x, y)| a.pixel(x, y) != b.pixel(x, y))
                .collect();
            match compare(&a, &b, w, h, tolerance).unwrap() {
                Detection::NoMotion => {}
                Detection::Motion(bbox) => {
                    prop_assert!(!edited.is_empty());
                    let min_x = edited.iter().map(|p| p.0).min().unwrap();
                    let max_x = edited.iter().map(|p| p.0).max().unwrap();
                    let min_y = edited.iter().map(|p| p.1).min().unwrap();
                    let max_y = edited.iter().map(|p| p.1).max().unwrap();
                    prop_assert!(bbox.top_left.x >= min_x && bbox.top_left.y >= min_y);
                    prop_assert!(bbox.bottom_right.x <= max_x && bbox.bottom_right.y <= max_y);
                }
            }
        }

        #[test]
        fn parallel_matches_sequential_on_sparse_edits(
            (a, b) in edited_pair(16),
            tolerance in 0i32..100,
        ) {
            let (w, h) = (a.width(), a.height());
            prop_assert_eq!(
                compare(&a, &b, w, h, tolerance),
                compare_parallel(&a, &b, w, h, tolerance)
            );
        }

        #[test]
        fn parallel_matches_sequential(
            (a, b) in buffer_pair(16),
            tolerance in 0i32..100,
        ) {
            let (w, h) = (a.width(), a.height());
            prop_assert_eq!(
                compare(&a, &b, w, h, tolerance),
                compare_parallel(&a, &b, w, h, tolerance)
            );
        }
    }
}
