use frame_motion_common::frame::Rgba;

/// Width of one quantization bucket.
const STEP: i32 = 10;

/// Round a channel to the nearest multiple of 10, halves rounding up.
///
/// `104 -> 100`, `105 -> 110`, `255 -> 260`.
pub fn quantize(channel: u8) -> i32 {
    (channel as i32 + STEP / 2) / STEP * STEP
}

/// Two channels are equal enough when their buckets coincide or sit at most
/// `tolerance` apart. A difference of exactly `tolerance` still matches.
pub fn channels_match(a: u8, b: u8, tolerance: i32) -> bool {
    let t1 = quantize(a);
    let t2 = quantize(b);
    t1 == t2 || (t1 - t2).abs() <= tolerance
}

/// A pixel is unchanged only if all four channels match.
pub fn pixels_match(p1: Rgba, p2: Rgba, tolerance: i32) -> bool {
    p1.iter()
        .zip(p2.iter())
        .all(|(&a, &b)| channels_match(a, b, tolerance))
}
