/// A grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Smallest axis-aligned rectangle enclosing every changed pixel, in grid
/// coordinates. Both corners are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub top_left: Point,
    pub bottom_right: Point,
}

impl BoundingBox {
    /// Number of columns covered, counting both edges.
    pub fn width(&self) -> u32 {
        self.bottom_right.x - self.top_left.x + 1
    }

    /// Number of rows covered, counting both edges.
    pub fn height(&self) -> u32 {
        self.bottom_right.y - self.top_left.y + 1
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.top_left.x..=self.bottom_right.x).contains(&x)
            && (self.top_left.y..=self.bottom_right.y).contains(&y)
    }
}

/// Running extremes of changed pixels.
///
/// Starts in the empty state: top-left at (MAX, MAX), bottom-right at (0, 0).
/// Each `include` moves the corners monotonically toward the true extremes,
/// so once anything was included `top_left <= bottom_right` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxAccumulator {
    top_left: Point,
    bottom_right: Point,
}

impl Default for BoxAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl BoxAccumulator {
    pub const fn new() -> Self {
        Self {
            top_left: Point::new(u32::MAX, u32::MAX),
            bottom_right: Point::new(0, 0),
        }
    }

    pub fn include(&mut self, x: u32, y: u32) {
        self.top_left.x = self.top_left.x.min(x);
        self.top_left.y = self.top_left.y.min(y);
        self.bottom_right.x = self.bottom_right.x.max(x);
        self.bottom_right.y = self.bottom_right.y.max(y);
    }

    /// Fold another accumulator in. Empty accumulators are neutral.
    pub fn merge(mut self, other: BoxAccumulator) -> Self {
        if !other.is_empty() {
            self.include(other.top_left.x, other.top_left.y);
            self.include(other.bottom_right.x, other.bottom_right.y);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.top_left.x > self.bottom_right.x
    }

    /// `None` while still in the empty state.
    pub fn finish(self) -> Option<BoundingBox> {
        if self.is_empty() {
            return None;
        }
        Some(BoundingBox {
            top_left: self.top_left,
            bottom_right: self.bottom_right,
        })
    }
}
