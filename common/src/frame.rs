use image::RgbaImage;

/// One RGBA8 pixel: `[red, green, blue, alpha]`.
pub type Rgba = [u8; 4];

const CHANNELS: usize = 4;

/// An immutable grid of RGBA8 pixels.
///
/// Layout (row-major):
///   pixel (x, y) starts at byte `(y * width + x) * 4`
///   [r][g][b][a] [r][g][b][a] ...
///
/// There is no way to mutate a buffer in place once built; `with_pixel`
/// hands back a modified copy instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA8 bytes. The length must be exactly `width * height * 4`.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = width as usize * height as usize * CHANNELS;
        if data.len() != expected {
            return Err(FrameError::LengthMismatch {
                width,
                height,
                got: data.len(),
                expected,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A buffer where every pixel has the same value.
    pub fn filled(width: u32, height: u32, rgba: Rgba) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * CHANNELS);
        for _ in 0..count {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Copy of this buffer with a single pixel replaced.
    /// Out-of-range coordinates return an unchanged copy.
    pub fn with_pixel(&self, x: u32, y: u32, rgba: Rgba) -> Self {
        let mut data = self.data.clone();
        if x < self.width && y < self.height {
            let start = self.offset(x, y);
            data[start..start + CHANNELS].copy_from_slice(&rgba);
        }
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of whole pixels held.
    pub fn pixel_count(&self) -> usize {
        self.data.len() / CHANNELS
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at (x, y), or `None` outside the grid.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixel_at(y as usize * self.width as usize + x as usize))
    }

    /// Pixel by flat row-major index. Callers must stay below `pixel_count()`.
    pub fn pixel_at(&self, index: usize) -> Rgba {
        let start = index * CHANNELS;
        [
            self.data[start],
            self.data[start + 1],
            self.data[start + 2],
            self.data[start + 3],
        ]
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }
}

impl From<RgbaImage> for PixelBuffer {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

/// A captured frame plus the metadata the driver logs with it.
#[derive(Debug, Clone)]
pub struct TimestampedFrame {
    pub buffer: PixelBuffer,
    /// Unix millis at capture.
    pub captured_at_ms: i64,
    /// Per-source sequence number, starting at 0.
    pub seq: u64,
}

impl TimestampedFrame {
    pub fn new(buffer: PixelBuffer, captured_at_ms: i64, seq: u64) -> Self {
        Self {
            buffer,
            captured_at_ms,
            seq,
        }
    }

    /// Stamp a buffer with the current wall-clock time.
    pub fn now(buffer: PixelBuffer, seq: u64) -> Self {
        Self::new(buffer, chrono::Utc::now().timestamp_millis(), seq)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("pixel data for {width}x{height} frame has {got} bytes, expected {expected}")]
    LengthMismatch {
        width: u32,
        height: u32,
        got: usize,
        expected: usize,
    },
}
