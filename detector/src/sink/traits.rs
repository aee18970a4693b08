use serde::Serialize;

use crate::diff::Detection;

/// What a sink should show, in display units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "region", rename_all = "lowercase")]
pub enum Region {
    /// Nothing moved; hide the highlight.
    Hidden,
    Rect {
        left: u32,
        top: u32,
        width: u32,
        height: u32,
    },
}

impl Region {
    /// Scale a grid-space detection into display units.
    ///
    /// Width and height are the corner distance times `scale`, so a lone
    /// changed pixel gives a zero-sized rectangle at its position rather
    /// than `Hidden`.
    pub fn from_detection(detection: &Detection, scale: u32) -> Self {
        match detection {
            Detection::NoMotion => Region::Hidden,
            Detection::Motion(bbox) => {
                let (tl, br) = (bbox.top_left, bbox.bottom_right);
                Region::Rect {
                    left: tl.x.saturating_mul(scale),
                    top: tl.y.saturating_mul(scale),
                    width: (br.x - tl.x).saturating_mul(scale),
                    height: (br.y - tl.y).saturating_mul(scale),
                }
            }
        }
    }
}

/// Receives one region per compared tick. Fire and forget.
pub trait PresentationSink: Send {
    fn show_region(&mut self, region: &Region);

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "unnamed"
    }
}

impl<P: PresentationSink + ?Sized> PresentationSink for Box<P> {
    fn show_region(&mut self, region: &Region) {
        (**self).show_region(region)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
