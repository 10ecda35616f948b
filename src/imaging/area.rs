//! Weighted areas of interest and their crop penalty.
//!
//! An [`Area`] marks a rectangle of the source image that a crop should try
//! to keep. For a candidate window, [`Area::penalty`] measures how many of
//! the area's pixels the window loses, divided by the area's priority.
//!
//! Coordinates use the same convention as [`CropBox`]: `x2`/`y2` are
//! exclusive. Areas may extend past the image; they are never clipped.
//!
//! ## Sidecar format
//!
//! ```json
//! [
//!   { "x1": 40, "y1": 10, "x2": 120, "y2": 90, "priority": 3 },
//!   { "x1": 0, "y1": 0, "x2": 20, "y2": 20 }
//! ]
//! ```
//!
//! `priority` defaults to `1`.

use super::backend::CropBox;
use super::params::ValidationError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A rectangle of interest with a positive priority weight.
///
/// Invariant: `x1 < x2`, `y1 < y2`, `priority` finite and `> 0`. Enforced by
/// [`Area::new`] and by deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AreaSpec")]
pub struct Area {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
    priority: f64,
}

/// Unchecked wire form of an [`Area`].
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AreaSpec {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
    #[serde(default = "default_priority")]
    priority: f64,
}

fn default_priority() -> f64 {
    1.0
}

impl TryFrom<AreaSpec> for Area {
    type Error = ValidationError;

    fn try_from(spec: AreaSpec) -> Result<Self, Self::Error> {
        Area::new(spec.x1, spec.y1, spec.x2, spec.y2, spec.priority)
    }
}

impl Area {
    pub fn new(x1: u32, y1: u32, x2: u32, y2: u32, priority: f64) -> Result<Self, ValidationError> {
        if x1 >= x2 || y1 >= y2 {
            return Err(ValidationError::EmptyArea { x1, y1, x2, y2 });
        }
        if !priority.is_finite() || priority <= 0.0 {
            return Err(ValidationError::Priority(priority));
        }
        Ok(Self {
            x1,
            y1,
            x2,
            y2,
            priority,
        })
    }

    pub fn x1(&self) -> u32 {
        self.x1
    }

    pub fn y1(&self) -> u32 {
        self.y1
    }

    pub fn x2(&self) -> u32 {
        self.x2
    }

    pub fn y2(&self) -> u32 {
        self.y2
    }

    pub fn priority(&self) -> f64 {
        self.priority
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    /// Pixel count, `width * height`.
    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    fn encloses_in(&self, window: &CropBox) -> bool {
        self.x1 >= window.x1 && self.x2 <= window.x2 && self.y1 >= window.y1 && self.y2 <= window.y2
    }

    fn excluded_from(&self, window: &CropBox) -> bool {
        self.x2 < window.x1 || self.x1 > window.x2 || self.y2 < window.y1 || self.y1 > window.y2
    }

    /// Pixels of this area lost to `window`, before weighting.
    ///
    /// Always within `0..=self.area()`.
    pub fn lost_pixels(&self, window: &CropBox) -> u64 {
        if self.encloses_in(window) {
            return 0;
        }
        if self.excluded_from(window) {
            return self.area();
        }
        // Not excluded, so both right-minus-left terms are >= 0 on each axis.
        let (ax1, ay1, ax2, ay2) = (
            self.x1 as i64,
            self.y1 as i64,
            self.x2 as i64,
            self.y2 as i64,
        );
        let (wx1, wy1, wx2, wy2) = (
            window.x1 as i64,
            window.y1 as i64,
            window.x2 as i64,
            window.y2 as i64,
        );
        let overlap_w = (ax2 - wx1).min(wx2 - ax1).min(self.width() as i64);
        let overlap_h = (ay2 - wy1).min(wy2 - ay1).min(self.height() as i64);
        self.area() - overlap_w as u64 * overlap_h as u64
    }

    /// Weighted penalty of cropping to `window`: lost pixels / priority.
    ///
    /// The division is not floored, so fractional penalties separate windows
    /// that would tie on whole numbers. Never negative; the placement search
    /// prunes on that.
    pub fn penalty(&self, window: &CropBox) -> f64 {
        self.lost_pixels(window) as f64 / self.priority
    }
}

impl FromStr for Area {
    type Err = ValidationError;

    /// Parse `x1,y1,x2,y2` or `x1,y1,x2,y2:priority`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = || ValidationError::AreaSyntax(s.to_string());
        let (coords, priority) = match s.split_once(':') {
            Some((coords, priority)) => (
                coords,
                priority.trim().parse::<f64>().map_err(|_| syntax())?,
            ),
            None => (s, default_priority()),
        };
        let values = coords
            .split(',')
            .map(|part| part.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| syntax())?;
        match values.as_slice() {
            &[x1, y1, x2, y2] => Area::new(x1, y1, x2, y2, priority),
            _ => Err(syntax()),
        }
    }
}
