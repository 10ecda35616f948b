//! Parameter types for adjustments.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between callers (CLI, batch, presets) and the
//! [`adjustment`](super::adjustment) machinery.
//!
//! ## Types
//!
//! - [`AdjustmentRequest`]: requested width/height, max bounds and areas.
//! - [`Quality`]: lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`ValidationError`]: malformed request or area input.

use super::area::Area;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    ZeroSize { field: &'static str },
    #[error("area ({x1}, {y1}, {x2}, {y2}) is empty: x1 < x2 and y1 < y2 required")]
    EmptyArea { x1: u32, y1: u32, x2: u32, y2: u32 },
    #[error("area priority must be a positive number, got {0}")]
    Priority(f64),
    #[error("invalid area '{0}': expected x1,y1,x2,y2[:priority]")]
    AreaSyntax(String),
    #[error("alias '{alias}' points at unknown adjustment '{target}'")]
    UnknownAliasTarget { alias: String, target: String },
}

/// Requested output size and areas of interest for one adjustment.
///
/// `max_width` only matters when `width` is unset, and `max_height` only when
/// `height` is unset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjustmentRequest {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    pub areas: Vec<Area>,
}

impl AdjustmentRequest {
    /// Request an exact box.
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    pub fn with_areas(mut self, areas: Vec<Area>) -> Self {
        self.areas = areas;
        self
    }

    /// Reject zero-sized requests. Areas validate themselves on construction.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("width", self.width),
            ("height", self.height),
            ("max_width", self.max_width),
            ("max_height", self.max_height),
        ];
        for (field, value) in fields {
            if value == Some(0) {
                return Err(ValidationError::ZeroSize { field });
            }
        }
        Ok(())
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_default_is_90() {
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn request_rejects_zero_sizes() {
        let request = AdjustmentRequest {
            max_height: Some(0),
            ..AdjustmentRequest::default()
        };
        assert_eq!(
            request.validate(),
            Err(ValidationError::ZeroSize {
                field: "max_height"
            })
        );
        assert!(AdjustmentRequest::sized(0, 10).validate().is_err());
    }

    #[test]
    fn empty_request_is_valid() {
        assert_eq!(AdjustmentRequest::default().validate(), Ok(()));
        assert_eq!(AdjustmentRequest::sized(1, 1).validate(), Ok(()));
    }
}
