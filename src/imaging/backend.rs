//! The image collaborator trait and shared geometry types.
//!
//! Adjustments never decode or encode anything themselves. They work against
//! the [`Raster`] trait, which exposes exactly the four operations an
//! adjustment needs: read the size, resize, crop, copy.
//!
//! The production implementation is
//! [`DynamicImage`](image::DynamicImage), wired up in
//! [`rust_backend`](super::rust_backend). Tests use [`tests::MockRaster`],
//! which records every operation instead of touching pixels.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Width and height of an image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Real-valued `width / height`.
    pub fn ratio(self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl From<(u32, u32)> for Dimensions {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A pixel rectangle with exclusive right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub x1: u32,
    pub y1: u32,
    pub x2: u32,
    pub y2: u32,
}

impl CropBox {
    /// Box of `size` with its top-left corner at `(x, y)`.
    pub fn at(x: u32, y: u32, size: Dimensions) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + size.width,
            y2: y + size.height,
        }
    }

    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }
}

/// Resampling filter handed to [`Raster::resize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeFilter {
    /// High-quality downsampling (Lanczos3).
    Lanczos3,
    /// Smooth upsampling (bicubic Catmull-Rom).
    CatmullRom,
}

impl ResizeFilter {
    /// Lanczos3 when shrinking horizontally, Catmull-Rom otherwise.
    pub fn for_widths(source_width: u32, target_width: u32) -> Self {
        if target_width < source_width {
            Self::Lanczos3
        } else {
            Self::CatmullRom
        }
    }
}

/// A decoded image an adjustment can work on.
///
/// Every method returns a new image; the receiver is never modified.
pub trait Raster: Sized {
    fn dimensions(&self) -> Dimensions;

    fn resize(&self, width: u32, height: u32, filter: ResizeFilter) -> Self;

    /// Crop to `region`. Callers guarantee the region lies within the image.
    fn crop(&self, region: CropBox) -> Self;

    fn copy(&self) -> Self;
}

#[cfg(test)]
pub mod tests {
    use super::*;

    /// One operation recorded by [`MockRaster`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Resize {
            width: u32,
            height: u32,
            filter: ResizeFilter,
        },
        Crop(CropBox),
        Copy,
    }

    /// Raster that only tracks its size and the operations that produced it.
    ///
    /// Each derived image carries the history of its parent plus the new
    /// operation, so a finished adjustment can be inspected end to end.
    #[derive(Debug, Clone, PartialEq)]
    pub struct MockRaster {
        pub size: Dimensions,
        pub history: Vec<RecordedOp>,
    }

    impl MockRaster {
        pub fn new(width: u32, height: u32) -> Self {
            Self {
                size: Dimensions::new(width, height),
                history: Vec::new(),
            }
        }

        fn derive(&self, size: Dimensions, op: RecordedOp) -> Self {
            let mut history = self.history.clone();
            history.push(op);
            Self { size, history }
        }
    }

    impl Raster for MockRaster {
        fn dimensions(&self) -> Dimensions {
            self.size
        }

        fn resize(&self, width: u32, height: u32, filter: ResizeFilter) -> Self {
            self.derive(
                Dimensions::new(width, height),
                RecordedOp::Resize {
                    width,
                    height,
                    filter,
                },
            )
        }

        fn crop(&self, region: CropBox) -> Self {
            assert!(
                region.x2 <= self.size.width && region.y2 <= self.size.height,
                "crop {region:?} outside {}",
                self.size
            );
            self.derive(
                Dimensions::new(region.width(), region.height()),
                RecordedOp::Crop(region),
            )
        }

        fn copy(&self) -> Self {
            self.derive(self.size, RecordedOp::Copy)
        }
    }

    #[test]
    fn mock_records_history() {
        let image = MockRaster::new(100, 80);
        let cropped = image.crop(CropBox::at(10, 10, Dimensions::new(50, 40)));
        let resized = cropped.resize(25, 20, ResizeFilter::Lanczos3);

        assert_eq!(resized.size, Dimensions::new(25, 20));
        assert_eq!(
            resized.history,
            vec![
                RecordedOp::Crop(CropBox {
                    x1: 10,
                    y1: 10,
                    x2: 60,
                    y2: 50
                }),
                RecordedOp::Resize {
                    width: 25,
                    height: 20,
                    filter: ResizeFilter::Lanczos3
                },
            ]
        );
        assert!(image.history.is_empty());
    }

    #[test]
    fn filter_depends_on_direction() {
        assert_eq!(ResizeFilter::for_widths(800, 400), ResizeFilter::Lanczos3);
        assert_eq!(ResizeFilter::for_widths(400, 800), ResizeFilter::CatmullRom);
        assert_eq!(ResizeFilter::for_widths(400, 400), ResizeFilter::CatmullRom);
    }

    #[test]
    fn dimensions_display_and_ratio() {
        let dims = Dimensions::new(1600, 900);
        assert_eq!(dims.to_string(), "1600x900");
        assert!((dims.ratio() - 16.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn crop_box_at() {
        let b = CropBox::at(5, 7, Dimensions::new(10, 20));
        assert_eq!((b.x1, b.y1, b.x2, b.y2), (5, 7, 15, 27));
        assert_eq!((b.width(), b.height()), (10, 20));
    }
}
