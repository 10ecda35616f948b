//! Shared test utilities for the cropwise test suite.
//!
//! Images built here encode their own coordinates: pixel `(x, y)` is
//! `[x % 256, y % 256, 128]`. After a crop, the first pixel of the output
//! tells where the window was placed.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_gradient(&tmp.path().join("wide.png"), 100, 50);
//! write_sidecar(&tmp.path().join("wide.png"), r#"[{"x1":60,"y1":10,"x2":90,"y2":40}]"#);
//! ```

use image::{DynamicImage, Rgb, RgbImage};
use std::path::Path;

pub use tempfile::TempDir;

// =========================================================================
// Images
// =========================================================================

/// An RGB image whose red and green channels are the pixel's x and y.
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

/// Write a [`gradient`] to `path`, creating parent directories.
///
/// The format follows the extension. Use `.png` when pixel values matter.
pub fn write_gradient(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    gradient(width, height).save(path).unwrap();
}

/// Source position of the top-left pixel of a crop taken from a [`gradient`].
pub fn origin_of(image: &DynamicImage) -> (u32, u32) {
    let [r, g, _] = image.to_rgb8().get_pixel(0, 0).0;
    (r as u32, g as u32)
}

// =========================================================================
// Sidecars
// =========================================================================

/// Write `<image file name>.areas.json` next to `image_path`.
pub fn write_sidecar(image_path: &Path, json: &str) {
    let mut name = image_path.file_name().unwrap().to_os_string();
    name.push(".areas.json");
    std::fs::write(image_path.with_file_name(name), json).unwrap();
}

// =========================================================================
// Source trees
// =========================================================================

/// A temp source directory with a small mixed tree:
///
/// ```text
/// wide.png          200x100
/// tall.png          100x200
/// nested/square.png 150x150
/// notes.txt         (not an image)
/// ```
pub fn setup_source_tree() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_gradient(&tmp.path().join("wide.png"), 200, 100);
    write_gradient(&tmp.path().join("tall.png"), 100, 200);
    write_gradient(&tmp.path().join("nested/square.png"), 150, 150);
    std::fs::write(tmp.path().join("notes.txt"), "not an image").unwrap();
    tmp
}
