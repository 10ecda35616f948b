//! Adjustment strategies over a pluggable raster backend.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Fit** | `resize_exact`, Lanczos3 when shrinking, CatmullRom when enlarging |
//! | **Crop** | area-aware window search + `crop_imm` |
//! | **Fill** | crop to the target ratio, then fit |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Areas**: Weighted regions of interest and their penalty for a window
//! - **Placement**: Exhaustive minimum-penalty search for the crop window
//! - **Parameters**: Data structures describing a requested adjustment
//! - **Backend**: [`Raster`] trait + its `image::DynamicImage` implementation
//! - **Adjustment**: [`AdjustmentKind`] and the cached [`Adjustment`] lifecycle
//! - **Registry**: slug → kind lookup with a default fallback

mod adjustment;
mod area;
pub mod backend;
mod calculations;
mod params;
pub mod placement;
mod registry;
pub mod rust_backend;

pub use adjustment::{Adjustment, AdjustmentKind, Stage};
pub use area::Area;
pub use backend::{BackendError, CropBox, Dimensions, Raster, ResizeFilter};
pub use calculations::{
    calculate_crop, calculate_fill, calculate_fill_crop, calculate_fit, guard_degenerate,
};
pub use params::{AdjustmentRequest, Quality, ValidationError};
pub use placement::{Placement, find_crop_window};
pub use registry::{AdjustmentRegistry, DEFAULT_ADJUSTMENT, get_adjustment, registry};
pub use rust_backend::{identify, is_supported_image, load_image, save_image};
