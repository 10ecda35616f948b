//! [`Raster`] for the `image` crate, plus file loading and saving.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` / `CatmullRom` |
//! | Crop | `DynamicImage::crop_imm` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with configured quality |
//! | Encode → PNG, TIFF, WebP | `DynamicImage::write_to` |

use super::backend::{BackendError, CropBox, Dimensions, Raster, ResizeFilter};
use super::params::Quality;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::BufWriter;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions mapped to the formats this build can decode.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Image file extensions (lowercase) that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has one of the [`supported_input_extensions`].
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
        }
    }
}

impl Raster for DynamicImage {
    fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width(), self.height())
    }

    fn resize(&self, width: u32, height: u32, filter: ResizeFilter) -> Self {
        self.resize_exact(width, height, filter.into())
    }

    fn crop(&self, region: CropBox) -> Self {
        self.crop_imm(region.x1, region.y1, region.width(), region.height())
    }

    fn copy(&self) -> Self {
        self.clone()
    }
}

/// Read only the dimensions of an image file.
pub fn identify(path: &Path) -> Result<Dimensions, BackendError> {
    let (width, height) = image::image_dimensions(path).map_err(|e| {
        BackendError::ProcessingFailed(format!(
            "Failed to read dimensions of {}: {}",
            path.display(),
            e
        ))
    })?;
    Ok(Dimensions { width, height })
}

/// Load and decode an image from disk.
pub fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Encode `img` to `path`.
///
/// The format is `format` when given, otherwise inferred from the path's
/// extension. `quality` applies to JPEG only; the other encoders are lossless.
pub fn save_image(
    img: &DynamicImage,
    path: &Path,
    format: Option<ImageFormat>,
    quality: Quality,
) -> Result<(), BackendError> {
    let format = match format {
        Some(format) => format,
        None => ImageFormat::from_path(path).map_err(|_| {
            BackendError::ProcessingFailed(format!(
                "Cannot infer output format from {}",
                path.display()
            ))
        })?,
    };
    if !format.writing_enabled() {
        return Err(BackendError::ProcessingFailed(format!(
            "Unsupported output format: {format:?}"
        )));
    }

    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let mut writer = BufWriter::new(file);
    let encoded = match format {
        ImageFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality.value() as u8);
            // JPEG has no alpha channel.
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
        }
        ImageFormat::WebP => DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut writer, format),
        other => img.write_to(&mut writer, other),
    };
    encoded.map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to encode {}: {}", path.display(), e))
    })
}
