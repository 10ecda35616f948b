//! Batch adjustment of an image directory.
//!
//! Applies one configured preset to every supported image under a source
//! directory and mirrors the tree into an output directory.
//!
//! ## Areas of interest
//!
//! Each image may have a sidecar next to it named after the full file name:
//!
//! ```text
//! photos/
//! ├── 001-dawn.jpg
//! ├── 001-dawn.jpg.areas.json    # [{"x1": 10, "y1": 20, "x2": 200, "y2": 180, "priority": 2}]
//! └── travel/
//!     └── 002-rome.png           # no sidecar → no areas
//! ```
//!
//! ## Output Structure
//!
//! ```text
//! out/
//! ├── manifest.json              # preset, adjustment and one entry per image
//! ├── 001-dawn.jpg
//! └── travel/
//!     └── 002-rome.png
//! ```
//!
//! When `[output] format` is set every output takes that format's extension.
//!
//! ## Parallel Processing
//!
//! Images are processed in parallel using [rayon](https://docs.rs/rayon).
//! Progress events are sent over an optional channel as images finish, so
//! they arrive in completion order. The manifest is in source order.

use crate::config::{Config, ConfigError, PresetConfig};
use crate::imaging::{
    AdjustmentKind, AdjustmentRegistry, Area, BackendError, Dimensions, Quality, Raster,
    ValidationError, is_supported_image, load_image, save_image,
};
use image::ImageFormat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::info;
use walkdir::WalkDir;

/// File name of the manifest written to the output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Suffix appended to an image's file name to find its areas.
pub const SIDECAR_SUFFIX: &str = ".areas.json";

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("Invalid request: {0}")]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Source directory not found: {0}")]
    SourceNotFound(PathBuf),
    #[error("Invalid areas in {path}: {source}")]
    Sidecar {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{first} and {second} would both be written to {output}")]
    OutputCollision {
        first: PathBuf,
        second: PathBuf,
        output: PathBuf,
    },
}

/// Progress reported while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started {
        preset: String,
        adjustment: AdjustmentKind,
        image_count: usize,
    },
    ImageAdjusted {
        /// 1-based position in source order.
        index: usize,
        source: String,
        output: String,
        original: Dimensions,
        adjusted: Dimensions,
        areas: usize,
    },
}

/// Written to `manifest.json` after a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchManifest {
    pub preset: String,
    pub adjustment: AdjustmentKind,
    pub images: Vec<BatchEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    /// Path relative to the source directory.
    pub source: String,
    /// Path relative to the output directory.
    pub output: String,
    pub original: Dimensions,
    pub adjusted: Dimensions,
    /// Number of areas read from the sidecar.
    #[serde(default)]
    pub areas: usize,
}

/// Everything one image needs, resolved once per batch.
struct Job<'a> {
    preset: &'a PresetConfig,
    registry: &'a AdjustmentRegistry,
    format: Option<ImageFormat>,
    quality: Quality,
    source_dir: &'a Path,
    output_dir: &'a Path,
}

/// Adjust every image under `source_dir` with `preset_name` from `config`.
///
/// Writes the adjusted images and [`MANIFEST_FILE`] into `output_dir` and
/// returns the manifest. The first failing image aborts the batch.
pub fn batch(
    source_dir: &Path,
    output_dir: &Path,
    preset_name: &str,
    config: &Config,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchManifest, BatchError> {
    if !source_dir.is_dir() {
        return Err(BatchError::SourceNotFound(source_dir.to_path_buf()));
    }

    let preset = config.preset(preset_name)?;
    let registry = config.registry()?;
    let format = config.output.image_format().map_err(ConfigError::from)?;
    let adjustment = registry.lookup(&preset.adjustment);
    preset.request().validate()?;

    std::fs::create_dir_all(output_dir)?;
    let sources = find_images(source_dir, output_dir)?;
    let outputs = output_paths(&sources, format)?;

    if let Some(tx) = &events {
        tx.send(BatchEvent::Started {
            preset: preset_name.to_string(),
            adjustment,
            image_count: sources.len(),
        })
        .ok();
    }

    let job = Job {
        preset,
        registry: &registry,
        format,
        quality: config.output.quality(),
        source_dir,
        output_dir,
    };

    let images = sources
        .par_iter()
        .zip(outputs.par_iter())
        .enumerate()
        .map(|(i, (relative, output_relative))| {
            let entry = adjust_one(&job, relative, output_relative)?;
            info!(
                source = %entry.source,
                original = %entry.original,
                adjusted = %entry.adjusted,
                "adjusted image"
            );
            if let Some(tx) = &events {
                tx.send(BatchEvent::ImageAdjusted {
                    index: i + 1,
                    source: entry.source.clone(),
                    output: entry.output.clone(),
                    original: entry.original,
                    adjusted: entry.adjusted,
                    areas: entry.areas,
                })
                .ok();
            }
            Ok(entry)
        })
        .collect::<Result<Vec<_>, BatchError>>()?;

    let manifest = BatchManifest {
        preset: preset_name.to_string(),
        adjustment,
        images,
    };
    let json = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(output_dir.join(MANIFEST_FILE), json)?;
    Ok(manifest)
}

fn adjust_one(
    job: &Job<'_>,
    relative: &Path,
    output_relative: &Path,
) -> Result<BatchEntry, BatchError> {
    let source_path = job.source_dir.join(relative);
    let areas = read_sidecar(&source_path)?;
    let area_count = areas.len();

    let image = load_image(&source_path)?;
    let original = Raster::dimensions(&image);
    let request = job.preset.request().with_areas(areas);
    let adjusted = job
        .registry
        .get_adjustment(&job.preset.adjustment, &image, request)?
        .into_adjusted();

    let output_path = job.output_dir.join(output_relative);
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    save_image(&adjusted, &output_path, job.format, job.quality)?;

    Ok(BatchEntry {
        source: relative.to_string_lossy().into_owned(),
        output: output_relative.to_string_lossy().into_owned(),
        original,
        adjusted: Raster::dimensions(&adjusted),
        areas: area_count,
    })
}

/// Supported images under `source_dir`, relative to it, sorted by path.
///
/// `output_dir` is skipped when it lives inside `source_dir`. Both are
/// compared canonicalized, so `.`, `..` and relative spellings still match.
fn find_images(source_dir: &Path, output_dir: &Path) -> Result<Vec<PathBuf>, BatchError> {
    let root = source_dir.canonicalize()?;
    // Not created yet means nothing under the source can be it.
    let output = output_dir.canonicalize().ok();

    let mut images = Vec::new();
    let walker = WalkDir::new(&root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| Some(e.path()) != output.as_deref());
    for entry in walker {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() || !is_supported_image(entry.path()) {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(&root) {
            images.push(relative.to_path_buf());
        }
    }
    images.sort();
    Ok(images)
}

/// Path of the sidecar for `image_path`: the full file name plus [`SIDECAR_SUFFIX`].
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    let mut name = image_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(SIDECAR_SUFFIX);
    image_path.with_file_name(name)
}

/// Areas for `image_path`. A missing sidecar means no areas.
pub fn read_sidecar(image_path: &Path) -> Result<Vec<Area>, BatchError> {
    let path = sidecar_path(image_path);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path)?;
    serde_json::from_str(&content).map_err(|source| BatchError::Sidecar { path, source })
}

/// Output path for each source, in the same order.
///
/// A forced format can map two sources onto one file (`a.png` and `a.tif`
/// both become `a.jpg`); that is an error before anything is written.
fn output_paths(
    sources: &[PathBuf],
    format: Option<ImageFormat>,
) -> Result<Vec<PathBuf>, BatchError> {
    let mut claimed: HashMap<PathBuf, &PathBuf> = HashMap::with_capacity(sources.len());
    let mut outputs = Vec::with_capacity(sources.len());
    for source in sources {
        let output = output_path_for(source, format);
        if let Some(first) = claimed.insert(output.clone(), source) {
            return Err(BatchError::OutputCollision {
                first: first.clone(),
                second: source.clone(),
                output,
            });
        }
        outputs.push(output);
    }
    Ok(outputs)
}

/// `relative` with its extension replaced by the forced format's, if any.
fn output_path_for(relative: &Path, format: Option<ImageFormat>) -> PathBuf {
    match format.and_then(|f| f.extensions_str().first().copied()) {
        Some(ext) => relative.with_extension(ext),
        None => relative.to_path_buf(),
    }
}
