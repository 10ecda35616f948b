//! Configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults
//! are overridden by a user `config.toml` in the config directory (the
//! current directory unless `--config-dir` says otherwise).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! quality = 90              # JPEG quality (1-100)
//! # format = ".png"         # Extension or MIME type; default: from file name
//!
//! [processing]
//! # max_processes = 4       # Max parallel workers (omit for auto = CPU cores)
//!
//! [aliases]
//! # square = "fill"         # Extra adjustment names → registered adjustment
//!
//! [presets.thumbnail]
//! adjustment = "fill"
//! width = 200
//! height = 200
//!
//! [presets.large]
//! adjustment = "fit"
//! width = 1600
//! max_height = 1600
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse; override just the values you want:
//!
//! ```toml
//! [presets.thumbnail]
//! width = 320
//! ```
//!
//! Unknown keys are rejected to catch typos early. Unknown adjustment names
//! in presets are not: they resolve to the default adjustment at run time.

use crate::imaging::{AdjustmentRegistry, AdjustmentRequest, Quality, ValidationError};
use crate::mime::{MimeError, image_format_for};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Config validation error: {0}")]
    Invalid(#[from] ValidationError),
    #[error("Config validation error: output.format: {0}")]
    Format(#[from] MimeError),
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Encoding settings for written images.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Extra adjustment names, each pointing at a registered adjustment.
    pub aliases: BTreeMap<String, String>,
    /// Named adjustment requests.
    pub presets: BTreeMap<String, PresetConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            processing: ProcessingConfig::default(),
            aliases: BTreeMap::new(),
            presets: BTreeMap::from([
                (
                    "thumbnail".to_string(),
                    PresetConfig {
                        adjustment: "fill".to_string(),
                        width: Some(200),
                        height: Some(200),
                        ..PresetConfig::default()
                    },
                ),
                (
                    "large".to_string(),
                    PresetConfig {
                        adjustment: "fit".to_string(),
                        width: Some(1600),
                        max_height: Some(1600),
                        ..PresetConfig::default()
                    },
                ),
            ]),
        }
    }
}

impl Config {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        self.output.image_format()?;
        self.registry()?;
        for (name, preset) in &self.presets {
            preset.request().validate().map_err(|e| {
                ConfigError::Validation(format!("presets.{name}: {e}"))
            })?;
        }
        Ok(())
    }

    /// Registry of the built-in adjustments plus `[aliases]`.
    pub fn registry(&self) -> Result<AdjustmentRegistry, ConfigError> {
        Ok(AdjustmentRegistry::with_aliases(&self.aliases)?)
    }

    pub fn preset(&self, name: &str) -> Result<&PresetConfig, ConfigError> {
        self.presets
            .get(name)
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))
    }
}

/// Output encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Output format as an extension (`".png"`) or MIME type (`"image/png"`).
    /// When absent the format follows each output file's extension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            quality: Quality::default().value(),
            format: None,
        }
    }
}

impl OutputConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }

    /// The configured encoder format, if any.
    pub fn image_format(&self) -> Result<Option<ImageFormat>, MimeError> {
        self.format.as_deref().map(image_format_for).transpose()
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// A named adjustment request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PresetConfig {
    /// Registered adjustment name (`fit`, `crop`, `fill` or an alias).
    pub adjustment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<u32>,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            adjustment: crate::imaging::DEFAULT_ADJUSTMENT.to_string(),
            width: None,
            height: None,
            max_width: None,
            max_height: None,
        }
    }
}

impl PresetConfig {
    /// The preset's sizes as a request without areas.
    pub fn request(&self) -> AdjustmentRequest {
        AdjustmentRequest {
            width: self.width,
            height: self.height,
            max_width: self.max_width,
            max_height: self.max_height,
            areas: Vec::new(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(Config::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<Config, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: Config = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<Config, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# cropwise configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Each key only needs to be present if you want to override it.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output encoding
# ---------------------------------------------------------------------------
[output]
# JPEG quality (1 = worst, 100 = best). PNG, TIFF and WebP are lossless.
quality = 90

# Force every output file into one format, given as an extension (".png")
# or a MIME type ("image/png"). Omit to follow each output file's extension.
# format = ".jpg"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers for `cropwise batch`.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Adjustment aliases
# ---------------------------------------------------------------------------
# Extra names for the built-in adjustments (fit, crop, fill).
# An unknown adjustment name anywhere falls back to "fit".
[aliases]
# square = "fill"

# ---------------------------------------------------------------------------
# Presets
# ---------------------------------------------------------------------------
# Named requests for `--preset` and `cropwise batch`.
#
#   adjustment  fit  - shrink or grow to fit inside width x height
#               crop - cut out width x height, keeping areas of interest
#               fill - crop to the width:height ratio, then resize
#   width, height          requested size; either may be omitted
#   max_width, max_height  bound for the omitted side
[presets.thumbnail]
adjustment = "fill"
width = 200
height = 200

[presets.large]
adjustment = "fit"
width = 1600
max_height = 1600
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::AdjustmentKind;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_output_settings() {
        let config = Config::default();
        assert_eq!(config.output.quality, 90);
        assert_eq!(config.output.format, None);
        assert_eq!(config.output.quality(), Quality::new(90));
    }

    #[test]
    fn default_config_has_presets() {
        let config = Config::default();
        let thumbnail = config.preset("thumbnail").unwrap();
        assert_eq!(thumbnail.adjustment, "fill");
        assert_eq!(thumbnail.request(), AdjustmentRequest::sized(200, 200));

        let large = config.preset("large").unwrap();
        assert_eq!(large.width, Some(1600));
        assert_eq!(large.max_height, Some(1600));
        assert_eq!(large.height, None);
    }

    #[test]
    fn unknown_preset_is_error() {
        let config = Config::default();
        assert!(matches!(
            config.preset("poster"),
            Err(ConfigError::UnknownPreset(name)) if name == "poster"
        ));
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
[output]
quality = 75
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.output.quality, 75);
        // Default values preserved
        assert_eq!(config.processing.max_processes, None);
        assert!(config.presets.contains_key("thumbnail"));
    }

    #[test]
    fn preset_adjustment_defaults_to_fit() {
        let toml = r#"
[presets.banner]
width = 1200
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.presets["banner"].adjustment, "fit");
    }

    #[test]
    fn output_format_resolves_through_mime() {
        let mut output = OutputConfig::default();
        assert_eq!(output.image_format(), Ok(None));
        output.format = Some("image/png".to_string());
        assert_eq!(output.image_format(), Ok(Some(ImageFormat::Png)));
        output.format = Some(".jpg".to_string());
        assert_eq!(output.image_format(), Ok(Some(ImageFormat::Jpeg)));
    }

    #[test]
    fn registry_includes_aliases() {
        let toml = r#"
[aliases]
square = "fill"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let registry = config.registry().unwrap();
        assert_eq!(registry.lookup("square"), AdjustmentKind::Fill);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();

        assert_eq!(config.output.quality, 90);
        assert_eq!(config.presets.len(), 2);
    }

    #[test]
    fn load_config_merges_presets() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[presets.thumbnail]
width = 320

[presets.banner]
adjustment = "crop"
width = 1200
height = 300
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        let thumbnail = config.preset("thumbnail").unwrap();
        // Overridden value
        assert_eq!(thumbnail.width, Some(320));
        // Values from the stock preset preserved
        assert_eq!(thumbnail.height, Some(200));
        assert_eq!(thumbnail.adjustment, "fill");
        // New preset added next to the stock ones
        assert_eq!(config.preset("banner").unwrap().adjustment, "crop");
        assert!(config.presets.contains_key("large"));
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[output]
qualty = 80
"#,
        )
        .unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_preset_key_rejected() {
        let toml = r#"
[presets.thumbnail]
widht = 100
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[output]
quality = 0
"#,
        )
        .unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // validate tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_boundaries() {
        let mut config = Config::default();
        config.output.quality = 100;
        assert!(config.validate().is_ok());
        config.output.quality = 101;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn validate_rejects_unknown_format() {
        let mut config = Config::default();
        config.output.format = Some("bogus".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Format(_))));
    }

    #[test]
    fn validate_rejects_bad_alias() {
        let mut config = Config::default();
        config
            .aliases
            .insert("square".to_string(), "stretch".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn validate_rejects_zero_preset_size() {
        let mut config = Config::default();
        config.presets.insert(
            "empty".to_string(),
            PresetConfig {
                width: Some(0),
                ..PresetConfig::default()
            },
        );
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("presets.empty"));
    }

    #[test]
    fn validate_allows_unknown_adjustment_name() {
        let mut config = Config::default();
        config.presets.insert(
            "odd".to_string(),
            PresetConfig {
                adjustment: "stretch".to_string(),
                width: Some(10),
                ..PresetConfig::default()
            },
        );
        assert!(config.validate().is_ok());
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig {
            max_processes: None,
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn parse_processing_config() {
        let toml = r#"
[processing]
max_processes = 4
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.processing.max_processes, Some(4));
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"quality = 90"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"quality = 70"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("quality").unwrap().as_integer(), Some(70));
    }

    #[test]
    fn merge_toml_preserves_base_keys() {
        let base: toml::Value = toml::from_str(
            r#"
[output]
quality = 90
format = ".png"
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[output]
quality = 60
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let output = merged.get("output").unwrap();
        assert_eq!(output.get("quality").unwrap().as_integer(), Some(60));
        assert_eq!(output.get("format").unwrap().as_str(), Some(".png"));
    }

    // =========================================================================
    // stock config tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: Config = toml::from_str(stock_config_toml()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.output.quality, defaults.output.quality);
        assert_eq!(config.output.format, defaults.output.format);
        assert_eq!(config.processing.max_processes, None);
        assert_eq!(config.aliases, defaults.aliases);
        assert_eq!(config.presets, defaults.presets);
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in ["[output]", "[processing]", "[aliases]", "[presets.thumbnail]"] {
            assert!(content.contains(section), "missing {section}");
        }
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        assert!(val.get("output").is_some());
        assert!(val.get("processing").is_some());
        assert!(val.get("aliases").is_some());
        assert!(val.get("presets").is_some());
    }
}
