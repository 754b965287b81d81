//! Service configuration module.
//!
//! Handles loading, validating, and merging `fotomat.toml`. Stock defaults are
//! the base layer; a user config file overrides just the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! work_dir = "."                 # Base for request destDir values and fonts_dir
//!
//! [watermark]
//! fonts_dir = "fonts"            # Relative to work_dir
//! font = "OpenSans-SemiBold.ttf" # TrueType font used for watermark text
//!
//! [categories]
//! profile = "images/profile/"    # destDir that selects square-cropped avatars
//!
//! [processing]
//! max_processes = 4              # Max parallel batch workers (omit for auto = CPU cores)
//! max_thumbnail_height = 4096    # Larger request heights are rejected with 400
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Service configuration loaded from `fotomat.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Directory request `destDir` values and `watermark.fonts_dir` resolve against.
    pub work_dir: PathBuf,
    /// Watermark font settings.
    pub watermark: WatermarkConfig,
    /// Destination directories with special handling.
    pub categories: CategoriesConfig,
    /// Batch parallelism and request limits.
    pub processing: ProcessingConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("."),
            watermark: WatermarkConfig::default(),
            categories: CategoriesConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.watermark.font.trim().is_empty() {
            return Err(ConfigError::Validation(
                "watermark.font must not be empty".into(),
            ));
        }
        if !self.categories.profile.ends_with('/') {
            return Err(ConfigError::Validation(
                "categories.profile must end with '/'".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        if self.processing.max_thumbnail_height == 0 {
            return Err(ConfigError::Validation(
                "processing.max_thumbnail_height must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Full path of the watermark font.
    pub fn font_path(&self) -> PathBuf {
        self.work_dir
            .join(&self.watermark.fonts_dir)
            .join(&self.watermark.font)
    }
}

/// Watermark font settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WatermarkConfig {
    pub fonts_dir: String,
    pub font: String,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            fonts_dir: "fonts".to_string(),
            font: "OpenSans-SemiBold.ttf".to_string(),
        }
    }
}

/// Destination directories with special handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoriesConfig {
    /// Requests whose `destDir` equals this value are profile images.
    pub profile: String,
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            profile: "images/profile/".to_string(),
        }
    }
}

/// Batch parallelism and request limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel batch workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
    /// Largest thumbnail height a request may ask for.
    pub max_thumbnail_height: u32,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_processes: None,
            max_thumbnail_height: 4096,
        }
    }
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

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged on top of.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ServiceConfig::default())?)
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

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Load the service config.
///
/// With no path, returns validated stock defaults. With a path, merges the
/// file on top of stock defaults, rejects unknown keys, and validates.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match path {
        Some(path) => merge_toml(base, load_raw_config(path)?),
        None => base,
    };
    let config: ServiceConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `fotomat.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# fotomat configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Base directory. Request destDir values (e.g. "images/forum/") and
# watermark.fonts_dir are resolved against it.
work_dir = "."

[watermark]
# Directory holding the watermark font, relative to work_dir.
fonts_dir = "fonts"
# TrueType font used to draw watermark text.
font = "OpenSans-SemiBold.ttf"

[categories]
# A request whose destDir equals this value is a profile image: JPEG/PNG
# uploads are cropped to a centred square, GIF uploads are rejected.
# Every other destDir gets the generic treatment.
profile = "images/profile/"

[processing]
# Maximum parallel workers for `fotomat batch`.
# Omit to use all CPU cores. Values above the core count are clamped down.
# max_processes = 4
# Largest thumbnail height a request may ask for. Taller requests are
# rejected as invalid before any image is decoded.
max_thumbnail_height = 4096
"##
}
