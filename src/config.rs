//! Generator configuration.
//!
//! A configuration describes one batch: canvas size, image count, deformity
//! options, and where outputs go. It can be built in code, assembled from
//! command line arguments, or loaded from a JSON file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{DEFAULT_CLASSIFICATION_FILE, DEFAULT_FILE_PREFIX};
use crate::deformity::{Placement, Shape, max_random_radius};
use crate::format::file_size;

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Log level setting for the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Where bitmaps are written relative to the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// All bitmaps directly in the output directory
    #[default]
    Flat,
    /// One sub-directory per severity label (`None/`, `Low/`, ...)
    ByClass,
}

/// Errors found while validating or loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// I/O error while reading or writing a config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Height or width is zero
    #[error("Image dimensions must be positive, got {height}x{width}")]
    EmptyCanvas {
        /// Requested height
        height: u32,
        /// Requested width
        width: u32,
    },

    /// Encoded bitmap would not fit the format's 32-bit size field
    #[error("Image too large: {height}x{width} exceeds the 4 GiB bitmap limit")]
    ImageTooLarge {
        /// Requested height
        height: u32,
        /// Requested width
        width: u32,
    },

    /// Maximum radius is zero
    #[error("Max radius must be at least 1")]
    ZeroRadius,

    /// Maximum radius does not fit the canvas
    #[error("Max radius too large: {max_radius} exceeds {limit} for a {height}x{width} image")]
    RadiusTooLarge {
        /// Requested maximum radius
        max_radius: u32,
        /// Largest accepted value
        limit: u32,
        /// Canvas height
        height: u32,
        /// Canvas width
        width: u32,
    },

    /// Fixed deformity touches or crosses the canvas edge
    #[error("Fixed deformity at [{row}, {col}] with radius {radius} does not fit the image")]
    FixedOutOfBounds {
        /// Center row
        row: u32,
        /// Center column
        col: u32,
        /// Radius
        radius: u32,
    },

    /// Version mismatch between expected and found
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version
        expected: u32,
        /// Found version
        found: u32,
    },
}

/// Configuration of one generation batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Canvas height in pixels
    pub height: u32,

    /// Canvas width in pixels
    pub width: u32,

    /// Number of images to generate
    pub image_count: u32,

    /// Largest radius a random deformity can have
    pub max_radius: u32,

    /// Deformity outline
    #[serde(default)]
    pub shape: Shape,

    /// Random or fixed deformity placement
    #[serde(default)]
    pub placement: Placement,

    /// Log deformity geometry and class boundaries for every image
    #[serde(default)]
    pub trace: bool,

    /// Output directory layout
    #[serde(default)]
    pub layout: Layout,

    /// Directory bitmaps are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Classification log path, relative to the working directory
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// File name prefix of generated bitmaps
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// Log verbosity when `trace` is off
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_file() -> PathBuf {
    PathBuf::from(DEFAULT_CLASSIFICATION_FILE)
}

fn default_file_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_string()
}

impl GeneratorConfig {
    /// Create a configuration with default options for the given batch.
    pub fn new(height: u32, width: u32, image_count: u32, max_radius: u32) -> Self {
        Self {
            version: CONFIG_VERSION,
            height,
            width,
            image_count,
            max_radius,
            shape: Shape::default(),
            placement: Placement::default(),
            trace: false,
            layout: Layout::default(),
            output_dir: default_output_dir(),
            log_file: default_log_file(),
            file_prefix: default_file_prefix(),
            log_level: LogLevel::default(),
        }
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = path.into();
        self
    }

    /// Level the logger should be initialised with.
    pub fn level_filter(&self) -> log::LevelFilter {
        if self.trace {
            log::LevelFilter::Trace
        } else {
            self.log_level.to_level_filter()
        }
    }

    /// Largest `max_radius` accepted for this canvas.
    ///
    /// Half of the smaller dimension, tightened for random placement so the
    /// center range `[r + 1, dim - r - 1]` is never empty.
    pub fn radius_limit(&self) -> u32 {
        let half = (self.height / 2).min(self.width / 2);
        match self.placement {
            Placement::Random => half.min(max_random_radius(self.height.min(self.width))),
            Placement::Fixed(_) => half,
        }
    }

    /// Check every precondition generation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch {
                expected: CONFIG_VERSION,
                found: self.version,
            });
        }
        if self.height == 0 || self.width == 0 {
            return Err(ConfigError::EmptyCanvas {
                height: self.height,
                width: self.width,
            });
        }
        if file_size(self.height, self.width).is_err() {
            return Err(ConfigError::ImageTooLarge {
                height: self.height,
                width: self.width,
            });
        }
        if self.max_radius == 0 {
            return Err(ConfigError::ZeroRadius);
        }

        let limit = self.radius_limit();
        if self.max_radius > limit {
            return Err(ConfigError::RadiusTooLarge {
                max_radius: self.max_radius,
                limit,
                height: self.height,
                width: self.width,
            });
        }

        if let Placement::Fixed(d) = self.placement {
            if !d.fits(self.height, self.width) {
                return Err(ConfigError::FixedOutOfBounds {
                    row: d.center_row,
                    col: d.center_col,
                    radius: d.radius,
                });
            }
        }

        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        log::info!("Loaded configuration from {:?}", path.as_ref());
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Saved configuration to {:?}", path.as_ref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deformity::Deformity;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::new(100, 100, 1, 30);
        assert_eq!(config.shape, Shape::Circle);
        assert_eq!(config.placement, Placement::Random);
        assert_eq!(config.layout, Layout::Flat);
        assert_eq!(config.log_file, PathBuf::from("classification.txt"));
        assert_eq!(config.file_prefix, "bitmap");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_radius_too_large() {
        let err = GeneratorConfig::new(100, 40, 1, 21).validate().unwrap_err();
        assert!(matches!(err, ConfigError::RadiusTooLarge { limit: 19, .. }));
        assert!(GeneratorConfig::new(100, 40, 1, 19).validate().is_ok());
    }

    #[test]
    fn test_random_limit_keeps_center_range_non_empty() {
        // half the width is 50, but r = 50 leaves no room for a center
        let config = GeneratorConfig::new(100, 100, 1, 50);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RadiusTooLarge { limit: 49, .. })
        ));
    }

    #[test]
    fn test_empty_canvas_and_zero_radius() {
        assert!(matches!(
            GeneratorConfig::new(0, 10, 1, 1).validate(),
            Err(ConfigError::EmptyCanvas { .. })
        ));
        assert!(matches!(
            GeneratorConfig::new(10, 10, 1, 0).validate(),
            Err(ConfigError::ZeroRadius)
        ));
    }

    #[test]
    fn test_oversized_canvas_rejected_before_allocation() {
        assert!(matches!(
            GeneratorConfig::new(40_000, 40_000, 1, 10).validate(),
            Err(ConfigError::ImageTooLarge { .. })
        ));
    }

    #[test]
    fn test_fixed_placement_must_fit() {
        let inside = GeneratorConfig::new(100, 100, 1, 30)
            .with_placement(Placement::Fixed(Deformity::new(21, 21, 20)));
        assert!(inside.validate().is_ok());

        let outside = GeneratorConfig::new(100, 100, 1, 30)
            .with_placement(Placement::Fixed(Deformity::new(10, 50, 20)));
        assert!(matches!(
            outside.validate(),
            Err(ConfigError::FixedOutOfBounds { row: 10, .. })
        ));
    }

    #[test]
    fn test_trace_raises_level() {
        let config = GeneratorConfig::new(10, 10, 1, 2);
        assert_eq!(config.level_filter(), log::LevelFilter::Info);
        assert_eq!(
            config.with_trace(true).level_filter(),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_json_fills_defaults() {
        let json = r#"{ "height": 64, "width": 48, "image_count": 5, "max_radius": 10,
                        "shape": "square", "layout": "by_class" }"#;
        let config: GeneratorConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.shape, Shape::Square);
        assert_eq!(config.layout, Layout::ByClass);
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("defectgen_config_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");

        let config = GeneratorConfig::new(100, 100, 3, 30)
            .with_placement(Placement::Fixed(Deformity::new(21, 21, 20)))
            .with_trace(true);
        config.save(&path).unwrap();
        assert_eq!(GeneratorConfig::load(&path).unwrap(), config);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_rejects_other_versions() {
        let dir = std::env::temp_dir().join(format!("defectgen_version_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(
            &path,
            r#"{ "version": 9, "height": 10, "width": 10, "image_count": 1, "max_radius": 2 }"#,
        )
        .unwrap();

        assert!(matches!(
            GeneratorConfig::load(&path),
            Err(ConfigError::VersionMismatch { found: 9, .. })
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
