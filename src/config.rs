//! Configuration file handling.
//!
//! Defaults for new codes and the locations of generated files live in
//! `$XDG_CONFIG_HOME/qrstudio/config.toml` (or the platform equivalent).
//! A missing file means built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::Result;
use crate::export::DEFAULT_QUALITY;
use crate::matrix::ErrorLevel;
use crate::session::{GenerationRequest, DEFAULT_SIZE};

const APP_DIR: &str = "qrstudio";

/// Configuration stored on disk.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub paths: Paths,
}

/// Starting values of every new code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub size: u32,
    pub foreground: Color,
    pub background: Color,
    pub error_level: ErrorLevel,
    /// Quality for JPEG and WebP, in (0, 1].
    pub jpeg_quality: f32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            foreground: Color::BLACK,
            background: Color::WHITE,
            error_level: ErrorLevel::Medium,
            jpeg_quality: DEFAULT_QUALITY,
        }
    }
}

/// Where generated files go.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    /// Directory for downloaded codes.
    pub output_dir: PathBuf,
    /// JSON file holding the generator history.
    pub history_file: PathBuf,
    /// JSON file backing the simple form's key-value storage.
    pub remote_store_file: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR));
        Self {
            output_dir: PathBuf::from("generated"),
            history_file: data_dir.join("history.json"),
            remote_store_file: data_dir.join("storage.json"),
        }
    }
}

impl Config {
    /// Default location of the configuration file, if the platform has a
    /// configuration directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Loads configuration from `path`, or defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Saves configuration to `path`, creating the parent directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// A request for `Category::Url` carrying the configured defaults.
    pub fn initial_request(&self) -> GenerationRequest {
        GenerationRequest {
            foreground: self.defaults.foreground,
            background: self.defaults.background,
            size: self.defaults.size,
            error_level: self.defaults.error_level,
            ..GenerationRequest::default()
        }
    }
}
