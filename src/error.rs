//! Error type shared by every module of the crate.

use thiserror::Error;

/// Errors produced while building payloads, rendering, exporting or
/// persisting history.
///
/// Blank user input is never an error: the formatter and the remote form
/// treat it as a no-op or fall back to a placeholder payload.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding a surface into an image format failed.
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    /// A history or storage file could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration file is not valid TOML.
    #[error("Invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration could not be written back as TOML.
    #[error("Configuration serialization error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// A color string is not `#RGB` or `#RRGGBB`.
    #[error("Invalid color `{0}`: expected #RGB or #RRGGBB")]
    InvalidColor(String),

    /// The category name is not one of the supported content types.
    #[error("Unknown category `{0}`")]
    UnknownCategory(String),

    /// The error level is not one of L, M, Q or H.
    #[error("Unknown error level `{0}`: expected L, M, Q or H")]
    UnknownErrorLevel(String),

    /// The WiFi security scheme is not WPA, WEP or nopass.
    #[error("Unknown WiFi security `{0}`: expected WPA, WEP or nopass")]
    UnknownSecurity(String),

    /// The requested export format is not supported.
    #[error("Unknown export format `{0}`")]
    UnknownFormat(String),

    /// Lossy quality must lie in (0, 1].
    #[error("Invalid quality {0}: expected a value in (0, 1]")]
    InvalidQuality(f32),

    /// No history entry carries the given id.
    #[error("No history entry with id {0}")]
    EntryNotFound(u64),

    /// The remote form already holds an entry with exactly this text.
    #[error("The code already exists in the history: `{0}`")]
    DuplicateEntry(String),

    /// The system clipboard refused the write.
    #[error("Clipboard access error: {0}")]
    Clipboard(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
