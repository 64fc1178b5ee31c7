//! Error types for Tint.

use thiserror::Error;

/// Top-level error type for Tint operations.
#[derive(Debug, Error)]
pub enum TintError {
    /// Colormap construction errors
    #[error("Colormap error: {0}")]
    Colormap(#[from] ColormapError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Manifest version mismatch
    #[error("Manifest version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Expected version
        expected: String,
        /// Actual version found
        actual: String,
    },
}

/// Errors raised while building a colormap at reload time.
///
/// These never escape a per-frame query; the reload caller skips the
/// offending definition and keeps going.
#[derive(Debug, Error)]
pub enum ColormapError {
    /// Palette image file does not exist
    #[error("Palette image not found: {0}")]
    NotFound(String),

    /// Palette image could not be decoded
    #[error("Failed to decode palette image: {0}")]
    Decode(String),

    /// Format requires an image but none was supplied
    #[error("Colormap format {0} requires a palette image")]
    MissingImage(&'static str),

    /// Image has no pixels
    #[error("Palette image is empty")]
    EmptyImage,

    /// Image dimensions do not match what the format requires
    #[error("Wrong dimensions for {format} colormap: expected {expected_width}x{expected_height}, got {width}x{height}")]
    WrongDimensions {
        /// Format name
        format: &'static str,
        /// Required width
        expected_width: u32,
        /// Required height
        expected_height: u32,
        /// Actual width
        width: u32,
        /// Actual height
        height: u32,
    },

    /// Pixel buffer length does not match width x height
    #[error("Pixel buffer holds {actual} samples, expected {expected}")]
    BufferSize {
        /// width x height
        expected: usize,
        /// Samples supplied
        actual: usize,
    },

    /// Authored color string is not a hex color
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    /// Identifier string is malformed
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// Explicit column mapping names a biome the host does not know
    #[error("Unknown biome in column mapping: {0}")]
    UnknownBiome(String),
}

/// Configuration load/save errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be parsed
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// File path
        path: String,
        /// Parser message
        message: String,
    },

    /// Value could not be serialized
    #[error("Failed to serialize: {0}")]
    Serialize(String),
}

/// Result type alias for Tint operations.
pub type TintResult<T> = Result<T, TintError>;

/// Result type alias for colormap construction.
pub type ColormapResult<T> = Result<T, ColormapError>;
