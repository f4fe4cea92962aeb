//! Terrain error handling
//!
//! One error type shared by the height field, mesh, placement, config and
//! GPU code. Every failure is local and non-fatal: operations that fail
//! leave the state they would have modified untouched.

use std::path::PathBuf;
use thiserror::Error;

/// Type alias for terrain operation results
pub type TerrainResult<T> = Result<T, TerrainError>;

#[derive(Debug, Error)]
pub enum TerrainError {
    #[error("Failed to load image {path:?}: {error}")]
    ImageDecode { path: PathBuf, error: String },

    #[error("Image {path:?} is {width}x{height}, device limit is {max}")]
    TextureTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max: u32,
    },

    #[error("Invalid tessellation {tessellation}: {reason}")]
    InvalidTessellation { tessellation: u32, reason: String },

    #[error("Elevation data has not been loaded")]
    ElevationNotLoaded,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to read config {path:?}: {error}")]
    ConfigIo { path: PathBuf, error: std::io::Error },

    #[error("Failed to parse config {path:?}: {error}")]
    ConfigParse { path: PathBuf, error: toml::de::Error },

    #[error("GPU operation '{operation}' failed: {error}")]
    Gpu { operation: String, error: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Create an image decode error
pub fn image_decode_error(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> TerrainError {
    TerrainError::ImageDecode {
        path: path.into(),
        error: error.to_string(),
    }
}

/// Create a GPU operation error
pub fn gpu_operation_error(operation: &str, error: impl std::fmt::Display) -> TerrainError {
    TerrainError::Gpu {
        operation: operation.to_string(),
        error: error.to_string(),
    }
}
