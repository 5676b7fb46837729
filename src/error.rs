//! Error types
//!
//! Nothing here crosses the per-frame API: asset and settings errors surface
//! at startup, geometry errors are recovered inside the simulation.

use thiserror::Error;

/// Failure to produce usable sprite data
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("image '{0}' not found")]
    Missing(String),
    #[error("failed to decode image '{path}': {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("pixel buffer for {width}x{height} image has {len} bytes, expected {expected}")]
    BadBuffer {
        width: u32,
        height: u32,
        len: usize,
        expected: usize,
    },
    #[error("cannot slice {width}x{height} sheet into {columns}x{rows} frames")]
    BadGrid {
        width: u32,
        height: u32,
        columns: u32,
        rows: u32,
    },
    #[error("sprite group '{0}' has no images")]
    EmptyGroup(&'static str),
}

/// Rotation could not produce an image
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("cannot rotate an empty {width}x{height} image")]
    Empty { width: u32, height: u32 },
    #[error("rotation angle {0} is not finite")]
    NonFiniteAngle(f32),
}

/// Invalid or unreadable settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// A `Game` could not be set up from its inputs
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Assets(#[from] AssetError),
}
