//! Asset error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading sprites
#[derive(Debug, Error)]
pub enum AssetError {
    /// File is missing or unreadable
    #[error("Cannot read image {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exists but could not be decoded
    #[error("Cannot decode image {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Scale factor is not a positive finite number
    #[error("Invalid scale factor {0}")]
    InvalidScale(f32),
}
