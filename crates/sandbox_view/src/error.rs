//! View error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while presenting frames
#[derive(Debug, Error)]
pub enum ViewError {
    /// Frame output directory could not be prepared
    #[error("Failed to prepare frame directory {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding a frame failed
    #[error("Failed to encode frame {path:?}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
