use std::path::PathBuf;

use glam::UVec2;
use thiserror::Error;

/// Errors raised while preparing cameras and output images
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to read camera file '{path}': {source}")]
    CameraIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid camera file: expected 21 or 23 numbers, found {0}")]
    CameraValueCount(usize),

    #[error("invalid number '{0}' in camera file")]
    CameraNumber(String),

    #[error("invalid camera: {0}")]
    InvalidCamera(String),

    #[error("image size {actual} does not match buffer size {expected}")]
    SizeMismatch { expected: UVec2, actual: UVec2 },

    #[error("unknown color map '{0}' (expected gray, jet or hotcold)")]
    UnknownColorMap(String),
}
