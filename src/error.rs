use thiserror::Error;
use crate::layer::LayerId;

/// Errors surfaced to the host application.
///
/// Pixel-level problems (out-of-bounds writes, a missing edit buffer) are not
/// errors: they are silently ignored so a drag that leaves the canvas never
/// interrupts the gesture.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvasSize { width: u32, height: u32 },
    #[error("Invalid pixel size {0}, must be at least 1")]
    InvalidPixelSize(u32),
    #[error("Failed to allocate a {width}x{height} raster surface")]
    SurfaceAllocation { width: u32, height: u32 },
    #[error("No layer with id {0}")]
    UnknownLayer(LayerId),
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type EditorResult<T> = Result<T, EditorError>;
