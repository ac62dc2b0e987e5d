use std::path::Path;
use log::info;
use serde::{Deserialize, Serialize};
use crate::error::{EditorError, EditorResult};
use crate::pixel_buffer::Rgba;

/// Canvas dimensions in raster pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Checkerboard drawn under everything to show transparency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Side of one square in raster pixels
    pub cell: u32,
    pub light: Rgba,
    pub dark: Rgba,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            cell: 4,
            light: Rgba::new(255, 255, 255, 255),
            dark: Rgba::new(204, 204, 204, 255),
        }
    }
}

/// Editor settings. Missing fields take their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub size: Size,
    /// Screen pixels per raster pixel
    pub pixel_size: u32,
    /// Color laid down by the pencil and line tools
    pub pencil_color: Rgba,
    /// Cursor highlight shown while no gesture is in progress
    pub pointer_color: Rgba,
    pub checker: CheckerConfig,
}

pub const DEFAULT_WIDTH: u32 = 400;
pub const DEFAULT_HEIGHT: u32 = 400;
pub const DEFAULT_PIXEL_SIZE: u32 = 5;

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            size: Size::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
            pixel_size: DEFAULT_PIXEL_SIZE,
            pencil_color: Rgba::GREEN,
            pointer_color: Rgba::GREEN,
            checker: CheckerConfig::default(),
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> EditorResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> EditorResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    pub fn to_json_string(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> EditorResult<()> {
        if self.size.width == 0 || self.size.height == 0 {
            return Err(EditorError::InvalidCanvasSize {
                width: self.size.width,
                height: self.size.height,
            });
        }
        if self.pixel_size == 0 {
            return Err(EditorError::InvalidPixelSize(self.pixel_size));
        }
        Ok(())
    }
}
