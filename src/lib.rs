#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod compositor;
pub mod config;
pub mod error;
pub mod id_generator;
pub mod input;
pub mod layer;
pub mod pixel_buffer;
pub mod region;
pub mod state;
pub mod tools;

pub use app::PaintApp;
pub use compositor::{CompositeSources, CompositingEngine, DisplaySurface, ScreenRaster};
pub use config::{EditorConfig, Size};
pub use error::{EditorError, EditorResult};
pub use input::{GridMapping, GridPos, InputEvent, InputHandler, PointerEvent};
pub use layer::{Layer, LayerId};
pub use pixel_buffer::{BufferId, BufferTag, PixelBuffer, Rgba};
pub use region::{compute_region, CellRect, Region};
pub use state::EditorState;
pub use tools::{rectangle_fill_color, Tool, ToolKind, ToolType};
