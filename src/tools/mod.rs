use serde::{Deserialize, Serialize};
use crate::config::{EditorConfig, Size};
use crate::error::EditorResult;
use crate::input::{GridMapping, GridPos, PointerEvent};
use crate::pixel_buffer::{PixelBuffer, Rgba};
use crate::region::{compute_region, Region};

mod pencil;
mod rectangle;
mod line;

pub use pencil::PencilTool;
pub use rectangle::{RectangleTool, rectangle_fill_color};
pub use line::LineTool;

/// The buffers a tool may write during one pointer event, borrowed from the editor.
#[derive(Debug)]
pub struct ToolTarget<'a> {
    pub mapping: GridMapping,
    /// The in-progress edit, absent until a buffer is started
    pub current: Option<&'a mut PixelBuffer>,
    pub pointer: &'a mut PixelBuffer,
}

impl ToolTarget<'_> {
    pub fn grid_pos(&self, event: &PointerEvent) -> GridPos {
        self.mapping.to_grid(event.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging,
}

/// Transient positional state every tool carries.
#[derive(Debug, Clone, Default)]
pub struct ToolState {
    pub drag: DragState,
    pub current_pos: GridPos,
    pub last_pos: GridPos,
    /// Region touched by the most recent event
    pub dirty_region: Option<Region>,
    highlighted: Option<GridPos>,
}

impl ToolState {
    pub fn is_dragging(&self) -> bool {
        self.drag == DragState::Dragging
    }

    /// Enters Dragging at `pos` and hides the cursor highlight.
    fn begin_drag(&mut self, pos: GridPos, pointer: &mut PixelBuffer) {
        let hidden_at = self.clear_highlight(pointer);
        self.drag = DragState::Dragging;
        self.current_pos = pos;
        self.last_pos = pos;
        self.dirty_region = Some(compute_region(hidden_at.unwrap_or(pos), pos));
    }

    fn end_drag(&mut self, pos: GridPos) {
        self.drag = DragState::Idle;
        self.current_pos = pos;
    }

    /// Moves to `pos` and returns the region spanning the previous and new positions.
    /// `last_pos` follows so regions never grow across moves.
    fn advance(&mut self, pos: GridPos) -> Region {
        self.current_pos = pos;
        let region = compute_region(self.last_pos, self.current_pos);
        self.last_pos = self.current_pos;
        self.dirty_region = Some(region);
        region
    }

    /// Clears the previous cursor highlight and draws one at `current_pos`.
    fn move_highlight(&mut self, pointer: &mut PixelBuffer, color: Rgba) {
        self.clear_highlight(pointer);
        let pos = self.current_pos;
        if pointer.contains(pos.x, pos.y) {
            pointer.set_pixel_at(pos.x, pos.y, color);
            self.highlighted = Some(pos);
        }
    }

    fn clear_highlight(&mut self, pointer: &mut PixelBuffer) -> Option<GridPos> {
        let pos = self.highlighted.take()?;
        pointer.clear_pixel_at(pos.x, pos.y);
        Some(pos)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The closed set of tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Pencil,
    Rectangle,
    Line,
}

impl ToolKind {
    pub fn all() -> &'static [ToolKind] {
        &[ToolKind::Pencil, ToolKind::Rectangle, ToolKind::Line]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pencil => "Pixel Pencil",
            Self::Rectangle => "Rectangle",
            Self::Line => "Line",
        }
    }
}

/// Tool trait defines the interface for all drawing tools
///
/// Each tool is Idle or Dragging. Pixel writes outside the canvas and writes
/// with no edit buffer are ignored. Tools never commit: the caller pushes the
/// edit buffer into a layer after `mouse_up`.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    fn state(&self) -> &ToolState;

    fn name(&self) -> &'static str {
        self.kind().label()
    }

    fn current_pos(&self) -> GridPos {
        self.state().current_pos
    }

    fn last_pos(&self) -> GridPos {
        self.state().last_pos
    }

    fn dirty_region(&self) -> Option<Region> {
        self.state().dirty_region
    }

    /// Acquires tool-local resources for a canvas of `size`.
    fn start(&mut self, _size: Size) -> EditorResult<()> {
        Ok(())
    }

    /// Releases resources and returns to Idle. Safe to call repeatedly.
    fn end(&mut self) {
        self.reset();
    }

    /// Releases resources and returns to Idle. Safe to call repeatedly.
    fn reset(&mut self);

    fn mouse_down(&mut self, event: &PointerEvent, target: &mut ToolTarget<'_>);

    fn mouse_move(&mut self, event: &PointerEvent, target: &mut ToolTarget<'_>);

    fn mouse_up(&mut self, event: &PointerEvent, target: &mut ToolTarget<'_>);
}

/// Enum representing all available tool types
#[derive(Debug)]
pub enum ToolType {
    Pencil(PencilTool),
    Rectangle(RectangleTool),
    Line(LineTool),
}

impl ToolType {
    /// A fresh, not yet started tool of `kind`.
    pub fn new(kind: ToolKind, config: &EditorConfig) -> Self {
        match kind {
            ToolKind::Pencil => Self::Pencil(PencilTool::new(config.pencil_color, config.pointer_color)),
            ToolKind::Rectangle => Self::Rectangle(RectangleTool::new(config.pointer_color)),
            ToolKind::Line => Self::Line(LineTool::new(config.pencil_color, config.pointer_color)),
        }
    }
}

impl Tool for ToolType {
    fn kind(&self) -> ToolKind {
        match self {
            Self::Pencil(tool) => tool.kind(),
            Self::Rectangle(tool) => tool.kind(),
            Self::Line(tool) => tool.kind(),
        }
    }

    fn state(&self) -> &ToolState {
        match self {
            Self::Pencil(tool) => tool.state(),
            Self::Rectangle(tool) => tool.state(),
            Self::Line(tool) => tool.state(),
        }
    }

    fn start(&mut self, size: Size) -> EditorResult<()> {
        match self {
            Self::Pencil(tool) => tool.start(size),
            Self::Rectangle(tool) => tool.start(size),
            Self::Line(tool) => tool.start(size),
        }
    }

    fn end(&mut self) {
        match self {
            Self::Pencil(tool) => tool.end(),
            Self::Rectangle(tool) => tool.end(),
            Self::Line(tool) => tool.end(),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Pencil(tool) => tool.reset(),
            Self::Rectangle(tool) => tool.reset(),
            Self::Line(tool) => tool.reset(),
        }
    }

    fn mouse_down(&mut self, event: &PointerEvent, target: &mut ToolTarget<'_>) {
        match self {
            Self::Pencil(tool) => tool.mouse_down(event, target),
            Self::Rectangle(tool) => tool.mouse_down(event, target),
            Self::Line(tool) => tool.mouse_down(event, target),
        }
    }

    fn mouse_move(&mut self, event: &PointerEvent, target: &mut ToolTarget<'_>) {
        match self {
            Self::Pencil(tool) => tool.mouse_move(event, target),
            Self::Rectangle(tool) => tool.mouse_move(event, target),
            Self::Line(tool) => tool.mouse_move(event, target),
        }
    }

    fn mouse_up(&mut self, event: &PointerEvent, target: &mut ToolTarget<'_>) {
        match self {
            Self::Pencil(tool) => tool.mouse_up(event, target),
            Self::Rectangle(tool) => tool.mouse_up(event, target),
            Self::Line(tool) => tool.mouse_up(event, target),
        }
    }
}
