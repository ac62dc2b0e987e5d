use crate::input::PointerEvent;
use crate::pixel_buffer::Rgba;
use super::{Tool, ToolKind, ToolState, ToolTarget};

/// Writes one pixel per pointer sample while dragging.
#[derive(Debug, Clone)]
pub struct PencilTool {
    state: ToolState,
    color: Rgba,
    pointer_color: Rgba,
}

impl PencilTool {
    pub fn new(color: Rgba, pointer_color: Rgba) -> Self {
        Self {
            state: ToolState::default(),
            color,
            pointer_color,
        }
    }
}

impl Tool for PencilTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Pencil
    }

    fn state(&self) -> &ToolState {
        &self.state
    }

    fn reset(&mut self) {
        self.state.reset();
    }

    fn mouse_down(&mut self, event: &PointerEvent, target: &mut ToolTarget<'_>) {
        let pos = target.grid_pos(event);
        self.state.begin_drag(pos, target.pointer);
    }

    fn mouse_move(&mut self, event: &PointerEvent, target: &mut ToolTarget<'_>) {
        let pos = target.grid_pos(event);
        self.state.advance(pos);
        if self.state.is_dragging() {
            if let Some(current) = target.current.as_deref_mut() {
                current.set_pixel_at(pos.x, pos.y, self.color);
            }
        } else {
            self.state.move_highlight(target.pointer, self.pointer_color);
        }
    }

    fn mouse_up(&mut self, event: &PointerEvent, target: &mut ToolTarget<'_>) {
        let pos = target.grid_pos(event);
        self.state.end_drag(pos);
    }
}
