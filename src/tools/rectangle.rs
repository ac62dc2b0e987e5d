use crate::input::{GridPos, PointerEvent};
use crate::pixel_buffer::{PixelBuffer, Rgba};
use crate::region::compute_region;
use super::{Tool, ToolKind, ToolState, ToolTarget};

/// Procedural fill of cell `(x, y)`: a coordinate test pattern, not a user color.
pub fn rectangle_fill_color(x: i32, y: i32) -> Rgba {
    let (x, y) = (i64::from(x), i64::from(y));
    Rgba::clamped((x * 10) % 255, (y * 10) % 255, ((x + y) * 2) % 255, 255)
}

/// Fills the rectangle spanned by the press position and the pointer.
#[derive(Debug, Clone)]
pub struct RectangleTool {
    state: ToolState,
    init_pos: GridPos,
    pointer_color: Rgba,
}

impl RectangleTool {
    pub fn new(pointer_color: Rgba) -> Self {
        Self {
            state: ToolState::default(),
            init_pos: GridPos::default(),
            pointer_color,
        }
    }

    pub fn init_pos(&self) -> GridPos {
        self.init_pos
    }

    /// Fills `a`..=`b` on both axes, clipped to the buffer.
    fn fill(buffer: &mut PixelBuffer, a: GridPos, b: GridPos) {
        let max_x = buffer.width() as i32 - 1;
        let max_y = buffer.height() as i32 - 1;
        let (x0, x1) = (a.x.min(b.x).max(0), a.x.max(b.x).min(max_x));
        let (y0, y1) = (a.y.min(b.y).max(0), a.y.max(b.y).min(max_y));
        for y in y0..=y1 {
            for x in x0..=x1 {
                buffer.set_pixel_at(x, y, rectangle_fill_color(x, y));
            }
        }
    }
}

impl Tool for RectangleTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Rectangle
    }

    fn state(&self) -> &ToolState {
        &self.state
    }

    fn reset(&mut self) {
        self.state.reset();
        self.init_pos = GridPos::default();
    }

    fn mouse_down(&mut self, event: &PointerEvent, target: &mut ToolTarget<'_>) {
        let pos = target.grid_pos(event);
        self.init_pos = pos;
        self.state.begin_drag(pos, target.pointer);
    }

    fn mouse_move(&mut self, event: &PointerEvent, target: &mut ToolTarget<'_>) {
        let pos = target.grid_pos(event);
        let last = self.state.last_pos;
        let step = self.state.advance(pos);
        if !self.state.is_dragging() {
            self.state.move_highlight(target.pointer, self.pointer_color);
            return;
        }

        if let Some(current) = target.current.as_deref_mut() {
            Self::fill(current, self.init_pos, pos);
        }
        // The fill spans from the anchor, so the step region alone is not enough.
        let region = step
            .union(&compute_region(self.init_pos, pos))
            .union(&compute_region(self.init_pos, last));
        self.state.dirty_region = Some(region);
    }

    fn mouse_up(&mut self, event: &PointerEvent, target: &mut ToolTarget<'_>) {
        let pos = target.grid_pos(event);
        self.state.end_drag(pos);
    }
}
