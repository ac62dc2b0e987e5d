use std::fmt;
use log::warn;
use tiny_skia::{Color, LineCap, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};
use crate::config::Size;
use crate::error::{EditorError, EditorResult};
use crate::input::{GridPos, PointerEvent};
use crate::pixel_buffer::{PixelBuffer, Rgba};
use crate::region::compute_region;
use super::{Tool, ToolKind, ToolState, ToolTarget};

/// Draws a straight 1-pixel line from the press position to the pointer.
///
/// The line is rasterized on an off-screen surface and replaces the edit
/// buffer wholesale on every move, so it is redrawn rather than accumulated.
#[derive(Clone)]
pub struct LineTool {
    state: ToolState,
    init_pos: GridPos,
    color: Rgba,
    pointer_color: Rgba,
    surface: Option<Pixmap>,
}

impl fmt::Debug for LineTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineTool")
            .field("state", &self.state)
            .field("init_pos", &self.init_pos)
            .field("color", &self.color)
            .field("surface", &self.surface.as_ref().map(|s| (s.width(), s.height())))
            .finish_non_exhaustive()
    }
}

impl LineTool {
    pub fn new(color: Rgba, pointer_color: Rgba) -> Self {
        Self {
            state: ToolState::default(),
            init_pos: GridPos::default(),
            color,
            pointer_color,
            surface: None,
        }
    }

    pub fn init_pos(&self) -> GridPos {
        self.init_pos
    }

    pub fn is_started(&self) -> bool {
        self.surface.is_some()
    }

    /// Clears `surface` and strokes `from`..`to` through cell centers as opaque coverage.
    fn rasterize(surface: &mut Pixmap, from: GridPos, to: GridPos) {
        surface.fill(Color::TRANSPARENT);

        let mut paint = Paint::default();
        paint.set_color_rgba8(255, 255, 255, 255);
        paint.anti_alias = false;

        if from == to {
            if let Some(cell) = Rect::from_xywh(from.x as f32, from.y as f32, 1.0, 1.0) {
                surface.fill_rect(cell, &paint, Transform::identity(), None);
            }
            return;
        }

        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32 + 0.5, from.y as f32 + 0.5);
        pb.line_to(to.x as f32 + 0.5, to.y as f32 + 0.5);
        let Some(path) = pb.finish() else { return };

        // Square caps reach half a cell past each center so both end cells are covered.
        let stroke = Stroke {
            width: 1.0,
            line_cap: LineCap::Square,
            ..Stroke::default()
        };
        surface.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Replaces `buffer` with `color` on every covered cell of `surface`.
    ///
    /// The pixmap is premultiplied, so its bytes are only read as coverage and
    /// the ink is written straight.
    fn write_coverage(surface: &Pixmap, buffer: &mut PixelBuffer, color: Rgba) {
        buffer.clear();
        let width = surface.width() as usize;
        for (i, px) in surface.pixels().iter().enumerate() {
            if px.alpha() > 0 {
                buffer.set_pixel_at((i % width) as i32, (i / width) as i32, color);
            }
        }
    }
}

impl Tool for LineTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Line
    }

    fn state(&self) -> &ToolState {
        &self.state
    }

    fn start(&mut self, size: Size) -> EditorResult<()> {
        let surface = Pixmap::new(size.width, size.height).ok_or(EditorError::SurfaceAllocation {
            width: size.width,
            height: size.height,
        })?;
        self.surface = Some(surface);
        Ok(())
    }

    fn reset(&mut self) {
        self.state.reset();
        self.init_pos = GridPos::default();
        self.surface = None;
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

        if let (Some(surface), Some(current)) = (self.surface.as_mut(), target.current.as_deref_mut()) {
            if surface.width() == current.width() && surface.height() == current.height() {
                Self::rasterize(surface, self.init_pos, pos);
                Self::write_coverage(surface, current, self.color);
            } else {
                warn!(
                    "Line surface is {}x{} but the edit buffer is {}x{}; skipping",
                    surface.width(),
                    surface.height(),
                    current.width(),
                    current.height()
                );
            }
        }
        // The old line ran from the anchor to `last` and is erased by this redraw.
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{at, Canvas};

    const INK: Rgba = Rgba::new(0, 255, 0, 255);

    fn started_line(size: u32) -> LineTool {
        let mut tool = LineTool::new(INK, Rgba::WHITE);
        tool.start(Size::new(size, size)).unwrap();
        tool
    }

    #[test]
    fn test_start_binds_surface_and_end_releases_it() {
        let mut tool = started_line(8);
        assert!(tool.is_started());
        tool.end();
        assert!(!tool.is_started());
        tool.end();
        assert!(!tool.is_started());
    }

    #[test]
    fn test_horizontal_line_covers_both_ends() {
        let mut canvas = Canvas::new(12, 12);
        let mut tool = started_line(12);
        tool.mouse_down(&at(1, 2), &mut canvas.target());
        tool.mouse_move(&at(6, 2), &mut canvas.target());

        let buf = canvas.current();
        for x in 1..=6 {
            assert_eq!(buf.pixel_at(x, 2), Some(INK), "cell ({x}, 2)");
        }
        assert_eq!(buf.pixel_at(0, 2), Some(Rgba::TRANSPARENT));
        assert_eq!(buf.pixel_at(7, 2), Some(Rgba::TRANSPARENT));
        assert_eq!(buf.pixel_at(3, 1), Some(Rgba::TRANSPARENT));
        assert_eq!(buf.pixel_at(3, 3), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_line_is_redrawn_not_accumulated() {
        let mut canvas = Canvas::new(12, 12);
        let mut tool = started_line(12);
        tool.mouse_down(&at(1, 2), &mut canvas.target());
        tool.mouse_move(&at(6, 2), &mut canvas.target());
        tool.mouse_move(&at(1, 8), &mut canvas.target());

        let buf = canvas.current();
        assert_eq!(buf.pixel_at(4, 2), Some(Rgba::TRANSPARENT));
        for y in 2..=8 {
            assert_eq!(buf.pixel_at(1, y), Some(INK), "cell (1, {y})");
        }
    }

    #[test]
    fn test_translucent_ink_is_stored_straight() {
        let ink = Rgba::new(200, 100, 50, 128);
        let mut canvas = Canvas::new(12, 12);
        let mut tool = LineTool::new(ink, Rgba::WHITE);
        tool.start(Size::new(12, 12)).unwrap();
        tool.mouse_down(&at(1, 2), &mut canvas.target());
        tool.mouse_move(&at(6, 2), &mut canvas.target());

        let buf = canvas.current();
        for x in 1..=6 {
            assert_eq!(buf.pixel_at(x, 2), Some(ink), "cell ({x}, 2)");
        }
        assert_eq!(buf.pixel_at(7, 2), Some(Rgba::TRANSPARENT));
    }

    #[test]
    fn test_zero_length_line_is_one_pixel() {
        let mut canvas = Canvas::new(8, 8);
        let mut tool = started_line(8);
        tool.mouse_down(&at(3, 3), &mut canvas.target());
        tool.mouse_move(&at(3, 3), &mut canvas.target());
        let buf = canvas.current();
        assert_eq!(buf.pixel_at(3, 3), Some(INK));
        let painted = buf.data().chunks_exact(4).filter(|px| px[3] > 0).count();
        assert_eq!(painted, 1);
    }

    #[test]
    fn test_unstarted_line_writes_nothing() {
        let mut canvas = Canvas::new(8, 8);
        let mut tool = LineTool::new(INK, Rgba::WHITE);
        tool.mouse_down(&at(1, 1), &mut canvas.target());
        tool.mouse_move(&at(5, 1), &mut canvas.target());
        assert!(canvas.current().is_blank());
    }

    #[test]
    fn test_idle_move_updates_pointer_overlay() {
        let mut canvas = Canvas::new(8, 8);
        let mut tool = started_line(8);
        tool.mouse_move(&at(2, 2), &mut canvas.target());
        tool.mouse_move(&at(4, 4), &mut canvas.target());
        assert_eq!(canvas.pointer.pixel_at(2, 2), Some(Rgba::TRANSPARENT));
        assert_eq!(canvas.pointer.pixel_at(4, 4), Some(Rgba::WHITE));
        assert!(canvas.current().is_blank());
    }

    #[test]
    fn test_zero_size_surface_fails() {
        let mut tool = LineTool::new(INK, Rgba::WHITE);
        let err = tool.start(Size::new(0, 4)).unwrap_err();
        assert!(matches!(err, EditorError::SurfaceAllocation { width: 0, height: 4 }));
    }
}
