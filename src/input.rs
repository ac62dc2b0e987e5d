use egui::{Context, Pos2, Rect};
use serde::{Deserialize, Serialize};

/// A cell position on the pixel grid. May lie outside the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Maps screen positions onto the pixel grid of a display surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapping {
    /// Screen position of the surface's top-left corner
    pub origin: Pos2,
    /// Screen pixels per raster pixel
    pub pixel_size: u32,
}

impl GridMapping {
    pub fn new(origin: Pos2, pixel_size: u32) -> Self {
        Self { origin, pixel_size }
    }

    /// `floor((pos - origin) / pixel_size)` on both axes.
    pub fn to_grid(&self, pos: Pos2) -> GridPos {
        let size = self.pixel_size.max(1) as f32;
        GridPos {
            x: ((pos.x - self.origin.x) / size).floor() as i32,
            y: ((pos.y - self.origin.y) / size).floor() as i32,
        }
    }
}

/// A pointer sample in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// The position in screen coordinates
    pub position: Pos2,
    /// Whether this position is within the canvas bounds
    pub is_in_canvas: bool,
}

impl PointerEvent {
    pub fn at(position: Pos2) -> Self {
        Self {
            position,
            is_in_canvas: true,
        }
    }
}

/// Pointer input the editor reacts to. Only the primary button drives tools.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
}

impl InputEvent {
    pub fn pointer(&self) -> &PointerEvent {
        match self {
            Self::PointerDown(e) | Self::PointerMove(e) | Self::PointerUp(e) => e,
        }
    }
}

/// Handles converting raw egui input into our domain-specific InputEvents
#[derive(Debug)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Rect,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            last_pointer_pos: None,
            canvas_rect,
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    fn make_event(&self, pos: Pos2) -> PointerEvent {
        PointerEvent {
            position: pos,
            is_in_canvas: self.canvas_rect.contains(pos),
        }
    }

    /// Process raw egui input and generate our InputEvents
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let (hover, pressed, released) = ctx.input(|input| {
            (
                input.pointer.hover_pos(),
                input.pointer.primary_pressed(),
                input.pointer.primary_released(),
            )
        });
        self.translate(hover, pressed, released)
    }

    /// Turns one frame's pointer state into events: the move first, then the
    /// press or release at the resulting position.
    pub fn translate(&mut self, hover: Option<Pos2>, pressed: bool, released: bool) -> Vec<InputEvent> {
        let mut events = Vec::new();

        if let Some(pos) = hover {
            if Some(pos) != self.last_pointer_pos {
                events.push(InputEvent::PointerMove(self.make_event(pos)));
            }
            self.last_pointer_pos = Some(pos);
        }

        // A release can arrive after the pointer left the window; end the
        // gesture where it was last seen.
        let at = hover.or(self.last_pointer_pos);
        if let Some(pos) = at {
            if pressed {
                events.push(InputEvent::PointerDown(self.make_event(pos)));
            }
            if released {
                events.push(InputEvent::PointerUp(self.make_event(pos)));
            }
        }

        if hover.is_none() && !released {
            self.last_pointer_pos = None;
        }

        events
    }
}
