//! The editor's single owner of every raster.
//!
//! `EditorState` holds the layers, the in-progress edit buffer, the pointer
//! overlay, the checkerboard background and the top-level merged raster, and
//! runs one pointer event at a time through the active tool:
//!
//! ```text
//! pointer event ─► tool mutates current/pointer buffer
//!               ─► tool reports a dirty region
//!               ─► compositor recomputes and redraws that region
//! pointer up    ─► current buffer pushed into the current layer
//!               ─► layer remerges ─► merged_committed_buffer rebuilt
//!               ─► full redraw
//! ```
//!
//! The edit buffer exists only while a gesture is in progress: it is created
//! on pointer-down (or by [`start_buffer`](EditorState::start_buffer)) and is
//! gone after pointer-up, committed or not.

use egui::Pos2;
use log::{debug, info};
use crate::compositor::{CompositeSources, CompositingEngine, DisplaySurface};
use crate::config::{EditorConfig, Size};
use crate::error::{EditorError, EditorResult};
use crate::id_generator::IdAllocator;
use crate::input::{GridMapping, GridPos, InputEvent, PointerEvent};
use crate::layer::{Layer, LayerId};
use crate::pixel_buffer::{BufferId, BufferTag, PixelBuffer};
use crate::region::{CellRect, Region};
use crate::tools::{Tool, ToolKind, ToolTarget, ToolType};

fn blank(ids: &mut IdAllocator, size: Size, tag: BufferTag) -> PixelBuffer {
    PixelBuffer::new(ids.next_buffer_id(), size.width, size.height, tag)
}

#[derive(Debug)]
pub struct EditorState {
    config: EditorConfig,
    ids: IdAllocator,
    /// Screen position of the display surface's top-left corner
    surface_origin: Pos2,
    layers: Vec<Layer>,
    current_layer: Option<LayerId>,
    current_tool: ToolType,
    current_buffer: Option<PixelBuffer>,
    pointer_buffer: PixelBuffer,
    transparent_layer_buffer: PixelBuffer,
    preview_buffer: PixelBuffer,
    merged_committed_buffer: PixelBuffer,
    compositor: CompositingEngine,
}

impl EditorState {
    /// Creates an editor with one empty, selected layer and the pencil active.
    pub fn new(config: EditorConfig) -> EditorResult<Self> {
        config.validate()?;
        let size = config.size;
        let mut ids = IdAllocator::new();

        let mut transparent_layer_buffer = blank(&mut ids, size, BufferTag::Transparent);
        transparent_layer_buffer.fill_checkerboard(config.checker.cell, config.checker.light, config.checker.dark);
        let pointer_buffer = blank(&mut ids, size, BufferTag::Pointer);
        let preview_buffer = blank(&mut ids, size, BufferTag::Preview);
        let merged_committed_buffer = blank(&mut ids, size, BufferTag::Merged);
        let compositor = CompositingEngine::new(blank(&mut ids, size, BufferTag::Composite));

        let mut current_tool = ToolType::new(ToolKind::Pencil, &config);
        current_tool.start(size)?;

        let mut state = Self {
            config,
            ids,
            surface_origin: Pos2::ZERO,
            layers: Vec::new(),
            current_layer: None,
            current_tool,
            current_buffer: None,
            pointer_buffer,
            transparent_layer_buffer,
            preview_buffer,
            merged_committed_buffer,
            compositor,
        };
        state.add_layer();
        info!("Editor created: {}x{} @ {}px", size.width, size.height, state.config.pixel_size);
        Ok(state)
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn size(&self) -> Size {
        self.config.size
    }

    pub fn pixel_size(&self) -> u32 {
        self.config.pixel_size
    }

    /// Changes the zoom factor. The host must redraw the full surface afterwards.
    pub fn set_pixel_size(&mut self, pixel_size: u32) -> EditorResult<()> {
        if pixel_size == 0 {
            return Err(EditorError::InvalidPixelSize(pixel_size));
        }
        self.config.pixel_size = pixel_size;
        Ok(())
    }

    pub fn surface_origin(&self) -> Pos2 {
        self.surface_origin
    }

    pub fn set_surface_origin(&mut self, origin: Pos2) {
        self.surface_origin = origin;
    }

    pub fn grid_mapping(&self) -> GridMapping {
        GridMapping::new(self.surface_origin, self.config.pixel_size)
    }

    pub fn grid_pos(&self, event: &PointerEvent) -> GridPos {
        self.grid_mapping().to_grid(event.position)
    }

    // --- layers ---

    /// Layers bottom to top.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    fn layer_mut(&mut self, id: LayerId) -> EditorResult<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|l| l.id() == id)
            .ok_or(EditorError::UnknownLayer(id))
    }

    pub fn current_layer_id(&self) -> Option<LayerId> {
        self.current_layer
    }

    pub fn current_layer(&self) -> Option<&Layer> {
        self.current_layer.and_then(|id| self.layer(id))
    }

    pub fn select_layer(&mut self, id: LayerId) -> EditorResult<()> {
        if self.layer(id).is_none() {
            return Err(EditorError::UnknownLayer(id));
        }
        self.current_layer = Some(id);
        Ok(())
    }

    /// Appends an empty layer on top. It becomes current only if no layer was.
    pub fn add_layer(&mut self) -> LayerId {
        let id = self.ids.next_layer_id();
        let merged = blank(&mut self.ids, self.config.size, BufferTag::LayerMerged);
        self.layers.push(Layer::new(id, merged));
        if self.current_layer.is_none() {
            self.current_layer = Some(id);
        }
        self.merge_buffers();
        info!("Added layer {}", id);
        id
    }

    /// Removes a layer. If it was current, the topmost remaining layer becomes current.
    pub fn remove_layer(&mut self, id: LayerId) -> EditorResult<Layer> {
        let index = self
            .layers
            .iter()
            .position(|l| l.id() == id)
            .ok_or(EditorError::UnknownLayer(id))?;
        let removed = self.layers.remove(index);
        if self.current_layer == Some(id) {
            self.current_layer = self.layers.last().map(Layer::id);
        }
        self.merge_buffers();
        info!("Removed layer {}", id);
        Ok(removed)
    }

    pub fn set_layer_visibility(&mut self, id: LayerId, visible: bool) -> EditorResult<()> {
        self.layer_mut(id)?.set_hidden(!visible);
        self.merge_buffers();
        debug!("Layer {} visible: {}", id, visible);
        Ok(())
    }

    /// Shows or hides one committed buffer of a layer. Returns false if the
    /// layer has no such buffer.
    pub fn set_committed_buffer_visibility(
        &mut self,
        layer: LayerId,
        buffer: BufferId,
        visible: bool,
    ) -> EditorResult<bool> {
        let found = self.layer_mut(layer)?.set_pixel_data_visibility(buffer, visible);
        if found {
            self.merge_buffers();
        }
        Ok(found)
    }

    pub fn delete_committed_buffer(
        &mut self,
        layer: LayerId,
        buffer: BufferId,
    ) -> EditorResult<Option<PixelBuffer>> {
        let removed = self.layer_mut(layer)?.delete_pixel_data(buffer);
        if removed.is_some() {
            self.merge_buffers();
        }
        Ok(removed)
    }

    // --- tools ---

    pub fn current_tool(&self) -> &ToolType {
        &self.current_tool
    }

    /// Ends the active tool and starts a fresh one of `kind`.
    ///
    /// An uncommitted edit is dropped and the cursor highlight is cleared.
    /// On error the previous tool stays active.
    pub fn set_tool(&mut self, kind: ToolKind) -> EditorResult<()> {
        let mut tool = ToolType::new(kind, &self.config);
        tool.start(self.config.size)?;
        self.current_tool.end();
        self.current_tool = tool;
        self.pointer_buffer.clear();
        self.current_buffer = None;
        info!("Switched tool to {}", kind.label());
        Ok(())
    }

    // --- buffers ---

    /// Allocates a fresh, empty edit buffer, discarding any previous one.
    pub fn start_buffer(&mut self) {
        self.current_buffer = Some(blank(&mut self.ids, self.config.size, BufferTag::Current));
    }

    /// Throws away the in-progress edit and continues the gesture with an empty
    /// buffer. Does nothing when no gesture is in progress.
    pub fn reset_buffer(&mut self) {
        if let Some(buffer) = &self.current_buffer {
            debug!("Discarding edit buffer {}", buffer.id());
            self.start_buffer();
        }
    }

    pub fn current_buffer(&self) -> Option<&PixelBuffer> {
        self.current_buffer.as_ref()
    }

    /// Pushes the edit buffer into the current layer and rebuilds the merged raster.
    ///
    /// The edit buffer is consumed. Returns its id, or `None` when there is no
    /// edit buffer or no current layer (the edit buffer is then kept).
    pub fn commit_buffer(&mut self) -> Option<BufferId> {
        let layer_id = self.current_layer?;
        let index = self.layers.iter().position(|l| l.id() == layer_id)?;
        let buffer = self.current_buffer.take()?;
        let buffer_id = buffer.id();
        self.layers[index].push_buffer(buffer);
        self.merge_buffers();
        info!("Committed buffer {} to layer {}", buffer_id, layer_id);
        Some(buffer_id)
    }

    /// Rebuilds `merged_committed_buffer` from every visible layer, bottom to top.
    pub fn merge_buffers(&mut self) {
        self.merged_committed_buffer.clear();
        for layer in self.layers.iter().filter(|l| !l.is_hidden()) {
            self.merged_committed_buffer.merge_with(layer.merged_buffer());
        }
    }

    pub fn merged_committed_buffer(&self) -> &PixelBuffer {
        &self.merged_committed_buffer
    }

    pub fn pointer_buffer(&self) -> &PixelBuffer {
        &self.pointer_buffer
    }

    pub fn transparent_layer_buffer(&self) -> &PixelBuffer {
        &self.transparent_layer_buffer
    }

    /// 1:1 view of committed art with the live edit on top.
    pub fn preview_buffer(&self) -> &PixelBuffer {
        &self.preview_buffer
    }

    /// The last composed frame.
    pub fn composite(&self) -> &PixelBuffer {
        self.compositor.composite()
    }

    /// Rebuilds `region` of the preview, or all of it.
    pub fn refresh_preview(&mut self, region: Option<Region>) {
        let Size { width, height } = self.config.size;
        let cells = match region {
            Some(region) => match region.clamp_to(width, height) {
                Some(cells) => cells,
                None => return,
            },
            None => CellRect::full(width, height),
        };
        self.preview_buffer.copy_region_from(&self.merged_committed_buffer, cells);
        if let Some(current) = &self.current_buffer {
            self.preview_buffer.merge_region_with(current, cells);
        }
    }

    // --- rendering & events ---

    /// Composes and draws `region`, or the whole canvas when `None`.
    pub fn render(&mut self, surface: &mut dyn DisplaySurface, region: Option<Region>) {
        let sources = CompositeSources {
            background: &self.transparent_layer_buffer,
            committed: &self.merged_committed_buffer,
            current: self.current_buffer.as_ref(),
            pointer: &self.pointer_buffer,
        };
        self.compositor.render(&sources, region, surface, self.config.pixel_size);
        self.refresh_preview(region);
    }

    /// Runs one pointer event to completion, including the redraw.
    ///
    /// Pointer-down starts an edit buffer if none exists. Pointer-up after a
    /// drag commits the edit, drops whatever was not committed and redraws
    /// everything. Returns the region that was redrawn, `None` after a full redraw.
    pub fn handle_input(&mut self, event: &InputEvent, surface: &mut dyn DisplaySurface) -> Option<Region> {
        match event {
            InputEvent::PointerDown(_) => {
                if self.current_buffer.is_none() {
                    self.start_buffer();
                }
                self.dispatch_to_tool(event);
                self.redraw_dirty(surface)
            }
            InputEvent::PointerMove(_) => {
                self.dispatch_to_tool(event);
                self.redraw_dirty(surface)
            }
            InputEvent::PointerUp(_) => {
                let was_dragging = self.current_tool.state().is_dragging();
                self.dispatch_to_tool(event);
                if was_dragging {
                    self.commit_buffer();
                }
                if let Some(buffer) = self.current_buffer.take() {
                    debug!("Dropping uncommitted edit buffer {}", buffer.id());
                }
                self.render(surface, None);
                None
            }
        }
    }

    fn redraw_dirty(&mut self, surface: &mut dyn DisplaySurface) -> Option<Region> {
        let region = self.current_tool.dirty_region()?;
        self.render(surface, Some(region));
        Some(region)
    }

    fn dispatch_to_tool(&mut self, event: &InputEvent) {
        let mut target = ToolTarget {
            mapping: GridMapping::new(self.surface_origin, self.config.pixel_size),
            current: self.current_buffer.as_mut(),
            pointer: &mut self.pointer_buffer,
        };
        match event {
            InputEvent::PointerDown(e) => self.current_tool.mouse_down(e, &mut target),
            InputEvent::PointerMove(e) => self.current_tool.mouse_move(e, &mut target),
            InputEvent::PointerUp(e) => self.current_tool.mouse_up(e, &mut target),
        }
    }
}
