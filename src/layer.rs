use std::fmt;
use log::debug;
use serde::{Deserialize, Serialize};
use crate::pixel_buffer::{BufferId, PixelBuffer};

/// A unique identifier for a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u64);

impl LayerId {
    /// Gets the underlying value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered history of committed buffers plus their cached merge.
///
/// Committed buffers are painted oldest first, so later commits cover earlier
/// ones. `merged_buffer` is rebuilt eagerly on every structural change and is
/// never observable in a stale state.
#[derive(Debug)]
pub struct Layer {
    id: LayerId,
    name: String,
    hidden: bool,
    committed_buffers: Vec<PixelBuffer>,
    merged_buffer: PixelBuffer,
}

impl Layer {
    /// Creates an empty layer named `"Layer {id}"`. `merged_buffer` must be blank.
    pub fn new(id: LayerId, merged_buffer: PixelBuffer) -> Self {
        Self {
            id,
            name: format!("Layer {}", id),
            hidden: false,
            committed_buffers: Vec::new(),
            merged_buffer,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Committed buffers in paint order. Read-only: history is immutable.
    pub fn committed_buffers(&self) -> &[PixelBuffer] {
        &self.committed_buffers
    }

    pub fn committed_buffer(&self, id: BufferId) -> Option<&PixelBuffer> {
        self.committed_buffers.iter().find(|b| b.id() == id)
    }

    pub fn merged_buffer(&self) -> &PixelBuffer {
        &self.merged_buffer
    }

    /// Commits `buffer` on top of the history and remerges.
    ///
    /// # Panics
    /// If `buffer` is not the size of this layer.
    pub fn push_buffer(&mut self, buffer: PixelBuffer) {
        assert!(
            buffer.same_size(&self.merged_buffer),
            "cannot commit {}x{} buffer {} into {}x{} layer {}",
            buffer.width(),
            buffer.height(),
            buffer.id(),
            self.merged_buffer.width(),
            self.merged_buffer.height(),
            self.id
        );
        debug!("Layer {}: committed buffer {}", self.id, buffer.id());
        self.committed_buffers.push(buffer);
        self.merge_buffers();
    }

    /// Shows or hides one committed buffer. Returns false if no such buffer exists.
    pub fn set_pixel_data_visibility(&mut self, buffer_id: BufferId, visible: bool) -> bool {
        let Some(buffer) = self.committed_buffers.iter_mut().find(|b| b.id() == buffer_id) else {
            return false;
        };
        buffer.set_visible(visible);
        self.merge_buffers();
        true
    }

    /// Removes a committed buffer by id and returns it.
    pub fn delete_pixel_data(&mut self, buffer_id: BufferId) -> Option<PixelBuffer> {
        let index = self.committed_buffers.iter().position(|b| b.id() == buffer_id)?;
        let removed = self.committed_buffers.remove(index);
        self.merge_buffers();
        Some(removed)
    }

    fn merge_buffers(&mut self) {
        self.merged_buffer.clear();
        for buffer in self.committed_buffers.iter().filter(|b| b.is_visible()) {
            self.merged_buffer.merge_with(buffer);
        }
    }
}
