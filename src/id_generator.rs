use crate::layer::LayerId;
use crate::pixel_buffer::BufferId;

/// Hands out buffer and layer ids for one editor.
///
/// Each editor owns its own allocator so two editors never share a sequence
/// and tests get the same ids on every run.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next_buffer: u64,
    next_layer: u64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next_buffer: 1,
            next_layer: 1,
        }
    }

    pub fn next_buffer_id(&mut self) -> BufferId {
        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;
        id
    }

    pub fn next_layer_id(&mut self) -> LayerId {
        let id = LayerId(self.next_layer);
        self.next_layer += 1;
        id
    }

    /// Restart both sequences at 1.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
