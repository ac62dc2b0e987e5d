//! Fixed-size RGBA8 rasters and the alpha-test merge every compositing step uses.

use std::fmt;

use egui::Color32;
use serde::{Deserialize, Serialize};

use crate::compositor::DisplaySurface;
use crate::region::{CellRect, Region};

/// Bytes per pixel: R, G, B, A.
pub const CHANNELS: usize = 4;

/// A straight (non-premultiplied) 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);
    pub const GREEN: Rgba = Rgba::new(0, 255, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Builds a color from wide channel values, saturating each into 0..=255.
    pub fn clamped(r: i64, g: i64, b: i64, a: i64) -> Self {
        let c = |v: i64| v.clamp(0, 255) as u8;
        Self::new(c(r), c(g), c(b), c(a))
    }

    pub fn from_slice(px: &[u8]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// CSS form, e.g. `rgba(0, 255, 0, 1)`.
    pub fn css(self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, f64::from(self.a) / 255.0)
    }

    /// Conversion for display through egui, which premultiplies internally.
    pub fn to_color32(self) -> Color32 {
        Color32::from_rgba_unmultiplied(self.r, self.g, self.b, self.a)
    }
}

/// Identifier of a pixel buffer, unique within one editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BufferId(pub u64);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a buffer is used for. Diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTag {
    Current,
    Merged,
    LayerMerged,
    Pointer,
    Transparent,
    Preview,
    Composite,
}

impl fmt::Display for BufferTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Current => "current",
            Self::Merged => "merged",
            Self::LayerMerged => "merged-layer-buffer",
            Self::Pointer => "pointer",
            Self::Transparent => "transparent",
            Self::Preview => "preview",
            Self::Composite => "composite",
        };
        f.write_str(name)
    }
}

/// Fixed-size RGBA8 raster.
///
/// `data` always holds `width * height * 4` bytes; pixel `(x, y)` starts at
/// `(y * width + x) * 4`. Writes outside the raster are ignored. Operations
/// pairing two buffers panic if their dimensions differ.
pub struct PixelBuffer {
    id: BufferId,
    width: u32,
    height: u32,
    data: Vec<u8>,
    visible: bool,
    tag: BufferTag,
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("visible", &self.visible)
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

impl PixelBuffer {
    /// Creates a fully transparent buffer.
    pub fn new(id: BufferId, width: u32, height: u32, tag: BufferTag) -> Self {
        Self {
            id,
            width,
            height,
            data: vec![0; width as usize * height as usize * CHANNELS],
            visible: true,
            tag,
        }
    }

    pub fn id(&self) -> BufferId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn tag(&self) -> BufferTag {
        self.tag
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn same_size(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        self.contains(x, y).then(|| self.offset(x as u32, y as u32))
    }

    pub fn pixel_at(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index_of(x, y)
            .map(|i| Rgba::from_slice(&self.data[i..i + CHANNELS]))
    }

    /// Writes one pixel. Out-of-bounds coordinates are a no-op.
    pub fn set_pixel_at(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(i) = self.index_of(x, y) {
            self.data[i..i + CHANNELS].copy_from_slice(&color.to_array());
        }
    }

    pub fn clear_pixel_at(&mut self, x: i32, y: i32) {
        self.set_pixel_at(x, y, Rgba::TRANSPARENT);
    }

    /// CSS color string of pixel `(x, y)`, or `None` outside the raster.
    pub fn rgba_str_at(&self, x: i32, y: i32) -> Option<String> {
        self.pixel_at(x, y).map(Rgba::css)
    }

    /// Alpha test: every pixel of `other` with nonzero alpha replaces ours as-is.
    pub fn merge_with(&mut self, other: &PixelBuffer) {
        self.assert_same_size(other, "merge");
        for (dst, src) in self
            .data
            .chunks_exact_mut(CHANNELS)
            .zip(other.data.chunks_exact(CHANNELS))
        {
            if src[3] > 0 {
                dst.copy_from_slice(src);
            }
        }
    }

    /// [`merge_with`](Self::merge_with) restricted to `cells`.
    pub fn merge_region_with(&mut self, other: &PixelBuffer, cells: CellRect) {
        self.assert_same_size(other, "merge");
        for y in cells.y0..cells.y1.min(self.height) {
            let start = self.offset(cells.x0, y);
            let end = self.offset(cells.x1.min(self.width), y);
            for (dst, src) in self.data[start..end]
                .chunks_exact_mut(CHANNELS)
                .zip(other.data[start..end].chunks_exact(CHANNELS))
            {
                if src[3] > 0 {
                    dst.copy_from_slice(src);
                }
            }
        }
    }

    /// Unconditional byte copy.
    pub fn copy_from(&mut self, other: &PixelBuffer) {
        self.assert_same_size(other, "copy");
        self.data.copy_from_slice(&other.data);
    }

    pub fn copy_region_from(&mut self, other: &PixelBuffer, cells: CellRect) {
        self.assert_same_size(other, "copy");
        for y in cells.y0..cells.y1.min(self.height) {
            let start = self.offset(cells.x0, y);
            let end = self.offset(cells.x1.min(self.width), y);
            self.data[start..end].copy_from_slice(&other.data[start..end]);
        }
    }

    /// Zeroes every channel.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    pub fn clear_region(&mut self, cells: CellRect) {
        for y in cells.y0..cells.y1.min(self.height) {
            let start = self.offset(cells.x0, y);
            let end = self.offset(cells.x1.min(self.width), y);
            self.data[start..end].fill(0);
        }
    }

    /// Paints a checkerboard of `cell`-sized squares, starting with `light` at the origin.
    pub fn fill_checkerboard(&mut self, cell: u32, light: Rgba, dark: Rgba) {
        let cell = cell.max(1);
        for y in 0..self.height {
            for x in 0..self.width {
                let color = if (x / cell + y / cell) % 2 == 0 { light } else { dark };
                let i = self.offset(x, y);
                self.data[i..i + CHANNELS].copy_from_slice(&color.to_array());
            }
        }
    }

    /// True when no pixel has a nonzero alpha.
    pub fn is_blank(&self) -> bool {
        self.data.chunks_exact(CHANNELS).all(|px| px[3] == 0)
    }

    /// Renders onto `target`, each pixel expanded into a `pixel_scale` square.
    ///
    /// With no region the whole raster is put at once; with a region only the
    /// cells it covers are cleared and refilled. Fully transparent cells are
    /// left cleared.
    pub fn draw_on_canvas(
        &self,
        target: &mut dyn DisplaySurface,
        pixel_scale: u32,
        region: Option<Region>,
    ) {
        let Some(region) = region else {
            target.put_full_raster(self, pixel_scale);
            return;
        };
        let Some(cells) = region.clamp_to(self.width, self.height) else {
            return;
        };

        target.clear_region(
            cells.x0 * pixel_scale,
            cells.y0 * pixel_scale,
            cells.width() * pixel_scale,
            cells.height() * pixel_scale,
        );
        for y in cells.y0..cells.y1 {
            for x in cells.x0..cells.x1 {
                let i = self.offset(x, y);
                let color = Rgba::from_slice(&self.data[i..i + CHANNELS]);
                if color.is_transparent() {
                    continue;
                }
                target.fill_rect(color, x * pixel_scale, y * pixel_scale, pixel_scale, pixel_scale);
            }
        }
    }

    fn assert_same_size(&self, other: &PixelBuffer, op: &str) {
        assert!(
            self.same_size(other),
            "cannot {} {}x{} {} buffer {} with {}x{} {} buffer {}",
            op,
            other.width,
            other.height,
            other.tag,
            other.id,
            self.width,
            self.height,
            self.tag,
            self.id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::tests::{RecordingSurface, SurfaceCall};

    fn buffer(id: u64, width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::new(BufferId(id), width, height, BufferTag::Current)
    }

    #[test]
    fn test_new_buffer_is_transparent() {
        let buf = buffer(1, 3, 2);
        assert_eq!(buf.data().len(), 3 * 2 * 4);
        assert!(buf.is_blank());
        assert!(buf.is_visible());
    }

    #[test]
    fn test_set_pixel_layout() {
        let mut buf = buffer(1, 4, 3);
        buf.set_pixel_at(1, 2, Rgba::new(10, 20, 30, 40));
        let i = (2 * 4 + 1) * 4;
        assert_eq!(&buf.data()[i..i + 4], &[10, 20, 30, 40]);
        assert_eq!(buf.pixel_at(1, 2), Some(Rgba::new(10, 20, 30, 40)));
    }

    #[test]
    fn test_out_of_bounds_write_is_noop() {
        let mut buf = buffer(1, 4, 4);
        buf.set_pixel_at(-1, 0, Rgba::GREEN);
        buf.set_pixel_at(0, -1, Rgba::GREEN);
        buf.set_pixel_at(4, 0, Rgba::GREEN);
        buf.set_pixel_at(0, 4, Rgba::GREEN);
        assert!(buf.is_blank());
        assert_eq!(buf.pixel_at(4, 0), None);
    }

    #[test]
    fn test_clamped_channels() {
        assert_eq!(Rgba::clamped(300, -5, 128, 255), Rgba::new(255, 0, 128, 255));
    }

    #[test]
    fn test_merge_is_alpha_test_not_blend() {
        let mut a = buffer(1, 2, 1);
        let mut b = buffer(2, 2, 1);
        a.set_pixel_at(0, 0, Rgba::new(200, 200, 200, 255));
        a.set_pixel_at(1, 0, Rgba::new(50, 60, 70, 255));
        b.set_pixel_at(0, 0, Rgba::new(1, 2, 3, 1));
        b.set_pixel_at(1, 0, Rgba::new(9, 9, 9, 0));

        a.merge_with(&b);
        // translucent source copied as-is
        assert_eq!(a.pixel_at(0, 0), Some(Rgba::new(1, 2, 3, 1)));
        // zero alpha source leaves destination alone
        assert_eq!(a.pixel_at(1, 0), Some(Rgba::new(50, 60, 70, 255)));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut once = buffer(1, 3, 3);
        let mut twice = buffer(2, 3, 3);
        let mut src = buffer(3, 3, 3);
        once.set_pixel_at(0, 0, Rgba::WHITE);
        twice.set_pixel_at(0, 0, Rgba::WHITE);
        src.set_pixel_at(0, 0, Rgba::new(1, 1, 1, 128));
        src.set_pixel_at(2, 2, Rgba::GREEN);

        once.merge_with(&src);
        twice.merge_with(&src);
        twice.merge_with(&src);
        assert_eq!(once.data(), twice.data());
    }

    #[test]
    fn test_copy_from_round_trip() {
        let mut a = buffer(1, 3, 3);
        let mut b = buffer(2, 3, 3);
        a.set_pixel_at(1, 1, Rgba::WHITE);
        b.set_pixel_at(2, 0, Rgba::new(7, 8, 9, 0));
        a.copy_from(&b);
        assert_eq!(a.data(), b.data());
    }

    #[test]
    #[should_panic(expected = "cannot merge")]
    fn test_merge_size_mismatch_panics() {
        let mut a = buffer(1, 3, 3);
        let b = buffer(2, 3, 4);
        a.merge_with(&b);
    }

    #[test]
    #[should_panic(expected = "cannot copy")]
    fn test_copy_size_mismatch_panics() {
        let mut a = buffer(1, 3, 3);
        let b = buffer(2, 4, 3);
        a.copy_from(&b);
    }

    #[test]
    fn test_region_ops_stay_inside_cells() {
        let mut a = buffer(1, 4, 4);
        let mut b = buffer(2, 4, 4);
        b.fill_checkerboard(1, Rgba::WHITE, Rgba::GREEN);
        let cells = CellRect { x0: 1, y0: 1, x1: 3, y1: 2 };
        a.merge_region_with(&b, cells);
        assert_eq!(a.pixel_at(1, 1), b.pixel_at(1, 1));
        assert_eq!(a.pixel_at(2, 1), b.pixel_at(2, 1));
        assert_eq!(a.pixel_at(3, 1), Some(Rgba::TRANSPARENT));
        assert_eq!(a.pixel_at(1, 2), Some(Rgba::TRANSPARENT));

        a.clear_region(CellRect { x0: 2, y0: 1, x1: 3, y1: 2 });
        assert_eq!(a.pixel_at(2, 1), Some(Rgba::TRANSPARENT));
        assert_eq!(a.pixel_at(1, 1), b.pixel_at(1, 1));
    }

    #[test]
    fn test_clear() {
        let mut a = buffer(1, 2, 2);
        a.fill_checkerboard(1, Rgba::WHITE, Rgba::GREEN);
        assert!(!a.is_blank());
        a.clear();
        assert!(a.is_blank());
    }

    #[test]
    fn test_rgba_str() {
        let mut a = buffer(1, 2, 2);
        a.set_pixel_at(1, 1, Rgba::GREEN);
        assert_eq!(a.rgba_str_at(1, 1).as_deref(), Some("rgba(0, 255, 0, 1)"));
        assert_eq!(a.rgba_str_at(0, 0).as_deref(), Some("rgba(0, 0, 0, 0)"));
        assert_eq!(a.rgba_str_at(2, 0), None);
    }

    #[test]
    fn test_draw_region_scales_cells() {
        let mut a = buffer(1, 30, 30);
        a.set_pixel_at(2, 3, Rgba::GREEN);
        let mut surface = RecordingSurface::default();
        a.draw_on_canvas(&mut surface, 5, Some(Region::new(-8, -7, 10, 10)));
        assert_eq!(
            surface.calls,
            vec![
                SurfaceCall::Clear { x: 0, y: 0, width: 15, height: 20 },
                SurfaceCall::Fill { color: Rgba::GREEN, x: 10, y: 15, width: 5, height: 5 },
            ]
        );
    }

    #[test]
    fn test_draw_without_region_puts_full_raster() {
        let a = buffer(1, 4, 4);
        let mut surface = RecordingSurface::default();
        a.draw_on_canvas(&mut surface, 3, None);
        assert_eq!(surface.calls, vec![SurfaceCall::PutFull { buffer: BufferId(1), scale: 3 }]);
    }
}
