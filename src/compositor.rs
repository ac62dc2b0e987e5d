//! Folds the editor's rasters into the image shown on screen.
//!
//! Paint order is fixed: background, committed layers, the in-progress edit,
//! then the pointer overlay. Every step uses the same alpha test as
//! [`PixelBuffer::merge_with`], so there is no blending anywhere.

use egui::{Color32, ColorImage};
use crate::pixel_buffer::{PixelBuffer, Rgba};
use crate::region::{CellRect, Region};

/// A 2D raster surface the editor draws through. Coordinates are screen pixels.
pub trait DisplaySurface {
    /// Makes the rectangle fully transparent.
    fn clear_region(&mut self, x: u32, y: u32, width: u32, height: u32);

    /// Replaces the whole surface with `buffer`, each pixel scaled up to a
    /// `pixel_scale` square.
    fn put_full_raster(&mut self, buffer: &PixelBuffer, pixel_scale: u32);

    /// Fills the rectangle with one color.
    fn fill_rect(&mut self, color: Rgba, x: u32, y: u32, width: u32, height: u32);
}

/// An in-memory display surface backed by an [`egui::ColorImage`].
///
/// The host uploads [`image`](Self::image) as a texture whenever
/// [`take_changed`](Self::take_changed) reports a modification.
pub struct ScreenRaster {
    image: ColorImage,
    changed: bool,
}

impl std::fmt::Debug for ScreenRaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenRaster")
            .field("size", &self.image.size)
            .field("changed", &self.changed)
            .finish_non_exhaustive()
    }
}

impl ScreenRaster {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: ColorImage::new([width as usize, height as usize], Color32::TRANSPARENT),
            changed: true,
        }
    }

    pub fn image(&self) -> &ColorImage {
        &self.image
    }

    pub fn size(&self) -> [usize; 2] {
        self.image.size
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color32> {
        let [w, h] = self.image.size;
        let (x, y) = (x as usize, y as usize);
        (x < w && y < h).then(|| self.image.pixels[y * w + x])
    }

    /// Returns whether the surface changed since the last call, and resets the flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    fn resize(&mut self, width: u32, height: u32) {
        let size = [width as usize, height as usize];
        if self.image.size != size {
            self.image = ColorImage::new(size, Color32::TRANSPARENT);
        }
    }

    fn fill(&mut self, color: Color32, x: u32, y: u32, width: u32, height: u32) {
        let [w, h] = self.image.size;
        let x0 = (x as usize).min(w);
        let y0 = (y as usize).min(h);
        let x1 = (x as usize + width as usize).min(w);
        let y1 = (y as usize + height as usize).min(h);
        for row in y0..y1 {
            self.image.pixels[row * w + x0..row * w + x1].fill(color);
        }
        self.changed = true;
    }
}

impl DisplaySurface for ScreenRaster {
    fn clear_region(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.fill(Color32::TRANSPARENT, x, y, width, height);
    }

    fn put_full_raster(&mut self, buffer: &PixelBuffer, pixel_scale: u32) {
        self.resize(buffer.width() * pixel_scale, buffer.height() * pixel_scale);
        self.clear_region(0, 0, buffer.width() * pixel_scale, buffer.height() * pixel_scale);
        for y in 0..buffer.height() {
            for x in 0..buffer.width() {
                // (x, y) is in bounds by construction
                let Some(color) = buffer.pixel_at(x as i32, y as i32) else { continue };
                if color.is_transparent() {
                    continue;
                }
                self.fill(color.to_color32(), x * pixel_scale, y * pixel_scale, pixel_scale, pixel_scale);
            }
        }
    }

    fn fill_rect(&mut self, color: Rgba, x: u32, y: u32, width: u32, height: u32) {
        self.fill(color.to_color32(), x, y, width, height);
    }
}

/// The rasters one frame is composed from, borrowed from the editor.
#[derive(Debug, Clone, Copy)]
pub struct CompositeSources<'a> {
    pub background: &'a PixelBuffer,
    pub committed: &'a PixelBuffer,
    pub current: Option<&'a PixelBuffer>,
    pub pointer: &'a PixelBuffer,
}

impl<'a> CompositeSources<'a> {
    /// Bottom to top.
    fn in_paint_order(&self) -> [Option<&'a PixelBuffer>; 4] {
        [Some(self.background), Some(self.committed), self.current, Some(self.pointer)]
    }
}

/// Composes [`CompositeSources`] into a cached raster and draws it.
#[derive(Debug)]
pub struct CompositingEngine {
    composite: PixelBuffer,
}

impl CompositingEngine {
    pub fn new(composite: PixelBuffer) -> Self {
        Self { composite }
    }

    /// The last composed image. Cells outside the last region keep earlier results.
    pub fn composite(&self) -> &PixelBuffer {
        &self.composite
    }

    /// Recomputes `region` of the composite, or all of it when `region` is `None`.
    /// Returns the cells touched, `None` if the region misses the canvas.
    ///
    /// # Panics
    /// If any source differs in size from the composite.
    pub fn compose(&mut self, sources: &CompositeSources<'_>, region: Option<Region>) -> Option<CellRect> {
        let (width, height) = (self.composite.width(), self.composite.height());
        let cells = match region {
            Some(region) => region.clamp_to(width, height)?,
            None => CellRect::full(width, height),
        };
        self.composite.clear_region(cells);
        for source in sources.in_paint_order().into_iter().flatten() {
            self.composite.merge_region_with(source, cells);
        }
        Some(cells)
    }

    /// Composes and then draws the same region onto `surface`.
    pub fn render(
        &mut self,
        sources: &CompositeSources<'_>,
        region: Option<Region>,
        surface: &mut dyn DisplaySurface,
        pixel_scale: u32,
    ) {
        if self.compose(sources, region).is_some() {
            self.composite.draw_on_canvas(surface, pixel_scale, region);
        }
    }
}
