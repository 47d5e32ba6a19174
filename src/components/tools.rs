use crate::canvas::{Color, PixelBuffer};
use crate::components::colors;

pub const MIN_ZOOM: u32 = 1;
pub const MAX_ZOOM: u32 = 64;

// ============================================================================
// BRUSH
// ============================================================================

/// Inclusive range the brush size is clamped into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BrushRange {
    pub min: u32,
    pub max: u32,
}

impl Default for BrushRange {
    fn default() -> Self {
        Self { min: 1, max: 10 }
    }
}

impl BrushRange {
    /// Build a range, normalising a reversed or zero lower bound.
    pub fn new(min: u32, max: u32) -> Self {
        let min = min.max(1);
        Self {
            min,
            max: max.max(min),
        }
    }

    pub fn clamp(&self, size: u32) -> u32 {
        size.clamp(self.min, self.max)
    }

    pub fn sizes(self) -> impl Iterator<Item = u32> {
        self.min..=self.max
    }
}

/// Stamp a square brush of side `size` centred on `(x, y)`.
///
/// The square's top-left is `(x − ⌊size/2⌋, y − ⌊size/2⌋)`, so odd sizes are
/// exactly centred and even sizes lean toward the bottom-right.  Cells off
/// the grid are skipped.  Returns how many cells were written.
pub fn stamp(buffer: &mut PixelBuffer, x: u32, y: u32, size: u32, color: Color) -> usize {
    if size <= 1 {
        return usize::from(buffer.set(x, y, color));
    }
    let half = (size / 2) as i64;
    buffer.fill_rect(x as i64 - half, y as i64 - half, size, size, color)
}

// ============================================================================
// TOOL STATE
// ============================================================================

/// Everything the UI controls that affects drawing or rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolState {
    pub color: Color,
    brush_size: u32,
    brush_range: BrushRange,
    zoom: u32,
    pub show_grid: bool,
    grid_cell_size: u32,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            color: colors::BLACK,
            brush_size: 1,
            brush_range: BrushRange::default(),
            zoom: 10,
            show_grid: true,
            grid_cell_size: 1,
        }
    }
}

impl ToolState {
    pub fn brush_size(&self) -> u32 {
        self.brush_size
    }

    pub fn brush_range(&self) -> BrushRange {
        self.brush_range
    }

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    pub fn grid_cell_size(&self) -> u32 {
        self.grid_cell_size
    }

    /// Clamp into the brush range; returns the size actually applied.
    pub fn set_brush_size(&mut self, size: u32) -> u32 {
        self.brush_size = self.brush_range.clamp(size);
        self.brush_size
    }

    pub fn set_brush_range(&mut self, range: BrushRange) {
        self.brush_range = range;
        self.brush_size = range.clamp(self.brush_size);
    }

    /// Clamp into `[MIN_ZOOM, MAX_ZOOM]`; returns the zoom actually applied.
    pub fn set_zoom(&mut self, zoom: u32) -> u32 {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom
    }

    /// Cells between grid lines, at least 1.
    pub fn set_grid_cell_size(&mut self, cells: u32) -> u32 {
        self.grid_cell_size = cells.max(1);
        self.grid_cell_size
    }
}
