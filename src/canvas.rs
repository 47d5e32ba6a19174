use image::{Rgba, RgbaImage};

use crate::error::{EditorError, EditorResult};

/// A single cell colour, straight (non-premultiplied) RGBA.
pub type Color = Rgba<u8>;

/// Fill colour for freshly created canvases.
pub const BACKGROUND: Color = Rgba([255, 255, 255, 255]);

// ============================================================================
// PIXEL BUFFER – the authoritative W×H grid
// ============================================================================

/// Row-major RGBA pixel grid backed by an `RgbaImage`.
///
/// Every coordinate in `[0, width) × [0, height)` always holds a colour and
/// both edges are at least 1. `Clone` is a deep copy of the pixel data.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelBuffer {
    pixels: RgbaImage,
}

impl PixelBuffer {
    /// Create a buffer filled with [`BACKGROUND`].
    pub fn new(width: u32, height: u32) -> EditorResult<Self> {
        Self::new_filled(width, height, BACKGROUND)
    }

    pub fn new_filled(width: u32, height: u32, color: Color) -> EditorResult<Self> {
        if width == 0 || height == 0 {
            return Err(EditorError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }
        Ok(Self {
            pixels: RgbaImage::from_pixel(width, height, color),
        })
    }

    /// Adopt already-decoded pixel data.  Empty images are rejected.
    pub fn from_rgba_image(pixels: RgbaImage) -> EditorResult<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(EditorError::InvalidDimensions {
                width: pixels.width() as i64,
                height: pixels.height() as i64,
            });
        }
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    /// Colour at `(x, y)`, or `None` outside the grid.
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.width() && y < self.height() {
            Some(*self.pixels.get_pixel(x, y))
        } else {
            None
        }
    }

    /// Write one cell.  Returns `false` (and writes nothing) when out of bounds.
    pub fn set(&mut self, x: u32, y: u32, color: Color) -> bool {
        if x < self.width() && y < self.height() {
            self.pixels.put_pixel(x, y, color);
            true
        } else {
            false
        }
    }

    /// Fill the `w × h` rectangle whose top-left is `(x0, y0)`, clipped to the
    /// grid.  Returns how many cells were written.
    pub fn fill_rect(&mut self, x0: i64, y0: i64, w: u32, h: u32, color: Color) -> usize {
        let min_x = x0.max(0);
        let min_y = y0.max(0);
        let max_x = (x0 + w as i64).min(self.width() as i64);
        let max_y = (y0 + h as i64).min(self.height() as i64);

        let mut written = 0;
        for y in min_y..max_y {
            for x in min_x..max_x {
                self.pixels.put_pixel(x as u32, y as u32, color);
                written += 1;
            }
        }
        written
    }

    /// Swap in another buffer wholesale (dimensions and contents).
    pub fn replace_with(&mut self, other: PixelBuffer) {
        self.pixels = other.pixels;
    }

    pub fn as_rgba_image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        self.pixels.clone()
    }

    /// Bytes held by the pixel data.
    pub fn memory_size(&self) -> usize {
        self.pixels.as_raw().len()
    }
}

/// Check user-requested canvas dimensions.  Both edges must lie in
/// `1..=max_edge`.
pub fn validate_dimensions(width: i64, height: i64, max_edge: u32) -> EditorResult<(u32, u32)> {
    let max = max_edge as i64;
    if width <= 0 || height <= 0 || width > max || height > max {
        return Err(EditorError::InvalidDimensions { width, height });
    }
    Ok((width as u32, height as u32))
}

/// Parse canvas size text such as `"32x32"` or `"64 × 48"`.
///
/// Range checks are left to [`validate_dimensions`]; this only rejects text
/// that is not two integers around an `x`.
pub fn parse_dimensions(input: &str) -> EditorResult<(i64, i64)> {
    let invalid = || EditorError::InvalidDimensionsInput(input.to_string());
    let normalized = input.trim().replace(['X', '×'], "x");
    let (w, h) = normalized.split_once('x').ok_or_else(invalid)?;
    let width = w.trim().parse::<i64>().map_err(|_| invalid())?;
    let height = h.trim().parse::<i64>().map_err(|_| invalid())?;
    Ok((width, height))
}

// ============================================================================
// VIEWPORT – screen ↔ pixel coordinate transform
// ============================================================================

/// The on-screen region the composite is centred in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Top-left of a `composite_w × composite_h` surface centred in the
    /// viewport.  Negative when the composite is larger than the viewport.
    pub fn offset(&self, composite_w: u32, composite_h: u32) -> (i64, i64) {
        (
            (self.width as i64 - composite_w as i64) / 2,
            (self.height as i64 - composite_h as i64) / 2,
        )
    }

    /// Map a viewport-space point to a buffer cell.
    ///
    /// Returns `None` when the point falls outside the `buffer_w × buffer_h`
    /// grid as displayed at `zoom`.
    pub fn screen_to_canvas(
        &self,
        px: i32,
        py: i32,
        zoom: u32,
        buffer_w: u32,
        buffer_h: u32,
    ) -> Option<(u32, u32)> {
        if zoom == 0 {
            return None;
        }
        let z = zoom as i64;
        let (ox, oy) = self.offset(buffer_w * zoom, buffer_h * zoom);
        let ix = (px as i64 - ox).div_euclid(z);
        let iy = (py as i64 - oy).div_euclid(z);

        if ix >= 0 && iy >= 0 && ix < buffer_w as i64 && iy < buffer_h as i64 {
            Some((ix as u32, iy as u32))
        } else {
            None
        }
    }
}
