//! CPU compositor: turns the pixel buffer into the zoomed, optionally gridded
//! surface the display shows.
//!
//! Each buffer cell becomes a solid `zoom × zoom` block (nearest neighbour,
//! no filtering).  Cells are alpha-blended over an opaque white backdrop so
//! the composite itself is always opaque.  Grid lines are one composite pixel
//! wide and drawn in a translucent grey so the cell colours stay visible.
//!
//! Rows are produced in parallel with rayon; the result depends only on the
//! buffer and the tool state, never on previous composites.

use image::{Rgba, RgbaImage};
use rayon::prelude::*;

use crate::canvas::{Color, PixelBuffer};
use crate::components::tools::ToolState;

/// Overlay colour for grid lines.
pub const GRID_LINE: Color = Rgba([200, 200, 200, 100]);

/// Backdrop under translucent cells.
pub const BACKDROP: Color = Rgba([255, 255, 255, 255]);

/// Render the full composite: `(width·zoom) × (height·zoom)`.
pub fn render(buffer: &PixelBuffer, tools: &ToolState) -> RgbaImage {
    let zoom = tools.zoom().max(1);
    let (bw, bh) = buffer.dimensions();
    let out_w = bw * zoom;
    let out_h = bh * zoom;
    let grid_step = tools.show_grid.then(|| zoom * tools.grid_cell_size().max(1));

    // Pre-blend each cell once; rows below only copy.
    let src = buffer.as_rgba_image();
    let cells: Vec<Color> = src.pixels().map(|p| blend_over(*p, BACKDROP)).collect();

    let mut out = RgbaImage::new(out_w, out_h);
    let stride = out_w as usize * 4;

    out.par_chunks_mut(stride)
        .enumerate()
        .for_each(|(oy, line)| {
            let oy = oy as u32;
            let cell_row = (oy / zoom) as usize * bw as usize;
            let on_row_line = grid_step.is_some_and(|step| oy % step == 0);

            for ox in 0..out_w {
                let mut color = cells[cell_row + (ox / zoom) as usize];
                if let Some(step) = grid_step {
                    if on_row_line || ox % step == 0 {
                        color = blend_over(GRID_LINE, color);
                    }
                }
                let i = ox as usize * 4;
                line[i..i + 4].copy_from_slice(&color.0);
            }
        });

    out
}

/// Source-over blend of `src` onto an opaque `dst`.
pub fn blend_over(src: Color, dst: Color) -> Color {
    let a = src[3] as u32;
    if a == 255 {
        return Rgba([src[0], src[1], src[2], 255]);
    }
    let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a) + 127) / 255) as u8;
    Rgba([mix(src[0], dst[0]), mix(src[1], dst[1]), mix(src[2], dst[2]), 255])
}
