use image::RgbaImage;

use crate::canvas::{self, Color, PixelBuffer, Viewport};
use crate::components::history::HistoryManager;
use crate::components::tools::{self, BrushRange, ToolState};
use crate::compositor;
use crate::error::{EditorError, EditorResult, HistoryDirection};
use crate::settings::EditorSettings;

/// Where the current pointer stroke stands with respect to history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stroke {
    /// No button held.
    Idle,
    /// Button held, nothing painted yet (pressed outside the canvas).
    Pending,
    /// Undo point already saved for this stroke.
    Recorded,
}

// ============================================================================
// CANVAS CONTROLLER
// ============================================================================

/// Owns the pixel buffer, its history and the tool state, and is the only
/// thing that mutates them.
///
/// Every state change bumps [`generation`](Self::generation) and drops the
/// cached composite, so [`composite`](Self::composite) never returns a
/// surface older than the state it was asked about.
pub struct CanvasController {
    buffer: PixelBuffer,
    history: HistoryManager,
    tools: ToolState,
    /// `None` = viewport exactly the size of the composite (no centring).
    viewport: Option<Viewport>,
    max_canvas_edge: u32,
    /// Largest composite edge; zoom never scales the buffer past it.
    max_composite_edge: u32,
    stroke: Stroke,
    generation: u64,
    composite_cache: Option<RgbaImage>,
}

impl CanvasController {
    /// Controller with default tools and an unbounded history.
    pub fn new(width: u32, height: u32) -> EditorResult<Self> {
        Ok(Self::from_parts(
            PixelBuffer::new(width, height)?,
            ToolState::default(),
            HistoryManager::default(),
            u32::MAX,
            u32::MAX,
        ))
    }

    /// Controller seeded from persisted editor defaults.
    pub fn with_settings(settings: &EditorSettings) -> EditorResult<Self> {
        let (width, height) = canvas::validate_dimensions(
            settings.default_width as i64,
            settings.default_height as i64,
            settings.max_canvas_edge,
        )?;

        let mut tools = ToolState::default();
        tools.set_brush_range(BrushRange::new(settings.brush_min, settings.brush_max));
        tools.set_brush_size(settings.brush_min);
        tools.set_grid_cell_size(settings.default_grid_cell_size);
        tools.show_grid = settings.show_grid;

        let mut controller = Self::from_parts(
            PixelBuffer::new(width, height)?,
            tools,
            HistoryManager::new(settings.max_undo_steps),
            settings.max_canvas_edge,
            settings.max_composite_edge,
        );
        controller.set_zoom(settings.default_zoom);
        Ok(controller)
    }

    fn from_parts(
        buffer: PixelBuffer,
        tools: ToolState,
        history: HistoryManager,
        max_canvas_edge: u32,
        max_composite_edge: u32,
    ) -> Self {
        Self {
            buffer,
            history,
            tools,
            viewport: None,
            max_canvas_edge,
            max_composite_edge: max_composite_edge.max(1),
            stroke: Stroke::Idle,
            generation: 0,
            composite_cache: None,
        }
    }

    // ---- read access --------------------------------------------------------

    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn tools(&self) -> &ToolState {
        &self.tools
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Bumped on every change that affects the composite.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn composite_size(&self) -> (u32, u32) {
        let z = self.tools.zoom();
        (self.buffer.width() * z, self.buffer.height() * z)
    }

    /// The viewport pointer events are measured in.
    pub fn viewport(&self) -> Viewport {
        self.viewport.unwrap_or_else(|| {
            let (w, h) = self.composite_size();
            Viewport::new(w, h)
        })
    }

    /// Where the composite's top-left lands inside the viewport.
    pub fn composite_offset(&self) -> (i64, i64) {
        let (w, h) = self.composite_size();
        self.viewport().offset(w, h)
    }

    // ---- pointer input ------------------------------------------------------

    /// Viewport size changes move the composite, not its pixels; no re-render.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Some(Viewport::new(width, height));
    }

    /// Go back to mapping pointer coordinates straight onto the composite.
    pub fn clear_viewport(&mut self) {
        self.viewport = None;
    }

    /// Map a viewport point to a buffer cell, `None` when off the canvas.
    pub fn screen_to_canvas(&self, x: i32, y: i32) -> Option<(u32, u32)> {
        self.viewport().screen_to_canvas(
            x,
            y,
            self.tools.zoom(),
            self.buffer.width(),
            self.buffer.height(),
        )
    }

    /// Start a stroke.  Returns the painted cell, or `None` if the point was
    /// off the canvas and dropped.
    pub fn pointer_down(&mut self, x: i32, y: i32) -> Option<(u32, u32)> {
        self.stroke = Stroke::Pending;
        self.stamp_at(x, y)
    }

    /// Continue the current stroke; the whole stroke undoes as one step.
    pub fn pointer_drag(&mut self, x: i32, y: i32) -> Option<(u32, u32)> {
        if self.stroke == Stroke::Idle {
            self.stroke = Stroke::Pending;
        }
        self.stamp_at(x, y)
    }

    /// End the current stroke.
    pub fn pointer_up(&mut self) {
        self.stroke = Stroke::Idle;
    }

    fn stamp_at(&mut self, x: i32, y: i32) -> Option<(u32, u32)> {
        let (ix, iy) = self.screen_to_canvas(x, y)?;

        if self.stroke != Stroke::Recorded {
            self.history.push_undo(&self.buffer);
            self.stroke = Stroke::Recorded;
        }

        let written = tools::stamp(
            &mut self.buffer,
            ix,
            iy,
            self.tools.brush_size(),
            self.tools.color,
        );
        tracing::trace!("stamp at ({}, {}) wrote {} cells", ix, iy, written);
        self.mark_dirty();
        Some((ix, iy))
    }

    // ---- tool state ---------------------------------------------------------

    pub fn set_color(&mut self, color: Color) {
        self.tools.color = color;
        self.mark_dirty();
    }

    /// Returns the size actually applied after clamping.
    pub fn set_brush_size(&mut self, size: u32) -> u32 {
        let applied = self.tools.set_brush_size(size);
        self.mark_dirty();
        applied
    }

    /// Clamped to `[MIN_ZOOM, MAX_ZOOM]` and to [`zoom_limit`](Self::zoom_limit).
    pub fn set_zoom(&mut self, zoom: u32) -> u32 {
        let limit = self.zoom_limit();
        if zoom > limit {
            tracing::debug!(
                "zoom {} capped to {} for a {:?} canvas",
                zoom,
                limit,
                self.buffer.dimensions()
            );
        }
        let applied = self.tools.set_zoom(zoom.min(limit));
        self.mark_dirty();
        applied
    }

    /// Highest zoom that keeps the composite within the composite edge limit.
    pub fn zoom_limit(&self) -> u32 {
        let edge = self.buffer.width().max(self.buffer.height());
        (self.max_composite_edge / edge).clamp(tools::MIN_ZOOM, tools::MAX_ZOOM)
    }

    pub fn max_composite_edge(&self) -> u32 {
        self.max_composite_edge
    }

    /// Tighten or relax the composite limit, e.g. to the display's largest
    /// texture.  The canvas edge limit shrinks with it and the current zoom
    /// drops if it no longer fits.
    pub fn set_max_composite_edge(&mut self, edge: u32) {
        let edge = edge.max(1);
        if edge == self.max_composite_edge {
            return;
        }
        self.max_composite_edge = edge;
        self.max_canvas_edge = self.max_canvas_edge.min(edge);
        self.fit_zoom();
    }

    fn fit_zoom(&mut self) {
        let limit = self.zoom_limit();
        if self.tools.zoom() > limit {
            tracing::info!("zoom lowered from {} to {}", self.tools.zoom(), limit);
            self.tools.set_zoom(limit);
            self.mark_dirty();
        }
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.tools.show_grid = visible;
        self.mark_dirty();
    }

    pub fn set_grid_cell_size(&mut self, cells: u32) -> u32 {
        let applied = self.tools.set_grid_cell_size(cells);
        self.mark_dirty();
        applied
    }

    // ---- history ------------------------------------------------------------

    pub fn undo(&mut self) -> EditorResult<()> {
        self.stroke = Stroke::Idle;
        let restored = self
            .history
            .undo(&self.buffer)
            .ok_or(EditorError::EmptyHistory(HistoryDirection::Undo))?;
        self.buffer.replace_with(restored);
        tracing::debug!(
            "undo: {} left, {} redoable",
            self.history.undo_count(),
            self.history.redo_count()
        );
        self.mark_dirty();
        Ok(())
    }

    pub fn redo(&mut self) -> EditorResult<()> {
        self.stroke = Stroke::Idle;
        let restored = self
            .history
            .redo(&self.buffer)
            .ok_or(EditorError::EmptyHistory(HistoryDirection::Redo))?;
        self.buffer.replace_with(restored);
        tracing::debug!(
            "redo: {} undoable, {} left",
            self.history.undo_count(),
            self.history.redo_count()
        );
        self.mark_dirty();
        Ok(())
    }

    // ---- canvas lifecycle ---------------------------------------------------

    /// Replace the canvas with a white `width × height` one and forget all
    /// history.  On error nothing changes.
    pub fn new_canvas(&mut self, width: i64, height: i64) -> EditorResult<()> {
        let (w, h) = match canvas::validate_dimensions(width, height, self.max_canvas_edge) {
            Ok(dims) => dims,
            Err(e) => {
                tracing::warn!("rejected new canvas {}x{}", width, height);
                return Err(e);
            }
        };
        let fresh = PixelBuffer::new(w, h)?;
        self.install(fresh);
        tracing::info!("new canvas {}x{}", w, h);
        Ok(())
    }

    /// Adopt decoded pixels and forget all history.  On error nothing changes.
    pub fn load_image(&mut self, pixels: RgbaImage) -> EditorResult<()> {
        let (w, h) = pixels.dimensions();
        if let Err(e) = canvas::validate_dimensions(w as i64, h as i64, self.max_canvas_edge) {
            tracing::warn!("rejected image {}x{}", w, h);
            return Err(e);
        }
        let loaded = PixelBuffer::from_rgba_image(pixels)?;
        let (w, h) = loaded.dimensions();
        self.install(loaded);
        tracing::info!("loaded image {}x{}", w, h);
        Ok(())
    }

    /// Copy of the live pixels for an encoder.  Never mutates.
    pub fn export_image(&self) -> RgbaImage {
        self.buffer.to_rgba_image()
    }

    fn install(&mut self, buffer: PixelBuffer) {
        self.buffer.replace_with(buffer);
        self.history.clear();
        self.stroke = Stroke::Idle;
        self.mark_dirty();
        self.fit_zoom();
    }

    // ---- rendering ----------------------------------------------------------

    /// Current composite, regenerated if anything changed since the last call.
    pub fn composite(&mut self) -> &RgbaImage {
        let buffer = &self.buffer;
        let tools = &self.tools;
        self.composite_cache
            .get_or_insert_with(|| compositor::render(buffer, tools))
    }

    /// Freshly rendered composite, bypassing the cache.
    pub fn render_composite(&self) -> RgbaImage {
        compositor::render(&self.buffer, &self.tools)
    }

    fn mark_dirty(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.composite_cache = None;
    }
}
