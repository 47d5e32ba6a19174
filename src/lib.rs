//! Pixel-grid image editor core.
//!
//! [`CanvasController`] owns a fixed-resolution [`PixelBuffer`], a linear
//! snapshot history and the current tool state.  Pointer events in viewport
//! space are mapped to cells and stamped with the brush; the controller hands
//! back a zoomed, optionally gridded composite for display.  File formats,
//! dialogs and windows live outside the core ([`io`] and the binary).

pub mod canvas;
pub mod components;
pub mod compositor;
pub mod controller;
pub mod error;
pub mod io;
pub mod logger;
pub mod settings;

pub use canvas::{BACKGROUND, Color, PixelBuffer, Viewport};
pub use components::history::{HistoryManager, HistorySnapshot};
pub use components::tools::{BrushRange, ToolState};
pub use controller::CanvasController;
pub use error::{EditorError, EditorResult, HistoryDirection};
pub use settings::EditorSettings;
