use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::components::colors::DEFAULT_PALETTE;
use crate::error::EditorResult;

/// Editor defaults that persist across sessions.
///
/// Only start-up values live here; the live tool state is never written back.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Canvas size used at start-up and pre-filled in the New dialog.
    pub default_width: u32,
    pub default_height: u32,
    pub default_zoom: u32,
    /// Choices offered in the zoom picker.
    pub zoom_levels: Vec<u32>,
    pub brush_min: u32,
    pub brush_max: u32,
    /// Choices offered in the grid-spacing picker, in buffer cells.
    pub grid_cell_sizes: Vec<u32>,
    pub default_grid_cell_size: u32,
    pub show_grid: bool,
    /// Largest edge accepted by New and Open.
    pub max_canvas_edge: u32,
    /// Largest edge of the zoomed composite; zoom is capped to stay inside it.
    pub max_composite_edge: u32,
    /// Undo depth cap; `None` keeps every step.
    pub max_undo_steps: Option<usize>,
    /// Quick-pick swatches, RGBA.
    pub palette: Vec<[u8; 4]>,
    pub debug_logging: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            default_width: 32,
            default_height: 32,
            default_zoom: 10,
            zoom_levels: vec![5, 10, 15, 20],
            brush_min: 1,
            brush_max: 10,
            grid_cell_sizes: vec![1, 2, 4, 8, 16],
            default_grid_cell_size: 1,
            show_grid: true,
            max_canvas_edge: 1024,
            max_composite_edge: 8192,
            max_undo_steps: None,
            palette: DEFAULT_PALETTE.to_vec(),
            debug_logging: false,
        }
    }
}

impl EditorSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/pixelfe/settings.json  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\PixelFE\settings.json
    /// On macOS:   ~/Library/Application Support/PixelFE/settings.json
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA").ok()?;
            return Some(PathBuf::from(appdata).join("PixelFE").join("settings.json"));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").ok()?;
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("PixelFE")
                    .join("settings.json"),
            );
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            let config_dir = match std::env::var("XDG_CONFIG_HOME") {
                Ok(xdg) => PathBuf::from(xdg),
                Err(_) => PathBuf::from(std::env::var("HOME").ok()?).join(".config"),
            };
            Some(config_dir.join("pixelfe").join("settings.json"))
        }
    }

    /// Load from the platform path.  A missing or unreadable file yields the
    /// defaults; a malformed one is logged and also yields the defaults.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("ignoring settings file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> EditorResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&text)?;
        settings.normalize();
        Ok(settings)
    }

    /// Repair values a hand-edited file could break.
    fn normalize(&mut self) {
        self.max_composite_edge = self.max_composite_edge.max(1);
        self.max_canvas_edge = self.max_canvas_edge.clamp(1, self.max_composite_edge);
        self.default_width = self.default_width.clamp(1, self.max_canvas_edge);
        self.default_height = self.default_height.clamp(1, self.max_canvas_edge);
        self.default_zoom = self.default_zoom.max(1);
        self.brush_min = self.brush_min.max(1);
        self.brush_max = self.brush_max.max(self.brush_min);
        self.default_grid_cell_size = self.default_grid_cell_size.max(1);
        self.zoom_levels.retain(|&z| z > 0);
        if self.zoom_levels.is_empty() {
            self.zoom_levels = Self::default().zoom_levels;
        }
        // A zero cap would drop every snapshot as soon as it is pushed.
        if self.max_undo_steps == Some(0) {
            self.max_undo_steps = None;
        }
        self.grid_cell_sizes.retain(|&n| n > 0);
        if self.grid_cell_sizes.is_empty() {
            self.grid_cell_sizes = Self::default().grid_cell_sizes;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_back_a_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = EditorSettings {
            default_width: 64,
            max_undo_steps: Some(20),
            ..EditorSettings::default()
        };
        std::fs::write(&path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();
        assert_eq!(EditorSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "default_zoom": 15, "show_grid": false }"#).unwrap();

        let settings = EditorSettings::load_from(&path).unwrap();
        assert_eq!(settings.default_zoom, 15);
        assert!(!settings.show_grid);
        assert_eq!(settings.default_width, 32);
        assert_eq!(settings.palette.len(), 10);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(EditorSettings::load_from(&path).is_err());
    }

    #[test]
    fn broken_values_are_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{ "default_width": 0, "brush_min": 6, "brush_max": 2, "zoom_levels": [0] }"#,
        )
        .unwrap();

        let settings = EditorSettings::load_from(&path).unwrap();
        assert_eq!(settings.default_width, 1);
        assert_eq!((settings.brush_min, settings.brush_max), (6, 6));
        assert_eq!(settings.zoom_levels, vec![5, 10, 15, 20]);
    }

    #[test]
    fn zero_undo_cap_means_unbounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "max_undo_steps": 0 }"#).unwrap();
        assert_eq!(EditorSettings::load_from(&path).unwrap().max_undo_steps, None);

        std::fs::write(&path, r#"{ "max_undo_steps": 3 }"#).unwrap();
        assert_eq!(EditorSettings::load_from(&path).unwrap().max_undo_steps, Some(3));
    }

    #[test]
    fn canvas_edge_never_exceeds_composite_edge() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "max_canvas_edge": 5000, "max_composite_edge": 4096 }"#)
            .unwrap();
        let settings = EditorSettings::load_from(&path).unwrap();
        assert_eq!(settings.max_canvas_edge, 4096);
    }
}
