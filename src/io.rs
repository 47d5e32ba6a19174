//! Image file collaborators: decode into RGBA pixels for the controller,
//! encode exported pixels to PNG, and run either on a worker thread.
//!
//! Workers never touch editor state.  They report an [`IoResult`] over a
//! channel and the UI thread applies it.

use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;

use image::{ImageFormat, RgbaImage};

use crate::error::{EditorError, EditorResult};

/// Decode any supported raster file into straight RGBA8.
///
/// The format is sniffed from the file contents, falling back to the
/// extension.
pub fn load_image(path: &Path) -> EditorResult<RgbaImage> {
    let decode_err = |reason: String| EditorError::Decode {
        path: path.to_path_buf(),
        reason,
    };
    let reader = image::io::Reader::open(path)
        .map_err(|e| decode_err(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| decode_err(e.to_string()))?;
    let img = reader.decode().map_err(|e| decode_err(e.to_string()))?;
    let rgba = img.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(decode_err("image has no pixels".to_string()));
    }
    Ok(rgba)
}

/// `path` with a `.png` extension appended unless it already ends in one.
pub fn with_png_extension(path: &Path) -> PathBuf {
    let is_png = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    if is_png {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".png");
        PathBuf::from(name)
    }
}

/// Write `pixels` as PNG.  Returns the path actually written, which gains a
/// `.png` extension when missing.
pub fn save_png(pixels: &RgbaImage, path: &Path) -> EditorResult<PathBuf> {
    let target = with_png_extension(path);
    pixels
        .save_with_format(&target, ImageFormat::Png)
        .map_err(|e| EditorError::Encode {
            path: target.clone(),
            reason: e.to_string(),
        })?;
    Ok(target)
}

// ============================================================================
// BACKGROUND JOBS
// ============================================================================

/// Result delivered from a background IO job.
#[derive(Debug)]
pub enum IoResult {
    /// A file was decoded and is ready to replace the canvas.
    Loaded { pixels: RgbaImage, path: PathBuf },
    /// Decoding failed; the canvas stays as it was.
    LoadFailed(EditorError),
    /// Pixels were written to `path`.
    Saved(PathBuf),
    SaveFailed(EditorError),
}

/// Decode `path` on the rayon pool and send the outcome to `tx`.
pub fn spawn_load(path: PathBuf, tx: Sender<IoResult>) {
    rayon::spawn(move || {
        let result = match load_image(&path) {
            Ok(pixels) => IoResult::Loaded { pixels, path },
            Err(e) => IoResult::LoadFailed(e),
        };
        // Receiver gone means the app is closing.
        let _ = tx.send(result);
    });
}

/// Encode `pixels` on the rayon pool and send the outcome to `tx`.
pub fn spawn_save(pixels: RgbaImage, path: PathBuf, tx: Sender<IoResult>) {
    rayon::spawn(move || {
        let result = match save_png(&pixels, &path) {
            Ok(written) => IoResult::Saved(written),
            Err(e) => IoResult::SaveFailed(e),
        };
        let _ = tx.send(result);
    });
}
