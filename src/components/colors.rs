use image::Rgba;

use crate::canvas::Color;
use crate::error::{EditorError, EditorResult};

// ============================================================================
// Default swatches
// ============================================================================

/// Starting brush colour.
pub const BLACK: Color = Rgba([0, 0, 0, 255]);

/// Quick-pick palette shown under the canvas.
pub const DEFAULT_PALETTE: [[u8; 4]; 10] = [
    [0, 0, 0, 255],       // black
    [255, 255, 255, 255], // white
    [255, 0, 0, 255],     // red
    [0, 255, 0, 255],     // green
    [0, 0, 255, 255],     // blue
    [255, 255, 0, 255],   // yellow
    [0, 255, 255, 255],   // cyan
    [255, 0, 255, 255],   // magenta
    [255, 200, 0, 255],   // orange
    [255, 175, 175, 255], // pink
];

// ============================================================================
// Hex text
// ============================================================================

/// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional).
pub fn parse_hex(text: &str) -> EditorResult<Color> {
    let invalid = || EditorError::InvalidColor(text.to_string());
    let hex = text.trim().trim_start_matches('#');
    if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
        return Err(invalid());
    }
    let mut channels = [255u8; 4];
    for (i, channel) in channels.iter_mut().enumerate().take(hex.len() / 2) {
        *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
    }
    Ok(Rgba(channels))
}

/// `#RRGGBB`, or `#RRGGBBAA` when not fully opaque.
pub fn to_hex(color: Color) -> String {
    let [r, g, b, a] = color.0;
    if a == 255 {
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    } else {
        format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
    }
}
