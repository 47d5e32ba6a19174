//! Error types for editor operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

/// Which history stack an undo/redo request was aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryDirection {
    Undo,
    Redo,
}

impl std::fmt::Display for HistoryDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HistoryDirection::Undo => write!(f, "undo"),
            HistoryDirection::Redo => write!(f, "redo"),
        }
    }
}

/// Errors surfaced by the editor core and its IO collaborators.
///
/// Pointer events that land outside the canvas are *not* errors; they are
/// dropped and reported as `None` by the controller.
#[derive(Debug, Error)]
pub enum EditorError {
    /// New canvas requested with a zero or oversized edge.
    #[error("Invalid canvas dimensions {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    /// Canvas size text could not be parsed as `W x H`.
    #[error("Invalid canvas size '{0}': use 'width x height'")]
    InvalidDimensionsInput(String),

    /// Undo or redo requested with an empty stack.
    #[error("Nothing to {0}")]
    EmptyHistory(HistoryDirection),

    /// External image could not be decoded.
    #[error("Failed to load image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    /// Canvas could not be encoded to disk.
    #[error("Failed to save image {path}: {reason}")]
    Encode { path: PathBuf, reason: String },

    /// Colour text was not `#RRGGBB` or `#RRGGBBAA`.
    #[error("Invalid colour '{0}'")]
    InvalidColor(String),

    /// Settings file I/O.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file contents.
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

impl EditorError {
    /// True for failures the UI should show to the user, false for
    /// no-op signals such as an empty history.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, EditorError::EmptyHistory(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_history_is_quiet() {
        assert!(!EditorError::EmptyHistory(HistoryDirection::Undo).is_user_facing());
        assert!(EditorError::InvalidDimensions { width: 0, height: 4 }.is_user_facing());
    }

    #[test]
    fn messages_name_the_direction() {
        let msg = EditorError::EmptyHistory(HistoryDirection::Redo).to_string();
        assert_eq!(msg, "Nothing to redo");
    }
}
