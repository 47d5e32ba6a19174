use std::collections::VecDeque;

use crate::canvas::PixelBuffer;

// ============================================================================
// SNAPSHOT – immutable full-buffer copy
// ============================================================================

/// A deep copy of the pixel buffer taken at one instant.
///
/// Snapshots are never handed out mutably; the only way to get the pixels
/// back is to consume the snapshot.
#[derive(Clone, Debug)]
pub struct HistorySnapshot {
    buffer: PixelBuffer,
}

impl HistorySnapshot {
    pub fn capture(buffer: &PixelBuffer) -> Self {
        Self {
            buffer: buffer.clone(),
        }
    }

    pub fn into_buffer(self) -> PixelBuffer {
        self.buffer
    }

    pub fn memory_size(&self) -> usize {
        self.buffer.memory_size()
    }
}

// ============================================================================
// HISTORY MANAGER – linear undo / redo over snapshots
// ============================================================================

/// Two stacks of snapshots, most recent at the back.
///
/// The redo stack is only non-empty directly after an undo; every
/// [`push_undo`](Self::push_undo) clears it.
pub struct HistoryManager {
    undo_stack: VecDeque<HistorySnapshot>,
    redo_stack: VecDeque<HistorySnapshot>,
    /// Oldest undo snapshots are dropped past this depth.  `None` = unbounded.
    max_history_size: Option<usize>,
    /// Running memory total across both stacks.
    total_memory: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HistoryManager {
    pub fn new(max_history_size: Option<usize>) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history_size,
            total_memory: 0,
        }
    }

    /// Save a copy of `buffer` as the next undo point and forget any redo.
    pub fn push_undo(&mut self, buffer: &PixelBuffer) {
        for snap in self.redo_stack.drain(..) {
            self.total_memory = self.total_memory.saturating_sub(snap.memory_size());
        }

        let snap = HistorySnapshot::capture(buffer);
        self.total_memory += snap.memory_size();
        self.undo_stack.push_back(snap);

        self.prune();
    }

    /// Pop the latest undo snapshot, parking a copy of `current` on the redo
    /// stack.  `None` when there is nothing to undo.
    pub fn undo(&mut self, current: &PixelBuffer) -> Option<PixelBuffer> {
        let snap = self.undo_stack.pop_back()?;
        self.total_memory = self.total_memory.saturating_sub(snap.memory_size());

        let parked = HistorySnapshot::capture(current);
        self.total_memory += parked.memory_size();
        self.redo_stack.push_back(parked);

        Some(snap.into_buffer())
    }

    /// Mirror of [`undo`](Self::undo).
    pub fn redo(&mut self, current: &PixelBuffer) -> Option<PixelBuffer> {
        let snap = self.redo_stack.pop_back()?;
        self.total_memory = self.total_memory.saturating_sub(snap.memory_size());

        let parked = HistorySnapshot::capture(current);
        self.total_memory += parked.memory_size();
        self.undo_stack.push_back(parked);
        self.prune();

        Some(snap.into_buffer())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Bytes held by both stacks (O(1) via cached total).
    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.total_memory = 0;
    }

    fn prune(&mut self) {
        let Some(max) = self.max_history_size else { return };
        while self.undo_stack.len() > max {
            if let Some(removed) = self.undo_stack.pop_front() {
                self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn painted(color: [u8; 4]) -> PixelBuffer {
        PixelBuffer::new_filled(2, 2, Rgba(color)).unwrap()
    }

    #[test]
    fn empty_history_is_a_no_op() {
        let mut history = HistoryManager::default();
        let current = painted([1, 2, 3, 255]);
        assert!(history.undo(&current).is_none());
        assert!(history.redo(&current).is_none());
        assert_eq!(history.undo_count(), 0);
        assert_eq!(history.redo_count(), 0);
    }

    #[test]
    fn undo_then_redo_round_trips() {
        let mut history = HistoryManager::default();
        let before = painted([0, 0, 0, 255]);
        let after = painted([9, 9, 9, 255]);

        history.push_undo(&before);
        let restored = history.undo(&after).unwrap();
        assert_eq!(restored, before);
        assert!(history.can_redo());

        let redone = history.redo(&restored).unwrap();
        assert_eq!(redone, after);
        assert!(!history.can_redo());
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn push_clears_redo() {
        let mut history = HistoryManager::default();
        let a = painted([1, 0, 0, 255]);
        let b = painted([2, 0, 0, 255]);
        history.push_undo(&a);
        history.undo(&b);
        assert!(history.can_redo());

        history.push_undo(&a);
        assert!(!history.can_redo());
    }

    #[test]
    fn snapshot_survives_source_mutation() {
        let mut history = HistoryManager::default();
        let mut live = painted([0, 0, 0, 255]);
        history.push_undo(&live);
        live.set(0, 0, Rgba([255, 0, 0, 255]));

        let restored = history.undo(&live).unwrap();
        assert_eq!(restored.get(0, 0), Some(Rgba([0, 0, 0, 255])));
    }

    #[test]
    fn cap_drops_oldest() {
        let mut history = HistoryManager::new(Some(2));
        for i in 0..5u8 {
            history.push_undo(&painted([i, 0, 0, 255]));
        }
        assert_eq!(history.undo_count(), 2);

        let current = painted([9, 0, 0, 255]);
        let newest = history.undo(&current).unwrap();
        assert_eq!(newest.get(0, 0), Some(Rgba([4, 0, 0, 255])));
    }

    #[test]
    fn memory_tracks_both_stacks() {
        let mut history = HistoryManager::default();
        let buf = painted([0, 0, 0, 255]);
        history.push_undo(&buf);
        assert_eq!(history.memory_usage(), 16);
        history.undo(&buf);
        assert_eq!(history.memory_usage(), 16);
        history.clear();
        assert_eq!(history.memory_usage(), 0);
    }
}
