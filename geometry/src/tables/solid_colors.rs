//! Shared uniform color streams for the default white tints.

use std::sync::Arc;

use crate::channel::SharedBuffer;
use crate::types::Color32;

/// Cached color arrays for opaque white and clear white.
///
/// These two tints cover nearly every UI element, so their color streams
/// are shared instead of filled per vertex. Each array grows to the largest
/// count ever requested for its color and never shrinks.
#[derive(Debug)]
pub struct SolidColorTable {
    opaque: Arc<[Color32]>,
    clear: Arc<[Color32]>,
}

impl SolidColorTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self {
            opaque: Arc::from(Vec::new()),
            clear: Arc::from(Vec::new()),
        }
    }

    /// Check if `color` has a shared stream.
    pub fn supports(color: Color32) -> bool {
        color.r == 255 && color.g == 255 && color.b == 255 && (color.a == 0 || color.a == 255)
    }

    /// A stream of `count` copies of `color`, or `None` when `color` is not
    /// opaque white or clear white.
    pub fn try_get(&mut self, color: Color32, count: usize) -> Option<SharedBuffer<Color32>> {
        if !Self::supports(color) {
            return None;
        }
        let slot = if color.a == 255 {
            &mut self.opaque
        } else {
            &mut self.clear
        };
        if slot.len() < count {
            log::trace!(
                "growing solid color table for {color:?} from {} to {count}",
                slot.len()
            );
            *slot = vec![color; count].into();
        }
        Some(SharedBuffer::with_len(slot.clone(), count))
    }

    /// Longest stream cached for `color`, zero for unsupported colors.
    pub fn cached_len(&self, color: Color32) -> usize {
        if !Self::supports(color) {
            0
        } else if color.a == 255 {
            self.opaque.len()
        } else {
            self.clear.len()
        }
    }
}

impl Default for SolidColorTable {
    fn default() -> Self {
        Self::new()
    }
}
