//! Record detail navigation
//!
//! The detail dialog opens on one visible row and steps through its
//! neighbours without leaving the visible range.

use serde::{Deserialize, Serialize};

/// Position within the visible rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailCursor {
    index: usize,
    len: usize,
}

impl DetailCursor {
    /// Open at `index`; `None` if it is outside `0..len`
    #[must_use]
    pub fn open(index: usize, len: usize) -> Option<Self> {
        (index < len).then_some(Self { index, len })
    }

    /// Current index
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Length of the visible range
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false; an open cursor has at least one row
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check for a following row
    #[inline]
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.index + 1 < self.len
    }

    /// Check for a preceding row
    #[inline]
    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    /// Step forward; returns false at the last row
    pub fn next_row(&mut self) -> bool {
        if self.has_next() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Step back; returns false at the first row
    pub fn prev_row(&mut self) -> bool {
        if self.has_prev() {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Re-bound after the visible range changed; closes if it became empty
    #[must_use]
    pub fn resize(self, len: usize) -> Option<Self> {
        if len == 0 {
            return None;
        }
        Some(Self {
            index: self.index.min(len - 1),
            len,
        })
    }

    /// Row under the cursor
    #[must_use]
    pub fn current<'a, T>(&self, rows: &'a [T]) -> Option<&'a T> {
        rows.get(self.index)
    }
}
