//! Viewport navigation across one or more file views

use crate::view::{FileView, CACHE_ALIGN, CACHE_CAPACITY};
use serde::{Deserialize, Serialize};

/// A single navigation request, independent of which views it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    ByteLeft,
    ByteRight,
    RowUp,
    RowDown,
    PageUp,
    PageDown,
    /// Mouse wheel, four rows at a time.
    WheelUp,
    WheelDown,
    Home,
    End,
}

/// Viewport shape plus which view moves: `selected = None` moves every view
/// in lockstep, `Some(i)` moves only view `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationConfig {
    pub bytes_per_row: u32,
    pub rows: u32,
    pub selected: Option<usize>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            bytes_per_row: 16,
            rows: 24,
            selected: None,
        }
    }
}

impl NavigationConfig {
    /// Bytes covered by one page of this shape.
    pub fn view_len(&self) -> u32 {
        self.bytes_per_row * self.rows
    }

    /// Largest viewport a single aligned refill can always satisfy: with the
    /// window start rounded down by up to `CACHE_ALIGN - 1` bytes, only
    /// `CACHE_CAPACITY - CACHE_ALIGN` of it is guaranteed past the position.
    pub const VIEW_LEN_LIMIT: u32 = (CACHE_CAPACITY - CACHE_ALIGN as usize) as u32;

    /// Force the shape into the range a refill can serve in one read.
    /// Width shrinks before height, as a too-wide row is the usual cause.
    pub fn clamped(mut self) -> Self {
        self.bytes_per_row = self.bytes_per_row.max(1);
        self.rows = self.rows.max(1);
        if self.bytes_per_row.saturating_mul(self.rows) > Self::VIEW_LEN_LIMIT {
            self.bytes_per_row = (Self::VIEW_LEN_LIMIT / self.rows).max(1);
        }
        if self.bytes_per_row.saturating_mul(self.rows) > Self::VIEW_LEN_LIMIT {
            self.rows = (Self::VIEW_LEN_LIMIT / self.bytes_per_row).max(1);
        }
        self
    }
}

/// Translates [`Move`] requests into new positions and pushes them into the
/// affected [`FileView`]s. Deliberately stateless beyond its config so that
/// position arithmetic stays a pure function and is testable as one.
pub struct Navigator {
    config: NavigationConfig,
}

impl Navigator {
    pub fn new(config: NavigationConfig) -> Self {
        Self {
            config: config.clamped(),
        }
    }

    pub fn config(&self) -> NavigationConfig {
        self.config
    }

    /// Replace the viewport shape and re-derive every view's window.
    ///
    /// Changing shape is not a move: each view keeps its position and only
    /// re-satisfies it under the new `view_len`.
    pub fn reconfigure(&mut self, config: NavigationConfig, views: &mut [FileView]) {
        self.config = config.clamped();
        let view_len = self.config.view_len();
        for view in views {
            view.set_view_len(view_len);
        }
    }

    /// Apply one move to the selected view, or to all views when none is.
    pub fn apply(&self, mv: Move, views: &mut [FileView]) {
        match self.config.selected {
            Some(i) => {
                if let Some(view) = views.get_mut(i) {
                    view.set_position(self.target(mv, view.position(), view.size()));
                }
            }
            None => {
                for view in views.iter_mut() {
                    view.set_position(self.target(mv, view.position(), view.size()));
                }
            }
        }
    }

    /// New position for one view. Backward moves may wrap below zero; the
    /// view's `set_position` resets those to the start of the file.
    pub fn target(&self, mv: Move, pos: u64, size: u64) -> u64 {
        let row = self.config.bytes_per_row as u64;
        let page = self.config.view_len() as u64;
        match mv {
            Move::ByteLeft => pos.wrapping_sub(1),
            Move::ByteRight => pos.wrapping_add(1),
            Move::RowUp => pos.wrapping_sub(row),
            Move::RowDown => pos.wrapping_add(row),
            Move::PageUp => pos.wrapping_sub(page),
            Move::PageDown => pos.wrapping_add(page),
            Move::WheelUp => pos.wrapping_sub(row * 4),
            Move::WheelDown => pos.wrapping_add(row * 4),
            Move::Home => 0,
            Move::End => size.saturating_sub(page),
        }
    }
}
