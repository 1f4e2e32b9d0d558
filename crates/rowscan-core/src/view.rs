//! Fixed-height row windowing for a scrolled table.

use crate::config::{SessionConfig, ViewportConfig};
use std::ops::Range;

/// Placeholder rows shown below the buffer while a continuation page loads.
const LOADING_ROWS: u64 = 3;

///
/// Viewport
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Viewport {
    row_height: u32,
    overscan: u32,
    near_bottom_px: u32,
}

impl Viewport {
    #[must_use]
    pub const fn new(row_height: u32, overscan: u32, near_bottom_px: u32) -> Self {
        Self {
            row_height: if row_height == 0 { 1 } else { row_height },
            overscan,
            near_bottom_px,
        }
    }

    #[must_use]
    pub const fn from_config(viewport: &ViewportConfig, session: &SessionConfig) -> Self {
        Self::new(viewport.row_height, viewport.overscan, session.near_bottom_px)
    }

    #[must_use]
    pub const fn row_height(&self) -> u32 {
        self.row_height
    }

    /// Buffer indexes to render for a container scrolled to `scroll_top`.
    #[must_use]
    pub fn window(&self, scroll_top: u64, container_height: u64, len: usize) -> Range<usize> {
        let row = u64::from(self.row_height);
        let overscan = u64::from(self.overscan);

        let first = (scroll_top / row).saturating_sub(overscan);
        let last = (scroll_top + container_height).div_ceil(row) + overscan;

        let end = usize::try_from(last).unwrap_or(usize::MAX).min(len);
        let start = usize::try_from(first).unwrap_or(usize::MAX).min(end);

        start..end
    }

    /// Pixel offset of row `index` from the top of the table body.
    #[must_use]
    pub const fn row_top(&self, index: usize) -> u64 {
        index as u64 * self.row_height as u64
    }

    /// Scrollable height for `len` buffered rows.
    #[must_use]
    pub const fn total_height(&self, len: usize, loading_more: bool) -> u64 {
        let rows = len as u64 + if loading_more { LOADING_ROWS } else { 0 };

        rows * self.row_height as u64
    }

    /// Whether the remaining scroll distance is under the trigger threshold.
    #[must_use]
    pub const fn near_bottom(&self, scroll_height: u64, scroll_top: u64, client_height: u64) -> bool {
        let remaining = scroll_height
            .saturating_sub(scroll_top)
            .saturating_sub(client_height);

        remaining < self.near_bottom_px as u64
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&ViewportConfig::default(), &SessionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_at_top_includes_trailing_overscan() {
        let viewport = Viewport::default();

        // 550px shows ten 55px rows; five more are overscanned below.
        assert_eq!(viewport.window(0, 550, 1_000), 0..15);
    }

    #[test]
    fn window_mid_scroll_overscans_both_sides() {
        let viewport = Viewport::default();

        // Row 20 starts at 1100px.
        assert_eq!(viewport.window(1_100, 550, 1_000), 15..35);
    }

    #[test]
    fn window_is_clamped_to_buffer_length() {
        let viewport = Viewport::default();

        assert_eq!(viewport.window(1_100, 550, 25), 15..25);
        assert_eq!(viewport.window(10_000, 550, 25), 25..25);
        assert_eq!(viewport.window(0, 550, 0), 0..0);
    }

    #[test]
    fn near_bottom_uses_strict_threshold() {
        let viewport = Viewport::default();

        assert!(viewport.near_bottom(1_650, 1_000, 451));
        assert!(!viewport.near_bottom(1_650, 1_000, 450), "exactly 200px left");
        assert!(viewport.near_bottom(500, 0, 600), "content shorter than view");
    }

    #[test]
    fn heights_account_for_loading_rows() {
        let viewport = Viewport::new(10, 0, 50);

        assert_eq!(viewport.total_height(4, false), 40);
        assert_eq!(viewport.total_height(4, true), 70);
        assert_eq!(viewport.row_top(3), 30);
    }
}
