// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fixed-height row geometry for a virtualized viewport.
//!
//! A list view only materializes the rows that intersect its viewport.
//! [`RowLayout`] maps between row indices and content-space rectangles so a
//! caller can compute that window, hit-test a tap, or pick a scroll offset.

use core::ops::Range;

use kurbo::{Point, Rect};

/// Rows stacked top to bottom, each `row_height` tall and `width` wide.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RowLayout {
    /// Height of every row. Must be positive and finite.
    pub row_height: f64,
    /// Width of every row.
    pub width: f64,
}

impl RowLayout {
    /// Create a layout; panics if `row_height` is not positive and finite.
    pub fn new(row_height: f64, width: f64) -> Self {
        assert!(
            row_height.is_finite() && row_height > 0.0,
            "row height must be positive and finite"
        );
        Self { row_height, width }
    }

    /// Content-space rectangle of `row`.
    pub fn row_rect(&self, row: usize) -> Rect {
        let y0 = row as f64 * self.row_height;
        Rect::new(0.0, y0, self.width, y0 + self.row_height)
    }

    /// Content-space rectangle covering `row_count` rows.
    pub fn content_rect(&self, row_count: usize) -> Rect {
        Rect::new(0.0, 0.0, self.width, row_count as f64 * self.row_height)
    }

    /// Rows that intersect `viewport`, clamped to `row_count`.
    pub fn rows_in(&self, viewport: Rect, row_count: usize) -> Range<usize> {
        let top = viewport.y0.max(0.0);
        let bottom = viewport.y1.max(0.0);
        if bottom <= top {
            return 0..0;
        }
        let start = self.row_floor(top).min(row_count);
        let mut end = self.row_floor(bottom);
        if (end as f64) * self.row_height < bottom {
            end += 1;
        }
        start..end.min(row_count)
    }

    /// Row under `pt`, if any.
    pub fn row_at(&self, pt: Point, row_count: usize) -> Option<usize> {
        if pt.y < 0.0 || pt.x < 0.0 || pt.x >= self.width {
            return None;
        }
        let row = self.row_floor(pt.y);
        (row < row_count).then_some(row)
    }

    /// The smallest move of `viewport` that shows all of `row`.
    pub fn reveal(&self, viewport: Rect, row: usize) -> Rect {
        let target = self.row_rect(row);
        let dy = if target.y0 < viewport.y0 {
            target.y0 - viewport.y0
        } else if target.y1 > viewport.y1 {
            (target.y1 - viewport.y1).min(target.y0 - viewport.y0)
        } else {
            0.0
        };
        Rect::new(viewport.x0, viewport.y0 + dy, viewport.x1, viewport.y1 + dy)
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "callers clamp y to be non-negative; truncation is the floor."
    )]
    fn row_floor(&self, y: f64) -> usize {
        (y / self.row_height) as usize
    }
}
