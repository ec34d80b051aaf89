// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contracts between the controller and the list view it drives.
//!
//! The list view itself (rendering, cell reuse, scrolling) lives outside this
//! crate. It receives row indices through [`ListDriver`] and asks for cells
//! through a [`CellProvider`].

use understory_outline::{NodeId, NodeKind};

/// Animation hint attached to row insertions and deletions.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum RowAnimation {
    /// Let the list view pick.
    #[default]
    Automatic,
    /// Cross-fade rows in or out.
    Fade,
    /// Apply the change without animating.
    None,
}

/// The list view as seen by the controller.
///
/// Batched updates follow the classic list-diff contract: between
/// [`begin_updates`](ListDriver::begin_updates) and
/// [`end_updates`](ListDriver::end_updates), deleted rows are indices into the
/// list before the batch and inserted rows are indices into the list after it.
pub trait ListDriver {
    /// Drop every row and re-query the data source, which now reports `row_count` rows.
    fn reload_all(&mut self, row_count: usize);

    /// Insert rows at the given (ascending) indices.
    fn insert_rows(&mut self, rows: &[usize], animation: RowAnimation);

    /// Delete rows at the given (ascending) indices.
    fn delete_rows(&mut self, rows: &[usize], animation: RowAnimation);

    /// Bring `row` into view.
    fn scroll_to(&mut self, row: usize);

    /// Number of rows the list view currently displays.
    fn row_count(&self) -> usize;

    /// Start a batch of deletions and insertions.
    fn begin_updates(&mut self) {}

    /// Apply the batch started by [`begin_updates`](ListDriver::begin_updates).
    fn end_updates(&mut self) {}
}

/// Everything a cell provider may want to know about a row.
#[derive(Debug)]
pub struct RowContext<'a, T> {
    /// Node displayed in the row.
    pub node: NodeId,
    /// The row index.
    pub row: usize,
    /// Ancestors of the node up to the root.
    pub depth: usize,
    /// Ancestors of the node up to the nearest collapsed section or the root.
    pub collapsed_depth: usize,
    /// What the node stands for.
    pub kind: &'a NodeKind<T>,
    /// Whether the node currently shows its children (disclosure state).
    pub children_visible: bool,
}

/// Produces an opaque cell for a row. The controller never inspects cells.
pub trait CellProvider<T> {
    /// Cell type handed back to the list view.
    type Cell;

    /// Build the cell for `row`.
    fn cell(&mut self, row: &RowContext<'_, T>) -> Self::Cell;
}

impl<T, C, F> CellProvider<T> for F
where
    F: FnMut(&RowContext<'_, T>) -> C,
{
    type Cell = C;

    fn cell(&mut self, row: &RowContext<'_, T>) -> C {
        self(row)
    }
}
