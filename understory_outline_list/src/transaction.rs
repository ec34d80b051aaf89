// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility transactions: turning a batch of tree edits into row updates.
//!
//! A [`Transaction`] is the tree's [`VisibilityListener`]. While it is open it
//! records every visibility flip in order. Closing it compares the rows before
//! and after the batch and produces a [`RowUpdate`]:
//!
//! - A node that was hidden deletes its old row and the rows of its displayed
//!   descendants, all resolved against the rows before the batch.
//! - A node that was shown inserts its new row and its displayed descendants,
//!   resolved against the rows after the batch.
//! - A node whose row is deleted but which is still displayed afterwards is also
//!   inserted at its new row, and the other way around.
//! - Rows that appear or vanish without a flip of their own (for example when a
//!   displayed node is detached) are included as well.
//!
//! Rows that are neither deleted nor inserted must list the same nodes in the
//! same order before and after. If they do not, the edits moved displayed rows
//! around and the update falls back to [`RowUpdate::Reload`].

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use log::warn;
use understory_outline::{NodeId, VisibilityListener, VisibleRow};

/// Row indices to delete (against the old rows) and insert (against the new rows).
///
/// Both lists are sorted ascending and free of duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowBatch {
    /// Rows removed, as indices before the batch.
    pub deleted: Vec<usize>,
    /// Rows added, as indices after the batch.
    pub inserted: Vec<usize>,
}

impl RowBatch {
    /// True if the batch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.inserted.is_empty()
    }

    /// Row count after the batch minus row count before it.
    #[allow(
        clippy::cast_possible_wrap,
        reason = "row counts never approach isize::MAX"
    )]
    pub fn net_change(&self) -> isize {
        self.inserted.len() as isize - self.deleted.len() as isize
    }
}

/// What the list view has to do after a transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowUpdate {
    /// Apply these deletions and insertions as one batch.
    Batch(RowBatch),
    /// The change cannot be expressed as a batch; reload every row.
    Reload,
}

/// Records visibility flips between [`Transaction::begin`] and [`Transaction::finish`].
#[derive(Clone, Debug, Default)]
pub struct Transaction {
    open: bool,
    before: Vec<VisibleRow>,
    shown: Vec<NodeId>,
    hidden: Vec<NodeId>,
}

impl Transaction {
    /// A closed transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether [`Transaction::begin`] has been called without a matching finish.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Nodes that became visible since the transaction opened, in flip order.
    pub fn shown_nodes(&self) -> &[NodeId] {
        &self.shown
    }

    /// Nodes that became hidden since the transaction opened, in flip order.
    pub fn hidden_nodes(&self) -> &[NodeId] {
        &self.hidden
    }

    /// Open the transaction, given the rows as they are before any edit.
    ///
    /// Transactions do not nest; opening an open transaction panics.
    pub fn begin(&mut self, before: Vec<VisibleRow>) {
        assert!(!self.open, "visibility transactions do not nest");
        self.open = true;
        self.before = before;
        self.shown.clear();
        self.hidden.clear();
    }

    /// Close the transaction, given the rows after the edits, and compute the update.
    pub fn finish(&mut self, after: &[VisibleRow]) -> RowUpdate {
        assert!(self.open, "no visibility transaction is open");
        self.open = false;
        let before = core::mem::take(&mut self.before);
        let update = diff_rows(&before, after, &self.shown, &self.hidden);
        self.shown.clear();
        self.hidden.clear();
        update
    }
}

impl VisibilityListener for Transaction {
    fn visibility_changed(&mut self, node: NodeId, visible: bool) {
        if !self.open {
            return;
        }
        if visible {
            self.shown.push(node);
        } else {
            self.hidden.push(node);
        }
    }
}

/// Compute the row update between two visible traversals.
///
/// `shown` and `hidden` are the nodes whose visibility flipped in between.
/// See the [module docs](self) for the rules.
pub fn diff_rows(
    before: &[VisibleRow],
    after: &[VisibleRow],
    shown: &[NodeId],
    hidden: &[NodeId],
) -> RowUpdate {
    let before_rows = row_map(before);
    let after_rows = row_map(after);

    let mut deleted = BTreeSet::new();
    for node in hidden {
        if let Some(&row) = before_rows.get(node) {
            deleted.extend(subtree_rows(before, row));
        }
    }
    let mut inserted = BTreeSet::new();
    for node in shown {
        if let Some(&row) = after_rows.get(node) {
            inserted.extend(subtree_rows(after, row));
        }
    }

    for (row, r) in before.iter().enumerate() {
        if !after_rows.contains_key(&r.node) {
            deleted.insert(row);
        }
    }
    for (row, r) in after.iter().enumerate() {
        if !before_rows.contains_key(&r.node) {
            inserted.insert(row);
        }
    }

    let moved_in: Vec<usize> = deleted
        .iter()
        .filter_map(|&row| after_rows.get(&before[row].node).copied())
        .collect();
    inserted.extend(moved_in);
    let moved_out: Vec<usize> = inserted
        .iter()
        .filter_map(|&row| before_rows.get(&after[row].node).copied())
        .collect();
    deleted.extend(moved_out);

    let kept_before = before
        .iter()
        .enumerate()
        .filter(|(row, _)| !deleted.contains(row))
        .map(|(_, r)| r.node);
    let kept_after = after
        .iter()
        .enumerate()
        .filter(|(row, _)| !inserted.contains(row))
        .map(|(_, r)| r.node);
    if !kept_before.eq(kept_after) {
        warn!(
            "rows kept across the transaction changed order; reloading {} row(s)",
            after.len()
        );
        return RowUpdate::Reload;
    }

    RowUpdate::Batch(RowBatch {
        deleted: deleted.into_iter().collect(),
        inserted: inserted.into_iter().collect(),
    })
}

fn row_map(rows: &[VisibleRow]) -> BTreeMap<NodeId, usize> {
    rows.iter()
        .enumerate()
        .map(|(row, r)| (r.node, row))
        .collect()
}

/// `row` and the rows of its displayed descendants, which directly follow it.
fn subtree_rows(rows: &[VisibleRow], row: usize) -> core::ops::Range<usize> {
    let depth = rows[row].depth;
    let descendants = rows[row + 1..]
        .iter()
        .take_while(|r| r.depth > depth)
        .count();
    row..row + 1 + descendants
}
