// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the outline tree: node identifiers, flags, node kinds, and listeners.

use alloc::vec::Vec;

use crate::collapse::CollapsedSection;

/// Identifier for a node in the tree.
///
/// This is a small, copyable handle that stays stable across updates but becomes
/// invalid when the underlying slot is reused.
/// It consists of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On [`Tree::remove`](crate::Tree::remove), the slot is freed; any existing `NodeId` that pointed to that slot is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Detaching a node ([`Tree::remove_from_parent`](crate::Tree::remove_from_parent)) does not free it.
/// Detached nodes stay alive so they can be re-attached, which is how collapsed sections
/// restore the exact nodes they replaced.
///
/// Use [`Tree::is_alive`](crate::Tree::is_alive) to check whether a `NodeId` still refers to a live node.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Per-node display flags.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node participates in the visible traversal (when its parent does).
        const VISIBLE          = 0b0000_0001;
        /// Report the node's children as shown, whatever their flags say.
        const CHILDREN_SHOWN   = 0b0000_0010;
        /// Report the node's children as hidden, whatever their flags say.
        const CHILDREN_HIDDEN  = 0b0000_0100;
    }
}

/// What a node stands for.
///
/// Application content only lives in [`NodeKind::Plain`]. The other variants are
/// synthetic rows that the list controller injects and removes as part of user
/// interaction.
#[derive(Clone, Debug)]
pub enum NodeKind<T> {
    /// The tree's own root. Never emitted by the visible traversal.
    Root,
    /// A node built from an application object.
    Plain(T),
    /// Marks its parent as the current selection.
    Selection,
    /// An actionable affordance anchored under its parent.
    Action,
    /// A placeholder standing in for a hidden chain of nodes.
    CollapsedSection(CollapsedSection),
}

impl<T> NodeKind<T> {
    /// Returns the application content of a [`Plain`](Self::Plain) node.
    pub fn content(&self) -> Option<&T> {
        match self {
            Self::Plain(content) => Some(content),
            _ => None,
        }
    }

    /// Returns the application content of a [`Plain`](Self::Plain) node, mutably.
    pub fn content_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Plain(content) => Some(content),
            _ => None,
        }
    }

    /// True for nodes injected by interaction rather than built from the model.
    pub fn is_synthetic(&self) -> bool {
        matches!(
            self,
            Self::Selection | Self::Action | Self::CollapsedSection(_)
        )
    }

    /// True for [`Selection`](Self::Selection) and [`Action`](Self::Action) markers.
    pub fn is_marker(&self) -> bool {
        matches!(self, Self::Selection | Self::Action)
    }

    /// Short label used by [`Tree::describe`](crate::Tree::describe).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Root => "root",
            Self::Plain(_) => "node",
            Self::Selection => "selection",
            Self::Action => "action",
            Self::CollapsedSection(_) => "collapsed",
        }
    }
}

/// Visible positions captured right before a node's visibility flag is assigned.
///
/// `index` is the node's own row (or `None` if it was not displayed) and
/// `children` lists the rows of its displayed descendants at that moment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisibilitySnapshot {
    /// Row of the node before the assignment.
    pub index: Option<usize>,
    /// Rows of the node's displayed descendants before the assignment.
    pub children: Vec<usize>,
}

/// One row of the visible traversal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VisibleRow {
    /// Node displayed in this row.
    pub node: NodeId,
    /// Number of ancestors of `node` up to the root (top-level rows have depth `1`).
    pub depth: usize,
}

/// Receives visibility flips from a [`Tree`](crate::Tree).
///
/// The tree calls this synchronously, in mutation order, every time a node's
/// [`NodeFlags::VISIBLE`] bit actually changes. Assigning the current value is
/// not reported.
pub trait VisibilityListener {
    /// `node` just became visible (`true`) or hidden (`false`).
    fn visibility_changed(&mut self, node: NodeId, visible: bool);
}

/// A listener that ignores every notification.
///
/// Used by [`Tree::new`](crate::Tree::new) until a real listener is attached with
/// [`Tree::with_listener`](crate::Tree::with_listener).
#[derive(Copy, Clone, Debug, Default)]
pub struct NoListener;

impl VisibilityListener for NoListener {
    #[inline]
    fn visibility_changed(&mut self, _node: NodeId, _visible: bool) {}
}

impl<L: VisibilityListener + ?Sized> VisibilityListener for &mut L {
    fn visibility_changed(&mut self, node: NodeId, visible: bool) {
        (**self).visibility_changed(node, visible);
    }
}
