// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collapsed sections: placeholders that stand in for a long chain of nodes.
//!
//! ## Lifecycle
//!
//! 1) [`Tree::new_collapsed_section`] creates a detached placeholder for an
//!    originating node and records the shape of the originating node's
//!    collapsed anchor subtree (child order and flags per node).
//! 2) The caller hides [`Tree::nodes_to_be_hidden`] (rows
//!    [`Tree::indices_to_be_hidden`]) so the removal is observed by the
//!    tree's listener.
//! 3) [`Tree::insert_collapsed_section`] makes the placeholder the anchor's only
//!    child and moves the originating node beneath it.
//! 4) [`Tree::restore_collapsed_section`] re-links the recorded shape, re-applies
//!    the recorded flags, shows the chain down to the originating node and frees
//!    the placeholder.
//!
//! The recorded shape refers to the original [`NodeId`]s, so a restore brings back
//! the very same nodes. The originating node's own children are never overwritten
//! by a restore; they may have changed while the section was collapsed.
//!
//! Collapsing inside a collapsed section nests: the anchor is then the node
//! directly under the previous placeholder rather than a top-level node.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use log::debug;

use crate::tree::Tree;
use crate::types::{NodeFlags, NodeId, NodeKind, VisibilityListener};

/// State carried by a [`NodeKind::CollapsedSection`] placeholder.
#[derive(Clone, Debug)]
pub struct CollapsedSection {
    originating: NodeId,
    anchor: NodeId,
    triggered_from_previous: bool,
    saved: Vec<SavedNode>,
}

#[derive(Clone, Debug)]
struct SavedNode {
    id: NodeId,
    // `None` for the originating node.
    children: Option<Vec<NodeId>>,
    flags: NodeFlags,
}

impl CollapsedSection {
    /// The node whose selection triggered the collapse. It is the placeholder's child.
    pub fn originating_node(&self) -> NodeId {
        self.originating
    }

    /// The node whose children the placeholder replaced.
    pub fn anchor_node(&self) -> NodeId {
        self.anchor
    }

    /// True if the anchor sits directly under another placeholder.
    pub fn triggered_from_previous_collapsed_section(&self) -> bool {
        self.triggered_from_previous
    }

    /// Nodes of the anchor subtree as recorded before the collapse, in pre-order.
    pub fn original_anchor_subtree(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.saved_ids().filter(|id| *id != self.anchor)
    }

    pub(crate) fn saved_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.saved.iter().map(|s| s.id)
    }
}

impl<T, L: VisibilityListener> Tree<T, L> {
    /// Create a detached placeholder for collapsing the chain above `originating`.
    ///
    /// Panics if `originating` is detached or is itself the anchor (a node directly
    /// under the root or under a placeholder has no chain to collapse).
    pub fn new_collapsed_section(&mut self, originating: NodeId) -> NodeId {
        let anchor = self
            .collapsed_anchor_node(originating)
            .expect("originating node must be attached");
        assert_ne!(
            anchor, originating,
            "{originating:?} has no chain above it to collapse"
        );
        let triggered_from_previous = self
            .parent(anchor)
            .is_some_and(|p| matches!(self.kind(p), NodeKind::CollapsedSection(_)));

        let mut saved = Vec::new();
        let mut stack = vec![anchor];
        while let Some(id) = stack.pop() {
            let node = self.node(id);
            if id == originating {
                saved.push(SavedNode {
                    id,
                    children: None,
                    flags: node.flags,
                });
                continue;
            }
            saved.push(SavedNode {
                id,
                children: Some(node.children.clone()),
                flags: node.flags,
            });
            stack.extend(node.children.iter().rev().copied());
        }

        let section = CollapsedSection {
            originating,
            anchor,
            triggered_from_previous,
            saved,
        };
        let id = self.alloc(NodeKind::CollapsedSection(section), NodeFlags::empty());
        debug!(
            "new collapsed section {id:?} for {originating:?} (anchor {anchor:?}, nested: {triggered_from_previous})"
        );
        id
    }

    /// The placeholder state of `id`, if it is a collapsed section.
    pub fn collapsed_section(&self, id: NodeId) -> Option<&CollapsedSection> {
        match self.kind(id) {
            NodeKind::CollapsedSection(section) => Some(section),
            _ => None,
        }
    }

    /// Rows the collapse removes from display: every displayed descendant of the anchor.
    ///
    /// The anchor's own row is kept. Empty if the anchor is not displayed.
    pub fn indices_to_be_hidden(&self, section: NodeId) -> Range<usize> {
        let anchor = self.expect_section(section).anchor;
        match self.visible_traversal_index(anchor) {
            Some(row) => row + 1..row + 1 + self.visible_traversal_count(anchor),
            None => 0..0,
        }
    }

    /// Nodes displayed in [`Tree::indices_to_be_hidden`], in row order.
    pub fn nodes_to_be_hidden(&self, section: NodeId) -> Vec<NodeId> {
        self.indices_to_be_hidden(section)
            .filter_map(|row| self.node_at_visible_index(row))
            .collect()
    }

    /// Swap the anchor's children for the placeholder and move the originating node under it.
    ///
    /// The placeholder, the originating node and the originating node's children
    /// are made visible. Returns the rows now displayed by the placeholder and its
    /// descendants (placeholder first).
    pub fn insert_collapsed_section(&mut self, section: NodeId) -> Vec<usize> {
        let (anchor, originating) = {
            let s = self.expect_section(section);
            (s.anchor, s.originating)
        };
        assert!(
            self.parent(section).is_none(),
            "{section:?} is already in the tree"
        );
        let detached = self.replace_children(anchor, vec![section]);
        if let Some(p) = self.parent(originating) {
            self.unlink(originating, p);
        }
        self.add_child(section, originating, None);
        self.set_visible(section, true);
        self.set_visible(originating, true);
        let children = self.children(originating).to_vec();
        for c in children {
            self.set_visible(c, true);
        }
        debug!(
            "collapsed {} node(s) under {anchor:?} into {section:?}",
            detached.len()
        );
        match self.visible_traversal_index(section) {
            Some(row) => (row..=row + self.visible_traversal_count(section)).collect(),
            None => Vec::new(),
        }
    }

    /// Rows displayed by the placeholder and its descendants; removed on restore.
    pub fn indices_for_containing_nodes(&self, section: NodeId) -> Range<usize> {
        self.expect_section(section);
        match self.visible_traversal_index(section) {
            Some(row) => row..row + 1 + self.visible_traversal_count(section),
            None => 0..0,
        }
    }

    /// Put the recorded anchor subtree back and free the placeholder.
    ///
    /// Selection and action markers added to a recorded node while collapsed are
    /// kept in front of the restored children. Returns the rows of the anchor's
    /// displayed descendants after the restore.
    pub fn restore_collapsed_section(&mut self, section: NodeId) -> Vec<usize> {
        let saved = self.expect_section(section).clone();
        let anchor = saved.anchor;
        self.set_visible(section, false);
        let originating_alive = self.is_alive(saved.originating);
        if originating_alive && self.parent(saved.originating) == Some(section) {
            self.unlink(saved.originating, section);
        }
        if let Some(p) = self.parent(section) {
            self.unlink(section, p);
        }

        for entry in &saved.saved {
            let Some(children) = &entry.children else {
                continue;
            };
            if !self.is_alive(entry.id) {
                continue;
            }
            let current = core::mem::take(&mut self.node_mut(entry.id).children);
            let mut relinked = Vec::with_capacity(children.len());
            for c in current {
                if self.kind(c).is_marker() && !children.contains(&c) {
                    relinked.push(c);
                } else {
                    self.node_mut(c).parent = None;
                }
            }
            relinked.extend(children.iter().copied().filter(|c| self.is_alive(*c)));
            for c in relinked {
                if let Some(p) = self.parent(c).filter(|p| *p != entry.id) {
                    self.unlink(c, p);
                }
                self.link(entry.id, c, None);
            }
        }
        self.invalidate();

        for entry in &saved.saved {
            if entry.id == anchor || entry.children.is_none() || !self.is_alive(entry.id) {
                continue;
            }
            let overrides = NodeFlags::CHILDREN_SHOWN | NodeFlags::CHILDREN_HIDDEN;
            let flags = &mut self.node_mut(entry.id).flags;
            flags.remove(overrides);
            flags.insert(entry.flags & overrides);
            self.set_visible(entry.id, entry.flags.contains(NodeFlags::VISIBLE));
        }

        // The chain leading to the originating node is shown again, unless it was removed.
        let root = self.root();
        let mut cur = if originating_alive {
            self.parent(saved.originating)
        } else {
            None
        };
        while let Some(p) = cur.filter(|p| *p != anchor && *p != root) {
            self.set_visible(p, true);
            cur = self.parent(p);
        }

        self.remove(section);
        debug!("restored {section:?} under {anchor:?}");
        match self.visible_traversal_index(anchor) {
            Some(row) => (row + 1..=row + self.visible_traversal_count(anchor)).collect(),
            None => Vec::new(),
        }
    }

    fn expect_section(&self, id: NodeId) -> &CollapsedSection {
        match self.kind(id) {
            NodeKind::CollapsedSection(section) => section,
            other => panic!("{id:?} is a {} node, not a collapsed section", other.label()),
        }
    }
}
