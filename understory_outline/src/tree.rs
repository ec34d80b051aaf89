// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, visibility, traversal and positional queries.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::OnceCell;
use core::fmt::Write as _;

use log::trace;

use crate::types::{
    NoListener, NodeFlags, NodeId, NodeKind, VisibilityListener, VisibilitySnapshot, VisibleRow,
};

/// Ordered tree of nodes with a visibility-aware projection onto list rows.
///
/// The tree owns every node in an arena and hands out generational [`NodeId`]s.
/// Parents own their children; a child only keeps a back-reference to its parent.
///
/// `L` receives every visibility flip; see [`VisibilityListener`].
pub struct Tree<T, L = NoListener> {
    nodes: Vec<Option<Node<T>>>, // slots
    generations: Vec<u32>,       // last generation per slot (persists across frees)
    free_list: Vec<usize>,
    root: NodeId,
    rows: OnceCell<Vec<VisibleRow>>,
    cache_enabled: bool,
    listener: L,
}

impl<T, L> core::fmt::Debug for Tree<T, L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        let free = self.free_list.len();
        f.debug_struct("Tree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &free)
            .field("cache_enabled", &self.cache_enabled)
            .field("rows_cached", &self.rows.get().map(Vec::len))
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    generation: u32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind<T>,
    pub(crate) flags: NodeFlags,
    snapshot: VisibilitySnapshot,
}

impl<T> Node<T> {
    fn new(generation: u32, kind: NodeKind<T>, flags: NodeFlags) -> Self {
        Self {
            generation,
            parent: None,
            children: Vec::new(),
            kind,
            flags,
            snapshot: VisibilitySnapshot::default(),
        }
    }
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    /// Create a tree holding only its root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::new(1, NodeKind::Root, NodeFlags::empty()))],
            generations: vec![1],
            free_list: Vec::new(),
            root: NodeId::new(0, 1),
            rows: OnceCell::new(),
            cache_enabled: true,
            listener: NoListener,
        }
    }
}

impl<T, L: VisibilityListener> Tree<T, L> {
    /// Attach a new visibility listener, returning the re-typed tree.
    pub fn with_listener<M: VisibilityListener>(self, listener: M) -> Tree<T, M> {
        Tree {
            nodes: self.nodes,
            generations: self.generations,
            free_list: self.free_list,
            root: self.root,
            rows: self.rows,
            cache_enabled: self.cache_enabled,
            listener,
        }
    }

    /// The attached listener.
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// The attached listener, mutably.
    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// The root node. It is never displayed; its visible descendants are the rows.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns true if `id` refers to a live (possibly detached) node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.idx())
            .and_then(|n| n.as_ref())
            .map(|n| n.generation == id.1)
            .unwrap_or(false)
    }

    /// Enable or disable memoization of the visible traversal.
    ///
    /// While disabled every positional query walks the tree again.
    pub fn set_cache_enabled(&mut self, enabled: bool) {
        self.cache_enabled = enabled;
        self.invalidate();
    }

    /// Whether the visible traversal is memoized.
    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled
    }

    // --- structure ---

    /// Create a hidden node of the given kind, appended to `parent` (or detached if `None`).
    pub fn insert(&mut self, parent: Option<NodeId>, kind: NodeKind<T>) -> NodeId {
        assert!(
            !matches!(kind, NodeKind::Root),
            "a tree has exactly one root"
        );
        let id = self.alloc(kind, NodeFlags::empty());
        if let Some(p) = parent {
            self.add_child(p, id, None);
        }
        id
    }

    /// Insert `child` into `parent`'s children at `at` (append when `None`).
    ///
    /// A child that already has a parent is detached from it first. Indices past
    /// the end append.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId, at: Option<usize>) {
        assert!(
            !self.is_ancestor_or_self(child, parent),
            "cannot add {child:?} beneath itself"
        );
        if let Some(old) = self.node(child).parent {
            self.unlink(child, old);
        }
        self.link(parent, child, at);
        trace!("added {child:?} to {parent:?} at {at:?}");
        self.invalidate();
    }

    /// Remove `child` from `parent`'s children. Not an error if it is not there.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if self.node(child).parent == Some(parent) {
            self.unlink(child, parent);
            trace!("removed {child:?} from {parent:?}");
            self.invalidate();
        }
    }

    /// Hide `id`, then detach it from its parent. No-op for a detached node.
    ///
    /// The node stays alive; use [`Tree::remove`] to free it.
    pub fn remove_from_parent(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        self.set_visible(id, false);
        self.remove_child(parent, id);
    }

    /// Replace all of `parent`'s children, returning the previous ones (now detached).
    pub fn replace_children(&mut self, parent: NodeId, children: Vec<NodeId>) -> Vec<NodeId> {
        let old = core::mem::take(&mut self.node_mut(parent).children);
        for &c in &old {
            self.node_mut(c).parent = None;
        }
        for c in children {
            self.add_child(parent, c, None);
        }
        self.invalidate();
        old
    }

    /// Detach and free a node and its subtree. Stale ids are ignored.
    pub fn remove(&mut self, id: NodeId) {
        if !self.is_alive(id) {
            return;
        }
        assert_ne!(id, self.root, "the root cannot be removed");
        self.remove_from_parent(id);
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            let Some(node) = self.nodes[n.idx()].take() else {
                continue;
            };
            stack.extend(node.children);
            // A placeholder owns the chain it replaced.
            if let NodeKind::CollapsedSection(section) = node.kind {
                stack.extend(
                    section
                        .saved_ids()
                        .filter(|s| *s != section.anchor_node())
                        .filter(|s| self.is_alive(*s) && self.node(*s).parent.is_none()),
                );
            }
            self.free_list.push(n.idx());
        }
        trace!("freed {id:?}");
        self.invalidate();
    }

    /// Parent of `id`, if attached.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Ordered children of `id`.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// What `id` stands for.
    pub fn kind(&self, id: NodeId) -> &NodeKind<T> {
        &self.node(id).kind
    }

    /// Application content of a plain node.
    pub fn content(&self, id: NodeId) -> Option<&T> {
        self.node(id).kind.content()
    }

    /// Application content of a plain node, mutably.
    pub fn content_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.node_mut(id).kind.content_mut()
    }

    /// Display flags of `id`.
    pub fn flags(&self, id: NodeId) -> NodeFlags {
        self.node(id).flags
    }

    /// True if `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = self.node(node).parent;
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.node(p).parent;
        }
        false
    }

    /// True if any child of `id` is a [`NodeKind::Plain`] node.
    pub fn has_plain_children(&self, id: NodeId) -> bool {
        self.node(id)
            .children
            .iter()
            .any(|c| matches!(self.node(*c).kind, NodeKind::Plain(_)))
    }

    /// Number of nodes attached under the root, displayed or not.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = self.node(self.root).children.clone();
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend_from_slice(&self.node(id).children);
        }
        count
    }

    /// Path from the top-level ancestor of `id` down to `id` (inclusive).
    ///
    /// The root is not part of the path.
    pub fn path_from_root(&self, mut id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        while id != self.root {
            out.push(id);
            match self.node(id).parent {
                Some(p) => id = p,
                None => break,
            }
        }
        out.reverse();
        out
    }

    // --- visibility ---

    /// Whether `id`'s own [`NodeFlags::VISIBLE`] bit is set.
    ///
    /// A node is only displayed if it and every ancestor below the root are visible;
    /// see [`Tree::visible_traversal_index`].
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.node(id).flags.contains(NodeFlags::VISIBLE)
    }

    /// Assign `id`'s visibility.
    ///
    /// The node's rows are captured into its [`VisibilitySnapshot`] before the
    /// new value is applied. If the value changes, the listener is notified.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        assert_ne!(id, self.root, "the root is never displayed");
        let snapshot = self.capture_snapshot(id);
        let node = self.node_mut(id);
        node.snapshot = snapshot;
        if node.flags.contains(NodeFlags::VISIBLE) == visible {
            return;
        }
        node.flags.set(NodeFlags::VISIBLE, visible);
        self.invalidate();
        trace!("{id:?} visible = {visible}");
        self.listener.visibility_changed(id, visible);
    }

    /// Rows of `id` captured by its last visibility assignment.
    pub fn visibility_snapshot(&self, id: NodeId) -> &VisibilitySnapshot {
        &self.node(id).snapshot
    }

    /// Force [`Tree::is_children_visible`] to report `value`, or clear the override with `None`.
    pub fn set_children_visible_override(&mut self, id: NodeId, value: Option<bool>) {
        let flags = &mut self.node_mut(id).flags;
        flags.remove(NodeFlags::CHILDREN_SHOWN | NodeFlags::CHILDREN_HIDDEN);
        match value {
            Some(true) => flags.insert(NodeFlags::CHILDREN_SHOWN),
            Some(false) => flags.insert(NodeFlags::CHILDREN_HIDDEN),
            None => {}
        }
    }

    /// Whether `id` currently shows its children.
    ///
    /// Decided by the first child that is not a selection or action marker,
    /// unless an override is set. A node without such a child reports `false`.
    pub fn is_children_visible(&self, id: NodeId) -> bool {
        let node = self.node(id);
        if node.flags.contains(NodeFlags::CHILDREN_SHOWN) {
            return true;
        }
        if node.flags.contains(NodeFlags::CHILDREN_HIDDEN) {
            return false;
        }
        node.children
            .iter()
            .find(|c| !self.node(**c).kind.is_marker())
            .is_some_and(|c| self.is_visible(*c))
    }

    // --- positional queries ---

    /// Row of `id` in the visible traversal from the root.
    ///
    /// Returns `None` for the root, for detached nodes, and when `id` or any
    /// ancestor below the root is hidden.
    pub fn visible_traversal_index(&self, id: NodeId) -> Option<usize> {
        if !self.is_displayed(id) {
            return None;
        }
        self.with_rows(|rows| rows.iter().position(|r| r.node == id))
    }

    /// Number of rows in the visible traversal below `id` (excluding `id` itself).
    pub fn visible_traversal_count(&self, id: NodeId) -> usize {
        if id == self.root {
            return self.with_rows(<[VisibleRow]>::len);
        }
        let mut count = 0;
        let mut stack = Vec::new();
        self.push_visible_children(id, 0, &mut stack);
        while let Some((n, _)) = stack.pop() {
            count += 1;
            self.push_visible_children(n, 0, &mut stack);
        }
        count
    }

    /// Node displayed at `row`, or `None` past the end.
    pub fn node_at_visible_index(&self, row: usize) -> Option<NodeId> {
        self.with_rows(|rows| rows.get(row).map(|r| r.node))
    }

    /// Number of rows the tree currently projects.
    pub fn row_count(&self) -> usize {
        self.visible_traversal_count(self.root)
    }

    /// The full visible traversal, one entry per row.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        self.with_rows(<[VisibleRow]>::to_vec)
    }

    /// Rows of `id`'s displayed descendants.
    pub fn visible_descendant_indices(&self, id: NodeId) -> Vec<usize> {
        match self.visible_traversal_index(id) {
            Some(row) => (row + 1..=row + self.visible_traversal_count(id)).collect(),
            None => Vec::new(),
        }
    }

    /// Number of ancestors of `id` up to the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cur = self.node(id).parent;
        while let Some(p) = cur {
            depth += 1;
            cur = self.node(p).parent;
        }
        depth
    }

    /// Number of ancestors strictly between `id` and the nearest boundary.
    ///
    /// The boundary is the nearest collapsed-section ancestor, or the root.
    /// Top-level nodes and nodes directly under a placeholder report `0`.
    pub fn collapsed_depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cur = self.node(id).parent;
        while let Some(p) = cur {
            if p == self.root || matches!(self.node(p).kind, NodeKind::CollapsedSection(_)) {
                break;
            }
            depth += 1;
            cur = self.node(p).parent;
        }
        depth
    }

    /// Top-level ancestor of `id` (the ancestor directly under the root), or `id` itself.
    pub fn anchor_node(&self, id: NodeId) -> Option<NodeId> {
        self.find_anchor(id, |_| false)
    }

    /// Like [`Tree::anchor_node`], but stops below the nearest collapsed-section ancestor.
    pub fn collapsed_anchor_node(&self, id: NodeId) -> Option<NodeId> {
        self.find_anchor(id, |kind| matches!(kind, NodeKind::CollapsedSection(_)))
    }

    fn find_anchor(&self, mut id: NodeId, boundary: impl Fn(&NodeKind<T>) -> bool) -> Option<NodeId> {
        if id == self.root {
            return None;
        }
        loop {
            let parent = self.node(id).parent?;
            if parent == self.root || boundary(&self.node(parent).kind) {
                return Some(id);
            }
            id = parent;
        }
    }

    // --- internals ---

    /// Access a node; panics if `id` is stale.
    pub(crate) fn node(&self, id: NodeId) -> &Node<T> {
        match self.nodes.get(id.idx()) {
            Some(Some(n)) if n.generation == id.1 => n,
            _ => panic!("dangling NodeId {id:?}"),
        }
    }

    /// Access a node mutably; panics if `id` is stale.
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        match self.nodes.get_mut(id.idx()) {
            Some(Some(n)) if n.generation == id.1 => n,
            _ => panic!("dangling NodeId {id:?}"),
        }
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind<T>, flags: NodeFlags) -> NodeId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node::new(generation, kind, flags));
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId slots are 32-bit; the arena never grows past u32::MAX."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node::new(generation, kind, flags)));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "NodeId slots are 32-bit; the arena never grows past u32::MAX."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        NodeId::new(idx, generation)
    }

    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId, at: Option<usize>) {
        let children = &mut self.node_mut(parent).children;
        let at = at.map_or(children.len(), |i| i.min(children.len()));
        children.insert(at, child);
        self.node_mut(child).parent = Some(parent);
    }

    pub(crate) fn unlink(&mut self, child: NodeId, parent: NodeId) {
        let children = &mut self.node_mut(parent).children;
        if let Some(pos) = children.iter().position(|c| *c == child) {
            children.remove(pos);
        }
        self.node_mut(child).parent = None;
    }

    pub(crate) fn invalidate(&mut self) {
        self.rows.take();
    }

    fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.is_ancestor(ancestor, node)
    }

    /// True if `id` and every ancestor below the root are visible, and `id` hangs off the root.
    fn is_displayed(&self, mut id: NodeId) -> bool {
        loop {
            let node = self.node(id);
            if id == self.root || !node.flags.contains(NodeFlags::VISIBLE) {
                return false;
            }
            match node.parent {
                Some(p) if p == self.root => return true,
                Some(p) => id = p,
                None => return false,
            }
        }
    }

    fn capture_snapshot(&self, id: NodeId) -> VisibilitySnapshot {
        let Some(index) = self.visible_traversal_index(id) else {
            return VisibilitySnapshot::default();
        };
        let count = self.visible_traversal_count(id);
        VisibilitySnapshot {
            index: Some(index),
            children: (index + 1..=index + count).collect(),
        }
    }

    fn with_rows<R>(&self, f: impl FnOnce(&[VisibleRow]) -> R) -> R {
        if self.cache_enabled {
            f(self.rows.get_or_init(|| self.collect_rows()))
        } else {
            f(&self.collect_rows())
        }
    }

    fn collect_rows(&self) -> Vec<VisibleRow> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        self.push_visible_children(self.root, 1, &mut stack);
        while let Some((node, depth)) = stack.pop() {
            out.push(VisibleRow { node, depth });
            self.push_visible_children(node, depth + 1, &mut stack);
        }
        out
    }

    fn push_visible_children(&self, id: NodeId, depth: usize, stack: &mut Vec<(NodeId, usize)>) {
        for &c in self.node(id).children.iter().rev() {
            if self.node(c).flags.contains(NodeFlags::VISIBLE) {
                stack.push((c, depth));
            }
        }
    }
}

impl<T: Clone, L: VisibilityListener> Tree<T, L> {
    /// Copy `id` and its subtree into fresh, detached nodes and return the copy's id.
    ///
    /// Kinds, flags and child order are copied. Collapsed-section placeholders are
    /// not: their children are copied in their place.
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        let (kind, flags, children) = {
            let n = self.node(id);
            (n.kind.clone(), n.flags, n.children.clone())
        };
        assert!(
            !matches!(kind, NodeKind::Root | NodeKind::CollapsedSection(_)),
            "cannot copy {} node {id:?}",
            kind.label()
        );
        let copy = self.alloc(kind, flags);
        let mut stack: Vec<(NodeId, NodeId)> = children.into_iter().rev().map(|c| (c, copy)).collect();
        while let Some((src, parent)) = stack.pop() {
            let (kind, flags, children) = {
                let n = self.node(src);
                (n.kind.clone(), n.flags, n.children.clone())
            };
            let target = if matches!(kind, NodeKind::CollapsedSection(_)) {
                parent
            } else {
                let c = self.alloc(kind, flags);
                self.link(parent, c, None);
                c
            };
            stack.extend(children.into_iter().rev().map(|c| (c, target)));
        }
        copy
    }
}

impl<T: core::fmt::Debug, L: VisibilityListener> Tree<T, L> {
    /// Render the attached nodes as an indented outline, one line per node.
    ///
    /// `+` marks visible nodes and `-` hidden ones.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<(NodeId, usize)> =
            self.children(self.root).iter().rev().map(|c| (*c, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            let node = self.node(id);
            for _ in 0..depth {
                out.push_str("  ");
            }
            let marker = if node.flags.contains(NodeFlags::VISIBLE) {
                '+'
            } else {
                '-'
            };
            let _ = match &node.kind {
                NodeKind::Plain(content) => writeln!(out, "{marker} {content:?}"),
                other => writeln!(out, "{marker} <{}>", other.label()),
            };
            stack.extend(node.children.iter().rev().map(|c| (*c, depth + 1)));
        }
        out
    }
}
