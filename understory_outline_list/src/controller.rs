// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The list controller: user interaction on one side, row updates on the other.

use kurbo::Point;
use log::{debug, trace};
use understory_outline::{NodeId, NodeKind, Tree, VisibilityListener};

use crate::config::ControllerConfig;
use crate::driver::{CellProvider, ListDriver, RowContext};
use crate::layout::RowLayout;
use crate::transaction::{RowUpdate, Transaction};

const NO_TREE: &str = "no tree attached to the list controller";

/// Result of tapping a row.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TapOutcome {
    /// The node's children were shown and the node selected.
    Expanded,
    /// The node's children were hidden and the selection cleared.
    Collapsed,
    /// A leaf was selected.
    Selected,
    /// The selected leaf was deselected.
    Deselected,
    /// The chain above the node was folded into a collapsed section.
    SectionCollapsed,
    /// A collapsed section was expanded back into its chain.
    SectionRestored,
    /// Nothing happened (a marker row, or no row under the point).
    Ignored,
}

/// Result of triggering the action affordance on a row.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    /// An action row now sits under the node.
    Shown,
    /// The node's action row was removed.
    Hidden,
    /// The row cannot carry an action.
    Ignored,
}

/// The synthetic markers the controller owns.
#[derive(Copy, Clone, Debug, Default)]
struct Marks {
    selection: Option<NodeId>,
    action: Option<NodeId>,
}

impl Marks {
    fn clear_selection<T, L: VisibilityListener>(&mut self, tree: &mut Tree<T, L>) {
        if let Some(selection) = self.selection.take() {
            tree.remove(selection);
        }
    }

    fn select<T, L: VisibilityListener>(&mut self, tree: &mut Tree<T, L>, node: NodeId) {
        self.clear_selection(tree);
        self.selection = Some(insert_marker(tree, node, NodeKind::Selection));
    }

    fn clear_action<T, L: VisibilityListener>(&mut self, tree: &mut Tree<T, L>) {
        if let Some(action) = self.action.take() {
            tree.remove(action);
        }
    }

    fn set_action<T, L: VisibilityListener>(&mut self, tree: &mut Tree<T, L>, node: NodeId) {
        self.clear_action(tree);
        self.action = Some(insert_marker(tree, node, NodeKind::Action));
    }
}

fn insert_marker<T, L: VisibilityListener>(
    tree: &mut Tree<T, L>,
    node: NodeId,
    kind: NodeKind<T>,
) -> NodeId {
    let marker = tree.insert(None, kind);
    tree.add_child(node, marker, Some(0));
    tree.set_visible(marker, true);
    marker
}

fn set_children_visible<T, L: VisibilityListener>(
    tree: &mut Tree<T, L>,
    node: NodeId,
    visible: bool,
) {
    let children = tree.children(node).to_vec();
    for child in children {
        if !tree.kind(child).is_marker() {
            tree.set_visible(child, visible);
        }
    }
}

/// Owns an outline tree and keeps a [`ListDriver`] in sync with its rows.
///
/// Every mutation runs inside a visibility [`Transaction`]; the resulting
/// [`RowUpdate`] is pushed to the driver, after which the driver's row count
/// must equal the tree's. A mismatch means the driver and the tree disagree on
/// what is displayed, which is unrecoverable, so it panics.
///
/// Panics if an interaction is attempted before [`ListController::set_tree`].
pub struct ListController<T, D: ListDriver> {
    tree: Option<Tree<T, Transaction>>,
    driver: D,
    config: ControllerConfig,
    marks: Marks,
    suppress_updates: bool,
}

impl<T, D: ListDriver + core::fmt::Debug> core::fmt::Debug for ListController<T, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListController")
            .field("rows", &self.tree.as_ref().map(Tree::row_count))
            .field("driver", &self.driver)
            .field("config", &self.config)
            .field("selection", &self.marks.selection)
            .field("action", &self.marks.action)
            .field("suppress_updates", &self.suppress_updates)
            .finish_non_exhaustive()
    }
}

impl<T, D: ListDriver> ListController<T, D> {
    /// A controller without a tree.
    pub fn new(driver: D, config: ControllerConfig) -> Self {
        Self {
            tree: None,
            driver,
            config,
            marks: Marks::default(),
            suppress_updates: false,
        }
    }

    /// Take ownership of `tree` and reload the driver from it.
    ///
    /// Any previously attached tree is dropped. Selection and action state is reset.
    pub fn set_tree<L: VisibilityListener>(&mut self, tree: Tree<T, L>) {
        let mut tree = tree.with_listener(Transaction::new());
        tree.set_cache_enabled(true);
        let rows = tree.row_count();
        self.tree = Some(tree);
        self.marks = Marks::default();
        debug!("attached tree with {rows} row(s)");
        self.driver.reload_all(rows);
        self.check_row_count();
    }

    /// Give the tree back, detaching it from the controller.
    pub fn take_tree(&mut self) -> Option<Tree<T>> {
        self.marks = Marks::default();
        self.tree
            .take()
            .map(|tree| tree.with_listener(understory_outline::NoListener))
    }

    /// The attached tree. Panics if none is attached.
    pub fn tree(&self) -> &Tree<T, Transaction> {
        self.tree.as_ref().expect(NO_TREE)
    }

    /// Whether a tree is attached.
    pub fn has_tree(&self) -> bool {
        self.tree.is_some()
    }

    /// The driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// The driver, mutably.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// The configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// The selection marker row's node, if any.
    pub fn selection(&self) -> Option<NodeId> {
        self.marks.selection
    }

    /// The node the selection marker belongs to, if any.
    pub fn selected_node(&self) -> Option<NodeId> {
        let tree = self.tree();
        let selection = self.marks.selection.filter(|s| tree.is_alive(*s))?;
        tree.parent(selection)
    }

    /// The action marker row's node, if any.
    pub fn action(&self) -> Option<NodeId> {
        self.marks.action
    }

    /// Number of rows in the list.
    pub fn row_count(&self) -> usize {
        self.tree().row_count()
    }

    /// Node displayed at `row`. Panics if `row` is out of range.
    pub fn node_at_row(&self, row: usize) -> NodeId {
        let tree = self.tree();
        tree.node_at_visible_index(row).unwrap_or_else(|| {
            panic!("row {row} is out of range ({} rows)", tree.row_count())
        })
    }

    /// Ask `provider` for the cell of `row`. Panics if `row` is out of range.
    pub fn cell_for_row<P: CellProvider<T>>(&self, row: usize, provider: &mut P) -> P::Cell {
        let node = self.node_at_row(row);
        let tree = self.tree();
        let context = RowContext {
            node,
            row,
            depth: tree.depth(node),
            collapsed_depth: tree.collapsed_depth(node),
            kind: tree.kind(node),
            children_visible: tree.is_children_visible(node),
        };
        provider.cell(&context)
    }

    /// Run `body` as one visibility transaction and push the resulting update.
    ///
    /// The traversal cache is off while `body` runs. Returns `body`'s result and
    /// the update that was sent to the driver.
    pub fn transaction<R>(
        &mut self,
        body: impl FnOnce(&mut Tree<T, Transaction>) -> R,
    ) -> (R, RowUpdate) {
        self.apply(|tree, _| body(tree))
    }

    /// React to a tap on `row`. Panics if `row` is out of range.
    ///
    /// - A collapsed section placeholder is restored.
    /// - Selection and action rows are ignored.
    /// - A node with hidden children whose collapsed depth exceeds
    ///   [`ControllerConfig::collapsed_section_depth`] folds the chain above it
    ///   into a collapsed section, then shows its children and takes the selection.
    /// - A node showing its children hides them and drops the selection. So does
    ///   a selected leaf.
    /// - Any other node shows its children and takes the selection.
    pub fn on_row_tapped(&mut self, row: usize) -> TapOutcome {
        let node = self.node_at_row(row);
        trace!("tapped row {row} ({node:?})");
        let kind = self.tree().kind(node);
        if matches!(kind, NodeKind::CollapsedSection(_)) {
            self.restore_section(node);
            return TapOutcome::SectionRestored;
        }
        if !matches!(kind, NodeKind::Plain(_)) {
            return TapOutcome::Ignored;
        }
        if self.is_collapse_eligible(node) {
            self.collapse_above(node);
            return TapOutcome::SectionCollapsed;
        }
        self.toggle(node)
    }

    /// Tap whatever row is under `point`, in content coordinates.
    pub fn on_point_tapped(&mut self, point: Point, layout: &RowLayout) -> TapOutcome {
        match layout.row_at(point, self.row_count()) {
            Some(row) => self.on_row_tapped(row),
            None => TapOutcome::Ignored,
        }
    }

    /// Put the action row under the node at `row`, replacing any other one.
    ///
    /// Triggering the node that already carries the action row removes it.
    /// Panics if `row` is out of range.
    pub fn on_action_triggered(&mut self, row: usize) -> ActionOutcome {
        let node = self.node_at_row(row);
        let tree = self.tree();
        if !matches!(tree.kind(node), NodeKind::Plain(_)) {
            return ActionOutcome::Ignored;
        }
        let toggling_off = self.marks.action.is_some_and(|a| {
            tree.is_alive(a)
                && tree.parent(a) == Some(node)
                && tree.visible_traversal_index(a).is_some()
        });
        self.apply(|tree, marks| {
            marks.clear_action(tree);
            if !toggling_off {
                marks.set_action(tree, node);
            }
        });
        if toggling_off {
            ActionOutcome::Hidden
        } else {
            ActionOutcome::Shown
        }
    }

    /// Reveal and select `target`, then scroll to it.
    ///
    /// Replays taps along the path from the top level down to `target`, so deep
    /// chains collapse exactly as if the user had tapped through them. The
    /// intermediate updates are not sent to the driver; it is reloaded once at
    /// the end. Panics if `target` is not attached to the tree.
    pub fn zoom_to(&mut self, target: NodeId) {
        let tree = self.tree();
        let path = tree.path_from_root(target);
        assert!(
            path.first()
                .is_some_and(|top| tree.parent(*top) == Some(tree.root())),
            "{target:?} is not attached to the tree"
        );

        self.suppress_updates = true;
        for &node in &path {
            let last = node == target;
            let tree = self.tree();
            if tree.is_children_visible(node) {
                if last && self.selected_node() != Some(node) {
                    self.apply(|tree, marks| marks.select(tree, node));
                }
                continue;
            }
            let Some(row) = tree.visible_traversal_index(node) else {
                debug!("cannot reveal {target:?}: {node:?} has no row");
                break;
            };
            if last && self.selected_node() == Some(node) {
                break;
            }
            self.on_row_tapped(row);
        }
        self.suppress_updates = false;

        let rows = self.tree().row_count();
        debug!("zoomed to {target:?}; reloading {rows} row(s)");
        self.driver.reload_all(rows);
        self.check_row_count();
        if let Some(row) = self.tree().visible_traversal_index(target) {
            self.driver.scroll_to(row);
        }
    }

    fn is_collapse_eligible(&self, node: NodeId) -> bool {
        let tree = self.tree();
        !tree.is_children_visible(node)
            && tree.collapsed_depth(node) > self.config.collapsed_section_depth
            && tree.has_plain_children(node)
    }

    fn collapse_above(&mut self, node: NodeId) {
        let (rows, _) = self.apply(|tree, marks| {
            marks.clear_selection(tree);
            if let Some(action) = marks.action {
                let detached_with_chain = tree
                    .collapsed_anchor_node(node)
                    .is_some_and(|anchor| tree.is_ancestor(anchor, action))
                    && !tree.is_ancestor(node, action);
                if detached_with_chain {
                    marks.clear_action(tree);
                }
            }
            let section = tree.new_collapsed_section(node);
            for hidden in tree.nodes_to_be_hidden(section) {
                tree.set_visible(hidden, false);
            }
            marks.select(tree, node);
            tree.insert_collapsed_section(section)
        });
        debug!("collapsed section above {node:?} now spans rows {rows:?}");
    }

    fn restore_section(&mut self, section: NodeId) {
        let (rows, _) = self.apply(|tree, _| tree.restore_collapsed_section(section));
        debug!("restored {section:?}; rows {rows:?} shown");
    }

    fn toggle(&mut self, node: NodeId) -> TapOutcome {
        let tree = self.tree();
        let shown = tree.is_children_visible(node);
        let has_children = tree.has_plain_children(node);
        let owns_selection = self.selected_node() == Some(node);

        if shown || (owns_selection && !has_children) {
            self.apply(|tree, marks| {
                marks.clear_selection(tree);
                // Folding a node dismisses its action row.
                if marks
                    .action
                    .is_some_and(|a| tree.is_alive(a) && tree.parent(a) == Some(node))
                {
                    marks.clear_action(tree);
                }
                set_children_visible(tree, node, false);
            });
            if shown {
                TapOutcome::Collapsed
            } else {
                TapOutcome::Deselected
            }
        } else {
            self.apply(|tree, marks| {
                marks.clear_selection(tree);
                set_children_visible(tree, node, true);
                marks.select(tree, node);
            });
            if has_children {
                TapOutcome::Expanded
            } else {
                TapOutcome::Selected
            }
        }
    }

    fn apply<R>(
        &mut self,
        body: impl FnOnce(&mut Tree<T, Transaction>, &mut Marks) -> R,
    ) -> (R, RowUpdate) {
        let tree = self.tree.as_mut().expect(NO_TREE);
        let before = tree.visible_rows();
        tree.listener_mut().begin(before);
        tree.set_cache_enabled(false);
        let out = body(tree, &mut self.marks);
        tree.set_cache_enabled(true);
        let after = tree.visible_rows();
        let update = tree.listener_mut().finish(&after);
        self.push_update(&update);
        (out, update)
    }

    fn push_update(&mut self, update: &RowUpdate) {
        if self.suppress_updates {
            return;
        }
        match update {
            RowUpdate::Reload => {
                let rows = self.tree().row_count();
                self.driver.reload_all(rows);
            }
            RowUpdate::Batch(batch) if batch.is_empty() => {}
            RowUpdate::Batch(batch) => {
                trace!(
                    "row batch: -{:?} +{:?}",
                    batch.deleted, batch.inserted
                );
                self.driver.begin_updates();
                if !batch.deleted.is_empty() {
                    self.driver
                        .delete_rows(&batch.deleted, self.config.delete_animation);
                }
                if !batch.inserted.is_empty() {
                    self.driver
                        .insert_rows(&batch.inserted, self.config.insert_animation);
                }
                self.driver.end_updates();
            }
        }
        self.check_row_count();
    }

    fn check_row_count(&self) {
        let expected = self.tree().row_count();
        let actual = self.driver.row_count();
        assert_eq!(
            actual, expected,
            "list view reports {actual} rows but the tree projects {expected}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::RowAnimation;
    use alloc::vec;
    use alloc::vec::Vec;
    use understory_outline::NodeFlags;

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Call {
        Reload(usize),
        Delete(Vec<usize>),
        Insert(Vec<usize>),
        Scroll(usize),
    }

    /// Simulates a list view: `rows` holds the node each row was last filled
    /// with, or `None` for a row inserted since the last sync.
    #[derive(Debug, Default)]
    struct RecordingDriver {
        rows: Vec<Option<NodeId>>,
        calls: Vec<Call>,
        batching: bool,
        pending_deletes: Vec<usize>,
        pending_inserts: Vec<usize>,
    }

    impl RecordingDriver {
        fn apply_deletes(&mut self, rows: &[usize]) {
            for &row in rows.iter().rev() {
                assert!(row < self.rows.len(), "delete of missing row {row}");
                self.rows.remove(row);
            }
        }

        fn apply_inserts(&mut self, rows: &[usize]) {
            for &row in rows {
                assert!(row <= self.rows.len(), "insert past the end at {row}");
                self.rows.insert(row, None);
            }
        }
    }

    impl ListDriver for RecordingDriver {
        fn reload_all(&mut self, row_count: usize) {
            self.calls.push(Call::Reload(row_count));
            self.rows = vec![None; row_count];
        }

        fn insert_rows(&mut self, rows: &[usize], _animation: RowAnimation) {
            self.calls.push(Call::Insert(rows.to_vec()));
            if self.batching {
                self.pending_inserts.extend_from_slice(rows);
            } else {
                self.apply_inserts(rows);
            }
        }

        fn delete_rows(&mut self, rows: &[usize], _animation: RowAnimation) {
            self.calls.push(Call::Delete(rows.to_vec()));
            if self.batching {
                self.pending_deletes.extend_from_slice(rows);
            } else {
                self.apply_deletes(rows);
            }
        }

        fn scroll_to(&mut self, row: usize) {
            self.calls.push(Call::Scroll(row));
        }

        fn row_count(&self) -> usize {
            self.rows.len()
        }

        fn begin_updates(&mut self) {
            self.batching = true;
        }

        fn end_updates(&mut self) {
            self.batching = false;
            let deletes = core::mem::take(&mut self.pending_deletes);
            let inserts = core::mem::take(&mut self.pending_inserts);
            self.apply_deletes(&deletes);
            self.apply_inserts(&inserts);
        }
    }

    type Controller = ListController<&'static str, RecordingDriver>;

    /// Every row the driver kept must still show the same node; fresh rows are
    /// then filled from the tree, as a list view would when asking for cells.
    fn sync(ctl: &mut Controller) {
        let expected: Vec<NodeId> = ctl.tree().visible_rows().iter().map(|r| r.node).collect();
        let rows = &mut ctl.driver_mut().rows;
        assert_eq!(rows.len(), expected.len());
        for (row, (have, want)) in rows.iter_mut().zip(&expected).enumerate() {
            if let Some(have) = have {
                assert_eq!(*have, *want, "row {row} shows a stale node");
            }
            *have = Some(*want);
        }
    }

    fn controller(tree: Tree<&'static str>, depth: usize) -> Controller {
        let config = ControllerConfig {
            collapsed_section_depth: depth,
            ..ControllerConfig::default()
        };
        let mut ctl = Controller::new(RecordingDriver::default(), config);
        ctl.set_tree(tree);
        sync(&mut ctl);
        ctl
    }

    /// A single chain of `N` nodes; only the first is visible.
    fn chain<const N: usize>() -> (Tree<&'static str>, [NodeId; N]) {
        const NAMES: [&str; 8] = ["a", "b", "c", "d", "e", "f", "g", "h"];
        let mut tree = Tree::new();
        let mut parent = tree.root();
        let ids = core::array::from_fn(|i| {
            let id = tree.insert(Some(parent), NodeKind::Plain(NAMES[i]));
            parent = id;
            id
        });
        tree.set_visible(ids[0], true);
        (tree, ids)
    }

    /// p1(r1(r2), r3), p2. Top level visible.
    fn thread() -> (Tree<&'static str>, [NodeId; 5]) {
        let mut tree = Tree::new();
        let root = tree.root();
        let p1 = tree.insert(Some(root), NodeKind::Plain("p1"));
        let r1 = tree.insert(Some(p1), NodeKind::Plain("r1"));
        let r2 = tree.insert(Some(r1), NodeKind::Plain("r2"));
        let r3 = tree.insert(Some(p1), NodeKind::Plain("r3"));
        let p2 = tree.insert(Some(root), NodeKind::Plain("p2"));
        tree.set_visible(p1, true);
        tree.set_visible(p2, true);
        (tree, [p1, r1, r2, r3, p2])
    }

    fn row_nodes(ctl: &Controller) -> Vec<NodeId> {
        ctl.tree().visible_rows().iter().map(|r| r.node).collect()
    }

    fn count_kind(ctl: &Controller, pred: impl Fn(&NodeKind<&'static str>) -> bool) -> usize {
        let tree = ctl.tree();
        let mut stack = vec![tree.root()];
        let mut n = 0;
        while let Some(id) = stack.pop() {
            if pred(tree.kind(id)) {
                n += 1;
            }
            stack.extend_from_slice(tree.children(id));
        }
        n
    }

    #[test]
    fn attaching_reloads_the_driver() {
        let (tree, _) = thread();
        let ctl = controller(tree, 3);
        assert_eq!(ctl.driver().calls, vec![Call::Reload(2)]);
        assert_eq!(ctl.row_count(), 2);
    }

    #[test]
    fn expand_then_collapse() {
        let (tree, [p1, r1, _r2, r3, p2]) = thread();
        let mut ctl = controller(tree, 3);

        assert_eq!(ctl.on_row_tapped(0), TapOutcome::Expanded);
        sync(&mut ctl);
        let sel = ctl.selection().unwrap();
        assert_eq!(row_nodes(&ctl), vec![p1, sel, r1, r3, p2]);
        assert_eq!(ctl.selected_node(), Some(p1));
        assert_eq!(ctl.driver().calls[1..], [Call::Insert(vec![1, 2, 3])]);

        assert_eq!(ctl.on_row_tapped(0), TapOutcome::Collapsed);
        sync(&mut ctl);
        assert_eq!(row_nodes(&ctl), vec![p1, p2]);
        assert_eq!(ctl.selection(), None);
        assert!(!ctl.tree().is_alive(sel));
    }

    #[test]
    fn expansion_remembers_grandchildren() {
        let (tree, [_p1, r1, r2, _r3, _p2]) = thread();
        let mut ctl = controller(tree, 3);
        ctl.on_row_tapped(0);
        sync(&mut ctl);
        let row = ctl.tree().visible_traversal_index(r1).unwrap();
        ctl.on_row_tapped(row);
        sync(&mut ctl);
        assert!(ctl.tree().visible_traversal_index(r2).is_some());

        // Collapse and re-expand the post: the reply thread comes back open.
        ctl.on_row_tapped(0);
        sync(&mut ctl);
        assert_eq!(ctl.on_row_tapped(0), TapOutcome::Expanded);
        sync(&mut ctl);
        assert!(ctl.tree().visible_traversal_index(r2).is_some());
    }

    #[test]
    fn selection_is_exclusive() {
        let (tree, [p1, _r1, _r2, _r3, p2]) = thread();
        let mut ctl = controller(tree, 3);
        ctl.on_row_tapped(0);
        sync(&mut ctl);
        let row = ctl.tree().visible_traversal_index(p2).unwrap();
        assert_eq!(ctl.on_row_tapped(row), TapOutcome::Selected);
        sync(&mut ctl);
        assert_eq!(ctl.selected_node(), Some(p2));
        assert_eq!(count_kind(&ctl, |k| matches!(k, NodeKind::Selection)), 1);
        assert!(ctl.tree().is_children_visible(p1));

        // Tapping the selected leaf again deselects it.
        let row = ctl.tree().visible_traversal_index(p2).unwrap();
        assert_eq!(ctl.on_row_tapped(row), TapOutcome::Deselected);
        sync(&mut ctl);
        assert_eq!(count_kind(&ctl, |k| matches!(k, NodeKind::Selection)), 0);
    }

    #[test]
    fn marker_rows_are_ignored() {
        let (tree, _) = thread();
        let mut ctl = controller(tree, 3);
        ctl.on_row_tapped(0);
        sync(&mut ctl);
        let calls = ctl.driver().calls.len();
        assert_eq!(ctl.on_row_tapped(1), TapOutcome::Ignored);
        assert_eq!(ctl.on_action_triggered(1), ActionOutcome::Ignored);
        assert_eq!(ctl.driver().calls.len(), calls);
    }

    #[test]
    fn deep_tap_collapses_the_chain() {
        let (tree, [a, b, c, d, e]) = chain::<5>();
        let mut ctl = controller(tree, 2);
        for row in [0, 2, 3] {
            assert_eq!(ctl.on_row_tapped(row), TapOutcome::Expanded);
            sync(&mut ctl);
        }
        // Rows: a b c sel(c) d.
        assert_eq!(ctl.tree().visible_traversal_index(d), Some(4));
        assert_eq!(ctl.tree().collapsed_depth(d), 3);

        assert_eq!(ctl.on_row_tapped(4), TapOutcome::SectionCollapsed);
        sync(&mut ctl);
        let rows = row_nodes(&ctl);
        let section = rows[1];
        let sel = ctl.selection().unwrap();
        assert_eq!(rows, vec![a, section, d, sel, e]);
        assert_eq!(ctl.tree().parent(d), Some(section));
        assert_eq!(ctl.tree().collapsed_depth(e), 1);
        assert_eq!(
            ctl.driver().calls.last(),
            Some(&Call::Insert(vec![1, 2, 3, 4]))
        );
        let info = ctl.tree().collapsed_section(section).unwrap();
        assert_eq!(info.anchor_node(), a);
        assert_eq!(info.originating_node(), d);
        assert!(!ctl.tree().is_visible(b));
        assert!(!ctl.tree().is_visible(c));
    }

    #[test]
    fn tapping_the_placeholder_restores_the_chain() {
        let (tree, ids) = chain::<5>();
        let [a, b, c, d, e] = ids;
        let mut ctl = controller(tree, 2);
        for row in [0, 2, 3] {
            ctl.on_row_tapped(row);
            sync(&mut ctl);
        }
        let parents: Vec<_> = ids.iter().map(|id| ctl.tree().parent(*id)).collect();
        let flags: Vec<NodeFlags> = [a, b, c, d].iter().map(|id| ctl.tree().flags(*id)).collect();

        ctl.on_row_tapped(4);
        sync(&mut ctl);
        assert_eq!(ctl.on_row_tapped(1), TapOutcome::SectionRestored);
        sync(&mut ctl);

        let restored: Vec<_> = ids.iter().map(|id| ctl.tree().parent(*id)).collect();
        assert_eq!(restored, parents);
        let restored: Vec<NodeFlags> = [a, b, c, d].iter().map(|id| ctl.tree().flags(*id)).collect();
        assert_eq!(restored, flags);
        let sel = ctl.selection().unwrap();
        assert_eq!(row_nodes(&ctl), vec![a, b, c, d, sel, e]);
        assert_eq!(
            count_kind(&ctl, |k| matches!(k, NodeKind::CollapsedSection(_))),
            0
        );
    }

    #[test]
    fn action_row_moves_and_toggles() {
        let (tree, [p1, _r1, _r2, _r3, p2]) = thread();
        let mut ctl = controller(tree, 3);

        assert_eq!(ctl.on_action_triggered(0), ActionOutcome::Shown);
        sync(&mut ctl);
        let first = ctl.action().unwrap();
        assert_eq!(ctl.tree().parent(first), Some(p1));
        assert_eq!(row_nodes(&ctl), vec![p1, first, p2]);
        assert!(!ctl.tree().is_children_visible(p1));

        assert_eq!(ctl.on_action_triggered(2), ActionOutcome::Shown);
        sync(&mut ctl);
        let second = ctl.action().unwrap();
        assert!(!ctl.tree().is_alive(first));
        assert_eq!(row_nodes(&ctl), vec![p1, p2, second]);

        assert_eq!(ctl.on_action_triggered(1), ActionOutcome::Hidden);
        sync(&mut ctl);
        assert_eq!(ctl.action(), None);
        assert_eq!(row_nodes(&ctl), vec![p1, p2]);
    }

    #[test]
    fn action_row_survives_expansion() {
        let (tree, [p1, r1, _r2, r3, p2]) = thread();
        let mut ctl = controller(tree, 3);
        ctl.on_action_triggered(0);
        sync(&mut ctl);
        let action = ctl.action().unwrap();
        assert_eq!(ctl.on_row_tapped(0), TapOutcome::Expanded);
        sync(&mut ctl);
        let sel = ctl.selection().unwrap();
        assert_eq!(row_nodes(&ctl), vec![p1, sel, action, r1, r3, p2]);
    }

    #[test]
    fn collapsing_dismisses_the_action_row() {
        let (tree, [p1, r1, _r2, r3, p2]) = thread();
        let mut ctl = controller(tree, 3);
        assert_eq!(ctl.on_action_triggered(0), ActionOutcome::Shown);
        sync(&mut ctl);
        assert_eq!(ctl.on_row_tapped(0), TapOutcome::Expanded);
        sync(&mut ctl);
        let action = ctl.action().unwrap();
        assert_eq!(ctl.tree().parent(r1), Some(p1));
        assert_eq!(ctl.tree().parent(r3), Some(p1));

        assert_eq!(ctl.on_row_tapped(0), TapOutcome::Collapsed);
        sync(&mut ctl);
        assert_eq!(ctl.action(), None);
        assert!(!ctl.tree().is_alive(action));
        assert_eq!(row_nodes(&ctl), vec![p1, p2]);

        assert_eq!(ctl.on_action_triggered(0), ActionOutcome::Shown);
        sync(&mut ctl);
        let again = ctl.action().unwrap();
        assert_eq!(ctl.tree().visible_traversal_index(again), Some(1));
        assert_eq!(row_nodes(&ctl), vec![p1, again, p2]);
    }

    #[test]
    fn deselecting_a_leaf_dismisses_its_action_row() {
        let (tree, [p1, _r1, _r2, _r3, p2]) = thread();
        let mut ctl = controller(tree, 3);
        assert_eq!(ctl.on_action_triggered(1), ActionOutcome::Shown);
        sync(&mut ctl);
        assert_eq!(ctl.on_row_tapped(1), TapOutcome::Selected);
        sync(&mut ctl);
        assert_eq!(ctl.on_row_tapped(1), TapOutcome::Deselected);
        sync(&mut ctl);
        assert_eq!(ctl.action(), None);
        assert_eq!(count_kind(&ctl, |k| matches!(k, NodeKind::Action)), 0);
        assert_eq!(row_nodes(&ctl), vec![p1, p2]);
    }

    #[test]
    fn restoring_after_the_originating_node_was_removed() {
        let (tree, [a, b, c, d, _e]) = chain::<5>();
        let mut ctl = controller(tree, 2);
        for row in [0, 2, 3] {
            ctl.on_row_tapped(row);
            sync(&mut ctl);
        }
        assert_eq!(ctl.on_row_tapped(4), TapOutcome::SectionCollapsed);
        sync(&mut ctl);

        ctl.transaction(|tree| tree.remove(d));
        sync(&mut ctl);
        assert_eq!(ctl.row_count(), 2);
        assert_eq!(ctl.selected_node(), None);

        assert_eq!(ctl.on_row_tapped(1), TapOutcome::SectionRestored);
        sync(&mut ctl);
        assert_eq!(row_nodes(&ctl), vec![a, b, c]);
        assert!(ctl.tree().children(c).is_empty());
    }

    #[test]
    fn zoom_stops_at_a_node_without_a_row() {
        let (mut tree, [p1, r1, r2, _r3, p2]) = thread();
        // p1 claims to show its children while r1 stays hidden.
        tree.set_children_visible_override(p1, Some(true));
        let mut ctl = controller(tree, 3);
        ctl.driver_mut().calls.clear();

        ctl.zoom_to(r2);
        sync(&mut ctl);
        assert_eq!(ctl.tree().visible_traversal_index(r1), None);
        assert_eq!(ctl.tree().visible_traversal_index(r2), None);
        assert_eq!(ctl.driver().calls, vec![Call::Reload(2)]);
        assert_eq!(row_nodes(&ctl), vec![p1, p2]);
    }

    #[test]
    fn zoom_replays_taps_and_reloads_once() {
        let (tree, [a, _b, _c, _d, e, f]) = chain::<6>();
        let mut ctl = controller(tree, 3);
        ctl.driver_mut().calls.clear();

        ctl.zoom_to(f);
        sync(&mut ctl);
        assert_eq!(ctl.selected_node(), Some(f));
        let rows = row_nodes(&ctl);
        let section = rows[1];
        assert!(matches!(
            ctl.tree().kind(section),
            NodeKind::CollapsedSection(_)
        ));
        assert_eq!(rows, vec![a, section, e, f, ctl.selection().unwrap()]);
        assert_eq!(ctl.driver().calls, vec![Call::Reload(5), Call::Scroll(3)]);
    }

    #[test]
    fn zoom_to_visible_node_selects_it() {
        let (tree, [p1, r1, _r2, r3, p2]) = thread();
        let mut ctl = controller(tree, 3);
        ctl.on_row_tapped(0);
        sync(&mut ctl);
        ctl.zoom_to(p1);
        sync(&mut ctl);
        assert_eq!(ctl.selected_node(), Some(p1));
        let sel = ctl.selection().unwrap();
        assert_eq!(row_nodes(&ctl), vec![p1, sel, r1, r3, p2]);
        assert_eq!(ctl.driver().calls.last(), Some(&Call::Scroll(0)));
    }

    #[test]
    fn transactions_report_their_update() {
        let (tree, [p1, r1, ..]) = thread();
        let mut ctl = controller(tree, 3);
        let ((), update) = ctl.transaction(|tree| tree.set_visible(r1, true));
        assert_eq!(
            update,
            RowUpdate::Batch(crate::transaction::RowBatch {
                deleted: vec![],
                inserted: vec![1],
            })
        );
        sync(&mut ctl);
        assert_eq!(ctl.node_at_row(0), p1);
        assert_eq!(ctl.node_at_row(1), r1);
    }

    #[test]
    fn point_taps_use_the_layout() {
        let (tree, [_p1, _r1, _r2, _r3, p2]) = thread();
        let mut ctl = controller(tree, 3);
        let layout = RowLayout::new(10.0, 100.0);
        assert_eq!(
            ctl.on_point_tapped(Point::new(5.0, 15.0), &layout),
            TapOutcome::Selected
        );
        assert_eq!(ctl.selected_node(), Some(p2));
        assert_eq!(
            ctl.on_point_tapped(Point::new(5.0, 500.0), &layout),
            TapOutcome::Ignored
        );
    }

    #[test]
    fn cells_see_row_context() {
        let (tree, [p1, ..]) = thread();
        let mut ctl = controller(tree, 3);
        ctl.on_row_tapped(0);
        let mut provider = |row: &RowContext<'_, &'static str>| {
            (row.node, row.depth, row.kind.content().copied(), row.children_visible)
        };
        assert_eq!(
            ctl.cell_for_row(0, &mut provider),
            (p1, 1, Some("p1"), true)
        );
        let (_, depth, content, _) = ctl.cell_for_row(1, &mut provider);
        assert_eq!((depth, content), (2, None));
    }

    #[test]
    fn take_tree_detaches() {
        let (tree, _) = thread();
        let mut ctl = controller(tree, 3);
        let tree = ctl.take_tree().unwrap();
        assert_eq!(tree.row_count(), 2);
        assert!(!ctl.has_tree());
    }

    #[test]
    #[should_panic(expected = "no tree attached")]
    fn tapping_without_a_tree_panics() {
        let mut ctl = Controller::new(RecordingDriver::default(), ControllerConfig::default());
        ctl.on_row_tapped(0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn tapping_past_the_end_panics() {
        let (tree, _) = thread();
        let mut ctl = controller(tree, 3);
        ctl.on_row_tapped(2);
    }

    #[derive(Debug, Default)]
    struct StuckDriver;

    impl ListDriver for StuckDriver {
        fn reload_all(&mut self, _row_count: usize) {}
        fn insert_rows(&mut self, _rows: &[usize], _animation: RowAnimation) {}
        fn delete_rows(&mut self, _rows: &[usize], _animation: RowAnimation) {}
        fn scroll_to(&mut self, _row: usize) {}
        fn row_count(&self) -> usize {
            0
        }
    }

    #[test]
    #[should_panic(expected = "list view reports 0 rows")]
    fn driver_out_of_sync_panics() {
        let (tree, _) = thread();
        let mut ctl = ListController::new(StuckDriver, ControllerConfig::default());
        ctl.set_tree(tree);
    }
}
