// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_outline --heading-base-level=0

//! Understory Outline: an ordered tree whose visible nodes project onto list rows.
//!
//! Understory Outline is the model behind virtualized, nested list views such as
//! comment threads or file outlines.
//!
//! - Stores a hierarchy of nodes in an arena addressed by generational [`NodeId`]s.
//! - Lets each node be shown or hidden independently; hidden nodes keep their
//!   descendants' flags so a subtree re-expands exactly as it was.
//! - Maps nodes to rows and rows to nodes through the visible pre-order traversal.
//! - Injects synthetic rows: selection and action markers, and collapsed-section
//!   placeholders that stand in for deep chains.
//! - Reports every visibility flip to a [`VisibilityListener`], which is how a list
//!   controller turns mutations into incremental row updates.
//!
//! ## Visible traversal
//!
//! Rows are the depth-first pre-order walk from the root that only descends into
//! visible children. The root itself is never a row. A node counts only if it and
//! every ancestor below the root are visible, so visibility is set level by level.
//!
//! ## API overview
//!
//! - [`Tree`]: arena, structure edits, visibility and positional queries.
//! - [`NodeKind`]: what a node stands for (plain content or a synthetic row).
//! - [`NodeFlags`]: visibility and the disclosure override.
//! - [`CollapsedSection`]: placeholder state; see [`collapse`] for the lifecycle.
//! - [`OutlineBuilder`]: maps an application object graph onto nodes.
//!
//! Key operations:
//! - [`Tree::insert`], [`Tree::add_child`], [`Tree::remove_from_parent`], [`Tree::remove`]
//! - [`Tree::set_visible`] → listener notification
//! - [`Tree::visible_traversal_index`] / [`Tree::node_at_visible_index`] / [`Tree::row_count`]
//! - [`Tree::new_collapsed_section`] / [`Tree::insert_collapsed_section`] / [`Tree::restore_collapsed_section`]
//!
//! ## Caching
//!
//! The visible traversal is memoized and dropped on every visibility or structure
//! change. [`Tree::set_cache_enabled`] turns memoization off, for example while a
//! batch of edits is in flight.
//!
//! ## Minimal usage
//!
//! ```
//! use understory_outline::{NodeKind, Tree};
//!
//! let mut tree: Tree<&str> = Tree::new();
//! let root = tree.root();
//!
//! let post = tree.insert(Some(root), NodeKind::Plain("post"));
//! let reply = tree.insert(Some(post), NodeKind::Plain("reply"));
//! tree.set_visible(post, true);
//! assert_eq!(tree.row_count(), 1);
//!
//! // Expand the post.
//! tree.set_visible(reply, true);
//! assert_eq!(tree.visible_traversal_index(reply), Some(1));
//! assert_eq!(tree.node_at_visible_index(1), Some(reply));
//!
//! // Hiding the post hides the reply's row too, but the reply remembers its flag.
//! tree.set_visible(post, false);
//! assert_eq!(tree.row_count(), 0);
//! assert!(tree.is_visible(reply));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod build;
pub mod collapse;
mod error;
mod tree;
mod types;

pub use build::{BuildOptions, OutlineBuilder};
pub use collapse::CollapsedSection;
pub use error::BuildError;
pub use tree::Tree;
pub use types::{
    NoListener, NodeFlags, NodeId, NodeKind, VisibilityListener, VisibilitySnapshot, VisibleRow,
};
