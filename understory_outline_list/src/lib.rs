// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_outline_list --heading-base-level=0

//! Understory Outline List: drive a virtualized list view from an outline tree.
//!
//! A [`ListController`] owns an [`understory_outline::Tree`] and a [`ListDriver`]
//! (the list view). It turns user interaction into tree edits, and tree edits
//! into incremental row updates:
//!
//! - Tapping a row expands or collapses the node, moving the single selection
//!   marker along.
//! - Tapping a node deep in a chain folds the chain above it into a collapsed
//!   section placeholder; tapping the placeholder brings the chain back.
//! - Triggering an action on a row places the single action marker under it.
//! - [`ListController::zoom_to`] reveals an arbitrary node by replaying taps.
//!
//! Each interaction runs in a visibility [`Transaction`]: the tree reports every
//! visibility flip, and closing the transaction yields a [`RowUpdate`], either a
//! [`RowBatch`] of deleted and inserted row indices or a full reload.
//!
//! [`RowLayout`] provides fixed-height row geometry in Kurbo types for hit
//! testing and computing the rows inside a viewport.
//!
//! ## Minimal usage
//!
//! ```
//! use understory_outline::{NodeKind, Tree};
//! use understory_outline_list::{ControllerConfig, ListController, ListDriver, RowAnimation, TapOutcome};
//!
//! #[derive(Debug, Default)]
//! struct Rows(usize);
//!
//! impl ListDriver for Rows {
//!     fn reload_all(&mut self, row_count: usize) { self.0 = row_count; }
//!     fn insert_rows(&mut self, rows: &[usize], _: RowAnimation) { self.0 += rows.len(); }
//!     fn delete_rows(&mut self, rows: &[usize], _: RowAnimation) { self.0 -= rows.len(); }
//!     fn scroll_to(&mut self, _row: usize) {}
//!     fn row_count(&self) -> usize { self.0 }
//! }
//!
//! let mut tree: Tree<&str> = Tree::new();
//! let root = tree.root();
//! let post = tree.insert(Some(root), NodeKind::Plain("post"));
//! tree.insert(Some(post), NodeKind::Plain("reply"));
//! tree.set_visible(post, true);
//!
//! let mut list = ListController::new(Rows::default(), ControllerConfig::default());
//! list.set_tree(tree);
//! assert_eq!(list.row_count(), 1);
//!
//! // Expanding shows the reply and a selection row under the post.
//! assert_eq!(list.on_row_tapped(0), TapOutcome::Expanded);
//! assert_eq!(list.driver().0, 3);
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod config;
mod controller;
mod driver;
mod layout;
pub mod transaction;

pub use config::ControllerConfig;
pub use controller::{ActionOutcome, ListController, TapOutcome};
pub use driver::{CellProvider, ListDriver, RowAnimation, RowContext};
pub use layout::RowLayout;
pub use transaction::{RowBatch, RowUpdate, Transaction};
