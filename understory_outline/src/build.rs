// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Building a tree from an application object graph.
//!
//! Implement [`OutlineBuilder`] for your model and call [`Tree::build_from_roots`].
//! One [`Plain`](NodeKind::Plain) node is created per object, depth-first, in the
//! order the builder reports children.

use alloc::vec::Vec;

use log::debug;

use crate::error::BuildError;
use crate::tree::Tree;
use crate::types::{NodeId, NodeKind};

/// Maps application objects onto tree nodes.
pub trait OutlineBuilder<T> {
    /// Application object type.
    type Object;

    /// Children of `object`, in display order. `None` for leaves.
    fn children_of(&mut self, object: &Self::Object) -> Option<Vec<Self::Object>>;

    /// Construct the node content for `object`.
    fn make_content(&mut self, object: &Self::Object) -> T;

    /// Adjust freshly made content. Called right after [`OutlineBuilder::make_content`].
    fn configure(&mut self, content: &mut T, object: &Self::Object) {
        let _ = (content, object);
    }

    /// Whether the node for `object` starts visible.
    ///
    /// `depth` counts ancestors up to the root, so top-level objects have depth `1`.
    /// The default shows top-level nodes only.
    fn initially_visible(&self, object: &Self::Object, depth: usize) -> bool {
        let _ = object;
        depth <= 1
    }
}

/// Limits applied by [`Tree::build_from_roots_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Deepest nesting accepted before giving up with [`BuildError::DepthLimitExceeded`].
    pub max_depth: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { max_depth: 4096 }
    }
}

impl<T> Tree<T> {
    /// Build a tree whose top-level nodes are made from `roots`, with default options.
    pub fn build_from_roots<B>(
        roots: impl IntoIterator<Item = B::Object>,
        builder: &mut B,
    ) -> Result<Self, BuildError>
    where
        B: OutlineBuilder<T>,
    {
        Self::build_from_roots_with(roots, builder, BuildOptions::default())
    }

    /// Build a tree whose top-level nodes are made from `roots`.
    pub fn build_from_roots_with<B>(
        roots: impl IntoIterator<Item = B::Object>,
        builder: &mut B,
        options: BuildOptions,
    ) -> Result<Self, BuildError>
    where
        B: OutlineBuilder<T>,
    {
        let mut tree = Self::new();
        let root = tree.root();
        let mut stack: Vec<(B::Object, NodeId, usize)> =
            roots.into_iter().map(|o| (o, root, 1)).collect();
        stack.reverse();

        while let Some((object, parent, depth)) = stack.pop() {
            if depth > options.max_depth {
                return Err(BuildError::DepthLimitExceeded {
                    limit: options.max_depth,
                });
            }
            let mut content = builder.make_content(&object);
            builder.configure(&mut content, &object);
            let id = tree.insert(Some(parent), NodeKind::Plain(content));
            if builder.initially_visible(&object, depth) {
                tree.set_visible(id, true);
            }
            if let Some(children) = builder.children_of(&object) {
                stack.extend(children.into_iter().rev().map(|c| (c, id, depth + 1)));
            }
        }

        debug!("built tree with {} node(s)", tree.node_count());
        Ok(tree)
    }
}
