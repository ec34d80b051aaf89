// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported while building a tree.

/// Failure of [`Tree::build_from_roots`](crate::Tree::build_from_roots).
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// The object graph nests deeper than [`BuildOptions::max_depth`](crate::BuildOptions::max_depth).
    ///
    /// This is how a cyclic object graph shows up.
    #[error("object graph nests deeper than {limit} levels (is it cyclic?)")]
    DepthLimitExceeded {
        /// The configured limit.
        limit: usize,
    },
}
