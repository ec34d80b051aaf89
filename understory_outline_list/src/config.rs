// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Controller configuration.

use crate::driver::RowAnimation;

/// Tunables for a [`ListController`](crate::ListController).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Collapsed depth beyond which selecting a node with hidden children
    /// collapses the chain above it instead of expanding in place.
    pub collapsed_section_depth: usize,
    /// Animation used for inserted rows.
    pub insert_animation: RowAnimation,
    /// Animation used for deleted rows.
    pub delete_animation: RowAnimation,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            collapsed_section_depth: 3,
            insert_animation: RowAnimation::Automatic,
            delete_animation: RowAnimation::Automatic,
        }
    }
}
