//! Per-definition engine options.

use serde::{Deserialize, Serialize};

/// How a patch treats an existing primitive array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrayPatch {
    /// Add missing elements, never remove (default)
    #[default]
    Union,
    /// Replace the whole array unless it is element-wise equal
    Replace,
}

/// Options attached to a [`Definition`](crate::Definition).
///
/// Options are not inherited: a child definition used through `object_of`
/// or `index_of` applies its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    pub array_patch: ArrayPatch,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style method to pick the array patch mode.
    pub fn with_array_patch(mut self, array_patch: ArrayPatch) -> Self {
        self.array_patch = array_patch;
        self
    }
}
