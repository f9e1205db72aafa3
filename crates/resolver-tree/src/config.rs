//! Index configuration
//!
//! [`IndexConfig`] is carried by every tree and reused when trees are merged,
//! so a merged tree sorts and bounds its nodes the same way its base did.

use serde::{Deserialize, Serialize};

/// Where siblings without a timestamp are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UntimedPlacement {
    /// After every timed sibling
    #[default]
    Last,
    /// Before every timed sibling
    First,
}

/// Options applied while indexing a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Upper bound on unique nodes per tree, unbounded when `None`
    pub max_nodes: Option<usize>,
    /// Ordering of siblings that carry no `@timestamp`
    pub untimed_siblings: UntimedPlacement,
}

impl IndexConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a node limit
    #[inline]
    #[must_use]
    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = Some(max);
        self
    }

    /// With untimed sibling placement
    #[inline]
    #[must_use]
    pub fn with_untimed_siblings(mut self, placement: UntimedPlacement) -> Self {
        self.untimed_siblings = placement;
        self
    }
}
