//! Error types for resolver trees
//!
//! Building and merging are the only fallible operations. Lookups that miss
//! return `None` instead of an error.

use crate::node::NodeId;

/// Result alias for tree operations
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors raised while indexing or merging process trees
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// A chain of parent references loops back on itself
    #[error("cyclic ancestry detected at node {node}")]
    CyclicAncestry {
        /// First node found to be its own ancestor
        node: NodeId,
    },

    /// Node count exceeds the configured limit
    #[error("tree holds {count} nodes, limit is {limit}")]
    TooManyNodes {
        /// Unique nodes after indexing
        count: usize,
        /// Configured `max_nodes`
        limit: usize,
    },

    /// A raw record carries an id but does not decode as a node
    #[error("record {index} is not a valid node: {reason}")]
    InvalidRecord {
        /// Position of the record in its input
        index: usize,
        /// Decoder message
        reason: String,
    },
}

impl TreeError {
    /// Check if the error points at corrupt input data
    #[inline]
    #[must_use]
    pub fn is_corrupt_data(&self) -> bool {
        matches!(self, Self::CyclicAncestry { .. } | Self::InvalidRecord { .. })
    }

    /// Node id attached to the error, if any
    #[must_use]
    pub fn node(&self) -> Option<&NodeId> {
        match self {
            Self::CyclicAncestry { node } => Some(node),
            Self::TooManyNodes { .. } | Self::InvalidRecord { .. } => None,
        }
    }
}
