//! Resolver Process Trees
//!
//! Indexes a flat list of process records into a queryable forest.
//!
//! # Overview
//!
//! - **ResolverNode**: one process record with an id and optional parent id
//! - **IndexedProcessTree**: parent/child index with sibling ordering by time,
//!   level-order traversal and counts relative to an origin node
//! - **merge**: grafts a separately fetched tree under an attachment node
//! - **sequencers**: generic breadth-first and subtree-measuring traversals
//!
//! # Example
//!
//! ```rust
//! use resolver_tree::{IndexedProcessTree, NodeId, ResolverNode};
//!
//! let nodes = vec![
//!     ResolverNode::new("a"),
//!     ResolverNode::new("b").with_parent("a"),
//!     ResolverNode::new("c").with_parent("a"),
//!     ResolverNode::new("d").with_parent("b"),
//! ];
//! let tree = IndexedProcessTree::build(nodes, Some(&NodeId::from("a"))).unwrap();
//!
//! let order: Vec<&str> = tree.level_order().map(|n| n.id.as_str()).collect();
//! assert_eq!(order, vec!["a", "b", "c", "d"]);
//! assert_eq!(tree.generations(), Some(2));
//! assert_eq!(tree.descendants(), Some(3));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
mod merge;
pub mod node;
pub mod sequencers;
pub mod tree;

// Re-exports
pub use config::{IndexConfig, UntimedPlacement};
pub use error::{Result, TreeError};
pub use node::{
    nodes_from_records, order_by_time, EventStats, NodeId, ResolverNode, TIMESTAMP_FIELD,
};
pub use sequencers::Lineage;
pub use tree::{IndexedProcessTree, OriginStats, SharedNode, TreeSummary};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for tree operations
    pub use crate::{
        IndexConfig, IndexedProcessTree, NodeId, ResolverNode, TreeError, UntimedPlacement,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
