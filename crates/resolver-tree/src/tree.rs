//! Indexed process tree
//!
//! Provides [`IndexedProcessTree`], an immutable index over a forest of
//! [`ResolverNode`]s with parent/child lookup, level-order traversal and
//! counts relative to an origin node.
//!
//! # Invariants
//! - every node is keyed by its own id; duplicate ids keep the last node
//! - every node sits in exactly one sibling list: under its parent when the
//!   parent is indexed, otherwise in the root list
//! - sibling lists are sorted by event time with a stable sort
//! - no parent chain is cyclic (checked at build time)

use crate::config::IndexConfig;
use crate::error::{Result, TreeError};
use crate::node::{sibling_key, NodeId, ResolverNode};
use crate::sequencers::{generations_and_descendants, level_order};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Node shared between a tree and the trees merged from it
pub type SharedNode = Arc<ResolverNode>;

/// Counts relative to the origin node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OriginStats {
    /// Depth of the deepest descendant below the origin (origin is 0)
    pub generations: usize,
    /// Nodes strictly below the origin
    pub descendants: usize,
    /// Length of the parent chain from the origin to its root, origin included
    pub ancestors: usize,
}

/// Serializable overview of a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSummary {
    /// Indexed nodes
    pub nodes: usize,
    /// Nodes without a resolvable parent
    pub roots: usize,
    /// Origin id, resolvable or not
    pub origin_id: Option<NodeId>,
    /// See [`OriginStats::generations`]
    pub generations: Option<usize>,
    /// See [`OriginStats::descendants`]
    pub descendants: Option<usize>,
    /// See [`OriginStats::ancestors`]
    pub ancestors: Option<usize>,
}

/// Immutable index over a forest of resolver nodes
///
/// # Example
/// ```
/// use resolver_tree::{IndexedProcessTree, NodeId, ResolverNode};
///
/// let nodes = vec![
///     ResolverNode::new("a"),
///     ResolverNode::new("b").with_parent("a"),
/// ];
/// let tree = IndexedProcessTree::build(nodes, Some(&NodeId::from("a"))).unwrap();
///
/// assert_eq!(tree.root().map(|n| n.id.as_str()), Some("a"));
/// assert_eq!(tree.descendants(), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedProcessTree {
    pub(crate) id_to_node: IndexMap<NodeId, SharedNode>,
    pub(crate) id_to_children: IndexMap<NodeId, Vec<SharedNode>>,
    pub(crate) roots: Vec<SharedNode>,
    pub(crate) origin_id: Option<NodeId>,
    pub(crate) origin_stats: Option<OriginStats>,
    pub(crate) config: IndexConfig,
}

impl IndexedProcessTree {
    /// Index `nodes` with the default configuration
    ///
    /// # Errors
    /// Returns [`TreeError::CyclicAncestry`] if a parent chain loops.
    pub fn build<I>(nodes: I, origin_id: Option<&NodeId>) -> Result<Self>
    where
        I: IntoIterator<Item = ResolverNode>,
    {
        Self::build_with_config(nodes, origin_id, &IndexConfig::default())
    }

    /// Index `nodes` with an explicit configuration
    ///
    /// # Errors
    /// Returns [`TreeError::CyclicAncestry`] if a parent chain loops, or
    /// [`TreeError::TooManyNodes`] if `config.max_nodes` is exceeded.
    pub fn build_with_config<I>(
        nodes: I,
        origin_id: Option<&NodeId>,
        config: &IndexConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = ResolverNode>,
    {
        Self::from_shared(nodes.into_iter().map(Arc::new), origin_id.cloned(), *config)
    }

    pub(crate) fn from_shared<I>(
        nodes: I,
        origin_id: Option<NodeId>,
        config: IndexConfig,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = SharedNode>,
    {
        let mut id_to_node: IndexMap<NodeId, SharedNode> = IndexMap::new();
        for node in nodes {
            id_to_node.insert(node.id.clone(), node);
        }

        if let Some(limit) = config.max_nodes {
            if id_to_node.len() > limit {
                return Err(TreeError::TooManyNodes {
                    count: id_to_node.len(),
                    limit,
                });
            }
        }

        check_acyclic(&id_to_node)?;

        let mut id_to_children: IndexMap<NodeId, Vec<SharedNode>> = IndexMap::new();
        let mut roots = Vec::new();
        for node in id_to_node.values() {
            match resolve_parent(&id_to_node, node) {
                Some(parent) => id_to_children
                    .entry(parent.id.clone())
                    .or_default()
                    .push(Arc::clone(node)),
                None => roots.push(Arc::clone(node)),
            }
        }

        let placement = config.untimed_siblings;
        roots.sort_by_cached_key(|node| sibling_key(node, placement));
        for siblings in id_to_children.values_mut() {
            siblings.sort_by_cached_key(|node| sibling_key(node, placement));
        }

        let origin_stats = origin_id
            .as_ref()
            .and_then(|id| id_to_node.get(id))
            .map(|origin| measure_origin(origin, &id_to_node, &id_to_children));

        tracing::debug!(
            nodes = id_to_node.len(),
            roots = roots.len(),
            origin = origin_id.as_ref().map(NodeId::as_str),
            "indexed process tree"
        );

        Ok(Self {
            id_to_node,
            id_to_children,
            roots,
            origin_id,
            origin_stats,
            config,
        })
    }

    /// Sorted children of `parent`; `None` yields the roots
    ///
    /// Never fails: unknown parents have no children.
    #[must_use]
    pub fn children(&self, parent: Option<&NodeId>) -> &[SharedNode] {
        match parent {
            Some(id) => self.children_of(id.as_str()),
            None => &self.roots,
        }
    }

    /// Sorted children of the node with id `parent`
    #[must_use]
    pub fn children_of(&self, parent: &str) -> &[SharedNode] {
        self.id_to_children
            .get(parent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Nodes without a resolvable parent
    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[SharedNode] {
        &self.roots
    }

    /// Lookup node by id
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&ResolverNode> {
        self.id_to_node.get(id).map(|node| &**node)
    }

    /// Parent of `node`, if its parent id is indexed
    ///
    /// A missing parent id and an unknown parent id both give `None`.
    #[must_use]
    pub fn parent(&self, node: &ResolverNode) -> Option<&ResolverNode> {
        resolve_parent(&self.id_to_node, node).map(|parent| &**parent)
    }

    /// Root reached by walking parents from the first indexed node
    ///
    /// Only meaningful for a single connected tree; with several roots the
    /// result is the root above the first node. `None` when empty.
    #[must_use]
    pub fn root(&self) -> Option<&ResolverNode> {
        self.root_shared().map(|node| &**node)
    }

    pub(crate) fn root_shared(&self) -> Option<&SharedNode> {
        let mut current = self.id_to_node.values().next()?;
        while let Some(parent) = resolve_parent(&self.id_to_node, current) {
            current = parent;
        }
        Some(current)
    }

    /// Nodes in breadth-first order from [`root`](Self::root)
    ///
    /// Each call starts a fresh traversal.
    pub fn level_order(&self) -> impl Iterator<Item = &ResolverNode> + '_ {
        self.root_shared()
            .into_iter()
            .flat_map(move |root| {
                level_order(root, node_key, move |node| {
                    self.children_of(node.id.as_str()).iter()
                })
            })
            .map(|node| &**node)
    }

    /// All indexed nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &ResolverNode> + '_ {
        self.id_to_node.values().map(|node| &**node)
    }

    /// Number of indexed nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.id_to_node.len()
    }

    /// Check if tree is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id_to_node.is_empty()
    }

    /// Origin id the counts are relative to
    #[inline]
    #[must_use]
    pub fn origin_id(&self) -> Option<&NodeId> {
        self.origin_id.as_ref()
    }

    /// Origin counts, present only when the origin is indexed
    #[inline]
    #[must_use]
    pub fn origin_stats(&self) -> Option<OriginStats> {
        self.origin_stats
    }

    /// See [`OriginStats::generations`]
    #[must_use]
    pub fn generations(&self) -> Option<usize> {
        self.origin_stats.map(|stats| stats.generations)
    }

    /// See [`OriginStats::descendants`]
    #[must_use]
    pub fn descendants(&self) -> Option<usize> {
        self.origin_stats.map(|stats| stats.descendants)
    }

    /// See [`OriginStats::ancestors`]
    #[must_use]
    pub fn ancestors(&self) -> Option<usize> {
        self.origin_stats.map(|stats| stats.ancestors)
    }

    /// Configuration the tree was built with
    #[inline]
    #[must_use]
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Overview for reporting
    #[must_use]
    pub fn summary(&self) -> TreeSummary {
        TreeSummary {
            nodes: self.len(),
            roots: self.roots.len(),
            origin_id: self.origin_id.clone(),
            generations: self.generations(),
            descendants: self.descendants(),
            ancestors: self.ancestors(),
        }
    }
}

fn node_key<'a>(node: &&'a SharedNode) -> &'a NodeId {
    let node: &'a SharedNode = *node;
    &node.id
}

fn resolve_parent<'a>(
    nodes: &'a IndexMap<NodeId, SharedNode>,
    node: &ResolverNode,
) -> Option<&'a SharedNode> {
    node.parent.as_ref().and_then(|parent| nodes.get(parent))
}

fn measure_origin(
    origin: &SharedNode,
    nodes: &IndexMap<NodeId, SharedNode>,
    children: &IndexMap<NodeId, Vec<SharedNode>>,
) -> OriginStats {
    let lineage = generations_and_descendants(origin, node_key, |node| {
        children
            .get(&node.id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
    });

    let mut ancestors = 1;
    let mut current = origin;
    while let Some(parent) = resolve_parent(nodes, current) {
        ancestors += 1;
        current = parent;
    }

    OriginStats {
        generations: lineage.generations,
        descendants: lineage.descendants,
        ancestors,
    }
}

fn check_acyclic(nodes: &IndexMap<NodeId, SharedNode>) -> Result<()> {
    let mut settled: HashSet<&NodeId> = HashSet::new();
    for start in nodes.keys() {
        let mut path: HashSet<&NodeId> = HashSet::new();
        let mut current = Some(start);
        while let Some(id) = current {
            if settled.contains(id) {
                break;
            }
            if !path.insert(id) {
                return Err(TreeError::CyclicAncestry { node: id.clone() });
            }
            current = nodes
                .get(id)
                .and_then(|node| node.parent.as_ref())
                .filter(|parent| nodes.contains_key(*parent));
        }
        settled.extend(path);
    }
    Ok(())
}
