//! Grafting one tree onto another
//!
//! Used when a follow-up query (more ancestors, more descendants) returns a
//! separately indexed tree that must join the one already on screen.
//!
//! Precedence differs by map and is kept on purpose, since renderers read
//! both:
//! - sibling lists keep the base tree's copy of a node present in both trees
//! - the node map keeps the grafted tree's copy

use crate::error::Result;
use crate::node::{NodeId, ResolverNode};
use crate::tree::{IndexedProcessTree, SharedNode};
use std::collections::HashSet;
use std::sync::Arc;

impl IndexedProcessTree {
    /// Graft `graft` onto this tree under `attachment`
    ///
    /// The graft's root is re-parented to `attachment` and appended to its
    /// children. Origin counts are recomputed over the merged node set with
    /// this tree's origin. Neither input is modified.
    ///
    /// An empty graft gives a plain union. An `attachment` that is not
    /// indexed still receives the graft root as a child, but the branch is
    /// unreachable from [`root`](Self::root).
    ///
    /// # Errors
    /// Returns [`TreeError::CyclicAncestry`](crate::TreeError::CyclicAncestry)
    /// if `attachment` lies inside the grafted subtree, and
    /// [`TreeError::TooManyNodes`](crate::TreeError::TooManyNodes) if the
    /// merged tree exceeds this tree's node limit.
    pub fn merge(&self, graft: &IndexedProcessTree, attachment: &NodeId) -> Result<Self> {
        let mut id_to_node = self.id_to_node.clone();
        for (id, node) in &graft.id_to_node {
            id_to_node.insert(id.clone(), Arc::clone(node));
        }

        let mut id_to_children = self.id_to_children.clone();
        for (parent, incoming) in &graft.id_to_children {
            let existing = id_to_children.get(parent).map(Vec::as_slice).unwrap_or(&[]);
            let merged = union_by_id(existing, incoming);
            id_to_children.insert(parent.clone(), merged);
        }

        // Roots whose parent arrived with the other tree join that parent.
        let mut roots = Vec::new();
        for node in union_by_id(&self.roots, &graft.roots) {
            let parent = node.parent.clone().filter(|id| id_to_node.contains_key(id));
            match parent {
                Some(parent) => {
                    let siblings = id_to_children.entry(parent).or_default();
                    if siblings.iter().all(|sibling| sibling.id != node.id) {
                        siblings.push(node);
                    }
                }
                None => roots.push(node),
            }
        }

        if let Some(graft_root) = graft.root_shared() {
            if let Some(current) = id_to_node.get(&graft_root.id) {
                // either tree may already list the root under some parent
                for siblings in id_to_children.values_mut() {
                    siblings.retain(|node| node.id != graft_root.id);
                }

                let mut reparented = ResolverNode::clone(current);
                reparented.parent = Some(attachment.clone());
                let reparented = Arc::new(reparented);

                id_to_node.insert(reparented.id.clone(), Arc::clone(&reparented));
                roots.retain(|node| node.id != reparented.id);
                id_to_children
                    .entry(attachment.clone())
                    .or_default()
                    .push(reparented);
            }

            if !id_to_node.contains_key(attachment) {
                tracing::warn!(
                    attachment = attachment.as_str(),
                    graft_root = graft_root.id.as_str(),
                    "attachment node is not indexed; grafted branch is orphaned"
                );
            }
        }

        let recomputed = Self::from_shared(
            id_to_node.values().cloned(),
            self.origin_id.clone(),
            self.config,
        )?;

        tracing::debug!(
            base = self.len(),
            graft = graft.len(),
            merged = id_to_node.len(),
            attachment = attachment.as_str(),
            "merged process trees"
        );

        Ok(Self {
            id_to_node,
            id_to_children,
            roots,
            origin_id: self.origin_id.clone(),
            origin_stats: recomputed.origin_stats,
            config: self.config,
        })
    }
}

/// Union of two sibling lists by id; the first copy of an id wins
fn union_by_id(existing: &[SharedNode], incoming: &[SharedNode]) -> Vec<SharedNode> {
    let mut seen = HashSet::new();
    existing
        .iter()
        .chain(incoming)
        .filter(|node| seen.insert(node.id.clone()))
        .cloned()
        .collect()
}
