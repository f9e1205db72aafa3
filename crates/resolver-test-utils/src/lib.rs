//! Testing utilities for the resolver workspace
//!
//! Shared fixtures, node builders and proptest strategies.

#![allow(missing_docs)]

use chrono::{DateTime, Utc};
use proptest::prelude::*;
use resolver_tree::{IndexedProcessTree, NodeId, ResolverNode};

pub fn at(millis: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(millis).unwrap()
}

pub fn node(id: &str, parent: Option<&str>, millis: i64) -> ResolverNode {
    let node = ResolverNode::new(id).with_timestamp(at(millis));
    match parent {
        Some(parent) => node.with_parent(parent),
        None => node,
    }
}

/// `ids[0]` is the root, each later id is the child of the one before
pub fn chain(ids: &[&str]) -> Vec<ResolverNode> {
    let mut previous = None;
    let mut nodes = Vec::with_capacity(ids.len());
    for (millis, id) in (0i64..).zip(ids) {
        nodes.push(node(id, previous, millis));
        previous = Some(*id);
    }
    nodes
}

/// `a` with children `b` and `c`; `b` with child `d`
pub fn branching_nodes() -> Vec<ResolverNode> {
    vec![
        node("d", Some("b"), 30),
        node("c", Some("a"), 20),
        node("b", Some("a"), 10),
        node("a", None, 0),
    ]
}

pub fn build(nodes: Vec<ResolverNode>, origin: Option<&str>) -> IndexedProcessTree {
    let origin = origin.map(NodeId::from);
    IndexedProcessTree::build(nodes, origin.as_ref()).unwrap()
}

pub fn ids<'a>(nodes: impl IntoIterator<Item = &'a ResolverNode>) -> Vec<String> {
    nodes.into_iter().map(|n| n.id.to_string()).collect()
}

pub fn child_ids(tree: &IndexedProcessTree, parent: &str) -> Vec<String> {
    ids(tree.children_of(parent).iter().map(|n| &**n))
}

/// Acyclic forests: every parent reference points at an earlier node, a
/// missing node, or nowhere. Ids are `{prefix}{index}`.
pub fn arb_forest(
    prefix: &'static str,
    max_len: usize,
) -> impl Strategy<Value = Vec<ResolverNode>> {
    prop::collection::vec((any::<u16>(), 0..1_000i64), 0..max_len).prop_map(move |specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(index, (pick, millis))| {
                let node = ResolverNode::new(format!("{prefix}{index}")).with_timestamp(at(millis));
                match (index, pick % 6) {
                    (0, _) | (_, 0) => node,
                    (_, 1) => node.with_parent(format!("{prefix}missing{index}")),
                    _ => node.with_parent(format!("{prefix}{}", usize::from(pick) % index)),
                }
            })
            .collect()
    })
}

/// Connected trees with a single root `{prefix}0`, in shuffled input order
pub fn arb_tree(prefix: &'static str, max_len: usize) -> impl Strategy<Value = Vec<ResolverNode>> {
    prop::collection::vec((any::<u16>(), 0..1_000i64), 1..max_len)
        .prop_map(move |specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(index, (pick, millis))| {
                    let node =
                        ResolverNode::new(format!("{prefix}{index}")).with_timestamp(at(millis));
                    if index == 0 {
                        node
                    } else {
                        node.with_parent(format!("{prefix}{}", usize::from(pick) % index))
                    }
                })
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}
