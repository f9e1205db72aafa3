//! Subcommand implementations
//!
//! Input files hold a JSON array of node records as returned by the backend
//! tree API. Records without an `id` are dropped during loading.

use anyhow::Context;
use resolver_tree::{nodes_from_records, IndexConfig, IndexedProcessTree, NodeId, ResolverNode};
use serde_json::Value;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Read node records from a JSON file
///
/// # Errors
/// Fails if the file is unreadable, is not a JSON array, or holds a record
/// that has an id but does not decode.
pub fn load_nodes(path: &Path) -> anyhow::Result<Vec<ResolverNode>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading nodes {}", path.display()))?;
    let records: Vec<Value> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of records", path.display()))?;
    let total = records.len();
    let nodes = nodes_from_records(records).with_context(|| format!("in {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        records = total,
        nodes = nodes.len(),
        "loaded node records"
    );
    Ok(nodes)
}

/// Load and index one file
///
/// # Errors
/// Fails on unreadable input or if indexing rejects the nodes.
pub fn build_tree(
    path: &Path,
    origin: Option<&NodeId>,
    config: &IndexConfig,
) -> anyhow::Result<IndexedProcessTree> {
    let nodes = load_nodes(path)?;
    IndexedProcessTree::build_with_config(nodes, origin, config)
        .with_context(|| format!("indexing {}", path.display()))
}

/// Load two files and graft the second under `attachment`
///
/// The origin applies to the base tree and survives the merge.
///
/// # Errors
/// Fails on unreadable input or if indexing or merging is rejected.
pub fn merge_trees(
    base: &Path,
    graft: &Path,
    attachment: &NodeId,
    origin: Option<&NodeId>,
    config: &IndexConfig,
) -> anyhow::Result<IndexedProcessTree> {
    let base_tree = build_tree(base, origin, config)?;
    let graft_tree = build_tree(graft, None, config)?;
    base_tree
        .merge(&graft_tree, attachment)
        .with_context(|| format!("grafting {} under {attachment}", graft.display()))
}

/// Pretty JSON summary of a tree
///
/// # Errors
/// Only if serialization fails.
pub fn render_summary(tree: &IndexedProcessTree) -> anyhow::Result<String> {
    serde_json::to_string_pretty(&tree.summary()).context("serializing summary")
}

/// One `id<TAB>parent<TAB>name` line per node, in level order
#[must_use]
pub fn render_level_order(tree: &IndexedProcessTree) -> String {
    let mut out = String::new();
    for node in tree.level_order() {
        let parent = node.parent.as_ref().map_or("-", NodeId::as_str);
        let _ = writeln!(out, "{}\t{}\t{}", node.id, parent, node.display_name());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_order_lines_mark_missing_parent() {
        let tree = IndexedProcessTree::build(
            vec![
                ResolverNode::new("a").with_name("init"),
                ResolverNode::new("b").with_parent("a"),
            ],
            None,
        )
        .unwrap();

        assert_eq!(render_level_order(&tree), "a\t-\tinit\nb\ta\tb\n");
    }

    #[test]
    fn summary_is_camel_case_json() {
        let tree = IndexedProcessTree::build(vec![ResolverNode::new("a")], Some(&NodeId::from("a")))
            .unwrap();
        let json: Value = serde_json::from_str(&render_summary(&tree).unwrap()).unwrap();

        assert_eq!(json["nodes"], 1);
        assert_eq!(json["originId"], "a");
        assert_eq!(json["ancestors"], 1);
    }
}
