use pretty_assertions::assert_eq;
use proptest::prelude::*;
use resolver_test_utils::{arb_tree, branching_nodes, build, chain, child_ids, ids, node};
use resolver_tree::{IndexedProcessTree, NodeId, TreeError};

proptest! {
    #[test]
    fn prop_merge_leaves_inputs_untouched(
        base_nodes in arb_tree("b", 20),
        graft_nodes in arb_tree("g", 20),
        pick in any::<usize>(),
    ) {
        let base = build(base_nodes.clone(), Some("b0"));
        let graft = build(graft_nodes, None);
        let base_before = base.clone();
        let graft_before = graft.clone();

        let attachment = base_nodes[pick % base_nodes.len()].id.clone();
        let merged = base.merge(&graft, &attachment).unwrap();

        prop_assert_eq!(&base, &base_before);
        prop_assert_eq!(&graft, &graft_before);
        prop_assert_eq!(merged.len(), base.len() + graft.len());
    }

    #[test]
    fn prop_merge_reparents_graft_root(
        base_nodes in arb_tree("b", 20),
        graft_nodes in arb_tree("g", 20),
        pick in any::<usize>(),
    ) {
        let base = build(base_nodes.clone(), Some("b0"));
        let graft = build(graft_nodes, None);
        let attachment = base_nodes[pick % base_nodes.len()].id.clone();

        let merged = base.merge(&graft, &attachment).unwrap();

        let grafted = merged.node("g0").unwrap();
        prop_assert_eq!(grafted.parent.as_ref(), Some(&attachment));
        prop_assert!(child_ids(&merged, attachment.as_str()).contains(&"g0".to_string()));

        // one connected tree again, origin counts cover both halves
        prop_assert_eq!(merged.root().map(|n| n.id.as_str()), Some("b0"));
        prop_assert_eq!(merged.level_order().count(), merged.len());
        prop_assert_eq!(merged.descendants(), Some(merged.len() - 1));
    }
}

#[test]
fn merge_attaches_descendants() {
    let base = build(branching_nodes(), Some("a"));
    let graft = build(chain(&["e", "f"]), None);

    let merged = base.merge(&graft, &NodeId::from("d")).unwrap();

    assert_eq!(ids(merged.level_order()), vec!["a", "b", "c", "d", "e", "f"]);
    assert_eq!(merged.descendants(), Some(5));
    assert_eq!(merged.generations(), Some(4));
    assert_eq!(merged.ancestors(), Some(1));
    assert_eq!(merged.origin_id().map(NodeId::as_str), Some("a"));
}

#[test]
fn merge_recomputes_ancestors_when_loading_parents() {
    // the base tree starts at `b`, whose parent `a` was not loaded yet
    let base = build(
        vec![node("b", Some("a"), 10), node("c", Some("b"), 20)],
        Some("c"),
    );
    assert_eq!(base.ancestors(), Some(2));

    let graft = build(vec![node("a", None, 0)], None);
    let merged = base.merge(&graft, &NodeId::from("root")).unwrap();

    assert_eq!(merged.ancestors(), Some(3));
    assert_eq!(child_ids(&merged, "a"), vec!["b"]);
    assert_eq!(child_ids(&merged, "root"), vec!["a"]);
}

#[test]
fn merge_with_empty_graft_is_plain_union() {
    let base = build(branching_nodes(), Some("a"));
    let empty = build(Vec::new(), None);

    let merged = base.merge(&empty, &NodeId::from("a")).unwrap();
    assert_eq!(merged, base);
}

#[test]
fn merge_onto_unknown_attachment_orphans_branch() {
    let base = build(branching_nodes(), Some("a"));
    let graft = build(chain(&["x", "y"]), None);

    let merged = base.merge(&graft, &NodeId::from("ghost")).unwrap();

    assert_eq!(child_ids(&merged, "ghost"), vec!["x"]);
    assert_eq!(merged.len(), 6);
    assert_eq!(ids(merged.level_order()), vec!["a", "b", "c", "d"]);
    assert_eq!(merged.descendants(), Some(3));
}

#[test]
fn merge_does_not_duplicate_existing_child() {
    let base = build(chain(&["a", "b"]), None);
    // the graft root already names `a` as its parent
    let graft = build(vec![node("c", Some("a"), 5)], None);

    let merged = base.merge(&graft, &NodeId::from("a")).unwrap();
    assert_eq!(child_ids(&merged, "a"), vec!["b", "c"]);
    assert_eq!(ids(merged.level_order()), vec!["a", "b", "c"]);
}

#[test]
fn merge_lists_graft_root_once_when_base_already_has_it() {
    let base = build(vec![node("a", None, 0), node("x", Some("a"), 1)], None);
    let graft = build(chain(&["x", "y"]), None);

    let merged = base.merge(&graft, &NodeId::from("a")).unwrap();

    assert_eq!(child_ids(&merged, "a"), vec!["x"]);
    assert_eq!(child_ids(&merged, "x"), vec!["y"]);
    assert_eq!(ids(merged.level_order()), vec!["a", "x", "y"]);
}

#[test]
fn merge_moves_graft_root_away_from_base_parent() {
    let base = build(
        vec![
            node("a", None, 0),
            node("p", Some("a"), 1),
            node("x", Some("p"), 2),
        ],
        None,
    );
    let graft = build(chain(&["x", "y"]), None);

    let merged = base.merge(&graft, &NodeId::from("a")).unwrap();

    let parent = merged.node("x").and_then(|x| merged.parent(x));
    assert_eq!(parent.map(|n| n.id.as_str()), Some("a"));
    assert!(child_ids(&merged, "p").is_empty());
    assert_eq!(child_ids(&merged, "a"), vec!["p", "x"]);
    assert_eq!(merged.level_order().count(), merged.len());
}

#[test]
fn merge_onto_own_root_is_rejected() {
    let base = build(chain(&["a"]), None);
    let graft = build(chain(&["x", "y"]), None);

    let result: Result<IndexedProcessTree, TreeError> = base.merge(&graft, &NodeId::from("x"));
    assert_eq!(
        result.unwrap_err(),
        TreeError::CyclicAncestry {
            node: NodeId::from("x")
        }
    );
}
