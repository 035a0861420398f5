//! Integration Tests for the Impact Engine
//!
//! These tests drive ingestion, level expansion, tree building and lazy
//! expansion together through the public API.

use std::collections::HashSet;

use depspy_core::{
    ChangeRecord, Direction, ExportReason, ImpactGraph, Session, TreeNode, SIDE_EFFECT_NAME,
};

/// A module exporting `v` whose export changed because of `v` in each import.
fn module(id: &str, imports: &[&str]) -> ChangeRecord {
    let mut record = ChangeRecord::new(id);
    record.imported_ids = imports.iter().map(|s| s.to_string()).collect();
    record.rendered_exports = vec!["v".into()];
    if !imports.is_empty() {
        record.export_effected_names_to_reasons.insert(
            "v".into(),
            ExportReason::from_imports(imports.iter().map(|import| (*import, ["v"]))),
        );
    }
    record
}

/// a -> b, a -> c, b -> d, c -> d
fn diamond() -> Vec<ChangeRecord> {
    vec![
        module("a", &["b", "c"]),
        module("b", &["d"]),
        module("c", &["d"]),
        module("d", &[]),
    ]
}

/// Deterministic pseudo-random graph with static and dynamic edges.
fn scrambled(size: usize) -> Vec<ChangeRecord> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    (0..size)
        .map(|i| {
            let mut record = ChangeRecord::new(format!("m{i}"));
            for _ in 0..(next() % 4) {
                record.imported_ids.push(format!("m{}", next() as usize % size));
            }
            if next() % 3 == 0 {
                record
                    .dynamically_imported_ids
                    .push(format!("m{}", next() as usize % size));
            }
            record.rendered_exports = vec![format!("e{i}")];
            record.removed_exports = vec![format!("e{i}"), format!("dead{i}")];
            record.is_git_change = next() % 5 == 0;
            record
        })
        .collect()
}

fn graph_ids(nodes: &[TreeNode]) -> Vec<&str> {
    nodes.iter().map(TreeNode::graph_id).collect()
}

/// Levels at or past the bound must be collapsed leaves.
fn assert_depth_bound(node: &TreeNode, level: usize, max_level: usize) {
    if level + 1 >= max_level {
        assert!(node.collapsed, "{} at level {level} should be collapsed", node.id);
        assert!(node.is_leaf(), "{} at level {level} should have no children", node.id);
    }
    for child in &node.children {
        assert_depth_bound(child, level + 1, max_level);
    }
}

/// Every edge is mirrored by an importer entry on the imported side, and vice versa.
#[test]
fn reverse_edges_are_consistent() {
    let graph = ImpactGraph::from_records(scrambled(200));

    for a in graph.nodes() {
        for b_id in a.imported_ids() {
            if let Some(b) = graph.get(b_id) {
                assert!(b.importers().contains(a.id()));
            }
        }
        for b_id in a.dynamically_imported_ids() {
            if let Some(b) = graph.get(b_id) {
                assert!(b.dynamic_importers().contains(a.id()));
            }
        }
        for importer in a.importers() {
            let importer = graph.get(importer).unwrap();
            assert!(importer.imported_ids().iter().any(|id| id == a.id()));
        }
        for importer in a.dynamic_importers() {
            let importer = graph.get(importer).unwrap();
            assert!(importer.dynamically_imported_ids().iter().any(|id| id == a.id()));
        }
    }
}

/// Permuting a batch with unique ids yields the same graph.
#[test]
fn ingestion_ignores_record_order() {
    let records = scrambled(120);
    let forward = ImpactGraph::from_records(records.clone());

    let mut reversed = records.clone();
    reversed.reverse();
    assert_eq!(forward, ImpactGraph::from_records(reversed));

    let mut rotated = records;
    rotated.rotate_left(37);
    assert_eq!(forward, ImpactGraph::from_records(rotated));
}

/// No export is both rendered and removed after ingestion.
#[test]
fn rendered_and_removed_exports_are_disjoint() {
    let graph = ImpactGraph::from_records(scrambled(80));
    for node in graph.nodes() {
        assert!(node.rendered_exports().is_disjoint(node.removed_exports()));
        assert!(!node.removed_exports().is_empty());
    }
}

/// Nodes on the last permitted level are collapsed leaves.
#[test]
fn trees_respect_the_depth_bound() {
    let records: Vec<ChangeRecord> = (0..10)
        .map(|i| {
            let next = format!("n{}", i + 1);
            if i < 9 {
                module(&format!("n{i}"), &[next.as_str()])
            } else {
                module(&format!("n{i}"), &[])
            }
        })
        .collect();
    let mut session = Session::new();
    session.ingest(records);

    for max_level in 1..=6 {
        let tree = session.build_tree("n0", Direction::Forward, max_level).unwrap();
        assert_eq!(tree.depth(), max_level - 1);
        assert_depth_bound(tree, 0, max_level);
    }
}

/// A two-module cycle stops at the repeated module.
#[test]
fn cycles_terminate() {
    let mut session = Session::new();
    session.ingest(vec![module("a", &["b"]), module("b", &["a"])]);

    let tree = session.build_tree("a", Direction::Forward, 5).unwrap();
    assert_eq!(tree.id, "a-1");
    let b = &tree.children[0];
    assert_eq!(b.id, "b-1");
    let again = &b.children[0];
    assert_eq!(again.id, "a-2");
    assert!(again.is_leaf());
    assert!(!again.collapsed);
    assert_eq!(again.paths, vec!["a", "b"]);
}

/// Reverse trees stop on cycles through importers as well.
#[test]
fn reverse_cycles_terminate() {
    let mut session = Session::new();
    session.ingest(vec![
        module("a", &["b"]),
        module("b", &["c"]),
        module("c", &["a"]),
    ]);

    let tree = session.build_tree("a", Direction::Reverse, 10).unwrap();
    let mut order = Vec::new();
    tree.walk(&mut |node| order.push(node.id.clone()));
    assert_eq!(order, vec!["a-1", "c-1", "b-1", "a-2"]);
}

/// A module reached twice gets two distinct tree ids.
#[test]
fn tree_ids_are_unique() {
    let mut session = Session::new();
    session.ingest(diamond());
    let tree = session.build_tree("a", Direction::Forward, 4).unwrap();

    let mut ids = HashSet::new();
    tree.walk(&mut |node| {
        assert!(ids.insert(node.id.clone()), "duplicate id {}", node.id);
    });
    assert_eq!(ids.len(), tree.len());
    assert!(ids.contains("d-1"));
    assert!(ids.contains("d-2"));
}

/// Expanding the collapsed level gives the children a deeper build would.
#[test]
fn lazy_expansion_matches_eager_build() {
    for direction in [Direction::Forward, Direction::Reverse] {
        let root_id = match direction {
            Direction::Forward => "a",
            Direction::Reverse => "d",
        };

        let mut eager = Session::new();
        eager.ingest(diamond());
        let eager_tree = eager.build_tree(root_id, direction, 3).unwrap().clone();

        let mut lazy = Session::new();
        lazy.ingest(diamond());
        let collapsed: Vec<String> = lazy
            .build_tree(root_id, direction, 2)
            .unwrap()
            .children
            .iter()
            .map(|child| child.id.clone())
            .collect();
        assert!(!collapsed.is_empty());

        for tree_id in &collapsed {
            assert!(lazy.expand_node(tree_id, direction).unwrap());
        }

        let lazy_tree = lazy.root().unwrap();
        assert_eq!(graph_ids(&lazy_tree.children), graph_ids(&eager_tree.children));
        for (lazy_child, eager_child) in lazy_tree.children.iter().zip(&eager_tree.children) {
            assert_eq!(graph_ids(&lazy_child.children), graph_ids(&eager_child.children));
            assert!(lazy_child.children.iter().all(|c| c.collapsed));
        }
    }
}

/// Ids minted by lazy expansion continue the tree's occurrence counts.
#[test]
fn lazy_expansion_keeps_ids_unique() {
    let mut session = Session::new();
    session.ingest(diamond());
    session.build_tree("a", Direction::Forward, 2).unwrap();
    session.expand_node("b-1", Direction::Forward).unwrap();
    session.expand_node("c-1", Direction::Forward).unwrap();

    let root = session.root().unwrap();
    assert_eq!(root.find("b-1").unwrap().children[0].id, "d-1");
    assert_eq!(root.find("c-1").unwrap().children[0].id, "d-2");
    assert_eq!(root.find("d-2").unwrap().paths, vec!["a", "c"]);
}

/// A imports B, and A's export changed because of B's export.
#[test]
fn single_import_scenario() {
    let mut a = ChangeRecord::new("A");
    a.imported_ids = vec!["B".into()];
    a.rendered_exports = vec!["x".into()];
    a.export_effected_names_to_reasons
        .insert("x".into(), ExportReason::from_imports([("B", ["y"])]));
    let mut b = ChangeRecord::new("B");
    b.rendered_exports = vec!["y".into()];

    let mut session = Session::new();
    session.ingest(vec![a, b]);

    let level = session.next_level("A", Direction::Forward).unwrap();
    assert_eq!(level.len(), 1);
    let selected = level.select_exports("B").unwrap();
    assert_eq!(selected.len(), 2);
    assert!(selected.contains("y"));
    assert!(selected.contains(SIDE_EFFECT_NAME));

    let tree = session.build_tree("A", Direction::Forward, 3).unwrap();
    assert_eq!(tree.len(), 2);
    assert!(!tree.collapsed);
    assert!(!tree.children[0].collapsed);

    let tree = session.build_tree("A", Direction::Forward, 2).unwrap();
    assert!(tree.children[0].collapsed);
}

/// A JSON payload goes in and a renderer-shaped tree comes out.
#[test]
fn json_session_round_trip() {
    let payload = r#"[
        {
            "relativeId": "/src/pages/home/index.tsx",
            "importedIds": ["/src/utils/format.ts", "/src/polyfill.ts"],
            "renderedExports": ["default"],
            "isImportChange": true,
            "exportEffectedNamesToReasons": {
                "default": { "importEffectedNames": { "/src/utils/format.ts": ["formatDate"] } }
            }
        },
        {
            "relativeId": "/src/utils/format.ts",
            "renderedExports": ["formatDate"],
            "removedExports": ["formatTime"],
            "isGitChange": true
        },
        { "relativeId": "/src/polyfill.ts", "isSideEffectChange": true }
    ]"#;

    let mut session = Session::new();
    assert_eq!(session.ingest_json(payload).unwrap(), 3);
    assert!(session.graph().git_changes().contains("/src/utils/format.ts"));
    assert!(session.graph().import_changes().contains("/src/pages/home/index.tsx"));

    let tree = session
        .build_tree("/src/pages/home/index.tsx", Direction::Forward, 3)
        .unwrap();
    let json = serde_json::to_value(tree).unwrap();
    assert_eq!(json["id"], "/src/pages/home/index.tsx-1");
    assert_eq!(json["children"][0]["relativeId"], "/src/utils/format.ts");
    assert_eq!(json["children"][1]["relativeId"], "/src/polyfill.ts");
    assert_eq!(json["children"][1]["isSideEffectChange"], true);
    assert_eq!(json["children"][0]["paths"][0], "/src/pages/home/index.tsx");

    let tree = session
        .build_tree("/src/utils/format.ts", Direction::Reverse, 3)
        .unwrap();
    assert_eq!(graph_ids(&tree.children), vec!["/src/pages/home/index.tsx"]);
    assert!(!session.can_expand("/src/polyfill.ts-1", Direction::Reverse));
}
