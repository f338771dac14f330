//! Behavioural tests for the public engine API.
//!
//! Hand-written graphs pin the documented scenarios; seeded random graphs
//! check the properties that must hold for every input.
//!
//! # Coverage
//!
//! | Test | Property |
//! |------|----------|
//! | `self_loop_is_reported_in_every_mode` | pre-check, all modes |
//! | `same_side_edge_is_reported_in_every_mode` | pre-check, all modes |
//! | `three_cycle_reports_all_three_edges` | DAG cycle edges |
//! | `single_edge_pair_is_a_valid_dag` | DAG minimum |
//! | `tree_accepts_proper_tree_rejects_two_roots` | tree roots |
//! | `odd_cycle_not_bipartite_even_cycle_is` | bipartite parity |
//! | `random_dag_validity_matches_cycle_existence` | DAG ⇔ acyclic |
//! | `random_layouts_are_total_and_deterministic` | layout contract |
//! | `history_branch_is_abandoned` | undo/redo |
//! | `document_round_trip_through_session` | import/export |

use std::collections::{BTreeSet, HashSet};

use dagbuilder::{
    layout, layout_with_config, validate, Direction, Edge, EditorConfig, EditorSession,
    GraphDocument, Handle, History, LayoutConfig, LayoutMode, Node, Position, ValidationMode,
    Violation,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ALL_MODES: [ValidationMode; 3] = [
    ValidationMode::Dag,
    ValidationMode::Tree,
    ValidationMode::Bipartite,
];

fn nodes(ids: &[&str]) -> Vec<Node> {
    ids.iter()
        .map(|id| Node::with_id(*id, *id, Position::default()))
        .collect()
}

fn link(id: &str, s: &str, t: &str) -> Edge {
    Edge::link(id, s, t)
}

/// Random graph over `n` nodes. Edges never form self-loops and always use
/// distinct handles so only the mode-specific rules are exercised.
fn random_graph(rng: &mut StdRng, n: usize, m: usize) -> (Vec<Node>, Vec<Edge>) {
    let ns: Vec<Node> = (0..n)
        .map(|i| Node::with_id(format!("n{i}"), format!("n{i}"), Position::default()))
        .collect();
    let mut es = Vec::with_capacity(m);
    for k in 0..m {
        let s = rng.gen_range(0..n);
        let mut t = rng.gen_range(0..n);
        if t == s {
            t = (t + 1) % n;
        }
        es.push(link(&format!("e{k}"), &format!("n{s}"), &format!("n{t}")));
    }
    (ns, es)
}

/// Kahn's algorithm over the random graph; true when every node drains.
fn is_acyclic(ns: &[Node], es: &[Edge]) -> bool {
    let idx = |id: &str| ns.iter().position(|n| n.id == id);
    let mut indeg = vec![0usize; ns.len()];
    let mut out = vec![Vec::new(); ns.len()];
    for e in es {
        let (Some(s), Some(t)) = (idx(e.source.as_str()), idx(e.target.as_str())) else {
            continue;
        };
        out[s].push(t);
        indeg[t] += 1;
    }
    let mut queue: Vec<usize> = (0..ns.len()).filter(|&i| indeg[i] == 0).collect();
    let mut seen = 0;
    while let Some(u) = queue.pop() {
        seen += 1;
        for &v in &out[u] {
            indeg[v] -= 1;
            if indeg[v] == 0 {
                queue.push(v);
            }
        }
    }
    seen == ns.len()
}

// --- validation ---------------------------------------------------------------

#[test]
fn self_loop_is_reported_in_every_mode() {
    let ns = nodes(&["a", "b"]);
    let es = vec![link("ok", "a", "b"), link("loop", "b", "b")];
    for mode in ALL_MODES {
        let r = validate(&ns, &es, mode);
        assert!(!r.valid, "{mode}");
        assert_eq!(r.violation, Some(Violation::InvalidEdge));
        assert_eq!(r.offending_edge_ids, BTreeSet::from(["loop".to_string()]));
    }
}

#[test]
fn same_side_edge_is_reported_in_every_mode() {
    let ns = nodes(&["a", "b"]);
    let mut bad = link("bad", "a", "b");
    bad.target_handle = Handle::Right;
    for mode in ALL_MODES {
        let r = validate(&ns, std::slice::from_ref(&bad), mode);
        assert!(!r.valid, "{mode}");
        assert_eq!(r.offending_edge_ids.len(), 1);
        assert!(r.offending_edge_ids.contains("bad"));
    }
}

#[test]
fn three_cycle_reports_all_three_edges() {
    let ns = nodes(&["n1", "n2", "n3"]);
    let es = vec![
        link("e1", "n1", "n2"),
        link("e2", "n2", "n3"),
        link("e3", "n3", "n1"),
    ];
    let r = validate(&ns, &es, ValidationMode::Dag);
    assert!(!r.valid);
    assert!(r.reason.to_lowercase().contains("cycle"));
    let expected: HashSet<&str> = ["e1", "e2", "e3"].into();
    let got: HashSet<&str> = r.offending_edge_ids.iter().map(String::as_str).collect();
    assert_eq!(got, expected);
}

#[test]
fn single_edge_pair_is_a_valid_dag() {
    let ns = nodes(&["a", "b"]);
    let r = validate(&ns, &[link("e", "a", "b")], ValidationMode::Dag);
    assert!(r.valid);
    assert!(r.offending_edge_ids.is_empty());
}

#[test]
fn tree_accepts_proper_tree_rejects_two_roots() {
    let ns = nodes(&["r", "a", "b", "c"]);
    let tree = vec![link("1", "r", "a"), link("2", "r", "b"), link("3", "a", "c")];
    assert!(validate(&ns, &tree, ValidationMode::Tree).valid);

    let ns = nodes(&["r1", "r2", "c"]);
    let forest = vec![link("1", "r1", "c"), link("2", "r2", "c")];
    let r = validate(&ns, &forest, ValidationMode::Tree);
    assert!(!r.valid);
    assert!(r.reason.contains("one root"));
}

#[test]
fn odd_cycle_not_bipartite_even_cycle_is() {
    let tri = nodes(&["a", "b", "c"]);
    let tri_edges = vec![link("1", "a", "b"), link("2", "b", "c"), link("3", "c", "a")];
    let r = validate(&tri, &tri_edges, ValidationMode::Bipartite);
    assert!(!r.valid);
    assert!(r.offending_edge_ids.is_empty());

    let sq = nodes(&["a", "b", "c", "d"]);
    let sq_edges = vec![
        link("1", "a", "b"),
        link("2", "b", "c"),
        link("3", "c", "d"),
        link("4", "d", "a"),
    ];
    assert!(validate(&sq, &sq_edges, ValidationMode::Bipartite).valid);
}

#[test]
fn random_dag_validity_matches_cycle_existence() {
    let mut rng = StdRng::seed_from_u64(0x0DA6);
    for _ in 0..200 {
        let n = rng.gen_range(2..12);
        let m = rng.gen_range(n..n * 2);
        let (ns, es) = random_graph(&mut rng, n, m);
        let touched: HashSet<&str> = es
            .iter()
            .flat_map(|e| [e.source.as_str(), e.target.as_str()])
            .collect();
        if ns.iter().any(|n| !touched.contains(n.id.as_str())) {
            continue;
        }

        let r = validate(&ns, &es, ValidationMode::Dag);
        assert_eq!(r.valid, is_acyclic(&ns, &es), "{es:?}");
        if !r.valid {
            assert!(!r.offending_edge_ids.is_empty());
            // The reported edges alone must contain a cycle.
            let sub: Vec<Edge> = es
                .iter()
                .filter(|e| r.offending_edge_ids.contains(&e.id))
                .cloned()
                .collect();
            assert!(!is_acyclic(&ns, &sub), "reported edges {sub:?} are acyclic");
        }
        assert_eq!(r, validate(&ns, &es, ValidationMode::Dag));
    }
}

// --- layout -------------------------------------------------------------------

#[test]
fn random_layouts_are_total_and_deterministic() {
    let mut rng = StdRng::seed_from_u64(7);
    let directions = [Direction::TB, Direction::BT, Direction::LR, Direction::RL];
    for round in 0..60 {
        let n = rng.gen_range(1..25);
        let m = rng.gen_range(0..n * 2);
        let (ns, es) = random_graph(&mut rng, n.max(2), m);
        let config = LayoutConfig::default().with_direction(directions[round % 4]);

        for mode in [LayoutMode::Layered, LayoutMode::Tree] {
            let first = layout_with_config(&ns, &es, mode, &config);
            let second = layout_with_config(&ns, &es, mode, &config);
            assert_eq!(first, second, "{mode} not deterministic");
            assert_eq!(first.len(), ns.len(), "{mode}");
            for node in &ns {
                let p = first[&node.id];
                assert!(p.x.is_finite() && p.y.is_finite());
            }
        }
    }
}

#[test]
fn layered_boxes_do_not_overlap() {
    let mut rng = StdRng::seed_from_u64(99);
    let (ns, es) = random_graph(&mut rng, 15, 20);
    let p = layout(&ns, &es, LayoutMode::Layered);
    let boxes: Vec<Position> = p.values().copied().collect();
    for (i, a) in boxes.iter().enumerate() {
        for b in &boxes[i + 1..] {
            let apart_x = (a.x - b.x).abs() >= 172.0 - 1e-6;
            let apart_y = (a.y - b.y).abs() >= 36.0 - 1e-6;
            assert!(apart_x || apart_y, "{a:?} overlaps {b:?}");
        }
    }
}

// --- history and session ------------------------------------------------------

#[test]
fn history_branch_is_abandoned() {
    let mut h = History::new(&[], &[]);
    let a = nodes(&["A"]);
    let b = nodes(&["A", "B"]);
    let c = nodes(&["A", "C"]);
    h.record(&a, &[]);
    h.record(&b, &[]);
    h.undo();
    h.record(&c, &[]);
    assert_eq!(h.current().nodes, c);
    assert!(h.redo().is_none());

    let mut h = History::new(&[], &[]);
    h.record(&a, &[]);
    assert!(h.undo().is_some());
    assert!(h.undo().is_none());
    assert!(h.current().nodes.is_empty());
}

#[test]
fn document_round_trip_through_session() {
    let json = r#"{
        "nodes": [
            { "id": "load", "label": "Load", "position": { "x": 0, "y": 0 } },
            { "id": "clean", "label": "Clean" }
        ],
        "edges": [
            { "id": "e1", "source": "load", "target": "clean",
              "sourceHandle": "b", "targetHandle": "a" }
        ]
    }"#;
    let doc = GraphDocument::from_json(json).unwrap();
    let mut session = EditorSession::from_document(doc.clone(), EditorConfig::default());
    assert!(session.validation().valid);

    session.auto_layout(LayoutMode::Layered);
    let out = session.to_document();
    assert_eq!(out.edges, doc.edges);
    assert_ne!(out.nodes[0].position, out.nodes[1].position);

    let reparsed = GraphDocument::from_json(&out.to_json_pretty().unwrap()).unwrap();
    assert_eq!(reparsed, out);
}
