//! Graph-property validation.
//!
//! [`validate`] classifies a node/edge list as a DAG, a rooted tree, or a
//! bipartite graph and names the edges responsible when it is not. It is
//! pure and total: every finite input, including the empty graph and graphs
//! with dangling edge endpoints, produces a [`ValidationResult`].
//!
//! Evaluation order is fixed. Nodes are visited in input order and each
//! node's outgoing edges in edge-list order, so the same input always
//! reports the same offending edges.

use std::collections::{BTreeSet, HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::Graph;
use crate::types::{Edge, Node};

/// The graph property to check.
///
/// Serialises as a lowercase string (e.g. `"dag"`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Directed, acyclic, every node connected.
    #[default]
    Dag,
    /// Exactly one root, one parent per node, no cycle.
    Tree,
    /// Nodes split into two groups with edges only between groups.
    Bipartite,
}

impl std::fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationMode::Dag => write!(f, "dag"),
            ValidationMode::Tree => write!(f, "tree"),
            ValidationMode::Bipartite => write!(f, "bipartite"),
        }
    }
}

impl std::str::FromStr for ValidationMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dag" => Ok(ValidationMode::Dag),
            "tree" => Ok(ValidationMode::Tree),
            "bipartite" => Ok(ValidationMode::Bipartite),
            _ => Err(format!(
                "unknown validation mode {:?}; expected one of: dag, tree, bipartite",
                s
            )),
        }
    }
}

/// Why a graph failed validation. The `Display` text is the user-facing
/// reason string.
#[derive(Debug, Clone, Error, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    #[error("Self-loop or invalid edge direction detected")]
    InvalidEdge,

    #[error("DAG has too few nodes: at least 2 are required")]
    TooFewNodes,

    #[error("Not all nodes are connected: disconnected node(s) found")]
    DisconnectedNodes,

    #[error("Cycle detected: not a DAG")]
    Cycle,

    #[error("Tree must have exactly one root node")]
    RootCount,

    #[error("Tree traversal revisited a node: cycle detected")]
    TreeCycle,

    #[error("A node has more than one parent")]
    MultipleParents,

    #[error("Same group nodes connected: not bipartite")]
    SameGroup,
}

/// The outcome of [`validate`].
///
/// Serialises with camelCase keys for the host:
/// `{ "valid": false, "reason": "...", "offendingEdgeIds": [...], "violation": "cycle" }`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    pub reason: String,
    pub offending_edge_ids: BTreeSet<String>,
    pub violation: Option<Violation>,
}

impl ValidationResult {
    fn ok(mode: ValidationMode) -> Self {
        let reason = match mode {
            ValidationMode::Dag => "Graph is a valid DAG",
            ValidationMode::Tree => "Graph is a valid tree",
            ValidationMode::Bipartite => "Graph is bipartite",
        };
        Self {
            valid: true,
            reason: reason.into(),
            offending_edge_ids: BTreeSet::new(),
            violation: None,
        }
    }

    fn fail(violation: Violation) -> Self {
        Self::fail_with_edges(violation, BTreeSet::new())
    }

    fn fail_with_edges(violation: Violation, offending_edge_ids: BTreeSet<String>) -> Self {
        Self {
            valid: false,
            reason: violation.to_string(),
            offending_edge_ids,
            violation: Some(violation),
        }
    }
}

/// Classify `nodes` / `edges` under `mode`.
///
/// Every mode first rejects the first edge (in edge-list order) that is a
/// self-loop or joins two same-side handles; that edge alone is reported.
pub fn validate(nodes: &[Node], edges: &[Edge], mode: ValidationMode) -> ValidationResult {
    let result = match edges.iter().find(|e| !e.is_well_formed()) {
        Some(bad) => ValidationResult::fail_with_edges(
            Violation::InvalidEdge,
            BTreeSet::from([bad.id.clone()]),
        ),
        None => {
            let graph = Graph::new(nodes, edges);
            match mode {
                ValidationMode::Dag => validate_dag(&graph),
                ValidationMode::Tree => validate_tree(&graph),
                ValidationMode::Bipartite => validate_bipartite(&graph),
            }
        }
    };

    tracing::debug!(
        %mode,
        nodes = nodes.len(),
        edges = edges.len(),
        valid = result.valid,
        offending = result.offending_edge_ids.len(),
        "validated graph"
    );
    result
}

// --- DAG ---------------------------------------------------------------------

fn validate_dag(graph: &Graph<'_>) -> ValidationResult {
    if graph.len() < 2 {
        return ValidationResult::fail(Violation::TooFewNodes);
    }
    if (0..graph.len()).any(|i| graph.is_isolated(i)) {
        return ValidationResult::fail(Violation::DisconnectedNodes);
    }

    let cycle_edges = find_cycle_edges(graph);
    if cycle_edges.is_empty() {
        ValidationResult::ok(ValidationMode::Dag)
    } else {
        ValidationResult::fail_with_edges(Violation::Cycle, cycle_edges)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Depth-first search that collects the edges of every back-edge cycle.
///
/// `path[k]` is the edge used to enter `stack[k + 1]`. When an edge closes
/// onto a node still on the stack, that edge and the path edges back to the
/// one leaving the ancestor are the cycle.
fn find_cycle_edges(graph: &Graph<'_>) -> BTreeSet<String> {
    let edges = graph.edges();
    let mut mark = vec![Mark::Unvisited; graph.len()];
    let mut cycle = BTreeSet::new();

    for start in 0..graph.len() {
        if mark[start] != Mark::Unvisited {
            continue;
        }

        // (node, position in its outgoing list)
        let mut stack: Vec<(usize, usize)> = vec![(start, 0)];
        let mut path: Vec<usize> = Vec::new();
        mark[start] = Mark::OnStack;

        while let Some(&(node, next)) = stack.last() {
            let Some(&e) = graph.outgoing(node).get(next) else {
                mark[node] = Mark::Done;
                stack.pop();
                path.pop();
                continue;
            };
            let top = stack.len() - 1;
            stack[top].1 += 1;

            let Some(child) = graph.target_of(e) else {
                continue;
            };
            match mark[child] {
                Mark::Unvisited => {
                    mark[child] = Mark::OnStack;
                    stack.push((child, 0));
                    path.push(e);
                }
                Mark::OnStack => {
                    cycle.insert(edges[e].id.clone());
                    for &p in path.iter().rev() {
                        cycle.insert(edges[p].id.clone());
                        if graph.source_of(p) == Some(child) {
                            break;
                        }
                    }
                }
                Mark::Done => {}
            }
        }
    }

    cycle
}

// --- Tree --------------------------------------------------------------------

fn validate_tree(graph: &Graph<'_>) -> ValidationResult {
    let roots = graph.roots();
    let [root] = roots.as_slice() else {
        return ValidationResult::fail(Violation::RootCount);
    };

    if revisits_from(graph, *root) {
        return ValidationResult::fail(Violation::TreeCycle);
    }

    // Nodes unreachable from the root are not inspected beyond this check.
    if (0..graph.len()).any(|i| graph.in_degree(i) > 1) {
        return ValidationResult::fail(Violation::MultipleParents);
    }

    ValidationResult::ok(ValidationMode::Tree)
}

/// True if walking every outgoing edge from `root` arrives at some node
/// twice, whether through a cycle or through a second parent.
fn revisits_from(graph: &Graph<'_>, root: usize) -> bool {
    let mut visited = vec![false; graph.len()];
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        if visited[node] {
            return true;
        }
        visited[node] = true;
        stack.extend(graph.children(node).into_iter().rev());
    }
    false
}

// --- Bipartite ---------------------------------------------------------------

fn validate_bipartite(graph: &Graph<'_>) -> ValidationResult {
    let adj = graph.undirected_neighbours();
    let mut color: HashMap<&str, u8> = HashMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    for node in graph.nodes() {
        let seed = node.id.as_str();
        if color.contains_key(seed) {
            continue;
        }
        color.insert(seed, 1);
        queue.push_back(seed);

        while let Some(current) = queue.pop_front() {
            let current_color = color.get(current).copied().unwrap_or(1);
            for &neighbour in adj.get(current).map(Vec::as_slice).unwrap_or(&[]) {
                match color.get(neighbour) {
                    None => {
                        color.insert(neighbour, 3 - current_color);
                        queue.push_back(neighbour);
                    }
                    Some(&c) if c == current_color => {
                        return ValidationResult::fail(Violation::SameGroup);
                    }
                    Some(_) => {}
                }
            }
        }
    }

    ValidationResult::ok(ValidationMode::Bipartite)
}

// --- tests -------------------------------------------------------------------
