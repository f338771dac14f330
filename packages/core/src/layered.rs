//! Layered (Sugiyama-style) placement.
//!
//! # Pipeline
//! 1. Cycle removal: greedy source/sink peeling; back edges are reversed for
//!    ranking only, so cyclic input still lays out.
//! 2. Ranking: longest path over a topological order. Isolated nodes land on
//!    rank 0.
//! 3. Ordering: alternating barycenter sweeps, keeping the order with the
//!    fewest crossings seen.
//! 4. Coordinates: packed and centred per rank, pulled toward neighbour
//!    medians, then de-overlapped.
//! 5. Direction remap and translation from box centres to top-left corners,
//!    normalised so the smallest corner is `(0, 0)`.
//!
//! Ties are always broken by input order; there is no randomness.

use crate::graph::Graph;
use crate::layout::{Direction, LayoutConfig, Positions};
use crate::types::Position;

/// Dense adjacency over the distinct nodes of a [`Graph`].
struct RankGraph {
    /// `verts[v]` is the node index of vertex `v`.
    verts: Vec<usize>,
    adj: Vec<Vec<usize>>,
    radj: Vec<Vec<usize>>,
}

impl RankGraph {
    fn from_graph(graph: &Graph<'_>) -> Self {
        let mut verts = Vec::with_capacity(graph.len());
        let mut vert_of = vec![usize::MAX; graph.len()];
        for (i, node) in graph.nodes().iter().enumerate() {
            if graph.index_of(&node.id) == Some(i) {
                vert_of[i] = verts.len();
                verts.push(i);
            }
        }

        let n = verts.len();
        let mut adj = vec![Vec::new(); n];
        let mut radj = vec![Vec::new(); n];
        for e in 0..graph.edges().len() {
            let (Some(s), Some(t)) = (graph.source_of(e), graph.target_of(e)) else {
                continue;
            };
            let (u, v) = (vert_of[s], vert_of[t]);
            if u != v {
                adj[u].push(v);
                radj[v].push(u);
            }
        }

        Self { verts, adj, radj }
    }

    fn len(&self) -> usize {
        self.verts.len()
    }
}

pub(crate) fn layered(graph: &Graph<'_>, config: &LayoutConfig) -> Positions {
    let mut rg = RankGraph::from_graph(graph);
    if rg.len() == 0 {
        return Positions::new();
    }

    remove_cycles(&mut rg);
    let ranks = assign_ranks(&rg);
    let layers = order_layers(&ranks, &rg, config.crossing_sweeps);

    // Breadth is the box extent along a rank, depth across ranks.
    let (breadth, depth) = if config.direction.is_horizontal() {
        (config.node_height, config.node_width)
    } else {
        (config.node_width, config.node_height)
    };
    let (along, across) = assign_coordinates(&layers, &rg, breadth, depth, config);
    let (cx, cy) = remap_for_direction(along, across, config.direction);

    let min_x = cx.iter().copied().fold(f64::INFINITY, f64::min);
    let min_y = cy.iter().copied().fold(f64::INFINITY, f64::min);

    // Shifting centres so the outermost box edges touch 0 and then taking
    // the corner cancels the half-box offset: corner = centre - min centre.
    let nodes = graph.nodes();
    rg.verts
        .iter()
        .enumerate()
        .map(|(v, &i)| {
            let corner = Position::new(cx[v] - min_x, cy[v] - min_y);
            (nodes[i].id.clone(), corner)
        })
        .collect()
}

// --- Phase 1: cycle removal --------------------------------------------------

fn remove_cycles(rg: &mut RankGraph) {
    let n = rg.len();
    let mut in_deg: Vec<usize> = rg.radj.iter().map(Vec::len).collect();
    let mut out_deg: Vec<usize> = rg.adj.iter().map(Vec::len).collect();
    let mut removed = vec![false; n];
    let mut left_order = Vec::with_capacity(n);
    let mut right_order = Vec::new();
    let mut remaining = n;

    while remaining > 0 {
        let mut progress = false;

        for v in 0..n {
            if !removed[v] && out_deg[v] == 0 {
                removed[v] = true;
                remaining -= 1;
                right_order.push(v);
                for &u in &rg.radj[v] {
                    out_deg[u] = out_deg[u].saturating_sub(1);
                }
                progress = true;
            }
        }

        for v in 0..n {
            if !removed[v] && in_deg[v] == 0 {
                removed[v] = true;
                remaining -= 1;
                left_order.push(v);
                for &w in &rg.adj[v] {
                    in_deg[w] = in_deg[w].saturating_sub(1);
                }
                progress = true;
            }
        }

        if !progress {
            // Only cycles remain: peel the node with the largest out - in
            // surplus, lowest index first.
            let best = (0..n).filter(|&v| !removed[v]).max_by(|&a, &b| {
                let da = out_deg[a] as isize - in_deg[a] as isize;
                let db = out_deg[b] as isize - in_deg[b] as isize;
                da.cmp(&db).then_with(|| b.cmp(&a))
            });
            let Some(v) = best else { break };
            removed[v] = true;
            remaining -= 1;
            left_order.push(v);
            for &w in &rg.adj[v] {
                in_deg[w] = in_deg[w].saturating_sub(1);
            }
            for &u in &rg.radj[v] {
                out_deg[u] = out_deg[u].saturating_sub(1);
            }
        }
    }

    right_order.reverse();
    left_order.extend(right_order);
    let mut pos = vec![0usize; n];
    for (i, &v) in left_order.iter().enumerate() {
        pos[v] = i;
    }

    let mut adj = vec![Vec::new(); n];
    let mut radj = vec![Vec::new(); n];
    for u in 0..n {
        for &v in &rg.adj[u] {
            let (a, b) = if pos[u] > pos[v] { (v, u) } else { (u, v) };
            adj[a].push(b);
            radj[b].push(a);
        }
    }
    rg.adj = adj;
    rg.radj = radj;
}

// --- Phase 2: ranking --------------------------------------------------------

fn assign_ranks(rg: &RankGraph) -> Vec<usize> {
    let n = rg.len();
    let mut in_deg: Vec<usize> = rg.radj.iter().map(Vec::len).collect();
    let mut ready: std::collections::VecDeque<usize> =
        (0..n).filter(|&v| in_deg[v] == 0).collect();
    let mut rank = vec![0usize; n];

    while let Some(u) = ready.pop_front() {
        for &v in &rg.adj[u] {
            rank[v] = rank[v].max(rank[u] + 1);
            in_deg[v] -= 1;
            if in_deg[v] == 0 {
                ready.push_back(v);
            }
        }
    }

    rank
}

// --- Phase 3: ordering within ranks ------------------------------------------

fn order_layers(ranks: &[usize], rg: &RankGraph, sweeps: usize) -> Vec<Vec<usize>> {
    let num_layers = ranks.iter().copied().max().unwrap_or(0) + 1;
    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); num_layers];
    for (v, &r) in ranks.iter().enumerate() {
        layers[r].push(v);
    }

    let mut best_crossings = count_crossings(&layers, &rg.adj, rg.len());
    let mut best = layers.clone();

    for sweep in 0..sweeps {
        if best_crossings == 0 {
            break;
        }
        if sweep % 2 == 0 {
            for i in 1..num_layers {
                barycenter_sort(&mut layers, i, i - 1, &rg.radj, rg.len());
            }
        } else {
            for i in (0..num_layers.saturating_sub(1)).rev() {
                barycenter_sort(&mut layers, i, i + 1, &rg.adj, rg.len());
            }
        }

        let c = count_crossings(&layers, &rg.adj, rg.len());
        if c < best_crossings {
            best_crossings = c;
            best = layers.clone();
        }
    }

    best
}

fn positions_in(layer: &[usize], n: usize) -> Vec<usize> {
    let mut pos = vec![usize::MAX; n];
    for (p, &v) in layer.iter().enumerate() {
        pos[v] = p;
    }
    pos
}

/// Pairs of edges between adjacent ranks whose endpoints are in opposite
/// orders. Edges spanning more than one rank are not counted.
fn count_crossings(layers: &[Vec<usize>], adj: &[Vec<usize>], n: usize) -> usize {
    let mut crossings = 0;
    for pair in layers.windows(2) {
        let pos_b = positions_in(&pair[1], n);
        let mut segments: Vec<(usize, usize)> = Vec::new();
        for (pa, &u) in pair[0].iter().enumerate() {
            for &v in &adj[u] {
                if pos_b[v] != usize::MAX {
                    segments.push((pa, pos_b[v]));
                }
            }
        }

        for (i, &(a1, b1)) in segments.iter().enumerate() {
            for &(a2, b2) in &segments[i + 1..] {
                if (a1 < a2 && b1 > b2) || (a1 > a2 && b1 < b2) {
                    crossings += 1;
                }
            }
        }
    }
    crossings
}

/// Reorder `layers[idx]` by the mean position of each vertex's neighbours in
/// `layers[reference]`. Vertices with no such neighbour keep their current
/// slot relative to each other and sort after those that have one.
fn barycenter_sort(
    layers: &mut [Vec<usize>],
    idx: usize,
    reference: usize,
    neighbours: &[Vec<usize>],
    n: usize,
) {
    let ref_pos = positions_in(&layers[reference], n);
    let mut keyed: Vec<(f64, usize, usize)> = layers[idx]
        .iter()
        .enumerate()
        .map(|(slot, &v)| {
            let (sum, count) = neighbours[v]
                .iter()
                .filter(|&&u| ref_pos[u] != usize::MAX)
                .fold((0.0, 0usize), |(s, c), &u| (s + ref_pos[u] as f64, c + 1));
            let bary = if count == 0 { f64::MAX } else { sum / count as f64 };
            (bary, slot, v)
        })
        .collect();

    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    layers[idx] = keyed.into_iter().map(|(_, _, v)| v).collect();
}

// --- Phase 4: coordinates ----------------------------------------------------

/// Returns `(along, across)`: the coordinate of each vertex centre along its
/// rank and across ranks, before direction remapping.
fn assign_coordinates(
    layers: &[Vec<usize>],
    rg: &RankGraph,
    breadth: f64,
    depth: f64,
    config: &LayoutConfig,
) -> (Vec<f64>, Vec<f64>) {
    let n = rg.len();
    let mut along = vec![0.0f64; n];
    let mut across = vec![0.0f64; n];
    let step = breadth + config.node_separation;

    for (r, layer) in layers.iter().enumerate() {
        let total = layer.len() as f64 * breadth
            + layer.len().saturating_sub(1) as f64 * config.node_separation;
        let mut c = -total / 2.0 + breadth / 2.0;
        for &v in layer {
            along[v] = c;
            across[v] = r as f64 * (depth + config.rank_separation);
            c += step;
        }
    }

    for _ in 0..4 {
        for layer in layers {
            for &v in layer {
                let mut around: Vec<f64> = rg.adj[v]
                    .iter()
                    .chain(rg.radj[v].iter())
                    .map(|&u| along[u])
                    .collect();
                if around.is_empty() {
                    continue;
                }
                around.sort_by(f64::total_cmp);
                let median = around[around.len() / 2];
                along[v] = (along[v] + median) / 2.0;
            }
        }

        // Keep the rank order and push apart anything closer than one step.
        for layer in layers {
            for w in 1..layer.len() {
                let (prev, curr) = (layer[w - 1], layer[w]);
                if along[curr] - along[prev] < step {
                    along[curr] = along[prev] + step;
                }
            }
        }
    }

    (along, across)
}

fn remap_for_direction(
    along: Vec<f64>,
    across: Vec<f64>,
    direction: Direction,
) -> (Vec<f64>, Vec<f64>) {
    let flip = |v: Vec<f64>| {
        let max = v.iter().copied().fold(0.0, f64::max);
        v.into_iter().map(|a| max - a).collect::<Vec<f64>>()
    };
    match direction {
        Direction::TB => (along, across),
        Direction::BT => (along, flip(across)),
        Direction::LR => (across, along),
        Direction::RL => (flip(across), along),
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout_with_config, LayoutMode, NODE_HEIGHT, NODE_WIDTH};
    use crate::types::{Edge, Node};

    fn nodes(ids: &[&str]) -> Vec<Node> {
        ids.iter()
            .map(|id| Node::with_id(*id, *id, Position::default()))
            .collect()
    }

    fn edges(pairs: &[(&str, &str)]) -> Vec<Edge> {
        pairs
            .iter()
            .map(|(s, t)| Edge::link(format!("{s}-{t}"), *s, *t))
            .collect()
    }

    fn run(ns: &[Node], es: &[Edge], direction: Direction) -> Positions {
        let config = LayoutConfig::default().with_direction(direction);
        layout_with_config(ns, es, LayoutMode::Layered, &config)
    }

    #[test]
    fn chain_descends_one_rank_per_edge() {
        let ns = nodes(&["a", "b", "c"]);
        let es = edges(&[("a", "b"), ("b", "c")]);
        let p = run(&ns, &es, Direction::TB);
        let step = NODE_HEIGHT + 50.0;
        assert_eq!(p["a"].y, 0.0);
        assert_eq!(p["b"].y, step);
        assert_eq!(p["c"].y, 2.0 * step);
        assert_eq!(p["a"].x, p["b"].x);
        assert_eq!(p["b"].x, p["c"].x);
    }

    #[test]
    fn smallest_corner_is_origin() {
        let ns = nodes(&["a", "b", "c", "d"]);
        let es = edges(&[("a", "b"), ("a", "c"), ("a", "d")]);
        let p = run(&ns, &es, Direction::TB);
        let min_x = p.values().map(|q| q.x).fold(f64::INFINITY, f64::min);
        let min_y = p.values().map(|q| q.y).fold(f64::INFINITY, f64::min);
        assert_eq!(min_x, 0.0);
        assert_eq!(min_y, 0.0);
    }

    #[test]
    fn corners_follow_custom_box_sizes() {
        let ns = nodes(&["a", "b"]);
        let es = edges(&[("a", "b")]);
        let mut config = LayoutConfig {
            node_width: 10.0,
            node_height: 30.0,
            ..LayoutConfig::default()
        };
        let p = layout_with_config(&ns, &es, LayoutMode::Layered, &config);
        assert_eq!(p["a"], Position::new(0.0, 0.0));
        assert_eq!(p["b"], Position::new(0.0, 80.0));

        config.direction = Direction::LR;
        let p = layout_with_config(&ns, &es, LayoutMode::Layered, &config);
        assert_eq!(p["a"], Position::new(0.0, 0.0));
        assert_eq!(p["b"], Position::new(60.0, 0.0));
    }

    #[test]
    fn siblings_do_not_overlap() {
        let ns = nodes(&["r", "a", "b", "c"]);
        let es = edges(&[("r", "a"), ("r", "b"), ("r", "c")]);
        let p = run(&ns, &es, Direction::TB);
        let mut xs: Vec<f64> = ["a", "b", "c"].iter().map(|id| p[*id].x).collect();
        xs.sort_by(f64::total_cmp);
        for w in xs.windows(2) {
            assert!(w[1] - w[0] >= NODE_WIDTH, "boxes overlap: {w:?}");
        }
    }

    #[test]
    fn isolated_nodes_sit_on_first_rank() {
        let ns = nodes(&["a", "b", "solo"]);
        let es = edges(&[("a", "b")]);
        let p = run(&ns, &es, Direction::TB);
        assert_eq!(p["solo"].y, p["a"].y);
        assert!(p["b"].y > p["a"].y);
    }

    #[test]
    fn cycle_still_lays_out_every_node() {
        let ns = nodes(&["n1", "n2", "n3"]);
        let es = edges(&[("n1", "n2"), ("n2", "n3"), ("n3", "n1")]);
        let p = run(&ns, &es, Direction::TB);
        assert_eq!(p.len(), 3);
        let mut ys: Vec<f64> = p.values().map(|q| q.y).collect();
        ys.sort_by(f64::total_cmp);
        ys.dedup();
        assert_eq!(ys.len(), 3, "a 3-cycle should still span three ranks");
    }

    #[test]
    fn left_to_right_advances_along_x() {
        let ns = nodes(&["a", "b"]);
        let es = edges(&[("a", "b")]);
        let p = run(&ns, &es, Direction::LR);
        assert_eq!(p["a"].x, 0.0);
        assert_eq!(p["b"].x, NODE_WIDTH + 50.0);
        assert_eq!(p["a"].y, p["b"].y);
    }

    #[test]
    fn reversed_directions_mirror() {
        let ns = nodes(&["a", "b"]);
        let es = edges(&[("a", "b")]);
        let bt = run(&ns, &es, Direction::BT);
        assert!(bt["a"].y > bt["b"].y);
        let rl = run(&ns, &es, Direction::RL);
        assert!(rl["a"].x > rl["b"].x);
    }

    #[test]
    fn barycenter_uncrosses_two_pairs() {
        // a->d, b->c with input order [a, b] over [c, d] crosses once.
        let ns = nodes(&["a", "b", "c", "d"]);
        let es = edges(&[("a", "d"), ("b", "c")]);
        let p = run(&ns, &es, Direction::TB);
        assert!(p["a"].x < p["b"].x);
        assert!(p["d"].x < p["c"].x);
    }

    #[test]
    fn crossing_count() {
        let adj = vec![vec![3], vec![2], vec![], vec![]];
        assert_eq!(count_crossings(&[vec![0, 1], vec![2, 3]], &adj, 4), 1);
        assert_eq!(count_crossings(&[vec![0, 1], vec![3, 2]], &adj, 4), 0);
    }
}
