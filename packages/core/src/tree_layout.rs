//! Post-order tree placement.
//!
//! Leaves are laid left to right one spacing apart; a parent sits at the
//! midpoint of its first and last child; depth sets `y`. Nodes the walk
//! from the root never reaches are appended on the top row.
//!
//! The walk uses an explicit stack and enters each node at most once, so
//! deep trees cannot overflow and cyclic or shared-child input terminates.
//! A child that is still on the stack (a cycle) or was placed through an
//! earlier parent is not re-entered. A parent centres only over the children
//! it entered itself; when it entered none it takes a cursor slot like a
//! leaf, so two parents of one shared child never coincide.

use crate::graph::Graph;
use crate::layout::{LayoutConfig, Positions};
use crate::types::Position;

struct Frame {
    node: usize,
    depth: usize,
    next_child: usize,
}

pub(crate) fn tree(graph: &Graph<'_>, config: &LayoutConfig) -> Positions {
    let n = graph.len();
    let distinct: Vec<usize> = (0..n)
        .filter(|&i| graph.index_of(&graph.nodes()[i].id) == Some(i))
        .collect();
    let Some(&first) = distinct.first() else {
        return Positions::new();
    };

    let children: Vec<Vec<usize>> = (0..n).map(|i| graph.children(i)).collect();
    let mut in_degree = vec![0usize; n];
    for kids in &children {
        for &c in kids {
            in_degree[c] += 1;
        }
    }
    let root = distinct
        .iter()
        .copied()
        .find(|&i| in_degree[i] == 0)
        .unwrap_or(first);

    let mut x: Vec<Option<f64>> = vec![None; n];
    let mut y = vec![0.0f64; n];
    let mut entered = vec![false; n];
    // parent[c] is the node whose frame entered c.
    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut cursor = 0.0f64;

    entered[root] = true;
    let mut stack = vec![Frame {
        node: root,
        depth: 0,
        next_child: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        if let Some(&child) = children[frame.node].get(frame.next_child) {
            frame.next_child += 1;
            if !entered[child] {
                entered[child] = true;
                parent[child] = Some(frame.node);
                let depth = frame.depth + 1;
                stack.push(Frame {
                    node: child,
                    depth,
                    next_child: 0,
                });
            }
            continue;
        }

        let Frame { node, depth, .. } = *frame;
        stack.pop();

        let mut placed = children[node]
            .iter()
            .filter(|&&c| parent[c] == Some(node))
            .filter_map(|&c| x[c]);
        let px = match placed.next() {
            Some(first_x) => {
                let last_x = placed.last().unwrap_or(first_x);
                (first_x + last_x) / 2.0
            }
            None => {
                let px = cursor;
                cursor += config.tree_spacing_x;
                px
            }
        };
        x[node] = Some(px);
        y[node] = depth as f64 * config.tree_spacing_y;
    }

    for &i in &distinct {
        if x[i].is_none() {
            x[i] = Some(cursor);
            y[i] = 0.0;
            cursor += config.tree_spacing_x;
        }
    }

    let nodes = graph.nodes();
    distinct
        .into_iter()
        .map(|i| {
            let px = x[i].unwrap_or_default();
            (nodes[i].id.clone(), Position::new(px, y[i]))
        })
        .collect()
}

// --- tests -------------------------------------------------------------------
