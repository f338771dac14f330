use std::collections::HashMap;

use crate::types::{Edge, Node};

/// A read-only adjacency view over a node list and an edge list.
///
/// The graph is not a store. It borrows the host's slices, indexes them once,
/// and answers adjacency queries for the engines. Node and edge order is the
/// input order everywhere, which is what makes the engines deterministic.
///
/// Edges refer to nodes by id only. An edge whose source is unknown appears
/// in no outgoing list; an edge whose target is unknown appears in its
/// source's outgoing list but resolves to no node. If two nodes share an id,
/// the first one wins.
#[derive(Debug)]
pub struct Graph<'a> {
    nodes: &'a [Node],
    edges: &'a [Edge],
    index: HashMap<&'a str, usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
}

impl<'a> Graph<'a> {
    pub fn new(nodes: &'a [Node], edges: &'a [Edge]) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (i, n) in nodes.iter().enumerate() {
            index.entry(n.id.as_str()).or_insert(i);
        }

        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        for (e, edge) in edges.iter().enumerate() {
            if let Some(&s) = index.get(edge.source.as_str()) {
                outgoing[s].push(e);
            }
            if let Some(&t) = index.get(edge.target.as_str()) {
                incoming[t].push(e);
            }
        }

        Self {
            nodes,
            edges,
            index,
            outgoing,
            incoming,
        }
    }

    pub fn nodes(&self) -> &'a [Node] {
        self.nodes
    }

    pub fn edges(&self) -> &'a [Edge] {
        self.edges
    }

    /// Number of nodes, counting duplicates.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Position of the node with this id in the input list.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Indices of the edges leaving node `i`, in edge-list order.
    pub fn outgoing(&self, i: usize) -> &[usize] {
        self.outgoing.get(i).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Indices of the edges entering node `i`, in edge-list order.
    pub fn incoming(&self, i: usize) -> &[usize] {
        self.incoming.get(i).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Node index of edge `e`'s target, if the target exists.
    pub fn target_of(&self, e: usize) -> Option<usize> {
        self.edges.get(e).and_then(|edge| self.index_of(&edge.target))
    }

    /// Node index of edge `e`'s source, if the source exists.
    pub fn source_of(&self, e: usize) -> Option<usize> {
        self.edges.get(e).and_then(|edge| self.index_of(&edge.source))
    }

    /// Targets of node `i`'s outgoing edges, in edge-list order, skipping
    /// dangling targets.
    pub fn children(&self, i: usize) -> Vec<usize> {
        self.outgoing(i)
            .iter()
            .filter_map(|&e| self.target_of(e))
            .collect()
    }

    /// Number of edges whose target id equals node `i`'s id, whether or not
    /// their source exists.
    pub fn in_degree(&self, i: usize) -> usize {
        self.incoming(i).len()
    }

    /// True if no edge names node `i` as source or target.
    ///
    /// Dangling edges count: an edge from a missing node still touches its
    /// existing target. A duplicate-id node shares the adjacency of the first
    /// node with that id. Constant time; the lists are built in [`Graph::new`].
    pub fn is_isolated(&self, i: usize) -> bool {
        let Some(first) = self.nodes.get(i).and_then(|n| self.index_of(&n.id)) else {
            return true;
        };
        self.outgoing(first).is_empty() && self.incoming(first).is_empty()
    }

    /// Nodes with in-degree 0, in input order.
    pub fn roots(&self) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&i| self.index_of(&self.nodes[i].id) == Some(i))
            .filter(|&i| self.in_degree(i) == 0)
            .collect()
    }

    /// Undirected neighbour ids keyed by node id, in edge-list order.
    ///
    /// Dangling endpoints get an entry of their own so a traversal can step
    /// onto them; ids with no edges are simply absent.
    pub fn undirected_neighbours(&self) -> HashMap<&'a str, Vec<&'a str>> {
        let mut adj: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
        for e in self.edges {
            adj.entry(e.source.as_str()).or_default().push(e.target.as_str());
            adj.entry(e.target.as_str()).or_default().push(e.source.as_str());
        }
        adj
    }
}

// --- tests -------------------------------------------------------------------
