//! Automatic node placement.
//!
//! [`layout`] turns topology into a position per node id using one of two
//! algorithms selected by [`LayoutMode`]:
//!
//! | Mode | Algorithm |
//! |------|-----------|
//! | [`LayoutMode::Layered`] | rank / order / coordinate pipeline in [`crate::layered`] |
//! | [`LayoutMode::Tree`] | post-order subtree placement in [`crate::tree_layout`] |
//!
//! Both are pure and deterministic: the same node order, edge order and
//! configuration always produce the same positions. Every distinct node id in
//! the input receives exactly one position, including isolated nodes and
//! nodes on cycles.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::Graph;
use crate::types::{Edge, Node, Position};

/// Width of the node box assumed by the layered layout.
pub const NODE_WIDTH: f64 = 172.0;
/// Height of the node box assumed by the layered layout.
pub const NODE_HEIGHT: f64 = 36.0;

/// Node id → top-left corner.
pub type Positions = BTreeMap<String, Position>;

/// Which placement algorithm to run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Layered,
    Tree,
}

impl std::fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutMode::Layered => write!(f, "layered"),
            LayoutMode::Tree => write!(f, "tree"),
        }
    }
}

impl std::str::FromStr for LayoutMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "layered" | "dag" => Ok(LayoutMode::Layered),
            "tree" => Ok(LayoutMode::Tree),
            _ => Err(format!(
                "unknown layout mode {:?}; expected one of: layered, tree",
                s
            )),
        }
    }
}

/// Flow direction of ranks in the layered layout.
///
/// Serialises as the upper-case two-letter code (e.g. `"TB"`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Direction {
    /// Top to bottom.
    #[default]
    TB,
    /// Bottom to top.
    BT,
    /// Left to right.
    LR,
    /// Right to left.
    RL,
}

impl Direction {
    /// True when ranks advance along the x axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::LR | Direction::RL)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::TB => write!(f, "TB"),
            Direction::BT => write!(f, "BT"),
            Direction::LR => write!(f, "LR"),
            Direction::RL => write!(f, "RL"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TB" | "TD" => Ok(Direction::TB),
            "BT" => Ok(Direction::BT),
            "LR" => Ok(Direction::LR),
            "RL" => Ok(Direction::RL),
            _ => Err(format!(
                "unknown direction {:?}; expected one of: TB, BT, LR, RL",
                s
            )),
        }
    }
}

/// Tuning knobs for both layout algorithms.
///
/// Every field has a default, so a JSON config file only needs to name the
/// fields it overrides:
///
/// ```json
/// { "direction": "LR", "rank_separation": 80.0 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    /// Node box width used by the layered layout.
    pub node_width: f64,
    /// Node box height used by the layered layout.
    pub node_height: f64,
    /// Gap between neighbouring boxes in the same rank.
    pub node_separation: f64,
    /// Gap between consecutive ranks.
    pub rank_separation: f64,
    /// Number of barycenter sweeps when ordering nodes within ranks.
    pub crossing_sweeps: usize,
    pub direction: Direction,
    /// Horizontal distance between neighbouring leaves in the tree layout.
    pub tree_spacing_x: f64,
    /// Vertical distance between depths in the tree layout.
    pub tree_spacing_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: NODE_WIDTH,
            node_height: NODE_HEIGHT,
            node_separation: 50.0,
            rank_separation: 50.0,
            crossing_sweeps: 24,
            direction: Direction::TB,
            tree_spacing_x: 150.0,
            tree_spacing_y: 120.0,
        }
    }
}

impl LayoutConfig {
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }
}

/// Lay out `nodes` with the default configuration.
pub fn layout(nodes: &[Node], edges: &[Edge], mode: LayoutMode) -> Positions {
    layout_with_config(nodes, edges, mode, &LayoutConfig::default())
}

/// Lay out `nodes` with an explicit configuration.
pub fn layout_with_config(
    nodes: &[Node],
    edges: &[Edge],
    mode: LayoutMode,
    config: &LayoutConfig,
) -> Positions {
    let graph = Graph::new(nodes, edges);
    let positions = match mode {
        LayoutMode::Layered => crate::layered::layered(&graph, config),
        LayoutMode::Tree => crate::tree_layout::tree(&graph, config),
    };
    tracing::debug!(
        %mode,
        direction = %config.direction,
        nodes = nodes.len(),
        placed = positions.len(),
        "computed layout"
    );
    positions
}

/// Move every node named in `positions` to its new corner. Nodes not in the
/// map keep their position.
pub fn apply_positions(nodes: &mut [Node], positions: &Positions) {
    for node in nodes {
        if let Some(p) = positions.get(&node.id) {
            node.position = *p;
        }
    }
}

// --- tests -------------------------------------------------------------------
