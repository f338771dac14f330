//! Core data types for the editor graph.
//!
//! This module defines the structures the host exchanges with the engines:
//! [`Node`], [`Edge`], [`Handle`], [`Position`], [`NodeKind`], and the
//! [`GraphDocument`] import/export wrapper. All types serialise to and from
//! JSON with camelCase field names (`sourceHandle`, `targetHandle`).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

/// A point in canvas coordinates. For nodes this is the top-left corner.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The rendering kind of a node. The editor only ever creates one kind.
///
/// Serialises as a lowercase string (e.g. `"custom"`).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    #[default]
    Custom,
}

/// Which side of a node an edge attaches to.
///
/// The left handle is the target side and the right handle is the source
/// side. `"a"` and `"b"` are accepted on input as the legacy names for
/// `left` and `right`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    #[serde(alias = "a")]
    Left,
    #[serde(alias = "b")]
    Right,
}

/// Formats the handle as its lowercase wire-format string.
impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Handle::Left => write!(f, "left"),
            Handle::Right => write!(f, "right"),
        }
    }
}

/// Parses a [`Handle`] from `left` / `right` (or the legacy `a` / `b`).
impl std::str::FromStr for Handle {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "left" | "a" => Ok(Handle::Left),
            "right" | "b" => Ok(Handle::Right),
            _ => Err(format!("unknown handle {:?}; expected one of: left, right", s)),
        }
    }
}

/// A node on the canvas.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Unique within a graph.
    pub id: String,

    pub label: String,

    /// Top-left corner.
    #[serde(default)]
    pub position: Position,

    #[serde(default)]
    pub kind: NodeKind,
}

impl Node {
    /// Create a node with an auto-generated `node_<uuidv7>` id.
    pub fn new(label: impl Into<String>, position: Position) -> Self {
        Self::with_id(format!("node_{}", uuid::Uuid::now_v7()), label, position)
    }

    pub fn with_id(id: impl Into<String>, label: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            position,
            kind: NodeKind::Custom,
        }
    }
}

/// A directed connection between two nodes, referenced by id.
///
/// Endpoints are weak: nothing guarantees `source` or `target` names a node
/// that exists, and every engine tolerates dangling ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub source_handle: Handle,
    pub target_handle: Handle,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Edge {
    /// Create an edge with an auto-generated `edge_<uuidv7>` id.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        source_handle: Handle,
        target_handle: Handle,
    ) -> Self {
        Self {
            id: format!("edge_{}", uuid::Uuid::now_v7()),
            source: source.into(),
            target: target.into(),
            source_handle,
            target_handle,
            label: None,
        }
    }

    /// An edge leaving `source` on its right handle and entering `target` on
    /// its left handle, the only shape the connect gesture produces.
    pub fn link(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: Handle::Right,
            target_handle: Handle::Left,
            label: None,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    /// Both ends on the same side (left→left or right→right).
    pub fn is_same_side(&self) -> bool {
        self.source_handle == self.target_handle
    }

    pub fn is_well_formed(&self) -> bool {
        !self.is_self_loop() && !self.is_same_side()
    }
}

/// The host's import/export format: `{ "nodes": [...], "edges": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl GraphDocument {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Parse a document and check id uniqueness.
    ///
    /// Dangling edge endpoints are accepted; the engines handle them.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let doc: GraphDocument = serde_json::from_str(json)?;
        doc.check_ids()?;
        Ok(doc)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the first duplicated node id, then the first duplicated edge id.
    pub fn check_ids(&self) -> Result<(), DocumentError> {
        let mut seen = HashSet::new();
        for n in &self.nodes {
            if !seen.insert(n.id.as_str()) {
                return Err(DocumentError::DuplicateNodeId(n.id.clone()));
            }
        }
        let mut seen = HashSet::new();
        for e in &self.edges {
            if !seen.insert(e.id.as_str()) {
                return Err(DocumentError::DuplicateEdgeId(e.id.clone()));
            }
        }
        Ok(())
    }
}

// --- tests -------------------------------------------------------------------
