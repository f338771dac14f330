//! Editing session: the state a host canvas drives.
//!
//! [`EditorSession`] owns the live node and edge lists, applies mutations,
//! records a history snapshot after each committed one, and recomputes
//! validation on demand. It also enforces the connect-gesture rules and keeps
//! the short-lived highlight edges that show a refused same-side connection.
//!
//! The session never reads a clock. Hosts pass a millisecond timestamp to
//! [`EditorSession::connect`] and [`EditorSession::tick`]; a highlight is
//! removed by the first `tick` at or after its deadline, and only that
//! highlight is removed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConnectError, EditError};
use crate::history::History;
use crate::layout::{apply_positions, layout_with_config, LayoutConfig, LayoutMode, Positions};
use crate::types::{Edge, GraphDocument, Handle, Node, Position};
use crate::validation::{validate, ValidationMode, ValidationResult};

/// Settings for an [`EditorSession`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub mode: ValidationMode,
    pub layout: LayoutConfig,
    /// How long a refused connection stays visible.
    pub highlight_ms: u64,
    /// Maximum number of history snapshots kept; unbounded when absent.
    pub history_limit: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::Dag,
            layout: LayoutConfig::default(),
            highlight_ms: 1000,
            history_limit: None,
        }
    }
}

#[derive(Debug, Clone)]
struct Highlight {
    edge: Edge,
    due_ms: u64,
}

/// Pending highlight removals keyed by the highlight edge's id.
#[derive(Debug, Clone, Default)]
struct HighlightSchedule {
    entries: BTreeMap<String, Highlight>,
}

impl HighlightSchedule {
    fn schedule(&mut self, edge: Edge, due_ms: u64) {
        self.entries.insert(edge.id.clone(), Highlight { edge, due_ms });
    }

    fn cancel(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn take_due(&mut self, now_ms: u64) -> Vec<String> {
        let due: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, h)| h.due_ms <= now_ms)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &due {
            self.entries.remove(id);
        }
        due
    }

    fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.entries.values().map(|h| &h.edge)
    }
}

/// Live graph state plus history, validation mode and pending highlights.
#[derive(Debug, Clone)]
pub struct EditorSession {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    history: History,
    highlights: HighlightSchedule,
    config: EditorConfig,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// An empty canvas.
    pub fn new(config: EditorConfig) -> Self {
        Self::from_document(GraphDocument::default(), config)
    }

    /// Open a loaded document. The document becomes the first history
    /// snapshot.
    pub fn from_document(doc: GraphDocument, config: EditorConfig) -> Self {
        let history = match config.history_limit {
            Some(limit) => History::with_capacity_limit(&doc.nodes, &doc.edges, limit),
            None => History::new(&doc.nodes, &doc.edges),
        };
        Self {
            nodes: doc.nodes,
            edges: doc.edges,
            history,
            highlights: HighlightSchedule::default(),
            config,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Committed edges. Highlight edges are not included.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Everything the canvas should draw: committed edges followed by any
    /// pending highlight edges.
    pub fn canvas_edges(&self) -> Vec<Edge> {
        self.edges
            .iter()
            .chain(self.highlights.edges())
            .cloned()
            .collect()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn mode(&self) -> ValidationMode {
        self.config.mode
    }

    /// Switch the validation mode. Not an edit; nothing is recorded.
    pub fn set_mode(&mut self, mode: ValidationMode) {
        self.config.mode = mode;
    }

    /// Validate the committed graph under the current mode. Recomputed on
    /// every call.
    pub fn validation(&self) -> ValidationResult {
        validate(&self.nodes, &self.edges, self.config.mode)
    }

    pub fn to_document(&self) -> GraphDocument {
        GraphDocument::new(self.nodes.clone(), self.edges.clone())
    }

    // --- node edits ----------------------------------------------------------

    /// Add a node with a generated id and return the id. An empty label is
    /// refused and nothing changes.
    pub fn add_node(
        &mut self,
        label: impl Into<String>,
        position: Position,
    ) -> Result<String, EditError> {
        let label = label.into();
        if label.is_empty() {
            return Err(EditError::EmptyLabel);
        }
        let node = Node::new(label, position);
        let id = node.id.clone();
        self.nodes.push(node);
        tracing::debug!(%id, "added node");
        self.commit();
        Ok(id)
    }

    /// Add a node whose id the caller chose.
    pub fn insert_node(&mut self, node: Node) -> Result<(), EditError> {
        if self.node(&node.id).is_some() {
            return Err(EditError::DuplicateNode(node.id));
        }
        tracing::debug!(id = %node.id, "inserted node");
        self.nodes.push(node);
        self.commit();
        Ok(())
    }

    pub fn rename_node(&mut self, id: &str, label: impl Into<String>) -> Result<(), EditError> {
        let node = self.node_mut(id)?;
        node.label = label.into();
        self.commit();
        Ok(())
    }

    /// Drop a dragged node at its final position.
    pub fn move_node(&mut self, id: &str, position: Position) -> Result<(), EditError> {
        let node = self.node_mut(id)?;
        node.position = position;
        self.commit();
        Ok(())
    }

    /// Delete nodes and every committed edge touching them. Unknown ids are
    /// ignored. Returns the number of nodes removed; nothing is recorded when
    /// it is zero.
    pub fn remove_nodes(&mut self, ids: &[&str]) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|n| !ids.contains(&n.id.as_str()));
        let removed = before - self.nodes.len();
        if removed > 0 {
            self.edges.retain(|e| {
                !ids.contains(&e.source.as_str()) && !ids.contains(&e.target.as_str())
            });
            tracing::debug!(removed, "removed nodes");
            self.commit();
        }
        removed
    }

    // --- edge edits ----------------------------------------------------------

    /// Handle a connect gesture from `source`'s `source_handle` to
    /// `target`'s `target_handle`.
    ///
    /// A self-loop, a missing endpoint or a repeat of an existing edge
    /// (same endpoints and handles) is refused without any change. A
    /// same-side pair is refused too, but the attempted edge is shown as a
    /// highlight until `now_ms + highlight_ms`; its id is in the error.
    /// Otherwise the edge is committed and its id returned.
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        source_handle: Handle,
        target_handle: Handle,
        now_ms: u64,
    ) -> Result<String, ConnectError> {
        if source == target {
            return Err(ConnectError::SelfLoop(source.to_string()));
        }
        for end in [source, target] {
            if self.node(end).is_none() {
                return Err(ConnectError::UnknownEndpoint(end.to_string()));
            }
        }
        if let Some(existing) = self.edges.iter().find(|e| {
            e.source == source
                && e.target == target
                && e.source_handle == source_handle
                && e.target_handle == target_handle
        }) {
            return Err(ConnectError::Duplicate(existing.id.clone()));
        }

        let edge = Edge::new(source, target, source_handle, target_handle);
        let id = edge.id.clone();

        if edge.is_same_side() {
            let due_ms = now_ms.saturating_add(self.config.highlight_ms);
            tracing::info!(
                %id,
                %source,
                %target,
                handle = %source_handle,
                due_ms,
                "refused same-side connection"
            );
            self.highlights.schedule(edge, due_ms);
            return Err(ConnectError::SameSide {
                handle: source_handle,
                highlight_id: id,
            });
        }

        self.edges.push(edge);
        tracing::debug!(%id, %source, %target, "connected");
        self.commit();
        Ok(id)
    }

    pub fn set_edge_label(&mut self, id: &str, label: Option<String>) -> Result<(), EditError> {
        let edge = self
            .edges
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| EditError::UnknownEdge(id.to_string()))?;
        edge.label = label.filter(|l| !l.is_empty());
        self.commit();
        Ok(())
    }

    /// Delete committed edges by id. Returns the number removed; nothing is
    /// recorded when it is zero.
    pub fn remove_edges(&mut self, ids: &[&str]) -> usize {
        let before = self.edges.len();
        self.edges.retain(|e| !ids.contains(&e.id.as_str()));
        let removed = before - self.edges.len();
        if removed > 0 {
            self.commit();
        }
        removed
    }

    // --- highlights ----------------------------------------------------------

    /// Remove every highlight whose deadline is at or before `now_ms` and
    /// return their ids.
    pub fn tick(&mut self, now_ms: u64) -> Vec<String> {
        let expired = self.highlights.take_due(now_ms);
        if !expired.is_empty() {
            tracing::debug!(count = expired.len(), "expired highlights");
        }
        expired
    }

    /// Remove one highlight ahead of its deadline.
    pub fn cancel_highlight(&mut self, id: &str) -> bool {
        self.highlights.cancel(id)
    }

    /// Drop all pending highlights, e.g. when the host tears the canvas down.
    pub fn clear_highlights(&mut self) {
        self.highlights.clear();
    }

    pub fn pending_highlights(&self) -> usize {
        self.highlights.entries.len()
    }

    // --- layout and history --------------------------------------------------

    /// Reposition every node with the chosen algorithm and record the result.
    pub fn auto_layout(&mut self, mode: LayoutMode) -> Positions {
        let positions = layout_with_config(&self.nodes, &self.edges, mode, &self.config.layout);
        apply_positions(&mut self.nodes, &positions);
        self.commit();
        positions
    }

    /// Restore the previous snapshot. Returns false when there is none.
    pub fn undo(&mut self) -> bool {
        let restored = self.history.undo().cloned();
        self.restore(restored)
    }

    /// Restore the next snapshot. Returns false when there is none.
    pub fn redo(&mut self) -> bool {
        let restored = self.history.redo().cloned();
        self.restore(restored)
    }

    fn restore(&mut self, snapshot: Option<crate::history::Snapshot>) -> bool {
        let Some(snapshot) = snapshot else {
            return false;
        };
        self.nodes = snapshot.nodes;
        self.edges = snapshot.edges;
        self.highlights.clear();
        tracing::debug!(pointer = self.history.pointer(), "restored snapshot");
        true
    }

    fn commit(&mut self) {
        self.history.record(&self.nodes, &self.edges);
    }

    fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut Node, EditError> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| EditError::UnknownNode(id.to_string()))
    }
}

// --- tests -------------------------------------------------------------------
