//! Linear undo/redo over full graph snapshots.

use serde::{Deserialize, Serialize};

use crate::types::{Edge, Node};

/// An independent copy of the editable graph at one point in time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Snapshot {
    pub fn capture(nodes: &[Node], edges: &[Edge]) -> Self {
        Self {
            nodes: nodes.to_vec(),
            edges: edges.to_vec(),
        }
    }
}

/// A single-branch history log with a cursor.
///
/// The log always holds at least one snapshot, and `pointer` always indexes
/// a snapshot in it. Recording after an undo discards everything ahead of
/// the pointer; the abandoned redo branch is never merged back.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<Snapshot>,
    pointer: usize,
    limit: Option<usize>,
}

impl History {
    /// Seed the log with the graph's state at construction time.
    pub fn new(nodes: &[Node], edges: &[Edge]) -> Self {
        Self {
            snapshots: vec![Snapshot::capture(nodes, edges)],
            pointer: 0,
            limit: None,
        }
    }

    /// Like [`History::new`], but keep at most `limit` snapshots (minimum 1),
    /// dropping the oldest first.
    pub fn with_capacity_limit(nodes: &[Node], edges: &[Edge], limit: usize) -> Self {
        Self {
            limit: Some(limit.max(1)),
            ..Self::new(nodes, edges)
        }
    }

    /// Append a copy of the graph right after the pointer and move the
    /// pointer onto it.
    pub fn record(&mut self, nodes: &[Node], edges: &[Edge]) {
        let discarded = self.snapshots.len() - (self.pointer + 1);
        self.snapshots.truncate(self.pointer + 1);
        self.snapshots.push(Snapshot::capture(nodes, edges));
        self.pointer = self.snapshots.len() - 1;

        if let Some(limit) = self.limit {
            let overflow = self.snapshots.len().saturating_sub(limit);
            if overflow > 0 {
                self.snapshots.drain(..overflow);
                self.pointer -= overflow;
            }
        }

        tracing::trace!(
            len = self.snapshots.len(),
            pointer = self.pointer,
            discarded,
            "recorded snapshot"
        );
    }

    /// Step back one snapshot. Returns `None` and changes nothing when
    /// already at the oldest snapshot.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.pointer == 0 {
            return None;
        }
        self.pointer -= 1;
        Some(&self.snapshots[self.pointer])
    }

    /// Step forward one snapshot. Returns `None` and changes nothing when
    /// already at the newest snapshot.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.pointer + 1 >= self.snapshots.len() {
            return None;
        }
        self.pointer += 1;
        Some(&self.snapshots[self.pointer])
    }

    /// The snapshot under the pointer.
    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.pointer]
    }

    pub fn can_undo(&self) -> bool {
        self.pointer > 0
    }

    pub fn can_redo(&self) -> bool {
        self.pointer + 1 < self.snapshots.len()
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false; the log is seeded at construction.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

// --- tests -------------------------------------------------------------------
