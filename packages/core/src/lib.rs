//! Engines behind a node/edge diagram editor.
//!
//! A host canvas owns rendering and input; this crate owns the graph rules.
//! It checks whether the graph currently satisfies a structural property,
//! computes automatic layouts, and keeps a linear undo/redo history.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`types`] | Core data types: [`Node`], [`Edge`], [`Handle`], [`Position`], [`GraphDocument`] |
//! | [`graph`] | Indexed, borrowed view over node and edge slices |
//! | [`validation`] | DAG / tree / bipartite checks via [`validate`] |
//! | [`layout`] | Layered and tree placement via [`layout`] |
//! | [`history`] | Snapshot log with undo and redo |
//! | [`editor`] | [`EditorSession`]: edits, connect rules, highlights, history |
//! | [`render`] | Human-readable text rendering of graphs and results |
//! | [`error`] | Errors for document import and editor mutations |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use dagbuilder::{layout, validate, Edge, LayoutMode, Node, Position, ValidationMode};
//!
//! let nodes = vec![
//!     Node::with_id("a", "Load", Position::default()),
//!     Node::with_id("b", "Clean", Position::default()),
//! ];
//! let edges = vec![Edge::link("e1", "a", "b")];
//!
//! assert!(validate(&nodes, &edges, ValidationMode::Dag).valid);
//! let positions = layout(&nodes, &edges, LayoutMode::Layered);
//! ```

pub mod editor;
pub mod error;
pub mod graph;
pub mod history;
pub mod layout;
pub mod render;
pub mod types;
pub mod validation;

mod layered;
mod tree_layout;

pub use editor::{EditorConfig, EditorSession};
pub use error::{ConnectError, DocumentError, EditError};
pub use graph::Graph;
pub use history::{History, Snapshot};
pub use layout::{
    apply_positions, layout, layout_with_config, Direction, LayoutConfig, LayoutMode, Positions,
};
pub use types::{Edge, GraphDocument, Handle, Node, NodeKind, Position};
pub use validation::{validate, ValidationMode, ValidationResult, Violation};
