//! Errors for the fallible edges of the crate: document import and editor
//! mutations. The validation, layout and history engines are total and never
//! return these.

use thiserror::Error;

use crate::types::Handle;

/// Errors returned when a [`GraphDocument`](crate::GraphDocument) cannot be
/// loaded.
#[derive(Debug, Error, PartialEq)]
pub enum DocumentError {
    #[error("invalid graph document: {0}")]
    Json(String),

    #[error("duplicate node id {0:?}")]
    DuplicateNodeId(String),

    #[error("duplicate edge id {0:?}")]
    DuplicateEdgeId(String),
}

impl From<serde_json::Error> for DocumentError {
    fn from(e: serde_json::Error) -> Self {
        DocumentError::Json(e.to_string())
    }
}

/// Errors returned by [`EditorSession`](crate::EditorSession) mutations that
/// name an element that does not exist.
#[derive(Debug, Error, PartialEq)]
pub enum EditError {
    #[error("no node with id {0:?}")]
    UnknownNode(String),

    #[error("no edge with id {0:?}")]
    UnknownEdge(String),

    #[error("node id {0:?} is already in use")]
    DuplicateNode(String),

    #[error("node label must not be empty")]
    EmptyLabel,
}

/// Reasons a connect gesture is refused.
#[derive(Debug, Error, PartialEq)]
pub enum ConnectError {
    #[error("cannot connect node {0:?} to itself")]
    SelfLoop(String),

    #[error("cannot connect node {0:?}: it does not exist")]
    UnknownEndpoint(String),

    /// An edge with the same endpoints and handles already exists; its id
    /// is carried here.
    #[error("edge {0:?} already makes this connection")]
    Duplicate(String),

    /// The rejected edge is kept on the canvas briefly as a highlight,
    /// identified by `highlight_id`.
    #[error("invalid edge: cannot connect {handle} side to {handle} side")]
    SameSide { handle: Handle, highlight_id: String },
}
