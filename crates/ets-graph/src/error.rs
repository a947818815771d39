//! Error types for the event graph core.
//!
//! All failures are explicit and typed. Malformed event records are rejected
//! when the tree is ingested so that nothing downstream has to probe for
//! missing tags at render time.

use thiserror::Error;

use crate::models::NodeId;

/// Errors that can occur while building, laying out or interacting with a graph.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    /// An event lacks a field the renderer depends on (e.g. `tags.source`).
    #[error("event '{event_id}' is missing required field '{field}'")]
    MissingField { event_id: String, field: String },

    /// An event record could not be ingested.
    #[error("invalid event record: {reason}")]
    InvalidEvent { reason: String },

    /// Input must hold exactly one root node.
    #[error("expected exactly one root node, got {count}")]
    InvalidRoot { count: usize },

    /// The container is too small to lay anything out in.
    #[error("container {width}x{height} is below the minimum dimension {floor}")]
    LayoutPrecondition { width: f64, height: f64, floor: f64 },

    /// An interaction referenced a node that is not part of the tree.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// The node exists but is hidden inside a collapsed subtree.
    #[error("node {0} is not on screen")]
    NotRendered(NodeId),

    #[error("JSON parse error: {reason}")]
    JsonParseFailed { reason: String },

    #[error("invalid configuration: {reason}")]
    ConfigInvalid { reason: String },

    #[error("I/O error: {0}")]
    Io(String),
}

impl GraphError {
    /// Create a missing field error.
    pub fn missing_field(event_id: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            event_id: event_id.into(),
            field: field.into(),
        }
    }

    /// Create an invalid event error.
    pub fn invalid_event(reason: impl Into<String>) -> Self {
        Self::InvalidEvent {
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config_invalid(reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonParseFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for GraphError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
