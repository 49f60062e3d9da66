//! Graph mutation errors.

use super::error_code::{self, CausalErrorCode};

/// Errors raised by invalid graph mutations or lookups.
///
/// These are programmer errors (asking for an edge between non-adjacent
/// nodes, setting an endpoint on a missing edge) and are not recoverable
/// by retrying.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Node {name} already exists in the graph")]
    DuplicateNode { name: String },

    #[error("Node {name} is not in the graph")]
    NodeNotFound { name: String },

    #[error("There is already an edge between {a} and {b}")]
    DuplicateEdge { a: String, b: String },

    #[error("No edge between {a} and {b}")]
    NoSuchEdge { a: String, b: String },
}

impl CausalErrorCode for GraphError {
    fn error_code(&self) -> &'static str {
        error_code::GRAPH_ERROR
    }
}
