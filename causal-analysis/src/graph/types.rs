//! Graph model types.

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Variable kind carried by each node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Measured,
    Latent,
    Error,
}

/// A variable in the graph. Identity is the name; a graph guarantees
/// unique names. Display coordinates are carried along but ignored by
/// the orientation logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub node_type: NodeType,
    pub center_x: i32,
    pub center_y: i32,
}

impl NodeInfo {
    /// A measured variable at the origin.
    pub fn measured(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            node_type: NodeType::Measured,
            center_x: 0,
            center_y: 0,
        }
    }
}

/// Mark at one end of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    Tail,
    Arrow,
    Circle,
}

/// Endpoint marks of an edge, stored relative to the (source, target)
/// orientation the edge was inserted with. Tail/Arrow is a directed
/// edge source -> target; Tail/Tail is undirected; Arrow/Arrow is
/// bidirected (a confounding mark, never a valid DAG edge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeMarks {
    pub source: Endpoint,
    pub target: Endpoint,
}

impl EdgeMarks {
    pub fn directed() -> Self {
        Self { source: Endpoint::Tail, target: Endpoint::Arrow }
    }

    pub fn undirected() -> Self {
        Self { source: Endpoint::Tail, target: Endpoint::Tail }
    }

    pub fn bidirected() -> Self {
        Self { source: Endpoint::Arrow, target: Endpoint::Arrow }
    }

    pub fn is_directed(&self) -> bool {
        matches!(
            (self.source, self.target),
            (Endpoint::Tail, Endpoint::Arrow) | (Endpoint::Arrow, Endpoint::Tail)
        )
    }

    pub fn is_undirected(&self) -> bool {
        self.source == Endpoint::Tail && self.target == Endpoint::Tail
    }
}

/// An ordered (x, y, z) triple where y is adjacent to both x and z.
/// Transient: built during collider detection, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Triple {
    pub x: NodeIndex,
    pub y: NodeIndex,
    pub z: NodeIndex,
}

impl Triple {
    pub fn new(x: NodeIndex, y: NodeIndex, z: NodeIndex) -> Self {
        Self { x, y, z }
    }
}
