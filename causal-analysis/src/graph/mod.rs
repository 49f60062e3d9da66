//! Mixed graph model with typed endpoints.
//!
//! A `CausalGraph` stores nodes and edges in a petgraph `StableGraph`;
//! each edge carries one endpoint mark per side, so the same structure
//! represents DAGs, patterns (PDAGs), and graphs with bidirected edges.

pub mod model;
pub mod types;

pub use model::CausalGraph;
pub use types::{EdgeMarks, Endpoint, NodeInfo, NodeType, Triple};
