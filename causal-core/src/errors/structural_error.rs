//! Structural errors from pattern/DAG conversion.

use super::error_code::{self, CausalErrorCode};

/// Errors raised when a graph is structurally unable to support a
/// requested conversion.
///
/// A cyclic candidate produced during enumeration is a normal, filtered
/// value and never reaches this enum; these variants mark inputs the
/// algorithms cannot proceed on at all.
#[derive(Debug, thiserror::Error)]
pub enum StructuralError {
    /// PDAG-to-DAG peeling found no sink left to consume: the directed
    /// part of the input already has a cycle.
    #[error("Malformed PDAG: no node can be oriented and removed")]
    NoEligibleNode,

    /// The directed part of the input contains a cycle, so no topological
    /// order exists.
    #[error("Directed cycle in input where an acyclic graph was required")]
    CyclicGraph,

    /// A pattern admitted no consistent DAG at all (distinct from a
    /// malformed PDAG: every orientation of the undirected edges was
    /// cyclic or knowledge-violating).
    #[error("No DAG consistent with the given pattern")]
    NoDagInPattern,
}

impl CausalErrorCode for StructuralError {
    fn error_code(&self) -> &'static str {
        error_code::STRUCTURAL_ERROR
    }
}
