//! Orientation pipeline errors.
//! Aggregates subsystem errors via `From` conversions.

use super::error_code::{self, CausalErrorCode};
use super::{GraphError, KnowledgeError, StructuralError};

/// Errors raised while running collider orientation or Meek propagation.
#[derive(Debug, thiserror::Error)]
pub enum OrientationError {
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Structural error: {0}")]
    Structural(#[from] StructuralError),

    #[error("Knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    /// The selected collider policy needs a sepset map, and none was given.
    #[error("Policy {policy} requires a sepset map")]
    MissingSepsets { policy: &'static str },

    /// The selected collider policy needs an independence test oracle.
    #[error("Policy {policy} requires an independence test")]
    MissingIndependenceTest { policy: &'static str },

    /// The Meek fixpoint loop exceeded its defensive pass bound. Only
    /// possible with inconsistent background knowledge or a bug; the
    /// graph is left in its partially oriented state.
    #[error("Orientation did not stabilize within {max_passes} passes")]
    PassBoundExceeded { max_passes: usize },
}

impl CausalErrorCode for OrientationError {
    fn error_code(&self) -> &'static str {
        match self {
            OrientationError::Graph(e) => e.error_code(),
            OrientationError::Structural(e) => e.error_code(),
            OrientationError::Knowledge(e) => e.error_code(),
            _ => error_code::ORIENTATION_ERROR,
        }
    }
}
