//! Error handling for the causal engine.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod error_code;
pub mod graph_error;
pub mod knowledge_error;
pub mod orientation_error;
pub mod structural_error;

pub use error_code::CausalErrorCode;
pub use graph_error::GraphError;
pub use knowledge_error::KnowledgeError;
pub use orientation_error::OrientationError;
pub use structural_error::StructuralError;
