//! Stable error codes, one per subsystem.
//!
//! Codes are part of the public surface: downstream callers match on them
//! when mapping engine failures to their own diagnostics.

pub const GRAPH_ERROR: &str = "CAUSAL_GRAPH";
pub const STRUCTURAL_ERROR: &str = "CAUSAL_STRUCTURAL";
pub const KNOWLEDGE_ERROR: &str = "CAUSAL_KNOWLEDGE";
pub const ORIENTATION_ERROR: &str = "CAUSAL_ORIENTATION";

/// Maps an error to its stable subsystem code.
pub trait CausalErrorCode {
    fn error_code(&self) -> &'static str;
}
