//! Background knowledge errors.

use super::error_code::{self, CausalErrorCode};

/// Errors raised by invalid background-knowledge configuration.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("There are no tiers to arrange")]
    NoTiers,

    #[error("Tier index {index} out of range ({num_tiers} tiers)")]
    TierOutOfRange { index: usize, num_tiers: usize },
}

impl CausalErrorCode for KnowledgeError {
    fn error_code(&self) -> &'static str {
        error_code::KNOWLEDGE_ERROR
    }
}
