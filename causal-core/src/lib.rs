//! causal-core: shared foundation for the causal orientation engine.
//!
//! This crate holds the pieces every engine crate agrees on:
//! - Errors: one enum per subsystem, `thiserror` only, zero `anyhow`
//! - Config: serde-backed orientation configuration
//! - Traits: external oracles (independence test, background knowledge)

pub mod config;
pub mod errors;
pub mod traits;

pub use config::{ColliderPolicy, OrientationConfig};
pub use errors::{
    CausalErrorCode, GraphError, KnowledgeError, OrientationError, StructuralError,
};
pub use traits::{arrowpoint_allowed, IndependenceTest, Knowledge};
