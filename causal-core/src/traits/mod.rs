//! External oracle traits consumed by the engine.

pub mod independence;
pub mod knowledge;

pub use independence::IndependenceTest;
pub use knowledge::{arrowpoint_allowed, Knowledge};
