//! Configuration for orientation runs.

pub mod orientation_config;

pub use orientation_config::{ColliderPolicy, OrientationConfig};
