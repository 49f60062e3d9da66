//! Orientation run configuration.

use serde::{Deserialize, Serialize};

/// Strategy used to decide which unshielded triples become colliders.
///
/// Selected once per run; every policy respects background knowledge and
/// logs the rule that fired for each orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ColliderPolicy {
    /// Trust the precomputed sepset: orient x->y<-z iff y is not in
    /// sepset(x, z).
    #[default]
    Strict,
    /// Re-search locally for a separating set; orient as a collider only
    /// when no separating set containing the center exists.
    LocalSearch,
    /// Sepset-based, but skip triples where the center (or an endpoint,
    /// after augmenting the sepset) is deterministically a function of
    /// the conditioning set.
    ConservativeDeterministic,
    /// Rank candidate triples by the achieved p-value of their sepset
    /// test and orient only the most reliable half.
    RankedMajority,
}

impl ColliderPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::LocalSearch => "local_search",
            Self::ConservativeDeterministic => "conservative_deterministic",
            Self::RankedMajority => "ranked_majority",
        }
    }
}

/// Configuration for a single orientation run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OrientationConfig {
    /// Collider orientation policy.
    pub policy: ColliderPolicy,
    /// Maximum conditioning-set size for local sepset searches.
    /// `None` means unbounded (internally capped at min(n, 1000)).
    pub depth: Option<usize>,
    /// Defensive bound on Meek fixpoint passes. Default: 1000.
    pub max_passes: Option<usize>,
}

impl OrientationConfig {
    /// Returns the effective Meek pass bound, defaulting to 1000.
    pub fn effective_max_passes(&self) -> usize {
        self.max_passes.unwrap_or(1000)
    }
}
