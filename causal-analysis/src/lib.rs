//! causal-analysis: the causal graph orientation engine.
//!
//! Takes a skeleton (undirected adjacency over a set of variables) plus
//! separating-set information from conditional-independence tests and
//! produces a pattern (PDAG) representing a Markov equivalence class of
//! DAGs. Components:
//! - Graph: mutable mixed graph with typed endpoints
//! - Combinations: lazy k-subset and mixed-radix enumerators
//! - Sepsets: separating-set map and integrity verification
//! - Knowledge: tiered background knowledge and required orientations
//! - Colliders: unshielded-triple orientation under four policies
//! - Meek: fixpoint propagation of the four orientation rules
//! - Pattern: pattern<->DAG conversion and DAG enumeration
//! - Reachability: legal-pairs path reachability search

pub mod colliders;
pub mod combinations;
pub mod graph;
pub mod knowledge;
pub mod meek;
pub mod pattern;
pub mod reachability;
pub mod sepsets;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports for convenience
pub use colliders::{
    best_guess_cycle_orientation, cpc_triple_type, cpc_triple_type_fdr, cpc_triple_type_majority,
    ColliderOrienter, TripleType,
};
pub use graph::{CausalGraph, EdgeMarks, Endpoint, NodeInfo, NodeType, Triple};
pub use knowledge::{arrange_by_tiers, orient_required, translate, TierKnowledge};
pub use meek::{MeekRules, R1Mode};
pub use pattern::{
    basic_pattern, dag_from_pattern, dag_to_pdag, dags_in_pattern, directed_cycle, is_clique,
    pattern_from_dag, pdag_to_dag, verify_acyclic, DagIterator, EdgeOrientationIterator,
};
pub use reachability::{reachable_nodes, LegalPairs, ReachabilityEdge};
pub use sepsets::{verify_sepset_integrity, SepsetMap};
