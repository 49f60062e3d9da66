//! Unshielded-triple orientation.
//!
//! An unshielded triple x - y - z (x, z non-adjacent) is a collider
//! x -> y <- z exactly when y separates nothing: y appears in no
//! conditioning set that renders x and z independent. The policies here
//! differ in where that evidence comes from, recorded sepsets from the
//! skeleton search versus fresh local independence queries, and in how
//! conflicting evidence is resolved.

use causal_core::{
    arrowpoint_allowed, ColliderPolicy, GraphError, IndependenceTest, Knowledge,
    OrientationConfig, OrientationError,
};
use petgraph::graph::NodeIndex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::combinations::{bounded_depth, pick, ChoiceGenerator};
use crate::graph::{CausalGraph, Endpoint, Triple};
use crate::pattern::directed_cycle;
use crate::sepsets::SepsetMap;

/// Classification of an unshielded triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripleType {
    Collider,
    Noncollider,
    Ambiguous,
}

/// Dispatches collider orientation according to the configured policy.
pub struct ColliderOrienter<'a> {
    config: &'a OrientationConfig,
    knowledge: Option<&'a dyn Knowledge>,
}

impl<'a> ColliderOrienter<'a> {
    pub fn new(config: &'a OrientationConfig, knowledge: Option<&'a dyn Knowledge>) -> Self {
        Self { config, knowledge }
    }

    /// Runs the configured policy over every unshielded triple.
    ///
    /// `Strict` and `RankedMajority` need recorded sepsets;
    /// `LocalSearch`, `ConservativeDeterministic` and `RankedMajority`
    /// need a live independence test. Missing inputs are an error, not
    /// a silent no-op.
    pub fn orient(
        &self,
        graph: &mut CausalGraph,
        sepsets: Option<&SepsetMap>,
        test: Option<&mut dyn IndependenceTest>,
    ) -> Result<u32, OrientationError> {
        let policy = self.config.policy.name();
        match self.config.policy {
            ColliderPolicy::Strict => {
                let sepsets =
                    sepsets.ok_or(OrientationError::MissingSepsets { policy })?;
                Ok(orient_colliders_using_sepsets(sepsets, self.knowledge, graph)?)
            }
            ColliderPolicy::LocalSearch => {
                let test =
                    test.ok_or(OrientationError::MissingIndependenceTest { policy })?;
                Ok(orient_colliders_locally(
                    test,
                    self.knowledge,
                    self.config.depth,
                    graph,
                )?)
            }
            ColliderPolicy::ConservativeDeterministic => {
                let sepsets =
                    sepsets.ok_or(OrientationError::MissingSepsets { policy })?;
                let test =
                    test.ok_or(OrientationError::MissingIndependenceTest { policy })?;
                Ok(pcd_orient_colliders(test, self.knowledge, sepsets, graph)?)
            }
            ColliderPolicy::RankedMajority => {
                let sepsets =
                    sepsets.ok_or(OrientationError::MissingSepsets { policy })?;
                let test =
                    test.ok_or(OrientationError::MissingIndependenceTest { policy })?;
                Ok(orient_colliders_ranked(sepsets, test, self.knowledge, graph)?)
            }
        }
    }
}

/// Orients every unshielded triple whose recorded sepset excludes the
/// middle node. Returns the number of colliders oriented.
pub fn orient_colliders_using_sepsets(
    sepsets: &SepsetMap,
    knowledge: Option<&dyn Knowledge>,
    graph: &mut CausalGraph,
) -> Result<u32, GraphError> {
    let mut oriented = 0;
    for a in graph.nodes() {
        let adj = graph.adjacent_nodes(a);
        for choice in ChoiceGenerator::new(adj.len(), 2) {
            let b = adj[choice[0]];
            let c = adj[choice[1]];
            if graph.is_adjacent_to(b, c) {
                continue;
            }
            // Already a collider at a.
            if graph.endpoint(b, a) == Some(Endpoint::Arrow)
                && graph.endpoint(c, a) == Some(Endpoint::Arrow)
            {
                continue;
            }
            let Some(sepset) = sepsets.get(b, c) else { continue };
            if sepset.contains(&a) {
                continue;
            }
            if !arrowpoint_allowed(knowledge, graph.name(b), graph.name(a))
                || !arrowpoint_allowed(knowledge, graph.name(c), graph.name(a))
            {
                continue;
            }
            graph.set_endpoint(b, a, Endpoint::Arrow)?;
            graph.set_endpoint(c, a, Endpoint::Arrow)?;
            tracing::debug!(
                x = %graph.name(b),
                y = %graph.name(a),
                z = %graph.name(c),
                "oriented collider from sepset"
            );
            oriented += 1;
        }
    }
    Ok(oriented)
}

/// Orients unshielded triples by searching locally for a separating
/// set containing the middle node; absence of one means collider.
pub fn orient_colliders_locally(
    test: &mut dyn IndependenceTest,
    knowledge: Option<&dyn Knowledge>,
    depth: Option<usize>,
    graph: &mut CausalGraph,
) -> Result<u32, GraphError> {
    let mut oriented = 0;
    for a in graph.nodes() {
        let adj = graph.adjacent_nodes(a);
        for choice in ChoiceGenerator::new(adj.len(), 2) {
            let b = adj[choice[0]];
            let c = adj[choice[1]];
            if graph.is_adjacent_to(b, c) {
                continue;
            }
            if !graph.is_undirected_from_to(b, a) || !graph.is_undirected_from_to(c, a) {
                continue;
            }
            if exists_local_sepset_with(b, a, c, test, graph, depth) {
                continue;
            }
            if !arrowpoint_allowed(knowledge, graph.name(b), graph.name(a))
                || !arrowpoint_allowed(knowledge, graph.name(c), graph.name(a))
            {
                continue;
            }
            graph.set_endpoint(b, a, Endpoint::Arrow)?;
            graph.set_endpoint(c, a, Endpoint::Arrow)?;
            tracing::debug!(
                x = %graph.name(b),
                y = %graph.name(a),
                z = %graph.name(c),
                "oriented collider from local search"
            );
            oriented += 1;
        }
    }
    Ok(oriented)
}

/// Local-search orientation that screens out conditioning sets the
/// test reports as determining the middle node.
///
/// Companion to `MeekRules::orient_implied_locally_det` for oracles
/// with determinism; called directly, not routed through a
/// `ColliderPolicy` (the conservative policy consumes recorded sepsets
/// via `pcd_orient_colliders`).
pub fn orient_colliders_locally_det(
    test: &mut dyn IndependenceTest,
    knowledge: Option<&dyn Knowledge>,
    depth: Option<usize>,
    graph: &mut CausalGraph,
) -> Result<u32, GraphError> {
    let mut oriented = 0;
    for a in graph.nodes() {
        let adj = graph.adjacent_nodes(a);
        for choice in ChoiceGenerator::new(adj.len(), 2) {
            let b = adj[choice[0]];
            let c = adj[choice[1]];
            if graph.is_adjacent_to(b, c) {
                continue;
            }
            if !graph.is_undirected_from_to(b, a) || !graph.is_undirected_from_to(c, a) {
                continue;
            }
            if !exists_local_sepset_without_det(b, a, c, test, graph, depth) {
                continue;
            }
            if !arrowpoint_allowed(knowledge, graph.name(b), graph.name(a))
                || !arrowpoint_allowed(knowledge, graph.name(c), graph.name(a))
            {
                continue;
            }
            graph.set_endpoint(b, a, Endpoint::Arrow)?;
            graph.set_endpoint(c, a, Endpoint::Arrow)?;
            tracing::debug!(
                x = %graph.name(b),
                y = %graph.name(a),
                z = %graph.name(c),
                "oriented collider from deterministic local search"
            );
            oriented += 1;
        }
    }
    Ok(oriented)
}

/// Sepset-driven orientation that refuses triples where determinism
/// makes the independence evidence unreliable.
pub fn pcd_orient_colliders(
    test: &mut dyn IndependenceTest,
    knowledge: Option<&dyn Knowledge>,
    sepsets: &SepsetMap,
    graph: &mut CausalGraph,
) -> Result<u32, GraphError> {
    let mut oriented = 0;
    for y in graph.nodes() {
        let adj = graph.adjacent_nodes(y);
        for choice in ChoiceGenerator::new(adj.len(), 2) {
            let x = adj[choice[0]];
            let z = adj[choice[1]];
            if graph.is_adjacent_to(x, z) {
                continue;
            }
            let Some(sepset) = sepsets.get(x, z) else { continue };
            if sepset.contains(&y) {
                continue;
            }
            if test.determines(sepset, y) {
                continue;
            }
            let mut augmented = sepset.to_vec();
            augmented.push(y);
            if !test.determines(sepset, x) && test.determines(&augmented, x) {
                continue;
            }
            if !test.determines(sepset, z) && test.determines(&augmented, z) {
                continue;
            }
            if !arrowpoint_allowed(knowledge, graph.name(x), graph.name(y))
                || !arrowpoint_allowed(knowledge, graph.name(z), graph.name(y))
            {
                continue;
            }
            graph.set_endpoint(x, y, Endpoint::Arrow)?;
            graph.set_endpoint(z, y, Endpoint::Arrow)?;
            tracing::debug!(
                x = %graph.name(x),
                y = %graph.name(y),
                z = %graph.name(z),
                "oriented collider from deterministic sepset"
            );
            oriented += 1;
        }
    }
    Ok(oriented)
}

/// Ranks collider candidates by the p-value of their separating
/// independence and orients only the better-supported half, strongest
/// evidence first.
pub fn orient_colliders_ranked(
    sepsets: &SepsetMap,
    test: &mut dyn IndependenceTest,
    knowledge: Option<&dyn Knowledge>,
    graph: &mut CausalGraph,
) -> Result<u32, GraphError> {
    let mut ranked: Vec<(f64, Triple)> = Vec::new();
    for a in graph.nodes() {
        let adj = graph.adjacent_nodes(a);
        for choice in ChoiceGenerator::new(adj.len(), 2) {
            let b = adj[choice[0]];
            let c = adj[choice[1]];
            if graph.is_adjacent_to(b, c) {
                continue;
            }
            let Some(sepset) = sepsets.get(b, c) else { continue };
            if sepset.contains(&a) {
                continue;
            }
            if !arrowpoint_allowed(knowledge, graph.name(b), graph.name(a))
                || !arrowpoint_allowed(knowledge, graph.name(c), graph.name(a))
            {
                continue;
            }
            test.is_independent(b, c, sepset);
            ranked.push((test.p_value(), Triple::new(b, a, c)));
        }
    }
    ranked.sort_by(|l, r| l.0.partial_cmp(&r.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut oriented = 0;
    for i in (ranked.len() / 2..ranked.len()).rev() {
        let Triple { x, y, z } = ranked[i].1;
        graph.set_endpoint(x, y, Endpoint::Arrow)?;
        graph.set_endpoint(z, y, Endpoint::Arrow)?;
        tracing::debug!(
            x = %graph.name(x),
            y = %graph.name(y),
            z = %graph.name(z),
            p = ranked[i].0,
            "oriented collider from ranked sepset"
        );
        oriented += 1;
    }
    Ok(oriented)
}

/// Candidate conditioning variables for a local sepset search: the
/// union of the adjacents of x and z, excluding x and z themselves.
fn local_candidates(graph: &CausalGraph, x: NodeIndex, z: NodeIndex) -> Vec<NodeIndex> {
    let mut candidates = graph.adjacent_nodes(x);
    for n in graph.adjacent_nodes(z) {
        if !candidates.contains(&n) {
            candidates.push(n);
        }
    }
    candidates.retain(|&n| n != x && n != z);
    candidates.sort_unstable();
    candidates
}

/// True if some local conditioning set containing y separates x and z.
pub fn exists_local_sepset_with(
    x: NodeIndex,
    y: NodeIndex,
    z: NodeIndex,
    test: &mut dyn IndependenceTest,
    graph: &CausalGraph,
    depth: Option<usize>,
) -> bool {
    let candidates = local_candidates(graph, x, z);
    let bound = bounded_depth(depth, candidates.len());
    for d in 1..=bound {
        for choice in ChoiceGenerator::new(candidates.len(), d) {
            let cond = pick(&choice, &candidates);
            if !cond.contains(&y) {
                continue;
            }
            if test.is_independent(x, z, &cond) {
                return true;
            }
        }
    }
    false
}

/// True if some local conditioning set excluding y separates x and z.
pub fn exists_local_sepset_without(
    x: NodeIndex,
    y: NodeIndex,
    z: NodeIndex,
    test: &mut dyn IndependenceTest,
    graph: &CausalGraph,
    depth: Option<usize>,
) -> bool {
    let candidates = local_candidates(graph, x, z);
    let bound = bounded_depth(depth, candidates.len());
    for d in 0..=bound {
        for choice in ChoiceGenerator::new(candidates.len(), d) {
            let cond = pick(&choice, &candidates);
            if cond.contains(&y) {
                continue;
            }
            if test.is_independent(x, z, &cond) {
                return true;
            }
        }
    }
    false
}

/// Like `exists_local_sepset_without`, additionally skipping
/// conditioning sets that determine y.
pub fn exists_local_sepset_without_det(
    x: NodeIndex,
    y: NodeIndex,
    z: NodeIndex,
    test: &mut dyn IndependenceTest,
    graph: &CausalGraph,
    depth: Option<usize>,
) -> bool {
    let candidates = local_candidates(graph, x, z);
    let bound = bounded_depth(depth, candidates.len());
    for d in 0..=bound {
        for choice in ChoiceGenerator::new(candidates.len(), d) {
            let cond = pick(&choice, &candidates);
            if cond.contains(&y) {
                continue;
            }
            if test.determines(&cond, y) {
                continue;
            }
            if test.is_independent(x, z, &cond) {
                return true;
            }
        }
    }
    false
}

/// Classifies an unshielded triple by exhaustive sepset search over
/// the adjacents of x and of z. Any disagreement between sepsets that
/// do and do not contain y is ambiguous.
pub fn cpc_triple_type(
    x: NodeIndex,
    y: NodeIndex,
    z: NodeIndex,
    test: &mut dyn IndependenceTest,
    depth: Option<usize>,
    graph: &CausalGraph,
) -> TripleType {
    let mut sepset_containing_y = false;
    let mut sepset_excluding_y = false;

    for (base, other) in [(x, z), (z, x)] {
        let mut adj = graph.adjacent_nodes(base);
        adj.retain(|&n| n != other);
        let bound = bounded_depth(depth, adj.len());
        for d in 0..=bound {
            for choice in ChoiceGenerator::new(adj.len(), d) {
                let cond = pick(&choice, &adj);
                if !test.is_independent(x, z, &cond) {
                    continue;
                }
                if cond.contains(&y) {
                    sepset_containing_y = true;
                } else {
                    sepset_excluding_y = true;
                }
                if sepset_containing_y && sepset_excluding_y {
                    return TripleType::Ambiguous;
                }
            }
        }
    }

    if sepset_containing_y {
        TripleType::Noncollider
    } else {
        TripleType::Collider
    }
}

/// Classifies an unshielded triple by majority vote over the distinct
/// separating sets found among the local candidates.
pub fn cpc_triple_type_majority(
    x: NodeIndex,
    y: NodeIndex,
    z: NodeIndex,
    test: &mut dyn IndependenceTest,
    depth: Option<usize>,
    graph: &CausalGraph,
) -> TripleType {
    let candidates = local_candidates(graph, x, z);
    let bound = bounded_depth(depth, candidates.len());
    let mut with_y: FxHashSet<Vec<NodeIndex>> = FxHashSet::default();
    let mut without_y: FxHashSet<Vec<NodeIndex>> = FxHashSet::default();

    for d in 0..=bound {
        for choice in ChoiceGenerator::new(candidates.len(), d) {
            let cond = pick(&choice, &candidates);
            if !test.is_independent(x, z, &cond) {
                continue;
            }
            if cond.contains(&y) {
                with_y.insert(cond);
            } else {
                without_y.insert(cond);
            }
        }
    }

    if with_y.len() > without_y.len() {
        TripleType::Noncollider
    } else if without_y.len() > with_y.len() {
        TripleType::Collider
    } else {
        TripleType::Ambiguous
    }
}

/// Classifies an unshielded triple by a false-discovery-rate cutoff
/// over the p-values of separating sets that contain y. No separating
/// set containing y at all means collider.
pub fn cpc_triple_type_fdr(
    x: NodeIndex,
    y: NodeIndex,
    z: NodeIndex,
    test: &mut dyn IndependenceTest,
    depth: Option<usize>,
    graph: &CausalGraph,
) -> TripleType {
    let mut pvalues = Vec::new();

    for (base, other) in [(x, z), (z, x)] {
        let mut adj = graph.adjacent_nodes(base);
        adj.retain(|&n| n != other);
        let bound = bounded_depth(depth, adj.len());
        for d in 0..=bound {
            for choice in ChoiceGenerator::new(adj.len(), d) {
                let cond = pick(&choice, &adj);
                if !cond.contains(&y) {
                    continue;
                }
                if test.is_independent(x, z, &cond) {
                    pvalues.push(test.p_value());
                }
            }
        }
    }

    if pvalues.is_empty() {
        return TripleType::Collider;
    }
    pvalues.sort_by(|l, r| l.partial_cmp(r).unwrap_or(std::cmp::Ordering::Equal));
    let cutoff = fdr_cutoff(test.alpha(), &pvalues);
    if pvalues[0] > cutoff {
        TripleType::Collider
    } else {
        TripleType::Noncollider
    }
}

/// Benjamini-Hochberg cutoff over ascending p-values: the largest p
/// with p <= (rank / m) * alpha, or 0 when none qualifies.
fn fdr_cutoff(alpha: f64, sorted_pvalues: &[f64]) -> f64 {
    let m = sorted_pvalues.len() as f64;
    let mut cutoff = 0.0;
    for (i, &p) in sorted_pvalues.iter().enumerate() {
        if p <= (i as f64 + 1.0) / m * alpha {
            cutoff = p;
        }
    }
    cutoff
}

/// Breaks directed cycles by re-orienting the weakest triple on each
/// cycle as a collider, until no directed cycle remains.
pub fn best_guess_cycle_orientation(
    test: &mut dyn IndependenceTest,
    graph: &mut CausalGraph,
) -> Result<(), GraphError> {
    while let Some(cycle) = directed_cycle(graph) {
        if cycle.len() < 3 {
            break;
        }
        let mut wrapped = Vec::with_capacity(cycle.len() + 2);
        wrapped.push(cycle[cycle.len() - 1]);
        wrapped.extend_from_slice(&cycle);
        wrapped.push(cycle[0]);

        let mut best: Option<(f64, usize)> = None;
        for j in 1..wrapped.len() - 1 {
            let (x, z) = (wrapped[j - 1], wrapped[j + 1]);
            test.is_independent(x, z, &[wrapped[j]]);
            let p = test.p_value();
            if best.map_or(true, |(bp, _)| p < bp) {
                best = Some((p, j));
            }
        }
        let Some((_, j)) = best else { break };
        let (x, y, z) = (wrapped[j - 1], wrapped[j], wrapped[j + 1]);
        tracing::debug!(
            x = %graph.name(x),
            y = %graph.name(y),
            z = %graph.name(z),
            "re-orienting weakest cycle triple as collider"
        );
        graph.remove_edge(x, y)?;
        graph.remove_edge(z, y)?;
        graph.add_directed_edge(x, y)?;
        graph.add_directed_edge(z, y)?;
    }
    Ok(())
}
