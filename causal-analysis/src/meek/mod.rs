//! Fixpoint propagation of the four orientation rules.
//!
//! After collider orientation, these rules direct every edge whose
//! orientation is forced, on pain of creating a new collider or a
//! directed cycle. The fixpoint is confluent, so pass order only
//! affects how many passes the loop takes, not the result.

use causal_core::{
    arrowpoint_allowed, IndependenceTest, Knowledge, OrientationConfig, OrientationError,
};
use tracing::debug;

use crate::colliders::{exists_local_sepset_without, exists_local_sepset_without_det};
use crate::combinations::ChoiceGenerator;
use crate::graph::{CausalGraph, Endpoint};

const DEFAULT_MAX_PASSES: usize = 1000;

/// How the away-from-collider rule re-checks its premise.
///
/// `Unconditional` trusts the graph. The local modes re-query the
/// independence test for a separating set excluding the middle node
/// before orienting, the deterministic variant additionally screening
/// out conditioning sets that determine it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum R1Mode {
    Unconditional,
    LocalSearch,
    LocalSearchDet,
}

/// The four rules plus the fixpoint loop driving them.
pub struct MeekRules<'a> {
    knowledge: Option<&'a dyn Knowledge>,
    max_passes: usize,
}

impl<'a> MeekRules<'a> {
    pub fn new(knowledge: Option<&'a dyn Knowledge>) -> Self {
        Self { knowledge, max_passes: DEFAULT_MAX_PASSES }
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Rules driven by a run configuration: the configured pass bound
    /// plus the given knowledge.
    pub fn from_config(config: &OrientationConfig, knowledge: Option<&'a dyn Knowledge>) -> Self {
        Self::new(knowledge).with_max_passes(config.effective_max_passes())
    }

    /// Runs all four rules to fixpoint. Returns the number of
    /// orientations made.
    pub fn orient_implied(&self, graph: &mut CausalGraph) -> Result<u32, OrientationError> {
        self.run(graph, R1Mode::Unconditional, None, None)
    }

    /// Fixpoint with the away-from-collider rule re-checked against a
    /// live independence test.
    pub fn orient_implied_locally(
        &self,
        test: &mut dyn IndependenceTest,
        depth: Option<usize>,
        graph: &mut CausalGraph,
    ) -> Result<u32, OrientationError> {
        self.run(graph, R1Mode::LocalSearch, Some(test), depth)
    }

    /// Fixpoint with determinism-aware re-checking.
    pub fn orient_implied_locally_det(
        &self,
        test: &mut dyn IndependenceTest,
        depth: Option<usize>,
        graph: &mut CausalGraph,
    ) -> Result<u32, OrientationError> {
        self.run(graph, R1Mode::LocalSearchDet, Some(test), depth)
    }

    fn run(
        &self,
        graph: &mut CausalGraph,
        mode: R1Mode,
        mut test: Option<&mut dyn IndependenceTest>,
        depth: Option<usize>,
    ) -> Result<u32, OrientationError> {
        let mut total = 0u32;
        let mut passes = 0usize;
        loop {
            let mut changed = 0u32;
            changed += self.away_from_collider(
                graph,
                mode,
                test.as_deref_mut().map(|t| t as &mut dyn IndependenceTest),
                depth,
            )?;
            changed += self.away_from_cycle(graph)?;
            changed += self.double_triangle(graph)?;
            changed += self.discriminating_kite(graph)?;
            total += changed;
            if changed == 0 {
                break;
            }
            passes += 1;
            if passes >= self.max_passes {
                tracing::warn!(
                    max_passes = self.max_passes,
                    "orientation fixpoint did not settle"
                );
                return Err(OrientationError::PassBoundExceeded {
                    max_passes: self.max_passes,
                });
            }
        }
        Ok(total)
    }

    /// Rule 1: b -> a, a -- c, b and c non-adjacent, orient a -> c.
    /// Otherwise the triple b, a, c would be a new unshielded collider.
    fn away_from_collider(
        &self,
        graph: &mut CausalGraph,
        mode: R1Mode,
        mut test: Option<&mut dyn IndependenceTest>,
        depth: Option<usize>,
    ) -> Result<u32, OrientationError> {
        let mut oriented = 0;
        for a in graph.nodes() {
            for b in graph.nodes_into(a, Endpoint::Arrow) {
                if !graph.is_directed_from_to(b, a) {
                    continue;
                }
                for c in graph.undirected_neighbors(a) {
                    if c == b || graph.is_adjacent_to(b, c) {
                        continue;
                    }
                    match mode {
                        R1Mode::Unconditional => {}
                        R1Mode::LocalSearch => {
                            let t = test.as_deref_mut().ok_or(
                                OrientationError::MissingIndependenceTest {
                                    policy: "local_search",
                                },
                            )?;
                            if exists_local_sepset_without(b, a, c, t, graph, depth) {
                                continue;
                            }
                        }
                        R1Mode::LocalSearchDet => {
                            let t = test.as_deref_mut().ok_or(
                                OrientationError::MissingIndependenceTest {
                                    policy: "local_search_det",
                                },
                            )?;
                            if exists_local_sepset_without_det(b, a, c, t, graph, depth) {
                                continue;
                            }
                        }
                    }
                    if !arrowpoint_allowed(self.knowledge, graph.name(a), graph.name(c)) {
                        continue;
                    }
                    graph.set_endpoint(a, c, Endpoint::Arrow)?;
                    debug!(from = %graph.name(a), to = %graph.name(c), "meek r1");
                    oriented += 1;
                }
            }
        }
        Ok(oriented)
    }

    /// Rule 2: b -> a -> c with b -- c, orient b -> c. Orienting the
    /// other way would close a directed cycle.
    fn away_from_cycle(&self, graph: &mut CausalGraph) -> Result<u32, OrientationError> {
        let mut oriented = 0;
        for a in graph.nodes() {
            let adj = graph.adjacent_nodes(a);
            for choice in ChoiceGenerator::new(adj.len(), 2) {
                let b = adj[choice[0]];
                let c = adj[choice[1]];
                let (from, to) = if graph.is_directed_from_to(b, a)
                    && graph.is_directed_from_to(a, c)
                    && graph.is_undirected_from_to(b, c)
                {
                    (b, c)
                } else if graph.is_directed_from_to(c, a)
                    && graph.is_directed_from_to(a, b)
                    && graph.is_undirected_from_to(c, b)
                {
                    (c, b)
                } else {
                    continue;
                };
                if !arrowpoint_allowed(self.knowledge, graph.name(from), graph.name(to)) {
                    continue;
                }
                graph.set_endpoint(from, to, Endpoint::Arrow)?;
                debug!(from = %graph.name(from), to = %graph.name(to), "meek r2");
                oriented += 1;
            }
        }
        Ok(oriented)
    }

    /// Rule 3: a -- b with two non-adjacent common neighbors c, d where
    /// a -- c, a -- d, c -> b and d -> b, orient a -> b.
    fn double_triangle(&self, graph: &mut CausalGraph) -> Result<u32, OrientationError> {
        let mut oriented = 0;
        for a in graph.nodes() {
            for b in graph.adjacent_nodes(a) {
                if !graph.is_undirected_from_to(a, b) {
                    continue;
                }
                let others: Vec<_> = graph
                    .adjacent_nodes(a)
                    .into_iter()
                    .filter(|&n| n != b)
                    .collect();
                for choice in ChoiceGenerator::new(others.len(), 2) {
                    let c = others[choice[0]];
                    let d = others[choice[1]];
                    if graph.is_adjacent_to(c, d) {
                        continue;
                    }
                    if !graph.is_undirected_from_to(a, c) || !graph.is_undirected_from_to(a, d) {
                        continue;
                    }
                    if !graph.is_directed_from_to(c, b) || !graph.is_directed_from_to(d, b) {
                        continue;
                    }
                    if !arrowpoint_allowed(self.knowledge, graph.name(a), graph.name(b)) {
                        continue;
                    }
                    graph.set_endpoint(a, b, Endpoint::Arrow)?;
                    debug!(from = %graph.name(a), to = %graph.name(b), "meek r3");
                    oriented += 1;
                    break;
                }
            }
        }
        Ok(oriented)
    }

    /// Rule 4: only sound given background knowledge. For d adjacent
    /// to a and non-adjacent pairs drawn from a's other adjacents with
    /// a -- b and a -- c undirected: b -> c and d -> c orient a -> c;
    /// c -> d and d -> b orient a -> b.
    fn discriminating_kite(&self, graph: &mut CausalGraph) -> Result<u32, OrientationError> {
        if self.knowledge.is_none() {
            return Ok(0);
        }
        let mut oriented = 0;
        for a in graph.nodes() {
            let adj = graph.adjacent_nodes(a);
            for &d in &adj {
                let others: Vec<_> = adj.iter().copied().filter(|&n| n != d).collect();
                for choice in ChoiceGenerator::new(others.len(), 2) {
                    let b = others[choice[0]];
                    let c = others[choice[1]];
                    if !graph.is_undirected_from_to(a, b) || !graph.is_undirected_from_to(a, c) {
                        continue;
                    }
                    if graph.is_directed_from_to(b, c) && graph.is_directed_from_to(d, c) {
                        if !arrowpoint_allowed(self.knowledge, graph.name(a), graph.name(c)) {
                            continue;
                        }
                        graph.set_endpoint(a, c, Endpoint::Arrow)?;
                        debug!(from = %graph.name(a), to = %graph.name(c), "meek r4");
                        oriented += 1;
                    } else if graph.is_directed_from_to(c, d) && graph.is_directed_from_to(d, b) {
                        if !arrowpoint_allowed(self.knowledge, graph.name(a), graph.name(b)) {
                            continue;
                        }
                        graph.set_endpoint(a, b, Endpoint::Arrow)?;
                        debug!(from = %graph.name(a), to = %graph.name(b), "meek r4");
                        oriented += 1;
                    }
                }
            }
        }
        Ok(oriented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeInfo;
    use crate::knowledge::TierKnowledge;
    use crate::test_support::FakeIndependenceTest;
    use petgraph::graph::NodeIndex;

    fn named_nodes(g: &mut CausalGraph, names: &[&str]) -> Vec<NodeIndex> {
        names
            .iter()
            .map(|n| g.add_node(NodeInfo::measured(*n)).unwrap())
            .collect()
    }

    #[test]
    fn test_r1_orients_away_from_collider() {
        let mut g = CausalGraph::new();
        let ix = named_nodes(&mut g, &["B", "A", "C"]);
        let (b, a, c) = (ix[0], ix[1], ix[2]);
        g.add_directed_edge(b, a).unwrap();
        g.add_undirected_edge(a, c).unwrap();

        let rules = MeekRules::new(None);
        let n = rules.orient_implied(&mut g).unwrap();
        assert_eq!(n, 1);
        assert!(g.is_directed_from_to(a, c));
    }

    #[test]
    fn test_r1_skips_shielded_triple() {
        let mut g = CausalGraph::new();
        let ix = named_nodes(&mut g, &["B", "A", "C"]);
        let (b, a, c) = (ix[0], ix[1], ix[2]);
        g.add_directed_edge(b, a).unwrap();
        g.add_undirected_edge(a, c).unwrap();
        g.add_undirected_edge(b, c).unwrap();

        let rules = MeekRules::new(None);
        rules.orient_implied(&mut g).unwrap();
        // b -- c shields the triple; nothing is forced. The b -- c edge
        // itself is not forced either.
        assert!(g.is_undirected_from_to(a, c) || g.is_directed_from_to(a, c));
        assert!(!g.is_directed_from_to(c, a));
    }

    #[test]
    fn test_r2_orients_away_from_cycle() {
        let mut g = CausalGraph::new();
        let ix = named_nodes(&mut g, &["B", "A", "C"]);
        let (b, a, c) = (ix[0], ix[1], ix[2]);
        g.add_directed_edge(b, a).unwrap();
        g.add_directed_edge(a, c).unwrap();
        g.add_undirected_edge(b, c).unwrap();

        let rules = MeekRules::new(None);
        let n = rules.orient_implied(&mut g).unwrap();
        assert_eq!(n, 1);
        assert!(g.is_directed_from_to(b, c));
    }

    #[test]
    fn test_r3_orients_double_triangle() {
        let mut g = CausalGraph::new();
        let ix = named_nodes(&mut g, &["A", "B", "C", "D"]);
        let (a, b, c, d) = (ix[0], ix[1], ix[2], ix[3]);
        g.add_undirected_edge(a, b).unwrap();
        g.add_undirected_edge(a, c).unwrap();
        g.add_undirected_edge(a, d).unwrap();
        g.add_directed_edge(c, b).unwrap();
        g.add_directed_edge(d, b).unwrap();

        let rules = MeekRules::new(None);
        rules.orient_implied(&mut g).unwrap();
        assert!(g.is_directed_from_to(a, b));
    }

    #[test]
    fn test_r4_is_noop_without_knowledge() {
        let mut g = CausalGraph::new();
        let ix = named_nodes(&mut g, &["A", "B", "C", "D"]);
        let (a, b, c, d) = (ix[0], ix[1], ix[2], ix[3]);
        g.add_undirected_edge(a, b).unwrap();
        g.add_undirected_edge(a, c).unwrap();
        g.add_undirected_edge(a, d).unwrap();
        g.add_directed_edge(b, c).unwrap();
        g.add_directed_edge(d, c).unwrap();

        let rules = MeekRules::new(None);
        assert_eq!(rules.discriminating_kite(&mut g).unwrap(), 0);

        let k = TierKnowledge::new();
        let rules = MeekRules::new(Some(&k));
        assert!(rules.discriminating_kite(&mut g).unwrap() > 0);
        assert!(g.is_directed_from_to(a, c));
    }

    #[test]
    fn test_fixpoint_is_idempotent() {
        let mut g = CausalGraph::new();
        let ix = named_nodes(&mut g, &["B", "A", "C", "D"]);
        let (b, a, c, d) = (ix[0], ix[1], ix[2], ix[3]);
        g.add_directed_edge(b, a).unwrap();
        g.add_undirected_edge(a, c).unwrap();
        g.add_undirected_edge(c, d).unwrap();

        let rules = MeekRules::new(None);
        let first = rules.orient_implied(&mut g).unwrap();
        assert!(first >= 2);
        // Re-running orients nothing further.
        assert_eq!(rules.orient_implied(&mut g).unwrap(), 0);
        assert!(g.is_directed_from_to(a, c));
        assert!(g.is_directed_from_to(c, d));
    }

    #[test]
    fn test_forbidden_arrowpoint_blocks_r1() {
        let mut g = CausalGraph::new();
        let ix = named_nodes(&mut g, &["B", "A", "C"]);
        let (b, a, c) = (ix[0], ix[1], ix[2]);
        g.add_directed_edge(b, a).unwrap();
        g.add_undirected_edge(a, c).unwrap();

        let mut k = TierKnowledge::new();
        k.set_forbidden("A", "C");
        let rules = MeekRules::new(Some(&k));
        rules.orient_implied(&mut g).unwrap();
        assert!(g.is_undirected_from_to(a, c));
    }

    #[test]
    fn test_local_r1_defers_to_fresh_separation_evidence() {
        let mut g = CausalGraph::new();
        let ix = named_nodes(&mut g, &["B", "A", "C"]);
        let (b, a, c) = (ix[0], ix[1], ix[2]);
        g.add_directed_edge(b, a).unwrap();
        g.add_undirected_edge(a, c).unwrap();

        // b and c separate unconditionally, so the triple premise fails
        // on re-check and nothing is oriented.
        let mut test = FakeIndependenceTest::new(0.05);
        test.add_independence(b, c, vec![]);
        let rules = MeekRules::new(None);
        let n = rules.orient_implied_locally(&mut test, None, &mut g).unwrap();
        assert_eq!(n, 0);
        assert!(g.is_undirected_from_to(a, c));
    }

    #[test]
    fn test_local_det_r1_screens_determined_separations() {
        let mut g = CausalGraph::new();
        let ix = named_nodes(&mut g, &["B", "A", "C"]);
        let (b, a, c) = (ix[0], ix[1], ix[2]);
        g.add_directed_edge(b, a).unwrap();
        g.add_undirected_edge(a, c).unwrap();

        let mut test = FakeIndependenceTest::new(0.05);
        test.add_independence(b, c, vec![]);
        let rules = MeekRules::new(None);

        // The unconditional separation blocks the rule, same as the
        // plain local mode.
        let n = rules
            .orient_implied_locally_det(&mut test, None, &mut g)
            .unwrap();
        assert_eq!(n, 0);
        assert!(g.is_undirected_from_to(a, c));

        // Once the empty conditioning set determines A, that separation
        // no longer counts as evidence and the rule fires.
        test.add_determination(vec![], a);
        let n = rules
            .orient_implied_locally_det(&mut test, None, &mut g)
            .unwrap();
        assert_eq!(n, 1);
        assert!(g.is_directed_from_to(a, c));
    }

    #[test]
    fn test_pass_bound_comes_from_config() {
        let mut g = CausalGraph::new();
        let ix = named_nodes(&mut g, &["B", "A", "C"]);
        let (b, a, c) = (ix[0], ix[1], ix[2]);
        g.add_directed_edge(b, a).unwrap();
        g.add_undirected_edge(a, c).unwrap();

        let config = OrientationConfig {
            max_passes: Some(1),
            ..OrientationConfig::default()
        };
        let rules = MeekRules::from_config(&config, None);
        // One forced orientation means one changed pass, which already
        // exhausts a bound of one.
        assert!(matches!(
            rules.orient_implied(&mut g),
            Err(OrientationError::PassBoundExceeded { max_passes: 1 })
        ));

        let mut g = CausalGraph::new();
        let ix = named_nodes(&mut g, &["B", "A", "C"]);
        g.add_directed_edge(ix[0], ix[1]).unwrap();
        g.add_undirected_edge(ix[1], ix[2]).unwrap();
        let rules = MeekRules::from_config(&OrientationConfig::default(), None);
        assert_eq!(rules.orient_implied(&mut g).unwrap(), 1);
    }
}
