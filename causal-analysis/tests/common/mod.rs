//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use causal_analysis::{CausalGraph, Endpoint, NodeInfo};
use causal_core::IndependenceTest;
use petgraph::graph::NodeIndex;

/// Table-driven independence oracle. Listed facts test independent
/// with p = 0.5; everything else is dependent with p = 0.001.
pub struct FakeIndependenceTest {
    alpha: f64,
    independencies: Vec<(NodeIndex, NodeIndex, Vec<NodeIndex>)>,
    determinations: Vec<(Vec<NodeIndex>, NodeIndex)>,
    last_p: f64,
}

impl FakeIndependenceTest {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            independencies: Vec::new(),
            determinations: Vec::new(),
            last_p: 1.0,
        }
    }

    pub fn add_independence(&mut self, x: NodeIndex, z: NodeIndex, mut cond: Vec<NodeIndex>) {
        cond.sort_unstable();
        self.independencies.push((x, z, cond));
    }

    pub fn add_determination(&mut self, mut cond: Vec<NodeIndex>, y: NodeIndex) {
        cond.sort_unstable();
        self.determinations.push((cond, y));
    }
}

impl IndependenceTest for FakeIndependenceTest {
    fn is_independent(&mut self, x: NodeIndex, z: NodeIndex, cond: &[NodeIndex]) -> bool {
        let mut sorted = cond.to_vec();
        sorted.sort_unstable();
        let hit = self
            .independencies
            .iter()
            .any(|(a, b, c)| ((*a == x && *b == z) || (*a == z && *b == x)) && *c == sorted);
        self.last_p = if hit { 0.5 } else { 0.001 };
        hit
    }

    fn p_value(&self) -> f64 {
        self.last_p
    }

    fn alpha(&self) -> f64 {
        self.alpha
    }

    fn determines(&mut self, cond: &[NodeIndex], y: NodeIndex) -> bool {
        let mut sorted = cond.to_vec();
        sorted.sort_unstable();
        self.determinations.iter().any(|(c, n)| *c == sorted && *n == y)
    }
}

/// Adds measured nodes with the given names.
pub fn add_nodes(graph: &mut CausalGraph, names: &[&str]) -> Vec<NodeIndex> {
    names
        .iter()
        .map(|n| graph.add_node(NodeInfo::measured(*n)).unwrap())
        .collect()
}

/// Structural equality over shared node names: same adjacencies with
/// the same endpoint marks on every pair.
pub fn graphs_equal(a: &CausalGraph, b: &CausalGraph) -> bool {
    if a.node_count() != b.node_count() {
        return false;
    }
    let names: Vec<String> = a
        .nodes()
        .iter()
        .map(|&ix| a.name(ix).to_string())
        .collect();
    for (i, left) in names.iter().enumerate() {
        for right in &names[i + 1..] {
            let (Some(al), Some(ar)) = (a.node(left), a.node(right)) else { return false };
            let (Some(bl), Some(br)) = (b.node(left), b.node(right)) else { return false };
            if endpoint_pair(a, al, ar) != endpoint_pair(b, bl, br) {
                return false;
            }
        }
    }
    true
}

fn endpoint_pair(
    g: &CausalGraph,
    x: NodeIndex,
    y: NodeIndex,
) -> (Option<Endpoint>, Option<Endpoint>) {
    (g.endpoint(x, y), g.endpoint(y, x))
}
