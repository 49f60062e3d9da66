//! Table-driven independence oracle for unit tests.

use causal_core::IndependenceTest;
use petgraph::graph::NodeIndex;

/// Fake test backed by an explicit list of independence facts.
/// Listed facts test independent with p = 0.5; everything else tests
/// dependent with p = 0.001.
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
