//! Conditional-independence test oracle.

use petgraph::graph::NodeIndex;

/// External conditional-independence oracle.
///
/// The engine consumes verdicts; it never computes them. Calls may be
/// arbitrarily expensive and are issued synchronously. `p_value` is a
/// side channel reflecting the most recent `is_independent` call, which
/// is why the query methods take `&mut self`; implementations are not
/// assumed to be safe for concurrent use.
pub trait IndependenceTest {
    /// True if x is independent of z given the conditioning set.
    fn is_independent(&mut self, x: NodeIndex, z: NodeIndex, cond: &[NodeIndex]) -> bool;

    /// The p-value achieved by the most recent `is_independent` call.
    fn p_value(&self) -> f64;

    /// The significance level this oracle tests at.
    fn alpha(&self) -> f64;

    /// True if y is a deterministic function of the conditioning set.
    fn determines(&mut self, cond: &[NodeIndex], y: NodeIndex) -> bool;
}
