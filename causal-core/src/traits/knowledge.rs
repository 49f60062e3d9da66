//! Background knowledge oracle.

/// Read-only background knowledge: tier assignments plus required and
/// forbidden edge relations, all keyed by variable name.
///
/// Tiers are an ordered partition of variable names; a lower tier number
/// means earlier in the presumed causal order. The engine never mutates
/// knowledge.
pub trait Knowledge {
    /// True if the edge from -> to is required.
    fn edge_required(&self, from: &str, to: &str) -> bool;

    /// True if the edge from -> to is forbidden (explicitly, or because
    /// the tiering places `from` after `to`).
    fn edge_forbidden(&self, from: &str, to: &str) -> bool;

    /// Number of tiers. Zero when no tiering is configured.
    fn num_tiers(&self) -> usize;

    /// Variable names in tier i. Empty for an out-of-range index.
    fn tier(&self, i: usize) -> &[String];

    /// Known variables assigned to no tier.
    fn vars_not_in_tier(&self) -> Vec<String>;

    /// All required (from, to) pairs, in insertion order.
    fn required_edges(&self) -> Vec<(String, String)>;

    /// All forbidden (from, to) pairs, in insertion order. Does not
    /// include pairs forbidden only by tiering.
    fn forbidden_edges(&self) -> Vec<(String, String)>;
}

/// Checks whether background knowledge permits an arrowhead at `to` on
/// the edge between `from` and `to`.
///
/// An arrowhead from -> to is disallowed when knowledge requires the
/// reverse edge to -> from or forbids from -> to. `None` permits
/// everything.
pub fn arrowpoint_allowed(knowledge: Option<&dyn Knowledge>, from: &str, to: &str) -> bool {
    match knowledge {
        None => true,
        Some(k) => !k.edge_required(to, from) && !k.edge_forbidden(from, to),
    }
}
