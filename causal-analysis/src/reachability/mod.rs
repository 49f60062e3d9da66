//! Breadth-first reachability over legal edge pairs.
//!
//! The caller decides which single edges may start a path and which
//! consecutive edge pairs may continue one; the search then finds every
//! node reachable along a path whose every step is legal. D-separation
//! style criteria plug in through the `LegalPairs` trait, with the aux
//! sets c and d passed through untouched.

use petgraph::graph::NodeIndex;
use rustc_hash::FxHashSet;

use crate::graph::CausalGraph;

/// Path legality: which edges may start a path, and which edge pairs
/// (x - y, y - z) may appear consecutively on one.
pub trait LegalPairs {
    fn is_legal_first_edge(&self, x: NodeIndex, y: NodeIndex, graph: &CausalGraph) -> bool;

    fn is_legal_pair(
        &self,
        x: NodeIndex,
        y: NodeIndex,
        z: NodeIndex,
        c: &[NodeIndex],
        d: &[Vec<NodeIndex>],
        graph: &CausalGraph,
    ) -> bool;
}

/// A frontier entry: the edge the search last traversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReachabilityEdge {
    pub from: NodeIndex,
    pub to: NodeIndex,
}

/// Nodes reachable from the initial set along legal paths of at most
/// `max_path_length` edges (None for unlimited).
///
/// Edges, not nodes, are marked visited: a node may be reached along
/// several edges with different continuation rights.
pub fn reachable_nodes(
    initial: &[NodeIndex],
    legal: &dyn LegalPairs,
    c: &[NodeIndex],
    d: &[Vec<NodeIndex>],
    graph: &CausalGraph,
    max_path_length: Option<usize>,
) -> FxHashSet<NodeIndex> {
    let mut reachable = FxHashSet::default();
    let mut visited: FxHashSet<(NodeIndex, NodeIndex)> = FxHashSet::default();
    let mut next_edges = Vec::new();

    for &x in initial {
        for y in graph.adjacent_nodes(x) {
            if !legal.is_legal_first_edge(x, y, graph) {
                continue;
            }
            reachable.insert(y);
            next_edges.push(ReachabilityEdge { from: x, to: y });
            visited.insert((x, y));
        }
    }

    let mut path_length = 1usize;
    while !next_edges.is_empty() {
        path_length += 1;
        if let Some(max) = max_path_length {
            if path_length > max {
                return reachable;
            }
        }
        let current = std::mem::take(&mut next_edges);
        for edge in current {
            let (x, y) = (edge.from, edge.to);
            for z in graph.adjacent_nodes(y) {
                if visited.contains(&(y, z)) {
                    continue;
                }
                if !legal.is_legal_pair(x, y, z, c, d, graph) {
                    continue;
                }
                reachable.insert(z);
                next_edges.push(ReachabilityEdge { from: y, to: z });
                visited.insert((y, z));
            }
        }
    }
    reachable
}

/// Legal pairs that follow arrows only: the reachable set is the set
/// of proper descendants.
#[derive(Debug, Default)]
pub struct DirectedLegalPairs;

impl LegalPairs for DirectedLegalPairs {
    fn is_legal_first_edge(&self, x: NodeIndex, y: NodeIndex, graph: &CausalGraph) -> bool {
        graph.is_directed_from_to(x, y)
    }

    fn is_legal_pair(
        &self,
        _x: NodeIndex,
        y: NodeIndex,
        z: NodeIndex,
        _c: &[NodeIndex],
        _d: &[Vec<NodeIndex>],
        graph: &CausalGraph,
    ) -> bool {
        graph.is_directed_from_to(y, z)
    }
}
