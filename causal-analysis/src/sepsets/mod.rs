//! Separating-set storage.
//!
//! A `SepsetMap` records, per non-adjacent pair found during skeleton
//! search, the conditioning set that rendered the pair independent.
//! Keys are unordered: the sepset of (x, z) is the sepset of (z, x).

use petgraph::graph::NodeIndex;
use rustc_hash::FxHashMap;

use crate::graph::CausalGraph;

/// Map from unordered node pairs to their separating sets.
#[derive(Debug, Clone, Default)]
pub struct SepsetMap {
    map: FxHashMap<(NodeIndex, NodeIndex), Vec<NodeIndex>>,
}

impl SepsetMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: NodeIndex, b: NodeIndex) -> (NodeIndex, NodeIndex) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// Records the separating set for the pair (a, b).
    pub fn set(&mut self, a: NodeIndex, b: NodeIndex, sepset: Vec<NodeIndex>) {
        self.map.insert(Self::key(a, b), sepset);
    }

    /// The separating set for (a, b), if one was recorded.
    pub fn get(&self, a: NodeIndex, b: NodeIndex) -> Option<&[NodeIndex]> {
        self.map.get(&Self::key(a, b)).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Checks that every non-adjacent pair has a sepset and no adjacent
/// pair does. Logs the first offending pair and returns false on any
/// violation.
pub fn verify_sepset_integrity(sepsets: &SepsetMap, graph: &CausalGraph) -> bool {
    let nodes = graph.nodes();
    for (i, &a) in nodes.iter().enumerate() {
        for &b in &nodes[i + 1..] {
            let adjacent = graph.is_adjacent_to(a, b);
            let recorded = sepsets.get(a, b).is_some();
            if adjacent == recorded {
                tracing::warn!(
                    a = %graph.name(a),
                    b = %graph.name(b),
                    adjacent,
                    "sepset integrity violation"
                );
                return false;
            }
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeInfo;

    #[test]
    fn test_sepset_keys_are_unordered() {
        let mut sepsets = SepsetMap::new();
        let a = NodeIndex::new(0);
        let b = NodeIndex::new(1);
        let c = NodeIndex::new(2);
        sepsets.set(b, a, vec![c]);
        assert_eq!(sepsets.get(a, b), Some(&[c][..]));
        assert_eq!(sepsets.get(b, a), Some(&[c][..]));
        assert_eq!(sepsets.len(), 1);
    }

    #[test]
    fn test_integrity_holds_for_consistent_map() {
        let mut g = CausalGraph::new();
        let x = g.add_node(NodeInfo::measured("X")).unwrap();
        let y = g.add_node(NodeInfo::measured("Y")).unwrap();
        let z = g.add_node(NodeInfo::measured("Z")).unwrap();
        g.add_undirected_edge(x, y).unwrap();
        g.add_undirected_edge(y, z).unwrap();

        let mut sepsets = SepsetMap::new();
        sepsets.set(x, z, vec![y]);
        assert!(verify_sepset_integrity(&sepsets, &g));
    }

    #[test]
    fn test_integrity_fails_on_missing_sepset() {
        let mut g = CausalGraph::new();
        let x = g.add_node(NodeInfo::measured("X")).unwrap();
        let y = g.add_node(NodeInfo::measured("Y")).unwrap();
        g.add_node(NodeInfo::measured("Z")).unwrap();
        g.add_undirected_edge(x, y).unwrap();

        let sepsets = SepsetMap::new();
        assert!(!verify_sepset_integrity(&sepsets, &g));
    }

    #[test]
    fn test_integrity_fails_on_sepset_for_adjacent_pair() {
        let mut g = CausalGraph::new();
        let x = g.add_node(NodeInfo::measured("X")).unwrap();
        let y = g.add_node(NodeInfo::measured("Y")).unwrap();
        g.add_undirected_edge(x, y).unwrap();

        let mut sepsets = SepsetMap::new();
        sepsets.set(x, y, vec![]);
        assert!(!verify_sepset_integrity(&sepsets, &g));
    }
}
