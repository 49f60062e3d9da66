//! The mutable mixed graph.

use causal_core::GraphError;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::Undirected;
use rustc_hash::FxHashMap;

use super::types::{EdgeMarks, Endpoint, NodeInfo};

/// Mutable graph over named variables with typed endpoint marks.
///
/// At most one edge exists between any pair of nodes. Node and edge
/// indices are stable across removals (petgraph `StableGraph`), so a
/// clone of the graph shares indices with the original — the pattern
/// and PDAG algorithms lean on this when peeling working copies.
///
/// All iteration orders (nodes, edges, adjacency) are ascending by
/// index, i.e. insertion order. Rule-firing order affects which member
/// of an equivalence class is produced, so determinism here is load-
/// bearing, not cosmetic.
#[derive(Debug, Clone, Default)]
pub struct CausalGraph {
    graph: StableGraph<NodeInfo, EdgeMarks, Undirected>,
    names: FxHashMap<String, NodeIndex>,
}

impl CausalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node. Names must be unique within the graph.
    pub fn add_node(&mut self, info: NodeInfo) -> Result<NodeIndex, GraphError> {
        if self.names.contains_key(&info.name) {
            return Err(GraphError::DuplicateNode { name: info.name });
        }
        let name = info.name.clone();
        let ix = self.graph.add_node(info);
        self.names.insert(name, ix);
        Ok(ix)
    }

    /// Looks up a node by name.
    pub fn node(&self, name: &str) -> Option<NodeIndex> {
        self.names.get(name).copied()
    }

    pub fn node_info(&self, ix: NodeIndex) -> Option<&NodeInfo> {
        self.graph.node_weight(ix)
    }

    pub fn node_info_mut(&mut self, ix: NodeIndex) -> Option<&mut NodeInfo> {
        self.graph.node_weight_mut(ix)
    }

    /// The node's name, or "?" for a stale index (diagnostics only).
    pub fn name(&self, ix: NodeIndex) -> &str {
        self.graph.node_weight(ix).map_or("?", |n| n.name.as_str())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> Vec<NodeIndex> {
        let mut nodes: Vec<_> = self.graph.node_indices().collect();
        nodes.sort_unstable();
        nodes
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> Vec<EdgeIndex> {
        let mut edges: Vec<_> = self.graph.edge_indices().collect();
        edges.sort_unstable();
        edges
    }

    /// The (source, target) pair an edge was inserted with.
    pub fn edge_endpoints(&self, e: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(e)
    }

    pub fn marks(&self, e: EdgeIndex) -> Option<&EdgeMarks> {
        self.graph.edge_weight(e)
    }

    /// The edge between a and b, if any.
    pub fn edge_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    pub fn is_adjacent_to(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.graph.find_edge(a, b).is_some()
    }

    fn require_node(&self, ix: NodeIndex) -> Result<(), GraphError> {
        if self.graph.node_weight(ix).is_some() {
            Ok(())
        } else {
            Err(GraphError::NodeNotFound { name: format!("#{}", ix.index()) })
        }
    }

    /// Adds an edge with explicit marks. Errors if either node is
    /// missing or the pair is already connected.
    pub fn add_edge(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        marks: EdgeMarks,
    ) -> Result<EdgeIndex, GraphError> {
        self.require_node(source)?;
        self.require_node(target)?;
        if self.graph.find_edge(source, target).is_some() {
            return Err(GraphError::DuplicateEdge {
                a: self.name(source).to_string(),
                b: self.name(target).to_string(),
            });
        }
        Ok(self.graph.add_edge(source, target, marks))
    }

    /// Adds a directed edge from -> to.
    pub fn add_directed_edge(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
    ) -> Result<EdgeIndex, GraphError> {
        self.add_edge(from, to, EdgeMarks::directed())
    }

    /// Adds an undirected edge a -- b.
    pub fn add_undirected_edge(
        &mut self,
        a: NodeIndex,
        b: NodeIndex,
    ) -> Result<EdgeIndex, GraphError> {
        self.add_edge(a, b, EdgeMarks::undirected())
    }

    /// Adds a bidirected edge a <-> b.
    pub fn add_bidirected_edge(
        &mut self,
        a: NodeIndex,
        b: NodeIndex,
    ) -> Result<EdgeIndex, GraphError> {
        self.add_edge(a, b, EdgeMarks::bidirected())
    }

    /// Removes the edge between a and b.
    pub fn remove_edge(&mut self, a: NodeIndex, b: NodeIndex) -> Result<EdgeMarks, GraphError> {
        let e = self.graph.find_edge(a, b).ok_or_else(|| GraphError::NoSuchEdge {
            a: self.name(a).to_string(),
            b: self.name(b).to_string(),
        })?;
        Ok(self.graph.remove_edge(e).unwrap_or_else(EdgeMarks::undirected))
    }

    /// Removes a node and all incident edges.
    pub fn remove_node(&mut self, ix: NodeIndex) -> Result<NodeInfo, GraphError> {
        let info = self.graph.remove_node(ix).ok_or_else(|| GraphError::NodeNotFound {
            name: format!("#{}", ix.index()),
        })?;
        self.names.remove(&info.name);
        Ok(info)
    }

    /// The mark at the `toward` end of the edge between `from` and
    /// `toward`, or None when the pair is non-adjacent.
    pub fn endpoint(&self, from: NodeIndex, toward: NodeIndex) -> Option<Endpoint> {
        let e = self.graph.find_edge(from, toward)?;
        let (source, _target) = self.graph.edge_endpoints(e)?;
        let marks = self.graph.edge_weight(e)?;
        Some(if source == toward { marks.source } else { marks.target })
    }

    /// Sets the mark at the `toward` end of the edge between `from` and
    /// `toward`. Setting an endpoint on a non-existent edge is a fatal
    /// usage error.
    pub fn set_endpoint(
        &mut self,
        from: NodeIndex,
        toward: NodeIndex,
        mark: Endpoint,
    ) -> Result<(), GraphError> {
        let e = self.graph.find_edge(from, toward).ok_or_else(|| GraphError::NoSuchEdge {
            a: self.name(from).to_string(),
            b: self.name(toward).to_string(),
        })?;
        let (source, _target) = self
            .graph
            .edge_endpoints(e)
            .ok_or_else(|| GraphError::NoSuchEdge {
                a: self.name(from).to_string(),
                b: self.name(toward).to_string(),
            })?;
        let no_such_edge = GraphError::NoSuchEdge {
            a: self.name(from).to_string(),
            b: self.name(toward).to_string(),
        };
        let marks = self.graph.edge_weight_mut(e).ok_or(no_such_edge)?;
        if source == toward {
            marks.source = mark;
        } else {
            marks.target = mark;
        }
        Ok(())
    }

    /// Replaces both marks of an existing edge, oriented so that
    /// `marks.source` sits at `source`.
    pub fn set_marks(
        &mut self,
        source: NodeIndex,
        target: NodeIndex,
        marks: EdgeMarks,
    ) -> Result<(), GraphError> {
        self.set_endpoint(target, source, marks.source)?;
        self.set_endpoint(source, target, marks.target)
    }

    /// Nodes adjacent to n, ascending by index.
    pub fn adjacent_nodes(&self, n: NodeIndex) -> Vec<NodeIndex> {
        let mut adj: Vec<_> = self.graph.neighbors(n).collect();
        adj.sort_unstable();
        adj
    }

    /// True if the edge from -> to exists and is directed that way.
    pub fn is_directed_from_to(&self, from: NodeIndex, to: NodeIndex) -> bool {
        self.endpoint(from, to) == Some(Endpoint::Arrow)
            && self.endpoint(to, from) == Some(Endpoint::Tail)
    }

    /// True if a -- b exists with tails at both ends.
    pub fn is_undirected_from_to(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.endpoint(a, b) == Some(Endpoint::Tail)
            && self.endpoint(b, a) == Some(Endpoint::Tail)
    }

    /// Parents of n: nodes m with a directed edge m -> n.
    pub fn parents(&self, n: NodeIndex) -> Vec<NodeIndex> {
        let mut parents: Vec<_> = self
            .graph
            .neighbors(n)
            .filter(|&m| self.is_directed_from_to(m, n))
            .collect();
        parents.sort_unstable();
        parents
    }

    /// Children of n: nodes m with a directed edge n -> m.
    pub fn children(&self, n: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<_> = self
            .graph
            .neighbors(n)
            .filter(|&m| self.is_directed_from_to(n, m))
            .collect();
        children.sort_unstable();
        children
    }

    /// Neighbors connected to n by an undirected edge.
    pub fn undirected_neighbors(&self, n: NodeIndex) -> Vec<NodeIndex> {
        let mut neighbors: Vec<_> = self
            .graph
            .neighbors(n)
            .filter(|&m| self.is_undirected_from_to(m, n))
            .collect();
        neighbors.sort_unstable();
        neighbors
    }

    /// Nodes m whose edge into n carries the given mark at n.
    pub fn nodes_into(&self, n: NodeIndex, mark: Endpoint) -> Vec<NodeIndex> {
        let mut nodes: Vec<_> = self
            .graph
            .edges(n)
            .filter_map(|edge| {
                let m = if edge.source() == n { edge.target() } else { edge.source() };
                (self.endpoint(m, n) == Some(mark)).then_some(m)
            })
            .collect();
        nodes.sort_unstable();
        nodes
    }

    /// True if n has no parents.
    pub fn is_exogenous(&self, n: NodeIndex) -> bool {
        self.parents(n).is_empty()
    }
}
