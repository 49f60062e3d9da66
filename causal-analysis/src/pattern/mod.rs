//! Pattern and DAG conversion.
//!
//! A pattern (PDAG) stands for a Markov equivalence class: its directed
//! edges are compelled in every member, its undirected edges vary.
//! This module converts in both directions and enumerates the class.

use causal_core::{Knowledge, OrientationError, StructuralError};
use petgraph::graph::NodeIndex;
use rustc_hash::FxHashMap;

use crate::combinations::CombinationGenerator;
use crate::graph::{CausalGraph, EdgeMarks, Endpoint};
use crate::knowledge::orient_required;
use crate::meek::MeekRules;

/// Finds a directed cycle, returned as the nodes along it in order,
/// or None when the directed part of the graph is acyclic.
pub fn directed_cycle(graph: &CausalGraph) -> Option<Vec<NodeIndex>> {
    for start in graph.nodes() {
        let mut path = Vec::new();
        if directed_path_back(graph, start, start, &mut path) {
            return Some(path);
        }
    }
    None
}

fn directed_path_back(
    graph: &CausalGraph,
    current: NodeIndex,
    target: NodeIndex,
    path: &mut Vec<NodeIndex>,
) -> bool {
    path.push(current);
    for child in graph.children(current) {
        if child == target {
            return true;
        }
        if path.contains(&child) {
            continue;
        }
        if directed_path_back(graph, child, target, path) {
            return true;
        }
    }
    path.pop();
    false
}

/// Errors when the directed part of the graph has a cycle.
pub fn verify_acyclic(graph: &CausalGraph) -> Result<(), StructuralError> {
    if directed_cycle(graph).is_some() {
        return Err(StructuralError::CyclicGraph);
    }
    Ok(())
}

/// True if every pair of the given nodes is adjacent.
pub fn is_clique(nodes: &[NodeIndex], graph: &CausalGraph) -> bool {
    for (i, &a) in nodes.iter().enumerate() {
        for &b in &nodes[i + 1..] {
            if !graph.is_adjacent_to(a, b) {
                return false;
            }
        }
    }
    true
}

/// Undirects every directed edge x -> y that is not held in place by
/// a parent of y non-adjacent to x, i.e. by collider structure.
pub fn basic_pattern(graph: &mut CausalGraph) -> Result<(), OrientationError> {
    let mut to_undirect = Vec::new();
    for e in graph.edges() {
        let Some((s, t)) = graph.edge_endpoints(e) else { continue };
        let Some(marks) = graph.marks(e).copied() else { continue };
        if !marks.is_directed() {
            continue;
        }
        let (x, y) = if marks.target == Endpoint::Arrow { (s, t) } else { (t, s) };
        let compelled = graph
            .parents(y)
            .into_iter()
            .any(|p| p != x && !graph.is_adjacent_to(p, x));
        if !compelled {
            to_undirect.push((x, y));
        }
    }
    for (x, y) in to_undirect {
        graph.set_marks(x, y, EdgeMarks::undirected())?;
    }
    Ok(())
}

/// The pattern of a DAG: collider-compelled edges stay directed,
/// everything else is undirected, then the orientation rules close
/// over what remains forced.
pub fn pattern_from_dag(dag: &CausalGraph) -> Result<CausalGraph, OrientationError> {
    let mut pattern = dag.clone();
    basic_pattern(&mut pattern)?;
    MeekRules::new(None).orient_implied(&mut pattern)?;
    Ok(pattern)
}

/// Pattern of a DAG with background knowledge folded in before the
/// orientation rules run.
pub fn pattern_from_dag_with_knowledge(
    dag: &CausalGraph,
    knowledge: &dyn Knowledge,
) -> Result<CausalGraph, OrientationError> {
    let mut pattern = dag.clone();
    basic_pattern(&mut pattern)?;
    orient_required(knowledge, &mut pattern);
    MeekRules::new(Some(knowledge)).orient_implied(&mut pattern)?;
    Ok(pattern)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeLabel {
    Compelled,
    Reversible,
}

/// Topological order by repeated removal of parentless nodes.
fn topological_order(dag: &CausalGraph) -> Result<Vec<NodeIndex>, StructuralError> {
    let mut work = dag.clone();
    let mut order = Vec::with_capacity(dag.node_count());
    while work.node_count() > 0 {
        let Some(n) = work.nodes().into_iter().find(|&n| work.is_exogenous(n)) else {
            return Err(StructuralError::CyclicGraph);
        };
        order.push(n);
        let _ = work.remove_node(n);
    }
    Ok(order)
}

/// Chickering's compelled/reversible labeling: the PDAG of a DAG.
///
/// Edges are processed in the order (sink rank ascending, source rank
/// descending); each unlabeled edge x -> y is compelled when a
/// compelled parent of x misses y, or when some other parent of y is
/// not a parent of x, and reversible otherwise. Reversible edges are
/// undirected in the result. Cyclic input is rejected.
pub fn dag_to_pdag(dag: &CausalGraph) -> Result<CausalGraph, OrientationError> {
    let order = topological_order(dag)?;
    let mut rank: FxHashMap<NodeIndex, usize> = FxHashMap::default();
    for (i, &n) in order.iter().enumerate() {
        rank.insert(n, i);
    }

    let mut edges: Vec<(NodeIndex, NodeIndex)> = Vec::new();
    for e in dag.edges() {
        let Some((s, t)) = dag.edge_endpoints(e) else { continue };
        let Some(marks) = dag.marks(e).copied() else { continue };
        if !marks.is_directed() {
            continue;
        }
        let (x, y) = if marks.target == Endpoint::Arrow { (s, t) } else { (t, s) };
        edges.push((x, y));
    }
    edges.sort_by_key(|&(x, y)| (rank.get(&y).copied(), std::cmp::Reverse(rank.get(&x).copied())));

    let mut index: FxHashMap<(NodeIndex, NodeIndex), usize> = FxHashMap::default();
    for (i, &pair) in edges.iter().enumerate() {
        index.insert(pair, i);
    }
    let mut labels: Vec<Option<EdgeLabel>> = vec![None; edges.len()];

    while let Some(i) = labels.iter().position(Option::is_none) {
        let (x, y) = edges[i];
        let mut settled = false;

        // Compelled parents of x propagate forward.
        for j in 0..edges.len() {
            if labels[j] != Some(EdgeLabel::Compelled) || edges[j].1 != x {
                continue;
            }
            let w = edges[j].0;
            if dag.is_directed_from_to(w, y) {
                if let Some(&k) = index.get(&(w, y)) {
                    labels[k] = Some(EdgeLabel::Compelled);
                }
            } else {
                for k in 0..edges.len() {
                    if edges[k].1 == y {
                        labels[k] = Some(EdgeLabel::Compelled);
                    }
                }
                settled = true;
                break;
            }
        }
        if settled {
            continue;
        }

        let other_parent = dag
            .parents(y)
            .into_iter()
            .any(|z| z != x && !dag.is_directed_from_to(z, x));
        let label = if other_parent { EdgeLabel::Compelled } else { EdgeLabel::Reversible };
        labels[i] = Some(label);
        for k in 0..edges.len() {
            if edges[k].1 == y && labels[k].is_none() {
                labels[k] = Some(label);
            }
        }
    }

    let mut pdag = dag.clone();
    for (k, &(x, y)) in edges.iter().enumerate() {
        if labels[k] == Some(EdgeLabel::Reversible) {
            pdag.set_marks(x, y, EdgeMarks::undirected())?;
        }
    }
    Ok(pdag)
}

/// Extends a PDAG to a DAG by repeatedly consuming a sink, preferring
/// one whose undirected neighbors are adjacent to all of its other
/// adjacents (Dor and Tarsi). When no sink satisfies that condition
/// the first sink is consumed anyway; the result is then an acyclic
/// directing that may introduce new colliders. Fails only when no
/// sink remains, i.e. the directed part already has a cycle.
pub fn pdag_to_dag(pdag: &CausalGraph) -> Result<CausalGraph, OrientationError> {
    let mut dag = pdag.clone();
    for e in dag.edges() {
        let Some(marks) = dag.marks(e).copied() else { continue };
        if marks.is_undirected() {
            if let Some((a, b)) = dag.edge_endpoints(e) {
                dag.remove_edge(a, b)?;
            }
        }
    }

    let mut work = pdag.clone();
    while work.node_count() > 0 {
        let mut eligible = None;
        let mut fallback_sink = None;
        for x in work.nodes() {
            if !work.children(x).is_empty() {
                continue;
            }
            if fallback_sink.is_none() {
                fallback_sink = Some(x);
            }
            let neighbors = work.undirected_neighbors(x);
            let adjacents = work.adjacent_nodes(x);
            let ok = neighbors.iter().all(|&y| {
                adjacents
                    .iter()
                    .all(|&other| other == y || work.is_adjacent_to(y, other))
            });
            if !ok {
                continue;
            }
            eligible = Some(x);
            break;
        }
        let Some(x) = eligible.or(fallback_sink) else {
            return Err(StructuralError::NoEligibleNode.into());
        };
        if eligible.is_none() {
            tracing::debug!(node = %work.name(x), "no eligible sink, consuming anyway");
        }
        for neighbor in work.undirected_neighbors(x) {
            dag.add_directed_edge(neighbor, x)?;
        }
        work.remove_node(x)?;
    }
    Ok(dag)
}

/// Every way of directing the undirected edges of a pattern. Directed
/// edges are left alone, so the yield is 2^u graphs for u undirected
/// edges, acyclic or not.
pub struct EdgeOrientationIterator {
    base: CausalGraph,
    undirected: Vec<(NodeIndex, NodeIndex)>,
    combinations: CombinationGenerator,
}

impl EdgeOrientationIterator {
    pub fn new(pattern: &CausalGraph) -> Self {
        let mut undirected = Vec::new();
        for e in pattern.edges() {
            let Some(marks) = pattern.marks(e) else { continue };
            if marks.is_undirected() {
                if let Some(pair) = pattern.edge_endpoints(e) {
                    undirected.push(pair);
                }
            }
        }
        let combinations = CombinationGenerator::new(vec![2; undirected.len()]);
        Self { base: pattern.clone(), undirected, combinations }
    }
}

impl Iterator for EdgeOrientationIterator {
    type Item = CausalGraph;

    fn next(&mut self) -> Option<CausalGraph> {
        let combination = self.combinations.next()?;
        let mut graph = self.base.clone();
        for (i, &(a, b)) in self.undirected.iter().enumerate() {
            let (from, to) = if combination[i] == 0 { (a, b) } else { (b, a) };
            graph.set_marks(from, to, EdgeMarks::directed()).ok()?;
        }
        Some(graph)
    }
}

/// The DAGs in a pattern: orientations of the undirected edges that
/// are acyclic and, when knowledge is given, violate no forbidden
/// edge.
pub struct DagIterator<'a> {
    inner: EdgeOrientationIterator,
    knowledge: Option<&'a dyn Knowledge>,
}

impl<'a> DagIterator<'a> {
    pub fn new(pattern: &CausalGraph, knowledge: Option<&'a dyn Knowledge>) -> Self {
        Self { inner: EdgeOrientationIterator::new(pattern), knowledge }
    }

    fn violates_knowledge(&self, graph: &CausalGraph) -> bool {
        let Some(knowledge) = self.knowledge else { return false };
        for e in graph.edges() {
            let Some((s, t)) = graph.edge_endpoints(e) else { continue };
            let Some(marks) = graph.marks(e) else { continue };
            if !marks.is_directed() {
                continue;
            }
            let (x, y) = if marks.target == Endpoint::Arrow { (s, t) } else { (t, s) };
            if knowledge.edge_forbidden(graph.name(x), graph.name(y)) {
                return true;
            }
        }
        false
    }
}

impl Iterator for DagIterator<'_> {
    type Item = CausalGraph;

    fn next(&mut self) -> Option<CausalGraph> {
        loop {
            let graph = self.inner.next()?;
            if directed_cycle(&graph).is_some() {
                continue;
            }
            if self.violates_knowledge(&graph) {
                continue;
            }
            return Some(graph);
        }
    }
}

/// Eagerly collects every orientation of the undirected edges.
pub fn graphs_by_directing_undirected_edges(pattern: &CausalGraph) -> Vec<CausalGraph> {
    EdgeOrientationIterator::new(pattern).collect()
}

/// Eagerly collects the DAGs in a pattern.
pub fn dags_in_pattern(
    pattern: &CausalGraph,
    knowledge: Option<&dyn Knowledge>,
) -> Vec<CausalGraph> {
    DagIterator::new(pattern, knowledge).collect()
}

/// The first DAG in a pattern, in enumeration order.
pub fn dag_from_pattern(
    pattern: &CausalGraph,
    knowledge: Option<&dyn Knowledge>,
) -> Result<CausalGraph, OrientationError> {
    DagIterator::new(pattern, knowledge)
        .next()
        .ok_or_else(|| StructuralError::NoDagInPattern.into())
}
