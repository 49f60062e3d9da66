//! Pattern and DAG conversion round trips.

mod common;

use causal_analysis::pattern::{
    dag_from_pattern, dag_to_pdag, dags_in_pattern, directed_cycle, pattern_from_dag,
    pdag_to_dag,
};
use causal_analysis::CausalGraph;
use common::{add_nodes, graphs_equal};
use proptest::prelude::*;

#[test]
fn test_dag_pattern_dag_round_trip() {
    // A -> B <- C, B -> D. Every member of the class shares the
    // collider, so the recovered DAG has the same pattern.
    let mut dag = CausalGraph::new();
    let ix = add_nodes(&mut dag, &["A", "B", "C", "D"]);
    dag.add_directed_edge(ix[0], ix[1]).unwrap();
    dag.add_directed_edge(ix[2], ix[1]).unwrap();
    dag.add_directed_edge(ix[1], ix[3]).unwrap();

    let pattern = pattern_from_dag(&dag).unwrap();
    let member = pdag_to_dag(&pattern).unwrap();
    assert!(directed_cycle(&member).is_none());
    let pattern_again = pattern_from_dag(&member).unwrap();
    assert!(graphs_equal(&pattern, &pattern_again));
}

#[test]
fn test_every_enumerated_dag_stays_in_class() {
    let mut dag = CausalGraph::new();
    let ix = add_nodes(&mut dag, &["A", "B", "C"]);
    dag.add_directed_edge(ix[0], ix[1]).unwrap();
    dag.add_directed_edge(ix[1], ix[2]).unwrap();

    let pattern = pattern_from_dag(&dag).unwrap();
    // Chain pattern A - B - C: four directings, all acyclic. The cycle
    // filter keeps them all; knowledge filtering is exercised elsewhere.
    let members = dags_in_pattern(&pattern, None);
    assert_eq!(members.len(), 4);
    for member in &members {
        assert!(directed_cycle(member).is_none());
        assert_eq!(member.edge_count(), pattern.edge_count());
    }
}

#[test]
fn test_four_cycle_enumeration_and_extension() {
    let mut pattern = CausalGraph::new();
    let ix = add_nodes(&mut pattern, &["A", "B", "C", "D"]);
    pattern.add_undirected_edge(ix[0], ix[1]).unwrap();
    pattern.add_undirected_edge(ix[1], ix[2]).unwrap();
    pattern.add_undirected_edge(ix[2], ix[3]).unwrap();
    pattern.add_undirected_edge(ix[3], ix[0]).unwrap();

    // 16 directings of the 4-cycle, of which exactly 2 are cyclic.
    let dags = dags_in_pattern(&pattern, None);
    assert_eq!(dags.len(), 14);
    for dag in &dags {
        assert!(directed_cycle(dag).is_none());
        assert_eq!(dag.edge_count(), 4);
    }

    // The peel produces one member of that set.
    let peeled = pdag_to_dag(&pattern).unwrap();
    assert!(directed_cycle(&peeled).is_none());
    assert_eq!(peeled.edge_count(), 4);
    assert!(dag_from_pattern(&pattern, None).is_ok());
}

#[test]
fn test_chickering_then_peel_stays_in_equivalence_class() {
    // dag_to_pdag then pdag_to_dag need not return the input DAG, only
    // a member of the same class: same skeleton, same colliders, hence
    // the same pattern.
    let mut dag = CausalGraph::new();
    let ix = add_nodes(&mut dag, &["A", "B", "C", "D"]);
    dag.add_directed_edge(ix[0], ix[1]).unwrap();
    dag.add_directed_edge(ix[1], ix[2]).unwrap();
    dag.add_directed_edge(ix[1], ix[3]).unwrap();

    let pdag = dag_to_pdag(&dag).unwrap();
    let member = pdag_to_dag(&pdag).unwrap();
    assert!(directed_cycle(&member).is_none());
    assert!(graphs_equal(&dag_to_pdag(&member).unwrap(), &pdag));
}

#[test]
fn test_dag_to_pdag_agrees_with_rule_closure() {
    let mut dag = CausalGraph::new();
    let ix = add_nodes(&mut dag, &["A", "B", "C", "D", "E"]);
    dag.add_directed_edge(ix[0], ix[1]).unwrap();
    dag.add_directed_edge(ix[2], ix[1]).unwrap();
    dag.add_directed_edge(ix[1], ix[3]).unwrap();
    dag.add_directed_edge(ix[3], ix[4]).unwrap();

    let chickering = dag_to_pdag(&dag).unwrap();
    let closure = pattern_from_dag(&dag).unwrap();
    assert!(graphs_equal(&chickering, &closure));
}

/// Random DAG on five nodes: edges between index-ordered pairs, so the
/// graph is acyclic by construction.
fn arbitrary_dag(include: &[bool]) -> CausalGraph {
    let mut dag = CausalGraph::new();
    let ix = add_nodes(&mut dag, &["V0", "V1", "V2", "V3", "V4"]);
    let mut pair = 0usize;
    for i in 0..ix.len() {
        for j in i + 1..ix.len() {
            if include[pair] {
                dag.add_directed_edge(ix[i], ix[j]).unwrap();
            }
            pair += 1;
        }
    }
    dag
}

proptest! {
    #[test]
    fn prop_chickering_labeling_matches_rule_closure(include in prop::collection::vec(any::<bool>(), 10)) {
        let dag = arbitrary_dag(&include);
        let chickering = dag_to_pdag(&dag).unwrap();
        let closure = pattern_from_dag(&dag).unwrap();
        prop_assert!(graphs_equal(&chickering, &closure));
    }

    #[test]
    fn prop_pattern_extension_round_trips(include in prop::collection::vec(any::<bool>(), 10)) {
        let dag = arbitrary_dag(&include);
        let pattern = pattern_from_dag(&dag).unwrap();
        let member = pdag_to_dag(&pattern).unwrap();
        prop_assert!(directed_cycle(&member).is_none());
        prop_assert!(graphs_equal(&pattern, &pattern_from_dag(&member).unwrap()));
    }
}
