//! Tiered background knowledge.
//!
//! `TierKnowledge` is the concrete store behind the `Knowledge` trait:
//! explicit required/forbidden edges plus temporal tiers. An edge from
//! a later tier into an earlier tier is forbidden implicitly.

use causal_core::{Knowledge, KnowledgeError};
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::graph::CausalGraph;

/// Background knowledge as explicit edge constraints plus tiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierKnowledge {
    pub variables: Vec<String>,
    pub tiers: Vec<Vec<String>>,
    pub required: Vec<(String, String)>,
    pub forbidden: Vec<(String, String)>,
}

impl TierKnowledge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variable(&mut self, name: impl Into<String>) {
        self.variables.push(name.into());
    }

    /// Places a variable in a tier, growing the tier list as needed.
    pub fn add_to_tier(&mut self, tier: usize, name: impl Into<String>) {
        if self.tiers.len() <= tier {
            self.tiers.resize_with(tier + 1, Vec::new);
        }
        self.tiers[tier].push(name.into());
    }

    pub fn set_required(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.required.push((from.into(), to.into()));
    }

    pub fn set_forbidden(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.forbidden.push((from.into(), to.into()));
    }

    fn tier_of(&self, name: &str) -> Option<usize> {
        self.tiers
            .iter()
            .position(|tier| tier.iter().any(|v| v == name))
    }
}

impl Knowledge for TierKnowledge {
    fn edge_required(&self, from: &str, to: &str) -> bool {
        self.required.iter().any(|(f, t)| f == from && t == to)
    }

    fn edge_forbidden(&self, from: &str, to: &str) -> bool {
        if self.forbidden.iter().any(|(f, t)| f == from && t == to) {
            return true;
        }
        match (self.tier_of(from), self.tier_of(to)) {
            (Some(from_tier), Some(to_tier)) => from_tier > to_tier,
            _ => false,
        }
    }

    fn num_tiers(&self) -> usize {
        self.tiers.len()
    }

    fn tier(&self, i: usize) -> &[String] {
        self.tiers.get(i).map(Vec::as_slice).unwrap_or(&[])
    }

    fn vars_not_in_tier(&self) -> Vec<String> {
        self.variables
            .iter()
            .filter(|v| self.tier_of(v).is_none())
            .cloned()
            .collect()
    }

    fn required_edges(&self) -> Vec<(String, String)> {
        self.required.clone()
    }

    fn forbidden_edges(&self) -> Vec<(String, String)> {
        self.forbidden.clone()
    }
}

/// Resolves a knowledge variable name against a graph.
pub fn translate(name: &str, graph: &CausalGraph) -> Option<NodeIndex> {
    graph.node(name)
}

/// Orients edges the background knowledge decides outright.
///
/// A forbidden from -> to whose pair is adjacent is oriented to -> from;
/// a required from -> to is oriented as stated. Names that do not
/// resolve in the graph, and pairs with no edge, are skipped.
pub fn orient_required(knowledge: &dyn Knowledge, graph: &mut CausalGraph) {
    for (from, to) in knowledge.forbidden_edges() {
        let (Some(from_ix), Some(to_ix)) = (translate(&from, graph), translate(&to, graph))
        else {
            continue;
        };
        if graph.remove_edge(from_ix, to_ix).is_err() {
            continue;
        }
        if graph.add_directed_edge(to_ix, from_ix).is_ok() {
            tracing::debug!(from = %to, to = %from, "oriented by forbidden knowledge");
        }
    }
    for (from, to) in knowledge.required_edges() {
        let (Some(from_ix), Some(to_ix)) = (translate(&from, graph), translate(&to, graph))
        else {
            continue;
        };
        if graph.remove_edge(from_ix, to_ix).is_err() {
            continue;
        }
        if graph.add_directed_edge(from_ix, to_ix).is_ok() {
            tracing::debug!(from = %from, to = %to, "oriented by required knowledge");
        }
    }
}

/// Lays node display coordinates out in tier rows, untiered variables
/// on top. Fails when the knowledge has no tiers.
pub fn arrange_by_tiers(
    knowledge: &dyn Knowledge,
    graph: &mut CausalGraph,
) -> Result<(), KnowledgeError> {
    if knowledge.num_tiers() == 0 {
        return Err(KnowledgeError::NoTiers);
    }
    let y_space = (500 / knowledge.num_tiers()).max(50) as i32;
    let mut y = 60 - y_space;

    let mut rows: Vec<Vec<String>> = vec![knowledge.vars_not_in_tier()];
    for i in 0..knowledge.num_tiers() {
        rows.push(knowledge.tier(i).to_vec());
    }

    for row in rows {
        if row.is_empty() {
            continue;
        }
        y += y_space;
        let mut x = -25;
        for name in row {
            x += 90;
            let Some(ix) = graph.node(&name) else { continue };
            if let Some(info) = graph.node_info_mut(ix) {
                info.center_x = x;
                info.center_y = y;
            }
        }
    }
    Ok(())
}
