//! Multi-hop change propagation across the relationship graph.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::SimError;
use crate::graph::KpiGraph;
use crate::model::{Kpi, KpiUri, RelationKind};

use super::{PropagationOutcome, SimulationResult, impact};

/// Edge-kind damping factors and the traversal depth bound.
#[derive(Debug, Clone)]
pub struct PropagationConfig {
    /// Maximum recursion depth per originating change.
    pub max_depth: usize,
    /// Damping for `influences` edges.
    pub influences_damping: f64,
    /// Damping for `dependsOn` edges.
    pub depends_on_damping: f64,
    /// Damping for every other edge kind.
    pub default_damping: f64,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            influences_damping: 0.3,
            depends_on_damping: 0.5,
            default_damping: 0.1,
        }
    }
}

impl PropagationConfig {
    fn damping(&self, kind: &RelationKind) -> f64 {
        match kind {
            RelationKind::Influences => self.influences_damping,
            RelationKind::DependsOn => self.depends_on_damping,
            RelationKind::Other(_) => self.default_damping,
        }
    }
}

/// Simulate a set of value changes against a snapshot.
///
/// Each requested change gets a direct impact analysis, then propagates
/// recursively through edges of every kind with per-kind damping. An empty
/// change map is accepted and yields an identity result with score zero.
pub fn simulate_scenario(
    changes: &BTreeMap<KpiUri, f64>,
    kpis: &[Kpi],
    graph: &KpiGraph,
    config: &PropagationConfig,
) -> Result<SimulationResult, SimError> {
    let by_uri: HashMap<&KpiUri, &Kpi> = kpis.iter().map(|k| (&k.uri, k)).collect();

    let original_values: BTreeMap<KpiUri, f64> = kpis
        .iter()
        .map(|k| (k.uri.clone(), k.observation.value))
        .collect();

    let mut new_values = BTreeMap::new();
    let mut impacts = BTreeMap::new();
    for (uri, &value) in changes {
        new_values.insert(uri.clone(), value);
        impacts.insert(uri.clone(), impact::direct_impact(uri, value, kpis, graph)?);
    }

    // One visited set per originating change, shared across its whole
    // recursion tree: a node reached by one branch is never re-emitted or
    // re-entered by a sibling branch.
    let mut predicted_outcomes = Vec::new();
    for (uri, &value) in changes {
        let mut visited = HashSet::new();
        propagate(
            uri,
            value,
            graph,
            &by_uri,
            config,
            &mut visited,
            0,
            &mut predicted_outcomes,
        );
    }

    // Only the directly requested changes count toward the score, averaged
    // over the full snapshot.
    let total: f64 = original_values
        .iter()
        .map(|(uri, &original)| (new_values.get(uri).copied().unwrap_or(original) - original).abs())
        .sum();
    let overall_impact_score = if kpis.is_empty() {
        0.0
    } else {
        total / kpis.len() as f64
    };

    Ok(SimulationResult {
        original_values,
        new_values,
        impacts,
        predicted_outcomes,
        overall_impact_score,
    })
}

#[allow(clippy::too_many_arguments)]
fn propagate(
    uri: &KpiUri,
    incoming_value: f64,
    graph: &KpiGraph,
    by_uri: &HashMap<&KpiUri, &Kpi>,
    config: &PropagationConfig,
    visited: &mut HashSet<KpiUri>,
    depth: usize,
    outcomes: &mut Vec<PropagationOutcome>,
) {
    if depth > config.max_depth || visited.contains(uri) {
        return;
    }
    visited.insert(uri.clone());

    for (target, edge) in graph.edges_from(uri) {
        // Targets missing from the snapshot are skipped entirely.
        let Some(target_kpi) = by_uri.get(&target) else {
            continue;
        };
        // Single-visit invariant: a join node receives exactly one outcome,
        // via whichever branch reaches it first.
        if visited.contains(&target) {
            continue;
        }

        let original_value = target_kpi.observation.value;
        let change_amount = (incoming_value - original_value) * config.damping(&edge.kind);
        let projected_value = original_value + change_amount;

        outcomes.push(PropagationOutcome {
            kpi_uri: target.clone(),
            kpi_label: target_kpi.label.clone(),
            original_value,
            projected_value,
            change_amount,
            influenced_by: uri.clone(),
            relationship: edge.kind.clone(),
            depth: depth + 1,
        });

        // The projected value is the baseline for the target's own edges.
        propagate(
            &target,
            projected_value,
            graph,
            by_uri,
            config,
            visited,
            depth + 1,
            outcomes,
        );
    }
}
