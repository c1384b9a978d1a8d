//! Bounded-depth causal chain exploration.
//!
//! Enumerates directed paths through the relationship graph from every KPI,
//! recording every prefix of every path as its own chain.

use std::collections::HashMap;

use crate::graph::KpiGraph;
use crate::model::{CausalChain, Kpi, KpiUri};

/// Settings for chain exploration.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Maximum hops from the start node. Chains have at most
    /// `max_depth + 1` nodes.
    pub max_depth: usize,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self { max_depth: 3 }
    }
}

/// Dampens each hop's ratio divergence before it multiplies into the score.
const HOP_ATTENUATION: f64 = 0.5;

/// Explore causal chains from every KPI in the snapshot.
///
/// The traversal is depth-first and follows one branch per relationship
/// record, so parallel edges branch separately. There is no cycle
/// suppression: a relationship cycle revisits nodes within the same path up
/// to the depth bound.
pub fn explore_chains(kpis: &[Kpi], graph: &KpiGraph, config: &ChainConfig) -> Vec<CausalChain> {
    let by_uri: HashMap<&KpiUri, &Kpi> = kpis.iter().map(|k| (&k.uri, k)).collect();

    let mut chains = Vec::new();
    for kpi in kpis {
        let mut path = vec![kpi.uri.clone()];
        dfs(
            graph,
            &by_uri,
            &kpi.uri,
            &mut path,
            1,
            config.max_depth,
            &mut chains,
        );
    }
    chains
}

fn dfs(
    graph: &KpiGraph,
    by_uri: &HashMap<&KpiUri, &Kpi>,
    current: &KpiUri,
    path: &mut Vec<KpiUri>,
    depth: usize,
    max_depth: usize,
    chains: &mut Vec<CausalChain>,
) {
    if depth > max_depth {
        return;
    }

    for (target, _) in graph.edges_from(current) {
        path.push(target.clone());
        chains.push(build_chain(graph, by_uri, path));
        dfs(graph, by_uri, &target, path, depth + 1, max_depth, chains);
        path.pop();
    }
}

/// Assemble a chain record for the current path prefix.
///
/// Relationship kinds for each hop resolve to the first matching edge
/// between the pair, regardless of which parallel edge the traversal took.
fn build_chain(
    graph: &KpiGraph,
    by_uri: &HashMap<&KpiUri, &Kpi>,
    path: &[KpiUri],
) -> CausalChain {
    let relationships = path
        .windows(2)
        .filter_map(|pair| graph.first_kind(&pair[0], &pair[1]))
        .collect();

    // Cumulative impact: each hop with both endpoints in the snapshot
    // multiplies in its attenuated ratio divergence. Hops with a missing
    // endpoint contribute nothing.
    let mut impact = 1.0;
    for pair in path.windows(2) {
        if let (Some(source), Some(target)) = (by_uri.get(&pair[0]), by_uri.get(&pair[1])) {
            impact *= (target.raw_ratio() - source.raw_ratio()).abs() * HOP_ATTENUATION;
        }
    }

    CausalChain {
        nodes: path.to_vec(),
        relationships,
        impact,
        length: path.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Observation, RelationKind, Relationship, Status};

    fn kpi(uri: &str, value: f64, target: f64) -> Kpi {
        Kpi {
            uri: uri.into(),
            label: uri.to_uppercase(),
            domain: "domain".into(),
            goal: "goal".into(),
            target,
            unit: "units".into(),
            observation: Observation {
                value,
                status: Status::Good,
                timestamp: 0,
            },
        }
    }

    fn influences(source: &str, target: &str) -> Relationship {
        Relationship::new(source, target, RelationKind::Influences)
    }

    #[test]
    fn every_prefix_is_recorded() {
        let kpis = vec![
            kpi("a", 100.0, 100.0),
            kpi("b", 100.0, 100.0),
            kpi("c", 100.0, 100.0),
        ];
        let graph =
            KpiGraph::from_relationships(&[influences("a", "b"), influences("b", "c")]);

        let chains = explore_chains(&kpis, &graph, &ChainConfig::default());

        // From a: [a,b], [a,b,c]. From b: [b,c]. From c: nothing.
        assert_eq!(chains.len(), 3);
        let lengths: Vec<usize> = chains.iter().map(|c| c.length).collect();
        assert!(lengths.contains(&2));
        assert!(lengths.contains(&3));
    }

    #[test]
    fn depth_bound_limits_chain_length() {
        let kpis: Vec<Kpi> = ["a", "b", "c", "d", "e", "f"]
            .iter()
            .map(|uri| kpi(uri, 100.0, 100.0))
            .collect();
        let graph = KpiGraph::from_relationships(&[
            influences("a", "b"),
            influences("b", "c"),
            influences("c", "d"),
            influences("d", "e"),
            influences("e", "f"),
        ]);

        let chains = explore_chains(&kpis, &graph, &ChainConfig::default());
        assert!(chains.iter().all(|c| c.length <= 4));
        assert!(chains.iter().all(|c| c.length >= 2));
        assert!(chains.iter().all(|c| c.relationships.len() == c.length - 1));
    }

    #[test]
    fn cycles_are_not_suppressed_within_the_bound() {
        let kpis = vec![kpi("a", 100.0, 100.0), kpi("b", 100.0, 100.0)];
        let graph =
            KpiGraph::from_relationships(&[influences("a", "b"), influences("b", "a")]);

        let chains = explore_chains(&kpis, &graph, &ChainConfig::default());
        // From a: [a,b], [a,b,a], [a,b,a,b]; symmetric from b.
        let from_a: Vec<&CausalChain> = chains
            .iter()
            .filter(|c| c.nodes[0] == KpiUri::from("a"))
            .collect();
        assert_eq!(from_a.len(), 3);
        assert!(from_a.iter().any(|c| c.length == 4));
    }

    #[test]
    fn impact_accumulates_ratio_divergence() {
        // a at 140% of target, b exactly on target: one hop with
        // divergence |1.0 - 1.4| * 0.5 = 0.2.
        let kpis = vec![kpi("a", 42.0, 30.0), kpi("b", 85.0, 85.0)];
        let graph = KpiGraph::from_relationships(&[influences("a", "b")]);

        let chains = explore_chains(&kpis, &graph, &ChainConfig::default());
        assert_eq!(chains.len(), 1);
        assert!((chains[0].impact - 0.2).abs() < 1e-9);
    }

    #[test]
    fn missing_endpoint_contributes_nothing() {
        // "ghost" appears in the relationship graph but not the snapshot;
        // its hop is skipped and the score keeps its initial value.
        let kpis = vec![kpi("a", 42.0, 30.0)];
        let graph = KpiGraph::from_relationships(&[influences("a", "ghost")]);

        let chains = explore_chains(&kpis, &graph, &ChainConfig::default());
        assert_eq!(chains.len(), 1);
        assert!((chains[0].impact - 1.0).abs() < 1e-9);
    }
}
