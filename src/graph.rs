//! Directed KPI relationship graph.
//!
//! Uses `petgraph` for the graph structure with a uri index for O(1) node
//! lookups. Built once from a relationship snapshot; queries never mutate it.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::model::{KpiUri, RelationKind, Relationship};

/// Edge payload: the relationship kind plus its optional strength.
#[derive(Debug, Clone)]
pub struct EdgeData {
    pub kind: RelationKind,
    pub strength: Option<f64>,
}

/// Directed relationship graph over a KPI snapshot.
///
/// Parallel edges between the same pair are kept, matching the relationship
/// records they come from. All adjacency queries return edges in insertion
/// order, so traversal order is decided by the snapshot, not the backing
/// graph structure.
pub struct KpiGraph {
    graph: DiGraph<KpiUri, EdgeData>,
    node_index: HashMap<KpiUri, NodeIndex>,
}

impl KpiGraph {
    /// Build a graph from a relationship snapshot.
    pub fn from_relationships(relationships: &[Relationship]) -> Self {
        let mut graph = DiGraph::new();
        let mut node_index: HashMap<KpiUri, NodeIndex> = HashMap::new();

        for rel in relationships {
            let source = Self::ensure_node(&mut graph, &mut node_index, &rel.source);
            let target = Self::ensure_node(&mut graph, &mut node_index, &rel.target);
            graph.add_edge(
                source,
                target,
                EdgeData {
                    kind: rel.kind.clone(),
                    strength: rel.strength,
                },
            );
        }

        Self { graph, node_index }
    }

    fn ensure_node(
        graph: &mut DiGraph<KpiUri, EdgeData>,
        node_index: &mut HashMap<KpiUri, NodeIndex>,
        uri: &KpiUri,
    ) -> NodeIndex {
        if let Some(&idx) = node_index.get(uri) {
            return idx;
        }
        let idx = graph.add_node(uri.clone());
        node_index.insert(uri.clone(), idx);
        idx
    }

    /// Outgoing edges from `uri` in insertion order, one entry per
    /// relationship record. Unknown uris yield an empty list.
    pub fn edges_from(&self, uri: &KpiUri) -> Vec<(KpiUri, EdgeData)> {
        let Some(&idx) = self.node_index.get(uri) else {
            return vec![];
        };

        // petgraph yields outgoing edges newest-first; traversal wants
        // insertion order.
        let mut edges: Vec<(KpiUri, EdgeData)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (self.graph[e.target()].clone(), e.weight().clone()))
            .collect();
        edges.reverse();
        edges
    }

    /// Targets of outgoing `influences` edges, in insertion order.
    ///
    /// Duplicate targets are kept when parallel edges exist.
    pub fn influence_targets(&self, uri: &KpiUri) -> Vec<KpiUri> {
        self.edges_from(uri)
            .into_iter()
            .filter(|(_, edge)| edge.kind == RelationKind::Influences)
            .map(|(target, _)| target)
            .collect()
    }

    /// Kind of the first edge between `source` and `target` in insertion
    /// order, if any. Multi-edge pairs resolve to their first record.
    pub fn first_kind(&self, source: &KpiUri, target: &KpiUri) -> Option<RelationKind> {
        self.edges_from(source)
            .into_iter()
            .find(|(t, _)| t == target)
            .map(|(_, edge)| edge.kind)
    }

    /// Check if a node exists.
    pub fn has_node(&self, uri: &KpiUri) -> bool {
        self.node_index.contains_key(uri)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

impl std::fmt::Debug for KpiGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KpiGraph")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(source: &str, target: &str, kind: RelationKind) -> Relationship {
        Relationship::new(source, target, kind)
    }

    #[test]
    fn edges_preserve_insertion_order() {
        let graph = KpiGraph::from_relationships(&[
            rel("a", "b", RelationKind::Influences),
            rel("a", "c", RelationKind::DependsOn),
            rel("a", "d", RelationKind::Influences),
        ]);

        let targets: Vec<String> = graph
            .edges_from(&"a".into())
            .into_iter()
            .map(|(t, _)| t.to_string())
            .collect();
        assert_eq!(targets, vec!["b", "c", "d"]);
    }

    #[test]
    fn parallel_edges_are_kept() {
        let graph = KpiGraph::from_relationships(&[
            rel("a", "b", RelationKind::Influences),
            rel("a", "b", RelationKind::DependsOn),
        ]);

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges_from(&"a".into()).len(), 2);
        // First record wins for kind resolution.
        assert_eq!(
            graph.first_kind(&"a".into(), &"b".into()),
            Some(RelationKind::Influences)
        );
    }

    #[test]
    fn influence_targets_filter_by_kind() {
        let graph = KpiGraph::from_relationships(&[
            rel("a", "b", RelationKind::Influences),
            rel("a", "c", RelationKind::DependsOn),
            rel("a", "d", RelationKind::Other("correlatesWith".into())),
        ]);

        let targets: Vec<String> = graph
            .influence_targets(&"a".into())
            .into_iter()
            .map(|t| t.to_string())
            .collect();
        assert_eq!(targets, vec!["b"]);
    }

    #[test]
    fn unknown_node_queries_are_empty() {
        let graph = KpiGraph::from_relationships(&[rel("a", "b", RelationKind::Influences)]);
        assert!(graph.edges_from(&"zzz".into()).is_empty());
        assert!(graph.influence_targets(&"zzz".into()).is_empty());
        assert!(!graph.has_node(&"zzz".into()));
    }
}
