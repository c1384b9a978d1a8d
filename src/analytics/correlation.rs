//! Pairwise correlation strengths derived from relationship types and shared
//! domain membership.

use std::collections::HashMap;

use crate::model::{Kpi, KpiUri, RelationKind, Relationship};

/// Symmetric uri -> uri -> strength mapping.
pub type CorrelationMatrix = HashMap<KpiUri, HashMap<KpiUri, f64>>;

/// Strength constant for an explicit relationship.
fn relation_strength(kind: &RelationKind) -> f64 {
    match kind {
        RelationKind::Influences => 0.7,
        RelationKind::DependsOn => 0.8,
        RelationKind::Other(_) => 0.5,
    }
}

/// Moderate affinity for KPI pairs sharing a domain.
const DOMAIN_AFFINITY: f64 = 0.4;

/// Build the correlation matrix for a snapshot.
///
/// Two passes in a fixed order: relationship strengths first, then domain
/// affinity. The domain pass overwrites any pair the relationship pass also
/// covered; the write order is part of the contract. Every write is
/// symmetric. Empty input yields an empty matrix.
pub fn correlation_matrix(kpis: &[Kpi], relationships: &[Relationship]) -> CorrelationMatrix {
    let mut matrix = CorrelationMatrix::new();

    for rel in relationships {
        set_symmetric(
            &mut matrix,
            &rel.source,
            &rel.target,
            relation_strength(&rel.kind),
        );
    }

    for (i, a) in kpis.iter().enumerate() {
        for b in &kpis[i + 1..] {
            if a.uri != b.uri && a.domain == b.domain {
                set_symmetric(&mut matrix, &a.uri, &b.uri, DOMAIN_AFFINITY);
            }
        }
    }

    matrix
}

fn set_symmetric(matrix: &mut CorrelationMatrix, a: &KpiUri, b: &KpiUri, strength: f64) {
    matrix.entry(a.clone()).or_default().insert(b.clone(), strength);
    matrix.entry(b.clone()).or_default().insert(a.clone(), strength);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Observation, Status};

    fn kpi(uri: &str, domain: &str) -> Kpi {
        Kpi {
            uri: uri.into(),
            label: uri.to_uppercase(),
            domain: domain.into(),
            goal: "goal".into(),
            target: 100.0,
            unit: "units".into(),
            observation: Observation {
                value: 90.0,
                status: Status::Good,
                timestamp: 0,
            },
        }
    }

    #[test]
    fn relationship_strengths_by_kind() {
        let kpis = vec![kpi("a", "d1"), kpi("b", "d2"), kpi("c", "d3")];
        let rels = vec![
            Relationship::new("a", "b", RelationKind::Influences),
            Relationship::new("b", "c", RelationKind::DependsOn),
            Relationship::new("a", "c", RelationKind::Other("correlatesWith".into())),
        ];

        let matrix = correlation_matrix(&kpis, &rels);
        assert_eq!(matrix[&KpiUri::from("a")][&KpiUri::from("b")], 0.7);
        assert_eq!(matrix[&KpiUri::from("b")][&KpiUri::from("c")], 0.8);
        assert_eq!(matrix[&KpiUri::from("a")][&KpiUri::from("c")], 0.5);
    }

    #[test]
    fn every_entry_is_symmetric() {
        let kpis = vec![kpi("a", "d1"), kpi("b", "d1"), kpi("c", "d2")];
        let rels = vec![
            Relationship::new("a", "c", RelationKind::Influences),
            Relationship::new("c", "b", RelationKind::DependsOn),
        ];

        let matrix = correlation_matrix(&kpis, &rels);
        for (from, row) in &matrix {
            for (to, strength) in row {
                assert_eq!(matrix[to][from], *strength, "{from} -> {to} not symmetric");
            }
        }
    }

    #[test]
    fn domain_pass_overwrites_relationship_strength() {
        // a and b share a domain and have an explicit influences edge; the
        // domain pass runs second and wins.
        let kpis = vec![kpi("a", "shared"), kpi("b", "shared")];
        let rels = vec![Relationship::new("a", "b", RelationKind::Influences)];

        let matrix = correlation_matrix(&kpis, &rels);
        assert_eq!(matrix[&KpiUri::from("a")][&KpiUri::from("b")], 0.4);
        assert_eq!(matrix[&KpiUri::from("b")][&KpiUri::from("a")], 0.4);
    }

    #[test]
    fn empty_snapshot_yields_empty_matrix() {
        let matrix = correlation_matrix(&[], &[]);
        assert!(matrix.is_empty());
    }
}
