//! Fixed-order rule passes over a KPI snapshot.
//!
//! Each pass is independent and their results are concatenated; no pass
//! short-circuits another. Callers sort the combined list by severity.

use std::collections::HashSet;

use crate::graph::KpiGraph;
use crate::model::{CausalChain, Kpi, KpiUri, Relationship};

use super::{Insight, InsightKind, Severity};

/// Thresholds for the predictive and chain rules.
#[derive(Debug, Clone)]
pub struct InsightConfig {
    /// Performance ratio (percent) below which a KPI is a cascade risk.
    pub risk_ratio: f64,
    /// Performance ratio (percent) above which a KPI is overperforming.
    pub optimization_ratio: f64,
    /// Minimum chain impact for the critical-chain rule.
    pub chain_impact_threshold: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            risk_ratio: 70.0,
            optimization_ratio: 120.0,
            chain_impact_threshold: 0.3,
        }
    }
}

/// Run every rule pass in fixed order and concatenate the results.
///
/// Order: status rules, causal-status rule, predictive risk, predictive
/// optimization, critical chain.
pub fn generate_insights(
    kpis: &[Kpi],
    relationships: &[Relationship],
    graph: &KpiGraph,
    chains: &[CausalChain],
    config: &InsightConfig,
) -> Vec<Insight> {
    let mut insights = Vec::new();
    status_rules(kpis, &mut insights);
    causal_status_rule(kpis, relationships, &mut insights);
    risk_rule(kpis, graph, config, &mut insights);
    optimization_rule(kpis, config, &mut insights);
    critical_chain_rule(kpis, chains, config, &mut insights);
    insights
}

/// One insight listing all critical KPIs, one listing all warning KPIs.
fn status_rules(kpis: &[Kpi], insights: &mut Vec<Insight>) {
    let critical: Vec<&Kpi> = kpis
        .iter()
        .filter(|k| k.observation.status == crate::model::Status::Critical)
        .collect();
    let warning: Vec<&Kpi> = kpis
        .iter()
        .filter(|k| k.observation.status == crate::model::Status::Warning)
        .collect();

    if !critical.is_empty() {
        insights.push(Insight {
            kind: InsightKind::Critical,
            severity: Severity::High,
            title: "Critical Performance Issues".into(),
            message: format!("{} KPIs in critical state.", critical.len()),
            affected: critical.iter().map(|k| k.label.clone()).collect(),
            relationship: None,
            impact_score: None,
            recommendation: "Immediate corrective actions required.".into(),
        });
    }

    if !warning.is_empty() {
        insights.push(Insight {
            kind: InsightKind::Warning,
            severity: Severity::Medium,
            title: "Performance Warnings".into(),
            message: format!("{} KPIs below optimal threshold.", warning.len()),
            affected: warning.iter().map(|k| k.label.clone()).collect(),
            relationship: None,
            impact_score: None,
            recommendation: "Monitor these KPIs closely.".into(),
        });
    }
}

/// One insight per relationship whose endpoints are both degraded.
fn causal_status_rule(kpis: &[Kpi], relationships: &[Relationship], insights: &mut Vec<Insight>) {
    for rel in relationships {
        let source = kpis.iter().find(|k| k.uri == rel.source);
        let target = kpis.iter().find(|k| k.uri == rel.target);
        let (Some(source), Some(target)) = (source, target) else {
            continue;
        };
        if source.observation.status.is_degraded() && target.observation.status.is_degraded() {
            insights.push(Insight {
                kind: InsightKind::Causal,
                severity: Severity::Medium,
                title: "Causal Chain Detected".into(),
                message: format!("{} may be affecting {}", source.label, target.label),
                affected: vec![source.label.clone(), target.label.clone()],
                relationship: Some(rel.kind.clone()),
                impact_score: None,
                recommendation: format!(
                    "Address {} to improve {}.",
                    source.label, target.label
                ),
            });
        }
    }
}

/// Underperforming KPIs with downstream influence are cascade risks.
fn risk_rule(kpis: &[Kpi], graph: &KpiGraph, config: &InsightConfig, insights: &mut Vec<Insight>) {
    for kpi in kpis {
        let ratio = kpi.performance_ratio();
        if ratio >= config.risk_ratio {
            continue;
        }

        let targets: HashSet<KpiUri> = graph.influence_targets(&kpi.uri).into_iter().collect();
        let influenced: Vec<&Kpi> = kpis.iter().filter(|k| targets.contains(&k.uri)).collect();
        if influenced.is_empty() {
            continue;
        }

        insights.push(Insight {
            kind: InsightKind::Prediction,
            severity: Severity::High,
            title: format!("Risk Alert: {}", kpi.label),
            message: format!(
                "Poor performance in {} ({ratio:.1}% of target) may negatively impact {} related KPIs",
                kpi.label,
                influenced.len()
            ),
            affected: influenced.iter().map(|k| k.label.clone()).collect(),
            relationship: None,
            impact_score: None,
            recommendation: format!(
                "Immediate intervention required for {} to prevent cascade effects",
                kpi.label
            ),
        });
    }
}

/// Overperforming KPIs may be over-resourced.
fn optimization_rule(kpis: &[Kpi], config: &InsightConfig, insights: &mut Vec<Insight>) {
    for kpi in kpis {
        let ratio = kpi.performance_ratio();
        if ratio <= config.optimization_ratio {
            continue;
        }

        insights.push(Insight {
            kind: InsightKind::Optimization,
            severity: Severity::Medium,
            title: format!("Optimization Opportunity: {}", kpi.label),
            message: format!(
                "{} is performing {ratio:.1}% above target - consider resource reallocation",
                kpi.label
            ),
            affected: vec![],
            relationship: None,
            impact_score: None,
            recommendation: "Review resource allocation for potential optimization".into(),
        });
    }
}

/// Among chains above the impact threshold, describe the single worst one.
fn critical_chain_rule(
    kpis: &[Kpi],
    chains: &[CausalChain],
    config: &InsightConfig,
    insights: &mut Vec<Insight>,
) {
    let mut worst: Option<&CausalChain> = None;
    for chain in chains {
        if chain.impact <= config.chain_impact_threshold {
            continue;
        }
        // First maximum wins on ties.
        if worst.is_none_or(|w| chain.impact > w.impact) {
            worst = Some(chain);
        }
    }
    let Some(worst) = worst else {
        return;
    };

    let labels: Vec<String> = worst
        .nodes
        .iter()
        .filter_map(|uri| kpis.iter().find(|k| &k.uri == uri))
        .map(|k| k.label.clone())
        .collect();

    insights.push(Insight {
        kind: InsightKind::CausalChain,
        severity: Severity::High,
        title: "Critical Causal Chain Identified".into(),
        message: format!("High-impact causal chain detected: {}", labels.join(" -> ")),
        affected: labels,
        relationship: None,
        impact_score: Some(worst.impact),
        recommendation: "Focus intervention on the root cause of this causal chain".into(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Observation, RelationKind, Status};

    fn kpi(uri: &str, label: &str, value: f64, target: f64) -> Kpi {
        Kpi {
            uri: uri.into(),
            label: label.into(),
            domain: "domain".into(),
            goal: "goal".into(),
            target,
            unit: "units".into(),
            observation: Observation {
                value,
                status: Status::from_ratio(value / target * 100.0),
                timestamp: 0,
            },
        }
    }

    fn run(
        kpis: &[Kpi],
        relationships: &[Relationship],
        chains: &[CausalChain],
    ) -> Vec<Insight> {
        let graph = KpiGraph::from_relationships(relationships);
        generate_insights(kpis, relationships, &graph, chains, &InsightConfig::default())
    }

    #[test]
    fn status_rules_group_by_band() {
        let kpis = vec![
            kpi("a", "A", 50.0, 100.0),  // critical
            kpi("b", "B", 55.0, 100.0),  // critical
            kpi("c", "C", 70.0, 100.0),  // warning
            kpi("d", "D", 100.0, 100.0), // excellent
        ];

        let insights = run(&kpis, &[], &[]);
        let critical = insights
            .iter()
            .find(|i| i.kind == InsightKind::Critical)
            .unwrap();
        assert_eq!(critical.severity, Severity::High);
        assert_eq!(critical.affected, vec!["A", "B"]);
        assert!(critical.message.contains("2 KPIs"));

        let warning = insights
            .iter()
            .find(|i| i.kind == InsightKind::Warning)
            .unwrap();
        assert_eq!(warning.severity, Severity::Medium);
        assert_eq!(warning.affected, vec!["C"]);
    }

    #[test]
    fn no_status_insights_when_all_healthy() {
        let kpis = vec![kpi("a", "A", 100.0, 100.0)];
        let insights = run(&kpis, &[], &[]);
        assert!(insights.is_empty());
    }

    #[test]
    fn causal_rule_requires_both_endpoints_degraded() {
        let kpis = vec![
            kpi("a", "A", 50.0, 100.0),  // critical
            kpi("b", "B", 70.0, 100.0),  // warning
            kpi("c", "C", 100.0, 100.0), // excellent
        ];
        let rels = vec![
            Relationship::new("a", "b", RelationKind::Influences),
            Relationship::new("a", "c", RelationKind::Influences),
        ];

        let insights = run(&kpis, &rels, &[]);
        let causal: Vec<&Insight> = insights
            .iter()
            .filter(|i| i.kind == InsightKind::Causal)
            .collect();
        assert_eq!(causal.len(), 1);
        assert_eq!(causal[0].affected, vec!["A", "B"]);
        assert_eq!(causal[0].relationship, Some(RelationKind::Influences));
    }

    #[test]
    fn half_target_kpi_with_influence_yields_one_high_prediction() {
        let kpis = vec![kpi("a", "A", 50.0, 100.0), kpi("b", "B", 90.0, 100.0)];
        let rels = vec![Relationship::new("a", "b", RelationKind::Influences)];

        let insights = run(&kpis, &rels, &[]);
        let predictions: Vec<&Insight> = insights
            .iter()
            .filter(|i| i.kind == InsightKind::Prediction)
            .collect();
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].severity, Severity::High);
        assert_eq!(predictions[0].affected, vec!["B"]);
        assert!(predictions[0].message.contains("50.0%"));
    }

    #[test]
    fn risk_rule_needs_an_influenced_kpi() {
        // Underperforming but with no outgoing influences edge.
        let kpis = vec![kpi("a", "A", 50.0, 100.0), kpi("b", "B", 90.0, 100.0)];
        let rels = vec![Relationship::new("a", "b", RelationKind::DependsOn)];

        let insights = run(&kpis, &rels, &[]);
        assert!(insights.iter().all(|i| i.kind != InsightKind::Prediction));
    }

    #[test]
    fn optimization_rule_is_strictly_above_threshold() {
        let kpis = vec![
            kpi("a", "A", 120.0, 100.0), // exactly 120%, not flagged
            kpi("b", "B", 130.0, 100.0),
        ];

        let insights = run(&kpis, &[], &[]);
        let optimizations: Vec<&Insight> = insights
            .iter()
            .filter(|i| i.kind == InsightKind::Optimization)
            .collect();
        assert_eq!(optimizations.len(), 1);
        assert!(optimizations[0].title.contains('B'));
    }

    #[test]
    fn chain_rule_picks_the_single_worst_chain() {
        let kpis = vec![kpi("a", "A", 50.0, 100.0), kpi("b", "B", 90.0, 100.0)];
        let chain = |impact: f64| CausalChain {
            nodes: vec!["a".into(), "b".into()],
            relationships: vec![RelationKind::Influences],
            impact,
            length: 2,
        };
        let chains = vec![chain(0.4), chain(0.9), chain(0.5)];

        let insights = run(&kpis, &[], &chains);
        let chain_insights: Vec<&Insight> = insights
            .iter()
            .filter(|i| i.kind == InsightKind::CausalChain)
            .collect();
        assert_eq!(chain_insights.len(), 1);
        assert_eq!(chain_insights[0].impact_score, Some(0.9));
        assert!(chain_insights[0].message.contains("A -> B"));
    }

    #[test]
    fn chain_rule_silent_below_threshold() {
        let kpis = vec![kpi("a", "A", 100.0, 100.0)];
        let chains = vec![CausalChain {
            nodes: vec!["a".into(), "b".into()],
            relationships: vec![RelationKind::Influences],
            impact: 0.2,
            length: 2,
        }];

        let insights = run(&kpis, &[], &chains);
        assert!(insights.iter().all(|i| i.kind != InsightKind::CausalChain));
    }
}
