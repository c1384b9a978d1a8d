//! Ranked, human-readable findings derived from graph state.

pub mod rules;

pub use rules::{InsightConfig, generate_insights};

use serde::{Deserialize, Serialize};

use crate::model::RelationKind;

/// What produced an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Critical,
    Warning,
    Causal,
    Prediction,
    Optimization,
    CausalChain,
}

/// Insight ranking. Callers sort descending by [`Severity::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Numeric rank for sorting: high 3, medium 2, low 1.
    pub fn rank(&self) -> u8 {
        match self {
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }

    /// The wire form, for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

/// A single ranked finding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    /// Labels of the KPIs this finding concerns, where applicable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected: Vec<String>,
    /// The edge kind behind a causal finding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<RelationKind>,
    /// Chain score behind a causal-chain finding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_score: Option<f64>,
    pub recommendation: String,
}

/// Sort insights by severity, highest first. Stable, so rule order decides
/// ties within a severity.
pub fn sort_by_severity(insights: &mut [Insight]) {
    insights.sort_by(|a, b| b.severity.rank().cmp(&a.severity.rank()));
}
