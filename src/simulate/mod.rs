//! What-if simulation: first-order impact analysis and multi-hop propagation.

pub mod impact;
pub mod propagate;

pub use impact::direct_impact;
pub use propagate::{PropagationConfig, simulate_scenario};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{KpiUri, RelationKind};

/// Metadata summary of the changed KPI, as carried inside an
/// [`ImpactAnalysis`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KpiSummary {
    pub label: String,
    pub target: f64,
    pub unit: String,
    pub current_value: f64,
}

/// A directly influenced KPI with its projected value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfluencedKpi {
    pub uri: KpiUri,
    pub label: String,
    pub current_value: f64,
    pub projected_change: f64,
    pub projected_value: f64,
}

/// First-order effect of changing one KPI's value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    pub kpi: KpiSummary,
    pub new_value: f64,
    pub change_percent: f64,
    #[serde(rename = "influenced_kpis")]
    pub influenced: Vec<InfluencedKpi>,
}

/// A single propagated effect, produced at some traversal depth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropagationOutcome {
    pub kpi_uri: KpiUri,
    pub kpi_label: String,
    pub original_value: f64,
    pub projected_value: f64,
    pub change_amount: f64,
    /// The upstream KPI whose change produced this outcome.
    pub influenced_by: KpiUri,
    #[serde(rename = "relationship_type")]
    pub relationship: RelationKind,
    pub depth: usize,
}

/// Full result of simulating a set of value changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// uri -> value snapshot before any change.
    pub original_values: BTreeMap<KpiUri, f64>,
    /// uri -> requested value, for the changed KPIs only.
    pub new_values: BTreeMap<KpiUri, f64>,
    /// uri -> direct impact analysis, for the changed KPIs only.
    pub impacts: BTreeMap<KpiUri, ImpactAnalysis>,
    /// Propagated effects in traversal order.
    pub predicted_outcomes: Vec<PropagationOutcome>,
    /// Mean absolute requested change across the snapshot. Propagated
    /// outcomes are deliberately excluded.
    pub overall_impact_score: f64,
}
