//! First-order impact of a single KPI change on its directly influenced KPIs.

use std::collections::HashMap;

use crate::error::SimError;
use crate::graph::KpiGraph;
use crate::model::{Kpi, KpiUri};

use super::{ImpactAnalysis, InfluencedKpi, KpiSummary};

/// Fixed damping applied to the raw delta for directly influenced KPIs.
/// Relationship strength is not consulted at this stage.
const DIRECT_DAMPING: f64 = 0.1;

/// Round to two decimals, the precision of all reported impact figures.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute the first-order impact of setting `uri` to `new_value`.
///
/// Only targets of outgoing `influences` edges are considered; `dependsOn`
/// edges play no part at this stage. Fails with [`SimError::KpiNotFound`] if
/// the uri is absent from the snapshot and with [`SimError::InvalidKpiState`]
/// if the current value is zero, which leaves the change percent undefined.
pub fn direct_impact(
    uri: &KpiUri,
    new_value: f64,
    kpis: &[Kpi],
    graph: &KpiGraph,
) -> Result<ImpactAnalysis, SimError> {
    let by_uri: HashMap<&KpiUri, &Kpi> = kpis.iter().map(|k| (&k.uri, k)).collect();

    let kpi = by_uri.get(uri).ok_or_else(|| SimError::KpiNotFound {
        uri: uri.to_string(),
    })?;
    let current = kpi.observation.value;
    if current == 0.0 {
        return Err(SimError::InvalidKpiState {
            uri: uri.to_string(),
            value: current,
        });
    }

    let change_percent = round2((new_value - current) / current * 100.0);
    let delta = new_value - current;

    let mut influenced = Vec::new();
    for target in graph.influence_targets(uri) {
        let Some(target_kpi) = by_uri.get(&target) else {
            continue;
        };
        let projected_change = delta * DIRECT_DAMPING;
        influenced.push(InfluencedKpi {
            uri: target,
            label: target_kpi.label.clone(),
            current_value: target_kpi.observation.value,
            projected_change: round2(projected_change),
            projected_value: round2(target_kpi.observation.value + projected_change),
        });
    }

    Ok(ImpactAnalysis {
        kpi: KpiSummary {
            label: kpi.label.clone(),
            target: kpi.target,
            unit: kpi.unit.clone(),
            current_value: current,
        },
        new_value,
        change_percent,
        influenced,
    })
}
