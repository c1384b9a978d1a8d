//! Engine facade: top-level API for the kardia system.
//!
//! The `Engine` ties a [`KpiStore`] to the analytics, simulation, and
//! insight layers and provides the public interface the CLI talks to.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::analytics::{ChainConfig, CorrelationMatrix, correlation_matrix, explore_chains};
use crate::error::{EngineError, KardiaResult, SimError};
use crate::graph::KpiGraph;
use crate::insight::{Insight, InsightConfig, generate_insights, sort_by_severity};
use crate::model::{CausalChain, KpiUri, RelationKind, Status, epoch_seconds};
use crate::simulate::{PropagationConfig, SimulationResult, simulate_scenario};
use crate::store::KpiStore;

/// Configuration for the kardia engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Traversal depth bound shared by chain exploration and propagation.
    pub max_depth: usize,
    /// Minimum chain impact for the critical-chain insight rule.
    pub chain_impact_threshold: f64,
    /// Damping for `influences` edges during propagation.
    pub influences_damping: f64,
    /// Damping for `dependsOn` edges during propagation.
    pub depends_on_damping: f64,
    /// Damping for every other edge kind during propagation.
    pub default_damping: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            chain_impact_threshold: 0.3,
            influences_damping: 0.3,
            depends_on_damping: 0.5,
            default_damping: 0.1,
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<(), EngineError> {
        if self.max_depth == 0 {
            return Err(EngineError::InvalidConfig {
                message: "max_depth must be > 0".into(),
            });
        }
        for (name, value) in [
            ("influences_damping", self.influences_damping),
            ("depends_on_damping", self.depends_on_damping),
            ("default_damping", self.default_damping),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::InvalidConfig {
                    message: format!("{name} must be within 0..=1, got {value}"),
                });
            }
        }
        if !self.chain_impact_threshold.is_finite() || self.chain_impact_threshold < 0.0 {
            return Err(EngineError::InvalidConfig {
                message: format!(
                    "chain_impact_threshold must be a non-negative number, got {}",
                    self.chain_impact_threshold
                ),
            });
        }
        Ok(())
    }

    fn propagation(&self) -> PropagationConfig {
        PropagationConfig {
            max_depth: self.max_depth,
            influences_damping: self.influences_damping,
            depends_on_damping: self.depends_on_damping,
            default_damping: self.default_damping,
        }
    }
}

/// Full output of a reasoning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningReport {
    pub correlations: CorrelationMatrix,
    pub causal_chains: Vec<CausalChain>,
    pub insights: Vec<Insight>,
    /// Epoch seconds at which the report was produced.
    pub generated_at: u64,
}

/// A KPI node as exported for visualization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: KpiUri,
    pub label: String,
    pub domain: String,
    pub goal: String,
    pub value: f64,
    pub target: f64,
    pub status: Status,
    pub unit: String,
}

/// A relationship edge as exported for visualization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub source: KpiUri,
    pub target: KpiUri,
    #[serde(rename = "type")]
    pub kind: RelationKind,
}

/// Node/edge export of the full KPI network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkGraph {
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
}

/// Last-computed analytics, kept purely as an advisory cache. Every
/// operation recomputes what it needs from a fresh snapshot; only the
/// standalone insight pass reuses cached chains.
struct Computed {
    chains: Vec<CausalChain>,
}

/// The kardia causal KPI reasoning engine.
///
/// Owns the store and the engine configuration. All operations take an
/// immutable snapshot of the store and return fresh results.
pub struct Engine<S: KpiStore> {
    config: EngineConfig,
    store: S,
    computed: Mutex<Option<Computed>>,
}

impl<S: KpiStore> Engine<S> {
    /// Create a new engine over the given store.
    pub fn new(store: S, config: EngineConfig) -> KardiaResult<Self> {
        config.validate()?;
        info!(
            max_depth = config.max_depth,
            chain_impact_threshold = config.chain_impact_threshold,
            "initializing kardia engine"
        );
        Ok(Self {
            config,
            store,
            computed: Mutex::new(None),
        })
    }

    /// Run the full reasoning pipeline: correlations, causal chains, and
    /// ranked insights over the current snapshot.
    pub fn run_reasoning(&self) -> KardiaResult<ReasoningReport> {
        let kpis = self.store.get_all_kpis()?;
        let relationships = self.store.get_kpi_relationships()?;
        let graph = KpiGraph::from_relationships(&relationships);

        let correlations = correlation_matrix(&kpis, &relationships);
        let causal_chains = explore_chains(
            &kpis,
            &graph,
            &ChainConfig {
                max_depth: self.config.max_depth,
            },
        );

        let mut insights = generate_insights(
            &kpis,
            &relationships,
            &graph,
            &causal_chains,
            &self.insight_config(),
        );
        sort_by_severity(&mut insights);

        debug!(
            kpis = kpis.len(),
            chains = causal_chains.len(),
            insights = insights.len(),
            "reasoning complete"
        );

        *self.computed.lock().unwrap() = Some(Computed {
            chains: causal_chains.clone(),
        });

        Ok(ReasoningReport {
            correlations,
            causal_chains,
            insights,
            generated_at: epoch_seconds(),
        })
    }

    /// Simulate a set of KPI value changes.
    ///
    /// Rejects an empty change map and non-finite values before touching
    /// the store.
    pub fn simulate(&self, changes: &BTreeMap<KpiUri, f64>) -> KardiaResult<SimulationResult> {
        if changes.is_empty() {
            return Err(SimError::InvalidRequest {
                message: "no changes requested".into(),
            }
            .into());
        }
        for (uri, &value) in changes {
            if !value.is_finite() {
                return Err(SimError::InvalidRequest {
                    message: format!("non-finite value {value} for {uri}"),
                }
                .into());
            }
        }

        let kpis = self.store.get_all_kpis().map_err(SimError::from)?;
        let relationships = self.store.get_kpi_relationships().map_err(SimError::from)?;
        let graph = KpiGraph::from_relationships(&relationships);

        let result = simulate_scenario(changes, &kpis, &graph, &self.config.propagation())?;
        debug!(
            changes = changes.len(),
            outcomes = result.predicted_outcomes.len(),
            score = result.overall_impact_score,
            "simulation complete"
        );
        Ok(result)
    }

    /// Generate ranked insights from the current snapshot.
    ///
    /// The critical-chain rule reuses the chains from the last
    /// [`run_reasoning`](Self::run_reasoning) call; with no prior run it
    /// sees no chains.
    pub fn insights(&self) -> KardiaResult<Vec<Insight>> {
        let kpis = self.store.get_all_kpis()?;
        let relationships = self.store.get_kpi_relationships()?;
        let graph = KpiGraph::from_relationships(&relationships);

        let cached_chains = {
            let computed = self.computed.lock().unwrap();
            computed
                .as_ref()
                .map(|c| c.chains.clone())
                .unwrap_or_default()
        };

        let mut insights = generate_insights(
            &kpis,
            &relationships,
            &graph,
            &cached_chains,
            &self.insight_config(),
        );
        sort_by_severity(&mut insights);
        Ok(insights)
    }

    /// Export the KPI network as nodes and edges for visualization.
    pub fn network(&self) -> KardiaResult<NetworkGraph> {
        let kpis = self.store.get_all_kpis()?;
        let relationships = self.store.get_kpi_relationships()?;

        let nodes = kpis
            .into_iter()
            .map(|kpi| NetworkNode {
                id: kpi.uri,
                label: kpi.label,
                domain: kpi.domain,
                goal: kpi.goal,
                value: kpi.observation.value,
                target: kpi.target,
                status: kpi.observation.status,
                unit: kpi.unit,
            })
            .collect();
        let edges = relationships
            .into_iter()
            .map(|r| NetworkEdge {
                source: r.source,
                target: r.target,
                kind: r.kind,
            })
            .collect();

        Ok(NetworkGraph { nodes, edges })
    }

    /// Record a new observation for `uri`. Returns `false` when the uri is
    /// unknown. Drops the cached analytics, which a new value invalidates.
    pub fn update_kpi_value(&self, uri: &KpiUri, new_value: f64) -> KardiaResult<bool> {
        let updated = self.store.update_kpi_value(uri, new_value)?;
        if updated {
            *self.computed.lock().unwrap() = None;
        }
        Ok(updated)
    }

    /// Get the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Get the underlying store handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get summary information about the engine state.
    pub fn info(&self) -> KardiaResult<EngineInfo> {
        let kpis = self.store.get_all_kpis()?;
        let relationships = self.store.get_kpi_relationships()?;
        Ok(EngineInfo {
            kpi_count: kpis.len(),
            relationship_count: relationships.len(),
            max_depth: self.config.max_depth,
            has_cached_analytics: self.computed.lock().unwrap().is_some(),
        })
    }

    fn insight_config(&self) -> InsightConfig {
        InsightConfig {
            chain_impact_threshold: self.config.chain_impact_threshold,
            ..Default::default()
        }
    }
}

/// Summary information about the engine state.
#[derive(Debug, Clone)]
pub struct EngineInfo {
    pub kpi_count: usize,
    pub relationship_count: usize,
    pub max_depth: usize,
    pub has_cached_analytics: bool,
}

impl std::fmt::Display for EngineInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "kardia engine info")?;
        writeln!(f, "  kpis:           {}", self.kpi_count)?;
        writeln!(f, "  relationships:  {}", self.relationship_count)?;
        writeln!(f, "  max depth:      {}", self.max_depth)?;
        writeln!(f, "  cached:         {}", self.has_cached_analytics)?;
        Ok(())
    }
}

impl<S: KpiStore> std::fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine").field("config", &self.config).finish()
    }
}
