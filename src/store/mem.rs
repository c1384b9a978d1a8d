//! In-memory KPI store backed by DashMap.
//!
//! Holds the full snapshot in process memory. Each KPI entry carries its
//! latest observation plus the history of superseded ones. All data is lost
//! on process exit; the CLI reloads from the dataset file at startup.

use std::fs;
use std::path::Path;
use std::sync::RwLock;

use dashmap::DashMap;
use tracing::{debug, info};

use crate::error::{SimError, StoreError};
use crate::graph::KpiGraph;
use crate::model::{Kpi, KpiUri, Observation, Relationship};
use crate::simulate::{ImpactAnalysis, impact};

use super::{Dataset, KpiStore, StoreResult};

#[derive(Debug)]
struct KpiEntry {
    kpi: Kpi,
    /// Superseded observations, oldest first.
    history: Vec<Observation>,
}

/// Concurrent in-memory store keyed by KPI uri.
#[derive(Debug)]
pub struct MemoryStore {
    kpis: DashMap<KpiUri, KpiEntry>,
    relationships: RwLock<Vec<Relationship>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            kpis: DashMap::new(),
            relationships: RwLock::new(Vec::new()),
        }
    }

    /// Build a store from an already-parsed dataset, validating every KPI.
    pub fn from_dataset(dataset: Dataset) -> StoreResult<Self> {
        let store = Self::new();
        for kpi in dataset.kpis {
            store.insert_kpi(kpi)?;
        }
        for relationship in dataset.relationships {
            store.insert_relationship(relationship);
        }
        info!(
            kpis = store.kpi_count(),
            relationships = store.relationship_count(),
            "dataset loaded"
        );
        Ok(store)
    }

    /// Load a JSON dataset file. Any read or parse failure is fatal.
    pub fn load(path: &Path) -> StoreResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| StoreError::DatasetIo {
            path: path.display().to_string(),
            source,
        })?;
        let dataset: Dataset =
            serde_json::from_str(&raw).map_err(|err| StoreError::DatasetParse {
                message: err.to_string(),
            })?;
        Self::from_dataset(dataset)
    }

    /// Insert or replace a KPI. Rejects non-positive targets, which would
    /// make every ratio meaningless.
    pub fn insert_kpi(&self, kpi: Kpi) -> StoreResult<()> {
        if kpi.target <= 0.0 {
            return Err(StoreError::InvalidTarget {
                uri: kpi.uri.to_string(),
                target: kpi.target,
            });
        }
        self.kpis.insert(
            kpi.uri.clone(),
            KpiEntry {
                kpi,
                history: Vec::new(),
            },
        );
        Ok(())
    }

    /// Append a relationship edge. Duplicates are kept; parallel edges are
    /// meaningful to chain exploration.
    pub fn insert_relationship(&self, relationship: Relationship) {
        self.relationships.write().unwrap().push(relationship);
    }

    /// Number of KPIs.
    pub fn kpi_count(&self) -> usize {
        self.kpis.len()
    }

    /// Number of relationship edges.
    pub fn relationship_count(&self) -> usize {
        self.relationships.read().unwrap().len()
    }

    /// Superseded observations for `uri`, oldest first. `None` for an
    /// unknown uri.
    pub fn observation_history(&self, uri: &KpiUri) -> Option<Vec<Observation>> {
        self.kpis.get(uri).map(|entry| entry.history.clone())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KpiStore for MemoryStore {
    fn get_all_kpis(&self) -> StoreResult<Vec<Kpi>> {
        let mut kpis: Vec<Kpi> = self.kpis.iter().map(|entry| entry.kpi.clone()).collect();
        // DashMap iteration order is arbitrary; callers get uri order.
        kpis.sort_by(|a, b| a.uri.cmp(&b.uri));
        Ok(kpis)
    }

    fn get_kpi_relationships(&self) -> StoreResult<Vec<Relationship>> {
        Ok(self.relationships.read().unwrap().clone())
    }

    fn calculate_kpi_impact(
        &self,
        uri: &KpiUri,
        new_value: f64,
    ) -> Result<ImpactAnalysis, SimError> {
        let kpis = self.get_all_kpis()?;
        let graph = KpiGraph::from_relationships(&self.get_kpi_relationships()?);
        impact::direct_impact(uri, new_value, &kpis, &graph)
    }

    fn update_kpi_value(&self, uri: &KpiUri, new_value: f64) -> StoreResult<bool> {
        let Some(mut entry) = self.kpis.get_mut(uri) else {
            debug!(%uri, "update for unknown kpi ignored");
            return Ok(false);
        };
        let target = entry.kpi.target;
        let superseded = std::mem::replace(
            &mut entry.kpi.observation,
            Observation::record(new_value, target),
        );
        entry.history.push(superseded);
        debug!(
            %uri,
            value = new_value,
            status = entry.kpi.observation.status.as_str(),
            "observation recorded"
        );
        Ok(true)
    }
}
