//! KPI storage behind the [`KpiStore`] trait.
//!
//! The engine only ever talks to a store through this trait, so alternative
//! backends can be dropped in without touching the reasoning layers.
//! [`MemoryStore`] is the in-process implementation used by the CLI.

pub mod mem;

pub use mem::MemoryStore;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, StoreError};
use crate::model::{Kpi, KpiUri, Relationship};
use crate::simulate::ImpactAnalysis;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A complete snapshot as serialized in a dataset file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub kpis: Vec<Kpi>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

/// Read access to KPIs and relationships plus the two write-ish operations
/// the engine needs.
pub trait KpiStore {
    /// Every KPI currently known, with its latest observation.
    fn get_all_kpis(&self) -> StoreResult<Vec<Kpi>>;

    /// Every relationship edge currently known.
    fn get_kpi_relationships(&self) -> StoreResult<Vec<Relationship>>;

    /// First-order impact of setting `uri` to `new_value`, computed against
    /// the current snapshot.
    fn calculate_kpi_impact(&self, uri: &KpiUri, new_value: f64)
    -> Result<ImpactAnalysis, SimError>;

    /// Record a new observation for `uri`. Returns `false` when the uri is
    /// unknown, which is not an error.
    fn update_kpi_value(&self, uri: &KpiUri, new_value: f64) -> StoreResult<bool>;
}
