//! # kardia
//!
//! A causal reasoning engine for KPI networks: correlation analysis,
//! causal chain exploration, what-if simulation, and ranked insights.
//!
//! ## Architecture
//!
//! - **Data model** (`model`): KPIs, observations, status bands, relationships
//! - **Store** (`store`): `KpiStore` trait with a DashMap-backed in-memory implementation
//! - **Graph** (`graph`): petgraph-backed directed relationship graph
//! - **Analytics** (`analytics`): correlation matrix and causal chain exploration
//! - **Simulation** (`simulate`): first-order impact and multi-hop propagation
//! - **Insights** (`insight`): fixed-order rule passes producing ranked findings
//! - **Engine** (`engine`): facade tying a store to all reasoning layers
//!
//! ## Library usage
//!
//! ```no_run
//! use kardia::engine::{Engine, EngineConfig};
//! use kardia::fixtures;
//! use kardia::store::MemoryStore;
//!
//! let store = MemoryStore::from_dataset(fixtures::demo_dataset(42)).unwrap();
//! let engine = Engine::new(store, EngineConfig::default()).unwrap();
//! let report = engine.run_reasoning().unwrap();
//! for insight in &report.insights {
//!     println!("[{}] {}", insight.severity.rank(), insight.title);
//! }
//! ```

pub mod analytics;
pub mod engine;
pub mod error;
pub mod fixtures;
pub mod graph;
pub mod insight;
pub mod model;
pub mod simulate;
pub mod store;
