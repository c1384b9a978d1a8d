//! Derived analytics over a KPI snapshot: correlations and causal chains.
//!
//! Everything here is pure and total given a valid snapshot; results are
//! disposable and recomputed per request.

pub mod chains;
pub mod correlation;

pub use chains::{ChainConfig, explore_chains};
pub use correlation::{CorrelationMatrix, correlation_matrix};
