//! Rich diagnostic error types for the kardia engine.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes, help text, and source chains so users know exactly what
//! went wrong and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for the kardia engine.
///
/// Each variant wraps a subsystem-specific error, preserving the full diagnostic
/// chain (error codes, help text, source spans) through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum KardiaError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] EngineError),
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("failed to read dataset {path}: {source}")]
    #[diagnostic(
        code(kardia::store::dataset_io),
        help(
            "The dataset file could not be read. Check that the path exists \
             and has read permissions. Run `kardia init` to generate a demo \
             dataset."
        )
    )]
    DatasetIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse dataset: {message}")]
    #[diagnostic(
        code(kardia::store::dataset_parse),
        help(
            "The dataset is not valid JSON for the expected shape \
             (an object with `kpis` and `relationships` arrays). \
             Load failures are fatal at startup; fix the file and restart."
        )
    )]
    DatasetParse { message: String },

    #[error("invalid target {target} for KPI {uri}")]
    #[diagnostic(
        code(kardia::store::invalid_target),
        help(
            "KPI targets must be strictly positive; a zero or negative target \
             makes the performance ratio undefined. Fix the record before \
             loading it."
        )
    )]
    InvalidTarget { uri: String, target: f64 },

    #[error("KPI not found: {uri}")]
    #[diagnostic(
        code(kardia::store::not_found),
        help("The requested KPI uri does not exist in the store. Verify the uri is correct.")
    )]
    KpiNotFound { uri: String },
}

// ---------------------------------------------------------------------------
// Simulation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum SimError {
    #[error("KPI not found: {uri}")]
    #[diagnostic(
        code(kardia::sim::kpi_not_found),
        help(
            "The uri is absent from the KPI snapshot. Simulations only accept \
             uris the store knows about; check `kardia kpis` for the list."
        )
    )]
    KpiNotFound { uri: String },

    #[error("invalid state for KPI {uri}: current value is {value}")]
    #[diagnostic(
        code(kardia::sim::invalid_state),
        help(
            "The change percent is relative to the current value, which must \
             be nonzero. Record a real observation for this KPI first."
        )
    )]
    InvalidKpiState { uri: String, value: f64 },

    #[error("invalid simulation request: {message}")]
    #[diagnostic(
        code(kardia::sim::invalid_request),
        help(
            "The change set must be non-empty and every value must be a \
             finite number. Requests are rejected before any store access."
        )
    )]
    InvalidRequest { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

// ---------------------------------------------------------------------------
// Engine errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(kardia::engine::invalid_config),
        help("Check the EngineConfig fields. {message}")
    )]
    InvalidConfig { message: String },
}

/// Convenience alias for functions returning kardia results.
pub type KardiaResult<T> = std::result::Result<T, KardiaError>;
