//! Core data model: KPIs, observations, statuses, and causal relationships.
//!
//! The KPI store owns [`Kpi`] and [`Relationship`] records; everything else in
//! the crate operates on immutable snapshots of these types and returns fresh,
//! disposable results.

use std::borrow::Borrow;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Unique KPI identifier.
///
/// Uris are opaque strings; the engine never parses them, it only compares
/// them for equality and uses them as map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KpiUri(String);

impl KpiUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KpiUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for KpiUri {
    fn from(uri: &str) -> Self {
        Self(uri.to_owned())
    }
}

impl From<String> for KpiUri {
    fn from(uri: String) -> Self {
        Self(uri)
    }
}

impl Borrow<str> for KpiUri {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Performance status, derived from the performance ratio with fixed bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Excellent,
    Good,
    Warning,
    Critical,
}

impl Status {
    /// Classify a performance ratio (percent of target).
    ///
    /// Bands: >=95 excellent, >=80 good, >=60 warning, else critical.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio >= 95.0 {
            Status::Excellent
        } else if ratio >= 80.0 {
            Status::Good
        } else if ratio >= 60.0 {
            Status::Warning
        } else {
            Status::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Excellent => "excellent",
            Status::Good => "good",
            Status::Warning => "warning",
            Status::Critical => "critical",
        }
    }

    /// Whether the status indicates degraded performance.
    pub fn is_degraded(&self) -> bool {
        matches!(self, Status::Warning | Status::Critical)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A timestamped value/status snapshot of a KPI.
///
/// Observations are immutable once created; an update creates a fresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub value: f64,
    pub status: Status,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
}

impl Observation {
    /// Record a new observation, deriving the status from `value` and `target`.
    pub fn record(value: f64, target: f64) -> Self {
        Self {
            value,
            status: Status::from_ratio(value / target * 100.0),
            timestamp: epoch_seconds(),
        }
    }
}

/// A tracked performance indicator with a target, current observation, and
/// derived status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    pub uri: KpiUri,
    pub label: String,
    pub domain: String,
    pub goal: String,
    /// Target value. Strictly positive; the store rejects anything else.
    pub target: f64,
    pub unit: String,
    pub observation: Observation,
}

impl Kpi {
    /// `value / target * 100`, the basis for status classification and
    /// insight thresholds.
    pub fn performance_ratio(&self) -> f64 {
        self.observation.value / self.target * 100.0
    }

    /// `value / target` without the percent scaling. Chain impact scoring
    /// accumulates divergence of this quantity between consecutive nodes.
    pub fn raw_ratio(&self) -> f64 {
        self.observation.value / self.target
    }
}

/// Kind of a directed causal edge.
///
/// The wire forms are `"influences"` and `"dependsOn"`; any other string is
/// preserved verbatim as [`RelationKind::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelationKind {
    Influences,
    DependsOn,
    Other(String),
}

impl RelationKind {
    pub fn as_str(&self) -> &str {
        match self {
            RelationKind::Influences => "influences",
            RelationKind::DependsOn => "dependsOn",
            RelationKind::Other(s) => s,
        }
    }
}

impl From<String> for RelationKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "influences" => RelationKind::Influences,
            "dependsOn" => RelationKind::DependsOn,
            _ => RelationKind::Other(s),
        }
    }
}

impl From<RelationKind> for String {
    fn from(kind: RelationKind) -> Self {
        kind.as_str().to_owned()
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed causal or dependency edge between two KPIs.
///
/// Multiple relationships between the same pair are allowed and are never
/// deduplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: KpiUri,
    pub target: KpiUri,
    #[serde(rename = "type")]
    pub kind: RelationKind,
    /// Optional strength in 0..=1. Advisory; the simulators use fixed
    /// damping factors instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f64>,
}

impl Relationship {
    pub fn new(source: impl Into<KpiUri>, target: impl Into<KpiUri>, kind: RelationKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            strength: None,
        }
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = Some(strength);
        self
    }
}

/// A bounded-length directed path through relationships, scored by cumulative
/// performance-ratio divergence. Ephemeral, recomputed per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CausalChain {
    /// Node uris in traversal order, at least two.
    pub nodes: Vec<KpiUri>,
    /// Relationship kinds linking consecutive nodes.
    pub relationships: Vec<RelationKind>,
    pub impact: f64,
    /// Node count.
    pub length: usize,
}

/// Current seconds since the Unix epoch.
pub fn epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_bands() {
        assert_eq!(Status::from_ratio(140.0), Status::Excellent);
        assert_eq!(Status::from_ratio(95.0), Status::Excellent);
        assert_eq!(Status::from_ratio(94.9), Status::Good);
        assert_eq!(Status::from_ratio(80.0), Status::Good);
        assert_eq!(Status::from_ratio(79.9), Status::Warning);
        assert_eq!(Status::from_ratio(60.0), Status::Warning);
        assert_eq!(Status::from_ratio(59.9), Status::Critical);
        assert_eq!(Status::from_ratio(0.0), Status::Critical);
    }

    #[test]
    fn observation_derives_status() {
        let obs = Observation::record(42.0, 30.0);
        assert_eq!(obs.status, Status::Excellent);
        let obs = Observation::record(15.0, 30.0);
        assert_eq!(obs.status, Status::Critical);
    }

    #[test]
    fn relation_kind_wire_forms() {
        let k: RelationKind = serde_json::from_str("\"influences\"").unwrap();
        assert_eq!(k, RelationKind::Influences);
        let k: RelationKind = serde_json::from_str("\"dependsOn\"").unwrap();
        assert_eq!(k, RelationKind::DependsOn);
        let k: RelationKind = serde_json::from_str("\"correlatesWith\"").unwrap();
        assert_eq!(k, RelationKind::Other("correlatesWith".into()));
        assert_eq!(
            serde_json::to_string(&RelationKind::DependsOn).unwrap(),
            "\"dependsOn\""
        );
    }

    #[test]
    fn relationship_wire_shape() {
        let json = r#"{"source":"a","target":"b","type":"influences","strength":0.8}"#;
        let rel: Relationship = serde_json::from_str(json).unwrap();
        assert_eq!(rel.kind, RelationKind::Influences);
        assert_eq!(rel.strength, Some(0.8));
    }

    #[test]
    fn performance_ratio_percent() {
        let kpi = Kpi {
            uri: "k".into(),
            label: "K".into(),
            domain: "d".into(),
            goal: "g".into(),
            target: 30.0,
            unit: "minutes".into(),
            observation: Observation {
                value: 42.0,
                status: Status::Excellent,
                timestamp: 0,
            },
        };
        assert!((kpi.performance_ratio() - 140.0).abs() < 1e-9);
        assert!((kpi.raw_ratio() - 1.4).abs() < 1e-9);
    }
}
