//! Seeded hospital demo dataset.
//!
//! Generates a deterministic snapshot of departmental KPIs with the causal
//! relationships a hospital would plausibly have. The core never depends on
//! this module; it exists for `kardia init`, examples, and benchmarks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::model::{Kpi, KpiUri, Observation, RelationKind, Relationship};
use crate::store::Dataset;

struct KpiTemplate {
    name: &'static str,
    unit: &'static str,
    target: f64,
    min: f64,
    max: f64,
}

struct Department {
    name: &'static str,
    domain: &'static str,
    goal: &'static str,
    kpis: &'static [KpiTemplate],
}

const DEPARTMENTS: &[Department] = &[
    Department {
        name: "Emergency Department",
        domain: "emergency",
        goal: "Enhance Patient Experience",
        kpis: &[
            KpiTemplate {
                name: "Average Wait Time",
                unit: "minutes",
                target: 30.0,
                min: 15.0,
                max: 90.0,
            },
            KpiTemplate {
                name: "Patient Satisfaction",
                unit: "percentage",
                target: 85.0,
                min: 60.0,
                max: 95.0,
            },
            KpiTemplate {
                name: "Triage Accuracy",
                unit: "percentage",
                target: 95.0,
                min: 85.0,
                max: 98.0,
            },
            KpiTemplate {
                name: "Bed Occupancy Rate",
                unit: "percentage",
                target: 75.0,
                min: 60.0,
                max: 95.0,
            },
        ],
    },
    Department {
        name: "Radiology Department",
        domain: "radiology",
        goal: "Achieve Operational Excellence",
        kpis: &[
            KpiTemplate {
                name: "Report Turnaround Time",
                unit: "hours",
                target: 24.0,
                min: 12.0,
                max: 48.0,
            },
            KpiTemplate {
                name: "Image Quality Score",
                unit: "percentage",
                target: 90.0,
                min: 80.0,
                max: 98.0,
            },
            KpiTemplate {
                name: "Equipment Utilization",
                unit: "percentage",
                target: 80.0,
                min: 60.0,
                max: 95.0,
            },
            KpiTemplate {
                name: "Radiation Dose",
                unit: "mSv",
                target: 10.0,
                min: 5.0,
                max: 25.0,
            },
        ],
    },
    Department {
        name: "Surgery Department",
        domain: "surgery",
        goal: "Ensure Clinical Quality",
        kpis: &[
            KpiTemplate {
                name: "Surgical Site Infections",
                unit: "percentage",
                target: 2.0,
                min: 0.5,
                max: 5.0,
            },
            KpiTemplate {
                name: "Operating Room Utilization",
                unit: "percentage",
                target: 75.0,
                min: 60.0,
                max: 90.0,
            },
            KpiTemplate {
                name: "Average Length of Stay",
                unit: "days",
                target: 4.5,
                min: 3.0,
                max: 8.0,
            },
            KpiTemplate {
                name: "Mortality Rate",
                unit: "percentage",
                target: 1.5,
                min: 0.5,
                max: 4.0,
            },
        ],
    },
    Department {
        name: "Pharmacy Department",
        domain: "pharmacy",
        goal: "Ensure Clinical Quality",
        kpis: &[
            KpiTemplate {
                name: "Medication Error Rate",
                unit: "percentage",
                target: 0.5,
                min: 0.1,
                max: 2.0,
            },
            KpiTemplate {
                name: "Prescription Accuracy",
                unit: "percentage",
                target: 98.0,
                min: 95.0,
                max: 99.5,
            },
            KpiTemplate {
                name: "Inventory Turnover",
                unit: "times/year",
                target: 12.0,
                min: 8.0,
                max: 20.0,
            },
            KpiTemplate {
                name: "Drug Interaction Alerts",
                unit: "percentage",
                target: 1.0,
                min: 0.2,
                max: 3.0,
            },
        ],
    },
];

/// The causal backbone of the demo: relationships with healthcare logic
/// behind them. Generated edges come on top of these.
const KEY_RELATIONSHIPS: &[(&str, &str, f64)] = &[
    ("Average Wait Time", "Patient Satisfaction", 0.8),
    ("Triage Accuracy", "Average Wait Time", 0.6),
    ("Report Turnaround Time", "Average Length of Stay", 0.7),
    ("Medication Error Rate", "Average Length of Stay", 0.5),
    ("Surgical Site Infections", "Average Length of Stay", 0.8),
    ("Average Length of Stay", "Bed Occupancy Rate", 0.6),
    ("Image Quality Score", "Diagnostic Accuracy", 0.9),
    ("Prescription Accuracy", "Medication Error Rate", 0.7),
];

/// Lowercase, space-to-dash uri for a KPI label.
pub fn uri_for(label: &str) -> KpiUri {
    label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .into()
}

/// Generate the demo dataset. The same seed always yields the same
/// snapshot.
pub fn demo_dataset(seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut kpis = Vec::new();
    for department in DEPARTMENTS {
        for template in department.kpis {
            // Jitter around the target by a tenth of the plausible range,
            // clamped back into it.
            let variance = (template.max - template.min) * 0.1;
            let value = (template.target + rng.gen_range(-variance..=variance))
                .clamp(template.min, template.max);
            let value = (value * 100.0).round() / 100.0;

            kpis.push(Kpi {
                uri: uri_for(template.name),
                label: template.name.to_string(),
                domain: department.domain.to_string(),
                goal: department.goal.to_string(),
                target: template.target,
                unit: template.unit.to_string(),
                observation: Observation::record(value, template.target),
            });
        }
    }

    let mut relationships: Vec<Relationship> = KEY_RELATIONSHIPS
        .iter()
        .map(|&(source, target, strength)| {
            Relationship::new(uri_for(source), uri_for(target), RelationKind::Influences)
                .with_strength(strength)
        })
        .collect();

    // A handful of weaker cross-department edges for graph density.
    let all_names: Vec<&str> = DEPARTMENTS
        .iter()
        .flat_map(|d| d.kpis.iter().map(|t| t.name))
        .collect();
    for _ in 0..12 {
        let source = all_names[rng.gen_range(0..all_names.len())];
        let target = all_names[rng.gen_range(0..all_names.len())];
        if source == target {
            continue;
        }
        let kind = if rng.gen_bool(0.5) {
            RelationKind::Influences
        } else {
            RelationKind::DependsOn
        };
        let strength = (rng.gen_range(0.1f64..=0.6) * 100.0).round() / 100.0;
        relationships.push(
            Relationship::new(uri_for(source), uri_for(target), kind).with_strength(strength),
        );
    }

    Dataset {
        kpis,
        relationships,
    }
}
