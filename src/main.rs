//! kardia CLI: causal KPI reasoning engine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use kardia::engine::{Engine, EngineConfig};
use kardia::fixtures;
use kardia::model::KpiUri;
use kardia::store::{Dataset, KpiStore, MemoryStore};

#[derive(Parser)]
#[command(name = "kardia", version, about = "Causal KPI reasoning engine")]
struct Cli {
    /// Path to the JSON dataset file.
    #[arg(long, global = true, default_value = "kpis.json")]
    data: PathBuf,

    /// Traversal depth bound for chains and propagation.
    #[arg(long, global = true, default_value = "3")]
    max_depth: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a seeded demo dataset to the data path.
    Init {
        /// Seed for the generated values.
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// List all KPIs with their latest observation.
    Kpis,

    /// Run the full reasoning pipeline and print the report.
    Report {
        /// Print the raw report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Simulate KPI value changes (uri=value pairs).
    Simulate {
        /// Changes to apply, e.g. "average-wait-time=25".
        #[arg(required = true)]
        changes: Vec<String>,

        /// Print the raw result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate ranked insights from the current snapshot.
    Insights {
        /// Print the raw insights as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Export the KPI network as JSON nodes and edges.
    Graph,

    /// Record a new observation for a KPI and save the dataset.
    Update {
        /// KPI uri.
        uri: String,
        /// New value.
        value: f64,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = EngineConfig {
        max_depth: cli.max_depth,
        ..Default::default()
    };

    match cli.command {
        Commands::Init { seed } => {
            let dataset = fixtures::demo_dataset(seed);
            write_dataset(&cli.data, &dataset)?;
            println!(
                "Initialized {} with {} KPIs and {} relationships (seed {seed})",
                cli.data.display(),
                dataset.kpis.len(),
                dataset.relationships.len()
            );
        }

        Commands::Kpis => {
            let engine = load_engine(&cli.data, config)?;
            let kpis = engine.store().get_all_kpis().into_diagnostic()?;
            if kpis.is_empty() {
                println!("No KPIs in dataset.");
            } else {
                println!("KPIs ({}):", kpis.len());
                for kpi in &kpis {
                    println!(
                        "  {} \"{}\": {} / {} {} [{}]",
                        kpi.uri,
                        kpi.label,
                        kpi.observation.value,
                        kpi.target,
                        kpi.unit,
                        kpi.observation.status.as_str()
                    );
                }
            }
        }

        Commands::Report { json } => {
            let engine = load_engine(&cli.data, config)?;
            let report = engine.run_reasoning().into_diagnostic()?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).into_diagnostic()?
                );
            } else {
                println!(
                    "Reasoning report ({} correlation rows, {} chains, {} insights):",
                    report.correlations.len(),
                    report.causal_chains.len(),
                    report.insights.len()
                );
                for insight in &report.insights {
                    print_insight(insight);
                }
            }
        }

        Commands::Simulate { changes, json } => {
            let engine = load_engine(&cli.data, config)?;
            let changes = parse_changes(&changes)?;
            let result = engine.simulate(&changes).into_diagnostic()?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result).into_diagnostic()?
                );
            } else {
                for (uri, analysis) in &result.impacts {
                    println!(
                        "{uri}: {} -> {} ({:+.2}%)",
                        analysis.kpi.current_value, analysis.new_value, analysis.change_percent
                    );
                    for influenced in &analysis.influenced {
                        println!(
                            "  influences \"{}\": {} -> {}",
                            influenced.label, influenced.current_value, influenced.projected_value
                        );
                    }
                }
                if !result.predicted_outcomes.is_empty() {
                    println!("Propagated effects:");
                    for outcome in &result.predicted_outcomes {
                        println!(
                            "  depth {} \"{}\": {:.2} -> {:.2} (via {})",
                            outcome.depth,
                            outcome.kpi_label,
                            outcome.original_value,
                            outcome.projected_value,
                            outcome.influenced_by
                        );
                    }
                }
                println!("Overall impact score: {:.4}", result.overall_impact_score);
            }
        }

        Commands::Insights { json } => {
            let engine = load_engine(&cli.data, config)?;
            let insights = engine.insights().into_diagnostic()?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&insights).into_diagnostic()?
                );
            } else if insights.is_empty() {
                println!("No insights.");
            } else {
                for insight in &insights {
                    print_insight(insight);
                }
            }
        }

        Commands::Graph => {
            let engine = load_engine(&cli.data, config)?;
            let network = engine.network().into_diagnostic()?;
            println!(
                "{}",
                serde_json::to_string_pretty(&network).into_diagnostic()?
            );
        }

        Commands::Update { uri, value } => {
            let engine = load_engine(&cli.data, config)?;
            let uri = KpiUri::from(uri);
            if !engine.update_kpi_value(&uri, value).into_diagnostic()? {
                miette::bail!("no KPI with uri \"{uri}\" in {}", cli.data.display());
            }

            let dataset = Dataset {
                kpis: engine.store().get_all_kpis().into_diagnostic()?,
                relationships: engine.store().get_kpi_relationships().into_diagnostic()?,
            };
            write_dataset(&cli.data, &dataset)?;

            if let Some(kpi) = dataset.kpis.iter().find(|k| k.uri == uri) {
                println!(
                    "Updated {uri} to {value} [{}]",
                    kpi.observation.status.as_str()
                );
            }
        }
    }

    Ok(())
}

fn load_engine(data: &Path, config: EngineConfig) -> Result<Engine<MemoryStore>> {
    let store = MemoryStore::load(data).into_diagnostic()?;
    Engine::new(store, config).into_diagnostic()
}

fn write_dataset(path: &Path, dataset: &Dataset) -> Result<()> {
    let json = serde_json::to_string_pretty(dataset).into_diagnostic()?;
    std::fs::write(path, json).into_diagnostic()
}

/// Parse "uri=value" pairs into a change map.
fn parse_changes(raw: &[String]) -> Result<BTreeMap<KpiUri, f64>> {
    let mut changes = BTreeMap::new();
    for entry in raw {
        let Some((uri, value)) = entry.split_once('=') else {
            miette::bail!("expected uri=value, got \"{entry}\"");
        };
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| miette::miette!("invalid value in \"{entry}\""))?;
        changes.insert(KpiUri::from(uri.trim()), value);
    }
    Ok(changes)
}

fn print_insight(insight: &kardia::insight::Insight) {
    println!("[{}] {}", insight.severity.as_str(), insight.title);
    println!("    {}", insight.message);
    println!("    recommendation: {}", insight.recommendation);
}
