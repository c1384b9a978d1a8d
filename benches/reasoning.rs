//! Benchmarks for the reasoning hot path.

use std::collections::BTreeMap;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use kardia::analytics::{ChainConfig, explore_chains};
use kardia::engine::{Engine, EngineConfig};
use kardia::fixtures;
use kardia::graph::KpiGraph;
use kardia::model::{Kpi, KpiUri, Relationship};
use kardia::simulate::{PropagationConfig, simulate_scenario};
use kardia::store::{Dataset, MemoryStore};

fn demo_snapshot() -> (Vec<Kpi>, Vec<Relationship>) {
    let Dataset {
        kpis,
        relationships,
    } = fixtures::demo_dataset(0);
    (kpis, relationships)
}

fn bench_chain_exploration(c: &mut Criterion) {
    let (kpis, relationships) = demo_snapshot();
    let graph = KpiGraph::from_relationships(&relationships);
    let config = ChainConfig::default();

    c.bench_function("explore_chains_demo", |bench| {
        bench.iter(|| black_box(explore_chains(&kpis, &graph, &config)))
    });
}

fn bench_propagation(c: &mut Criterion) {
    let (kpis, relationships) = demo_snapshot();
    let graph = KpiGraph::from_relationships(&relationships);
    let config = PropagationConfig::default();
    let changes: BTreeMap<KpiUri, f64> =
        [(fixtures::uri_for("Average Wait Time"), 25.0)].into();

    c.bench_function("simulate_scenario_demo", |bench| {
        bench.iter(|| black_box(simulate_scenario(&changes, &kpis, &graph, &config).unwrap()))
    });
}

fn bench_full_reasoning(c: &mut Criterion) {
    let store = MemoryStore::from_dataset(fixtures::demo_dataset(0)).unwrap();
    let engine = Engine::new(store, EngineConfig::default()).unwrap();

    c.bench_function("run_reasoning_demo", |bench| {
        bench.iter(|| black_box(engine.run_reasoning().unwrap()))
    });
}

criterion_group!(
    benches,
    bench_chain_exploration,
    bench_propagation,
    bench_full_reasoning
);
criterion_main!(benches);
