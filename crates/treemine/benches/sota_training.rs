//! SOTA training benchmarks.
//!
//! - Full training on numeric tables of growing size
//! - Sequential vs parallel variability computation
//! - Single epochs on a fixed tree

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;

use treemine::data::{ColumnMeta, Table};
use treemine::model::sota::{SotaConfig, SotaModel};
use treemine::training::{NoopMonitor, SotaManager, Verbosity};
use treemine::utils::Parallelism;

// =============================================================================
// Data Generation
// =============================================================================

/// `n_clusters` Gaussian-ish blobs of `n_rows` rows in total.
fn clustered_table(n_rows: usize, n_features: usize, n_clusters: usize, seed: u64) -> Table {
    let mut rng = StdRng::seed_from_u64(seed);
    let centres: Vec<Vec<f64>> = (0..n_clusters)
        .map(|_| (0..n_features).map(|_| rng.gen_range(-50.0..50.0)).collect())
        .collect();

    let columns = (0..n_features)
        .map(|i| ColumnMeta::numeric(format!("f{i}")))
        .collect();
    let mut builder = Table::builder(columns);
    for r in 0..n_rows {
        let centre = &centres[r % n_clusters];
        let row: Vec<f64> = centre.iter().map(|c| c + rng.gen_range(-2.0..2.0)).collect();
        builder = builder.row(row);
    }
    builder.build().expect("generated rows are well formed")
}

fn bench_config(parallelism: Parallelism, use_variability: bool) -> SotaConfig {
    SotaConfig::builder()
        .min_resource(3.0)
        .min_variability(8.0)
        .use_variability(use_variability)
        .parallelism(parallelism)
        .verbosity(Verbosity::Silent)
        .build()
        .expect("benchmark config is valid")
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_training_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("sota/train");
    group.sample_size(10);

    for n_rows in [200, 1_000, 4_000] {
        let table = clustered_table(n_rows, 8, 6, 42);
        group.throughput(Throughput::Elements(n_rows as u64));
        group.bench_with_input(BenchmarkId::new("resource", n_rows), &table, |b, table| {
            b.iter(|| {
                let config = bench_config(Parallelism::Sequential, false);
                black_box(SotaModel::train(black_box(table), None, config, &NoopMonitor))
            });
        });
    }
    group.finish();
}

fn bench_variability_parallelism(c: &mut Criterion) {
    let mut group = c.benchmark_group("sota/variability");
    group.sample_size(10);

    let table = clustered_table(1_000, 8, 6, 7);
    for (name, parallelism) in [
        ("sequential", Parallelism::Sequential),
        ("parallel", Parallelism::Parallel),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let config = bench_config(parallelism, true);
                black_box(SotaModel::train(&table, None, config, &NoopMonitor))
            });
        });
    }
    group.finish();
}

fn bench_epoch(c: &mut Criterion) {
    let table = clustered_table(5_000, 16, 4, 3);
    let mut manager = SotaManager::new(bench_config(Parallelism::Sequential, false));
    manager
        .initialize_tree(&table, None, &NoopMonitor)
        .expect("benchmark table has complete rows");

    c.bench_function("sota/epoch", |b| {
        b.iter(|| black_box(manager.do_epoch()));
    });
}

criterion_group!(
    benches,
    bench_training_scaling,
    bench_variability_parallelism,
    bench_epoch
);
criterion_main!(benches);
