//! Trace range benchmarks.

use cgviz_core::TracePath;
use cgviz_model::ScenarioStore;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn build_store(n_tx: usize, n_rx: usize, n_paths: usize) -> ScenarioStore {
    let mut store = ScenarioStore::new();
    store.create_scenario("bench").ok();
    for tx in 0..n_tx {
        for rx in 0..n_rx {
            let paths = (0..n_paths)
                .map(|i| {
                    let power = -120.0 + ((tx * 31 + rx * 7 + i) % 100) as f64;
                    TracePath::new(power, vec![0.0, 10.0], vec![0.0, 5.0], vec![1.5, 30.0])
                })
                .collect();
            store
                .add_trace_pair("bench", &format!("Tx{}", tx), &format!("Rx{}", rx), paths)
                .ok();
        }
    }
    store
}

fn range_small(c: &mut Criterion) {
    let mut store = build_store(2, 10, 20);
    c.bench_function("trace_range_small", |b| {
        b.iter(|| store.compute_trace_range(black_box("bench")))
    });
}

fn range_large(c: &mut Criterion) {
    let mut store = build_store(8, 200, 50);
    c.bench_function("trace_range_large", |b| {
        b.iter(|| store.compute_trace_range(black_box("bench")))
    });
}

criterion_group!(benches, range_small, range_large);
criterion_main!(benches);
