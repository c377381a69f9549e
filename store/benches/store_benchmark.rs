use std::hint::black_box;
use std::sync::Arc;
use std::thread;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sluice_metrics::{Action, Counter, Instrument};
use sluice_store::{Metric, MetricStore, StoreRecorder};

const PATH: [&str; 3] = ["node", "pipelines", "main"];

fn populated(pipelines: usize, keys: usize) -> MetricStore {
    let store = MetricStore::new();

    for pipeline in 0..pipelines {
        let name = format!("pipeline_{pipeline:03}");
        for key in 0..keys {
            let path = ["node", "pipelines", name.as_str()];
            store
                .fetch_or_store_with(&path, &format!("metric_{key}"), Counter::new)
                .ok();
        }
    }

    store
}

fn benchmark_fetch_or_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("fetch_or_store");

    let store = MetricStore::new();
    store.fetch_or_store_with(&PATH, "events_in", Counter::new).ok();

    group.bench_function("existing_leaf", |b| {
        b.iter(|| store.fetch_or_store_with(black_box(&PATH), black_box("events_in"), Counter::new))
    });

    group.bench_function("get_leaf", |b| {
        b.iter(|| store.get(black_box(&["node", "pipelines", "main", "events_in"])))
    });

    group.bench_function("create_leaf", |b| {
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            store.fetch_or_store_with(&PATH, &format!("metric_{i}"), Counter::new)
        })
    });

    group.finish();
}

fn benchmark_facade(c: &mut Criterion) {
    let mut group = c.benchmark_group("facade");

    let store = Arc::new(MetricStore::new());
    let metric = Metric::new(Arc::clone(&store));
    let pipeline = metric.namespace(&PATH).ok();

    group.bench_function("metric_increment", |b| {
        b.iter(|| metric.increment(black_box(&PATH), black_box("events_in")))
    });

    if let Some(pipeline) = pipeline {
        group.bench_function("namespaced_increment", |b| {
            b.iter(|| pipeline.increment(black_box("events_out")))
        });
    }

    let recorder = StoreRecorder::new(Arc::clone(&store));
    group.bench_function("recorder_counter_macro", |b| {
        metrics::with_local_recorder(&recorder, || {
            b.iter(|| metrics::counter!("node.pipelines.main.events_filtered").increment(1))
        })
    });

    group.finish();
}

fn benchmark_to_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_records");

    for pipelines in [1usize, 10, 100] {
        let store = populated(pipelines, 20);
        group.throughput(Throughput::Elements(store.size() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(pipelines), &store, |b, store| {
            b.iter(|| black_box(store.to_records()))
        });
    }

    group.finish();
}

fn benchmark_concurrent(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");

    for threads in [2usize, 4, 8] {
        let id = BenchmarkId::new("shared_counter", threads);
        group.bench_with_input(id, &threads, |b, &threads| {
            let store = Arc::new(MetricStore::new());

            b.iter(|| {
                let handles: Vec<_> = (0..threads)
                    .map(|_| {
                        let store = Arc::clone(&store);
                        thread::spawn(move || {
                            for _ in 0..1000 {
                                let counter =
                                    store.fetch_or_store_with(&PATH, "events_in", Counter::new);
                                if let Ok(counter) = counter {
                                    let _ = counter.execute(Action::Increment(1));
                                }
                            }
                        })
                    })
                    .collect();

                for handle in handles {
                    let _ = handle.join();
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_fetch_or_store,
    benchmark_facade,
    benchmark_to_records,
    benchmark_concurrent
);
criterion_main!(benches);
