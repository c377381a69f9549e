use std::hint::black_box;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use metrics::HistogramFn;
use sluice_metrics::{Action, Counter, Gauge, Instrument, Timer};

fn benchmark_execute(c: &mut Criterion) {
    let mut group = c.benchmark_group("execute");

    let counter = Counter::new();
    group.bench_function("counter_increment", |b| {
        b.iter(|| counter.execute(black_box(Action::Increment(1))));
    });

    let gauge = Gauge::new();
    group.bench_function("gauge_set", |b| {
        b.iter(|| gauge.execute(black_box(Action::Set(42.0))));
    });

    group.bench_function("gauge_adjust", |b| {
        b.iter(|| gauge.execute(black_box(Action::Adjust(1.0))));
    });

    let timer = Timer::new();
    group.bench_function("timer_record", |b| {
        b.iter(|| timer.execute(black_box(Action::Record(Duration::from_micros(250)))));
    });

    group.finish();
}

fn benchmark_dynamic_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dynamic_dispatch");

    let instruments: Vec<Arc<dyn Instrument>> = vec![
        Arc::new(Counter::new()),
        Arc::new(Gauge::new()),
        Arc::new(Timer::new()),
    ];

    group.bench_function("read_values", |b| {
        b.iter(|| {
            for instrument in &instruments {
                black_box(instrument.value());
            }
        });
    });

    group.finish();
}

fn benchmark_timer_batches(c: &mut Criterion) {
    let mut group = c.benchmark_group("timer_batches");

    let timer = Timer::new();

    group.bench_function("record_single_x100", |b| {
        b.iter(|| {
            for _ in 0..100 {
                HistogramFn::record(&timer, black_box(0.042));
            }
        });
    });

    group.bench_function("record_many_100", |b| {
        b.iter(|| HistogramFn::record_many(&timer, black_box(0.042), black_box(100)));
    });

    group.finish();
}

fn benchmark_concurrent_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_operations");

    group.bench_function("concurrent_counter_increment", |b| {
        b.iter(|| {
            let counter = Arc::new(Counter::new());

            let num_threads = 4;
            let operations_per_thread = 1000;
            let mut handles = vec![];

            for _ in 0..num_threads {
                let counter_clone = Arc::clone(&counter);
                let handle = thread::spawn(move || {
                    for _ in 0..operations_per_thread {
                        let _ = counter_clone.execute(Action::Increment(1));
                    }
                });
                handles.push(handle);
            }

            for handle in handles {
                handle.join().unwrap();
            }

            black_box(counter.get());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_execute,
    benchmark_dynamic_dispatch,
    benchmark_timer_batches,
    benchmark_concurrent_operations
);
criterion_main!(benches);
