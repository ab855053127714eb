//! Performance benchmarks for the provider core.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hybris_provider::{
    ClientId, ClientRegistry, LocationSample, PendingQuery, PendingQueryQueue, QueryKind,
    Timestamp,
};

/// Benchmark subscribe/unsubscribe churn with many distinct clients
fn bench_registry_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_churn");

    for clients in [1, 10, 100] {
        let ids: Vec<ClientId> = (0..clients).map(|i| ClientId::new(format!(":1.{}", i))).collect();

        group.bench_with_input(BenchmarkId::new("clients", clients), &ids, |b, ids| {
            b.iter(|| {
                let mut registry = ClientRegistry::new();
                for id in ids {
                    registry.subscribe(id.clone());
                }
                for id in ids.iter().rev() {
                    registry.unsubscribe(id);
                }
                black_box(registry.count());
            });
        });
    }

    group.finish();
}

/// Benchmark draining pending queries against one sample
fn bench_queue_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_drain");
    let sample = LocationSample::at(Timestamp(0))
        .with_coordinates(60.17, 24.94)
        .with_speed(1.5);

    for pending in [1, 16, 256] {
        group.bench_with_input(BenchmarkId::new("pending", pending), &pending, |b, &n| {
            b.iter(|| {
                let mut queue = PendingQueryQueue::new();
                for call in 0..n {
                    let kind = if call % 2 == 0 {
                        QueryKind::Position
                    } else {
                        QueryKind::Velocity
                    };
                    queue.enqueue(PendingQuery::new(kind, call, Timestamp(0)));
                }
                black_box(queue.drain(&sample));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_registry_churn, bench_queue_drain);
criterion_main!(benches);
