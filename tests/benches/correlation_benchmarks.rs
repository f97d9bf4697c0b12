//! # Correlation Engine Benchmarks
//!
//! | Path | Claim |
//! |------|-------|
//! | register + complete | O(1) per request, independent of how many are pending |
//! | full round trip | dispatch → mock backend → inbound listener → caller |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use order_gateway::domain::{Outcome, PendingRequestStore};
use order_gateway::{DispatchOptions, EngineConfig, OrderEngine};
use og_tests::support::{sample_order, MockOrderBackend};
use og_tests::support::backend::OrderChannels;
use shared_types::{CorrelationId, PlaceOrderBody};
use std::time::Duration;

fn bench_pending_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("pending-store");

    for outstanding in [0usize, 1_000, 10_000] {
        let store = PendingRequestStore::<u64, u64>::new(Duration::from_secs(120));
        let _parked: Vec<_> = (0..outstanding)
            .map(|_| {
                store
                    .register(CorrelationId::generate(), Duration::from_secs(30))
                    .unwrap()
            })
            .collect();

        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::new("register_complete", outstanding),
            &outstanding,
            |b, _| {
                b.iter(|| {
                    let id = CorrelationId::generate();
                    let registration = store.register(id.clone(), Duration::from_secs(30)).unwrap();
                    black_box(store.complete(&id, Outcome::Success(1)));
                    drop(registration);
                })
            },
        );
    }

    group.finish();
}

fn bench_round_trip(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();

    let (_channels, engine, _backend) = runtime.block_on(async {
        let channels = OrderChannels::with_capacity(4096);
        let engine = OrderEngine::attach(channels.channel_set(), EngineConfig::default()).unwrap();
        let backend = MockOrderBackend::accepting(&channels);
        (channels, engine, backend)
    });

    let mut group = c.benchmark_group("round-trip");
    group.measurement_time(Duration::from_secs(5));

    group.bench_function("place_order", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let body = PlaceOrderBody {
                    order: sample_order("bench"),
                };
                black_box(engine.request(body, DispatchOptions::default()).await.unwrap())
            })
        })
    });

    group.finish();
}

criterion_group!(benches, bench_pending_store, bench_round_trip);
criterion_main!(benches);
