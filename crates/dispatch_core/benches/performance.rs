//! Performance benchmarks for dispatch_core using Criterion.rs.

use bevy_ecs::prelude::World;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dispatch_core::config::DispatchConfig;
use dispatch_core::dispatch::{Dispatcher, RideOutcome, RideRequest};
use dispatch_core::network::RoadNetwork;
use dispatch_core::runner::{run_until_empty, simulation_schedule};
use dispatch_core::scenario::{build_scenario, ScenarioParams};
use dispatch_core::shortest_path::shortest_distances;

fn bench_shortest_distances(c: &mut Criterion) {
    let network = RoadNetwork::reference_seeded(Some(42));
    c.bench_function("shortest_distances_reference", |b| {
        b.iter(|| black_box(shortest_distances(&network, black_box(1))));
    });
}

fn bench_request_complete_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_complete_cycle");
    for cache_capacity in [0, 64] {
        let config = DispatchConfig {
            distance_cache_capacity: cache_capacity,
            ..DispatchConfig::default().with_seed(42)
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(cache_capacity),
            &config,
            |b, config| {
                let mut dispatcher = Dispatcher::from_config(config.clone());
                b.iter(|| {
                    let outcome = dispatcher
                        .request_ride(RideRequest::new(1, 40, false))
                        .expect("reference grid is connected");
                    if let RideOutcome::Booked { cab_id, .. } = black_box(outcome) {
                        dispatcher.complete_ride(cab_id).expect("cab was just booked");
                    }
                });
            },
        );
    }
    group.finish();
}

fn bench_simulation_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_run");
    for requests in [50, 200] {
        group.bench_with_input(
            BenchmarkId::from_parameter(requests),
            &requests,
            |b, &requests| {
                b.iter(|| {
                    let mut world = World::new();
                    build_scenario(&mut world, ScenarioParams::random(requests, 0.5, 42));
                    let mut schedule = simulation_schedule();
                    black_box(run_until_empty(&mut world, &mut schedule, 1_000_000));
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_shortest_distances,
    bench_request_complete_cycle,
    bench_simulation_run
);
criterion_main!(benches);
