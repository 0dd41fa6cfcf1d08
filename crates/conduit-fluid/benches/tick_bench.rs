//! Criterion benchmarks for the fluid tick driver.
//!
//! - `pipe_run`: 1000 nodes in one network, alternating pumps and drains.
//! - `many_networks`: 5000 nodes across 500 networks.

use conduit_core::connection::ConnectionMode;
use conduit_core::direction::Direction;
use conduit_core::node::PipeNode;
use conduit_core::test_utils::{MockEndpoints, MockWorld, UNLIMITED};
use conduit_fluid::{FluidKey, FluidPipes};
use criterion::{Criterion, criterion_group, criterion_main};

// ===========================================================================
// Builders
// ===========================================================================

fn water() -> FluidKey {
    FluidKey(1)
}

/// `networks` networks of `per_network` nodes. Even nodes pump water in from
/// below, odd nodes drain into a tank above.
fn build(networks: usize, per_network: usize) -> (FluidPipes, MockWorld<FluidKey>) {
    let mut pipes = FluidPipes::new();
    let mut world = MockWorld::new();

    for _ in 0..networks {
        let net = pipes.create_network(1000);
        for i in 0..per_network {
            let id = pipes.add_node(net).unwrap();
            let (direction, endpoints, mode) = if i % 2 == 0 {
                (
                    Direction::Down,
                    MockEndpoints::new()
                        .with_source(Direction::Down, water(), UNLIMITED)
                        .without_recording(),
                    ConnectionMode::Out,
                )
            } else {
                (
                    Direction::Up,
                    MockEndpoints::new()
                        .with_sink(Direction::Up, 250)
                        .without_recording(),
                    ConnectionMode::In,
                )
            };
            let node = pipes.node_mut(id).unwrap();
            node.add_connection(&endpoints, direction);
            while node.mode(direction) != Some(mode) {
                node.remove_connection(direction);
            }
            world.place(id, endpoints);
        }
    }

    (pipes, world)
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_pipe_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipe_run");
    group.sample_size(50);

    let (mut pipes, mut world) = build(1, 1000);

    group.bench_function("1000_nodes_one_network", |b| {
        b.iter(|| {
            pipes.tick(&mut world);
        });
    });

    group.finish();
}

fn bench_many_networks(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_networks");
    group.sample_size(20);

    let (mut pipes, mut world) = build(500, 10);

    group.bench_function("5000_nodes_500_networks", |b| {
        b.iter(|| {
            pipes.tick(&mut world);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_pipe_run, bench_many_networks);
criterion_main!(benches);
