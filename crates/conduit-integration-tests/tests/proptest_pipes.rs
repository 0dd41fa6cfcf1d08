//! Property-based tests for fluid nodes.
//!
//! Generates random connection layouts and adversarial endpoints, then
//! checks the buffer invariants and persistence laws hold.

use conduit_core::connection::{ConnectionMode, CycleOutcome};
use conduit_core::direction::Direction;
use conduit_core::event::PipeEvent;
use conduit_core::network::NetworkData;
use conduit_core::node::{PipeNode, TickContext};
use conduit_core::resource::{Amount, ResourceKey};
use conduit_core::serialize::NodeState;
use conduit_core::test_utils::{MockEndpoints, UNLIMITED};
use conduit_fluid::{FluidKey, FluidNode};
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// Unique directions in random order, each with a random mode byte.
fn arb_connections() -> impl Strategy<Value = Vec<(Direction, u8)>> {
    (
        0..=Direction::COUNT,
        Just(Direction::ALL.to_vec()).prop_shuffle(),
        proptest::collection::vec(0..3u8, Direction::COUNT),
    )
        .prop_map(|(n, dirs, modes)| dirs.into_iter().take(n).zip(modes).collect())
}

fn arb_fluid() -> impl Strategy<Value = FluidKey> {
    prop_oneof![Just(FluidKey::EMPTY), Just(FluidKey(1)), Just(FluidKey(2))]
}

/// Behaviour of one side: (insert limit, optional source, overdelivery).
fn arb_side() -> impl Strategy<Value = (Amount, Option<(FluidKey, Amount)>, Amount)> {
    (
        prop_oneof![Just(0u64), 1..2000u64, Just(UNLIMITED)],
        proptest::option::of((arb_fluid(), prop_oneof![0..3000u64, Just(UNLIMITED)])),
        prop_oneof![3 => Just(0u64), 1 => 1..5000u64],
    )
}

fn arb_endpoints() -> impl Strategy<Value = MockEndpoints<FluidKey>> {
    proptest::collection::vec(arb_side(), Direction::COUNT).prop_map(|sides| {
        let mut endpoints = MockEndpoints::new();
        for (direction, (limit, source, extra)) in Direction::ALL.into_iter().zip(sides) {
            endpoints = endpoints
                .with_sink(direction, limit)
                .with_overdelivery(direction, extra);
            if let Some((fluid, amount)) = source {
                endpoints = endpoints.with_source(direction, fluid, amount);
            }
        }
        endpoints.without_recording()
    })
}

fn tick(
    node: &mut FluidNode,
    network: &mut NetworkData<FluidKey>,
    endpoints: &mut MockEndpoints<FluidKey>,
) -> Vec<PipeEvent<FluidKey>> {
    let mut events = Vec::new();
    let mut ctx = TickContext::new(network, endpoints, &mut events);
    node.tick(&mut ctx);
    events
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// After every tick: amount <= capacity, and a positive amount implies
    /// the network holds a fluid. Holds even against lying endpoints.
    #[test]
    fn buffer_stays_within_capacity(
        capacity in 1..5000u64,
        amount in 0..20_000u64,
        fluid in arb_fluid(),
        connections in arb_connections(),
        mut endpoints in arb_endpoints(),
        ticks in 1..20usize,
    ) {
        let mut network = NetworkData::with_resource(fluid, capacity);
        let mut node = FluidNode::from_state(&NodeState { amount, connections }).unwrap();

        for _ in 0..ticks {
            tick(&mut node, &mut network, &mut endpoints);
            prop_assert!(node.amount() <= network.capacity());
            prop_assert!(node.amount() == 0 || !network.is_empty());
        }
    }

    /// Persisted state reproduces the amount and the direction -> mode set.
    #[test]
    fn state_round_trip(amount in any::<u64>(), connections in arb_connections()) {
        let node = FluidNode::from_state(&NodeState { amount, connections: connections.clone() }).unwrap();

        let restored = FluidNode::decode_state(&node.encode_state().unwrap()).unwrap();

        prop_assert_eq!(restored.amount(), amount);
        for direction in Direction::ALL {
            let expected = connections
                .iter()
                .find(|(d, _)| *d == direction)
                .and_then(|(_, b)| ConnectionMode::from_byte(*b));
            prop_assert_eq!(restored.mode(direction), expected);
        }
    }

    /// Two extractable sources of different fluids: only the first in
    /// service order is adopted and later connections are never touched.
    #[test]
    fn first_claim_wins(order in Just(Direction::ALL.to_vec()).prop_shuffle(), first in 1..1000u64, second in 1..1000u64) {
        let (a, b) = (order[0], order[1]);
        let mut network = NetworkData::new(1000);
        let mut endpoints = MockEndpoints::new()
            .with_source(a, FluidKey(1), first)
            .with_source(b, FluidKey(2), second);
        let mut node = FluidNode::from_state(&NodeState {
            amount: 0,
            connections: vec![(a, ConnectionMode::Out.to_byte()), (b, ConnectionMode::InOut.to_byte())],
        })
        .unwrap();

        tick(&mut node, &mut network, &mut endpoints);

        // Decoding canonicalises order, so whichever of the two comes first
        // in Direction::ALL is serviced first.
        let (winner, loser, amount, fluid) = if a.index() < b.index() {
            (a, b, first, FluidKey(1))
        } else {
            (b, a, second, FluidKey(2))
        };
        prop_assert_eq!(network.resource(), fluid);
        prop_assert_eq!(node.amount(), amount);
        prop_assert!(!endpoints.calls_in(winner).is_empty());
        prop_assert!(endpoints.calls_in(loser).is_empty());
    }

    /// add + three removes walks In -> InOut -> Out -> removed; a fourth
    /// remove does nothing.
    #[test]
    fn mode_cycle(index in 0..Direction::COUNT) {
        let direction = Direction::ALL[index];
        let endpoints = MockEndpoints::<FluidKey>::new().with_inert(direction);
        let mut node = FluidNode::new();

        prop_assert!(node.add_connection(&endpoints, direction));
        prop_assert!(!node.add_connection(&endpoints, direction));
        prop_assert_eq!(node.mode(direction), Some(ConnectionMode::In));
        prop_assert_eq!(node.remove_connection(direction), CycleOutcome::Changed(ConnectionMode::InOut));
        prop_assert_eq!(node.remove_connection(direction), CycleOutcome::Changed(ConnectionMode::Out));
        prop_assert_eq!(node.remove_connection(direction), CycleOutcome::Removed);
        prop_assert_eq!(node.remove_connection(direction), CycleOutcome::Absent);
        prop_assert!(node.connection_set().is_empty());
    }
}
