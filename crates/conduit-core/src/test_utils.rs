//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::direction::{Direction, DirectionMap};
use crate::endpoint::{EndpointProvider, EndpointWorld, NetworkLinks};
use crate::id::NodeId;
use crate::resource::{Amount, ResourceKey};

// ===========================================================================
// Resource key
// ===========================================================================

/// Minimal resource key. `TestKey(0)` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestKey(pub u32);

impl ResourceKey for TestKey {
    const EMPTY: Self = TestKey(0);
}

// ===========================================================================
// Mock endpoints
// ===========================================================================

/// Use as a reserve amount for a source that never runs dry.
pub const UNLIMITED: Amount = Amount::MAX;

/// One recorded call against [`MockEndpoints`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointCall<R> {
    Insert {
        direction: Direction,
        resource: R,
        max: Amount,
    },
    ExtractAny {
        direction: Direction,
        max: Amount,
    },
    ExtractExact {
        direction: Direction,
        resource: R,
        max: Amount,
    },
}

impl<R> EndpointCall<R> {
    pub fn direction(&self) -> Direction {
        match self {
            EndpointCall::Insert { direction, .. }
            | EndpointCall::ExtractAny { direction, .. }
            | EndpointCall::ExtractExact { direction, .. } => *direction,
        }
    }

    pub fn is_extract(&self) -> bool {
        !matches!(self, EndpointCall::Insert { .. })
    }
}

/// Behaviour of the endpoint on one side.
#[derive(Debug, Clone)]
pub struct MockSide<R> {
    /// Maximum accepted per insert call.
    pub insert_limit: Amount,
    /// Resource offered for extraction and how much is left.
    pub reserve: Option<(R, Amount)>,
    /// Extra units returned beyond what was asked, to simulate a provider
    /// that breaks its contract.
    pub overdeliver: Amount,
    /// Total units accepted by inserts so far.
    pub inserted: Amount,
}

impl<R> Default for MockSide<R> {
    fn default() -> Self {
        Self {
            insert_limit: 0,
            reserve: None,
            overdeliver: 0,
            inserted: 0,
        }
    }
}

/// Scriptable [`EndpointProvider`] that records every call.
#[derive(Debug, Clone)]
pub struct MockEndpoints<R> {
    sides: DirectionMap<MockSide<R>>,
    pub calls: Vec<EndpointCall<R>>,
    recording: bool,
}

impl<R> Default for MockEndpoints<R> {
    fn default() -> Self {
        Self {
            sides: DirectionMap::new(),
            calls: Vec::new(),
            recording: true,
        }
    }
}

impl<R: ResourceKey> MockEndpoints<R> {
    pub fn new() -> Self {
        Self::default()
    }

    fn side_entry(&mut self, direction: Direction) -> &mut MockSide<R> {
        self.sides.get_or_insert_with(direction, MockSide::default)
    }

    /// An endpoint accepting up to `limit` units per insert call.
    pub fn with_sink(mut self, direction: Direction, limit: Amount) -> Self {
        self.side_entry(direction).insert_limit = limit;
        self
    }

    /// An endpoint offering `amount` units of `resource`.
    pub fn with_source(mut self, direction: Direction, resource: R, amount: Amount) -> Self {
        self.side_entry(direction).reserve = Some((resource, amount));
        self
    }

    /// Make the endpoint return `extra` more than requested on every call.
    pub fn with_overdelivery(mut self, direction: Direction, extra: Amount) -> Self {
        self.side_entry(direction).overdeliver = extra;
        self
    }

    /// A side that exists but neither accepts nor offers anything.
    pub fn with_inert(mut self, direction: Direction) -> Self {
        self.side_entry(direction);
        self
    }

    /// Stop recording calls (for long-running benchmarks).
    pub fn without_recording(mut self) -> Self {
        self.recording = false;
        self
    }

    fn record(&mut self, call: EndpointCall<R>) {
        if self.recording {
            self.calls.push(call);
        }
    }

    /// Take the endpoint in `direction` away.
    pub fn remove_side(&mut self, direction: Direction) {
        self.sides.remove(direction);
    }

    pub fn side(&self, direction: Direction) -> Option<&MockSide<R>> {
        self.sides.get(direction)
    }

    /// Total accepted by inserts in `direction`.
    pub fn inserted(&self, direction: Direction) -> Amount {
        self.side(direction).map_or(0, |s| s.inserted)
    }

    /// Units left in the reserve in `direction`.
    pub fn remaining(&self, direction: Direction) -> Amount {
        self.side(direction)
            .and_then(|s| s.reserve)
            .map_or(0, |(_, left)| left)
    }

    pub fn calls_in(&self, direction: Direction) -> Vec<&EndpointCall<R>> {
        self.calls.iter().filter(|c| c.direction() == direction).collect()
    }

    fn take(side: &mut MockSide<R>, max: Amount) -> Amount {
        let Some((_, left)) = side.reserve.as_mut() else {
            return 0;
        };
        let given = max.min(*left);
        if *left != UNLIMITED {
            *left -= given;
        }
        given.saturating_add(side.overdeliver)
    }
}

impl<R: ResourceKey> EndpointProvider<R> for MockEndpoints<R> {
    fn can_connect(&self, direction: Direction) -> bool {
        self.sides.contains(direction)
    }

    fn try_insert(&mut self, direction: Direction, resource: R, max: Amount) -> Amount {
        self.record(EndpointCall::Insert {
            direction,
            resource,
            max,
        });
        let Some(side) = self.sides.get_mut(direction) else {
            return 0;
        };
        let accepted = max.min(side.insert_limit);
        side.inserted += accepted;
        accepted.saturating_add(side.overdeliver)
    }

    fn try_extract_any(&mut self, direction: Direction, max: Amount) -> (R, Amount) {
        self.record(EndpointCall::ExtractAny { direction, max });
        let Some(side) = self.sides.get_mut(direction) else {
            return (R::EMPTY, 0);
        };
        let Some((resource, _)) = side.reserve else {
            return (R::EMPTY, 0);
        };
        (resource, Self::take(side, max))
    }

    fn try_extract_exact(&mut self, direction: Direction, resource: R, max: Amount) -> Amount {
        self.record(EndpointCall::ExtractExact {
            direction,
            resource,
            max,
        });
        let Some(side) = self.sides.get_mut(direction) else {
            return 0;
        };
        match side.reserve {
            Some((offered, _)) if offered == resource => Self::take(side, max),
            _ => 0,
        }
    }
}

// ===========================================================================
// Mock links
// ===========================================================================

/// Fixed set of directions that link to network neighbours.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockLinks {
    linked: [bool; Direction::COUNT],
}

impl MockLinks {
    pub fn new(directions: &[Direction]) -> Self {
        let mut linked = [false; Direction::COUNT];
        for d in directions {
            linked[d.index()] = true;
        }
        Self { linked }
    }
}

impl NetworkLinks for MockLinks {
    fn is_pipe_link(&self, direction: Direction) -> bool {
        self.linked[direction.index()]
    }
}

// ===========================================================================
// Mock world
// ===========================================================================

/// Per-node [`MockEndpoints`], for drivers that tick many nodes.
#[derive(Debug, Clone)]
pub struct MockWorld<R> {
    pub endpoints: HashMap<NodeId, MockEndpoints<R>>,
}

impl<R> Default for MockWorld<R> {
    fn default() -> Self {
        Self {
            endpoints: HashMap::new(),
        }
    }
}

impl<R: ResourceKey> MockWorld<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, node: NodeId, endpoints: MockEndpoints<R>) {
        self.endpoints.insert(node, endpoints);
    }

    pub fn at(&self, node: NodeId) -> Option<&MockEndpoints<R>> {
        self.endpoints.get(&node)
    }

    pub fn at_mut(&mut self, node: NodeId) -> Option<&mut MockEndpoints<R>> {
        self.endpoints.get_mut(&node)
    }
}

impl<R: ResourceKey> EndpointWorld<R> for MockWorld<R> {
    fn endpoints(&mut self, node: NodeId) -> Option<&mut dyn EndpointProvider<R>> {
        self.endpoints
            .get_mut(&node)
            .map(|e| e as &mut dyn EndpointProvider<R>)
    }
}
