//! Seams to the world around a node: external endpoints and network links.

use crate::direction::Direction;
use crate::id::NodeId;
use crate::resource::{Amount, ResourceKey};

/// External storage reachable from one node position.
///
/// Every call is a bounded, synchronous local operation. Implementations must
/// never return more than `max`; callers clamp anyway.
pub trait EndpointProvider<R: ResourceKey> {
    /// Whether the neighbour in `direction` can accept or yield anything.
    fn can_connect(&self, direction: Direction) -> bool;

    /// Offer up to `max` units of `resource`. Returns how many were accepted.
    fn try_insert(&mut self, direction: Direction, resource: R, max: Amount) -> Amount;

    /// Pull up to `max` units of whatever the endpoint holds. The returned
    /// resource is meaningless when the amount is zero.
    fn try_extract_any(&mut self, direction: Direction, max: Amount) -> (R, Amount);

    /// Pull up to `max` units of exactly `resource`.
    fn try_extract_exact(&mut self, direction: Direction, resource: R, max: Amount) -> Amount;
}

/// A position with no neighbours at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEndpoints;

impl<R: ResourceKey> EndpointProvider<R> for NoEndpoints {
    fn can_connect(&self, _direction: Direction) -> bool {
        false
    }

    fn try_insert(&mut self, _direction: Direction, _resource: R, _max: Amount) -> Amount {
        0
    }

    fn try_extract_any(&mut self, _direction: Direction, _max: Amount) -> (R, Amount) {
        (R::EMPTY, 0)
    }

    fn try_extract_exact(&mut self, _direction: Direction, _resource: R, _max: Amount) -> Amount {
        0
    }
}

/// Answers whether the neighbour in a direction is another node of the same
/// network.
pub trait NetworkLinks {
    fn is_pipe_link(&self, direction: Direction) -> bool;
}

/// A node with no network neighbours.
impl NetworkLinks for () {
    fn is_pipe_link(&self, _direction: Direction) -> bool {
        false
    }
}

/// Resolves the endpoint provider at each node's position, for tick drivers
/// that own many nodes.
pub trait EndpointWorld<R: ResourceKey> {
    /// The provider positioned at `node`, or `None` if the node has no
    /// surroundings loaded.
    fn endpoints(&mut self, node: NodeId) -> Option<&mut dyn EndpointProvider<R>>;
}
