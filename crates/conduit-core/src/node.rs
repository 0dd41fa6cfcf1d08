//! The capability set every node flavor (fluid, item, energy) provides.

use serde::{Deserialize, Serialize};

use crate::connection::{ConnectionMode, ConnectionSet, CycleOutcome};
use crate::direction::{Direction, DirectionMap};
use crate::endpoint::{EndpointProvider, NetworkLinks};
use crate::event::PipeEvent;
use crate::network::NetworkData;
use crate::resource::ResourceKey;
use crate::serialize::{FormatError, NodeState, NodeSyncPayload};

/// Everything a node may touch during one tick.
///
/// The network is passed in rather than owned by the node so that membership
/// stays with the network owner.
pub struct TickContext<'a, R: ResourceKey> {
    /// The shared data of the network this node belongs to.
    pub network: &'a mut NetworkData<R>,
    /// Endpoints around the node's position.
    pub endpoints: &'a mut dyn EndpointProvider<R>,
    /// Sink for diagnostics raised this tick.
    pub events: &'a mut Vec<PipeEvent<R>>,
}

impl<'a, R: ResourceKey> TickContext<'a, R> {
    pub fn new(
        network: &'a mut NetworkData<R>,
        endpoints: &'a mut dyn EndpointProvider<R>,
        events: &'a mut Vec<PipeEvent<R>>,
    ) -> Self {
        Self {
            network,
            endpoints,
            events,
        }
    }
}

/// Externally visible classification of one side of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointKind {
    /// Links to another node of the same network.
    Pipe,
    /// A user-declared connection to an external endpoint.
    Block(ConnectionMode),
}

/// Build the per-direction classification from a node's connections.
///
/// Network links take precedence over declared connections.
pub fn classify_endpoints(
    connections: &ConnectionSet,
    links: &dyn NetworkLinks,
) -> DirectionMap<EndpointKind> {
    let mut map = DirectionMap::new();
    for connection in connections {
        map.insert(connection.direction, EndpointKind::Block(connection.mode));
    }
    for direction in Direction::ALL {
        if links.is_pipe_link(direction) {
            map.insert(direction, EndpointKind::Pipe);
        }
    }
    map
}

/// Shared tick, connection and persistence contract of pipe nodes.
///
/// Only the authoritative side holds values implementing this trait;
/// observers work from [`NodeSyncPayload`]s.
pub trait PipeNode<R: ResourceKey> {
    /// Exchange resource with the surrounding endpoints and refresh the
    /// change-detection cache.
    fn tick(&mut self, ctx: &mut TickContext<'_, R>);

    /// Declare a connection in `direction`. No-op (returns `false`) if one
    /// already exists or nothing connectable is there.
    fn add_connection(&mut self, endpoints: &dyn EndpointProvider<R>, direction: Direction) -> bool;

    /// Advance the connection in `direction` one step along
    /// `In -> InOut -> Out -> erased`.
    fn remove_connection(&mut self, direction: Direction) -> CycleOutcome;

    /// Drop connections whose endpoint has disappeared.
    fn update_connections(&mut self, endpoints: &dyn EndpointProvider<R>);

    /// Classification of all six sides, rebuilt on every call.
    fn connections(&self, links: &dyn NetworkLinks) -> DirectionMap<EndpointKind>;

    /// Read and clear the pending-sync flag.
    fn should_sync(&mut self) -> bool;

    fn save_state(&self) -> NodeState;

    fn load_state(&mut self, state: &NodeState) -> Result<(), FormatError>;

    fn sync_payload(&self, network: &NetworkData<R>) -> NodeSyncPayload<R>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;
    use crate::test_utils::MockLinks;

    #[test]
    fn classification_merges_links_and_connections() {
        let mut set = ConnectionSet::new();
        set.push(Connection::new(Direction::Up, ConnectionMode::Out));
        set.push(Connection::new(Direction::West, ConnectionMode::In));
        let links = MockLinks::new(&[Direction::East, Direction::West]);

        let map = classify_endpoints(&set, &links);

        assert_eq!(map.get(Direction::Up), Some(&EndpointKind::Block(ConnectionMode::Out)));
        assert_eq!(map.get(Direction::East), Some(&EndpointKind::Pipe));
        assert_eq!(map.get(Direction::West), Some(&EndpointKind::Pipe));
        assert_eq!(map.get(Direction::Down), None);
        assert_eq!(map.len(), 3);
    }
}
