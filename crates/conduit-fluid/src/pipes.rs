//! Authoritative owner of fluid nodes and their networks.

use conduit_core::config::PipeTier;
use conduit_core::endpoint::{EndpointProvider, EndpointWorld, NoEndpoints};
use conduit_core::event::PipeEvent;
use conduit_core::id::{NetworkId, NodeId};
use conduit_core::network::{NetworkArena, NetworkData};
use conduit_core::node::{PipeNode, TickContext};
use conduit_core::resource::{Amount, ResourceKey};
use conduit_core::serialize::NodeSyncPayload;
use slotmap::{SecondaryMap, SlotMap};

use crate::{FluidKey, FluidNode};

/// Errors from node and network bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum FluidError {
    #[error("network not found: {0:?}")]
    UnknownNetwork(NetworkId),
    #[error("network still has members: {0:?}")]
    NetworkInUse(NetworkId),
    #[error("node not found: {0:?}")]
    UnknownNode(NodeId),
}

/// Owns every fluid node and network and drives their ticks.
///
/// Nodes are visited in the order they were added. Each node completes its
/// pass before the next one reads the shared network.
#[derive(Debug, Clone, Default)]
pub struct FluidPipes {
    nodes: SlotMap<NodeId, FluidNode>,
    membership: SecondaryMap<NodeId, NetworkId>,
    order: Vec<NodeId>,
    networks: NetworkArena<FluidKey>,
}

impl FluidPipes {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Networks --

    /// Create an empty network with the given per-node capacity.
    pub fn create_network(&mut self, capacity: Amount) -> NetworkId {
        self.networks.create(capacity)
    }

    pub fn create_network_for_tier(&mut self, tier: &PipeTier) -> NetworkId {
        self.networks.create(tier.capacity)
    }

    /// Restore a network saved alongside its nodes, fluid included.
    pub fn insert_network(&mut self, data: NetworkData<FluidKey>) -> NetworkId {
        self.networks.insert(data)
    }

    pub fn network(&self, id: NetworkId) -> Option<&NetworkData<FluidKey>> {
        self.networks.get(id)
    }

    pub fn network_mut(&mut self, id: NetworkId) -> Option<&mut NetworkData<FluidKey>> {
        self.networks.get_mut(id)
    }

    pub fn networks(&self) -> &NetworkArena<FluidKey> {
        &self.networks
    }

    /// Remove a network. Fails while nodes still belong to it.
    pub fn remove_network(&mut self, id: NetworkId) -> Result<NetworkData<FluidKey>, FluidError> {
        if self.membership.values().any(|n| *n == id) {
            return Err(FluidError::NetworkInUse(id));
        }
        self.networks.remove(id).ok_or(FluidError::UnknownNetwork(id))
    }

    /// Nodes belonging to `network`, in tick order.
    pub fn members(&self, network: NetworkId) -> Vec<NodeId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.membership.get(*id) == Some(&network))
            .collect()
    }

    // -- Nodes --

    /// Place a fresh node in `network`.
    pub fn add_node(&mut self, network: NetworkId) -> Result<NodeId, FluidError> {
        self.insert_node(network, FluidNode::new())
    }

    /// Place an existing (e.g. loaded) node in `network`.
    pub fn insert_node(&mut self, network: NetworkId, node: FluidNode) -> Result<NodeId, FluidError> {
        if !self.networks.contains(network) {
            return Err(FluidError::UnknownNetwork(network));
        }
        let id = self.nodes.insert(node);
        self.membership.insert(id, network);
        self.order.push(id);
        Ok(id)
    }

    pub fn remove_node(&mut self, id: NodeId) -> Option<FluidNode> {
        let node = self.nodes.remove(id)?;
        self.membership.remove(id);
        self.order.retain(|n| *n != id);
        Some(node)
    }

    /// Reassign a node to another network, as the topology owner does on
    /// merges and splits.
    pub fn move_node(&mut self, id: NodeId, network: NetworkId) -> Result<(), FluidError> {
        if !self.networks.contains(network) {
            return Err(FluidError::UnknownNetwork(network));
        }
        let slot = self.membership.get_mut(id).ok_or(FluidError::UnknownNode(id))?;
        *slot = network;
        Ok(())
    }

    pub fn node(&self, id: NodeId) -> Option<&FluidNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut FluidNode> {
        self.nodes.get_mut(id)
    }

    pub fn network_of(&self, id: NodeId) -> Option<NetworkId> {
        self.membership.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in tick order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &FluidNode)> {
        self.order
            .iter()
            .filter_map(|id| self.nodes.get(*id).map(|node| (*id, node)))
    }

    // -- Tick --

    /// Run one tick over every node, then release networks whose members
    /// are all empty. Returns the diagnostics raised.
    pub fn tick(&mut self, world: &mut dyn EndpointWorld<FluidKey>) -> Vec<PipeEvent<FluidKey>> {
        let mut events = Vec::new();

        for &id in &self.order {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            let Some(network) = self
                .membership
                .get(id)
                .and_then(|net| self.networks.get_mut(*net))
            else {
                continue;
            };
            let mut unloaded = NoEndpoints;
            let endpoints: &mut dyn EndpointProvider<FluidKey> = match world.endpoints(id) {
                Some(endpoints) => endpoints,
                None => &mut unloaded,
            };
            let mut ctx = TickContext::new(network, endpoints, &mut events);
            node.tick(&mut ctx);
        }

        self.release_drained_networks(&mut events);
        events
    }

    /// Clear the fluid of every network whose members all hold nothing.
    fn release_drained_networks(&mut self, events: &mut Vec<PipeEvent<FluidKey>>) {
        let mut holding: SecondaryMap<NetworkId, ()> = SecondaryMap::new();
        for (id, node) in self.nodes.iter() {
            if node.amount() > 0 {
                if let Some(&network) = self.membership.get(id) {
                    holding.insert(network, ());
                }
            }
        }

        let mut released: SecondaryMap<NetworkId, ()> = SecondaryMap::new();
        for (network, data) in self.networks.iter_mut() {
            if !data.is_empty() && !holding.contains_key(network) {
                tracing::debug!(?network, "network drained, releasing fluid");
                data.clear_resource();
                released.insert(network, ());
                events.push(PipeEvent::NetworkDrained { network });
            }
        }

        // Members already cached the old fluid during this tick.
        for (id, node) in self.nodes.iter_mut() {
            if let Some(&network) = self.membership.get(id) {
                if released.contains_key(network) {
                    node.observe_fluid(FluidKey::EMPTY);
                }
            }
        }
    }

    /// Poll every node's sync flag and build payloads for those that fired.
    ///
    /// A network released at the end of [`tick`](Self::tick) is reported in
    /// the same tick's poll.
    pub fn collect_sync(&mut self) -> Vec<(NodeId, NodeSyncPayload<FluidKey>)> {
        let mut payloads = Vec::new();
        for &id in &self.order {
            let Some(node) = self.nodes.get_mut(id) else {
                continue;
            };
            if !node.should_sync() {
                continue;
            }
            let Some(network) = self.membership.get(id).and_then(|n| self.networks.get(*n)) else {
                continue;
            };
            payloads.push((id, node.sync_payload(network)));
        }
        payloads
    }
}
