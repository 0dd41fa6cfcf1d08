//! Data shared by every node of one connected network.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::id::NetworkId;
use crate::resource::{Amount, ResourceKey};

/// Resource identity and per-node capacity shared across a network.
///
/// Member nodes only mutate it through [`set_resource_if_empty`]; clearing
/// the identity is left to the network lifecycle owner.
///
/// [`set_resource_if_empty`]: NetworkData::set_resource_if_empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "R: ResourceKey")]
pub struct NetworkData<R: ResourceKey> {
    resource: R,
    capacity: Amount,
}

impl<R: ResourceKey> NetworkData<R> {
    /// A network holding nothing.
    pub fn new(capacity: Amount) -> Self {
        Self {
            resource: R::EMPTY,
            capacity,
        }
    }

    /// A network that has already claimed `resource`.
    pub fn with_resource(resource: R, capacity: Amount) -> Self {
        Self { resource, capacity }
    }

    pub fn resource(&self) -> R {
        self.resource
    }

    /// Maximum subunits any single member node may hold.
    pub fn capacity(&self) -> Amount {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.resource.is_empty()
    }

    /// Claim `resource` for the network. Succeeds only when no resource is
    /// currently claimed and `resource` is not itself empty.
    pub fn set_resource_if_empty(&mut self, resource: R) -> bool {
        if !self.resource.is_empty() || resource.is_empty() {
            return false;
        }
        self.resource = resource;
        true
    }

    /// Release the claimed resource. Only the lifecycle owner calls this,
    /// once every member buffer is empty.
    pub fn clear_resource(&mut self) {
        self.resource = R::EMPTY;
    }

    pub fn set_capacity(&mut self, capacity: Amount) {
        self.capacity = capacity;
    }
}

/// Arena of networks, addressed by [`NetworkId`].
///
/// Topology maintenance (merging and splitting) belongs to whoever owns the
/// arena; members receive a handle and borrow the data per tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "R: ResourceKey")]
pub struct NetworkArena<R: ResourceKey> {
    networks: SlotMap<NetworkId, NetworkData<R>>,
}

impl<R: ResourceKey> Default for NetworkArena<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ResourceKey> NetworkArena<R> {
    pub fn new() -> Self {
        Self {
            networks: SlotMap::with_key(),
        }
    }

    /// Create an empty network with the given per-node capacity.
    pub fn create(&mut self, capacity: Amount) -> NetworkId {
        self.networks.insert(NetworkData::new(capacity))
    }

    pub fn insert(&mut self, data: NetworkData<R>) -> NetworkId {
        self.networks.insert(data)
    }

    pub fn get(&self, id: NetworkId) -> Option<&NetworkData<R>> {
        self.networks.get(id)
    }

    pub fn get_mut(&mut self, id: NetworkId) -> Option<&mut NetworkData<R>> {
        self.networks.get_mut(id)
    }

    pub fn remove(&mut self, id: NetworkId) -> Option<NetworkData<R>> {
        self.networks.remove(id)
    }

    pub fn contains(&self, id: NetworkId) -> bool {
        self.networks.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NetworkId, &NetworkData<R>)> {
        self.networks.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (NetworkId, &mut NetworkData<R>)> {
        self.networks.iter_mut()
    }
}
