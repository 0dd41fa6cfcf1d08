//! The fluid pipe node: buffer, connections, and the per-tick exchange.

use conduit_core::connection::{Connection, ConnectionMode, ConnectionSet, CycleOutcome};
use conduit_core::direction::{Direction, DirectionMap};
use conduit_core::endpoint::{EndpointProvider, NetworkLinks};
use conduit_core::event::{DesyncCounters, PipeEvent};
use conduit_core::fixed::{Fixed64, amount_to_units};
use conduit_core::network::NetworkData;
use conduit_core::node::{EndpointKind, PipeNode, TickContext, classify_endpoints};
use conduit_core::resource::{Amount, ResourceKey};
use conduit_core::serialize::{FormatError, NodeState, NodeSyncPayload};

use crate::FluidKey;

/// One fluid pipe segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FluidNode {
    amount: Amount,
    connections: ConnectionSet,
    /// Network fluid as of the last completed tick.
    cached_fluid: FluidKey,
    needs_sync: bool,
    desyncs: DesyncCounters,
}

impl FluidNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a node from persisted state.
    pub fn from_state(state: &NodeState) -> Result<Self, FormatError> {
        let mut node = Self::new();
        node.load_state(state)?;
        Ok(node)
    }

    /// Decode a node from bytes produced by [`FluidNode::encode_state`].
    pub fn decode_state(data: &[u8]) -> Result<Self, FormatError> {
        Self::from_state(&NodeState::decode(data)?)
    }

    pub fn encode_state(&self) -> Result<Vec<u8>, FormatError> {
        self.save_state().encode()
    }

    /// Buffered subunits.
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Buffered amount in whole units, for display.
    pub fn amount_in_units(&self) -> Fixed64 {
        amount_to_units(self.amount)
    }

    pub fn capacity(&self, network: &NetworkData<FluidKey>) -> Amount {
        network.capacity()
    }

    pub fn fluid(&self, network: &NetworkData<FluidKey>) -> FluidKey {
        network.resource()
    }

    pub fn connection_set(&self) -> &ConnectionSet {
        &self.connections
    }

    pub fn mode(&self, direction: Direction) -> Option<ConnectionMode> {
        self.connections.get(direction).map(|c| c.mode)
    }

    /// Violations clamped by this node since it was created or loaded.
    pub fn desyncs(&self) -> DesyncCounters {
        self.desyncs
    }

    /// Flag a sync if the network fluid differs from the last one seen.
    pub(crate) fn observe_fluid(&mut self, network_fluid: FluidKey) {
        if network_fluid != self.cached_fluid {
            self.cached_fluid = network_fluid;
            self.needs_sync = true;
        }
    }

    fn interact_with_connections(&mut self, ctx: &mut TickContext<'_, FluidKey>) {
        let capacity = ctx.network.capacity();
        if self.amount > capacity {
            tracing::warn!(
                amount = self.amount,
                capacity,
                "fluid amount > node capacity, deleting some fluid"
            );
            ctx.events.push(PipeEvent::BufferOverCapacity {
                amount: self.amount,
                capacity,
            });
            self.desyncs.over_capacity = self.desyncs.over_capacity.saturating_add(1);
            self.amount = capacity;
        }
        if self.amount > 0 && ctx.network.is_empty() {
            tracing::warn!(
                amount = self.amount,
                "fluid amount > 0 but network fluid is empty, deleting fluid"
            );
            ctx.events.push(PipeEvent::BufferWithoutResource {
                amount: self.amount,
            });
            self.desyncs.without_resource = self.desyncs.without_resource.saturating_add(1);
            self.amount = 0;
        }

        // TODO: cap per-connection transfer rate once pipe tiers define one.
        for connection in &self.connections {
            let direction = connection.direction;

            if self.amount > 0 && connection.mode.can_insert() {
                let offered = self.amount;
                let fluid = ctx.network.resource();
                let accepted = ctx.endpoints.try_insert(direction, fluid, offered);
                let accepted = bounded(ctx, &mut self.desyncs, direction, offered, accepted);
                self.amount -= accepted;
            }

            if !connection.mode.can_extract() {
                continue;
            }

            if ctx.network.is_empty() {
                let (fluid, extracted) = ctx.endpoints.try_extract_any(direction, capacity);
                let extracted = bounded(ctx, &mut self.desyncs, direction, capacity, extracted);
                if extracted == 0 {
                    continue;
                }
                if fluid.is_empty() {
                    tracing::warn!(
                        %direction,
                        amount = extracted,
                        "endpoint yielded fluid without an identity, discarding"
                    );
                    ctx.events.push(PipeEvent::UnnamedExtraction {
                        direction,
                        amount: extracted,
                    });
                    self.desyncs.provider_violations =
                        self.desyncs.provider_violations.saturating_add(1);
                    continue;
                }
                if ctx.network.set_resource_if_empty(fluid) {
                    tracing::debug!(?fluid, amount = extracted, %direction, "network adopted fluid");
                    self.amount = extracted;
                    ctx.events.push(PipeEvent::ResourceAdopted {
                        resource: fluid,
                        amount: extracted,
                        direction,
                    });
                    // First claim wins; no further connections this tick.
                    break;
                }
            } else {
                let room = capacity.saturating_sub(self.amount);
                let fluid = ctx.network.resource();
                let extracted = ctx.endpoints.try_extract_exact(direction, fluid, room);
                self.amount += bounded(ctx, &mut self.desyncs, direction, room, extracted);
            }
        }
    }
}

/// Clamp an endpoint's answer to what was requested, reporting any excess.
fn bounded(
    ctx: &mut TickContext<'_, FluidKey>,
    desyncs: &mut DesyncCounters,
    direction: Direction,
    requested: Amount,
    returned: Amount,
) -> Amount {
    if returned <= requested {
        return returned;
    }
    tracing::warn!(
        %direction,
        requested,
        returned,
        "endpoint returned more than requested, clamping"
    );
    ctx.events.push(PipeEvent::ProviderOverdelivered {
        direction,
        requested,
        returned,
    });
    desyncs.provider_violations = desyncs.provider_violations.saturating_add(1);
    requested
}

impl PipeNode<FluidKey> for FluidNode {
    fn tick(&mut self, ctx: &mut TickContext<'_, FluidKey>) {
        self.interact_with_connections(ctx);
        self.observe_fluid(ctx.network.resource());
    }

    fn add_connection(
        &mut self,
        endpoints: &dyn EndpointProvider<FluidKey>,
        direction: Direction,
    ) -> bool {
        if self.connections.contains(direction) || !endpoints.can_connect(direction) {
            return false;
        }
        self.connections
            .push(Connection::new(direction, ConnectionMode::In))
    }

    fn remove_connection(&mut self, direction: Direction) -> CycleOutcome {
        self.connections.cycle(direction)
    }

    fn update_connections(&mut self, endpoints: &dyn EndpointProvider<FluidKey>) {
        // Connections are never created implicitly, only dropped when their
        // endpoint goes away.
        let dropped = self
            .connections
            .retain_directions(|direction| endpoints.can_connect(direction));
        for direction in dropped {
            tracing::debug!(%direction, "dropped connection to vanished endpoint");
        }
    }

    fn connections(&self, links: &dyn NetworkLinks) -> DirectionMap<EndpointKind> {
        classify_endpoints(&self.connections, links)
    }

    fn should_sync(&mut self) -> bool {
        std::mem::take(&mut self.needs_sync)
    }

    fn save_state(&self) -> NodeState {
        NodeState::capture(self.amount, &self.connections)
    }

    fn load_state(&mut self, state: &NodeState) -> Result<(), FormatError> {
        let connections = state.connection_set()?;
        self.amount = state.amount;
        self.connections = connections;
        self.desyncs = DesyncCounters::default();
        Ok(())
    }

    fn sync_payload(&self, network: &NetworkData<FluidKey>) -> NodeSyncPayload<FluidKey> {
        NodeSyncPayload::capture(self.amount, &self.connections, network.resource())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
