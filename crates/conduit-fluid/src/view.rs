//! Observer-side projection of a fluid node.

use conduit_core::connection::{ConnectionMode, ConnectionSet};
use conduit_core::direction::Direction;
use conduit_core::fixed::{Fixed64, amount_to_units};
use conduit_core::resource::Amount;
use conduit_core::serialize::{FormatError, NodeSyncPayload};

use crate::FluidKey;

/// Read-only copy of a node, updated only from sync payloads.
///
/// Deliberately has no tick: observers never simulate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FluidNodeView {
    amount: Amount,
    fluid: FluidKey,
    connections: ConnectionSet,
}

impl FluidNodeView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_payload(payload: &NodeSyncPayload<FluidKey>) -> Result<Self, FormatError> {
        let mut view = Self::new();
        view.apply(payload)?;
        Ok(view)
    }

    /// Replace the projection with `payload`. On error the view is unchanged.
    pub fn apply(&mut self, payload: &NodeSyncPayload<FluidKey>) -> Result<(), FormatError> {
        self.connections = payload.connection_set()?;
        self.amount = payload.amount;
        self.fluid = payload.resource;
        Ok(())
    }

    /// Decode and apply an encoded payload.
    pub fn apply_bytes(&mut self, data: &[u8]) -> Result<(), FormatError> {
        let payload = NodeSyncPayload::<FluidKey>::decode(data)?;
        self.apply(&payload)
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn amount_in_units(&self) -> Fixed64 {
        amount_to_units(self.amount)
    }

    pub fn fluid(&self) -> FluidKey {
        self.fluid
    }

    pub fn connection_set(&self) -> &ConnectionSet {
        &self.connections
    }

    pub fn mode(&self, direction: Direction) -> Option<ConnectionMode> {
        self.connections.get(direction).map(|c| c.mode)
    }
}
