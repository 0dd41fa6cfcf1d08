//! Fluid pipes for the Conduit framework.
//!
//! Each [`FluidNode`] buffers up to its network's capacity of one fluid and
//! exchanges it with neighbouring tanks and machines every tick. The network
//! claims a fluid the first time any member pulls one in while it is empty.
//!
//! # Design
//!
//! - Nodes never own their network. [`FluidPipes`] owns both and lends each
//!   node its network for the duration of its tick.
//! - Per tick, connections are serviced in declaration order: insert first,
//!   then extract.
//! - Inconsistent buffers are clamped at the top of the tick and reported as
//!   [`PipeEvent`](conduit_core::event::PipeEvent)s, never panics.
//! - Observers receive [`NodeSyncPayload`](conduit_core::serialize::NodeSyncPayload)s
//!   and keep a [`FluidNodeView`], which cannot simulate.

pub mod node;
pub mod pipes;
pub mod view;

pub use node::FluidNode;
pub use pipes::{FluidError, FluidPipes};
pub use view::FluidNodeView;

use conduit_core::resource::ResourceKey;
use serde::{Deserialize, Serialize};

/// Identifies a fluid kind. `FluidKey(0)` is the empty fluid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FluidKey(pub u32);

impl ResourceKey for FluidKey {
    const EMPTY: Self = FluidKey(0);
}

impl Default for FluidKey {
    fn default() -> Self {
        Self::EMPTY
    }
}
