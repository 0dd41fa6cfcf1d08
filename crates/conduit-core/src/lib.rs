//! Conduit Core -- the resource-agnostic framework for pipe networks.
//!
//! A pipe network is a set of joined nodes sharing one resource identity and
//! one per-node capacity. Each node buffers a quantity locally and exchanges
//! resource with external endpoints through directional connections.
//!
//! # Tick Contract
//!
//! Ticks are driven by a single authoritative thread. For each node the
//! driver borrows the node's [`network::NetworkData`], resolves the
//! [`endpoint::EndpointProvider`] at its position, and calls
//! [`node::PipeNode::tick`]. A node finishes its whole pass before the next
//! node reads the network.
//!
//! # Key Types
//!
//! - [`connection::ConnectionSet`] -- Ordered, direction-unique connections
//!   with the `In -> InOut -> Out -> erased` toggle cycle.
//! - [`network::NetworkArena`] -- Slotmap of networks addressed by
//!   [`id::NetworkId`].
//! - [`node::PipeNode`] -- Capability trait shared by every node flavor.
//! - [`event::PipeEvent`] -- Diagnostics for clamped desyncs.
//! - [`serialize`] -- Versioned bitcode payloads for saving and syncing.
//! - [`config::PipeConfig`] -- Pipe tiers loaded from data files.

pub mod config;
pub mod connection;
pub mod direction;
pub mod endpoint;
pub mod event;
pub mod fixed;
pub mod id;
pub mod network;
pub mod node;
pub mod resource;
pub mod serialize;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
