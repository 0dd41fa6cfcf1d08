//! Persisted and transmitted node payloads.
//!
//! Both payloads are encoded with `bitcode` behind a versioned header so a
//! stale or foreign blob is rejected before any field is trusted.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::connection::{Connection, ConnectionMode, ConnectionSet};
use crate::direction::Direction;
use crate::resource::{Amount, ResourceKey};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number of a persisted node state.
pub const NODE_STATE_MAGIC: u32 = 0xC0D7_0001;

/// Magic number of a transmitted sync payload.
pub const NODE_SYNC_MAGIC: u32 = 0xC0D7_0002;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from encoding or decoding node payloads.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
    #[error("invalid magic number 0x{0:08X}")]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("payload from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("unknown connection mode byte {byte} for direction {direction}")]
    UnknownConnectionMode { direction: Direction, byte: u8 },
    #[error("direction {0} appears more than once")]
    DuplicateDirection(Direction),
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Header prepended to every payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadHeader {
    pub magic: u32,
    pub version: u32,
}

impl PayloadHeader {
    pub fn new(magic: u32) -> Self {
        Self {
            magic,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self, expected_magic: u32) -> Result<(), FormatError> {
        if self.magic != expected_magic {
            return Err(FormatError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(FormatError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(FormatError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    header: PayloadHeader,
    body: T,
}

fn encode<T: Serialize>(magic: u32, body: &T) -> Result<Vec<u8>, FormatError> {
    let envelope = Envelope {
        header: PayloadHeader::new(magic),
        body,
    };
    bitcode::serialize(&envelope).map_err(|e| FormatError::Encode(e.to_string()))
}

fn decode<T: DeserializeOwned>(magic: u32, data: &[u8]) -> Result<T, FormatError> {
    let envelope: Envelope<T> =
        bitcode::deserialize(data).map_err(|e| FormatError::Decode(e.to_string()))?;
    envelope.header.validate(magic)?;
    Ok(envelope.body)
}

// ---------------------------------------------------------------------------
// Connection encoding
// ---------------------------------------------------------------------------

/// Encode connections as `(direction, mode byte)` pairs in service order.
pub fn encode_connections(connections: &ConnectionSet) -> Vec<(Direction, u8)> {
    connections
        .iter()
        .map(|c| (c.direction, c.mode.to_byte()))
        .collect()
}

/// Rebuild a connection set from encoded pairs.
///
/// The result is in canonical direction order, whatever order the pairs were
/// written in. Duplicate directions and unknown mode bytes are rejected.
pub fn decode_connections(pairs: &[(Direction, u8)]) -> Result<ConnectionSet, FormatError> {
    let mut seen = [false; Direction::COUNT];
    for &(direction, _) in pairs {
        if std::mem::replace(&mut seen[direction.index()], true) {
            return Err(FormatError::DuplicateDirection(direction));
        }
    }

    let mut set = ConnectionSet::new();
    for direction in Direction::ALL {
        let Some(&(_, byte)) = pairs.iter().find(|(d, _)| *d == direction) else {
            continue;
        };
        let mode = ConnectionMode::from_byte(byte)
            .ok_or(FormatError::UnknownConnectionMode { direction, byte })?;
        set.push(Connection::new(direction, mode));
    }
    Ok(set)
}

// ---------------------------------------------------------------------------
// Persisted state
// ---------------------------------------------------------------------------

/// A node's own persisted fields. The network's resource identity is not
/// included; it belongs to the network and is saved with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeState {
    pub amount: Amount,
    pub connections: Vec<(Direction, u8)>,
}

impl NodeState {
    pub fn capture(amount: Amount, connections: &ConnectionSet) -> Self {
        Self {
            amount,
            connections: encode_connections(connections),
        }
    }

    /// Validated connection set in canonical order.
    pub fn connection_set(&self) -> Result<ConnectionSet, FormatError> {
        decode_connections(&self.connections)
    }

    pub fn encode(&self) -> Result<Vec<u8>, FormatError> {
        encode(NODE_STATE_MAGIC, self)
    }

    /// Decode and validate a persisted state.
    pub fn decode(data: &[u8]) -> Result<Self, FormatError> {
        let state: NodeState = decode(NODE_STATE_MAGIC, data)?;
        state.connection_set()?;
        Ok(state)
    }
}

// ---------------------------------------------------------------------------
// Sync payload
// ---------------------------------------------------------------------------

/// What observers without access to the shared network receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "R: ResourceKey")]
pub struct NodeSyncPayload<R: ResourceKey> {
    pub amount: Amount,
    pub connections: Vec<(Direction, u8)>,
    /// The network's current resource identity.
    pub resource: R,
}

impl<R: ResourceKey> NodeSyncPayload<R> {
    pub fn capture(amount: Amount, connections: &ConnectionSet, resource: R) -> Self {
        Self {
            amount,
            connections: encode_connections(connections),
            resource,
        }
    }

    pub fn connection_set(&self) -> Result<ConnectionSet, FormatError> {
        decode_connections(&self.connections)
    }

    pub fn encode(&self) -> Result<Vec<u8>, FormatError> {
        encode(NODE_SYNC_MAGIC, self)
    }

    pub fn decode(data: &[u8]) -> Result<Self, FormatError> {
        let payload: NodeSyncPayload<R> = decode(NODE_SYNC_MAGIC, data)?;
        payload.connection_set()?;
        Ok(payload)
    }
}
