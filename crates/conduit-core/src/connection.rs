//! Directional links from a node to external (non-network) endpoints.

use serde::{Deserialize, Serialize};

use crate::direction::Direction;

/// Which way resource may flow through a connection, seen from the network.
///
/// `In` pushes network contents into the endpoint, `Out` pulls from it,
/// `InOut` does both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionMode {
    In,
    InOut,
    Out,
}

impl ConnectionMode {
    /// Whether the node may insert into the endpoint.
    pub fn can_insert(self) -> bool {
        matches!(self, ConnectionMode::In | ConnectionMode::InOut)
    }

    /// Whether the node may extract from the endpoint.
    pub fn can_extract(self) -> bool {
        matches!(self, ConnectionMode::Out | ConnectionMode::InOut)
    }

    /// The mode after one more toggle request, or `None` when the connection
    /// should be erased.
    pub fn next(self) -> Option<ConnectionMode> {
        match self {
            ConnectionMode::In => Some(ConnectionMode::InOut),
            ConnectionMode::InOut => Some(ConnectionMode::Out),
            ConnectionMode::Out => None,
        }
    }

    /// Wire byte: `In=0`, `InOut=1`, `Out=2`.
    pub fn to_byte(self) -> u8 {
        match self {
            ConnectionMode::In => 0,
            ConnectionMode::InOut => 1,
            ConnectionMode::Out => 2,
        }
    }

    /// Inverse of [`ConnectionMode::to_byte`]. Unknown bytes yield `None`.
    pub fn from_byte(byte: u8) -> Option<ConnectionMode> {
        match byte {
            0 => Some(ConnectionMode::In),
            1 => Some(ConnectionMode::InOut),
            2 => Some(ConnectionMode::Out),
            _ => None,
        }
    }
}

/// One user-declared link in a fixed direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub direction: Direction,
    pub mode: ConnectionMode,
}

impl Connection {
    pub fn new(direction: Direction, mode: ConnectionMode) -> Self {
        Self { direction, mode }
    }
}

/// Ordered set of connections with at most one entry per direction.
///
/// Order is the service order of the tick: the first connection gets first
/// pick when the buffer cannot satisfy every neighbour.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSet {
    entries: Vec<Connection>,
}

/// Result of [`ConnectionSet::cycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No connection in that direction; nothing changed.
    Absent,
    /// The connection now has this mode.
    Changed(ConnectionMode),
    /// The connection was erased.
    Removed,
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Connection> {
        self.entries.iter()
    }

    pub fn get(&self, direction: Direction) -> Option<&Connection> {
        self.entries.iter().find(|c| c.direction == direction)
    }

    pub fn contains(&self, direction: Direction) -> bool {
        self.get(direction).is_some()
    }

    /// Append a connection. Refuses (returns `false`) a duplicate direction.
    pub fn push(&mut self, connection: Connection) -> bool {
        if self.contains(connection.direction) {
            return false;
        }
        self.entries.push(connection);
        true
    }

    /// Advance the mode of the connection in `direction` one step along
    /// `In -> InOut -> Out -> erased`.
    pub fn cycle(&mut self, direction: Direction) -> CycleOutcome {
        let Some(index) = self.entries.iter().position(|c| c.direction == direction) else {
            return CycleOutcome::Absent;
        };
        match self.entries[index].mode.next() {
            Some(mode) => {
                self.entries[index].mode = mode;
                CycleOutcome::Changed(mode)
            }
            None => {
                self.entries.remove(index);
                CycleOutcome::Removed
            }
        }
    }

    /// Keep only connections for which `keep` returns `true`, preserving
    /// order. Returns the directions that were dropped.
    pub fn retain_directions(&mut self, mut keep: impl FnMut(Direction) -> bool) -> Vec<Direction> {
        let mut dropped = Vec::new();
        let mut write = 0;
        for read in 0..self.entries.len() {
            let connection = self.entries[read];
            if keep(connection.direction) {
                self.entries[write] = connection;
                write += 1;
            } else {
                dropped.push(connection.direction);
            }
        }
        self.entries.truncate(write);
        dropped
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<'a> IntoIterator for &'a ConnectionSet {
    type Item = &'a Connection;
    type IntoIter = std::slice::Iter<'a, Connection>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_capabilities() {
        assert!(ConnectionMode::In.can_insert());
        assert!(!ConnectionMode::In.can_extract());
        assert!(ConnectionMode::InOut.can_insert());
        assert!(ConnectionMode::InOut.can_extract());
        assert!(!ConnectionMode::Out.can_insert());
        assert!(ConnectionMode::Out.can_extract());
    }

    #[test]
    fn mode_bytes() {
        for mode in [ConnectionMode::In, ConnectionMode::InOut, ConnectionMode::Out] {
            assert_eq!(ConnectionMode::from_byte(mode.to_byte()), Some(mode));
        }
        assert_eq!(ConnectionMode::In.to_byte(), 0);
        assert_eq!(ConnectionMode::InOut.to_byte(), 1);
        assert_eq!(ConnectionMode::Out.to_byte(), 2);
        assert_eq!(ConnectionMode::from_byte(3), None);
        assert_eq!(ConnectionMode::from_byte(255), None);
    }

    #[test]
    fn push_refuses_duplicate_direction() {
        let mut set = ConnectionSet::new();
        assert!(set.push(Connection::new(Direction::Up, ConnectionMode::In)));
        assert!(!set.push(Connection::new(Direction::Up, ConnectionMode::Out)));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(Direction::Up).unwrap().mode, ConnectionMode::In);
    }

    #[test]
    fn cycle_walks_the_mode_sequence() {
        let mut set = ConnectionSet::new();
        set.push(Connection::new(Direction::North, ConnectionMode::In));

        assert_eq!(set.cycle(Direction::North), CycleOutcome::Changed(ConnectionMode::InOut));
        assert_eq!(set.cycle(Direction::North), CycleOutcome::Changed(ConnectionMode::Out));
        assert_eq!(set.cycle(Direction::North), CycleOutcome::Removed);
        assert_eq!(set.cycle(Direction::North), CycleOutcome::Absent);
        assert!(set.is_empty());
    }

    #[test]
    fn retain_preserves_order_of_survivors() {
        let mut set = ConnectionSet::new();
        for d in [Direction::East, Direction::Down, Direction::West, Direction::Up] {
            set.push(Connection::new(d, ConnectionMode::In));
        }

        let dropped = set.retain_directions(|d| d != Direction::Down && d != Direction::Up);

        assert_eq!(dropped, vec![Direction::Down, Direction::Up]);
        let order: Vec<_> = set.iter().map(|c| c.direction).collect();
        assert_eq!(order, vec![Direction::East, Direction::West]);
    }
}
