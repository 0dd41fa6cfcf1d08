use serde::{Deserialize, Serialize};

/// The six axis-aligned directions a pipe segment can face.
///
/// Declaration order is the canonical enumeration order used when rebuilding
/// connections from saved state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Direction {
    /// Number of directions.
    pub const COUNT: usize = 6;

    /// All directions in canonical order.
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Stable index in `0..6`, matching [`Direction::ALL`].
    pub fn index(self) -> usize {
        match self {
            Direction::Down => 0,
            Direction::Up => 1,
            Direction::North => 2,
            Direction::South => 3,
            Direction::West => 4,
            Direction::East => 5,
        }
    }

    /// Lowercase name, stable across versions.
    pub fn name(self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Up => "up",
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A fixed six-slot map keyed by [`Direction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectionMap<T> {
    slots: [Option<T>; 6],
}

impl<T> Default for DirectionMap<T> {
    fn default() -> Self {
        Self {
            slots: [None, None, None, None, None, None],
        }
    }
}

impl<T> DirectionMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, direction: Direction) -> Option<&T> {
        self.slots[direction.index()].as_ref()
    }

    pub fn get_mut(&mut self, direction: Direction) -> Option<&mut T> {
        self.slots[direction.index()].as_mut()
    }

    /// The slot for `direction`, filled with `f()` if empty.
    pub fn get_or_insert_with(&mut self, direction: Direction, f: impl FnOnce() -> T) -> &mut T {
        self.slots[direction.index()].get_or_insert_with(f)
    }

    /// Set the slot for `direction`, returning the previous value.
    pub fn insert(&mut self, direction: Direction, value: T) -> Option<T> {
        self.slots[direction.index()].replace(value)
    }

    pub fn remove(&mut self, direction: Direction) -> Option<T> {
        self.slots[direction.index()].take()
    }

    pub fn contains(&self, direction: Direction) -> bool {
        self.slots[direction.index()].is_some()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    /// Occupied slots in canonical direction order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, &T)> {
        Direction::ALL
            .into_iter()
            .filter_map(|d| self.slots[d.index()].as_ref().map(|v| (d, v)))
    }
}
