//! Shared primitive types used across the entire simulation.

use serde::{Deserialize, Serialize};

/// A scheduler tick. Several ticks compose one turn.
pub type Tick = u64;

/// A simulation turn. One turn = one in-game day.
pub type Turn = u64;

/// Stable identifier of a map object, as written in the config document.
pub type ObjectId = String;

/// Stable identifier of a zone.
pub type ZoneId = String;

/// An integer grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl Tile {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    /// Orthogonal (4-neighbour) adjacency.
    pub fn is_adjacent(self, other: Tile) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }

    pub fn manhattan(self, other: Tile) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A sub-tile position used by the renderer while a step is animating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}
