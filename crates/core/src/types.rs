use std::f64::consts::SQRT_2;
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Cost of a diagonal step when the caller has no preference.
pub const DEFAULT_DIAGONAL_COST: f64 = SQRT_2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { y, x }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self { y: self.y + dy, x: self.x + dx }
    }

    pub fn manhattan_distance(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    pub fn chebyshev_distance(self, other: Pos) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Squared euclidean distance, widened so large grids cannot overflow.
    pub fn square_distance(self, other: Pos) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

bitflags! {
    /// Per-cell property set. The empty set is a blocked, unseen cell.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct CellFlags: u8 {
        /// Line of sight passes through the cell.
        const TRANSPARENT = 0b0001;
        /// Routes may step on the cell.
        const WALKABLE    = 0b0010;
        /// Inside the most recently computed field of vision.
        const VISIBLE     = 0b0100;
        /// Has been inside a global field of vision at least once.
        const EXPLORED    = 0b1000;
    }
}

impl CellFlags {
    pub const FLOOR: Self = Self::TRANSPARENT.union(Self::WALKABLE);
    pub const TERRAIN: Self = Self::TRANSPARENT.union(Self::WALKABLE);
    pub const VISION: Self = Self::VISIBLE.union(Self::EXPLORED);
}

/// Whether the first opaque cell met by a vision ray counts as seen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldOfVisionLimit {
    #[default]
    Included,
    Excluded,
}

/// Field-of-vision algorithm selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldOfVision {
    /// Bresenham rays cast from the origin to every cell on the bounding box perimeter.
    #[default]
    Basic,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteAlgorithm {
    Dijkstra,
    #[default]
    AStar,
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dijkstra => f.write_str("dijkstra"),
            Self::AStar => f.write_str("a-star"),
        }
    }
}
