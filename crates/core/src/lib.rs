//! Square grid world model: terrain flags, field of vision and route finding.

pub mod error;
pub mod grid;
pub mod types;

pub use error::MapError;
pub use grid::{Line, SquareMap, diagonal_moves_enabled, route_cost, step_cost};
pub use types::*;
