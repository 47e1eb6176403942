//! Error type shared by every fallible map operation.

use crate::types::Pos;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum MapError {
    /// A coordinate lies outside the grid.
    #[error("position {pos} is outside the {width}x{height} map")]
    OutOfRange { pos: Pos, width: usize, height: usize },

    /// The target cannot be reached from the origin through walkable cells.
    #[error("no route from {origin} to {target}")]
    NoPath { origin: Pos, target: Pos },

    /// ASCII map text could not be decoded.
    #[error("invalid map text at line {line}: {message}")]
    Parse { line: usize, message: String },
}
