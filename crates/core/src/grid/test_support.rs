//! Shared test fixtures for the `grid` submodule test suites.
//! This module exists to avoid repeating map setup across vision and routing tests.
//! It does not own production map logic.

use super::*;

pub(super) fn open_map(width: usize, height: usize) -> SquareMap {
    let mut map = SquareMap::new(width, height);
    map.clear(CellFlags::FLOOR);
    map
}

/// Straight corridor with one wall cell across it: `(map, origin, wall)`.
pub(super) fn wall_corridor_fixture() -> (SquareMap, Pos, Pos) {
    let map = SquareMap::from_ascii(
        "###########\n\
         #...#.....#\n\
         ###########",
    )
    .expect("fixture must parse");
    (map, Pos::new(1, 1), Pos::new(4, 1))
}

/// Two rooms joined by a single gap in the bottom row: `(map, west, east)`.
pub(super) fn two_rooms_fixture() -> (SquareMap, Pos, Pos) {
    let map = SquareMap::from_ascii(
        "#############\n\
         #....#......#\n\
         #....#......#\n\
         #....#......#\n\
         #...........#\n\
         #############",
    )
    .expect("fixture must parse");
    (map, Pos::new(1, 1), Pos::new(10, 1))
}
