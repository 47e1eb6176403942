//! Plain-text map codec for fixtures, level sketches and the command-line tools.
//!
//! One character per cell, one line per row:
//! - `.` floor (transparent and walkable)
//! - `#` wall (no flags)
//! - `=` window or chasm (transparent only)
//! - `"` foliage or curtain (walkable only)

use std::collections::BTreeSet;

use super::*;

const FLOOR: char = '.';
const WALL: char = '#';
const WINDOW: char = '=';
const FOLIAGE: char = '"';

const ORIGIN: char = '@';
const PATH: char = '*';
const REMEMBERED: char = '-';
const UNKNOWN: char = ' ';

fn terrain_char(flags: CellFlags) -> char {
    let transparent = flags.contains(CellFlags::TRANSPARENT);
    let walkable = flags.contains(CellFlags::WALKABLE);
    match (transparent, walkable) {
        (true, true) => FLOOR,
        (true, false) => WINDOW,
        (false, true) => FOLIAGE,
        (false, false) => WALL,
    }
}

fn terrain_flags(c: char) -> Option<CellFlags> {
    match c {
        FLOOR => Some(CellFlags::FLOOR),
        WALL => Some(CellFlags::empty()),
        WINDOW => Some(CellFlags::TRANSPARENT),
        FOLIAGE => Some(CellFlags::WALKABLE),
        _ => None,
    }
}

impl SquareMap {
    /// Parses a rectangular text map. Blank lines before and after the map are ignored.
    pub fn from_ascii(text: &str) -> Result<Self, MapError> {
        let lines: Vec<(usize, &str)> = text.lines().enumerate().map(|(i, l)| (i + 1, l)).collect();
        let first = lines.iter().position(|(_, l)| !l.trim().is_empty());
        let last = lines.iter().rposition(|(_, l)| !l.trim().is_empty());
        let (Some(first), Some(last)) = (first, last) else {
            return Err(MapError::Parse { line: 1, message: "map has no rows".to_string() });
        };
        let rows = &lines[first..=last];

        let width = rows[0].1.chars().count();
        let mut map = SquareMap::new(width, rows.len());
        for (y, &(line, row)) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(MapError::Parse {
                    line,
                    message: format!("expected {width} cells, found {found}"),
                });
            }
            for (x, c) in row.chars().enumerate() {
                let flags = terrain_flags(c).ok_or_else(|| MapError::Parse {
                    line,
                    message: format!("unknown cell {c:?} at column {}", x + 1),
                })?;
                map.cells[y * width + x] = flags;
            }
        }
        Ok(map)
    }

    /// Terrain only, one line per row, each terminated by a newline.
    pub fn to_ascii(&self) -> String {
        self.render(|_, flags| terrain_char(flags))
    }

    /// Terrain with vision state: `@` origin, `*` route, `-` remembered, blank unexplored.
    pub fn render_overlay(&self, origin: Pos, path: &[Pos]) -> String {
        let path: BTreeSet<Pos> = path.iter().copied().collect();
        self.render(|pos, flags| {
            if pos == origin {
                ORIGIN
            } else if path.contains(&pos) {
                PATH
            } else if flags.contains(CellFlags::VISIBLE) {
                terrain_char(flags)
            } else if flags.contains(CellFlags::EXPLORED) {
                REMEMBERED
            } else {
                UNKNOWN
            }
        })
    }

    fn render(&self, glyph: impl Fn(Pos, CellFlags) -> char) -> String {
        let mut text = String::with_capacity((self.width + 1) * self.height);
        for (idx, &flags) in self.cells.iter().enumerate() {
            text.push(glyph(self.position(idx), flags));
            if (idx + 1) % self.width == 0 {
                text.push('\n');
            }
        }
        text
    }
}
