//! Field-of-vision and line-of-sight calculations for the square map.
//! This module exists to keep sight rules deterministic and isolated from routing.
//! It only ever writes the `VISIBLE` and `EXPLORED` flags.

use super::*;

/// Integer Bresenham line between two cells, both endpoints included.
#[derive(Clone, Debug)]
pub struct Line {
    current: Pos,
    end: Pos,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl Line {
    pub fn new(start: Pos, end: Pos) -> Self {
        let dx = (end.x - start.x).abs();
        let dy = -(end.y - start.y).abs();
        Self {
            current: start,
            end,
            dx,
            dy,
            sx: if start.x < end.x { 1 } else { -1 },
            sy: if start.y < end.y { 1 } else { -1 },
            err: dx + dy,
            done: false,
        }
    }
}

impl Iterator for Line {
    type Item = Pos;

    fn next(&mut self) -> Option<Pos> {
        if self.done {
            return None;
        }
        let point = self.current;
        if point == self.end {
            self.done = true;
            return Some(point);
        }
        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.current.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.current.y += self.sy;
        }
        Some(point)
    }
}

/// Inclusive box the rays are cast to, already clipped to the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct VisionBox {
    min: Pos,
    max: Pos,
}

impl VisionBox {
    fn around(map: &SquareMap, origin: Pos, max_radius: i32) -> Self {
        let last = Pos { y: map.height as i32 - 1, x: map.width as i32 - 1 };
        if max_radius <= 0 {
            return Self { min: Pos { y: 0, x: 0 }, max: last };
        }
        Self {
            min: Pos {
                y: origin.y.saturating_sub(max_radius).max(0),
                x: origin.x.saturating_sub(max_radius).max(0),
            },
            max: Pos {
                y: origin.y.saturating_add(max_radius).min(last.y),
                x: origin.x.saturating_add(max_radius).min(last.x),
            },
        }
    }

    fn contains(&self, pos: Pos) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }

    /// Perimeter cells, each listed once.
    fn perimeter(&self) -> Vec<Pos> {
        let mut cells = Vec::new();
        for x in self.min.x..=self.max.x {
            cells.push(Pos { y: self.min.y, x });
            if self.max.y != self.min.y {
                cells.push(Pos { y: self.max.y, x });
            }
        }
        for y in (self.min.y + 1)..self.max.y {
            cells.push(Pos { y, x: self.min.x });
            if self.max.x != self.min.x {
                cells.push(Pos { y, x: self.max.x });
            }
        }
        cells
    }
}

/// Scratch state of one field-of-vision computation.
struct VisionPass {
    origin: Pos,
    radius_sq: Option<i64>,
    limit: FieldOfVisionLimit,
    flags: CellFlags,
    seen: Vec<bool>,
}

impl VisionPass {
    fn in_radius(&self, pos: Pos) -> bool {
        self.radius_sq.is_none_or(|r| self.origin.square_distance(pos) <= r)
    }

    fn mark(&mut self, map: &mut SquareMap, pos: Pos) {
        map.mark(pos, self.flags);
        self.seen[map.index(pos)] = true;
    }

    fn cast_ray(&mut self, map: &mut SquareMap, target: Pos) {
        for pos in Line::new(self.origin, target).skip(1) {
            if !self.in_radius(pos) {
                return;
            }
            if map.flags_at(pos).contains(CellFlags::TRANSPARENT) {
                self.mark(map, pos);
            } else {
                if self.limit == FieldOfVisionLimit::Included {
                    self.mark(map, pos);
                }
                return;
            }
        }
    }

    /// Lights opaque cells hugging lit floor on the outward side of one quadrant.
    fn light_quadrant_walls(&mut self, map: &mut SquareMap, quadrant: VisionBox, dx: i32, dy: i32) {
        for y in quadrant.min.y..=quadrant.max.y {
            for x in quadrant.min.x..=quadrant.max.x {
                let pos = Pos { y, x };
                if !self.seen[map.index(pos)] || !map.flags_at(pos).contains(CellFlags::TRANSPARENT) {
                    continue;
                }
                for next in [pos.offset(dx, 0), pos.offset(0, dy), pos.offset(dx, dy)] {
                    if quadrant.contains(next)
                        && self.in_radius(next)
                        && !map.flags_at(next).contains(CellFlags::TRANSPARENT)
                    {
                        self.mark(map, next);
                    }
                }
            }
        }
    }
}

impl SquareMap {
    /// Whether every cell strictly between `from` and `to` on their line is transparent.
    pub fn has_line_of_sight(&self, from: Pos, to: Pos) -> Result<bool, MapError> {
        self.checked_index(from)?;
        self.checked_index(to)?;
        Ok(Line::new(from, to)
            .skip(1)
            .take_while(|&p| p != to)
            .all(|p| self.flags_at(p).contains(CellFlags::TRANSPARENT)))
    }

    /// Recomputes the field of vision from `origin`, marking seen cells `VISIBLE` and `EXPLORED`.
    ///
    /// Previous `VISIBLE` flags are cleared first. A `max_radius` of zero or less means
    /// the whole map is in range. An origin outside the map leaves nothing visible.
    pub fn compute_field_of_vision(
        &mut self,
        origin: Pos,
        max_radius: i32,
        limit: FieldOfVisionLimit,
        algorithm: FieldOfVision,
    ) {
        self.clear_field_of_vision();
        self.run_field_of_vision(origin, max_radius, limit, algorithm, CellFlags::VISION);
    }

    /// Adds cells seen from `origin` to the current field of vision without exploring them.
    ///
    /// Used for temporary sight, such as looking through a window, on top of a
    /// previous [`SquareMap::compute_field_of_vision`] call.
    pub fn compute_local_field_of_vision(
        &mut self,
        origin: Pos,
        max_radius: i32,
        limit: FieldOfVisionLimit,
        algorithm: FieldOfVision,
    ) {
        self.run_field_of_vision(origin, max_radius, limit, algorithm, CellFlags::VISIBLE);
    }

    fn run_field_of_vision(
        &mut self,
        origin: Pos,
        max_radius: i32,
        limit: FieldOfVisionLimit,
        algorithm: FieldOfVision,
        flags: CellFlags,
    ) {
        if !self.in_bounds(origin) {
            log::trace!("field of vision origin {origin} is outside the map");
            return;
        }
        let lit = match algorithm {
            FieldOfVision::Basic => self.basic_field_of_vision(origin, max_radius, limit, flags),
        };
        log::trace!(
            "field of vision from {origin} (radius {max_radius}, {limit:?}, {algorithm:?}): {lit} cells"
        );
    }

    fn basic_field_of_vision(
        &mut self,
        origin: Pos,
        max_radius: i32,
        limit: FieldOfVisionLimit,
        flags: CellFlags,
    ) -> usize {
        let bounds = VisionBox::around(self, origin, max_radius);
        let radius_sq = (max_radius > 0).then(|| i64::from(max_radius) * i64::from(max_radius));
        let mut pass =
            VisionPass { origin, radius_sq, limit, flags, seen: vec![false; self.cells.len()] };

        pass.mark(self, origin);
        for target in bounds.perimeter() {
            pass.cast_ray(self, target);
        }

        if limit == FieldOfVisionLimit::Included {
            let quadrants = [
                (VisionBox { min: bounds.min, max: origin }, -1, -1),
                (
                    VisionBox {
                        min: Pos { y: bounds.min.y, x: origin.x },
                        max: Pos { y: origin.y, x: bounds.max.x },
                    },
                    1,
                    -1,
                ),
                (
                    VisionBox {
                        min: Pos { y: origin.y, x: bounds.min.x },
                        max: Pos { y: bounds.max.y, x: origin.x },
                    },
                    -1,
                    1,
                ),
                (VisionBox { min: origin, max: bounds.max }, 1, 1),
            ];
            for (quadrant, dx, dy) in quadrants {
                pass.light_quadrant_walls(self, quadrant, dx, dy);
            }
        }

        pass.seen.iter().filter(|&&lit| lit).count()
    }
}
