//! Shortest-route search over the 8-connected square map.
//! This module exists so Dijkstra and A* share one cost model and frontier.
//! It reads terrain flags only and never mutates the map.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::*;

/// Inflation applied to the A* heuristic; nudges ties toward straighter routes.
const HEURISTIC_WEIGHT: f64 = 1.001;

/// Orthogonal neighbours first, then diagonals.
const NEIGHBOR_OFFSETS: [(i32, i32); 8] =
    [(0, -1), (1, 0), (0, 1), (-1, 0), (1, -1), (1, 1), (-1, 1), (-1, -1)];

/// Diagonal steps exist only for a finite, strictly positive cost.
pub fn diagonal_moves_enabled(diagonal_cost: f64) -> bool {
    diagonal_cost.is_finite() && diagonal_cost > 0.0
}

/// Cost of moving between two adjacent cells, `None` when the step is not a legal move.
pub fn step_cost(from: Pos, to: Pos, diagonal_cost: f64) -> Option<f64> {
    match (from.x.abs_diff(to.x), from.y.abs_diff(to.y)) {
        (1, 0) | (0, 1) => Some(1.0),
        (1, 1) if diagonal_moves_enabled(diagonal_cost) => Some(diagonal_cost),
        _ => None,
    }
}

/// Total cost of a route, `None` if any consecutive pair is not a legal step.
pub fn route_cost(path: &[Pos], diagonal_cost: f64) -> Option<f64> {
    path.windows(2).try_fold(0.0, |total, pair| {
        step_cost(pair[0], pair[1], diagonal_cost).map(|cost| total + cost)
    })
}

/// Admissible estimate of the remaining cost to `to`.
fn heuristic(from: Pos, to: Pos, diagonal_cost: f64) -> f64 {
    let dx = f64::from(from.x.abs_diff(to.x));
    let dy = f64::from(from.y.abs_diff(to.y));
    if !diagonal_moves_enabled(diagonal_cost) {
        return dx + dy;
    }
    if diagonal_cost < 1.0 {
        // Zig-zagging diagonals undercut straight moves; each step covers one cell of the long axis.
        return diagonal_cost * dx.max(dy);
    }
    let diagonal = diagonal_cost.min(2.0);
    (dx + dy) + (diagonal - 2.0) * dx.min(dy)
}

#[derive(Clone, Copy, Debug)]
struct FrontierEntry {
    priority: f64,
    cost: f64,
    seq: u64,
    idx: usize,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap pops the largest, we want the cheapest, oldest first.
        other.priority.total_cmp(&self.priority).then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-priority queue with lazy deletion: stale entries are skipped by the caller on pop.
#[derive(Default)]
struct Frontier {
    heap: BinaryHeap<FrontierEntry>,
    next_seq: u64,
}

impl Frontier {
    fn push(&mut self, idx: usize, cost: f64, priority: f64) {
        self.heap.push(FrontierEntry { priority, cost, seq: self.next_seq, idx });
        self.next_seq += 1;
    }

    fn pop(&mut self) -> Option<FrontierEntry> {
        self.heap.pop()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NodeState {
    Unseen,
    Open,
    Closed,
}

/// Per-query working arrays; nothing here outlives one route call.
struct Search {
    cost: Vec<f64>,
    previous: Vec<Option<usize>>,
    expanded: usize,
}

impl Search {
    fn new(len: usize, start: usize) -> Self {
        let mut cost = vec![f64::INFINITY; len];
        cost[start] = 0.0;
        Self { cost, previous: vec![None; len], expanded: 0 }
    }

    fn reconstruct(&self, map: &SquareMap, origin: Pos, target: Pos) -> Result<Vec<Pos>, MapError> {
        let goal = map.index(target);
        if self.cost[goal].is_infinite() {
            return Err(MapError::NoPath { origin, target });
        }
        let mut path = vec![target];
        let mut current = goal;
        while let Some(prev) = self.previous[current] {
            path.push(map.position(prev));
            current = prev;
        }
        path.reverse();
        debug_assert_eq!(path.first(), Some(&origin));
        Ok(path)
    }
}

impl SquareMap {
    /// Lowest-cost route from `origin` to `target`, both included, through walkable cells.
    ///
    /// Orthogonal steps cost `1.0`, diagonal steps cost `diagonal_cost`; a cost of zero
    /// (or any non-positive or non-finite value) forbids diagonal steps. The origin
    /// itself need not be walkable. Fails with [`MapError::NoPath`] when the target
    /// cannot be reached.
    pub fn compute_route(
        &self,
        origin: Pos,
        target: Pos,
        diagonal_cost: f64,
        algorithm: RouteAlgorithm,
    ) -> Result<Vec<Pos>, MapError> {
        self.checked_index(origin)?;
        let goal = self.checked_index(target)?;
        if origin == target {
            return Ok(vec![origin]);
        }
        if !self.cells[goal].contains(CellFlags::WALKABLE) {
            log::debug!("{algorithm} route {origin} -> {target}: target is not walkable");
            return Err(MapError::NoPath { origin, target });
        }

        let search = match algorithm {
            RouteAlgorithm::Dijkstra => self.dijkstra_search(origin, diagonal_cost),
            RouteAlgorithm::AStar => self.astar_search(origin, target, diagonal_cost),
        };
        let route = search.reconstruct(self, origin, target);
        match &route {
            Ok(path) => log::debug!(
                "{algorithm} route {origin} -> {target}: {} cells, cost {:.3}, {} nodes expanded",
                path.len(),
                search.cost[goal],
                search.expanded
            ),
            Err(_) => log::debug!(
                "{algorithm} route {origin} -> {target}: unreachable after {} nodes expanded",
                search.expanded
            ),
        }
        route
    }

    /// Walkable neighbours of `pos` with the cost of stepping onto them.
    fn successors(&self, pos: Pos, diagonal_cost: f64) -> impl Iterator<Item = (usize, f64)> + '_ {
        NEIGHBOR_OFFSETS.iter().filter_map(move |&(dx, dy)| {
            let next = pos.offset(dx, dy);
            if !self.in_bounds(next) || !self.flags_at(next).contains(CellFlags::WALKABLE) {
                return None;
            }
            step_cost(pos, next, diagonal_cost).map(|cost| (self.index(next), cost))
        })
    }

    /// Uniform-cost search until the frontier is exhausted.
    fn dijkstra_search(&self, origin: Pos, diagonal_cost: f64) -> Search {
        let start = self.index(origin);
        let mut search = Search::new(self.cells.len(), start);
        let mut frontier = Frontier::default();
        frontier.push(start, 0.0, 0.0);

        while let Some(entry) = frontier.pop() {
            if entry.cost > search.cost[entry.idx] {
                continue;
            }
            search.expanded += 1;
            for (next, step) in self.successors(self.position(entry.idx), diagonal_cost) {
                let candidate = entry.cost + step;
                if candidate < search.cost[next] {
                    search.cost[next] = candidate;
                    search.previous[next] = Some(entry.idx);
                    frontier.push(next, candidate, candidate);
                }
            }
        }
        search
    }

    /// A* search that stops as soon as the target is closed.
    fn astar_search(&self, origin: Pos, target: Pos, diagonal_cost: f64) -> Search {
        let start = self.index(origin);
        let goal = self.index(target);
        let mut search = Search::new(self.cells.len(), start);
        let mut state = vec![NodeState::Unseen; self.cells.len()];
        let mut frontier = Frontier::default();

        state[start] = NodeState::Open;
        frontier.push(start, 0.0, HEURISTIC_WEIGHT * heuristic(origin, target, diagonal_cost));

        while let Some(entry) = frontier.pop() {
            if state[entry.idx] == NodeState::Closed || entry.cost > search.cost[entry.idx] {
                continue;
            }
            state[entry.idx] = NodeState::Closed;
            search.expanded += 1;
            if entry.idx == goal {
                break;
            }
            for (next, step) in self.successors(self.position(entry.idx), diagonal_cost) {
                if state[next] == NodeState::Closed {
                    continue;
                }
                let candidate = entry.cost + step;
                if candidate < search.cost[next] {
                    search.cost[next] = candidate;
                    search.previous[next] = Some(entry.idx);
                    state[next] = NodeState::Open;
                    let estimate = heuristic(self.position(next), target, diagonal_cost);
                    frontier.push(next, candidate, candidate + HEURISTIC_WEIGHT * estimate);
                }
            }
        }
        search
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    const ALGORITHMS: [RouteAlgorithm; 2] = [RouteAlgorithm::Dijkstra, RouteAlgorithm::AStar];

    fn cost_of(path: &[Pos], diagonal_cost: f64) -> f64 {
        route_cost(path, diagonal_cost).expect("route must only use legal steps")
    }

    #[test]
    fn open_map_uses_diagonals_at_unit_cost() {
        let map = open_map(5, 5);
        for algorithm in ALGORITHMS {
            let path = map.compute_route(Pos::new(0, 0), Pos::new(4, 4), 1.0, algorithm).unwrap();
            assert_eq!(path.len(), 5, "{algorithm}");
            assert_eq!(cost_of(&path, 1.0), 4.0, "{algorithm}");
        }
    }

    #[test]
    fn zero_diagonal_cost_forbids_diagonal_steps() {
        let map = open_map(5, 5);
        for algorithm in ALGORITHMS {
            let path = map.compute_route(Pos::new(0, 0), Pos::new(4, 4), 0.0, algorithm).unwrap();
            assert_eq!(path.len(), 9, "{algorithm}");
            assert_eq!(cost_of(&path, 0.0), 8.0, "{algorithm}");
            assert!(path.windows(2).all(|pair| pair[0].manhattan_distance(pair[1]) == 1));
        }
    }

    #[test]
    fn route_endpoints_are_origin_and_target() {
        let (map, west, east) = two_rooms_fixture();
        for algorithm in ALGORITHMS {
            let path = map.compute_route(west, east, DEFAULT_DIAGONAL_COST, algorithm).unwrap();
            assert_eq!(path.first(), Some(&west));
            assert_eq!(path.last(), Some(&east));
            assert!(path.iter().skip(1).all(|&p| map.is_walkable(p).unwrap()));
        }
    }

    #[test]
    fn diagonal_only_link_is_unreachable_without_diagonals() {
        let mut map = SquareMap::new(3, 3);
        for p in [Pos::new(0, 0), Pos::new(2, 0), Pos::new(1, 1), Pos::new(0, 2), Pos::new(2, 2)] {
            map.set_cell(p, CellFlags::FLOOR).unwrap();
        }
        for algorithm in ALGORITHMS {
            assert_eq!(
                map.compute_route(Pos::new(0, 0), Pos::new(2, 2), 0.0, algorithm),
                Err(MapError::NoPath { origin: Pos::new(0, 0), target: Pos::new(2, 2) }),
            );
            let path = map
                .compute_route(Pos::new(0, 0), Pos::new(2, 2), DEFAULT_DIAGONAL_COST, algorithm)
                .unwrap();
            assert_eq!(path, vec![Pos::new(0, 0), Pos::new(1, 1), Pos::new(2, 2)]);
        }
    }

    #[test]
    fn walled_off_target_reports_no_path() {
        let map = SquareMap::from_ascii(
            "..#..\n\
             ..#..\n\
             ..#..",
        )
        .unwrap();
        for algorithm in ALGORITHMS {
            let result = map.compute_route(Pos::new(0, 1), Pos::new(4, 1), 1.0, algorithm);
            assert!(matches!(result, Err(MapError::NoPath { .. })), "{algorithm}: {result:?}");
        }
    }

    #[test]
    fn non_walkable_target_reports_no_path() {
        let (map, origin, wall) = wall_corridor_fixture();
        for algorithm in ALGORITHMS {
            assert_eq!(
                map.compute_route(origin, wall, 1.0, algorithm),
                Err(MapError::NoPath { origin, target: wall })
            );
        }
    }

    #[test]
    fn route_to_self_is_single_cell() {
        let map = SquareMap::new(3, 3);
        let p = Pos::new(1, 1);
        for algorithm in ALGORITHMS {
            assert_eq!(map.compute_route(p, p, 1.0, algorithm).unwrap(), vec![p]);
        }
    }

    #[test]
    fn out_of_range_endpoints_are_rejected() {
        let map = open_map(3, 3);
        let err = map.compute_route(Pos::new(0, 0), Pos::new(3, 0), 1.0, RouteAlgorithm::AStar);
        assert_eq!(err, Err(MapError::OutOfRange { pos: Pos::new(3, 0), width: 3, height: 3 }));
        let err = map.compute_route(Pos::new(-1, 0), Pos::new(0, 0), 1.0, RouteAlgorithm::Dijkstra);
        assert!(matches!(err, Err(MapError::OutOfRange { .. })));
    }

    #[test]
    fn route_detours_through_the_only_gap() {
        let (map, west, east) = two_rooms_fixture();
        let gap = Pos::new(5, 4);
        for algorithm in ALGORITHMS {
            let path = map.compute_route(west, east, 1.0, algorithm).unwrap();
            assert!(path.contains(&gap), "{algorithm}: {path:?}");
            // Chebyshev legs (1,1)->(5,4) and (5,4)->(10,1).
            assert_eq!(cost_of(&path, 1.0), 9.0, "{algorithm}");
        }
    }

    #[test]
    fn expensive_diagonals_fall_back_to_manhattan_cost() {
        let map = open_map(6, 6);
        for algorithm in ALGORITHMS {
            let path = map.compute_route(Pos::new(0, 0), Pos::new(3, 5), 3.0, algorithm).unwrap();
            assert_eq!(cost_of(&path, 3.0), 8.0, "{algorithm}");
        }
    }

    #[test]
    fn cheap_diagonals_zig_zag() {
        let map = open_map(5, 3);
        for algorithm in ALGORITHMS {
            let path = map.compute_route(Pos::new(0, 1), Pos::new(4, 1), 0.5, algorithm).unwrap();
            assert_eq!(cost_of(&path, 0.5), 2.0, "{algorithm}: {path:?}");
        }
    }

    #[test]
    fn non_walkable_origin_may_still_leave() {
        let (mut map, origin, _) = wall_corridor_fixture();
        map.set_empty(origin).unwrap();
        let path = map.compute_route(origin, Pos::new(3, 1), 1.0, RouteAlgorithm::AStar).unwrap();
        assert_eq!(path, vec![Pos::new(1, 1), Pos::new(2, 1), Pos::new(3, 1)]);
    }

    #[test]
    fn heuristic_never_overestimates_open_map_cost() {
        let map = open_map(7, 7);
        let origin = Pos::new(0, 0);
        for diagonal_cost in [0.0, 0.5, 1.0, DEFAULT_DIAGONAL_COST, 2.0, 3.0] {
            for target in map.positions() {
                let path =
                    map.compute_route(origin, target, diagonal_cost, RouteAlgorithm::Dijkstra).unwrap();
                let exact = cost_of(&path, diagonal_cost);
                let estimate = heuristic(origin, target, diagonal_cost);
                assert!(estimate <= exact + 1e-9, "h({target}) = {estimate} > {exact} at {diagonal_cost}");
            }
        }
    }

    #[test]
    fn step_cost_rejects_non_adjacent_cells() {
        assert_eq!(step_cost(Pos::new(0, 0), Pos::new(2, 0), 1.0), None);
        assert_eq!(step_cost(Pos::new(0, 0), Pos::new(0, 0), 1.0), None);
        assert_eq!(step_cost(Pos::new(0, 0), Pos::new(1, 1), 0.0), None);
        assert_eq!(step_cost(Pos::new(0, 0), Pos::new(1, 1), f64::INFINITY), None);
        assert_eq!(step_cost(Pos::new(0, 0), Pos::new(1, 1), 1.5), Some(1.5));
        assert_eq!(route_cost(&[Pos::new(0, 0)], 1.0), Some(0.0));
    }
}
