use std::f64::consts::SQRT_2;

use anyhow::{Result, bail};
use clap::Parser;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use squaremap::{
    CellFlags, FieldOfVision, FieldOfVisionLimit, MapError, Pos, RouteAlgorithm, SquareMap,
    route_cost,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    /// Number of random maps to check
    #[arg(short, long, default_value_t = 500)]
    maps: u32,
    /// Largest map side
    #[arg(long, default_value_t = 24)]
    max_size: usize,
}

const DIAGONAL_COSTS: [f64; 6] = [0.0, 0.5, 1.0, SQRT_2, 1.5, 2.0];

fn choose<T: Copy>(rng: &mut ChaCha8Rng, slice: &[T]) -> T {
    slice[rng.next_u64() as usize % slice.len()]
}

fn random_map(rng: &mut ChaCha8Rng, max_size: usize) -> SquareMap {
    let side = max_size.max(2) - 1;
    let width = 2 + rng.next_u64() as usize % side;
    let height = 2 + rng.next_u64() as usize % side;
    let wall_percent = rng.next_u64() % 45;
    let mut map = SquareMap::new(width, height);
    for pos in map.positions() {
        let roll = rng.next_u64() % 100;
        let flags = if roll >= wall_percent {
            CellFlags::FLOOR
        } else {
            choose(rng, &[CellFlags::empty(), CellFlags::TRANSPARENT, CellFlags::WALKABLE])
        };
        // Positions come from the map itself.
        let _ = map.set_cell(pos, flags);
    }
    map
}

fn random_pos(rng: &mut ChaCha8Rng, map: &SquareMap) -> Pos {
    let x = rng.next_u64() as usize % map.width();
    let y = rng.next_u64() as usize % map.height();
    Pos::new(x as i32, y as i32)
}

fn check_routes(map: &SquareMap, origin: Pos, target: Pos, diagonal_cost: f64) -> Result<()> {
    let dijkstra = map.compute_route(origin, target, diagonal_cost, RouteAlgorithm::Dijkstra);
    let astar = map.compute_route(origin, target, diagonal_cost, RouteAlgorithm::AStar);
    let (best, found) = match (dijkstra, astar) {
        (Ok(best), Ok(found)) => (best, found),
        (Err(MapError::NoPath { .. }), Err(MapError::NoPath { .. })) => return Ok(()),
        (dijkstra, astar) => {
            bail!("Invariant failed: dijkstra {dijkstra:?} but a-star {astar:?}")
        }
    };
    for path in [&best, &found] {
        if path.first() != Some(&origin) || path.last() != Some(&target) {
            bail!("Invariant failed: route {path:?} does not join {origin} and {target}");
        }
        if path[1..].iter().any(|&p| map.is_walkable(p) != Ok(true)) {
            bail!("Invariant failed: route {path:?} crosses a blocked cell");
        }
    }
    let (Some(best_cost), Some(found_cost)) =
        (route_cost(&best, diagonal_cost), route_cost(&found, diagonal_cost))
    else {
        bail!("Invariant failed: route contains an illegal step");
    };
    // A* weights its heuristic slightly, so allow a relative tolerance of the same size.
    if found_cost > best_cost * 1.001 + 1e-9 || found_cost + 1e-9 < best_cost {
        bail!("Invariant failed: a-star cost {found_cost} against dijkstra cost {best_cost}");
    }
    Ok(())
}

fn check_vision(
    map: &mut SquareMap,
    origin: Pos,
    radius: i32,
    limit: FieldOfVisionLimit,
) -> Result<()> {
    let terrain = map.to_ascii();
    let explored_before = map.explored_count();
    map.compute_field_of_vision(origin, radius, limit, FieldOfVision::Basic);

    if map.is_in_field_of_vision(origin) != Ok(true) {
        bail!("Invariant failed: origin {origin} is not visible");
    }
    if map.explored_count() < explored_before {
        bail!("Invariant failed: explored cells were forgotten");
    }
    if map.to_ascii() != terrain {
        bail!("Invariant failed: field of vision changed terrain");
    }
    for pos in map.positions() {
        if map.is_in_field_of_vision(pos) != Ok(true) {
            continue;
        }
        if radius > 0 && pos.square_distance(origin) > i64::from(radius) * i64::from(radius) {
            bail!("Invariant failed: {pos} visible beyond radius {radius} of {origin}");
        }
        if map.is_explored(pos) != Ok(true) {
            bail!("Invariant failed: {pos} visible but not explored");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    log::info!("Starting fuzz harness on seed {} for {} maps", args.seed, args.maps);
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    for round in 0..args.maps {
        let mut map = random_map(&mut rng, args.max_size);
        let origin = random_pos(&mut rng, &map);
        let target = random_pos(&mut rng, &map);
        let diagonal_cost = choose(&mut rng, &DIAGONAL_COSTS);
        check_routes(&map, origin, target, diagonal_cost)
            .map_err(|e| e.context(format!("map {round}:\n{}", map.to_ascii())))?;

        let replay = map.clone();
        for _ in 0..3 {
            let viewer = random_pos(&mut rng, &map);
            let radius = (rng.next_u64() % 10) as i32;
            let limit =
                choose(&mut rng, &[FieldOfVisionLimit::Included, FieldOfVisionLimit::Excluded]);
            check_vision(&mut map, viewer, radius, limit)
                .map_err(|e| e.context(format!("map {round}:\n{}", replay.to_ascii())))?;

            let mut again = replay.clone();
            again.compute_field_of_vision(viewer, radius, limit, FieldOfVision::Basic);
            let mut fresh = map.clone();
            fresh.clear_explored();
            again.clear_explored();
            if again.snapshot_hash() != fresh.snapshot_hash() {
                bail!("Invariant failed: field of vision from {viewer} is not repeatable");
            }
        }
        log::debug!("map {round} ({}x{}) passed", map.width(), map.height());
    }

    log::info!("Fuzzing completed successfully.");
    Ok(())
}
