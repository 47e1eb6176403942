mod config;
mod map_file;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use squaremap::{FieldOfVisionLimit, MapError, Pos, RouteAlgorithm, SquareMap, route_cost};

use crate::config::ToolConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Field of vision and route viewer for text maps", long_about = None)]
struct Args {
    /// Map file: plain text, or JSON with `format_version` and `rows`
    #[arg(short, long)]
    map: PathBuf,
    /// Optional TOML settings; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Viewer position as `x,y`
    #[arg(short, long, value_parser = parse_pos)]
    origin: Pos,
    /// Route destination as `x,y`
    #[arg(short, long, value_parser = parse_pos)]
    target: Option<Pos>,
    /// Vision radius, 0 for unlimited
    #[arg(short, long)]
    radius: Option<i32>,
    #[arg(long, value_parser = parse_limit)]
    limit: Option<FieldOfVisionLimit>,
    /// Add to the current view without exploring
    #[arg(long)]
    local: bool,
    /// Diagonal step cost, 0 forbids diagonal moves
    #[arg(short, long)]
    diagonal_cost: Option<f64>,
    #[arg(short, long, value_parser = parse_algorithm)]
    algorithm: Option<RouteAlgorithm>,
    /// Print a JSON report instead of the map overlay
    #[arg(long)]
    json: bool,
}

#[derive(Serialize, Debug, PartialEq)]
struct Report {
    origin: Pos,
    target: Option<Pos>,
    algorithm: RouteAlgorithm,
    diagonal_cost: f64,
    cost: Option<f64>,
    path: Option<Vec<Pos>>,
    visible: usize,
    explored: usize,
}

fn parse_pos(s: &str) -> Result<Pos, String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected x,y but got {s:?}"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x coordinate {x:?}: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y coordinate {y:?}: {e}"))?;
    Ok(Pos::new(x, y))
}

fn parse_limit(s: &str) -> Result<FieldOfVisionLimit, String> {
    match s {
        "included" => Ok(FieldOfVisionLimit::Included),
        "excluded" => Ok(FieldOfVisionLimit::Excluded),
        _ => Err(format!("expected `included` or `excluded`, got {s:?}")),
    }
}

fn parse_algorithm(s: &str) -> Result<RouteAlgorithm, String> {
    match s {
        "a-star" | "astar" => Ok(RouteAlgorithm::AStar),
        "dijkstra" => Ok(RouteAlgorithm::Dijkstra),
        _ => Err(format!("expected `a-star` or `dijkstra`, got {s:?}")),
    }
}

fn settings(args: &Args) -> Result<ToolConfig> {
    let mut config = match &args.config {
        Some(path) => ToolConfig::load(path)?,
        None => ToolConfig::default(),
    };
    if let Some(radius) = args.radius {
        config.field_of_vision.radius = radius;
    }
    if let Some(limit) = args.limit {
        config.field_of_vision.limit = limit;
    }
    config.field_of_vision.local |= args.local;
    if let Some(cost) = args.diagonal_cost {
        config.route.diagonal_cost = cost;
    }
    if let Some(algorithm) = args.algorithm {
        config.route.algorithm = algorithm;
    }
    Ok(config)
}

fn run(args: &Args) -> Result<(SquareMap, Report)> {
    let config = settings(args)?;
    let mut map = map_file::load_map(&args.map)?;
    map.cell(args.origin).context("Origin is not on the map")?;

    let vision = &config.field_of_vision;
    if vision.local {
        map.compute_local_field_of_vision(args.origin, vision.radius, vision.limit, vision.algorithm);
    } else {
        map.compute_field_of_vision(args.origin, vision.radius, vision.limit, vision.algorithm);
    }

    let route = &config.route;
    let path = match args.target {
        Some(target) => {
            match map.compute_route(args.origin, target, route.diagonal_cost, route.algorithm) {
                Ok(path) => Some(path),
                Err(MapError::NoPath { .. }) => {
                    log::warn!("No route from {} to {target}", args.origin);
                    None
                }
                Err(e) => return Err(e).context("Route query failed"),
            }
        }
        None => None,
    };

    let report = Report {
        origin: args.origin,
        target: args.target,
        algorithm: route.algorithm,
        diagonal_cost: route.diagonal_cost,
        cost: path.as_deref().and_then(|p| route_cost(p, route.diagonal_cost)),
        path,
        visible: map.visible_count(),
        explored: map.explored_count(),
    };
    Ok((map, report))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let (map, report) = run(&args)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{json}");
        return Ok(());
    }

    print!("{}", map.render_overlay(report.origin, report.path.as_deref().unwrap_or_default()));
    println!("Visible: {}  Explored: {}", report.visible, report.explored);
    if let (Some(target), Some(cost)) = (report.target, report.cost) {
        println!("Route to {target} ({}): cost {cost:.3}", report.algorithm);
    }
    Ok(())
}
