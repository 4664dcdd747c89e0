#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the Battlepath simulation without a window.

mod scenario;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use battlepath_core::{EntityClass, SnapshotKind, Vector2D};
use battlepath_game::InputState;
use battlepath_world::query;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use scenario::Script;

#[derive(Parser, Debug)]
#[command(name = "battlepath")]
#[command(about = "Runs a scripted Battlepath scenario headless and prints a summary")]
struct Args {
    /// ASCII map file (`.` floor, `#` wall, `U` unit, `T` tower)
    #[arg(long)]
    map: Option<PathBuf>,

    /// TOML simulation configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u32,

    /// Frame duration in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// Side length of a map tile in world units
    #[arg(long, default_value_t = 1.0)]
    tile_length: f32,

    /// Destination ordered for every unit, as `x,y`
    #[arg(long, value_parser = parse_point)]
    move_to: Option<Vector2D>,

    /// Take direct control of the first unit after the move order
    #[arg(long)]
    action: bool,

    /// Seed for cosmetic effects
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

/// Entry point for the Battlepath command-line interface.
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = scenario::load_config(args.config.as_deref())?;
    let layout = scenario::load_layout(args.map.as_deref(), args.tile_length)?;
    let script = Script {
        extent: scenario::field_extent(&layout),
        destination: args.move_to,
        action: args.action,
    };

    info!(
        units = layout.units.len(),
        towers = layout.towers.len(),
        frames = args.frames,
        "starting scenario"
    );

    let mut game = scenario::build_game(layout, config, args.seed);
    let mut input = InputState::new();
    let dt = Duration::from_millis(args.frame_ms);
    for frame in 0..args.frames {
        script.drive(frame, &mut input);
        game.step(dt, &mut input);
    }

    let world = game.world();
    println!(
        "simulated {} frames ({:.2}s), mode {:?}",
        query::tick_index(world),
        query::clock(world).as_secs_f32(),
        game.mode()
    );
    for snapshot in query::entity_view(world).iter() {
        match snapshot.kind {
            SnapshotKind::Unit {
                selected, path_len, ..
            } => println!(
                "unit {:>3} at ({:>6.2}, {:>6.2}) selected={selected} waypoints={path_len}",
                snapshot.id.get(),
                snapshot.position.x,
                snapshot.position.y,
            ),
            SnapshotKind::Tower { aim, .. } => println!(
                "tower {:>2} at ({:>6.2}, {:>6.2}) aim=({:.2}, {:.2})",
                snapshot.id.get(),
                snapshot.position.x,
                snapshot.position.y,
                aim.x,
                aim.y,
            ),
            SnapshotKind::Projectile { .. } => {}
        }
    }
    let projectiles = query::entity_view(world)
        .iter()
        .filter(|snapshot| snapshot.class() == EntityClass::Projectile)
        .count();
    println!(
        "projectiles in flight: {projectiles}, particles: {}",
        game.particles().len()
    );

    Ok(())
}

fn parse_point(value: &str) -> Result<Vector2D, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{value}`"))?;
    let parse = |part: &str| {
        part.trim()
            .parse::<f32>()
            .map_err(|error| format!("invalid coordinate `{part}`: {error}"))
    };
    Ok(Vector2D::new(parse(x)?, parse(y)?))
}
