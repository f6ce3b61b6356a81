//! Headless Navigation Runner
//!
//! Runs the movement controller against a simulated area and prints a JSON
//! report of what happened.

use std::path::PathBuf;
use std::time::Duration;

use arc_navigator::core::config::{AgentProfile, NavigatorConfig};
use arc_navigator::core::types::{Area, GridPos, Skill, WorldPos};
use arc_navigator::movement::{MoveOptions, MovementController};
use arc_navigator::sim::{Portal, SimWorld};
use clap::{Parser, ValueEnum};
use serde::Serialize;

const ORIGIN: WorldPos = WorldPos::new(5000, 5000);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    /// Open ground, nothing in the way
    OpenField,
    /// A long wall with a single gap
    WallDetour,
    /// A closed door in a corridor
    Door,
    /// Teleporting across a walled-off room
    Teleport,
    /// Walking into a portal to the next area
    Portal,
    /// An enemy stands between the agent and the destination
    Monster,
    /// The agent cannot move at all
    Stuck,
}

/// Headless Navigation Runner - drive the controller through a scenario
#[derive(Parser, Debug)]
#[command(name = "nav_sim")]
#[command(about = "Run the movement controller in a simulated area and report the outcome")]
struct Args {
    /// Scenario to run
    #[arg(long, value_enum, default_value = "open-field")]
    scenario: Scenario,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// TOML configuration file (movement and agent sections)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Character class used when no config file is given
    #[arg(long, default_value = "sorceress")]
    class: String,

    /// Enable debug logging to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunReport {
    scenario: String,
    seed: u64,
    outcome: String,
    area: String,
    final_position: WorldPos,
    destination: WorldPos,
    remaining_distance: i32,
    elapsed_ms: u64,
    movements: usize,
    interactions: u32,
    clicks: usize,
    skill_presses: Vec<String>,
    blacklisted_points: Vec<WorldPos>,
}

fn main() {
    let args = Args::parse();

    let filter = if args.verbose {
        "arc_navigator=debug"
    } else {
        "arc_navigator=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let seed = args.seed.unwrap_or_else(|| rand::random());

    let config = match &args.config {
        Some(path) => match NavigatorConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config '{}': {}", path.display(), e);
                std::process::exit(2);
            }
        },
        None => NavigatorConfig {
            agent: AgentProfile::for_class(&args.class),
            ..NavigatorConfig::default()
        },
    };

    let (mut world, dest) = build_scenario(args.scenario, seed);
    let mut controller = MovementController::with_seed(config.movement, config.agent, seed);

    tracing::info!(scenario = ?args.scenario, seed, "Running scenario");
    let outcome = match controller.move_to(&mut world, dest, MoveOptions::new()) {
        Ok(()) => "arrived".to_string(),
        Err(e) => e.to_string(),
    };

    let record = world.record();
    let report = RunReport {
        scenario: format!("{:?}", args.scenario),
        seed,
        outcome,
        area: world.area().name.clone(),
        final_position: world.player_position(),
        destination: dest,
        remaining_distance: world.player_position().distance(&dest),
        elapsed_ms: world.elapsed().as_millis() as u64,
        movements: record.movements.len(),
        interactions: record.interactions,
        clicks: record.clicks.len(),
        skill_presses: record.skill_presses.iter().map(|k| k.0.clone()).collect(),
        blacklisted_points: controller.stuck_detector().blacklisted_points(),
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize report: {}", e);
            std::process::exit(1);
        }
    }
}

fn at(x: i32, y: i32) -> WorldPos {
    GridPos::new(x, y).to_world(ORIGIN)
}

fn build_scenario(scenario: Scenario, seed: u64) -> (SimWorld, WorldPos) {
    let mut world = SimWorld::new(
        Area::new(3, "Cold Plains", false),
        ORIGIN,
        120,
        120,
        at(10, 10),
    )
    .with_seed(seed);
    world.bind(Skill::Vigor, "F5");
    world.bind(Skill::Teleport, "F1");

    let dest = match scenario {
        Scenario::OpenField => at(80, 60),
        Scenario::WallDetour => {
            world.add_wall(GridPos::new(40, 0), GridPos::new(40, 90));
            at(70, 20)
        }
        Scenario::Door => {
            world.add_wall(GridPos::new(0, 20), GridPos::new(29, 20));
            world.add_wall(GridPos::new(31, 20), GridPos::new(119, 20));
            world.add_door(1, GridPos::new(30, 20));
            at(30, 40)
        }
        Scenario::Teleport => {
            world.enable_teleport(25, Duration::from_millis(250));
            world.add_wall(GridPos::new(30, 0), GridPos::new(30, 110));
            world.add_wall(GridPos::new(30, 110), GridPos::new(60, 110));
            at(70, 90)
        }
        Scenario::Portal => {
            world.set_portal(Portal {
                cell: GridPos::new(40, 10),
                area: Area::new(4, "Stony Field", false),
                origin: WorldPos::new(9000, 9000),
                arrival: WorldPos::new(9010, 9010),
                size: (120, 120),
                load_delay: Duration::from_millis(400),
            });
            at(50, 10)
        }
        Scenario::Monster => {
            world.add_monster(1, "Zombie", at(30, 10), true);
            at(60, 10)
        }
        Scenario::Stuck => {
            world.freeze();
            at(60, 60)
        }
    };

    (world, dest)
}
