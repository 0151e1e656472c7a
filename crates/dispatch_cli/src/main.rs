use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use bevy_ecs::prelude::World;
use clap::{Parser, Subcommand};
use dispatch_core::config::DispatchConfig;
use dispatch_core::dispatch::{initialize_network, Dispatcher, RideOutcome, RideRequest};
use dispatch_core::runner::{run_until_empty, simulation_schedule};
use dispatch_core::scenario::{build_scenario, ScenarioParams};
use dispatch_core::telemetry::RideTelemetry;
use dispatch_core::telemetry_export::write_completed_rides_parquet;
use log::info;
use serde_json::json;

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "dispatch_cli",
    about = "Cab dispatch over the reference street grid",
    long_about = "Query shortest routes on the reference street grid and replay\n\
                  timed ride requests through the headless dispatch simulation."
)]
struct Cli {
    /// Dispatcher configuration as JSON; missing fields take their defaults
    #[arg(long, global = true, env = "DISPATCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Book a single ride and print its route
    Route {
        #[arg(long)]
        from: u32,
        #[arg(long)]
        to: u32,
        /// Seed for lane weights
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print every street of the reference grid
    Network {
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Replay ride requests through the simulation
    Simulate {
        /// Scenario file (JSON); conflicts with --random
        #[arg(long, conflicts_with = "random")]
        scenario: Option<PathBuf>,
        /// Generate this many random requests instead of reading a scenario
        #[arg(long)]
        random: Option<usize>,
        /// Chance that a random request is willing to share, in 0..=1
        #[arg(long, default_value_t = 0.5, value_parser = parse_probability)]
        share_probability: f64,
        #[arg(long)]
        seed: Option<u64>,
        /// Write completed rides to this Parquet file
        #[arg(long)]
        export: Option<PathBuf>,
        #[arg(long, default_value_t = 1_000_000)]
        max_steps: usize,
    },
}

// ── helpers ────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<DispatchConfig, Box<dyn Error>> {
    match path {
        Some(path) => Ok(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => Ok(DispatchConfig::default()),
    }
}

fn parse_probability(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|err| format!("{raw:?}: {err}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{raw} is not a probability between 0 and 1"))
    }
}

fn with_seed(config: DispatchConfig, seed: Option<u64>) -> DispatchConfig {
    match seed {
        Some(seed) => config.with_seed(seed),
        None => config,
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), Box<dyn Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── commands ───────────────────────────────────────────────────────

fn route(config: DispatchConfig, from: u32, to: u32) -> Result<(), Box<dyn Error>> {
    let mut dispatcher = Dispatcher::from_config(config);
    match dispatcher.request_ride(RideRequest::new(from, to, false))? {
        RideOutcome::Booked { cab_id, .. } => {
            let receipt = dispatcher.complete_ride(cab_id)?;
            print_json(&json!({
                "from": from,
                "to": to,
                "route": receipt.route.nodes,
                "total_distance": receipt.total_distance,
                "fare": receipt.fare,
            }))
        }
        RideOutcome::NoCabAvailable => Err("fleet is empty".into()),
    }
}

fn network(config: DispatchConfig) -> Result<(), Box<dyn Error>> {
    let network = initialize_network(&config);
    let streets: Vec<_> = network
        .iter_lanes()
        .filter(|(from, lane)| *from < lane.target)
        .map(|(from, lane)| json!({ "a": from, "b": lane.target, "weight": lane.weight }))
        .collect();
    print_json(&json!({
        "intersections": network.intersection_count(),
        "streets": streets,
    }))
}

fn simulate(
    config: DispatchConfig,
    scenario: Option<PathBuf>,
    random: Option<usize>,
    share_probability: f64,
    seed: Option<u64>,
    export: Option<PathBuf>,
    max_steps: usize,
) -> Result<(), Box<dyn Error>> {
    let params = match (scenario, random) {
        (Some(path), _) => {
            let params: ScenarioParams = serde_json::from_str(&fs::read_to_string(path)?)?;
            let config = with_seed(params.config.clone(), seed);
            params.with_config(config)
        }
        (None, Some(count)) => {
            let seed = seed.or(config.seed).unwrap_or_default();
            let params = ScenarioParams::random(count, share_probability, seed);
            params.with_config(config.with_seed(seed))
        }
        (None, None) => return Err("pass --scenario or --random".into()),
    };
    info!("simulating {} requests", params.requests.len());

    let mut world = World::new();
    build_scenario(&mut world, params);
    let mut schedule = simulation_schedule();
    let steps = run_until_empty(&mut world, &mut schedule, max_steps);

    let telemetry = world.resource::<RideTelemetry>();
    if let Some(path) = export {
        write_completed_rides_parquet(&path, telemetry)?;
        info!("wrote {} rides to {}", telemetry.completed_rides.len(), path.display());
    }
    print_json(&json!({
        "steps": steps,
        "summary": telemetry.summary(),
    }))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Route { from, to, seed } => route(with_seed(config, seed), from, to),
        Commands::Network { seed } => network(with_seed(config, seed)),
        Commands::Simulate {
            scenario,
            random,
            share_probability,
            seed,
            export,
            max_steps,
        } => simulate(
            config,
            scenario,
            random,
            share_probability,
            seed,
            export,
            max_steps,
        ),
    }
}
