use std::net::SocketAddr;
use std::path::Path;

use clap::{Parser, Subcommand};

use gaiacore::cli::commands;
use gaiacore::config::generation::GenerationConfig;
use gaiacore::config::simulation::SimulationConfig;

#[derive(Parser)]
#[command(name = "gaiacore")]
#[command(about = "A tick-driven toroidal world simulation engine")]
#[command(version)]
struct Cli {
    /// Path to the runtime/tick config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Path to the world generation config file
    #[arg(short, long, default_value = "worldgen.toml")]
    worldgen: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new world from procedural parameters and print a summary
    Generate,

    /// Run the simulation and serve the query API
    Run {
        /// Address to bind the query server to
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,
    },

    /// Generate a world, optionally tick it, then inspect a cell or the whole grid
    Inspect {
        /// Number of ticks (hours) to advance before inspecting
        #[arg(long, default_value_t = 0)]
        ticks: u64,

        /// Cell x coordinate to inspect
        #[arg(long)]
        x: Option<u32>,

        /// Cell y coordinate to inspect
        #[arg(long)]
        y: Option<u32>,

        /// Show world-level summary statistics
        #[arg(long)]
        world: bool,
    },
}

fn load_generation_config(path: &str) -> GenerationConfig {
    match GenerationConfig::from_file(Path::new(path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading generation config: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_simulation_config(path: &str) -> SimulationConfig {
    match SimulationConfig::from_file(Path::new(path)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate => {
            let generation = load_generation_config(&cli.worldgen);
            if let Err(e) = commands::generate(&generation) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Run { mut bind } => {
            let generation = load_generation_config(&cli.worldgen);
            let simulation = load_simulation_config(&cli.config);
            let interval_ms = std::env::var("SIMULATION_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000);
            if let Some(port) = std::env::var("PORT").ok().and_then(|v| v.parse().ok()) {
                bind.set_port(port);
            }

            if let Err(e) = commands::run(&generation, &simulation, bind, interval_ms).await {
                eprintln!("Simulation error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Inspect { ticks, x, y, world } => {
            let generation = load_generation_config(&cli.worldgen);
            let cell = match (x, y) {
                (Some(x), Some(y)) => Some((x, y)),
                (None, None) => None,
                _ => {
                    eprintln!("Error: --x and --y must be given together");
                    std::process::exit(1);
                }
            };

            if let Err(e) = commands::inspect(&generation, ticks, cell, world) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
