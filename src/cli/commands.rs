use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::generation::GenerationConfig;
use crate::config::simulation::SimulationConfig;
use crate::server;
use crate::simulation::engine::Engine;
use crate::world::Cell;

/// Generate a world and print a summary. No persistence (Non-goal): the
/// generated grid lives only for the duration of this command.
pub fn generate(generation: &GenerationConfig) -> Result<(), String> {
    let engine = Engine::new(generation.clone(), SimulationConfig::default(), 0)
        .map_err(|e| e.to_string())?;
    print_world_summary(engine.world().cells(), engine.world().width(), engine.world().height());
    Ok(())
}

/// Run the simulation: build the engine, start the query server in the
/// background, then tick on a fixed cadence until interrupted. Overlapping
/// ticks are forbidden (§5) — a `latch` skips and warns rather than queuing.
pub async fn run(
    generation: &GenerationConfig,
    simulation: &SimulationConfig,
    bind: SocketAddr,
    tick_interval_ms: u64,
) -> Result<(), String> {
    let engine = Engine::new(generation.clone(), simulation.clone(), tick_interval_ms)
        .map_err(|e| e.to_string())?;
    info!(
        world_size = engine.world().width(),
        "world generated, starting simulation"
    );

    let engine = Arc::new(RwLock::new(engine));

    let server_engine = Arc::clone(&engine);
    tokio::spawn(async move {
        if let Err(e) = server::start_server(server_engine, bind).await {
            warn!("query server stopped: {}", e);
        }
    });

    let latch = Arc::new(AtomicBool::new(false));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let tick_start = std::time::Instant::now();

        if latch.swap(true, Ordering::SeqCst) {
            warn!("previous tick still running; skipping this cadence slot");
        } else {
            let mut guard = engine.write().await;
            let report = guard.tick();
            drop(guard);
            latch.store(false, Ordering::SeqCst);

            if report.tick % 24 == 0 {
                info!(
                    tick = report.tick,
                    day = report.game_time.day,
                    avg_temperature = report.avg_temperature,
                    avg_moisture = report.avg_moisture,
                    rivers = report.river_count,
                    "day complete"
                );
            }
        }

        let elapsed = tick_start.elapsed();
        let target = std::time::Duration::from_millis(tick_interval_ms);
        if elapsed < target {
            tokio::select! {
                _ = tokio::time::sleep(target - elapsed) => {}
                _ = &mut shutdown => {
                    info!("shutdown signal received");
                    break;
                }
            }
        } else {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutdown signal received");
                    break;
                }
                else => {}
            }
        }
    }

    let guard = engine.read().await;
    info!(tick = guard.tick_count(), "simulation stopped");
    Ok(())
}

/// Generate a world, optionally advance it `ticks` hours, then print either a
/// single cell or a world-level summary. There is no persisted state to
/// inspect (Non-goal) — this command always operates on a fresh run.
pub fn inspect(
    generation: &GenerationConfig,
    ticks: u64,
    cell: Option<(u32, u32)>,
    show_world: bool,
) -> Result<(), String> {
    let mut engine = Engine::new(generation.clone(), SimulationConfig::default(), 0)
        .map_err(|e| e.to_string())?;

    for _ in 0..ticks {
        engine.tick();
    }

    match (cell, show_world) {
        (Some((x, y)), _) => inspect_cell(&engine, x, y),
        (None, true) => {
            inspect_world(&engine);
            Ok(())
        }
        (None, false) => Err("specify --x/--y or --world".to_string()),
    }
}

fn inspect_cell(engine: &Engine, x: u32, y: u32) -> Result<(), String> {
    let (width, height) = engine.world().dim();
    if x >= width || y >= height {
        return Err(format!(
            "({}, {}) is out of range for a {}x{} world",
            x, y, width, height
        ));
    }
    let cell = engine.world().cell(x, y);

    println!("=== Cell ({}, {}) ===", cell.x, cell.y);
    println!("Type: {:?}", cell.cell_type);
    println!(
        "Terrain height: {:.2}  Water height: {:.2}  Altitude: {:.2}",
        cell.terrain_height, cell.water_height, cell.altitude
    );
    println!(
        "Moisture: {:.3} (base {:.3})  Distance from water: {}",
        cell.moisture,
        cell.base_moisture,
        if cell.distance_from_water == crate::world::UNREACHED {
            "unreached".to_string()
        } else {
            cell.distance_from_water.to_string()
        }
    );
    println!(
        "Temperature: {:.1}°C  Air humidity: {:.3}  Cloud density: {:.3}",
        cell.temperature, cell.air_humidity, cell.cloud_density
    );
    println!(
        "Precipitation: {:.3}  Wind: {:.1} m/s @ {:.0}°",
        cell.precipitation_rate, cell.wind_speed, cell.wind_direction
    );
    if let Some(river) = cell.river_name {
        println!("River id: {}", river);
    }
    Ok(())
}

fn inspect_world(engine: &Engine) {
    use std::collections::HashMap;

    let world = engine.world();
    let (width, height) = world.dim();

    println!("=== World ===");
    println!("Size: {}x{}", width, height);
    println!("Tick: {}  Game time: {:?}", engine.tick_count(), engine.game_time());
    println!("Rivers: {}", world.river_registry.river_count());
    println!("Active water cells: {}", world.active_water.len());
    println!();

    let mut type_counts: HashMap<_, u32> = HashMap::new();
    let mut total_temp = 0.0_f64;
    let mut total_moisture = 0.0_f64;
    let mut total_cloud = 0.0_f64;

    for cell in world.cells() {
        *type_counts.entry(cell.cell_type).or_default() += 1;
        total_temp += cell.temperature as f64;
        total_moisture += cell.moisture as f64;
        total_cloud += cell.cloud_density as f64;
    }

    let n = world.len() as f64;
    println!("--- Averages ---");
    println!("  Temperature: {:.1}°C", total_temp / n);
    println!("  Moisture: {:.3}", total_moisture / n);
    println!("  Cloud density: {:.3}", total_cloud / n);
    println!();

    println!("--- Cell Type Distribution ---");
    let mut sorted: Vec<_> = type_counts.into_iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));
    for (cell_type, count) in &sorted {
        let pct = (*count as f64 / n) * 100.0;
        println!("  {:?}: {} ({:.1}%)", cell_type, count, pct);
    }
}

fn print_world_summary(cells: &[Cell], width: u32, height: u32) {
    let water = cells.iter().filter(|c| c.is_water()).count();
    println!("World generated: {}x{} ({} cells)", width, height, cells.len());
    println!("Spring/river cells: {}", water);
}
