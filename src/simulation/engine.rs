use std::time::Instant;

use tracing::{info, warn};

use crate::config::generation::GenerationConfig;
use crate::config::simulation::SimulationConfig;
use crate::simulation::statistics::{compute_tick_report, TickReport};
use crate::simulation::GameTime;
use crate::simulation::{
    clouds, condensation, evaporation, ground_moisture, humidity_diffusion, hydrology,
    precipitation, temperature, weather, wind_transport,
};
use crate::world::generation::{generate_world, TerrainGenerationError};
use crate::world::{wrap, Cell, World};

/// A bad viewport request. Non-finite floats are rejected by the HTTP
/// adapter before they ever reach this type (§6); the engine itself only
/// ever has to reject a degenerate size.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryArgumentError {
    ZeroSize,
}

impl std::fmt::Display for QueryArgumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryArgumentError::ZeroSize => write!(f, "width and height must be > 0"),
        }
    }
}

impl std::error::Error for QueryArgumentError {}

/// A toroidal window into the grid, already wrapped and clamped.
#[derive(Debug, Clone)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub cells: Vec<Cell>,
}

/// Reply to `get_config()`: the two pieces of shape a client needs to lay
/// out a poll loop and a viewport, without leaking every tuning constant.
#[derive(Debug, Clone, Copy)]
pub struct ConfigSummary {
    pub update_interval_ms: u64,
    pub world_size: u32,
}

/// §4.N Orchestrator: owns the world, the clock, and the tick counter; runs
/// the fixed A–M pipeline in order every `tick()`; is the single seam the
/// query surface (§6) and the CLI driver read through.
pub struct Engine {
    world: World,
    game_time: GameTime,
    generation_config: GenerationConfig,
    simulation_config: SimulationConfig,
    tick_count: u64,
    update_interval_ms: u64,
}

impl Engine {
    /// Generate an initial world from `generation_config` and wrap it with a
    /// fresh clock and tick counter.
    pub fn new(
        generation_config: GenerationConfig,
        simulation_config: SimulationConfig,
        update_interval_ms: u64,
    ) -> Result<Self, TerrainGenerationError> {
        let world = generate_world(&generation_config)?;
        Ok(Engine {
            world,
            game_time: GameTime::default(),
            generation_config,
            simulation_config,
            tick_count: 0,
            update_interval_ms,
        })
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn game_time(&self) -> GameTime {
        self.game_time
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn simulation_config(&self) -> &SimulationConfig {
        &self.simulation_config
    }

    /// Advance the simulation by exactly one in-game hour, running A–M in
    /// the pipeline order of §2. Numeric guardrails inside each subsystem
    /// keep invariants intact; this function only sequences them and reports
    /// on the result (§7: tick budget / processing caps log, they never abort).
    pub fn tick(&mut self) -> TickReport {
        let tick_start = Instant::now();
        let log_stages = self.simulation_config.enable_performance_logging;
        let mut stage_timings = Vec::new();

        macro_rules! stage {
            ($name:literal, $body:expr) => {{
                let stage_start = Instant::now();
                $body;
                if log_stages {
                    stage_timings.push(($name, stage_start.elapsed().as_secs_f32() * 1000.0));
                }
            }};
        }

        self.game_time.advance(&self.simulation_config.time);

        stage!(
            "temperature",
            temperature::update(
                &mut self.world,
                &self.game_time,
                &self.simulation_config.time,
                &self.simulation_config.temperature,
            )
        );
        stage!(
            "weather",
            weather::update(&mut self.world, &self.simulation_config.weather)
        );
        stage!(
            "wind_transport",
            wind_transport::update(
                &mut self.world,
                &self.simulation_config.wind_transport,
                self.simulation_config.weather.max_wind_speed,
            )
        );
        stage!(
            "clouds",
            clouds::update(
                &mut self.world,
                &self.simulation_config.cloud,
                self.simulation_config.weather.max_wind_speed,
            )
        );
        stage!(
            "precipitation",
            precipitation::update(
                &mut self.world,
                &self.simulation_config.precipitation,
                self.simulation_config.max_land_moisture,
            )
        );
        stage!(
            "hydrology",
            hydrology::update(&mut self.world, &self.simulation_config.hydrology)
        );
        stage!(
            "evaporation",
            evaporation::update(&mut self.world, &self.simulation_config.evaporation)
        );
        stage!(
            "humidity_diffusion",
            humidity_diffusion::update(
                &mut self.world,
                &self.simulation_config.diffusion,
                self.simulation_config.cloud.base_saturation,
            )
        );
        stage!(
            "condensation",
            condensation::update(
                &mut self.world,
                &self.simulation_config.condensation,
                self.simulation_config.max_land_moisture,
            )
        );
        stage!(
            "ground_moisture",
            ground_moisture::update(
                &mut self.world,
                &self.simulation_config.moisture,
                self.simulation_config.max_land_moisture,
            )
        );

        self.tick_count += 1;
        let tick_duration_ms = tick_start.elapsed().as_secs_f32() * 1000.0;

        if tick_duration_ms > self.simulation_config.tick_time_warning_ms as f32 {
            warn!(
                tick = self.tick_count,
                duration_ms = tick_duration_ms,
                budget_ms = self.simulation_config.tick_time_warning_ms,
                "tick exceeded TICK_TIME_WARNING_MS; committing anyway"
            );
        }

        compute_tick_report(
            &self.world,
            self.tick_count,
            self.game_time,
            tick_duration_ms,
            self.simulation_config.tick_time_warning_ms,
            stage_timings,
        )
    }

    /// Rebuild the terrain from scratch. On failure the prior grid, clock,
    /// and tick counter are left untouched (§7: fatal at regenerate, prior
    /// grid retained).
    pub fn regenerate(
        &mut self,
        config: Option<GenerationConfig>,
    ) -> Result<(), TerrainGenerationError> {
        let config = config.unwrap_or_else(|| self.generation_config.clone());
        let world = generate_world(&config)?;
        self.world = world;
        self.generation_config = config;
        self.game_time = GameTime::default();
        self.tick_count = 0;
        info!(grid_size = self.generation_config.grid_size, "world regenerated");
        Ok(())
    }

    /// `GET /api/terrain`: the full grid as a flat row-major cell list.
    pub fn get_terrain(&self) -> &[Cell] {
        self.world.cells()
    }

    pub fn get_world_size(&self) -> u32 {
        self.world.width()
    }

    pub fn get_config(&self) -> ConfigSummary {
        ConfigSummary {
            update_interval_ms: self.update_interval_ms,
            world_size: self.world.width(),
        }
    }

    /// `GET /api/viewport`: a toroidal window. `x`/`y` wrap; `width`/`height`
    /// are clamped to `max_viewport_size` and to the world's own dimensions.
    pub fn get_viewport(
        &self,
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    ) -> Result<Viewport, QueryArgumentError> {
        if width == 0 || height == 0 {
            return Err(QueryArgumentError::ZeroSize);
        }

        let (world_w, world_h) = self.world.dim();
        let max = self.simulation_config.max_viewport_size;
        let clamped_width = width.min(max).min(world_w);
        let clamped_height = height.min(max).min(world_h);

        let origin_x = wrap(x, world_w);
        let origin_y = wrap(y, world_h);

        let mut cells = Vec::with_capacity((clamped_width * clamped_height) as usize);
        for row in 0..clamped_height {
            for col in 0..clamped_width {
                let (cx, cy) = self
                    .world
                    .neighbor_coords(origin_x, origin_y, col as i32, row as i32);
                cells.push(self.world.cell(cx, cy).clone());
            }
        }

        Ok(Viewport {
            x: origin_x,
            y: origin_y,
            width: clamped_width,
            height: clamped_height,
            cells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_engine() -> Engine {
        let generation = GenerationConfig {
            grid_size: 100,
            number_of_springs: 5,
            seed: 42,
            ..GenerationConfig::default()
        };
        Engine::new(generation, SimulationConfig::default(), 1000).unwrap()
    }

    #[test]
    fn new_engine_generates_requested_spring_count() {
        let engine = small_engine();
        let springs = engine
            .world()
            .cells()
            .iter()
            .filter(|c| c.is_water())
            .count();
        assert_eq!(springs, 5);
        assert_eq!(engine.tick_count(), 0);
    }

    #[test]
    fn tick_advances_clock_and_counter_together() {
        let mut engine = small_engine();
        let report = engine.tick();
        assert_eq!(engine.tick_count(), 1);
        assert_eq!(report.tick, 1);
        assert_eq!(engine.game_time().hour, GameTime::default().hour + 1);
    }

    #[test]
    fn twenty_four_ticks_advance_exactly_one_day() {
        let mut engine = small_engine();
        for _ in 0..24 {
            engine.tick();
        }
        assert_eq!(engine.game_time().day, 2);
        assert_eq!(engine.game_time().hour, GameTime::default().hour);
    }

    #[test]
    fn invariants_hold_after_many_ticks() {
        let mut engine = small_engine();
        for _ in 0..50 {
            engine.tick();
        }
        for cell in engine.world().cells() {
            assert!((cell.altitude - (cell.terrain_height + cell.water_height)).abs() < 1e-3);
            if cell.is_water() {
                assert!(cell.water_height > 0.0);
                assert_eq!(cell.moisture, 1.0);
            }
            assert!(cell.cloud_density >= 0.0 && cell.cloud_density <= 1.0);
            assert!(cell.precipitation_rate >= 0.0 && cell.precipitation_rate <= 1.0);
            assert!(cell.air_humidity >= 0.0);
            assert!(cell.wind_direction >= 0.0 && cell.wind_direction < 360.0);
            assert_eq!(cell.moisture, cell.base_moisture);
        }
    }

    #[test]
    fn regenerate_resets_clock_and_tick_counter() {
        let mut engine = small_engine();
        engine.tick();
        engine.tick();
        engine.regenerate(None).unwrap();
        assert_eq!(engine.tick_count(), 0);
        assert_eq!(engine.game_time(), GameTime::default());
    }

    #[test]
    fn regenerate_failure_retains_the_prior_grid() {
        let mut engine = small_engine();
        let before: Vec<_> = engine.world().cells().to_vec();
        let bad = GenerationConfig {
            spring_min_height: 5_000.0,
            spring_max_height: 6_000.0,
            max_height: 2200.0,
            ..engine.generation_config.clone()
        };
        let err = engine.regenerate(Some(bad)).unwrap_err();
        assert_eq!(err, TerrainGenerationError::NoSpringCandidates);
        assert_eq!(engine.world().cells(), before.as_slice());
    }

    #[test]
    fn viewport_wraps_negative_origin() {
        let engine = small_engine();
        let viewport = engine.get_viewport(-5, -5, 10, 10).unwrap();
        assert_eq!(viewport.x, 95);
        assert_eq!(viewport.y, 95);
        assert_eq!(viewport.cells.len(), 100);
    }

    #[test]
    fn viewport_rejects_zero_size() {
        let engine = small_engine();
        assert_eq!(
            engine.get_viewport(0, 0, 0, 10).unwrap_err(),
            QueryArgumentError::ZeroSize
        );
    }

    #[test]
    fn viewport_clamps_to_configured_maximum() {
        let mut config = SimulationConfig::default();
        config.max_viewport_size = 8;
        let engine = Engine::new(
            GenerationConfig {
                grid_size: 100,
                number_of_springs: 5,
                seed: 42,
                ..GenerationConfig::default()
            },
            config,
            1000,
        )
        .unwrap();
        let viewport = engine.get_viewport(0, 0, 50, 50).unwrap();
        assert_eq!(viewport.width, 8);
        assert_eq!(viewport.height, 8);
    }

    #[test]
    fn config_summary_reports_world_size_and_interval() {
        let engine = small_engine();
        let summary = engine.get_config();
        assert_eq!(summary.world_size, 100);
        assert_eq!(summary.update_interval_ms, 1000);
    }
}
