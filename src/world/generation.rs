use noise::{NoiseFn, Perlin};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::config::generation::GenerationConfig;
use crate::world::cell::{Cell, CellType};
use crate::world::World;

/// Terrain/spring generation failed structurally — fatal at init or regenerate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerrainGenerationError {
    /// No cell's elevation fell inside `[spring_min_height, spring_max_height]`.
    NoSpringCandidates,
}

impl std::fmt::Display for TerrainGenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerrainGenerationError::NoSpringCandidates => {
                write!(f, "no cells fall within the configured spring elevation band")
            }
        }
    }
}

impl std::error::Error for TerrainGenerationError {}

/// Build a new world: a tileable coherent-noise terrain field, then springs
/// sampled from the configured elevation band.
///
/// `config.seed == 0` means "pick a process-entropy seed"; the resolved seed
/// is logged (not returned) since the core keeps no generation-params struct
/// attached to the live `World` — callers that need reproducibility should
/// pass an explicit non-zero seed.
pub fn generate_world(config: &GenerationConfig) -> Result<World, TerrainGenerationError> {
    let seed = if config.seed == 0 {
        let s: u64 = rand::thread_rng().r#gen();
        info!(seed = s, "generation seed was 0; using process-entropy seed");
        s
    } else {
        config.seed
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let size = config.grid_size;
    let cells = build_terrain(size, config, seed);
    let mut world = World::new(size, size, cells);

    seed_springs(&mut world, config, &mut rng)?;
    world.rebuild_active_water();

    Ok(world)
}

/// Sample a tileable 2D noise field by mapping each axis onto a circle in an
/// orthogonal 4D noise plane. Sampling `position * scale` directly does not
/// tile — the opposite edges would not match — so this crate always samples
/// noise on the torus instead.
fn build_terrain(size: u32, config: &GenerationConfig, seed: u64) -> Vec<Cell> {
    let perlin = Perlin::new(seed as u32);
    let scale = config.noise_scale;
    let span = config.max_height - config.min_height;

    let mut cells = Vec::with_capacity((size * size) as usize);
    for y in 0..size {
        let v = y as f64 / size as f64;
        let (sin_v, cos_v) = (v * std::f64::consts::TAU).sin_cos();
        for x in 0..size {
            let u = x as f64 / size as f64;
            let (sin_u, cos_u) = (u * std::f64::consts::TAU).sin_cos();

            let sample = perlin.get([
                cos_u * scale,
                sin_u * scale,
                cos_v * scale,
                sin_v * scale,
            ]);
            // Perlin output lands roughly in [-1, 1]; normalize to [0, 1].
            let normalized = ((sample + 1.0) / 2.0).clamp(0.0, 1.0) as f32;
            let terrain_height = normalized * span + config.min_height;
            cells.push(Cell::new_bare(x, y, terrain_height));
        }
    }
    cells
}

/// Choose `number_of_springs` candidate cells uniformly without replacement
/// and turn them into spring sources.
fn seed_springs(
    world: &mut World,
    config: &GenerationConfig,
    rng: &mut ChaCha8Rng,
) -> Result<(), TerrainGenerationError> {
    let candidates: Vec<usize> = world
        .cells()
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            c.terrain_height >= config.spring_min_height && c.terrain_height <= config.spring_max_height
        })
        .map(|(i, _)| i)
        .collect();

    if candidates.is_empty() {
        return Err(TerrainGenerationError::NoSpringCandidates);
    }

    let count = (config.number_of_springs as usize).min(candidates.len());
    if (config.number_of_springs as usize) > candidates.len() {
        warn!(
            requested = config.number_of_springs,
            available = candidates.len(),
            "fewer spring candidates than requested; using all of them"
        );
    }

    let chosen: Vec<usize> = candidates
        .choose_multiple(rng, count)
        .copied()
        .collect();

    for idx in chosen {
        let cell = world.cell_at_index_mut(idx);
        cell.cell_type = CellType::Spring;
        cell.water_height = 1.0;
        cell.base_moisture = 1.0;
        cell.moisture = 1.0;
        cell.distance_from_water = 0;
        cell.recompute_altitude();
    }

    Ok(())
}
