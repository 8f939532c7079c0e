use tracing::warn;

use crate::config::simulation::DiffusionConfig;
use crate::world::World;

/// §4.K Saturation-aware humidity diffusion. Each iteration is a full
/// double-buffered pass: capacity/absolute-humidity snapshots are taken once,
/// every transfer reads only from that snapshot, and the result is committed
/// back to relative humidity at the end — independent of cell sweep order.
///
/// `base_saturation` is `CloudConfig::base_saturation`, shared with cloud
/// formation's threshold so both reference the same saturation baseline.
pub fn update(world: &mut World, config: &DiffusionConfig, base_saturation: f32) {
    let (width, height) = world.dim();
    let mut processed: u64 = 0;

    'iterations: for _ in 0..config.diffusion_iterations {
        let capacity: Vec<f32> = world
            .cells()
            .iter()
            .map(|c| {
                base_saturation
                    * (config.temp_coefficient * c.temperature).exp()
                    * (-(c.terrain_height.max(0.0)) / config.scale_height).exp()
            })
            .collect();
        let absolute: Vec<f32> = world
            .cells()
            .iter()
            .zip(capacity.iter())
            .map(|(c, cap)| c.air_humidity * cap)
            .collect();
        let mut new_absolute = absolute.clone();

        for y in 0..height {
            for x in 0..width {
                let idx = world.index(x, y);
                if world.cell_at_index(idx).air_humidity < config.min_transfer_threshold {
                    continue;
                }

                for n_idx in world.neighbors(x, y) {
                    if processed >= config.max_cells_processed_per_tick {
                        warn!(
                            processed,
                            cap = config.max_cells_processed_per_tick,
                            "humidity diffusion hit its per-tick processing cap"
                        );
                        break 'iterations;
                    }
                    processed += 1;

                    let delta_alt = world.cell_at_index(n_idx).altitude - world.cell_at_index(idx).altitude;
                    let mut k = config.humidity_diffusion_rate;
                    if delta_alt > 0.0 {
                        k += config.upward_bias_max.min(delta_alt * config.upward_bias_coeff);
                    } else {
                        k -= config
                            .downward_penalty_max
                            .min((-delta_alt) * config.downward_penalty_coeff);
                    }
                    let k = k.max(0.0);

                    let headroom = (capacity[n_idx] - absolute[n_idx]).max(0.0);
                    let transfer = (k * absolute[idx]).min(headroom);
                    if transfer <= 0.0 {
                        continue;
                    }
                    new_absolute[idx] -= transfer;
                    new_absolute[n_idx] += transfer;
                }
            }
        }

        for (i, cell) in world.cells_mut().iter_mut().enumerate() {
            cell.air_humidity = if capacity[i] > 1e-6 {
                (new_absolute[i] / capacity[i]).max(0.0)
            } else {
                0.0
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::cell::Cell;
    use crate::world::World;

    fn flat_world(size: u32) -> World {
        let cells = (0..size)
            .flat_map(|y| (0..size).map(move |x| (x, y)))
            .map(|(x, y)| Cell::new_bare(x, y, 0.0))
            .collect();
        World::new(size, size, cells)
    }

    #[test]
    fn humidity_spreads_from_a_wet_spot() {
        let mut world = flat_world(10);
        world.cell_mut(5, 5).air_humidity = 1.0;
        let config = DiffusionConfig::default();
        update(&mut world, &config, 0.75);
        assert!(world.cell(4, 5).air_humidity > 0.0 || world.cell(6, 5).air_humidity > 0.0);
    }

    #[test]
    fn uniform_humidity_stays_uniform() {
        let mut world = flat_world(8);
        for cell in world.cells_mut() {
            cell.air_humidity = 0.3;
        }
        let config = DiffusionConfig::default();
        update(&mut world, &config, 0.75);
        for cell in world.cells() {
            assert!((cell.air_humidity - 0.3).abs() < 1e-3);
        }
    }

    #[test]
    fn below_threshold_cells_do_not_emit() {
        let mut world = flat_world(8);
        world.cell_mut(3, 3).air_humidity = 0.001; // below MIN_TRANSFER_THRESHOLD
        let config = DiffusionConfig::default();
        update(&mut world, &config, 0.75);
        for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let (nx, ny) = world.neighbor_coords(3, 3, dx, dy);
            assert_eq!(world.cell(nx, ny).air_humidity, 0.0);
        }
    }

    #[test]
    fn processing_cap_stops_the_pass_early_without_panicking() {
        let mut world = flat_world(12);
        for cell in world.cells_mut() {
            cell.air_humidity = 0.9;
        }
        let config = DiffusionConfig {
            max_cells_processed_per_tick: 10,
            ..DiffusionConfig::default()
        };
        update(&mut world, &config, 0.75);
        // Should not panic and should leave the grid in a finite state.
        for cell in world.cells() {
            assert!(cell.air_humidity.is_finite());
        }
    }
}
