use std::collections::VecDeque;

use tracing::warn;

use crate::config::simulation::MoistureConfig;
use crate::world::cell::CellType;
use crate::world::{World, NEIGHBOR_OFFSETS};

/// §4.M Ground moisture propagation: breadth-first spread from every water
/// cell, evaporative decay, optional Laplacian smoothing, then `cell_type`
/// reclassification from the resulting moisture.
pub fn update(world: &mut World, config: &MoistureConfig, max_land_moisture: f32) {
    let len = world.len();
    let mut visited = vec![false; len];
    let mut queue: VecDeque<(usize, u32)> = VecDeque::new();

    for idx in 0..len {
        if world.cell_at_index(idx).is_water() {
            let cell = world.cell_at_index_mut(idx);
            cell.base_moisture = 1.0;
            cell.moisture = 1.0;
            cell.distance_from_water = 0;
            visited[idx] = true;
            queue.push_back((idx, 0));
        }
    }

    let mut processed: u64 = 0;
    let mut cap_hit = false;

    'bfs: while let Some((idx, d)) = queue.pop_front() {
        let (x, y) = {
            let c = world.cell_at_index(idx);
            (c.x, c.y)
        };
        let parent_water_height = world.cell_at_index(idx).water_height;
        let parent_altitude = world.cell_at_index(idx).altitude;

        for n_idx in world.neighbors(x, y) {
            if visited[n_idx] || world.cell_at_index(n_idx).is_water() {
                continue;
            }
            if processed >= config.max_cells_processed {
                cap_hit = true;
                break 'bfs;
            }
            processed += 1;

            let dp = d + 1;
            if dp > config.max_propagation_distance {
                continue;
            }

            let decay = (-(dp as f32) * config.distance_decay_rate).exp();
            let water_boost = 1.0
                + (parent_water_height * config.water_volume_boost_factor)
                    .min(config.max_water_volume_boost);
            let base = decay * config.transfer_rate * water_boost;
            if base < config.min_transfer {
                continue;
            }

            let neighbor_altitude = world.cell_at_index(n_idx).altitude;
            let delta_alt = neighbor_altitude - parent_altitude;
            let mut altitude_mult = if delta_alt > 0.0 {
                1.0 - delta_alt * config.uphill_penalty_percent
            } else {
                1.0 + (-delta_alt) * config.downhill_bonus_percent
            };
            let terrain_height = world.cell_at_index(n_idx).terrain_height;
            altitude_mult -= terrain_height.max(0.0) * config.altitude_dryness_percent;
            let altitude_mult = altitude_mult.clamp(0.05, 1.5);

            let neighbor_base = world.cell_at_index(n_idx).base_moisture;
            let saturation_dampener = (1.0 - neighbor_base / max_land_moisture)
                .max(0.0)
                .powf(config.saturation_exponent);

            let increment = base * altitude_mult * saturation_dampener;
            if increment > 1e-5 {
                let cell = world.cell_at_index_mut(n_idx);
                cell.base_moisture = (cell.base_moisture + increment).min(max_land_moisture);
                cell.moisture = cell.base_moisture;
                cell.distance_from_water = dp;
                visited[n_idx] = true;
                queue.push_back((n_idx, dp));
            }
        }
    }

    if cap_hit {
        warn!(
            processed,
            cap = config.max_cells_processed,
            "ground moisture propagation hit its per-tick processing cap"
        );
    }

    for cell in world.cells_mut() {
        if !cell.is_water() {
            cell.base_moisture = (cell.base_moisture * config.base_decay).max(1e-6);
            cell.moisture = (cell.moisture * config.base_decay).max(1e-6);
        }
    }

    for _ in 0..config.smoothing_iterations {
        laplacian_smooth(world);
    }

    for cell in world.cells_mut() {
        if !cell.is_water() {
            cell.cell_type =
                CellType::from_moisture(cell.moisture, config.mud_threshold, config.earth_threshold);
        }
    }
}

/// One pass of diagonal-weighted Laplacian smoothing over non-water cells,
/// blended 50/50 with the prior value to keep gradients organic rather than
/// fully flattened in a single iteration.
fn laplacian_smooth(world: &mut World) {
    let (width, height) = world.dim();
    let old: Vec<f32> = world.cells().iter().map(|c| c.base_moisture).collect();
    let diag_weight = std::f32::consts::FRAC_1_SQRT_2;
    let mut blended = old.clone();

    for y in 0..height {
        for x in 0..width {
            let idx = world.index(x, y);
            if world.cell_at_index(idx).is_water() {
                continue;
            }
            let mut sum = 0.0f32;
            let mut weight_total = 0.0f32;
            for &(dx, dy) in NEIGHBOR_OFFSETS.iter() {
                let n_idx = world.neighbor_index(x, y, dx, dy);
                let weight = if dx != 0 && dy != 0 { diag_weight } else { 1.0 };
                sum += old[n_idx] * weight;
                weight_total += weight;
            }
            let avg = sum / weight_total;
            blended[idx] = (old[idx] + avg) / 2.0;
        }
    }

    for (cell, &value) in world.cells_mut().iter_mut().zip(blended.iter()) {
        if !cell.is_water() {
            cell.base_moisture = value;
            cell.moisture = value;
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
    fn moisture_spreads_outward_from_a_spring() {
        let mut world = flat_world(12);
        world.cell_mut(6, 6).cell_type = CellType::Spring;
        world.rebuild_active_water();
        let config = MoistureConfig::default();
        update(&mut world, &config, 1.0);

        assert_eq!(world.cell(6, 6).base_moisture, 1.0);
        let neighbor = world.cell(5, 6);
        assert!(neighbor.base_moisture > 0.0);
        assert_eq!(neighbor.distance_from_water, 1);
    }

    #[test]
    fn moisture_decays_with_distance() {
        let mut world = flat_world(20);
        world.cell_mut(10, 10).cell_type = CellType::Spring;
        world.rebuild_active_water();
        let config = MoistureConfig::default();
        update(&mut world, &config, 1.0);

        let near = world.cell(9, 10).base_moisture;
        let far = world.cell(4, 10).base_moisture;
        assert!(near >= far);
    }

    #[test]
    fn far_cells_remain_unreached_within_propagation_limit() {
        let mut world = flat_world(30);
        world.cell_mut(15, 15).cell_type = CellType::Spring;
        world.rebuild_active_water();
        let config = MoistureConfig {
            max_propagation_distance: 2,
            ..MoistureConfig::default()
        };
        update(&mut world, &config, 1.0);
        assert_eq!(world.cell(15 + 10, 15).distance_from_water, crate::world::UNREACHED);
    }

    #[test]
    fn cell_type_reflects_resulting_moisture_thresholds() {
        let mut world = flat_world(6);
        world.cell_mut(3, 3).cell_type = CellType::Spring;
        world.rebuild_active_water();
        let config = MoistureConfig::default();
        update(&mut world, &config, 1.0);
        let neighbor = world.cell(2, 3);
        assert_ne!(neighbor.cell_type, CellType::Spring);
    }

    #[test]
    fn water_cells_are_never_reclassified_by_moisture() {
        let mut world = flat_world(6);
        world.cell_mut(3, 3).cell_type = CellType::Spring;
        world.rebuild_active_water();
        let config = MoistureConfig::default();
        update(&mut world, &config, 1.0);
        assert_eq!(world.cell(3, 3).cell_type, CellType::Spring);
    }
}
