use crate::config::simulation::CloudConfig;
use crate::simulation::wind_transport::compass_offset;
use crate::world::World;

/// §4.G Cloud formation/dissipation, then upwind advection of the resulting
/// cloud field (same compass-offset scheme as wind transport, double-buffered
/// so advection doesn't depend on sweep order).
pub fn update(world: &mut World, config: &CloudConfig, max_wind_speed: f32) {
    for cell in world.cells_mut() {
        let alt_norm = (cell.terrain_height.max(0.0) / config.altitude_norm_reference).min(1.0);
        let s_thr = config.base_saturation * (1.0 - config.altitude_saturation_factor * alt_norm);
        if cell.air_humidity > s_thr {
            let delta = (cell.air_humidity - s_thr) * config.cloud_formation_rate;
            cell.cloud_density = (cell.cloud_density + delta).min(1.0);
            cell.air_humidity -= delta;
        } else {
            let delta = (s_thr - cell.air_humidity) * config.cloud_dissipation_rate;
            cell.cloud_density = (cell.cloud_density - delta).max(0.0);
        }
    }

    let (width, height) = world.dim();
    let old_clouds: Vec<f32> = world.cells().iter().map(|c| c.cloud_density).collect();
    let mut new_clouds = old_clouds.clone();

    for y in 0..height {
        for x in 0..width {
            let idx = world.index(x, y);
            let cell = world.cell_at_index(idx);
            if cell.wind_speed <= 0.0 {
                continue;
            }
            let (dx, dy) = compass_offset(cell.wind_direction);
            let source_idx = world.neighbor_index(x, y, dx, dy);
            if source_idx == idx {
                continue;
            }
            let speed_factor = (cell.wind_speed / max_wind_speed).min(1.0);
            let k = config.cloud_advection_rate * speed_factor;
            let transfer = old_clouds[source_idx] * k;
            new_clouds[source_idx] -= transfer;
            new_clouds[idx] += transfer;
        }
    }

    for (cell, &density) in world.cells_mut().iter_mut().zip(new_clouds.iter()) {
        cell.cloud_density = density.clamp(0.0, 1.0);
    }
}
