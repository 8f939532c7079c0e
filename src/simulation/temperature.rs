use rayon::prelude::*;

use crate::config::simulation::TemperatureConfig;
use crate::simulation::GameTime;
use crate::world::World;

/// §4.D Temperature: per-cell temperature from latitude zone, altitude,
/// season, and hour. Every input besides terrain height is the same for the
/// whole grid this tick, so we precompute them once and run row-parallel.
pub fn update(world: &mut World, time: &GameTime, time_config: &crate::config::simulation::TimeConfig, config: &TemperatureConfig) {
    let height = world.height();
    let width = world.width();

    let season_cosine = time.season_cosine(time_config) as f32;
    let month_idx = (time.month - 1) as usize;
    let diurnal_offset = if time.is_day {
        config.day_temps[month_idx]
    } else {
        config.night_temps[month_idx]
    };

    let mid = (config.t_warm_zone + config.t_cold_zone) / 2.0;
    let half_span = (config.t_warm_zone - config.t_cold_zone) / 2.0;

    world
        .cells_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(y, row)| {
            let theta = (y as f32 / height as f32) * std::f32::consts::TAU;
            let z = (2.0 * theta).sin();
            let d = z.abs();
            let sign = if z > 0.0 { 1.0 } else { -1.0 };

            let t_base = mid + sign * d * half_span;
            let amplitude = config.seasonal_amplitude_min
                + (config.seasonal_amplitude_max - config.seasonal_amplitude_min) * d;
            let t_season = amplitude * season_cosine * sign;

            for cell in row.iter_mut() {
                let t_alt = config.lapse_rate * cell.terrain_height.max(0.0);
                cell.temperature = t_base + t_alt + t_season + diurnal_offset;
            }
        });
}
