use rayon::prelude::*;

use crate::config::simulation::WeatherConfig;
use crate::world::World;

/// §4.E Weather: pressure field from terrain/temperature/humidity, then wind
/// vectors from the pressure gradient, smoothed against the previous tick.
///
/// Pressure itself is not persisted on `Cell` (it isn't part of the wire data
/// model) — it is recomputed into a scratch buffer every tick and discarded
/// once wind has been derived from it.
pub fn update(world: &mut World, config: &WeatherConfig) {
    let (width, height) = world.dim();
    let len = (width as usize) * (height as usize);

    let mut pressure = vec![0.0f32; len];
    pressure
        .par_iter_mut()
        .zip(world.cells().par_iter())
        .for_each(|(p, cell)| {
            *p = config.base_pressure
                - config.pressure_lapse_rate * cell.terrain_height.max(0.0)
                + config.temp_pressure_factor * (config.temp_reference - cell.temperature)
                + config.humidity_pressure_factor * (config.humidity_reference - cell.air_humidity);
        });

    let mut wind = vec![(0.0f32, 0.0f32); len]; // (speed, direction) per cell, computed fresh
    for y in 0..height {
        for x in 0..width {
            let idx = world.index(x, y);
            let east = world.index(crate::world::wrap(x as i64 + 1, width), y);
            let west = world.index(crate::world::wrap(x as i64 - 1, width), y);
            let south = world.index(x, crate::world::wrap(y as i64 + 1, height));
            let north = world.index(x, crate::world::wrap(y as i64 - 1, height));

            let gx = (pressure[east] - pressure[west]) / 2.0;
            let gy = (pressure[south] - pressure[north]) / 2.0;

            let mut vx = -gx * config.wind_generation_factor;
            let mut vy = -gy * config.wind_generation_factor;
            let raw_speed = (vx * vx + vy * vy).sqrt();
            if raw_speed > config.max_wind_speed && raw_speed > 0.0 {
                let scale = config.max_wind_speed / raw_speed;
                vx *= scale;
                vy *= scale;
            }

            let prev = world.cell_at_index(idx);
            let (pvx, pvy) = direction_to_vector(prev.wind_speed, prev.wind_direction);
            let alpha = config.wind_smoothing_factor;
            let svx = (1.0 - alpha) * pvx + alpha * vx;
            let svy = (1.0 - alpha) * pvy + alpha * vy;

            let (speed, direction) = vector_to_direction(svx, svy);
            wind[idx] = (speed.min(config.max_wind_speed), direction);
        }
    }

    world
        .cells_mut()
        .par_iter_mut()
        .zip(wind.par_iter())
        .for_each(|(cell, &(speed, direction))| {
            cell.wind_speed = speed;
            cell.wind_direction = direction;
        });
}

/// Convert a grid-space velocity (`vx` east, `vy` south) to meteorological
/// speed/direction (0° = from north, clockwise).
pub fn vector_to_direction(vx: f32, vy: f32) -> (f32, f32) {
    let speed = (vx * vx + vy * vy).sqrt();
    if speed < 1e-9 {
        return (0.0, 0.0);
    }
    let bearing_to = vx.atan2(-vy).to_degrees();
    let direction_from = (bearing_to + 180.0).rem_euclid(360.0);
    (speed, direction_from)
}

/// Inverse of [`vector_to_direction`].
pub fn direction_to_vector(speed: f32, direction_from: f32) -> (f32, f32) {
    if speed < 1e-9 {
        return (0.0, 0.0);
    }
    let bearing_to = (direction_from - 180.0).to_radians();
    let vx = speed * bearing_to.sin();
    let vy = -speed * bearing_to.cos();
    (vx, vy)
}
