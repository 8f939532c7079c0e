use crate::config::simulation::CondensationConfig;
use crate::world::World;

/// §4.L Condensation: supersaturated air (humidity > 1) condenses out onto
/// the ground, plus a smaller dew transfer once humidity crosses the dew
/// threshold.
pub fn update(world: &mut World, config: &CondensationConfig, max_land_moisture: f32) {
    for cell in world.cells_mut() {
        let mut ground_gain = 0.0f32;

        if cell.air_humidity > 1.0 {
            let delta = config.condensation_rate * (cell.air_humidity - 1.0);
            cell.air_humidity -= delta;
            ground_gain += delta * config.air_to_ground_factor;
        }

        if cell.air_humidity > config.dew_threshold {
            let dew = config.dew_condensation_rate * (cell.air_humidity - config.dew_threshold);
            cell.air_humidity -= dew;
            ground_gain += dew;
        }

        if ground_gain <= 0.0 {
            continue;
        }
        if cell.is_water() {
            cell.water_height += ground_gain;
            cell.recompute_altitude();
        } else {
            cell.base_moisture = (cell.base_moisture + ground_gain).min(max_land_moisture);
            cell.moisture = (cell.moisture + ground_gain).min(max_land_moisture);
        }
    }
}
