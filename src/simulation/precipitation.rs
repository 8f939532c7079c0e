use crate::config::simulation::PrecipitationConfig;
use crate::world::World;

/// §4.H Precipitation: clouds above threshold rain out into moisture/water,
/// cooling the cell slightly; clouds below threshold let the rate decay.
pub fn update(world: &mut World, config: &PrecipitationConfig, max_land_moisture: f32) {
    for cell in world.cells_mut() {
        if cell.cloud_density > config.precip_threshold {
            let rate = (config.precip_rate_factor
                * cell.cloud_density
                * (0.5 + 0.5 * cell.air_humidity.min(1.0)))
            .clamp(0.0, 1.0);
            cell.precipitation_rate = rate;

            let consumed = rate.min(cell.cloud_density);
            cell.cloud_density -= consumed;
            cell.temperature -= config.cool_per_precip * rate;

            if cell.is_water() {
                cell.water_height += consumed;
            } else {
                cell.base_moisture = (cell.base_moisture + consumed).min(max_land_moisture);
                cell.moisture = (cell.moisture + consumed).min(max_land_moisture);
            }
            cell.recompute_altitude();
        } else {
            cell.precipitation_rate *= 1.0 - config.precip_decay_rate;
            if cell.precipitation_rate < 1e-4 {
                cell.precipitation_rate = 0.0;
            }
        }
    }
}
