use crate::config::simulation::EvaporationConfig;
use crate::world::World;

/// §4.J Evaporation (open water) and evapotranspiration (vegetated ground).
pub fn update(world: &mut World, config: &EvaporationConfig) {
    for cell in world.cells_mut() {
        if cell.temperature < 0.0 {
            continue;
        }
        let k_t = (1.0 + config.evap_temp_coeff * cell.temperature).max(0.0);
        let k_def = (1.0 - cell.air_humidity).max(0.0);

        if cell.is_water() && cell.water_height > 0.0 {
            let k_a = (cell.water_height / config.max_evap_depth).min(1.0);
            let dw = (config.base_evap_rate * k_t * k_a * k_def).min(cell.water_height);
            cell.water_height -= dw;
            cell.recompute_altitude();
            cell.air_humidity = (cell.air_humidity + dw * config.water_to_humidity_factor).min(1.5);
        } else if !cell.is_water() && cell.base_moisture >= config.min_ground_moisture {
            let dw = (config.base_evapotranspiration * cell.base_moisture * k_t * k_def)
                .min(cell.base_moisture);
            cell.base_moisture -= dw;
            cell.moisture = (cell.moisture - dw).max(0.0);
            cell.air_humidity = (cell.air_humidity + dw * config.water_to_humidity_factor).min(1.5);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::cell::{Cell, CellType};
    use crate::world::World;

    fn flat_world(size: u32) -> World {
        let cells = (0..size)
            .flat_map(|y| (0..size).map(move |x| (x, y)))
            .map(|(x, y)| Cell::new_bare(x, y, 0.0))
            .collect();
        World::new(size, size, cells)
    }

    #[test]
    fn water_cell_evaporates_into_humidity() {
        let mut world = flat_world(4);
        let cell = world.cell_mut(1, 1);
        cell.cell_type = CellType::River;
        cell.water_height = 1.0;
        cell.temperature = 20.0;
        cell.air_humidity = 0.2;
        let config = EvaporationConfig::default();
        update(&mut world, &config);
        let after = world.cell(1, 1);
        assert!(after.water_height < 1.0);
        assert!(after.air_humidity > 0.2);
    }

    #[test]
    fn freezing_water_does_not_evaporate() {
        let mut world = flat_world(4);
        let cell = world.cell_mut(1, 1);
        cell.cell_type = CellType::River;
        cell.water_height = 1.0;
        cell.temperature = -5.0;
        let config = EvaporationConfig::default();
        update(&mut world, &config);
        assert_eq!(world.cell(1, 1).water_height, 1.0);
    }

    #[test]
    fn saturated_air_suppresses_evaporation() {
        let mut world = flat_world(4);
        let cell = world.cell_mut(1, 1);
        cell.cell_type = CellType::River;
        cell.water_height = 1.0;
        cell.temperature = 20.0;
        cell.air_humidity = 1.0;
        let config = EvaporationConfig::default();
        update(&mut world, &config);
        assert_eq!(world.cell(1, 1).water_height, 1.0);
    }

    #[test]
    fn moist_ground_below_water_evapotranspires() {
        let mut world = flat_world(4);
        let cell = world.cell_mut(1, 1);
        cell.base_moisture = 0.5;
        cell.moisture = 0.5;
        cell.temperature = 15.0;
        let config = EvaporationConfig::default();
        update(&mut world, &config);
        assert!(world.cell(1, 1).base_moisture < 0.5);
    }

    #[test]
    fn dry_ground_below_threshold_is_untouched() {
        let mut world = flat_world(4);
        let cell = world.cell_mut(1, 1);
        cell.base_moisture = 0.01;
        cell.moisture = 0.01;
        cell.temperature = 15.0;
        let config = EvaporationConfig::default();
        update(&mut world, &config);
        assert_eq!(world.cell(1, 1).base_moisture, 0.01);
    }
}
