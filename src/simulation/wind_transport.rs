use crate::config::simulation::WindTransportConfig;
use crate::world::World;

/// §4.F Wind transport: upwind advection of humidity and heat.
///
/// The source cell for a destination `(x, y)` is the wrap-neighbor lying in
/// the compass direction the wind is blowing *from* — the same bearing
/// `wind_direction` already encodes (0° = from north, clockwise), which is
/// why the offset below reuses the same sin/-cos compass mapping as
/// `weather::direction_to_vector` rather than its negation.
pub fn update(world: &mut World, config: &WindTransportConfig, max_wind_speed: f32) {
    let (width, height) = world.dim();
    let len = world.len();

    let old_humidity: Vec<f32> = world.cells().iter().map(|c| c.air_humidity).collect();
    let old_temperature: Vec<f32> = world.cells().iter().map(|c| c.temperature).collect();

    let mut delta_humidity = vec![0.0f32; len];
    let mut delta_temperature = vec![0.0f32; len];

    for y in 0..height {
        for x in 0..width {
            let idx = world.index(x, y);
            let cell = world.cell_at_index(idx);
            if cell.wind_speed < config.min_wind_for_transport {
                continue;
            }
            let (dx, dy) = compass_offset(cell.wind_direction);
            let source_idx = world.neighbor_index(x, y, dx, dy);
            if source_idx == idx {
                continue;
            }

            let speed_factor = (cell.wind_speed / max_wind_speed).min(1.0);

            let k_h = config.humidity_transfer_rate * speed_factor;
            let dh = old_humidity[source_idx] * k_h;
            delta_humidity[source_idx] -= dh;
            delta_humidity[idx] += dh;

            let k_t = config.heat_transfer_rate * speed_factor;
            let dt = (old_temperature[source_idx] - old_temperature[idx]) * k_t;
            delta_temperature[idx] += dt;
            delta_temperature[source_idx] -= dt;
        }
    }

    for (i, cell) in world.cells_mut().iter_mut().enumerate() {
        cell.air_humidity = old_humidity[i] + delta_humidity[i];
        cell.temperature = old_temperature[i] + delta_temperature[i];
    }
}

/// Wrap-neighbor offset lying in compass direction `direction_from` (degrees,
/// 0 = north, clockwise), rounded to the nearest of the 8 Moore directions.
pub fn compass_offset(direction_from_deg: f32) -> (i32, i32) {
    let rad = direction_from_deg.to_radians();
    let dx = rad.sin().round() as i32;
    let dy = (-rad.cos()).round() as i32;
    (dx.clamp(-1, 1), dy.clamp(-1, 1))
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
    fn compass_offset_matches_cardinal_directions() {
        assert_eq!(compass_offset(0.0), (0, -1)); // north
        assert_eq!(compass_offset(90.0), (1, 0)); // east
        assert_eq!(compass_offset(180.0), (0, 1)); // south
        assert_eq!(compass_offset(270.0), (-1, 0)); // west
    }

    #[test]
    fn still_air_leaves_fields_untouched() {
        let mut world = flat_world(8);
        for cell in world.cells_mut() {
            cell.air_humidity = 0.4;
            cell.temperature = 10.0;
        }
        let config = WindTransportConfig::default();
        update(&mut world, &config, 25.0);
        for cell in world.cells() {
            assert_eq!(cell.air_humidity, 0.4);
            assert_eq!(cell.temperature, 10.0);
        }
    }

    #[test]
    fn humidity_is_conserved_across_the_grid() {
        let mut world = flat_world(10);
        for (i, cell) in world.cells_mut().iter_mut().enumerate() {
            cell.air_humidity = 0.1 + (i % 5) as f32 * 0.05;
            cell.wind_speed = 5.0;
            cell.wind_direction = 45.0;
        }
        let config = WindTransportConfig::default();
        let total_before: f32 = world.cells().iter().map(|c| c.air_humidity).sum();
        update(&mut world, &config, 25.0);
        let total_after: f32 = world.cells().iter().map(|c| c.air_humidity).sum();
        assert!((total_before - total_after).abs() < 1e-3);
    }

    #[test]
    fn heat_moves_from_hot_source_toward_cold_destination() {
        let mut world = flat_world(8);
        for cell in world.cells_mut() {
            cell.wind_speed = 10.0;
            cell.wind_direction = 0.0; // wind from the north: source is the cell to the north
        }
        world.cell_mut(3, 2).temperature = 30.0; // north neighbor of (3,3)
        world.cell_mut(3, 3).temperature = 0.0;
        let config = WindTransportConfig::default();
        update(&mut world, &config, 25.0);
        assert!(world.cell(3, 3).temperature > 0.0, "destination should warm up");
        assert!(world.cell(3, 2).temperature < 30.0, "source should cool down");
    }

    #[test]
    fn below_min_wind_threshold_nothing_transfers() {
        let mut world = flat_world(6);
        for cell in world.cells_mut() {
            cell.air_humidity = 0.2;
            cell.wind_speed = 0.01;
            cell.wind_direction = 90.0;
        }
        world.cell_mut(2, 2).air_humidity = 0.9;
        let config = WindTransportConfig::default();
        update(&mut world, &config, 25.0);
        assert_eq!(world.cell(3, 2).air_humidity, 0.2);
    }
}
