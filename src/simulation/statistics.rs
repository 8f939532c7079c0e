use crate::simulation::GameTime;
use crate::world::World;

/// Per-tick aggregate report returned to the tick driver and, in turn, to
/// query-surface callers that want a cheap summary instead of the whole grid.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub tick: u64,
    pub game_time: GameTime,
    pub tick_duration_ms: f32,
    pub avg_temperature: f32,
    pub avg_moisture: f32,
    pub avg_cloud_density: f32,
    pub river_count: usize,
    pub active_water_count: usize,
    pub exceeded_time_budget: bool,
    /// Per-stage timings; populated only when `enable_performance_logging` is set.
    pub stage_timings_ms: Vec<(&'static str, f32)>,
}

/// Compute statistics for the current world state after a tick.
pub fn compute_tick_report(
    world: &World,
    tick: u64,
    game_time: GameTime,
    tick_duration_ms: f32,
    tick_time_warning_ms: u64,
    stage_timings_ms: Vec<(&'static str, f32)>,
) -> TickReport {
    let cell_count = (world.len().max(1)) as f64;
    let mut total_temp = 0.0_f64;
    let mut total_moisture = 0.0_f64;
    let mut total_cloud = 0.0_f64;

    for cell in world.cells() {
        total_temp += cell.temperature as f64;
        total_moisture += cell.moisture as f64;
        total_cloud += cell.cloud_density as f64;
    }

    TickReport {
        tick,
        game_time,
        tick_duration_ms,
        avg_temperature: (total_temp / cell_count) as f32,
        avg_moisture: (total_moisture / cell_count) as f32,
        avg_cloud_density: (total_cloud / cell_count) as f32,
        river_count: world.river_registry.river_count(),
        active_water_count: world.active_water.len(),
        exceeded_time_budget: tick_duration_ms > tick_time_warning_ms as f32,
        stage_timings_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::cell::Cell;
    use crate::world::World;

    fn world_with_temps(temps: &[f32]) -> World {
        let cells = temps
            .iter()
            .enumerate()
            .map(|(i, &t)| {
                let mut c = Cell::new_bare(i as u32, 0, 0.0);
                c.temperature = t;
                c
            })
            .collect();
        World::new(temps.len() as u32, 1, cells)
    }

    #[test]
    fn averages_are_computed_across_the_grid() {
        let world = world_with_temps(&[10.0, 20.0, 30.0]);
        let report = compute_tick_report(&world, 1, GameTime::default(), 5.0, 5000, Vec::new());
        assert!((report.avg_temperature - 20.0).abs() < 1e-3);
        assert_eq!(report.tick, 1);
    }

    #[test]
    fn exceeding_time_budget_is_flagged() {
        let world = world_with_temps(&[1.0]);
        let report = compute_tick_report(&world, 1, GameTime::default(), 9000.0, 5000, Vec::new());
        assert!(report.exceeded_time_budget);
    }

    #[test]
    fn within_budget_is_not_flagged() {
        let world = world_with_temps(&[1.0]);
        let report = compute_tick_report(&world, 1, GameTime::default(), 10.0, 5000, Vec::new());
        assert!(!report.exceeded_time_budget);
    }

    #[test]
    fn river_and_active_water_counts_reflect_the_registry() {
        let mut world = world_with_temps(&[1.0, 2.0]);
        world.river_registry.new_river(0);
        world.active_water.push(0);
        let report = compute_tick_report(&world, 1, GameTime::default(), 1.0, 5000, Vec::new());
        assert_eq!(report.river_count, 1);
        assert_eq!(report.active_water_count, 1);
    }
}
