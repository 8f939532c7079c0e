use tracing::warn;

use crate::config::simulation::HydrologyConfig;
use crate::world::cell::CellType;
use crate::world::World;

/// §4.I Hydrology: erosion, downhill flow, river creation/merging, ponding,
/// and the no-progress guard. Runs serially over a snapshot of the active
/// water set taken at tick start — cells created mid-tick join
/// `world.active_water` but are not visited again until the next tick.
pub fn update(world: &mut World, config: &HydrologyConfig) {
    let snapshot = world.active_water.clone();
    let mut flow_events = 0usize;
    let mut newly_created = Vec::new();
    let mut cap_hit = false;

    'flow: for &idx in &snapshot {
        let (x, y) = {
            let cell = world.cell_at_index(idx);
            (cell.x, cell.y)
        };

        {
            let cell = world.cell_at_index_mut(idx);
            cell.terrain_height =
                (cell.terrain_height - config.erosion_rate_water * cell.water_height)
                    .max(config.terrain_floor);
            cell.water_height = (cell.water_height - config.water_height_erosion_loss).max(0.0);
            cell.recompute_altitude();
        }

        let neighbor_indices = world.neighbors(x, y);
        let water_neighbor_count = neighbor_indices
            .iter()
            .filter(|&&n| world.cell_at_index(n).is_water())
            .count();

        let mut best_idx = neighbor_indices[0];
        let mut best_altitude = world.cell_at_index(best_idx).altitude;
        for &n_idx in &neighbor_indices[1..] {
            let alt = world.cell_at_index(n_idx).altitude;
            if alt < best_altitude {
                best_altitude = alt;
                best_idx = n_idx;
            }
        }

        let lowest_is_water = world.cell_at_index(best_idx).is_water();
        if water_neighbor_count >= 2 && lowest_is_water {
            continue; // skip rule: avoid pathological merge-back
        }

        let cell_altitude = world.cell_at_index(idx).altitude;
        if best_altitude < cell_altitude {
            flow_events += 1;
            if flow_events as u32 > config.max_river_flow_iterations {
                cap_hit = true;
                break 'flow;
            }
            if lowest_is_water {
                let upstream_name = world.cell_at_index(idx).river_name;
                let downstream_name = world.cell_at_index(best_idx).river_name;
                if let (Some(up), Some(down)) = (upstream_name, downstream_name) {
                    if world.river_registry.resolve(up) != world.river_registry.resolve(down) {
                        // downstream (lower altitude) name wins the merge.
                        world.river_registry.merge(up, down);
                    }
                }
                let target = world.cell_at_index_mut(best_idx);
                target.water_height += config.pour_amount;
                target.recompute_altitude();
            } else {
                let name = match world.cell_at_index(idx).river_name {
                    Some(existing) => existing,
                    None => {
                        let fresh = world.river_registry.new_river(idx);
                        world.cell_at_index_mut(idx).river_name = Some(fresh);
                        fresh
                    }
                };
                let resolved = world.river_registry.resolve(name);
                world.river_registry.add_member(resolved, best_idx);

                let target = world.cell_at_index_mut(best_idx);
                target.cell_type = CellType::River;
                target.water_height = 0.5;
                target.base_moisture = 1.0;
                target.moisture = 1.0;
                target.distance_from_water = 0;
                target.river_name = Some(resolved);
                target.recompute_altitude();
                newly_created.push(best_idx);
            }
        } else {
            let cell = world.cell_at_index_mut(idx);
            cell.water_height += config.pour_amount;
            cell.recompute_altitude();
        }
    }

    if cap_hit {
        warn!(
            flow_events,
            cap = config.max_river_flow_iterations,
            "hydrology flow hit its per-tick river-flow iteration cap"
        );
    }

    if !newly_created.is_empty() {
        world.active_water.extend(newly_created);
    }

    if flow_events == 0 && !snapshot.is_empty() {
        let lowest = snapshot
            .iter()
            .copied()
            .min_by(|&a, &b| {
                world
                    .cell_at_index(a)
                    .altitude
                    .partial_cmp(&world.cell_at_index(b).altitude)
                    .unwrap()
            })
            .unwrap();
        let cell = world.cell_at_index_mut(lowest);
        cell.water_height += config.pour_amount / 2.0;
        cell.recompute_altitude();
    }
}
