use serde::{Deserialize, Serialize};

/// Sentinel used for `distance_from_water` before the ground-moisture BFS reaches a cell.
pub const UNREACHED: u32 = u32::MAX;

/// Ground/water classification, derived from moisture and water state each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    Rock,
    Earth,
    Mud,
    Spring,
    River,
}

impl CellType {
    pub fn is_water(self) -> bool {
        matches!(self, CellType::Spring | CellType::River)
    }

    /// Classify by moisture fraction alone; callers override with Spring/River where applicable.
    pub fn from_moisture(moisture: f32, mud_threshold: f32, earth_threshold: f32) -> CellType {
        if moisture > mud_threshold {
            CellType::Mud
        } else if moisture > earth_threshold {
            CellType::Earth
        } else {
            CellType::Rock
        }
    }
}

/// Stable identifier for a named river, interned as a small integer.
pub type RiverId = u32;

/// One grid site. All physical quantities are plain floats; toroidal neighbor
/// access is the World's job, never the cell's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
    pub terrain_height: f32,
    pub water_height: f32,
    pub altitude: f32,
    pub base_moisture: f32,
    pub moisture: f32,
    pub distance_from_water: u32,
    pub cell_type: CellType,
    pub temperature: f32,
    pub air_humidity: f32,
    pub cloud_density: f32,
    pub precipitation_rate: f32,
    pub wind_speed: f32,
    pub wind_direction: f32,
    pub river_name: Option<RiverId>,
}

impl Cell {
    pub fn new_bare(x: u32, y: u32, terrain_height: f32) -> Self {
        Cell {
            x,
            y,
            terrain_height,
            water_height: 0.0,
            altitude: terrain_height,
            base_moisture: 0.0,
            moisture: 0.0,
            distance_from_water: UNREACHED,
            cell_type: CellType::Rock,
            temperature: 0.0,
            air_humidity: 0.0,
            cloud_density: 0.0,
            precipitation_rate: 0.0,
            wind_speed: 0.0,
            wind_direction: 0.0,
            river_name: None,
        }
    }

    pub fn recompute_altitude(&mut self) {
        self.altitude = self.terrain_height + self.water_height;
    }

    pub fn is_water(&self) -> bool {
        self.cell_type.is_water()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_bare_cell_has_zeroed_state() {
        let cell = Cell::new_bare(3, 4, 120.0);
        assert_eq!(cell.altitude, 120.0);
        assert_eq!(cell.water_height, 0.0);
        assert_eq!(cell.distance_from_water, UNREACHED);
        assert_eq!(cell.cell_type, CellType::Rock);
    }

    #[test]
    fn recompute_altitude_tracks_terrain_and_water() {
        let mut cell = Cell::new_bare(0, 0, 100.0);
        cell.water_height = 2.5;
        cell.recompute_altitude();
        assert_eq!(cell.altitude, 102.5);
    }

    #[test]
    fn water_cell_types() {
        assert!(CellType::Spring.is_water());
        assert!(CellType::River.is_water());
        assert!(!CellType::Rock.is_water());
        assert!(!CellType::Earth.is_water());
        assert!(!CellType::Mud.is_water());
    }

    #[test]
    fn from_moisture_thresholds() {
        assert_eq!(CellType::from_moisture(0.9, 0.78, 0.22), CellType::Mud);
        assert_eq!(CellType::from_moisture(0.5, 0.78, 0.22), CellType::Earth);
        assert_eq!(CellType::from_moisture(0.05, 0.78, 0.22), CellType::Rock);
    }
}
