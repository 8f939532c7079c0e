pub mod cell;
pub mod generation;
pub mod river;

use serde::{Deserialize, Serialize};

use crate::config::generation::GenerationConfig;
pub use cell::{Cell, CellType, RiverId, UNREACHED};
pub use river::RiverRegistry;

/// Moore-neighborhood offsets in the fixed compass order hydrology's tie-break
/// rule depends on: N, S, W, E, NW, NE, SW, SE. `y` grows downward (row index).
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (0, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (1, -1),
    (-1, 1),
    (1, 1),
];

/// Branchless wrap of a signed coordinate into `[0, modulus)`.
pub fn wrap(coord: i64, modulus: u32) -> u32 {
    let m = modulus as i64;
    (((coord % m) + m) % m) as u32
}

/// Owns the toroidal grid of cells plus the bookkeeping (river identity,
/// active water-cell set) that persists across ticks. Every subsystem reads
/// and writes cells exclusively through this type — no raw `Vec` indexing
/// outside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
    #[serde(skip)]
    pub river_registry: RiverRegistry,
    /// Indices of every spring/river cell, append-only within a tick; rebuilt
    /// lazily whenever hydrology creates a new water cell.
    pub active_water: Vec<usize>,
}

impl World {
    pub fn new(width: u32, height: u32, cells: Vec<Cell>) -> Self {
        assert_eq!(cells.len(), (width as usize) * (height as usize));
        let active_water = cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_water())
            .map(|(i, _)| i)
            .collect();
        World {
            width,
            height,
            cells,
            river_registry: RiverRegistry::new(),
            active_water,
        }
    }

    pub fn dim(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    pub fn cell(&self, x: u32, y: u32) -> &Cell {
        let idx = self.index(wrap(x as i64, self.width), wrap(y as i64, self.height));
        &self.cells[idx]
    }

    pub fn cell_mut(&mut self, x: u32, y: u32) -> &mut Cell {
        let idx = self.index(wrap(x as i64, self.width), wrap(y as i64, self.height));
        &mut self.cells[idx]
    }

    pub fn cell_at_index(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    pub fn cell_at_index_mut(&mut self, idx: usize) -> &mut Cell {
        &mut self.cells[idx]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Index of the wrap-neighbor at signed offset `(dx, dy)` from `(x, y)`.
    pub fn neighbor_index(&self, x: u32, y: u32, dx: i32, dy: i32) -> usize {
        let nx = wrap(x as i64 + dx as i64, self.width);
        let ny = wrap(y as i64 + dy as i64, self.height);
        self.index(nx, ny)
    }

    /// The 8 Moore neighbors of `(x, y)`, wrapped, in the fixed compass order
    /// `NEIGHBOR_OFFSETS` (N, S, W, E, NW, NE, SW, SE).
    pub fn neighbors(&self, x: u32, y: u32) -> [usize; 8] {
        let mut out = [0usize; 8];
        for (i, &(dx, dy)) in NEIGHBOR_OFFSETS.iter().enumerate() {
            out[i] = self.neighbor_index(x, y, dx, dy);
        }
        out
    }

    pub fn neighbor_coords(&self, x: u32, y: u32, dx: i32, dy: i32) -> (u32, u32) {
        (wrap(x as i64 + dx as i64, self.width), wrap(y as i64 + dy as i64, self.height))
    }

    /// Rebuild the active-water index list from scratch. Cheap relative to a
    /// tick's other work; used after regeneration and as a consistency check.
    pub fn rebuild_active_water(&mut self) {
        self.active_water = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_water())
            .map(|(i, _)| i)
            .collect();
    }
}

/// Rebuild an empty world shell from generation config dimensions; actual
/// terrain/spring population happens in `generation::generate_world`.
pub fn empty_world(config: &GenerationConfig) -> World {
    let size = config.grid_size;
    let cells = (0..size)
        .flat_map(|y| (0..size).map(move |x| (x, y)))
        .map(|(x, y)| Cell::new_bare(x, y, 0.0))
        .collect();
    World::new(size, size, cells)
}
