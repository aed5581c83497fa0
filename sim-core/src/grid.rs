//! The authoritative 2-D cell matrix and its spatial queries.
//!
//! The grid is the only shared mutable state of the simulation. Every
//! operation is bounds-checked and reports failure through `None` /
//! `false` rather than panicking.

use crate::types::PlantId;
use glam::IVec2;

/// What occupies a cell. Exactly one variant per cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellType {
    Empty,
    Plant,
    Seed,
    Water,
}

/// One grid unit.
///
/// `owner` is `Some` iff `kind == CellType::Plant`. `has_water` can be
/// set on any non-blocking cell (moisture flowed out from a source),
/// while `is_source` marks river/lake cells created by generation.
#[derive(Clone, Copy, Debug)]
pub struct Cell {
    pub kind: CellType,
    pub owner: Option<PlantId>,
    pub energy: bool,
    pub has_water: bool,
    pub is_source: bool,
}

impl Cell {
    const EMPTY: Cell = Cell {
        kind: CellType::Empty,
        owner: None,
        energy: false,
        has_water: false,
        is_source: false,
    };
}

/// Square, row-major cell matrix addressed by `IVec2` coordinates
/// with `(0, 0)` in the top-left corner and `y` growing downward.
#[derive(Debug)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::EMPTY; size * size],
        }
    }

    /// Side length in cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells.
    #[inline]
    pub fn area(&self) -> usize {
        self.size * self.size
    }

    #[inline]
    pub fn in_bounds(&self, pos: IVec2) -> bool {
        let n = self.size as i32;
        pos.x >= 0 && pos.x < n && pos.y >= 0 && pos.y < n
    }

    #[inline]
    fn index(&self, pos: IVec2) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.size + pos.x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, pos: IVec2) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    /// Mutable, bounds-checked cell access.
    ///
    /// This is the merge-style update primitive: callers mutate only
    /// the fields they own and leave the rest of the cell intact.
    pub fn get_mut(&mut self, pos: IVec2) -> Option<&mut Cell> {
        self.index(pos).map(|i| &mut self.cells[i])
    }

    /// Claims a cell for a plant, preserving its water/energy fields.
    /// Returns `false` out of bounds.
    pub fn set_plant(&mut self, pos: IVec2, id: PlantId) -> bool {
        match self.get_mut(pos) {
            Some(cell) => {
                cell.kind = CellType::Plant;
                cell.owner = Some(id);
                true
            }
            None => false,
        }
    }

    /// Marks a cell as a pending seed. Returns `false` out of bounds.
    pub fn set_seed(&mut self, pos: IVec2) -> bool {
        match self.get_mut(pos) {
            Some(cell) => {
                cell.kind = CellType::Seed;
                cell.owner = None;
                true
            }
            None => false,
        }
    }

    /// Releases a cell back to `Empty`, preserving its water fields.
    /// Returns `false` out of bounds.
    pub fn set_empty(&mut self, pos: IVec2) -> bool {
        match self.get_mut(pos) {
            Some(cell) => {
                cell.kind = CellType::Empty;
                cell.owner = None;
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self, pos: IVec2) -> bool {
        self.get(pos).is_some_and(|c| c.kind == CellType::Empty)
    }

    /// Returns `true` iff the Chebyshev-`radius` square around `pos`
    /// contains no Plant or Seed cell, ignoring the center cell and any
    /// cells owned by `exclude`.
    pub fn is_area_clear(&self, pos: IVec2, radius: i32, exclude: Option<PlantId>) -> bool {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let Some(cell) = self.get(pos + IVec2::new(dx, dy)) else {
                    continue;
                };
                match cell.kind {
                    CellType::Plant | CellType::Seed => {
                        if exclude.is_some() && cell.owner == exclude {
                            continue;
                        }
                        return false;
                    }
                    _ => {}
                }
            }
        }
        true
    }

    /// Expanding-ring search for the nearest wet cell.
    ///
    /// The center itself is checked first, then Chebyshev rings of
    /// radius `1..=max_radius`. Returns the first wet coordinate found
    /// or `None` if none is in range.
    pub fn find_nearest_water(&self, pos: IVec2, max_radius: i32) -> Option<IVec2> {
        if self.get(pos).is_some_and(|c| c.has_water) {
            return Some(pos);
        }
        for r in 1..=max_radius {
            for dy in -r..=r {
                for dx in -r..=r {
                    // Ring only; the interior was covered by smaller radii.
                    if dx.abs() != r && dy.abs() != r {
                        continue;
                    }
                    let p = pos + IVec2::new(dx, dy);
                    if self.get(p).is_some_and(|c| c.has_water) {
                        return Some(p);
                    }
                }
            }
        }
        None
    }

    /// The up-to-4 orthogonal in-bounds neighbors of `pos`.
    pub fn neighbors(&self, pos: IVec2) -> Vec<IVec2> {
        const ORTHOGONAL: [IVec2; 4] = [
            IVec2::new(0, -1),
            IVec2::new(1, 0),
            IVec2::new(0, 1),
            IVec2::new(-1, 0),
        ];
        ORTHOGONAL
            .iter()
            .map(|&d| pos + d)
            .filter(|&p| self.in_bounds(p))
            .collect()
    }

    /// Resizes the grid, preserving the overlapping top-left region.
    ///
    /// Shrinking is a defined lossy truncation: cells outside the new
    /// bounds are dropped, everything else keeps its full state.
    pub fn resize(&mut self, new_size: usize) {
        let old_size = self.size;
        let old_cells = std::mem::replace(&mut self.cells, vec![Cell::EMPTY; new_size * new_size]);
        self.size = new_size;

        let keep = old_size.min(new_size);
        for y in 0..keep {
            for x in 0..keep {
                self.cells[y * new_size + x] = old_cells[y * old_size + x];
            }
        }
    }

    /// Resets every cell to `Empty` with no water or energy.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    pub fn count_kind(&self, kind: CellType) -> usize {
        self.cells.iter().filter(|c| c.kind == kind).count()
    }

    /// Number of wet cells, sources and flowed moisture alike.
    pub fn count_wet(&self) -> usize {
        self.cells.iter().filter(|c| c.has_water).count()
    }

    /// Iterates all cells in row-major order together with their
    /// coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (IVec2, &Cell)> {
        let n = self.size;
        self.cells.iter().enumerate().map(move |(i, c)| {
            let pos = IVec2::new((i % n) as i32, (i / n) as i32);
            (pos, c)
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }
}
