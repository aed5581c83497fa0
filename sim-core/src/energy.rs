//! Per-tick light field over the grid.
//!
//! Light falls straight down each column: every cell is lit from the
//! top of the column down to and including the first plant cell, and
//! everything below that plant stays dark for the rest of the tick.
//! Water does not block light.

use crate::grid::{CellType, Grid};
use glam::IVec2;

/// Recomputes the binary light field for the whole grid.
///
/// Resets every cell's `energy` to `false`, then scans each column
/// from `y = 0` downward, lighting cells until the first plant is
/// passed. Intentionally column-local and O(N²) per call.
pub fn update(grid: &mut Grid) {
    for cell in grid.iter_mut() {
        cell.energy = false;
    }

    let n = grid.size() as i32;
    for x in 0..n {
        let mut blocked = false;
        for y in 0..n {
            let Some(cell) = grid.get_mut(IVec2::new(x, y)) else {
                continue;
            };
            if blocked {
                continue;
            }
            cell.energy = true;
            if cell.kind == CellType::Plant {
                blocked = true;
            }
        }
    }
}

/// Whether the cell at `pos` received light this tick.
pub fn has_energy(grid: &Grid, pos: IVec2) -> bool {
    grid.get(pos).is_some_and(|c| c.energy)
}

/// Total number of lit cells, for external reporting.
pub fn total_energy(grid: &Grid) -> usize {
    grid.iter().filter(|(_, c)| c.energy).count()
}
