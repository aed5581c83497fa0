//! A single plant organism: an arena of owned cells organized into
//! branch chains, grown one cell at a time from branch tips.
//!
//! Every chain starts at a cell shared with its parent chain; apart
//! from those shared origins, each owned coordinate belongs to exactly
//! one chain, and the union of all chains equals the owned cell set.

use crate::config::{FailureResponse, GrowthGate, GrowthSettings};
use crate::grid::{CellType, Grid};
use crate::types::PlantId;
use crate::water;
use glam::IVec2;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

/// Candidate growth directions: everything except straight down, so
/// canopies spread sideways and upward.
const GROWTH_DIRECTIONS: [IVec2; 7] = [
    IVec2::new(0, -1),
    IVec2::new(-1, -1),
    IVec2::new(1, -1),
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(-1, 1),
    IVec2::new(1, 1),
];

/// One growable chain of cells. Inactive branches never extend again.
#[derive(Debug)]
pub struct Branch {
    pub chain: Vec<IVec2>,
    pub active: bool,
}

#[derive(Debug)]
pub struct Plant {
    id: PlantId,
    cells: Vec<IVec2>,
    branches: Vec<Branch>,
    age: u64,
    max_size: usize,
    alive: bool,
    tip_has_energy: bool,
}

impl Plant {
    pub fn new(id: PlantId, pos: IVec2, max_size: usize) -> Self {
        Self {
            id,
            cells: vec![pos],
            branches: vec![Branch {
                chain: vec![pos],
                active: true,
            }],
            age: 0,
            max_size,
            alive: true,
            tip_has_energy: false,
        }
    }

    #[inline]
    pub fn id(&self) -> PlantId {
        self.id
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[inline]
    pub fn age(&self) -> u64 {
        self.age
    }

    /// Whether the last attempted growth tip was lit. Drives the
    /// reproduction gate and external status reporting.
    #[inline]
    pub fn tip_has_energy(&self) -> bool {
        self.tip_has_energy
    }

    pub fn cells(&self) -> &[IVec2] {
        &self.cells
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn owns_cell(&self, pos: IVec2) -> bool {
        self.cells.contains(&pos)
    }

    /// One growth attempt.
    ///
    /// Ages the plant by `elapsed_ticks` (the ticks since its last
    /// attempt), occasionally roots a new branch, then picks one
    /// active branch at random and tries to extend it by a single
    /// cell. Water near the tip is the primary gate; a plant that
    /// finds none simply stalls for this attempt. Tip light is always
    /// recorded and is additionally required under
    /// [`GrowthGate::WaterAndEnergy`].
    ///
    /// Returns `true` iff a new cell was claimed.
    pub fn try_grow(
        &mut self,
        grid: &mut Grid,
        cfg: &GrowthSettings,
        elapsed_ticks: u64,
        rng: &mut impl Rng,
    ) -> bool {
        if !self.alive {
            return false;
        }
        self.age += elapsed_ticks;

        if self.size() > cfg.min_branch_size && rng.random_bool(cfg.branch_chance) {
            self.start_branch(cfg, rng);
        }

        let active: Vec<usize> = (0..self.branches.len())
            .filter(|&i| self.branches[i].active)
            .collect();
        let Some(&bi) = active.as_slice().choose(rng) else {
            // All branches stalled; the plant stays alive.
            return false;
        };
        let Some(&tip) = self.branches[bi].chain.last() else {
            self.branches[bi].active = false;
            return false;
        };

        self.tip_has_energy = grid.get(tip).is_some_and(|c| c.energy);

        let Some(water_pos) = grid.find_nearest_water(tip, cfg.water_search_radius) else {
            return false;
        };
        if cfg.gate == GrowthGate::WaterAndEnergy && !self.tip_has_energy {
            return false;
        }

        match self.find_growth_position(grid, tip, cfg, rng) {
            Some(new_pos) => {
                water::consume(grid, water_pos);
                self.cells.push(new_pos);
                let branch = &mut self.branches[bi];
                branch.chain.push(new_pos);
                if branch.chain.len() > cfg.max_branch_len {
                    branch.active = false;
                }
                grid.set_plant(new_pos, self.id);
                true
            }
            None => {
                match cfg.on_failure {
                    FailureResponse::Stall => self.branches[bi].active = false,
                    FailureResponse::Shrink => {
                        self.shrink(grid);
                    }
                }
                false
            }
        }
    }

    /// Once past the reproduction age and while the last growth tip
    /// was lit, rarely drops one bonus seed near a random branch tip,
    /// independent of the max-size event.
    pub fn try_reproduce(
        &self,
        grid: &mut Grid,
        cfg: &GrowthSettings,
        rng: &mut impl Rng,
    ) -> Option<IVec2> {
        if self.age <= cfg.repro_age || !self.tip_has_energy {
            return None;
        }
        if !rng.random_bool(cfg.repro_chance) {
            return None;
        }
        let candidates = self.seed_candidates(1);
        drop_seed(grid, &candidates, rng, 5)
    }

    fn start_branch(&mut self, cfg: &GrowthSettings, rng: &mut impl Rng) {
        if self.branches.len() >= cfg.max_branches {
            return;
        }
        let Some(&origin) = self.cells.as_slice().choose(rng) else {
            return;
        };
        self.branches.push(Branch {
            chain: vec![origin],
            active: true,
        });
    }

    /// Picks an empty neighbor of `from` that keeps distance from
    /// rival plants and does not clump against this plant's own cells.
    /// Directions are shuffled to randomize the tie-break.
    fn find_growth_position(
        &self,
        grid: &Grid,
        from: IVec2,
        cfg: &GrowthSettings,
        rng: &mut impl Rng,
    ) -> Option<IVec2> {
        let mut dirs = GROWTH_DIRECTIONS;
        dirs.shuffle(rng);

        for dir in dirs {
            let pos = from + dir;
            if !grid.is_empty(pos) {
                continue;
            }
            if self.has_rival_nearby(grid, pos, cfg.rival_spacing) {
                continue;
            }
            if self.own_cells_around(grid, pos, cfg.crowd_radius) > cfg.crowd_limit {
                continue;
            }
            return Some(pos);
        }
        None
    }

    fn has_rival_nearby(&self, grid: &Grid, center: IVec2, radius: i32) -> bool {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let Some(cell) = grid.get(center + IVec2::new(dx, dy)) else {
                    continue;
                };
                if cell.kind == CellType::Plant && cell.owner != Some(self.id) {
                    return true;
                }
            }
        }
        false
    }

    fn own_cells_around(&self, grid: &Grid, center: IVec2, radius: i32) -> usize {
        let mut count = 0;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let Some(cell) = grid.get(center + IVec2::new(dx, dy)) else {
                    continue;
                };
                if cell.kind == CellType::Plant && cell.owner == Some(self.id) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Decays the plant by one cell, taken from the end of the last
    /// branch that still has room. A plant reduced to a single cell
    /// dies instead; returns `false` in that case.
    pub fn shrink(&mut self, grid: &mut Grid) -> bool {
        if self.cells.len() <= 1 {
            self.die(grid);
            return false;
        }
        let Some(bi) = self
            .branches
            .iter()
            .rposition(|b| b.active && b.chain.len() > 1)
            .or_else(|| self.branches.iter().rposition(|b| b.chain.len() > 1))
        else {
            self.die(grid);
            return false;
        };

        let Some(removed) = self.branches[bi].chain.pop() else {
            return false;
        };
        if self.branches[bi].chain.len() <= 1 {
            self.branches[bi].active = false;
        }

        // A popped tip can still be another branch's origin; only a
        // cell no chain references is released.
        let still_referenced = self.branches.iter().any(|b| b.chain.contains(&removed));
        if !still_referenced {
            if let Some(i) = self.cells.iter().position(|&c| c == removed) {
                self.cells.swap_remove(i);
            }
            grid.set_empty(removed);
        }
        true
    }

    /// Releases every owned cell back to empty and marks the plant
    /// permanently dead.
    pub fn die(&mut self, grid: &mut Grid) {
        self.alive = false;
        for &pos in &self.cells {
            grid.set_empty(pos);
        }
    }

    /// Emits up to `count` seeds near branch tips once the plant has
    /// reached its maximum size. Attempts are bounded at `5 * count`;
    /// each placed seed claims an empty grid cell.
    pub fn generate_seeds(
        &self,
        grid: &mut Grid,
        count: usize,
        rng: &mut impl Rng,
    ) -> Vec<IVec2> {
        if self.size() < self.max_size {
            return Vec::new();
        }
        let candidates = self.seed_candidates(count);
        let mut seeds = Vec::with_capacity(count);
        let mut attempts = 0;
        while seeds.len() < count && attempts < count * 5 {
            attempts += 1;
            if let Some(pos) = drop_seed(grid, &candidates, rng, 1) {
                seeds.push(pos);
            }
        }
        seeds
    }

    /// Branch tips, padded with arbitrary owned cells when there are
    /// fewer tips than seeds wanted.
    fn seed_candidates(&self, want: usize) -> Vec<IVec2> {
        let mut candidates: Vec<IVec2> = self
            .branches
            .iter()
            .filter_map(|b| b.chain.last().copied())
            .collect();
        if candidates.len() < want {
            candidates.extend(self.cells.iter().copied());
        }
        candidates
    }
}

/// Tries up to `attempts` times to drop one seed within a small random
/// offset of a candidate cell onto an empty grid cell.
fn drop_seed(
    grid: &mut Grid,
    candidates: &[IVec2],
    rng: &mut impl Rng,
    attempts: usize,
) -> Option<IVec2> {
    for _ in 0..attempts {
        let Some(&src) = candidates.choose(rng) else {
            return None;
        };
        let pos = src + IVec2::new(rng.random_range(-2..=2), rng.random_range(-2..=2));
        if grid.is_empty(pos) && grid.set_seed(pos) {
            return Some(pos);
        }
    }
    None
}
