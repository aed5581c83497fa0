//! Procedural hydrology: one-shot river/lake generation and the
//! periodic moisture flow from source cells.
//!
//! Generation grows a branching network with a recursive brush-stroke
//! walk: each branch paints discs of its current width while it
//! advances along a wobbling heading, forking into thinner children
//! until width, depth, bounds, or a collision with water it did not
//! paint itself ends it. A global coverage cap bounds the total number
//! of source cells.

use std::collections::HashSet;

use crate::config::RiverConfig;
use crate::grid::{CellType, Grid};
use glam::{IVec2, Vec2};
use rand::Rng;

/// Owns the list of source cells and the generation parameters.
///
/// Flow ([`WaterSystem::update`]) is re-run periodically by the
/// engine; generation runs once per reset.
#[derive(Debug)]
pub struct WaterSystem {
    cfg: RiverConfig,
    sources: Vec<IVec2>,
}

impl WaterSystem {
    pub fn new(cfg: RiverConfig) -> Self {
        Self {
            cfg,
            sources: Vec::new(),
        }
    }

    pub fn set_config(&mut self, cfg: RiverConfig) {
        self.cfg = cfg;
    }

    /// Number of source cells created by the last generation.
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Total wet cells on the grid (sources plus flowed moisture).
    pub fn water_cell_count(&self, grid: &Grid) -> usize {
        grid.count_wet()
    }

    /// Clears all prior water and grows a fresh river network plus a
    /// bounded number of lakes, then runs one flow pass so moisture is
    /// available before the first plants are placed.
    pub fn generate_river(&mut self, grid: &mut Grid, rng: &mut impl Rng) {
        self.reset(grid);

        let n = grid.size() as f32;
        let cap = (grid.area() as f32 * self.cfg.coverage_cap) as usize;

        // The river mouth sits on the left edge, flowing rightward.
        let mouth = Vec2::new(0.0, n * 0.4);
        self.stroke(grid, rng, cap, &HashSet::new(), mouth, 0.0, self.cfg.start_width, 0);
        self.grow_lakes(grid, rng, cap);

        self.update(grid);
        log::info!(
            "generated river network: {} source cells ({} wet)",
            self.sources.len(),
            grid.count_wet()
        );
    }

    /// Walks one branch, painting as it goes and recursing on forks.
    ///
    /// Cells painted by this stroke or any of its ancestors are
    /// "fresh" and exempt from the forward-collision check, so a
    /// branch stops on water laid down by an unrelated branch but
    /// never trips over its own trail. Forked children start inside
    /// the parent's last disc, which is why ancestor paint carries
    /// over.
    fn stroke(
        &mut self,
        grid: &mut Grid,
        rng: &mut impl Rng,
        cap: usize,
        inherited: &HashSet<IVec2>,
        start: Vec2,
        base_angle: f32,
        start_width: f32,
        depth: u32,
    ) {
        if depth > self.cfg.max_depth {
            return;
        }

        let mut fresh: HashSet<IVec2> = inherited.clone();
        let mut pos = start;
        let mut angle = base_angle;
        let mut width = start_width;

        // Hard step bound independent of the decay settings.
        let max_steps = grid.size() * 4;
        for _ in 0..max_steps {
            if width < self.cfg.min_width || self.sources.len() >= cap {
                return;
            }
            if !grid.in_bounds(pos.as_ivec2()) {
                return;
            }

            let ahead = (pos + Vec2::from_angle(angle) * (width * 0.5 + 1.0)).as_ivec2();
            if self.collides(grid, &fresh, ahead) {
                return;
            }

            self.paint_disc(grid, &mut fresh, cap, pos, width * 0.5);

            if width > self.cfg.min_width * 1.5 && rng.random_bool(self.cfg.fork_chance) {
                let spread =
                    rng.random_range(self.cfg.fork_spread_min..=self.cfg.fork_spread_max);
                let child_width = width * self.cfg.width_falloff;
                self.stroke(grid, rng, cap, &fresh, pos, angle - spread, child_width, depth + 1);
                self.stroke(grid, rng, cap, &fresh, pos, angle + spread, child_width, depth + 1);
                if rng.random_bool(self.cfg.trident_chance) {
                    self.stroke(grid, rng, cap, &fresh, pos, angle, child_width, depth + 1);
                }
                return;
            }

            angle += rng.random_range(-self.cfg.wobble..=self.cfg.wobble);
            angle = angle.clamp(base_angle - self.cfg.max_turn, base_angle + self.cfg.max_turn);
            pos += Vec2::from_angle(angle) * self.cfg.step_len;
            width -= self.cfg.width_decay;
        }
    }

    /// Forward collision: source water not painted by the current stroke.
    fn collides(&self, grid: &Grid, fresh: &HashSet<IVec2>, pos: IVec2) -> bool {
        grid.get(pos).is_some_and(|c| c.is_source) && !fresh.contains(&pos)
    }

    fn paint_disc(
        &mut self,
        grid: &mut Grid,
        fresh: &mut HashSet<IVec2>,
        cap: usize,
        center: Vec2,
        radius: f32,
    ) {
        let radius = radius.max(0.5);
        let r = radius.ceil() as i32;
        let r2 = radius * radius;
        let c = center.as_ivec2();
        for dy in -r..=r {
            for dx in -r..=r {
                if (dx * dx + dy * dy) as f32 > r2 {
                    continue;
                }
                if self.sources.len() >= cap {
                    return;
                }
                self.add_source(grid, fresh, c + IVec2::new(dx, dy));
            }
        }
    }

    /// Turns one cell into a source, unless it is out of bounds,
    /// already a source, or occupied by a plant or seed.
    fn add_source(&mut self, grid: &mut Grid, fresh: &mut HashSet<IVec2>, pos: IVec2) {
        let Some(cell) = grid.get_mut(pos) else {
            return;
        };
        match cell.kind {
            CellType::Plant | CellType::Seed => return,
            _ => {}
        }
        if cell.is_source {
            fresh.insert(pos);
            return;
        }
        cell.kind = CellType::Water;
        cell.has_water = true;
        cell.is_source = true;
        self.sources.push(pos);
        fresh.insert(pos);
    }

    /// Grows up to `max_lakes` blobs at candidate centers that keep a
    /// minimum distance from every river cell painted so far.
    fn grow_lakes(&mut self, grid: &mut Grid, rng: &mut impl Rng, cap: usize) {
        let n = grid.size() as i32;
        let mut placed = 0;
        for _ in 0..self.cfg.lake_attempts {
            if placed >= self.cfg.max_lakes || self.sources.len() >= cap {
                return;
            }
            let center = IVec2::new(rng.random_range(0..n), rng.random_range(0..n));
            let min_dist = self.cfg.lake_min_dist;
            let too_close = self
                .sources
                .iter()
                .any(|s| (*s - center).abs().max_element() < min_dist);
            if too_close {
                continue;
            }

            let mut fresh = HashSet::new();
            let mut pos = center.as_vec2();
            for _ in 0..self.cfg.lake_steps {
                self.paint_disc(grid, &mut fresh, cap, pos, self.cfg.lake_radius);
                let heading = rng.random_range(0.0..std::f32::consts::TAU);
                pos += Vec2::from_angle(heading);
            }
            placed += 1;
        }
    }

    /// Periodic moisture flow: floods the Manhattan neighborhood of
    /// every source, wetting empty and water cells only. Never reduces
    /// a source cell's water.
    pub fn update(&self, grid: &mut Grid) {
        let r = self.cfg.flow_radius;
        for &src in &self.sources {
            for dy in -r..=r {
                for dx in -r..=r {
                    if dx.abs() + dy.abs() > r {
                        continue;
                    }
                    if let Some(cell) = grid.get_mut(src + IVec2::new(dx, dy)) {
                        if matches!(cell.kind, CellType::Empty | CellType::Water) {
                            cell.has_water = true;
                        }
                    }
                }
            }
        }
    }

    /// Removes all water from the grid and forgets the source list.
    pub fn reset(&mut self, grid: &mut Grid) {
        for cell in grid.iter_mut() {
            if cell.kind == CellType::Water {
                cell.kind = CellType::Empty;
            }
            cell.has_water = false;
            cell.is_source = false;
        }
        self.sources.clear();
    }

    /// Drops sources that fell outside the grid after a shrink-resize.
    pub fn prune_out_of_bounds(&mut self, grid: &Grid) {
        self.sources.retain(|&p| grid.in_bounds(p));
    }
}

/// Consumes the moisture at `pos`. Source cells are inexhaustible;
/// flowed moisture disappears until the next flow pass restores it.
pub fn consume(grid: &mut Grid, pos: IVec2) {
    if let Some(cell) = grid.get_mut(pos) {
        if cell.has_water && !cell.is_source {
            cell.has_water = false;
        }
    }
}
