//! Population management: spawning, growth scheduling, death, and
//! seed germination.
//!
//! The manager iterates its plant list in reverse index order so dead
//! or converted plants can be removed in place, and drives growth on a
//! fixed tick cadence so organism growth rate is decoupled from the
//! simulation tick rate.

use crate::config::Config;
use crate::grid::{CellType, Grid};
use crate::plant::Plant;
use crate::types::PlantId;
use glam::IVec2;
use rand::Rng;
use rand::seq::IndexedRandom;

const PLACEMENT_ATTEMPTS: usize = 200;

#[derive(Debug)]
pub struct PlantManager {
    plants: Vec<Plant>,
    seeds: Vec<IVec2>,
    next_id: PlantId,
    repro_timer: u64,
    cfg: Config,
}

impl PlantManager {
    pub fn new(cfg: Config) -> Self {
        Self {
            plants: Vec::new(),
            seeds: Vec::new(),
            next_id: 0,
            repro_timer: 0,
            cfg,
        }
    }

    pub fn set_config(&mut self, cfg: Config) {
        self.cfg = cfg;
    }

    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    pub fn seed_count(&self) -> usize {
        self.seeds.len()
    }

    /// Sum of all live plants' cell counts.
    pub fn total_biomass(&self) -> usize {
        self.plants.iter().map(|p| p.size()).sum()
    }

    /// Whether `id` resolves to a currently live plant.
    pub fn is_alive(&self, id: PlantId) -> bool {
        self.plants.iter().any(|p| p.id() == id && p.is_alive())
    }

    /// Clears the population and places the configured number of
    /// starting plants, preferring spots near water. Ids stay
    /// monotonic across re-initialization.
    pub fn initialize(&mut self, grid: &mut Grid, rng: &mut impl Rng) {
        self.plants.clear();
        self.seeds.clear();
        self.repro_timer = 0;

        for _ in 0..self.cfg.plant_start_count {
            // Give up silently when no valid spot is found.
            self.place_initial_plant(grid, rng);
        }
        log::info!("placed {} starting plants", self.plants.len());
    }

    /// Places one plant within a small radius of a random wet cell,
    /// falling back to a uniformly random interior location when the
    /// grid holds no water at all.
    fn place_initial_plant(&mut self, grid: &mut Grid, rng: &mut impl Rng) -> Option<PlantId> {
        let wet: Vec<IVec2> = grid
            .iter()
            .filter(|(_, c)| c.has_water)
            .map(|(pos, _)| pos)
            .collect();

        if wet.is_empty() {
            let n = grid.size() as i32;
            let pos = IVec2::new(
                rng.random_range(0..n),
                rng.random_range(n * 3 / 10..(n * 8 / 10).max(n * 3 / 10 + 1)),
            );
            if grid.is_empty(pos) && grid.is_area_clear(pos, self.cfg.spawn_spacing, None) {
                return Some(self.spawn(grid, pos));
            }
            return None;
        }

        let r = self.cfg.water_spawn_radius;
        for _ in 0..PLACEMENT_ATTEMPTS {
            let Some(&anchor) = wet.as_slice().choose(rng) else {
                return None;
            };
            let pos = anchor + IVec2::new(rng.random_range(-r..=r), rng.random_range(-r..=r));
            if grid.is_empty(pos) && grid.is_area_clear(pos, self.cfg.spawn_spacing, None) {
                return Some(self.spawn(grid, pos));
            }
        }
        None
    }

    /// Places a plant on a specific empty cell, bypassing the
    /// water-preference search but not the bounds check. Used for
    /// scripted setups.
    pub fn spawn_plant(&mut self, grid: &mut Grid, pos: IVec2) -> Option<PlantId> {
        if !grid.is_empty(pos) {
            return None;
        }
        Some(self.spawn(grid, pos))
    }

    fn spawn(&mut self, grid: &mut Grid, pos: IVec2) -> PlantId {
        let id = self.next_id;
        self.next_id += 1;
        grid.set_plant(pos, id);
        self.plants.push(Plant::new(id, pos, self.cfg.plant_max_size));
        id
    }

    /// One tick of population upkeep.
    ///
    /// Reverse-index iteration allows in-place removal: dead plants
    /// are dropped; a plant at its size cap converts to seeds and dies
    /// in the same tick, before any growth attempt; the rest grow (and
    /// may reproduce) only on the growth cadence. Pending seeds
    /// germinate once the reproduction timer fires.
    pub fn update(&mut self, grid: &mut Grid, tick: u64, rng: &mut impl Rng) {
        let grow_now = tick % self.cfg.growth_interval_ticks == 0;

        for i in (0..self.plants.len()).rev() {
            if !self.plants[i].is_alive() {
                self.plants.remove(i);
                continue;
            }

            if self.plants[i].size() >= self.plants[i].max_size() {
                let seeds =
                    self.plants[i].generate_seeds(grid, self.cfg.plant_offspring_count, rng);
                log::debug!(
                    "plant {} reached max size, dropped {} seeds",
                    self.plants[i].id(),
                    seeds.len()
                );
                self.seeds.extend(seeds);
                self.plants[i].die(grid);
                self.plants.remove(i);
                continue;
            }

            if grow_now {
                let plant = &mut self.plants[i];
                plant.try_grow(grid, &self.cfg.growth, self.cfg.growth_interval_ticks, rng);
                if let Some(seed) = plant.try_reproduce(grid, &self.cfg.growth, rng) {
                    self.seeds.push(seed);
                }
            }
        }

        self.repro_timer += 1;
        if self.repro_timer >= self.cfg.reproduction_interval_ticks() {
            self.repro_timer = 0;
            self.germinate_seeds(grid, rng);
        }
    }

    /// Converts every pending seed into up to `plant_offspring_count`
    /// new plants within the seed search radius. The seed cell is
    /// cleared and the seed consumed regardless of how many offspring
    /// could be placed.
    pub fn germinate_seeds(&mut self, grid: &mut Grid, rng: &mut impl Rng) {
        let pending = std::mem::take(&mut self.seeds);
        if pending.is_empty() {
            return;
        }
        log::info!("germinating {} seeds", pending.len());

        for seed in pending {
            for _ in 0..self.cfg.plant_offspring_count {
                self.place_near_seed(grid, seed, rng);
            }
            if grid.get(seed).is_some_and(|c| c.kind == CellType::Seed) {
                grid.set_empty(seed);
            }
        }
    }

    fn place_near_seed(
        &mut self,
        grid: &mut Grid,
        seed: IVec2,
        rng: &mut impl Rng,
    ) -> Option<PlantId> {
        let r = self.cfg.seed_search_radius;
        let mut candidates = Vec::new();
        for dy in -r..=r {
            for dx in -r..=r {
                let pos = seed + IVec2::new(dx, dy);
                if grid.is_empty(pos) && grid.is_area_clear(pos, self.cfg.spawn_spacing, None) {
                    candidates.push(pos);
                }
            }
        }
        let &pos = candidates.as_slice().choose(rng)?;
        Some(self.spawn(grid, pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::energy;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn small_config() -> Config {
        let mut cfg = Config::default();
        cfg.grid_size = 50;
        cfg.plant_start_count = 3;
        cfg.plant_max_size = 10;
        cfg
    }

    fn wet_grid(size: usize) -> Grid {
        let mut grid = Grid::new(size);
        for cell in grid.iter_mut() {
            cell.has_water = true;
            cell.is_source = true;
        }
        grid
    }

    #[test]
    fn initialize_places_plants_near_water() {
        let mut grid = Grid::new(50);
        // A wet column in the middle of the grid.
        for y in 0..50 {
            grid.get_mut(IVec2::new(25, y)).unwrap().has_water = true;
        }

        let mut mgr = PlantManager::new(small_config());
        let mut rng = StdRng::seed_from_u64(1);
        mgr.initialize(&mut grid, &mut rng);

        assert!(mgr.plant_count() > 0);
        for plant in mgr.plants() {
            let pos = plant.cells()[0];
            assert!((pos.x - 25).abs() <= 3, "plant at {pos} not near water");
        }
    }

    #[test]
    fn initialize_falls_back_without_water() {
        let mut grid = Grid::new(50);
        let mut mgr = PlantManager::new(small_config());
        let mut rng = StdRng::seed_from_u64(2);
        mgr.initialize(&mut grid, &mut rng);

        // Dry placement is a single attempt per plant, so some may be
        // skipped, but the interior band is the only valid region.
        for plant in mgr.plants() {
            let pos = plant.cells()[0];
            assert!(pos.y >= 15 && pos.y < 40);
        }
    }

    #[test]
    fn initial_plants_respect_spacing() {
        let mut grid = wet_grid(50);
        let mut mgr = PlantManager::new(small_config());
        let mut rng = StdRng::seed_from_u64(3);
        mgr.initialize(&mut grid, &mut rng);

        let positions: Vec<IVec2> = mgr.plants().iter().map(|p| p.cells()[0]).collect();
        for (i, a) in positions.iter().enumerate() {
            for b in positions.iter().skip(i + 1) {
                assert!(
                    (*a - *b).abs().max_element() > small_config().spawn_spacing,
                    "plants at {a} and {b} too close"
                );
            }
        }
    }

    #[test]
    fn max_size_plant_converts_to_seeds_and_dies_same_tick() {
        let mut grid = wet_grid(50);
        let mut cfg = small_config();
        cfg.plant_max_size = 2;
        let mut mgr = PlantManager::new(cfg);
        let mut rng = StdRng::seed_from_u64(4);

        let id = mgr.spawn_plant(&mut grid, IVec2::new(25, 25)).unwrap();
        energy::update(&mut grid);

        // Grow to the cap, then the next update must convert.
        let mut converted = false;
        for step in 1..=20u64 {
            mgr.update(&mut grid, step * 60, &mut rng);
            if !mgr.is_alive(id) {
                converted = true;
                break;
            }
            assert!(mgr.plants().iter().all(|p| p.size() <= 2));
        }
        assert!(converted, "plant never reached its size cap");
        assert!(mgr.seed_count() <= small_config().plant_offspring_count);
        // Every owned cell was released.
        assert_eq!(grid.count_kind(CellType::Plant), 0);
    }

    #[test]
    fn growth_runs_only_on_cadence_ticks() {
        let mut grid = wet_grid(50);
        let mut mgr = PlantManager::new(small_config());
        let mut rng = StdRng::seed_from_u64(5);
        mgr.spawn_plant(&mut grid, IVec2::new(25, 25)).unwrap();
        energy::update(&mut grid);

        // Off-cadence ticks never grow.
        for tick in 1..60u64 {
            mgr.update(&mut grid, tick, &mut rng);
        }
        assert_eq!(mgr.total_biomass(), 1);

        mgr.update(&mut grid, 60, &mut rng);
        assert_eq!(mgr.total_biomass(), 2);
    }

    #[test]
    fn germination_spawns_offspring_and_always_clears_the_seed() {
        let mut grid = Grid::new(50);
        let mut cfg = small_config();
        cfg.plant_offspring_count = 2;
        let mut mgr = PlantManager::new(cfg);
        let mut rng = StdRng::seed_from_u64(6);

        let seed_pos = IVec2::new(25, 25);
        grid.set_seed(seed_pos);
        mgr.seeds.push(seed_pos);

        mgr.germinate_seeds(&mut grid, &mut rng);

        assert_eq!(mgr.seed_count(), 0);
        assert!(grid.is_empty(seed_pos), "seed cell must be cleared");
        assert!(mgr.plant_count() <= 2);
        for plant in mgr.plants() {
            let pos = plant.cells()[0];
            assert!((pos - seed_pos).abs().max_element() <= 10);
        }
    }

    #[test]
    fn germination_clears_seed_even_when_no_offspring_fit() {
        let mut grid = Grid::new(50);
        let mut mgr = PlantManager::new(small_config());
        let mut rng = StdRng::seed_from_u64(7);

        let seed_pos = IVec2::new(25, 25);
        grid.set_seed(seed_pos);
        mgr.seeds.push(seed_pos);
        // Crowd the whole search radius with rival plants.
        for dy in (-12..=12).step_by(4) {
            for dx in (-12..=12).step_by(4) {
                let pos = seed_pos + IVec2::new(dx, dy);
                if pos != seed_pos {
                    grid.set_plant(pos, 999);
                }
            }
        }

        mgr.germinate_seeds(&mut grid, &mut rng);
        assert_eq!(mgr.plant_count(), 0);
        assert_eq!(mgr.seed_count(), 0);
        assert!(grid.is_empty(seed_pos));
    }

    #[test]
    fn dead_plants_are_removed_and_owner_ids_stay_live() {
        let mut grid = wet_grid(50);
        let mut mgr = PlantManager::new(small_config());
        let mut rng = StdRng::seed_from_u64(8);
        mgr.initialize(&mut grid, &mut rng);
        energy::update(&mut grid);

        for step in 1..=50u64 {
            mgr.update(&mut grid, step * 60, &mut rng);
            for (_, cell) in grid.iter() {
                if cell.kind == CellType::Plant {
                    let id = cell.owner.expect("plant cell without owner");
                    assert!(mgr.is_alive(id), "orphaned owner id {id}");
                }
            }
        }
    }

    #[test]
    fn ids_are_unique_and_monotonic_across_reinitialization() {
        let mut grid = wet_grid(50);
        let mut mgr = PlantManager::new(small_config());
        let mut rng = StdRng::seed_from_u64(9);

        mgr.initialize(&mut grid, &mut rng);
        let first_max = mgr.plants().iter().map(|p| p.id()).max();

        grid.clear();
        let mut grid = wet_grid(50);
        mgr.initialize(&mut grid, &mut rng);
        let second_min = mgr.plants().iter().map(|p| p.id()).min();

        if let (Some(a), Some(b)) = (first_max, second_min) {
            assert!(b > a, "ids must never be reused");
        }
    }
}
