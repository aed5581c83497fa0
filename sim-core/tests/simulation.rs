//! End-to-end properties of the simulation core: the cell-partition
//! and ownership invariants, generation bounds, and the growth and
//! germination scenarios.

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use sim_core::config::{Config, RiverConfig};
use sim_core::energy;
use sim_core::engine::SimulationEngine;
use sim_core::grid::{CellType, Grid};
use sim_core::manager::PlantManager;
use sim_core::water::WaterSystem;

fn seeded_config(seed: u64) -> Config {
    let mut cfg = Config::default();
    cfg.grid_size = 50;
    cfg.plant_max_size = 20;
    cfg.seed = Some(seed);
    cfg
}

fn assert_partition(grid: &Grid) {
    let total = grid.count_kind(CellType::Empty)
        + grid.count_kind(CellType::Plant)
        + grid.count_kind(CellType::Seed)
        + grid.count_kind(CellType::Water);
    assert_eq!(total, grid.area(), "cell types must partition the grid");
}

#[test]
fn cell_types_partition_the_grid_every_tick() {
    let mut engine = SimulationEngine::new(seeded_config(1)).unwrap();
    assert_partition(engine.grid());

    engine.start();
    for _ in 0..600 {
        engine.step();
        assert_partition(engine.grid());
    }
}

#[test]
fn plant_cells_always_resolve_to_live_plants() {
    let mut engine = SimulationEngine::new(seeded_config(2)).unwrap();
    engine.start();
    for _ in 0..600 {
        engine.step();
        for (pos, cell) in engine.grid().iter() {
            if cell.kind == CellType::Plant {
                let id = cell.owner.unwrap_or_else(|| panic!("no owner at {pos}"));
                assert!(
                    engine.manager().is_alive(id),
                    "orphaned owner {id} at {pos}"
                );
            }
        }
    }
}

#[test]
fn source_count_stays_under_the_coverage_cap() {
    for seed in 0..10 {
        let mut grid = Grid::new(50);
        let mut ws = WaterSystem::new(RiverConfig::default());
        let mut rng = StdRng::seed_from_u64(seed);
        ws.generate_river(&mut grid, &mut rng);

        let cap = (grid.area() as f32 * RiverConfig::default().coverage_cap) as usize;
        assert!(ws.source_count() >= 1);
        assert!(ws.source_count() <= cap, "seed {seed} broke the cap");
    }
}

#[test]
fn energy_column_property_holds_for_random_canopies() {
    let mut grid = Grid::new(50);
    let mut rng = StdRng::seed_from_u64(3);
    for id in 0..60u32 {
        let pos = IVec2::new(rng.random_range(0..50), rng.random_range(0..50));
        if grid.is_empty(pos) {
            grid.set_plant(pos, id);
        }
    }
    energy::update(&mut grid);

    let n = grid.size() as i32;
    for x in 0..n {
        let mut seen_plant = false;
        for y in 0..n {
            let cell = grid.get(IVec2::new(x, y)).unwrap();
            if seen_plant {
                assert!(!cell.energy, "lit cell below a plant at ({x}, {y})");
            } else {
                assert!(cell.energy, "dark cell above the canopy at ({x}, {y})");
                if cell.kind == CellType::Plant {
                    seen_plant = true;
                }
            }
        }
    }
}

#[test]
fn lone_plant_grows_to_max_size_then_dies_into_seeds() {
    let mut cfg = seeded_config(4);
    cfg.plant_max_size = 12;
    cfg.plant_offspring_count = 2;
    // Keep the scenario about one plant: branches may respawn early,
    // and bonus age-gated seeds are disabled.
    cfg.growth.min_branch_size = 1;
    cfg.growth.repro_age = u64::MAX;

    let mut grid = Grid::new(50);
    let mut ws = WaterSystem::new(cfg.river);
    let mut rng = StdRng::seed_from_u64(4);
    ws.generate_river(&mut grid, &mut rng);

    // Seed a single plant next to a wet cell.
    let anchor = grid
        .iter()
        .find(|(_, c)| c.has_water)
        .map(|(pos, _)| pos)
        .expect("generation always produces water");
    let start = grid
        .neighbors(anchor)
        .into_iter()
        .find(|&p| grid.is_empty(p))
        .unwrap_or(anchor + IVec2::new(1, 1));

    let mut mgr = PlantManager::new(cfg.clone());
    let id = mgr.spawn_plant(&mut grid, start).expect("empty start cell");

    let mut last_size = 1;
    let mut died = false;
    for step in 1..=5000u64 {
        let tick = step * cfg.growth_interval_ticks;
        energy::update(&mut grid);
        ws.update(&mut grid);
        mgr.update(&mut grid, tick, &mut rng);

        if !mgr.is_alive(id) {
            died = true;
            break;
        }
        let size = mgr.plants().iter().find(|p| p.id() == id).map(|p| p.size());
        if let Some(size) = size {
            assert!(size >= last_size, "plant shrank under the stall policy");
            assert!(size <= cfg.plant_max_size);
            last_size = size;
        }
    }

    assert!(died, "plant never reached max size (stuck at {last_size})");
    assert!(grid.count_kind(CellType::Seed) <= cfg.plant_offspring_count);
}

#[test]
fn river_generation_is_deterministic_per_seed() {
    let build = |seed| {
        let mut grid = Grid::new(50);
        let mut ws = WaterSystem::new(RiverConfig::default());
        let mut rng = StdRng::seed_from_u64(seed);
        ws.generate_river(&mut grid, &mut rng);
        let wet: Vec<IVec2> = grid
            .iter()
            .filter(|(_, c)| c.has_water)
            .map(|(pos, _)| pos)
            .collect();
        wet
    };
    assert_eq!(build(99), build(99));
}
