//! The external control surface: lifecycle, speed, configuration,
//! and read-only stats.
//!
//! The engine owns every core component and advances them in a fixed
//! phase order per tick: light recomputation, periodic moisture flow,
//! then the plant pass. An external scheduler decides how many ticks
//! to advance per unit of real time; the engine itself has no notion
//! of wall-clock timing.

use crate::config::{Config, ConfigError, DEFAULT_SPEED, MAX_SPEED, MIN_SPEED};
use crate::energy;
use crate::grid::Grid;
use crate::manager::PlantManager;
use crate::water::WaterSystem;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

/// Read-only snapshot for the UI/scheduler layer.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Stats {
    pub plants: usize,
    pub biomass: usize,
    pub seeds: usize,
    pub wet_cells: usize,
    pub total_energy: usize,
    pub tick: u64,
    pub running: bool,
}

pub struct SimulationEngine {
    grid: Grid,
    water: WaterSystem,
    manager: PlantManager,
    cfg: Config,
    rng: StdRng,
    tick: u64,
    running: bool,
    speed: u32,
}

impl SimulationEngine {
    /// Validates the configuration, generates the initial river, and
    /// places the starting plants. Rejecting a bad config here is the
    /// only failure the core ever surfaces.
    pub fn new(cfg: Config) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut engine = Self {
            grid: Grid::new(cfg.grid_size),
            water: WaterSystem::new(cfg.river),
            manager: PlantManager::new(cfg.clone()),
            cfg,
            rng,
            tick: 0,
            running: false,
            speed: DEFAULT_SPEED,
        };
        engine.populate();
        Ok(engine)
    }

    /// Water first, so the initial plants can settle near it.
    fn populate(&mut self) {
        self.water.generate_river(&mut self.grid, &mut self.rng);
        self.manager.initialize(&mut self.grid, &mut self.rng);
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Stops the simulation, clears the world, and regenerates water
    /// and starting plants under the current configuration.
    pub fn reset(&mut self) {
        self.pause();
        self.tick = 0;
        self.grid.clear();
        self.water.reset(&mut self.grid);
        self.populate();
    }

    /// Clamps into the supported multiplier range.
    pub fn set_speed(&mut self, speed: u32) {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Swaps in a validated configuration. A changed grid size resizes
    /// the world (preserving the overlapping region) and prunes water
    /// sources that fell outside.
    pub fn apply_config(&mut self, cfg: Config) -> Result<(), ConfigError> {
        cfg.validate()?;
        if cfg.grid_size != self.grid.size() {
            self.grid.resize(cfg.grid_size);
            self.water.prune_out_of_bounds(&self.grid);
        }
        self.water.set_config(cfg.river);
        self.manager.set_config(cfg.clone());
        self.cfg = cfg;
        Ok(())
    }

    /// Advances one tick, unless paused.
    pub fn step(&mut self) {
        if !self.running {
            return;
        }
        self.tick += 1;
        energy::update(&mut self.grid);
        if self.tick % self.cfg.water_flow_interval_ticks == 0 {
            self.water.update(&mut self.grid);
        }
        self.manager
            .update(&mut self.grid, self.tick, &mut self.rng);

        if self.tick % 1000 == 0 {
            log::debug!(
                "tick {}: {} plants, biomass {}",
                self.tick,
                self.manager.plant_count(),
                self.manager.total_biomass()
            );
        }
    }

    /// Advances up to `ticks` ticks; a pause mid-run stops early.
    pub fn run(&mut self, ticks: u64) {
        for _ in 0..ticks {
            if !self.running {
                return;
            }
            self.step();
        }
    }

    pub fn stats(&self) -> Stats {
        Stats {
            plants: self.manager.plant_count(),
            biomass: self.manager.total_biomass(),
            seeds: self.manager.seed_count(),
            wet_cells: self.water.water_cell_count(&self.grid),
            total_energy: energy::total_energy(&self.grid),
            tick: self.tick,
            running: self.running,
        }
    }

    /// Read-only grid access for rendering layers.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn manager(&self) -> &PlantManager {
        &self.manager
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}
