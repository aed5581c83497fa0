//! Simulation configuration and its boundary-level validation.
//!
//! Invalid configuration is the only failure the core ever reports to
//! the outside; everything past [`Config::validate`] runs on sentinel
//! returns alone.

use serde::Deserialize;
use thiserror::Error;

/// Fixed logical tick rate used to convert seconds-based settings.
pub const TICKS_PER_SECOND: u64 = 60;

/// Speed multiplier bounds for the external scheduler.
pub const MIN_SPEED: u32 = 1;
pub const MAX_SPEED: u32 = 10;
pub const DEFAULT_SPEED: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid size {0} outside supported range 16..=512")]
    GridSize(usize),
    #[error("plant start count {0} outside supported range 1..=100")]
    StartCount(usize),
    #[error("reproduction interval {0}s outside supported range 1..=120")]
    ReproductionSecs(u32),
    #[error("offspring count {0} outside supported range 1..=10")]
    OffspringCount(usize),
    #[error("plant max size {0} outside supported range 2..=500")]
    MaxSize(usize),
    #[error("growth interval must be a positive tick count")]
    GrowthInterval,
    #[error("water flow interval must be a positive tick count")]
    FlowInterval,
    #[error("river width falloff {0} must lie in (0, 1)")]
    WidthFalloff(f32),
    #[error("river coverage cap {0} must lie in (0, 1]")]
    CoverageCap(f32),
    #[error("river start width {0} must be at least the minimum width {1}")]
    RiverWidth(f32, f32),
    #[error("{0} = {1} is not a probability in 0..=1")]
    Probability(&'static str, f64),
}

/// How a plant's elongation is gated each growth attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthGate {
    /// Water near the growth tip is required; tip light is recorded
    /// but not required.
    WaterOnly,
    /// Both water near the tip and light at the tip are required.
    WaterAndEnergy,
}

/// What happens to a plant when a chosen branch finds no cell to
/// grow into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureResponse {
    /// The branch deactivates permanently; the plant keeps its cells.
    Stall,
    /// The plant decays by one cell instead; a single-celled plant dies.
    Shrink,
}

/// Knobs of the per-organism growth automaton.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct GrowthSettings {
    pub gate: GrowthGate,
    pub on_failure: FailureResponse,
    /// Minimum plant size before new branches may spawn.
    pub min_branch_size: usize,
    /// Per-growth-attempt chance to root a new branch.
    pub branch_chance: f64,
    pub max_branches: usize,
    /// Chains longer than this deactivate to give other branches a turn.
    pub max_branch_len: usize,
    /// Chebyshev radius searched for water around the growth tip.
    pub water_search_radius: i32,
    /// Minimum Chebyshev distance kept from other plants' cells.
    pub rival_spacing: i32,
    /// Radius and cap for the self-clumping check around a candidate.
    pub crowd_radius: i32,
    pub crowd_limit: usize,
    /// Age in ticks past which a lit plant may drop a bonus seed, and
    /// the per-attempt chance of doing so.
    pub repro_age: u64,
    pub repro_chance: f64,
}

impl Default for GrowthSettings {
    fn default() -> Self {
        Self {
            gate: GrowthGate::WaterOnly,
            on_failure: FailureResponse::Stall,
            min_branch_size: 5,
            branch_chance: 0.15,
            max_branches: 15,
            max_branch_len: 25,
            water_search_radius: 12,
            rival_spacing: 7,
            crowd_radius: 2,
            crowd_limit: 2,
            repro_age: 1200,
            repro_chance: 0.002,
        }
    }
}

/// Parameters of the one-shot river/lake generator and the periodic
/// moisture flow.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct RiverConfig {
    /// Brush width (in cells) at the river mouth.
    pub start_width: f32,
    /// Branches thinner than this stop painting.
    pub min_width: f32,
    /// Width lost per step along a branch.
    pub width_decay: f32,
    /// Child branches keep this fraction of the parent width.
    pub width_falloff: f32,
    pub step_len: f32,
    /// Per-step angular perturbation bound (radians).
    pub wobble: f32,
    /// Maximum deviation from a branch's base heading (radians).
    pub max_turn: f32,
    pub fork_chance: f64,
    /// Chance that a fork spawns a third, middle child.
    pub trident_chance: f64,
    pub fork_spread_min: f32,
    pub fork_spread_max: f32,
    /// Recursion (fork) depth limit.
    pub max_depth: u32,
    /// Fraction of grid area that source cells may occupy.
    pub coverage_cap: f32,
    pub lake_attempts: usize,
    pub max_lakes: usize,
    /// Minimum Chebyshev distance from a lake center to any river cell.
    pub lake_min_dist: i32,
    pub lake_steps: usize,
    pub lake_radius: f32,
    /// Manhattan radius flooded around each source during flow updates.
    pub flow_radius: i32,
}

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            start_width: 8.0,
            min_width: 1.0,
            width_decay: 0.06,
            width_falloff: 0.7,
            step_len: 1.0,
            wobble: 0.25,
            max_turn: 1.0,
            fork_chance: 0.12,
            trident_chance: 0.15,
            fork_spread_min: 0.4,
            fork_spread_max: 0.8,
            max_depth: 25,
            coverage_cap: 0.2,
            lake_attempts: 6,
            max_lakes: 3,
            lake_min_dist: 12,
            lake_steps: 8,
            lake_radius: 2.0,
            flow_radius: 6,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    pub grid_size: usize,
    pub plant_start_count: usize,
    /// Germination cadence in seconds, converted to ticks internally.
    pub plant_reproduction_secs: u32,
    pub plant_offspring_count: usize,
    pub plant_max_size: usize,
    /// Plants attempt growth only on this tick cadence.
    pub growth_interval_ticks: u64,
    pub water_flow_interval_ticks: u64,
    /// Chebyshev spacing required around any new plant placement.
    pub spawn_spacing: i32,
    /// Radius searched around a germinating seed for offspring spots.
    pub seed_search_radius: i32,
    /// Radius around a wet cell tried for initial plant placement.
    pub water_spawn_radius: i32,
    /// RNG seed; `None` draws entropy from the OS.
    pub seed: Option<u64>,
    pub growth: GrowthSettings,
    pub river: RiverConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_size: 200,
            plant_start_count: 5,
            plant_reproduction_secs: 10,
            plant_offspring_count: 2,
            plant_max_size: 50,
            growth_interval_ticks: 60,
            water_flow_interval_ticks: 10,
            spawn_spacing: 5,
            seed_search_radius: 10,
            water_spawn_radius: 3,
            seed: None,
            growth: GrowthSettings::default(),
            river: RiverConfig::default(),
        }
    }
}

impl Config {
    /// Germination interval in ticks.
    pub fn reproduction_interval_ticks(&self) -> u64 {
        self.plant_reproduction_secs as u64 * TICKS_PER_SECOND
    }

    /// Rejects out-of-range values before they reach the core.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(16..=512).contains(&self.grid_size) {
            return Err(ConfigError::GridSize(self.grid_size));
        }
        if !(1..=100).contains(&self.plant_start_count) {
            return Err(ConfigError::StartCount(self.plant_start_count));
        }
        if !(1..=120).contains(&self.plant_reproduction_secs) {
            return Err(ConfigError::ReproductionSecs(self.plant_reproduction_secs));
        }
        if !(1..=10).contains(&self.plant_offspring_count) {
            return Err(ConfigError::OffspringCount(self.plant_offspring_count));
        }
        if !(2..=500).contains(&self.plant_max_size) {
            return Err(ConfigError::MaxSize(self.plant_max_size));
        }
        if self.growth_interval_ticks == 0 {
            return Err(ConfigError::GrowthInterval);
        }
        if self.water_flow_interval_ticks == 0 {
            return Err(ConfigError::FlowInterval);
        }
        let river = &self.river;
        if !(river.width_falloff > 0.0 && river.width_falloff < 1.0) {
            return Err(ConfigError::WidthFalloff(river.width_falloff));
        }
        if !(river.coverage_cap > 0.0 && river.coverage_cap <= 1.0) {
            return Err(ConfigError::CoverageCap(river.coverage_cap));
        }
        if river.start_width < river.min_width || river.min_width <= 0.0 {
            return Err(ConfigError::RiverWidth(river.start_width, river.min_width));
        }
        for (name, p) in [
            ("branch_chance", self.growth.branch_chance),
            ("repro_chance", self.growth.repro_chance),
            ("fork_chance", river.fork_chance),
            ("trident_chance", river.trident_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Probability(name, p));
            }
        }
        Ok(())
    }
}
