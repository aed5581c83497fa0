//! Headless runner for the ecological grid simulation.
//!
//! Stands in for the interactive UI layer: builds an engine from an
//! optional JSON config, advances a fixed number of ticks, and prints
//! the final stats as JSON.
//!
//! Usage: sim-cli [OPTIONS]
//!
//! Options:
//!   --ticks <N>      Ticks to advance (default: 3600)
//!   --seed <SEED>    RNG seed (default: from the OS)
//!   --config <PATH>  JSON config file overriding the defaults
//!   --speed <MULT>   Speed multiplier, clamped to 1..=10

use std::process::ExitCode;

use sim_core::config::Config;
use sim_core::engine::SimulationEngine;

struct Args {
    ticks: u64,
    seed: Option<u64>,
    config: Option<String>,
    speed: Option<u32>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        ticks: 3600,
        seed: None,
        config: None,
        speed: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .ok_or_else(|| format!("missing value for {name}"))
        };
        match arg.as_str() {
            "--ticks" => {
                args.ticks = value("--ticks")?
                    .parse()
                    .map_err(|e| format!("invalid --ticks: {e}"))?;
            }
            "--seed" => {
                args.seed = Some(
                    value("--seed")?
                        .parse()
                        .map_err(|e| format!("invalid --seed: {e}"))?,
                );
            }
            "--config" => args.config = Some(value("--config")?),
            "--speed" => {
                args.speed = Some(
                    value("--speed")?
                        .parse()
                        .map_err(|e| format!("invalid --speed: {e}"))?,
                );
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(args)
}

fn load_config(args: &Args) -> Result<Config, String> {
    let mut cfg = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {path}: {e}"))?;
            serde_json::from_str(&text).map_err(|e| format!("cannot parse {path}: {e}"))?
        }
        None => Config::default(),
    };
    if let Some(seed) = args.seed {
        cfg.seed = Some(seed);
    }
    Ok(cfg)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let cfg = match load_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut engine = match SimulationEngine::new(cfg) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(speed) = args.speed {
        engine.set_speed(speed);
    }

    log::info!(
        "advancing {} ticks on a {}x{} grid",
        args.ticks,
        engine.grid().size(),
        engine.grid().size()
    );
    engine.start();
    engine.run(args.ticks);

    match serde_json::to_string_pretty(&engine.stats()) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("cannot serialize stats: {e}");
            ExitCode::FAILURE
        }
    }
}
