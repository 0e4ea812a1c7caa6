//! Fruity Merge headless runner
//!
//! Drives the simulation with the autoplayer on a fixed timestep and prints
//! the final snapshot as JSON.
//!
//! Usage: `fruity-merge [config.json] [--seed N] [--ticks N]`

use std::process::ExitCode;

use fruity_merge::consts::MAX_SUBSTEPS;
use fruity_merge::sim::{SimEvent, Simulation, TickInput, step};
use fruity_merge::{ConfigError, SimConfig};

const DEFAULT_SEED: u64 = 12345;
const DEFAULT_MAX_TICKS: u64 = 60 * 60 * 5;

/// Command line options
struct Args {
    config_path: Option<String>,
    seed: u64,
    max_ticks: u64,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        config_path: None,
        seed: DEFAULT_SEED,
        max_ticks: DEFAULT_MAX_TICKS,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seed" => {
                let value = iter.next().ok_or("--seed needs a value")?;
                args.seed = value
                    .parse()
                    .map_err(|e| format!("invalid seed {:?}: {}", value, e))?;
            }
            "--ticks" => {
                let value = iter.next().ok_or("--ticks needs a value")?;
                args.max_ticks = value
                    .parse()
                    .map_err(|e| format!("invalid tick count {:?}: {}", value, e))?;
            }
            other if other.starts_with("--") => return Err(format!("unknown flag {}", other)),
            path => args.config_path = Some(path.to_string()),
        }
    }
    Ok(args)
}

/// Frame-clock driver: accumulates frame time into fixed ticks
struct Runner {
    sim: Simulation,
    /// Seconds per tick, from the configured tick rate
    dt: f32,
    accumulator: f32,
    input: TickInput,
}

impl Runner {
    fn new(sim: Simulation) -> Self {
        let dt = sim.config().timing.tick_dt();
        Self {
            sim,
            dt,
            accumulator: 0.0,
            input: TickInput {
                autoplay: true,
                ..Default::default()
            },
        }
    }

    /// Run the ticks owed for `dt` seconds of frame time
    fn update(&mut self, dt: f32) {
        let dt = dt.min(self.dt * MAX_SUBSTEPS as f32);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= self.dt && substeps < MAX_SUBSTEPS {
            for event in step(&mut self.sim, &self.input) {
                match event {
                    SimEvent::Fusion { new_rank, .. } => {
                        log::debug!("Fused into rank {}", new_rank)
                    }
                    SimEvent::GameOver { score } => log::info!("Game over with score {}", score),
                    SimEvent::Dropped { .. } => {}
                }
            }
            self.accumulator -= self.dt;
            substeps += 1;
        }
    }
}

fn load_config(path: Option<&str>) -> Result<SimConfig, ConfigError> {
    match path {
        Some(path) => SimConfig::load(path),
        None => Ok(SimConfig::default()),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Fruity Merge (headless) starting...");

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("usage: fruity-merge [config.json] [--seed N] [--ticks N]");
            return ExitCode::FAILURE;
        }
    };

    let sim = match load_config(args.config_path.as_deref())
        .and_then(|config| Simulation::new(config, args.seed))
    {
        Ok(sim) => sim,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut runner = Runner::new(sim);
    while !runner.sim.is_terminal() && runner.sim.session().time_ticks < args.max_ticks {
        runner.update(runner.dt);
    }

    let session = runner.sim.session();
    log::info!(
        "Finished after {} ticks: score {}, {} drops, {} fusions",
        session.time_ticks,
        session.score,
        session.drops,
        session.fusions
    );

    match serde_json::to_string_pretty(&runner.sim.snapshot()) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Failed to serialize snapshot: {}", e);
            ExitCode::FAILURE
        }
    }
}
