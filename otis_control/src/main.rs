//! # Otis Control
//!
//! Robot driver program. Loads the TOML configuration, builds the
//! simulation device backend, spawns the lift convergence task, then runs
//! the autonomous route and/or the teleop dispatch loop depending on
//! `--mode`.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::{Parser, ValueEnum};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use otis_common::config::RobotConfig;
use otis_common::consts::DEFAULT_CONFIG_PATH;
use otis_common::devices::Locomotion;
use otis_control::auton::{Route, Sequencer};
use otis_control::config::load_config;
use otis_control::latch::ToggleLatch;
use otis_control::lift::LiftController;
use otis_control::rt::rt_setup;
use otis_control::stages::StageTable;
use otis_control::teleop::TeleopLoop;
use otis_hal::{ScriptedPad, SimChassis, SimDigitalOut, SimMotorGroup};

/// Which driver(s) to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Autonomous route only.
    Auton,
    /// Teleop dispatch loop only.
    Teleop,
    /// Autonomous route, then teleop (competition flow).
    Full,
}

/// Otis Control — robot driver core
#[derive(Parser, Debug)]
#[command(name = "otis_control")]
#[command(version)]
#[command(about = "Teleop dispatch loop, autonomous sequencer and async lift controller")]
struct Args {
    /// Path to the robot configuration TOML. Built-in defaults when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Driver mode.
    #[arg(long, value_enum, default_value_t = Mode::Full)]
    mode: Mode,

    /// CPU core to pin to (rt feature only).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (rt feature only).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!("otis control v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("otis control shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match args.config {
        Some(ref path) => {
            info!("loading config from {}", path.display());
            load_config(path)?
        }
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                info!("loading config from {}", default_path.display());
                load_config(default_path)?
            } else {
                info!("no config file found, using built-in defaults");
                RobotConfig::default()
            }
        }
    };

    info!(
        "config OK: {} stages, lift tick {}ms, teleop period {}ms",
        config.lift.stages.len(),
        config.lift.tick_period_ms,
        config.teleop.period_ms,
    );

    // RT setup (mlockall, affinity, scheduler). No-op without the feature.
    rt_setup(args.cpu_core, args.rt_priority)?;

    // ── Devices (simulation backend) ────────────────────────────────
    let table = StageTable::new(config.lift.stages.as_slice())?;
    let mut chassis = SimChassis::new();
    chassis.calibrate();

    let lift_motor = SimMotorGroup::new(table.first());
    let lift = LiftController::spawn(lift_motor, &config.lift);

    // ── Shutdown flag ───────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("received shutdown signal");
        r.store(false, Ordering::Release);
    })?;

    // ── Autonomous phase ────────────────────────────────────────────
    if args.mode != Mode::Teleop {
        let route = Route::from_config(&config.auton, &table)?;
        info!(steps = route.len(), "running autonomous route");
        Sequencer::new(route).run(&mut chassis, &lift.handle());
    }

    // ── Teleop phase ────────────────────────────────────────────────
    if args.mode != Mode::Auton {
        let mut teleop = TeleopLoop::new(
            ScriptedPad::from_frames(Vec::new()),
            chassis,
            SimMotorGroup::new(0.0),
            ToggleLatch::new(SimDigitalOut::new()),
            ToggleLatch::new(SimDigitalOut::new()),
            table,
            lift.handle(),
            &config,
        );
        teleop.run(&running);
    }

    lift.stop();
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
