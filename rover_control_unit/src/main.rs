//! # Rover Control Unit
//!
//! Runs the control core against the simulated motor controller and switch
//! panel. The binary feeds a scripted command sequence (enable, drive,
//! go silent, stop) so the mode machine, the freshness timeout and the
//! emergency stop path can be watched in the logs.
//!
//! Configuration comes from an optional TOML file (`--config`); without one
//! the build-time defaults are used.

use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use rover_common::config::LogLevel;
use rover_common::consts::Millis;
use rover_common::control_unit::command::{
    CommandFlags, RobotCommand, WheelVelocities, WheelVelocityCommand,
};
use rover_common::control_unit::error::FaultCode;
use rover_common::hal::driver::MotorController;
use rover_control_unit::config::{ControlConfig, load_config};
use rover_control_unit::cycle::ControlCore;
use rover_control_unit::sim::{SimMotorController, SimRestart, SimSwitches};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Rover Control Unit: safety control core on a simulated drive
#[derive(Parser, Debug)]
#[command(name = "rover_control_unit")]
#[command(version)]
#[command(about = "Safety control core for a four-wheel rover (simulated back-end)")]
struct Args {
    /// Path to the control unit TOML configuration.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Simulated run length [ms].
    #[arg(long, default_value_t = 6000)]
    duration_ms: Millis,

    /// Simulate an IMU that fails to initialize.
    #[arg(long)]
    sensor_fault: bool,

    /// Pace ticks against the wall clock instead of running flat out.
    #[arg(long)]
    realtime: bool,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("config {}: {e}", path.display());
                process::exit(2);
            }
        },
        None => ControlConfig::default(),
    };

    setup_tracing(&args, config.shared.log_level);
    info!(
        service = %config.shared.service_name,
        "Rover Control Unit v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    if let Err(e) = run(&args, &config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Rover Control Unit shutdown complete");
}

fn run(args: &Args, config: &ControlConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut motor = SimMotorController::new();
    let mut init_failures = FaultCode::empty();
    if let Err(e) = motor.init() {
        warn!(error = %e, "motor controller init failed");
        init_failures |= FaultCode::INIT_FAILURE;
    }
    if args.sensor_fault {
        warn!("IMU not responding");
        init_failures |= FaultCode::SENSOR_COMM_FAILURE;
    }

    let mut core = ControlCore::new(motor, SimSwitches::default(), SimRestart::default(), config);
    core.startup(0, init_failures);

    let period = config.cycle_time_ms;
    let drive_start = config.init_settle_ms + 100;
    let drive_end = drive_start + 2000;
    let stop_at = drive_end + 1000;
    let started = Instant::now();

    let mut now: Millis = 0;
    while now <= args.duration_ms {
        script_step(&mut core, now, period, drive_start, drive_end, stop_at);

        let report = core.tick(now);
        if let Some(mode) = report.transitioned {
            info!(t_ms = now, %mode, "mode changed");
        }
        if report.health_polled && now % 1000 < period {
            let snapshot = serde_json::to_string(&core.snapshot())?;
            info!(t_ms = now, snapshot = %snapshot, "status");
        }

        now += period;
        if args.realtime {
            let target = started + Duration::from_millis(now);
            if let Some(wait) = target.checked_duration_since(Instant::now()) {
                thread::sleep(wait);
            }
        }
    }

    let stats = core.stats();
    info!(
        ticks = stats.tick_count,
        avg_us = stats.avg_tick_us(),
        max_us = stats.max_tick_us,
        overruns = stats.overruns,
        final_mode = %core.mode(),
        "run finished"
    );
    core.faults().log_active();
    Ok(())
}

/// Scripted upstream controller: enable at `drive_start`, drive a slow
/// turn every 100 ms until `drive_end`, go silent, then send STOP.
fn script_step(
    core: &mut ControlCore<SimMotorController, SimSwitches, SimRestart>,
    now: Millis,
    period: Millis,
    drive_start: Millis,
    drive_end: Millis,
    stop_at: Millis,
) {
    let at = |t: Millis| now >= t && now < t + period;
    if at(drive_start) {
        let enable = WheelVelocityCommand {
            flags: CommandFlags::ENABLE_DRIVE,
            ..WheelVelocityCommand::default()
        };
        core.submit_wheel_velocity_command(&enable, now);
    } else if now > drive_start && now < drive_end && (now - drive_start) % 100 < period {
        let turn = WheelVelocities::from_array([600, 600, 900, 900]);
        core.submit_wheel_velocity_command(&WheelVelocityCommand::drive(turn), now);
    } else if at(stop_at) {
        core.submit_robot_command(RobotCommand::Stop, now);
    }
}

/// Setup tracing subscriber based on CLI arguments and the configured level.
fn setup_tracing(args: &Args, configured: LogLevel) {
    let level = if args.verbose {
        LogLevel::Debug
    } else {
        configured
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

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
