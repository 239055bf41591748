//! Shared fixtures: a simulated core booted to a given mode.

use rover_common::consts::{CYCLE_TIME_MS, Millis};
use rover_common::control_unit::command::{CommandFlags, WheelVelocityCommand};
use rover_common::control_unit::error::FaultCode;
use rover_common::control_unit::state::OperatingMode;
use rover_control_unit::config::ControlConfig;
use rover_control_unit::cycle::ControlCore;
use rover_control_unit::sim::{SimMotorController, SimRestart, SimSwitches};

pub type SimCore = ControlCore<SimMotorController, SimSwitches, SimRestart>;

/// Core started without init faults, still INITIALIZING.
pub fn fresh_core() -> SimCore {
    let mut core = ControlCore::new(
        SimMotorController::new(),
        SimSwitches::default(),
        SimRestart::default(),
        &ControlConfig::default(),
    );
    core.startup(0, FaultCode::empty());
    core
}

/// Tick every `CYCLE_TIME_MS` from `from` up to and including `to`.
pub fn run_ticks(core: &mut SimCore, from: Millis, to: Millis) {
    let mut now = from;
    while now <= to {
        core.tick(now);
        now += CYCLE_TIME_MS;
    }
}

/// Core settled in STANDBY. Returns the core and the current time.
pub fn standby_core() -> (SimCore, Millis) {
    let mut core = fresh_core();
    run_ticks(&mut core, CYCLE_TIME_MS, 2000);
    assert_eq!(core.mode(), OperatingMode::Standby);
    (core, 2000)
}

/// Core in OPERATIONAL with an empty motor call log.
pub fn operational_core() -> (SimCore, Millis) {
    let (mut core, now) = standby_core();
    let enable = WheelVelocityCommand {
        flags: CommandFlags::ENABLE_DRIVE,
        ..WheelVelocityCommand::default()
    };
    let now = now + CYCLE_TIME_MS;
    core.submit_wheel_velocity_command(&enable, now);
    core.tick(now);
    assert_eq!(core.mode(), OperatingMode::Operational);
    core.motor_mut().clear_calls();
    (core, now)
}
