//! Integration test: end-to-end mode scenarios.
//!
//! 1. Operational request from STANDBY with the interlock open
//! 2. Command freshness timeout while OPERATIONAL
//! 3. Emergency stop flag in a wheel velocity message
//! 4. ERROR acknowledged by the interlock once the critical fault is gone

use rover_common::consts::CYCLE_TIME_MS;
use rover_common::control_unit::command::{
    CommandFlags, RobotCommand, WheelVelocities, WheelVelocityCommand,
};
use rover_common::control_unit::error::FaultCode;
use rover_common::control_unit::state::OperatingMode;
use rover_control_unit::command::CommandOutcome;
use rover_control_unit::sim::MotorCall;

use super::common::{operational_core, run_ticks, standby_core};

const CRITICAL: FaultCode = FaultCode::from_bits_retain(0x1000_0000);

// ── Tests ───────────────────────────────────────────────────────────

#[test]
fn operational_request_enables_drive() {
    let (mut core, now) = standby_core();
    assert!(!core.drive().is_enabled());

    let enable = WheelVelocityCommand {
        flags: CommandFlags::ENABLE_DRIVE,
        ..WheelVelocityCommand::default()
    };
    assert_eq!(
        core.submit_wheel_velocity_command(&enable, now + 1),
        CommandOutcome::Dropped
    );
    assert!(core.state_machine().operational_requested());
    assert_eq!(core.mode(), OperatingMode::Standby);

    let report = core.tick(now + CYCLE_TIME_MS);
    assert_eq!(report.transitioned, Some(OperatingMode::Operational));
    assert!(core.drive().is_enabled());
    assert!(!core.state_machine().operational_requested());
}

#[test]
fn interlock_blocks_operational_request() {
    let (mut core, now) = standby_core();
    core.switches_mut().set_interlock(true);
    let enable = WheelVelocityCommand {
        flags: CommandFlags::ENABLE_DRIVE,
        ..WheelVelocityCommand::default()
    };
    core.submit_wheel_velocity_command(&enable, now + 1);
    run_ticks(&mut core, now + CYCLE_TIME_MS, now + 200);
    assert_eq!(core.mode(), OperatingMode::Standby);
    assert!(!core.drive().is_enabled());
}

#[test]
fn stale_command_stops_motors_once_without_mode_change() {
    let (mut core, now) = operational_core();
    let cmd = WheelVelocityCommand::drive(WheelVelocities::splat(700));
    assert_eq!(
        core.submit_wheel_velocity_command(&cmd, now),
        CommandOutcome::Drive(Ok(()))
    );
    core.motor_mut().clear_calls();

    let report = core.tick(now + 260);
    assert!(report.timeout_stop);
    assert!(core.drive().timeout_handled());
    assert_eq!(core.mode(), OperatingMode::Operational);
    assert!(core.drive().is_enabled());

    run_ticks(&mut core, now + 270, now + 600);
    assert_eq!(
        core.drive().motor().calls(),
        &[MotorCall::Velocities(WheelVelocities::ZERO)]
    );

    // A fresh command resumes motion without re-enabling.
    core.submit_wheel_velocity_command(&cmd, now + 610);
    assert_eq!(
        core.drive().motor().last_velocities(),
        Some(WheelVelocities::splat(700))
    );
}

#[test]
fn estop_flag_never_forwards_its_velocities() {
    let (mut core, now) = operational_core();
    let cmd = WheelVelocityCommand {
        velocities: WheelVelocities::splat(2000),
        acceleration: 500,
        flags: CommandFlags::EMERGENCY_STOP,
    };
    core.submit_wheel_velocity_command(&cmd, now + 1);

    assert_eq!(core.mode(), OperatingMode::EmergencyStop);
    assert!(!core.drive().is_enabled());
    assert!(!core.drive().motor().has_sent_motion());
    assert!(core.drive().motor().calls().contains(&MotorCall::EmergencyStop));
}

#[test]
fn estop_flag_from_standby_and_error() {
    for enter_error in [false, true] {
        let (mut core, now) = standby_core();
        if enter_error {
            core.faults_mut().register_fault(CRITICAL, now);
            core.tick(now + CYCLE_TIME_MS);
            assert_eq!(core.mode(), OperatingMode::Error);
        }
        let cmd = WheelVelocityCommand::from_raw([100, 100, 100, 100, 0, 0x01]);
        core.submit_wheel_velocity_command(&cmd, now + 20);
        assert_eq!(core.mode(), OperatingMode::EmergencyStop);
    }
}

#[test]
fn emergency_stop_holds_until_explicit_reset() {
    let (mut core, now) = operational_core();
    core.submit_robot_command(RobotCommand::Stop, now + 1);
    core.switches_mut().set_interlock(true);
    run_ticks(&mut core, now + CYCLE_TIME_MS, now + 5000);
    assert_eq!(core.mode(), OperatingMode::EmergencyStop);

    assert!(core.request_mode(OperatingMode::Initializing, now + 5010));
    core.switches_mut().set_interlock(false);
    run_ticks(&mut core, now + 5020, now + 5010 + 2000);
    assert_eq!(core.mode(), OperatingMode::Standby);
}

#[test]
fn error_waits_for_fault_clear_and_interlock() {
    let (mut core, now) = operational_core();
    core.faults_mut().register_fault(CRITICAL, now);
    let report = core.tick(now + CYCLE_TIME_MS);
    assert_eq!(report.transitioned, Some(OperatingMode::Error));
    assert!(!core.drive().is_enabled());

    core.switches_mut().set_interlock(true);
    run_ticks(&mut core, now + 20, now + 200);
    assert_eq!(core.mode(), OperatingMode::Error);

    core.faults_mut().clear_fault(CRITICAL);
    let report = core.tick(now + 210);
    assert_eq!(report.transitioned, Some(OperatingMode::Standby));
}

#[test]
fn link_loss_degrades_operational_to_standby() {
    let (mut core, now) = operational_core();
    core.set_link_state(false, now + 1);
    assert_eq!(
        core.tick(now + CYCLE_TIME_MS).transitioned,
        Some(OperatingMode::Standby)
    );
    assert!(!core.drive().is_enabled());
}

#[test]
fn reboot_opcode_reaches_restart_primitive() {
    let (mut core, now) = standby_core();
    assert_eq!(
        core.submit_robot_command(RobotCommand::from_u32(666), now),
        CommandOutcome::Restart
    );
    assert_eq!(core.restart().requests(), 1);
    assert!(core.has_recent_command(now + 100));
}
