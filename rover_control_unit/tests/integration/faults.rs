//! Integration test: fault registry and watchdog behavior through the core.

use rover_common::consts::{CYCLE_TIME_MS, MAX_FAULT_RECORDS, Millis};
use rover_common::control_unit::error::FaultCode;
use rover_common::control_unit::state::OperatingMode;
use rover_common::hal::types::MotorFaultWords;
use rover_control_unit::fault::ErrorRegistry;
use rover_control_unit::watchdog::Watchdog;

use super::common::{fresh_core, operational_core, run_ticks, standby_core};

#[test]
fn watchdog_registers_once_per_stall() {
    let mut wd = Watchdog::default();
    let mut reg = ErrorRegistry::new();
    wd.initialize(100, 0);

    let fired = (0..=1000).step_by(5).filter(|&t| wd.update(t, &mut reg)).count();
    assert_eq!(fired, 1);
    assert_eq!(reg.record(FaultCode::WATCHDOG).map(|r| r.count), Some(1));
    assert!(wd.is_timed_out());

    wd.pet(1000);
    assert!(!wd.is_timed_out());
}

#[test]
fn stalled_core_during_init_ends_in_error() {
    let mut core = fresh_core();
    core.tick(CYCLE_TIME_MS);
    let report = core.tick(1500);
    assert!(report.watchdog_fired);
    assert_eq!(report.transitioned, Some(OperatingMode::Error));
}

#[test]
fn watchdog_fault_alone_does_not_stop_operational() {
    let (mut core, now) = operational_core();
    core.tick(now + 1200);
    assert!(core.faults().has_fault(FaultCode::WATCHDOG));
    assert_eq!(core.mode(), OperatingMode::Operational);
}

#[test]
fn seventeenth_code_evicts_the_oldest() {
    let mut reg = ErrorRegistry::new();
    let codes: Vec<FaultCode> = (0..=MAX_FAULT_RECORDS as u32)
        .map(|i| FaultCode::from_bits_retain(1 << i))
        .collect();
    for (i, code) in codes.iter().enumerate() {
        reg.register_fault(*code, 100 + i as Millis);
    }

    assert!(reg.record(codes[0]).is_none());
    for code in &codes[1..] {
        assert!(reg.record(*code).is_some());
    }
}

#[test]
fn reset_non_critical_clears_everything_defined() {
    let mut reg = ErrorRegistry::new();
    reg.register_fault(FaultCode::COMM_TIMEOUT, 1);
    reg.register_fault(FaultCode::COMM_TIMEOUT, 2);
    reg.register_fault(FaultCode::SENSOR_COMM_FAILURE, 3);
    assert_eq!(reg.record(FaultCode::COMM_TIMEOUT).map(|r| r.count), Some(2));

    reg.reset_non_critical();
    assert!(reg.is_clear());
    assert!(reg.records().all(|r| !r.active));
}

#[test]
fn motor_faults_follow_the_controller_on_each_poll() {
    let (mut core, now) = standby_core();
    core.motor_mut()
        .set_faults(MotorFaultWords { left: 0x20, right: 0x01 });
    run_ticks(&mut core, now + CYCLE_TIME_MS, now + 100);
    assert!(core.faults().has_fault(FaultCode::MOTOR_UNDER_VOLTAGE | FaultCode::MOTOR_ESTOP));
    // Motor faults are outside the critical mask: mode is unaffected.
    assert_eq!(core.mode(), OperatingMode::Standby);

    core.motor_mut().set_faults(MotorFaultWords::default());
    run_ticks(&mut core, now + 110, now + 200);
    assert!(core.faults().is_clear());
    assert!(core.faults().record(FaultCode::MOTOR_ESTOP).is_some());
}

#[test]
fn failed_health_poll_keeps_last_known_faults() {
    let (mut core, now) = standby_core();
    core.motor_mut()
        .set_faults(MotorFaultWords { left: 0x08, right: 0 });
    run_ticks(&mut core, now + CYCLE_TIME_MS, now + 60);
    core.motor_mut().set_failing(true);
    run_ticks(&mut core, now + 70, now + 200);
    assert!(core.faults().has_fault(FaultCode::MOTOR_OVER_VOLTAGE));
}
