//! Integration test: transition table enforcement through the core.

use rover_common::control_unit::command::{WheelVelocities, WheelVelocityCommand};
use rover_common::control_unit::error::FaultCode;
use rover_common::control_unit::state::OperatingMode;

use super::common::{fresh_core, standby_core};

/// Walk the core into `mode` via legal edges only.
fn core_in(mode: OperatingMode) -> super::common::SimCore {
    use OperatingMode::*;
    let (mut core, now) = standby_core();
    let ok = match mode {
        Standby => true,
        Initializing => {
            core.request_mode(EmergencyStop, now) && core.request_mode(Initializing, now)
        }
        other => core.request_mode(other, now),
    };
    assert!(ok, "could not reach {mode}");
    assert_eq!(core.mode(), mode);
    core
}

#[test]
fn only_table_edges_are_taken() {
    for from in OperatingMode::ALL {
        for to in OperatingMode::ALL {
            let mut core = core_in(from);
            let taken = core.request_mode(to, 5000);
            assert_eq!(taken, from.allows(to), "{from} -> {to}");
            let expected = if taken { to } else { from };
            assert_eq!(core.mode(), expected);
        }
    }
}

#[test]
fn rejected_transition_registers_no_fault() {
    let mut core = fresh_core();
    assert!(!core.request_mode(OperatingMode::Operational, 1));
    assert!(core.faults().is_clear());
    assert!(!core.drive().is_enabled());
}

#[test]
fn table_shape() {
    let edges: usize = OperatingMode::ALL
        .iter()
        .map(|from| OperatingMode::ALL.iter().filter(|to| from.allows(**to)).count())
        .sum();
    assert_eq!(edges, 14);
    assert!(!OperatingMode::ALL.iter().any(|m| m.allows(*m)));
    assert_eq!(FaultCode::CRITICAL_MASK.bits(), 0xF000_0000);
}

#[test]
fn drive_authority_follows_mode() {
    for mode in OperatingMode::ALL {
        let mut core = core_in(mode);
        core.motor_mut().clear_calls();

        let cmd = WheelVelocityCommand::drive(WheelVelocities::splat(900));
        core.submit_wheel_velocity_command(&cmd, 2001);
        core.tick(2010);

        let operational = core.mode() == OperatingMode::Operational;
        assert_eq!(core.drive().is_enabled(), operational, "{mode}");
        assert_eq!(core.motor_mut().has_sent_motion(), operational, "{mode}");
    }
}
