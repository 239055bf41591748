//! Integration test: speed ceiling and debug switch.

use rover_common::consts::{CYCLE_TIME_MS, MAX_MOTOR_SPEED};
use rover_common::control_unit::command::{WheelVelocities, WheelVelocityCommand};
use rover_control_unit::sim::MotorCall;

use super::common::operational_core;

const PROBES: [i32; 9] = [
    i32::MIN,
    -100_000,
    -2201,
    -2200,
    -1,
    0,
    1101,
    2200,
    i32::MAX,
];

fn forwarded(calls: &[MotorCall]) -> Vec<WheelVelocities> {
    calls
        .iter()
        .filter_map(|c| match c {
            MotorCall::Velocities(v) | MotorCall::VelocitiesWithAccel(v, _) => Some(*v),
            _ => None,
        })
        .collect()
}

#[test]
fn every_forwarded_wheel_is_within_ceiling() {
    let (mut core, mut now) = operational_core();
    for (i, v) in PROBES.iter().enumerate() {
        let raw = [*v, v.saturating_neg() / 2, PROBES[PROBES.len() - 1 - i], 7, (i as i32) * 100, 0];
        core.submit_wheel_velocity_command(&WheelVelocityCommand::from_raw(raw), now);
        now += 1;
    }

    let sent = forwarded(core.drive().motor().calls());
    assert_eq!(sent.len(), PROBES.len());
    for v in sent {
        for w in v.to_array() {
            assert!((-MAX_MOTOR_SPEED..=MAX_MOTOR_SPEED).contains(&w), "{w}");
        }
    }
}

#[test]
fn debug_switch_halves_ceiling_on_next_tick() {
    let (mut core, now) = operational_core();
    core.switches_mut().set_debug(true);
    core.tick(now + CYCLE_TIME_MS);
    core.tick(now + 2 * CYCLE_TIME_MS);
    assert_eq!(core.drive().speed_ceiling(), MAX_MOTOR_SPEED / 2);

    let cmd = WheelVelocityCommand::drive(WheelVelocities::from_array([3000, -3000, 500, 0]));
    core.submit_wheel_velocity_command(&cmd, now + 25);
    assert_eq!(
        core.drive().motor().last_velocities(),
        Some(WheelVelocities::from_array([1100, -1100, 500, 0]))
    );

    core.switches_mut().set_debug(false);
    core.tick(now + 3 * CYCLE_TIME_MS);
    assert_eq!(core.drive().speed_ceiling(), MAX_MOTOR_SPEED);
}
