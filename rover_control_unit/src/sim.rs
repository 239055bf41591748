//! In-process simulated collaborators.
//!
//! Used by the binary when no hardware back-end is present and by tests as
//! recording doubles. `SimMotorController` logs every command it receives,
//! can be told to fail calls, and reports whatever raw fault words it was
//! given.

use rover_common::consts::{DEFAULT_ACCELERATION, WHEEL_COUNT};
use rover_common::control_unit::command::WheelVelocities;
use rover_common::hal::driver::{MotorController, MotorError, Switches, SystemRestart};
use rover_common::hal::types::{MotorFaultWords, MotorStatus};

/// Packet-serial address reported in simulated `NoAck` errors.
pub const SIM_MOTOR_ADDRESS: u8 = 0x80;

/// One command received by [`SimMotorController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorCall {
    Init,
    Velocities(WheelVelocities),
    VelocitiesWithAccel(WheelVelocities, u32),
    EmergencyStop,
    ResetEncoders,
}

/// Recording motor controller.
#[derive(Debug, Clone)]
pub struct SimMotorController {
    calls: Vec<MotorCall>,
    failing: bool,
    faults: MotorFaultWords,
    status: MotorStatus,
    acceleration: u32,
}

impl SimMotorController {
    /// Healthy controller pair at 24.0 V and 25.0 °C, wheels at rest.
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            failing: false,
            faults: MotorFaultWords::default(),
            status: MotorStatus {
                voltages: [240, 240],
                temperatures: [250, 250],
                ..MotorStatus::default()
            },
            acceleration: DEFAULT_ACCELERATION,
        }
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Raw fault words returned by the next `read_faults`.
    pub fn set_faults(&mut self, faults: MotorFaultWords) {
        self.faults = faults;
    }

    /// Commands received so far, oldest first.
    pub fn calls(&self) -> &[MotorCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Setpoints of the most recent velocity command of either kind.
    pub fn last_velocities(&self) -> Option<WheelVelocities> {
        self.calls.iter().rev().find_map(|call| match call {
            MotorCall::Velocities(v) | MotorCall::VelocitiesWithAccel(v, _) => Some(*v),
            _ => None,
        })
    }

    /// Ramp applied to the most recent velocity command [ticks/s²].
    ///
    /// Plain `set_velocities` runs at the controller's stock ramp.
    pub fn last_acceleration(&self) -> u32 {
        self.acceleration
    }

    /// Whether any non-zero setpoint was ever sent.
    pub fn has_sent_motion(&self) -> bool {
        self.calls.iter().any(|call| match call {
            MotorCall::Velocities(v) | MotorCall::VelocitiesWithAccel(v, _) => !v.is_zero(),
            _ => false,
        })
    }

    fn accept(&mut self, call: MotorCall) -> Result<(), MotorError> {
        if self.failing {
            return Err(MotorError::NoAck {
                address: SIM_MOTOR_ADDRESS,
            });
        }
        self.calls.push(call);
        Ok(())
    }
}

impl MotorController for SimMotorController {
    fn name(&self) -> &'static str {
        "sim"
    }

    fn init(&mut self) -> Result<(), MotorError> {
        self.accept(MotorCall::Init)
    }

    fn set_velocities(&mut self, velocities: WheelVelocities) -> Result<(), MotorError> {
        self.accept(MotorCall::Velocities(velocities))?;
        self.status.speeds = velocities.to_array();
        self.acceleration = DEFAULT_ACCELERATION;
        Ok(())
    }

    fn set_velocities_with_accel(
        &mut self,
        velocities: WheelVelocities,
        acceleration: u32,
    ) -> Result<(), MotorError> {
        self.accept(MotorCall::VelocitiesWithAccel(velocities, acceleration))?;
        self.status.speeds = velocities.to_array();
        self.acceleration = acceleration;
        Ok(())
    }

    fn emergency_stop(&mut self) -> Result<(), MotorError> {
        self.accept(MotorCall::EmergencyStop)?;
        self.status.speeds = [0; WHEEL_COUNT];
        Ok(())
    }

    fn reset_encoders(&mut self) -> Result<(), MotorError> {
        self.accept(MotorCall::ResetEncoders)?;
        self.status.encoders = [0; WHEEL_COUNT];
        Ok(())
    }

    fn read_faults(&mut self) -> Result<MotorFaultWords, MotorError> {
        if self.failing {
            return Err(MotorError::ReadTimeout);
        }
        Ok(self.faults)
    }

    fn read_status(&mut self) -> Result<MotorStatus, MotorError> {
        if self.failing {
            return Err(MotorError::ReadTimeout);
        }
        // Encoders advance by one tick-period's worth of the commanded speed.
        for (enc, speed) in self.status.encoders.iter_mut().zip(self.status.speeds) {
            *enc = enc.wrapping_add(speed / 100);
        }
        Ok(self.status)
    }
}

impl Default for SimMotorController {
    fn default() -> Self {
        Self::new()
    }
}

/// Settable switch panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimSwitches {
    pub debug: bool,
    pub interlock: bool,
}

impl SimSwitches {
    pub fn set_debug(&mut self, on: bool) {
        self.debug = on;
    }

    pub fn set_interlock(&mut self, on: bool) {
        self.interlock = on;
    }
}

impl Switches for SimSwitches {
    fn is_debug_mode_requested(&self) -> bool {
        self.debug
    }

    fn is_interlock_active(&self) -> bool {
        self.interlock
    }
}

/// Restart primitive that only counts requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimRestart {
    requests: u32,
}

impl SimRestart {
    pub fn requests(&self) -> u32 {
        self.requests
    }
}

impl SystemRestart for SimRestart {
    fn restart(&mut self) {
        self.requests += 1;
        tracing::warn!(requests = self.requests, "simulated restart requested");
    }
}
