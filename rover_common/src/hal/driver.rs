//! Collaborator traits consumed by the control core.
//!
//! This module defines:
//! - `MotorController` trait - actuation and fault readback for the drive
//! - `Switches` trait - physical debug / interlock inputs
//! - `SystemRestart` trait - hardware restart primitive
//! - `MotorError` enum - failure of a single controller call
//!
//! The core never retries a failed call. A failure is reported to the
//! caller and the next control tick proceeds normally.

use thiserror::Error;

use crate::control_unit::command::WheelVelocities;
use crate::hal::types::{MotorFaultWords, MotorStatus, SwitchStates};

/// Failure of a single motor controller call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MotorError {
    /// Controller at `address` did not acknowledge the command.
    #[error("motor controller {address:#04x} did not acknowledge")]
    NoAck { address: u8 },

    /// Reading back from the controller timed out.
    #[error("motor controller read timed out")]
    ReadTimeout,

    /// The back-end does not implement this operation.
    #[error("operation not supported by this motor back-end")]
    Unsupported,
}

/// Drive actuation interface.
///
/// # Timing Contracts
///
/// | Operation | Blocking | Called from |
/// |-----------|----------|-------------|
/// | `set_velocities*` | bounded serial round trip | command path, timeout stop |
/// | `emergency_stop()` | bounded | entry to EMERGENCY_STOP, startup |
/// | `read_faults()` | bounded | periodic health poll |
pub trait MotorController {
    /// Back-end identifier (e.g. "sim").
    fn name(&self) -> &'static str;

    /// Bring the controllers up. Called once before the control loop starts.
    fn init(&mut self) -> Result<(), MotorError> {
        Ok(())
    }

    /// Command wheel velocities using the controller's default acceleration.
    fn set_velocities(&mut self, velocities: WheelVelocities) -> Result<(), MotorError>;

    /// Command wheel velocities with an explicit acceleration limit.
    fn set_velocities_with_accel(
        &mut self,
        velocities: WheelVelocities,
        acceleration: u32,
    ) -> Result<(), MotorError>;

    /// Immediate stop: zero duty cycle on every channel, no ramp.
    fn emergency_stop(&mut self) -> Result<(), MotorError>;

    /// Zero every wheel encoder.
    fn reset_encoders(&mut self) -> Result<(), MotorError>;

    /// Raw fault words of the left and right controllers.
    fn read_faults(&mut self) -> Result<MotorFaultWords, MotorError>;

    /// Wheel feedback for telemetry.
    /// Default: not available.
    fn read_status(&mut self) -> Result<MotorStatus, MotorError> {
        Err(MotorError::Unsupported)
    }
}

/// Physical switch panel. Pure reads of input state.
pub trait Switches {
    /// Debug switch position.
    fn is_debug_mode_requested(&self) -> bool;

    /// Interlock switch position.
    fn is_interlock_active(&self) -> bool;

    /// Both switches sampled together.
    fn states(&self) -> SwitchStates {
        SwitchStates {
            debug: self.is_debug_mode_requested(),
            interlock: self.is_interlock_active(),
        }
    }
}

/// Hardware restart primitive.
pub trait SystemRestart {
    /// Restart the controller. Implementations on real hardware never
    /// return; simulated back-ends record the request and return.
    fn restart(&mut self);
}
