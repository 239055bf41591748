//! Drive command arbiter.
//!
//! Sits between the command path and the motor controller. Velocity
//! setpoints only reach the motors while drive is enabled, and each wheel is
//! clamped to the current speed ceiling (halved in debug mode).
//!
//! A command freshness window acts as a dead-man's switch: once no command
//! has been accepted for `command_timeout` ms, [`DriveArbiter::update`]
//! sends a single zero-velocity command. Drive stays enabled, so the next
//! fresh command resumes motion.
//!
//! | Operation | Needs `enabled` | Motor call |
//! |-----------|-----------------|------------|
//! | `set_velocities*` | yes | velocity (clamped) |
//! | `disable` | no | zero velocity |
//! | `emergency_stop` | no | hard stop |
//! | `reset_encoders` | no | encoder reset |

use rover_common::consts::{COMMAND_TIMEOUT_MS, DEBUG_SPEED_DIVISOR, MAX_MOTOR_SPEED, Millis};
use rover_common::control_unit::command::WheelVelocities;
use rover_common::hal::driver::{MotorController, MotorError};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why a drive request was not carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DriveError {
    /// Drive authority is not granted; nothing was sent.
    #[error("drive is disabled")]
    Disabled,

    /// The motor controller call failed.
    #[error("motor controller call failed: {0}")]
    Motor(#[from] MotorError),
}

/// Speed ceiling and freshness window for a [`DriveArbiter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveLimits {
    /// Maximum wheel speed magnitude [ticks/s].
    pub max_speed: i32,
    /// Ceiling divisor applied in debug mode.
    pub debug_divisor: i32,
    /// Command freshness window [ms].
    pub command_timeout: Millis,
}

impl Default for DriveLimits {
    fn default() -> Self {
        Self {
            max_speed: MAX_MOTOR_SPEED,
            debug_divisor: DEBUG_SPEED_DIVISOR,
            command_timeout: COMMAND_TIMEOUT_MS,
        }
    }
}

/// Validates, limits and forwards wheel velocity commands.
#[derive(Debug)]
pub struct DriveArbiter<M> {
    motor: M,
    limits: DriveLimits,
    enabled: bool,
    debug_mode: bool,
    speed_ceiling: i32,
    last_command: Millis,
    timeout_handled: bool,
}

impl<M: MotorController> DriveArbiter<M> {
    /// Disabled arbiter owning `motor`.
    pub fn new(motor: M, limits: DriveLimits) -> Self {
        Self {
            motor,
            limits,
            enabled: false,
            debug_mode: false,
            speed_ceiling: limits.max_speed,
            last_command: 0,
            timeout_handled: false,
        }
    }

    /// Startup: restart the freshness window at `now` and hard-stop the
    /// motors. Drive is left disabled.
    pub fn initialize(&mut self, now: Millis) -> Result<(), DriveError> {
        self.last_command = now;
        self.emergency_stop()
    }

    // ─── Motion ─────────────────────────────────────────────────────

    /// Forward clamped setpoints using the controller's default ramp.
    ///
    /// On success the freshness window restarts at `now`.
    pub fn set_velocities(
        &mut self,
        velocities: WheelVelocities,
        now: Millis,
    ) -> Result<(), DriveError> {
        if !self.enabled {
            return Err(DriveError::Disabled);
        }
        let clamped = velocities.clamped(self.speed_ceiling);
        self.motor.set_velocities(clamped)?;
        self.reset_command_timeout(now);
        Ok(())
    }

    /// Forward clamped setpoints with an explicit acceleration limit.
    ///
    /// `acceleration == 0` takes the plain [`Self::set_velocities`] path.
    pub fn set_velocities_with_accel(
        &mut self,
        velocities: WheelVelocities,
        acceleration: u32,
        now: Millis,
    ) -> Result<(), DriveError> {
        if acceleration == 0 {
            return self.set_velocities(velocities, now);
        }
        if !self.enabled {
            return Err(DriveError::Disabled);
        }
        let clamped = velocities.clamped(self.speed_ceiling);
        self.motor.set_velocities_with_accel(clamped, acceleration)?;
        self.reset_command_timeout(now);
        Ok(())
    }

    /// Per-tick freshness check.
    ///
    /// Sends one zero-velocity command when the window has expired while
    /// enabled, then stays quiet until a command is accepted again. Returns
    /// `true` on the tick that issued the stop.
    pub fn update(&mut self, now: Millis) -> bool {
        if !self.enabled || self.timeout_handled || !self.is_command_timed_out(now) {
            return false;
        }
        if let Err(e) = self.motor.set_velocities(WheelVelocities::ZERO) {
            warn!(error = %e, "command timeout stop was not acknowledged");
        }
        self.timeout_handled = true;
        warn!(
            idle_ms = now.saturating_sub(self.last_command),
            "command timeout, motors stopped"
        );
        true
    }

    // ─── Authority ──────────────────────────────────────────────────

    /// Grant drive authority.
    pub fn enable(&mut self) {
        self.enabled = true;
        info!("drive enabled");
    }

    /// Revoke drive authority.
    ///
    /// Always commands zero velocity first, even if already disabled. A
    /// failed stop is logged and not escalated.
    pub fn disable(&mut self) {
        if let Err(e) = self.motor.set_velocities(WheelVelocities::ZERO) {
            warn!(error = %e, "zero command on disable was not acknowledged");
        }
        if self.enabled {
            info!("drive disabled");
        }
        self.enabled = false;
    }

    /// Hard stop, bypassing the `enabled` check. Drive ends up disabled even
    /// if the controller call fails.
    pub fn emergency_stop(&mut self) -> Result<(), DriveError> {
        let result = self.motor.emergency_stop();
        self.enabled = false;
        warn!("emergency stop");
        result.map_err(DriveError::from)
    }

    /// Zero every wheel encoder. Independent of drive authority.
    pub fn reset_encoders(&mut self) -> Result<(), DriveError> {
        self.motor.reset_encoders()?;
        debug!("encoders reset");
        Ok(())
    }

    /// Halve (or restore) the speed ceiling. Repeated calls are idempotent.
    pub fn set_debug_mode(&mut self, on: bool) {
        if on != self.debug_mode {
            debug!(debug_mode = on, "speed ceiling changed");
        }
        self.debug_mode = on;
        self.speed_ceiling = if on {
            self.limits.max_speed / self.limits.debug_divisor.max(1)
        } else {
            self.limits.max_speed
        };
    }

    /// Restart the freshness window at `now`.
    #[inline]
    pub fn reset_command_timeout(&mut self, now: Millis) {
        self.last_command = now;
        self.timeout_handled = false;
    }

    // ─── Queries ────────────────────────────────────────────────────

    /// True once `command_timeout` ms have passed since the last accepted
    /// command.
    #[inline]
    pub fn is_command_timed_out(&self, now: Millis) -> bool {
        now.saturating_sub(self.last_command) >= self.limits.command_timeout
    }

    #[inline]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub const fn is_debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Current per-wheel magnitude limit.
    #[inline]
    pub const fn speed_ceiling(&self) -> i32 {
        self.speed_ceiling
    }

    #[inline]
    pub const fn last_command_time(&self) -> Millis {
        self.last_command
    }

    #[inline]
    pub const fn timeout_handled(&self) -> bool {
        self.timeout_handled
    }

    #[inline]
    pub const fn limits(&self) -> &DriveLimits {
        &self.limits
    }

    /// Underlying motor controller.
    #[inline]
    pub fn motor(&self) -> &M {
        &self.motor
    }

    /// Underlying motor controller, for health polling.
    #[inline]
    pub fn motor_mut(&mut self) -> &mut M {
        &mut self.motor
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
