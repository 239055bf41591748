//! Prelude module for common re-exports.
//!
//! ```rust
//! use rover_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{
    COMMAND_TIMEOUT_MS, CYCLE_TIME_MS, INIT_SETTLE_MS, MAX_MOTOR_SPEED, Millis,
    WATCHDOG_TIMEOUT_MS,
};

// ─── Control Core Types ─────────────────────────────────────────────
pub use crate::control_unit::command::{
    CommandFlags, RobotCommand, WheelVelocities, WheelVelocityCommand,
};
pub use crate::control_unit::error::{FaultCode, FaultRecord};
pub use crate::control_unit::state::OperatingMode;
pub use crate::control_unit::telemetry::TelemetrySnapshot;

// ─── Collaborators ──────────────────────────────────────────────────
pub use crate::hal::driver::{MotorController, MotorError, Switches, SystemRestart};
pub use crate::hal::types::{MotorFaultWords, MotorStatus, SwitchStates};
