//! System-wide constants for the rover workspace.
//!
//! Single source of truth for timing windows, speed limits and table sizes.
//! Runtime configuration (`ControlConfig`) falls back to these values.

/// Monotonic millisecond timestamp used by every time-dependent operation.
pub type Millis = u64;

/// Drive command freshness window [ms]. A stale command degrades to a stop.
pub const COMMAND_TIMEOUT_MS: Millis = 250;

/// Control-loop liveness watchdog timeout [ms].
pub const WATCHDOG_TIMEOUT_MS: Millis = 1000;

/// Delay spent in INITIALIZING before the automatic move to STANDBY [ms].
pub const INIT_SETTLE_MS: Millis = 2000;

/// Maximum wheel velocity magnitude [encoder ticks/s].
pub const MAX_MOTOR_SPEED: i32 = 2200;

/// Divisor applied to the speed ceiling while the debug switch is on.
pub const DEBUG_SPEED_DIVISOR: i32 = 2;

/// Acceleration used by the motor controller when a command carries none [ticks/s²].
pub const DEFAULT_ACCELERATION: u32 = 10_000;

/// Capacity of the fault history table.
pub const MAX_FAULT_RECORDS: usize = 16;

/// Health poll / telemetry snapshot interval [ms].
pub const STATUS_PUBLISH_INTERVAL_MS: Millis = 50;

/// Nominal control tick period [ms].
pub const CYCLE_TIME_MS: Millis = 10;

/// Number of driven wheels (FL, RL, FR, RR).
pub const WHEEL_COUNT: usize = 4;
