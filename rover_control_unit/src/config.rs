//! Control unit TOML configuration.
//!
//! Every field falls back to the build-time constant in
//! `rover_common::consts`, so an empty file (or no file) yields the stock
//! tuning. The core never reads files: the binary loads this once and hands
//! plain values to constructors.
//!
//! ```toml
//! command_timeout_ms = 250
//! watchdog_timeout_ms = 1000
//! max_motor_speed = 2200
//!
//! [shared]
//! log_level = "debug"
//! service_name = "rover-cu"
//! ```

use std::path::Path;

use rover_common::config::{ConfigError, ConfigLoader, SharedConfig};
use rover_common::consts::{
    COMMAND_TIMEOUT_MS, CYCLE_TIME_MS, DEBUG_SPEED_DIVISOR, INIT_SETTLE_MS, MAX_MOTOR_SPEED,
    Millis, STATUS_PUBLISH_INTERVAL_MS, WATCHDOG_TIMEOUT_MS,
};
use serde::{Deserialize, Serialize};

use crate::drive::DriveLimits;

/// Runtime tuning of the control core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlConfig {
    #[serde(default)]
    pub shared: SharedConfig,

    /// Drive command freshness window [ms].
    #[serde(default = "default_command_timeout")]
    pub command_timeout_ms: Millis,

    /// Control-loop watchdog timeout [ms].
    #[serde(default = "default_watchdog_timeout")]
    pub watchdog_timeout_ms: Millis,

    /// Wheel speed ceiling [ticks/s].
    #[serde(default = "default_max_speed")]
    pub max_motor_speed: i32,

    /// Ceiling divisor while the debug switch is on.
    #[serde(default = "default_debug_divisor")]
    pub debug_speed_divisor: i32,

    /// INITIALIZING settle delay [ms].
    #[serde(default = "default_init_settle")]
    pub init_settle_ms: Millis,

    /// Health poll / snapshot interval [ms].
    #[serde(default = "default_status_interval")]
    pub status_interval_ms: Millis,

    /// Control tick period [ms].
    #[serde(default = "default_cycle_time")]
    pub cycle_time_ms: Millis,
}

fn default_command_timeout() -> Millis {
    COMMAND_TIMEOUT_MS
}
fn default_watchdog_timeout() -> Millis {
    WATCHDOG_TIMEOUT_MS
}
fn default_max_speed() -> i32 {
    MAX_MOTOR_SPEED
}
fn default_debug_divisor() -> i32 {
    DEBUG_SPEED_DIVISOR
}
fn default_init_settle() -> Millis {
    INIT_SETTLE_MS
}
fn default_status_interval() -> Millis {
    STATUS_PUBLISH_INTERVAL_MS
}
fn default_cycle_time() -> Millis {
    CYCLE_TIME_MS
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            command_timeout_ms: COMMAND_TIMEOUT_MS,
            watchdog_timeout_ms: WATCHDOG_TIMEOUT_MS,
            max_motor_speed: MAX_MOTOR_SPEED,
            debug_speed_divisor: DEBUG_SPEED_DIVISOR,
            init_settle_ms: INIT_SETTLE_MS,
            status_interval_ms: STATUS_PUBLISH_INTERVAL_MS,
            cycle_time_ms: CYCLE_TIME_MS,
        }
    }
}

impl ControlConfig {
    /// Check parameter bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        let fail = |msg: String| -> Result<(), ConfigError> {
            Err(ConfigError::ValidationError(msg))
        };
        if self.command_timeout_ms == 0 {
            return fail("command_timeout_ms must be > 0".into());
        }
        if self.watchdog_timeout_ms == 0 {
            return fail("watchdog_timeout_ms must be > 0".into());
        }
        if self.max_motor_speed <= 0 {
            return fail(format!("max_motor_speed {} must be > 0", self.max_motor_speed));
        }
        if self.debug_speed_divisor < 1 {
            return fail(format!(
                "debug_speed_divisor {} must be >= 1",
                self.debug_speed_divisor
            ));
        }
        if self.cycle_time_ms == 0 || self.cycle_time_ms >= self.watchdog_timeout_ms {
            return fail(format!(
                "cycle_time_ms {} out of range [1, {})",
                self.cycle_time_ms, self.watchdog_timeout_ms
            ));
        }
        if self.status_interval_ms == 0 {
            return fail("status_interval_ms must be > 0".into());
        }
        Ok(())
    }

    /// Drive arbiter limits derived from this config.
    pub const fn drive_limits(&self) -> DriveLimits {
        DriveLimits {
            max_speed: self.max_motor_speed,
            debug_divisor: self.debug_speed_divisor,
            command_timeout: self.command_timeout_ms,
        }
    }
}

/// Load and validate a control config from TOML.
pub fn load_config(path: &Path) -> Result<ControlConfig, ConfigError> {
    let config = ControlConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate a control config from a TOML string.
pub fn load_config_from_str(content: &str) -> Result<ControlConfig, ConfigError> {
    let config = ControlConfig::from_toml(content)?;
    config.validate()?;
    Ok(config)
}

// ─── Tests ──────────────────────────────────────────────────────────
