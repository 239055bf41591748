//! # Rover Control Unit Library
//!
//! Safety control core of a four-wheel rover. Arbitrates motion commands,
//! tracks system health and forces a safe stop when commands go stale or the
//! hardware reports faults.
//!
//! ## Components (leaf first)
//!
//! 1. **ErrorRegistry** ([`fault`]) - active fault bitfield and bounded history
//! 2. **Watchdog** ([`watchdog`]) - control-loop liveness timer
//! 3. **DriveArbiter** ([`drive`]) - clamps and forwards wheel velocities
//! 4. **ControlStateMachine** ([`state`]) - operating mode, gates drive authority
//! 5. **CommandInterpreter** ([`command`]) - decodes external commands
//!
//! [`cycle::ControlCore`] owns all of them and runs one cooperative tick at a
//! time. Nothing blocks, sleeps or spawns; every time-dependent call takes
//! the current monotonic millisecond timestamp.

pub mod command;
pub mod config;
pub mod cycle;
pub mod drive;
pub mod fault;
pub mod sim;
pub mod state;
pub mod watchdog;

static_assertions::const_assert!(
    rover_common::consts::CYCLE_TIME_MS < rover_common::consts::COMMAND_TIMEOUT_MS
);
static_assertions::const_assert!(
    rover_common::consts::STATUS_PUBLISH_INTERVAL_MS < rover_common::consts::WATCHDOG_TIMEOUT_MS
);
