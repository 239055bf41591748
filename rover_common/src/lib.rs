//! Rover Common Library
//!
//! Shared vocabulary for the rover control workspace: constants, the
//! operating mode, fault codes, command messages, collaborator traits and
//! configuration loading.
//!
//! # Module Structure
//!
//! - [`consts`] - Timing windows, speed limits, table sizes
//! - [`control_unit`] - Mode, faults, commands, telemetry
//! - [`hal`] - Motor / switch / restart collaborator traits
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience

pub mod config;
pub mod consts;
pub mod control_unit;
pub mod hal;
pub mod prelude;

static_assertions::const_assert!(consts::MAX_FAULT_RECORDS > 0);
static_assertions::const_assert!(consts::DEBUG_SPEED_DIVISOR >= 1);
static_assertions::assert_eq_size!(control_unit::error::FaultCode, u32);
