//! Control core shared types.
//!
//! Everything the control unit exchanges with its collaborators lives here:
//! the operating mode, fault bitflags and history records, decoded command
//! messages, and the telemetry snapshot.

pub mod command;
pub mod error;
pub mod state;
pub mod telemetry;
