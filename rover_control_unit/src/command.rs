//! Command processing root.
//!
//! Decoding of transport messages into mode and drive actions.

pub mod interpreter;

pub use interpreter::{CommandInterpreter, CommandOutcome};
