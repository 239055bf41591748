//! State machine module root.
//!
//! The operating mode FSM and its transition result type.

pub mod machine;

pub use machine::{ControlStateMachine, TransitionResult};
