//! Operating mode state machine.
//!
//! Owns the single current [`OperatingMode`]. Only edges in the transition
//! table are taken; anything else is rejected with a reason and leaves the
//! mode unchanged.
//!
//! ```text
//! INITIALIZING   -> STANDBY, ERROR
//! CALIBRATING    -> STANDBY, ERROR
//! STANDBY        -> OPERATIONAL, CALIBRATING, ERROR, EMERGENCY_STOP
//! OPERATIONAL    -> STANDBY, ERROR, EMERGENCY_STOP
//! ERROR          -> STANDBY, EMERGENCY_STOP
//! EMERGENCY_STOP -> INITIALIZING
//! ```
//!
//! Drive authority follows the mode through entry/exit actions: it is
//! granted only on entry to OPERATIONAL and revoked on every other entry
//! that can follow it.

use rover_common::consts::{INIT_SETTLE_MS, Millis};
use rover_common::control_unit::error::FaultCode;
use rover_common::control_unit::state::OperatingMode;
use rover_common::hal::driver::MotorController;
use tracing::{debug, error, info};

use crate::drive::DriveArbiter;

/// Result of a mode transition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// Transition taken; new mode.
    Ok(OperatingMode),
    /// Edge not in the table; reason.
    Rejected(&'static str),
}

impl TransitionResult {
    #[inline]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

/// Top-level operating mode FSM.
#[derive(Debug, Clone)]
pub struct ControlStateMachine {
    mode: OperatingMode,
    entry_time: Millis,
    operational_requested: bool,
    settle_ms: Millis,
}

impl ControlStateMachine {
    /// State machine in INITIALIZING with the given settle delay.
    pub const fn new(settle_ms: Millis) -> Self {
        Self {
            mode: OperatingMode::Initializing,
            entry_time: 0,
            operational_requested: false,
            settle_ms,
        }
    }

    /// (Re)enter INITIALIZING at `now` without checking the table.
    pub fn initialize<M: MotorController>(&mut self, now: Millis, drive: &mut DriveArbiter<M>) {
        self.mode = OperatingMode::Initializing;
        self.entry_time = now;
        self.on_entry(OperatingMode::Initializing, drive);
        info!(mode = %self.mode, "state machine initialized");
    }

    // ─── Queries ────────────────────────────────────────────────────

    #[inline]
    pub const fn mode(&self) -> OperatingMode {
        self.mode
    }

    /// Timestamp of the last mode entry.
    #[inline]
    pub const fn state_entry_time(&self) -> Millis {
        self.entry_time
    }

    #[inline]
    pub const fn operational_requested(&self) -> bool {
        self.operational_requested
    }

    /// Whether `target` is reachable from the current mode in one step.
    #[inline]
    pub const fn can_transition(&self, target: OperatingMode) -> bool {
        self.mode.allows(target)
    }

    // ─── Transitions ────────────────────────────────────────────────

    /// Latch (or withdraw) the external request to go OPERATIONAL.
    ///
    /// Cleared automatically on entry to OPERATIONAL.
    pub fn set_operational_requested(&mut self, requested: bool) {
        self.operational_requested = requested;
    }

    /// Move to `target` if the edge exists.
    ///
    /// On success runs the exit action of the old mode, records `now` as the
    /// entry time, then runs the entry action of the new mode.
    pub fn transition<M: MotorController>(
        &mut self,
        target: OperatingMode,
        now: Millis,
        drive: &mut DriveArbiter<M>,
    ) -> TransitionResult {
        if !self.can_transition(target) {
            let reason = rejection_reason(self.mode);
            debug!(from = %self.mode, to = %target, reason, "transition rejected");
            return TransitionResult::Rejected(reason);
        }

        let old = self.mode;
        self.on_exit(old, drive);
        self.mode = target;
        self.entry_time = now;
        self.on_entry(target, drive);
        info!(from = %old, to = %target, "mode transition");
        TransitionResult::Ok(target)
    }

    /// Per-tick autonomous transition policy.
    ///
    /// Returns the new mode when a transition was taken.
    pub fn update<M: MotorController>(
        &mut self,
        now: Millis,
        active_faults: FaultCode,
        interlock_active: bool,
        drive: &mut DriveArbiter<M>,
    ) -> Option<OperatingMode> {
        use OperatingMode::*;

        let critical = active_faults.has_critical();
        let target = match self.mode {
            Initializing if !active_faults.is_empty() => Some(Error),
            Initializing if now.saturating_sub(self.entry_time) >= self.settle_ms => Some(Standby),
            Standby if critical => Some(Error),
            Standby if self.operational_requested && !interlock_active => Some(Operational),
            Operational if critical => Some(Error),
            Operational if active_faults.contains(FaultCode::COMM_TIMEOUT) => Some(Standby),
            Error if interlock_active && !critical => Some(Standby),
            // CALIBRATING is left externally, EMERGENCY_STOP only by reset.
            _ => None,
        }?;

        match self.transition(target, now, drive) {
            TransitionResult::Ok(mode) => Some(mode),
            TransitionResult::Rejected(_) => None,
        }
    }

    // ─── Entry / exit actions ───────────────────────────────────────

    fn on_entry<M: MotorController>(&mut self, mode: OperatingMode, drive: &mut DriveArbiter<M>) {
        match mode {
            OperatingMode::Standby | OperatingMode::Error => drive.disable(),
            OperatingMode::Operational => {
                drive.enable();
                self.operational_requested = false;
            }
            OperatingMode::EmergencyStop => {
                if let Err(e) = drive.emergency_stop() {
                    error!(error = %e, "emergency stop not acknowledged by motor controller");
                }
                drive.disable();
            }
            OperatingMode::Initializing | OperatingMode::Calibrating => {}
        }
    }

    fn on_exit<M: MotorController>(&mut self, mode: OperatingMode, drive: &mut DriveArbiter<M>) {
        if mode == OperatingMode::Operational {
            drive.disable();
        }
    }
}

impl Default for ControlStateMachine {
    fn default() -> Self {
        Self::new(INIT_SETTLE_MS)
    }
}

fn rejection_reason(from: OperatingMode) -> &'static str {
    match from {
        OperatingMode::Initializing => "INITIALIZING: only STANDBY or ERROR allowed",
        OperatingMode::Calibrating => "CALIBRATING: only STANDBY or ERROR allowed",
        OperatingMode::Standby => {
            "STANDBY: only OPERATIONAL, CALIBRATING, ERROR or EMERGENCY_STOP allowed"
        }
        OperatingMode::Operational => "OPERATIONAL: only STANDBY, ERROR or EMERGENCY_STOP allowed",
        OperatingMode::Error => "ERROR: only STANDBY or EMERGENCY_STOP allowed",
        OperatingMode::EmergencyStop => "EMERGENCY_STOP: only reset to INITIALIZING allowed",
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
