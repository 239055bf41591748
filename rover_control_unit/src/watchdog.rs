//! Control-loop liveness watchdog.
//!
//! Two states, `Armed` and `TimedOut`. The control loop calls [`Watchdog::pet`]
//! once per tick; [`Watchdog::update`] raises `FaultCode::WATCHDOG` the first
//! time the pet interval reaches the timeout and stays quiet until the next
//! pet re-arms it.

use rover_common::consts::{Millis, WATCHDOG_TIMEOUT_MS};
use rover_common::control_unit::error::FaultCode;
use tracing::{debug, error};

use crate::fault::ErrorRegistry;

/// Watchdog state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogState {
    /// Pet within the window.
    Armed,
    /// Window expired; the fault has been registered.
    TimedOut,
}

/// Liveness timer feeding the error registry.
#[derive(Debug, Clone)]
pub struct Watchdog {
    timeout: Millis,
    last_pet: Millis,
    enabled: bool,
    state: WatchdogState,
}

impl Watchdog {
    /// Disabled watchdog with the given timeout.
    pub const fn new(timeout: Millis) -> Self {
        Self {
            timeout,
            last_pet: 0,
            enabled: false,
            state: WatchdogState::Armed,
        }
    }

    /// Set the timeout, enable checking and arm from `now`.
    pub fn initialize(&mut self, timeout: Millis, now: Millis) {
        self.timeout = timeout;
        self.enabled = true;
        self.pet(now);
        debug!(timeout_ms = timeout, "watchdog armed");
    }

    /// Refresh the deadline and leave `TimedOut`.
    #[inline]
    pub fn pet(&mut self, now: Millis) {
        self.last_pet = now;
        self.state = WatchdogState::Armed;
    }

    /// Check the deadline.
    ///
    /// Registers `WATCHDOG` exactly once per expiry and returns `true` on the
    /// call that registered it. Does nothing while disabled.
    pub fn update(&mut self, now: Millis, faults: &mut ErrorRegistry) -> bool {
        if !self.enabled || self.state == WatchdogState::TimedOut {
            return false;
        }
        let elapsed = now.saturating_sub(self.last_pet);
        if elapsed < self.timeout {
            return false;
        }

        self.state = WatchdogState::TimedOut;
        faults.register_fault(FaultCode::WATCHDOG, now);
        error!(elapsed_ms = elapsed, timeout_ms = self.timeout, "watchdog expired");
        true
    }

    /// Suspend or resume checking. Resuming re-arms from `now`.
    pub fn set_enabled(&mut self, enabled: bool, now: Millis) {
        self.enabled = enabled;
        if enabled {
            self.pet(now);
        }
    }

    /// Change the timeout without touching the deadline.
    #[inline]
    pub fn set_timeout(&mut self, timeout: Millis) {
        self.timeout = timeout;
    }

    #[inline]
    pub const fn timeout(&self) -> Millis {
        self.timeout
    }

    #[inline]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub const fn state(&self) -> WatchdogState {
        self.state
    }

    #[inline]
    pub fn is_timed_out(&self) -> bool {
        self.state == WatchdogState::TimedOut
    }
}

impl Default for Watchdog {
    fn default() -> Self {
        Self::new(WATCHDOG_TIMEOUT_MS)
    }
}
