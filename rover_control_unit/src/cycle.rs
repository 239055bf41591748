//! Control tick driver.
//!
//! [`ControlCore`] owns the five core components and the collaborators and
//! runs them in a fixed order once per tick. Inbound commands are delivered
//! synchronously between ticks through the two `submit_*` entry points.
//!
//! ## Tick order
//! 1. Watchdog check (deadline set by the previous tick's pet)
//! 2. Switch read, debug-mode ceiling applied
//! 3. State machine autonomous transitions
//! 4. Drive command freshness check
//! 5. Health poll every `status_interval` ms: motor fault words, wheel status
//! 6. Watchdog pet

use std::time::Instant;

use rover_common::consts::Millis;
use rover_common::control_unit::command::{RobotCommand, WheelVelocityCommand};
use rover_common::control_unit::error::FaultCode;
use rover_common::control_unit::state::OperatingMode;
use rover_common::control_unit::telemetry::TelemetrySnapshot;
use rover_common::hal::driver::{MotorController, MotorError, Switches, SystemRestart};
use rover_common::hal::types::{MotorFaultWords, MotorStatus, SwitchStates};
use tracing::{error, info, warn};

use crate::command::{CommandInterpreter, CommandOutcome};
use crate::config::ControlConfig;
use crate::drive::DriveArbiter;
use crate::fault::ErrorRegistry;
use crate::state::ControlStateMachine;
use crate::watchdog::Watchdog;

// ─── Cycle Statistics ───────────────────────────────────────────────

/// O(1) per-tick timing statistics.
#[derive(Debug, Clone)]
pub struct CycleStats {
    /// Total ticks executed.
    pub tick_count: u64,
    /// Last tick duration [µs].
    pub last_tick_us: u32,
    /// Maximum tick duration [µs].
    pub max_tick_us: u32,
    /// Running sum for the average.
    pub sum_tick_us: u64,
    /// Ticks that took longer than the tick period.
    pub overruns: u64,
}

impl CycleStats {
    pub const fn new() -> Self {
        Self {
            tick_count: 0,
            last_tick_us: 0,
            max_tick_us: 0,
            sum_tick_us: 0,
            overruns: 0,
        }
    }

    /// Record one tick duration against the period budget.
    #[inline]
    pub fn record(&mut self, duration_us: u32, budget_us: u64) {
        self.tick_count += 1;
        self.last_tick_us = duration_us;
        self.max_tick_us = self.max_tick_us.max(duration_us);
        self.sum_tick_us += u64::from(duration_us);
        if u64::from(duration_us) > budget_us {
            self.overruns += 1;
        }
    }

    /// Average tick duration [µs] (0 before the first tick).
    #[inline]
    pub fn avg_tick_us(&self) -> u64 {
        if self.tick_count == 0 {
            0
        } else {
            self.sum_tick_us / self.tick_count
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tick Report ────────────────────────────────────────────────────

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Mode after the tick.
    pub mode: OperatingMode,
    /// Mode entered by an autonomous transition this tick.
    pub transitioned: Option<OperatingMode>,
    /// The watchdog registered a fault this tick.
    pub watchdog_fired: bool,
    /// The drive issued its command timeout stop this tick.
    pub timeout_stop: bool,
    /// The health poll ran this tick.
    pub health_polled: bool,
}

// ─── Control Core ───────────────────────────────────────────────────

/// The control core: components, collaborators and tick scheduling.
pub struct ControlCore<M, S, R> {
    faults: ErrorRegistry,
    watchdog: Watchdog,
    drive: DriveArbiter<M>,
    sm: ControlStateMachine,
    interpreter: CommandInterpreter,
    switches: S,
    restart: R,

    watchdog_timeout: Millis,
    status_interval: Millis,
    tick_budget_us: u64,

    last_health_poll: Millis,
    last_tick: Millis,
    link_up: bool,
    switch_states: SwitchStates,
    motor_faults: MotorFaultWords,
    motor_status: MotorStatus,
    stats: CycleStats,
}

impl<M, S, R> ControlCore<M, S, R>
where
    M: MotorController,
    S: Switches,
    R: SystemRestart,
{
    /// Assemble a core from its collaborators. Call [`Self::startup`] before
    /// the first tick.
    pub fn new(motor: M, switches: S, restart: R, config: &ControlConfig) -> Self {
        Self {
            faults: ErrorRegistry::new(),
            watchdog: Watchdog::new(config.watchdog_timeout_ms),
            drive: DriveArbiter::new(motor, config.drive_limits()),
            sm: ControlStateMachine::new(config.init_settle_ms),
            interpreter: CommandInterpreter::new(config.command_timeout_ms),
            switches,
            restart,
            watchdog_timeout: config.watchdog_timeout_ms,
            status_interval: config.status_interval_ms,
            tick_budget_us: config.cycle_time_ms.saturating_mul(1000),
            last_health_poll: 0,
            last_tick: 0,
            link_up: true,
            switch_states: SwitchStates::default(),
            motor_faults: MotorFaultWords::default(),
            motor_status: MotorStatus::default(),
            stats: CycleStats::new(),
        }
    }

    /// Bring the core up at `now`.
    ///
    /// `init_failures` holds the faults raised while bringing up hardware,
    /// e.g. `INIT_FAILURE` for the motor controllers or
    /// `SENSOR_COMM_FAILURE` for the IMU. Each is registered, which sends
    /// INITIALIZING to ERROR on the first tick.
    pub fn startup(&mut self, now: Millis, init_failures: FaultCode) {
        for code in init_failures.iter() {
            error!(?code, "hardware initialization failed");
            self.faults.register_fault(code, now);
        }
        if let Err(e) = self.drive.initialize(now) {
            error!(error = %e, "initial emergency stop failed");
        }
        self.watchdog.initialize(self.watchdog_timeout, now);
        self.sm.initialize(now, &mut self.drive);
        self.interpreter.initialize(now);
        self.last_health_poll = now;
        self.last_tick = now;
        info!(motor = self.drive.motor().name(), "control core started");
    }

    /// Run one control tick at `now`.
    pub fn tick(&mut self, now: Millis) -> TickReport {
        let started = Instant::now();

        let watchdog_fired = self.watchdog.update(now, &mut self.faults);

        self.switch_states = self.switches.states();
        self.drive.set_debug_mode(self.switch_states.debug);

        let transitioned = self.sm.update(
            now,
            self.faults.active_faults(),
            self.switch_states.interlock,
            &mut self.drive,
        );

        let timeout_stop = self.drive.update(now);

        let health_polled = now.saturating_sub(self.last_health_poll) >= self.status_interval;
        if health_polled {
            self.poll_health(now);
            self.last_health_poll = now;
        }

        self.watchdog.pet(now);
        self.last_tick = now;

        let elapsed_us = u32::try_from(started.elapsed().as_micros()).unwrap_or(u32::MAX);
        self.stats.record(elapsed_us, self.tick_budget_us);

        TickReport {
            mode: self.sm.mode(),
            transitioned,
            watchdog_fired,
            timeout_stop,
            health_polled,
        }
    }

    fn poll_health(&mut self, now: Millis) {
        match self.drive.motor_mut().read_faults() {
            Ok(words) => {
                self.motor_faults = words;
                self.faults.sync_from_motor_faults(words, now);
            }
            Err(e) => warn!(error = %e, "motor fault readback failed"),
        }
        match self.drive.motor_mut().read_status() {
            Ok(status) => self.motor_status = status,
            Err(MotorError::Unsupported) => {}
            Err(e) => warn!(error = %e, "motor status readback failed"),
        }
        if self.switch_states.debug {
            self.faults.log_active();
        }
    }

    // ─── Command Entry Points ───────────────────────────────────────

    /// Deliver a decoded wheel velocity message.
    pub fn submit_wheel_velocity_command(
        &mut self,
        cmd: &WheelVelocityCommand,
        now: Millis,
    ) -> CommandOutcome {
        self.interpreter.handle_wheel_velocity_command(
            cmd,
            now,
            &mut self.sm,
            &mut self.drive,
            &self.switches,
        )
    }

    /// Deliver a decoded robot command.
    pub fn submit_robot_command(&mut self, cmd: RobotCommand, now: Millis) -> CommandOutcome {
        self.interpreter
            .handle_robot_command(cmd, now, &mut self.sm, &mut self.drive, &mut self.restart)
    }

    /// Report the transport link state.
    ///
    /// Losing the link raises `COMM_TIMEOUT`, which degrades OPERATIONAL to
    /// STANDBY on the next tick. Regaining it clears the fault.
    pub fn set_link_state(&mut self, connected: bool, now: Millis) {
        if connected == self.link_up {
            return;
        }
        self.link_up = connected;
        if connected {
            info!("transport link restored");
            self.faults.clear_fault(FaultCode::COMM_TIMEOUT);
        } else {
            warn!("transport link lost");
            self.faults.register_fault(FaultCode::COMM_TIMEOUT, now);
        }
    }

    // ─── Telemetry ──────────────────────────────────────────────────

    /// Status record as of the last tick.
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::new(
            self.last_tick,
            self.sm.mode(),
            self.faults.active_faults().bits(),
            &self.motor_status,
            self.motor_faults,
            self.stats.last_tick_us,
            self.switch_states,
        )
    }

    #[inline]
    pub fn mode(&self) -> OperatingMode {
        self.sm.mode()
    }

    #[inline]
    pub fn has_recent_command(&self, now: Millis) -> bool {
        self.interpreter.has_recent_command(now)
    }

    #[inline]
    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }

    #[inline]
    pub fn faults(&self) -> &ErrorRegistry {
        &self.faults
    }

    /// Fault registry, for collaborators that report or clear faults.
    #[inline]
    pub fn faults_mut(&mut self) -> &mut ErrorRegistry {
        &mut self.faults
    }

    #[inline]
    pub fn watchdog(&self) -> &Watchdog {
        &self.watchdog
    }

    #[inline]
    pub fn drive(&self) -> &DriveArbiter<M> {
        &self.drive
    }

    /// Motor collaborator, for fault injection and inspection.
    ///
    /// Drive authority stays with the state machine: the arbiter itself is
    /// only reachable read-only.
    #[inline]
    pub fn motor_mut(&mut self) -> &mut M {
        self.drive.motor_mut()
    }

    #[inline]
    pub fn state_machine(&self) -> &ControlStateMachine {
        &self.sm
    }

    /// Explicit mode request from outside the command path, e.g. the
    /// EMERGENCY_STOP reset to INITIALIZING or leaving CALIBRATING.
    pub fn request_mode(&mut self, target: OperatingMode, now: Millis) -> bool {
        self.sm.transition(target, now, &mut self.drive).is_ok()
    }

    #[inline]
    pub fn switches_mut(&mut self) -> &mut S {
        &mut self.switches
    }

    #[inline]
    pub fn restart(&self) -> &R {
        &self.restart
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
