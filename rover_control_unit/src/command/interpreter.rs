//! External command interpreter.
//!
//! Turns decoded transport messages into state machine and drive calls.
//! Every message, whatever its content, refreshes the command liveness
//! record used by "controller connected" diagnostics. That record is
//! independent of the drive arbiter's own freshness window.
//!
//! Wheel velocity flags are handled in a fixed order:
//!
//! 1. `EMERGENCY_STOP` - transition to EMERGENCY_STOP, rest of message dropped
//! 2. `RESET_ENCODERS` - reset encoders, processing continues
//! 3. `CALIBRATE_IMU` - transition to CALIBRATING, rest of message dropped
//! 4. `ENABLE_DRIVE` - in STANDBY with the interlock open, latch the
//!    operational request (the state machine performs the transition)
//! 5. velocities - forwarded only in OPERATIONAL, otherwise dropped

use rover_common::consts::{COMMAND_TIMEOUT_MS, Millis};
use rover_common::control_unit::command::{CommandFlags, RobotCommand, WheelVelocityCommand};
use rover_common::control_unit::state::OperatingMode;
use rover_common::hal::driver::{MotorController, Switches, SystemRestart};
use tracing::{debug, warn};

use crate::drive::{DriveArbiter, DriveError};
use crate::state::{ControlStateMachine, TransitionResult};

/// What a command ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A mode transition was requested.
    Transition(TransitionResult),
    /// Velocities were handed to the drive arbiter.
    Drive(Result<(), DriveError>),
    /// Velocities were dropped because the mode is not OPERATIONAL.
    Dropped,
    /// Encoder reset requested by opcode.
    EncoderReset(Result<(), DriveError>),
    /// Hardware restart was requested.
    Restart,
    /// Accepted with no action (reserved or unknown opcode).
    Ignored,
}

/// Decodes and dispatches external commands; tracks command liveness.
#[derive(Debug, Clone)]
pub struct CommandInterpreter {
    last_command: Millis,
    valid: bool,
    recent_window: Millis,
}

impl CommandInterpreter {
    pub const fn new(recent_window: Millis) -> Self {
        Self {
            last_command: 0,
            valid: false,
            recent_window,
        }
    }

    /// Start liveness tracking at `now` with no command seen yet.
    pub fn initialize(&mut self, now: Millis) {
        self.last_command = now;
        self.valid = false;
    }

    /// Dispatch a wheel velocity message.
    pub fn handle_wheel_velocity_command<M, S>(
        &mut self,
        cmd: &WheelVelocityCommand,
        now: Millis,
        sm: &mut ControlStateMachine,
        drive: &mut DriveArbiter<M>,
        switches: &S,
    ) -> CommandOutcome
    where
        M: MotorController,
        S: Switches,
    {
        self.touch(now);
        let flags = cmd.flags;
        if !flags.is_empty() {
            debug!(flags = ?flags, "command flags received");
        }

        if flags.contains(CommandFlags::EMERGENCY_STOP) {
            return CommandOutcome::Transition(sm.transition(
                OperatingMode::EmergencyStop,
                now,
                drive,
            ));
        }

        if flags.contains(CommandFlags::RESET_ENCODERS) {
            if let Err(e) = drive.reset_encoders() {
                warn!(error = %e, "encoder reset failed");
            }
        }

        if flags.contains(CommandFlags::CALIBRATE_IMU) {
            return CommandOutcome::Transition(sm.transition(
                OperatingMode::Calibrating,
                now,
                drive,
            ));
        }

        if flags.contains(CommandFlags::ENABLE_DRIVE) && sm.mode() == OperatingMode::Standby {
            if switches.is_interlock_active() {
                debug!("enable drive blocked by interlock");
            } else {
                debug!("enable drive requested");
                sm.set_operational_requested(true);
            }
        }

        if sm.mode() != OperatingMode::Operational {
            return CommandOutcome::Dropped;
        }

        let result = if cmd.acceleration > 0 {
            drive.set_velocities_with_accel(cmd.velocities, cmd.acceleration, now)
        } else {
            drive.set_velocities(cmd.velocities, now)
        };
        if let Err(e) = &result {
            debug!(error = %e, "velocity command not applied");
        }
        CommandOutcome::Drive(result)
    }

    /// Dispatch a single-opcode robot command.
    pub fn handle_robot_command<M, R>(
        &mut self,
        cmd: RobotCommand,
        now: Millis,
        sm: &mut ControlStateMachine,
        drive: &mut DriveArbiter<M>,
        restart: &mut R,
    ) -> CommandOutcome
    where
        M: MotorController,
        R: SystemRestart,
    {
        self.touch(now);
        debug!(opcode = cmd.opcode(), "robot command received");

        match cmd {
            RobotCommand::Stop => {
                CommandOutcome::Transition(sm.transition(OperatingMode::EmergencyStop, now, drive))
            }
            // Fault-specific clearing belongs to the error registry owner.
            RobotCommand::ResetDriveFault => CommandOutcome::Ignored,
            RobotCommand::ResetEncoder => CommandOutcome::EncoderReset(drive.reset_encoders()),
            RobotCommand::ImuCalibration => {
                CommandOutcome::Transition(sm.transition(OperatingMode::Calibrating, now, drive))
            }
            RobotCommand::Reboot => {
                warn!("restart requested");
                restart.restart();
                CommandOutcome::Restart
            }
            RobotCommand::Unknown(opcode) => {
                warn!(opcode, "unknown robot command");
                CommandOutcome::Ignored
            }
        }
    }

    // ─── Liveness ───────────────────────────────────────────────────

    /// True if a command arrived less than the recent window ago.
    #[inline]
    pub fn has_recent_command(&self, now: Millis) -> bool {
        self.valid && self.time_since_last_command(now) < self.recent_window
    }

    /// Milliseconds since the last command (or since `initialize`).
    #[inline]
    pub fn time_since_last_command(&self, now: Millis) -> Millis {
        now.saturating_sub(self.last_command)
    }

    #[inline]
    fn touch(&mut self, now: Millis) {
        self.last_command = now;
        self.valid = true;
    }
}

impl Default for CommandInterpreter {
    fn default() -> Self {
        Self::new(COMMAND_TIMEOUT_MS)
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
