//! External command messages accepted by the control core.
//!
//! Two shapes arrive from the transport: a wheel velocity message
//! (four setpoints, optional acceleration, flag byte) and a single
//! robot command opcode. Both are decoded here from their raw integer
//! form; the wire encoding itself belongs to the transport.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::consts::WHEEL_COUNT;

bitflags! {
    /// Flags carried in a wheel velocity message.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CommandFlags: u8 {
        /// Hard stop; the rest of the message is discarded.
        const EMERGENCY_STOP = 0x01;
        /// Zero all wheel encoders.
        const RESET_ENCODERS = 0x02;
        /// Enter IMU calibration.
        const CALIBRATE_IMU  = 0x04;
        /// Request the move from STANDBY to OPERATIONAL.
        const ENABLE_DRIVE   = 0x08;
    }
}

impl Default for CommandFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Index of each field in the raw six-element velocity array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum RawVelocityIndex {
    FrontLeft = 0,
    RearLeft = 1,
    FrontRight = 2,
    RearRight = 3,
    Acceleration = 4,
    Flags = 5,
}

/// Length of the raw velocity array.
pub const RAW_VELOCITY_LEN: usize = 6;

/// Per-wheel velocity setpoints [encoder ticks/s].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WheelVelocities {
    pub front_left: i32,
    pub rear_left: i32,
    pub front_right: i32,
    pub rear_right: i32,
}

impl WheelVelocities {
    /// All wheels stopped.
    pub const ZERO: Self = Self::splat(0);

    /// Same setpoint on every wheel.
    pub const fn splat(v: i32) -> Self {
        Self {
            front_left: v,
            rear_left: v,
            front_right: v,
            rear_right: v,
        }
    }

    /// Setpoints in FL, RL, FR, RR order.
    #[inline]
    pub const fn to_array(self) -> [i32; WHEEL_COUNT] {
        [self.front_left, self.rear_left, self.front_right, self.rear_right]
    }

    /// Build from FL, RL, FR, RR order.
    #[inline]
    pub const fn from_array(v: [i32; WHEEL_COUNT]) -> Self {
        Self {
            front_left: v[0],
            rear_left: v[1],
            front_right: v[2],
            rear_right: v[3],
        }
    }

    /// Clamp every wheel to `[-ceiling, ceiling]`.
    #[inline]
    pub fn clamped(self, ceiling: i32) -> Self {
        let c = ceiling.abs();
        Self::from_array(self.to_array().map(|v| v.clamp(-c, c)))
    }

    /// True when every setpoint is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.front_left == 0 && self.rear_left == 0 && self.front_right == 0 && self.rear_right == 0
    }
}

/// Decoded wheel velocity message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WheelVelocityCommand {
    /// Requested setpoints.
    pub velocities: WheelVelocities,
    /// Acceleration limit; `0` selects the controller default path.
    pub acceleration: u32,
    /// Control flags.
    pub flags: CommandFlags,
}

impl WheelVelocityCommand {
    /// Plain motion command without flags.
    pub const fn drive(velocities: WheelVelocities) -> Self {
        Self {
            velocities,
            acceleration: 0,
            flags: CommandFlags::empty(),
        }
    }

    /// Decode the raw transport array `[FL, RL, FR, RR, accel, flags]`.
    ///
    /// A negative acceleration is treated as "no limit". Flag bits outside
    /// the defined set are dropped.
    pub fn from_raw(raw: [i32; RAW_VELOCITY_LEN]) -> Self {
        let velocities = WheelVelocities {
            front_left: raw[RawVelocityIndex::FrontLeft as usize],
            rear_left: raw[RawVelocityIndex::RearLeft as usize],
            front_right: raw[RawVelocityIndex::FrontRight as usize],
            rear_right: raw[RawVelocityIndex::RearRight as usize],
        };
        let acceleration = u32::try_from(raw[RawVelocityIndex::Acceleration as usize]).unwrap_or(0);
        let flags = CommandFlags::from_bits_truncate(
            (raw[RawVelocityIndex::Flags as usize] & 0xFF) as u8,
        );
        Self {
            velocities,
            acceleration,
            flags,
        }
    }
}

/// Single-opcode robot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RobotCommand {
    /// Stop and latch EMERGENCY_STOP.
    Stop,
    /// Clear a drive fault. Accepted but handled by the fault registry owner.
    ResetDriveFault,
    /// Zero all wheel encoders.
    ResetEncoder,
    /// Enter IMU calibration.
    ImuCalibration,
    /// Hardware restart. Does not return on real hardware.
    Reboot,
    /// Opcode outside the known set, kept for diagnostics.
    Unknown(u32),
}

impl RobotCommand {
    pub const OPCODE_STOP: u32 = 0;
    pub const OPCODE_RESET_DRIVE_FAULT: u32 = 1;
    pub const OPCODE_RESET_ENCODER: u32 = 10;
    pub const OPCODE_IMU_CALIBRATION: u32 = 11;
    pub const OPCODE_REBOOT: u32 = 666;

    /// Decode a raw opcode.
    pub const fn from_u32(opcode: u32) -> Self {
        match opcode {
            Self::OPCODE_STOP => Self::Stop,
            Self::OPCODE_RESET_DRIVE_FAULT => Self::ResetDriveFault,
            Self::OPCODE_RESET_ENCODER => Self::ResetEncoder,
            Self::OPCODE_IMU_CALIBRATION => Self::ImuCalibration,
            Self::OPCODE_REBOOT => Self::Reboot,
            other => Self::Unknown(other),
        }
    }

    /// Raw opcode.
    pub const fn opcode(self) -> u32 {
        match self {
            Self::Stop => Self::OPCODE_STOP,
            Self::ResetDriveFault => Self::OPCODE_RESET_DRIVE_FAULT,
            Self::ResetEncoder => Self::OPCODE_RESET_ENCODER,
            Self::ImuCalibration => Self::OPCODE_IMU_CALIBRATION,
            Self::Reboot => Self::OPCODE_REBOOT,
            Self::Unknown(op) => op,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
