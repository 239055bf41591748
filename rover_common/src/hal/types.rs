//! Motor controller and switch panel data types.
//!
//! - `MotorFaultWords` - raw left/right controller fault words
//! - `RawMotorFault` - bit layout of a single fault word
//! - `MotorStatus` - per-wheel feedback and controller health
//! - `SwitchStates` - debug / interlock switch pair

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::consts::WHEEL_COUNT;

bitflags! {
    /// Bit layout of one motor controller's raw fault word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RawMotorFault: u32 {
        /// E-stop input asserted.
        const ESTOP              = 0x01;
        /// Temperature sensor 1 over limit.
        const TEMPERATURE        = 0x02;
        /// Temperature sensor 2 over limit.
        const TEMPERATURE_2      = 0x04;
        /// Main battery over-voltage.
        const MAIN_BATTERY_HIGH  = 0x08;
        /// Logic battery under-voltage.
        const LOGIC_BATTERY_LOW  = 0x20;
        /// Driver stage fault, channel 1.
        const DRIVER_FAULT_M1    = 0x40;
        /// Driver stage fault, channel 2.
        const DRIVER_FAULT_M2    = 0x80;

        const _ = !0;
    }
}

/// Raw fault words of the left and right motor controllers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorFaultWords {
    pub left: u32,
    pub right: u32,
}

impl MotorFaultWords {
    /// Union of both controllers' fault bits.
    #[inline]
    pub const fn combined(&self) -> RawMotorFault {
        RawMotorFault::from_bits_retain(self.left | self.right)
    }
}

/// Feedback read back from the motor controllers for telemetry.
///
/// Wheel arrays are in FL, RL, FR, RR order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorStatus {
    /// Encoder positions [ticks].
    pub encoders: [i32; WHEEL_COUNT],
    /// Measured wheel speeds [ticks/s].
    pub speeds: [i32; WHEEL_COUNT],
    /// Motor currents [10 mA].
    pub currents: [i16; WHEEL_COUNT],
    /// Main battery voltage seen by the left/right controller [0.1 V].
    pub voltages: [u16; 2],
    /// Left/right controller temperature [0.1 °C].
    pub temperatures: [u16; 2],
}

/// Physical switch panel state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchStates {
    /// Debug switch: halves the speed ceiling.
    pub debug: bool,
    /// Interlock switch: blocks OPERATIONAL, acknowledges ERROR.
    pub interlock: bool,
}

impl SwitchStates {
    /// Pack into one byte: bit0 = debug, bit1 = interlock.
    #[inline]
    pub const fn packed(&self) -> u8 {
        (self.debug as u8) | ((self.interlock as u8) << 1)
    }
}
