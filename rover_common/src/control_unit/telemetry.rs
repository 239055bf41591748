//! Telemetry snapshot produced by the control core.
//!
//! Periodic status record read by the transport / status publisher.
//! The wire encoding is owned by the transport; this is only the content.

use serde::{Deserialize, Serialize};

use crate::consts::{Millis, WHEEL_COUNT};
use crate::hal::types::{MotorFaultWords, MotorStatus, SwitchStates};

use super::state::OperatingMode;

/// One status record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Time the snapshot was taken [ms].
    pub timestamp: Millis,
    /// Current operating mode as its integer value.
    pub mode: u8,
    /// Active fault bitfield.
    pub active_faults: u32,
    /// Encoder positions, FL/RL/FR/RR [ticks].
    pub encoders: [i32; WHEEL_COUNT],
    /// Wheel speeds, FL/RL/FR/RR [ticks/s].
    pub speeds: [i32; WHEEL_COUNT],
    /// Motor currents, FL/RL/FR/RR [10 mA].
    pub currents: [i16; WHEEL_COUNT],
    /// Left/right controller voltage [0.1 V].
    pub voltages: [u16; 2],
    /// Left/right controller temperature [0.1 °C].
    pub temperatures: [u16; 2],
    /// Raw left/right controller fault words.
    pub motor_faults: MotorFaultWords,
    /// Duration of the last control tick [µs].
    pub loop_time_us: u32,
    /// Switch byte: bit0 = debug, bit1 = interlock.
    pub switches: u8,
}

impl TelemetrySnapshot {
    /// Assemble a snapshot from its parts.
    pub fn new(
        timestamp: Millis,
        mode: OperatingMode,
        active_faults: u32,
        status: &MotorStatus,
        motor_faults: MotorFaultWords,
        loop_time_us: u32,
        switches: SwitchStates,
    ) -> Self {
        Self {
            timestamp,
            mode: mode.as_u8(),
            active_faults,
            encoders: status.encoders,
            speeds: status.speeds,
            currents: status.currents,
            voltages: status.voltages,
            temperatures: status.temperatures,
            motor_faults,
            loop_time_us,
            switches: switches.packed(),
        }
    }

    /// Decoded operating mode, if the stored value is valid.
    #[inline]
    pub const fn operating_mode(&self) -> Option<OperatingMode> {
        OperatingMode::from_u8(self.mode)
    }
}
