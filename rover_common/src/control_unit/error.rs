//! Fault code bitflags and the fault history record.
//!
//! Fault codes are OR-composable 32-bit flags grouped by category:
//! system (`0x0000_000F`), motor controller (`0x0000_FF00`) and
//! sensor (`0x000F_0000`). The top nibble is reserved for critical
//! severity bits; see [`FaultCode::CRITICAL_MASK`].

use bitflags::bitflags;

use crate::consts::Millis;

bitflags! {
    /// Active fault bitfield.
    ///
    /// Undefined bits are retained so that codes reported by external
    /// collaborators survive a round trip through the registry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FaultCode: u32 {
        /// Hardware initialization failed at startup.
        const INIT_FAILURE        = 0x0000_0001;
        /// Upstream controller stopped talking to us.
        const COMM_TIMEOUT        = 0x0000_0002;
        /// Control loop was not serviced within the watchdog window.
        const WATCHDOG            = 0x0000_0004;
        /// Motor controller reports its e-stop input active.
        const MOTOR_ESTOP         = 0x0000_0100;
        /// Motor controller over-temperature.
        const MOTOR_TEMPERATURE   = 0x0000_0200;
        /// Main battery over-voltage.
        const MOTOR_OVER_VOLTAGE  = 0x0000_0400;
        /// Logic battery under-voltage.
        const MOTOR_UNDER_VOLTAGE = 0x0000_0800;
        /// Motor driver stage fault.
        const MOTOR_DRIVER_FAULT  = 0x0000_1000;
        /// IMU bus communication failure.
        const SENSOR_COMM_FAILURE = 0x0001_0000;
        /// IMU calibration fault.
        const SENSOR_CALIBRATION  = 0x0002_0000;

        const _ = !0;
    }
}

impl FaultCode {
    /// Bits that force ERROR handling in the state machine.
    ///
    /// No currently defined fault lies inside this mask, so the critical
    /// path only fires for externally supplied severity bits.
    pub const CRITICAL_MASK: Self = Self::from_bits_retain(0xF000_0000);

    /// Bits derived from the motor controller fault words. Recomputed on
    /// every health poll.
    pub const MOTOR_MASK: Self = Self::from_bits_retain(
        Self::MOTOR_ESTOP.bits()
            | Self::MOTOR_TEMPERATURE.bits()
            | Self::MOTOR_OVER_VOLTAGE.bits()
            | Self::MOTOR_UNDER_VOLTAGE.bits()
            | Self::MOTOR_DRIVER_FAULT.bits(),
    );

    /// Returns true if any critical bit is set.
    #[inline]
    pub const fn has_critical(&self) -> bool {
        self.intersects(Self::CRITICAL_MASK)
    }

    /// Human-readable description of a single defined fault.
    ///
    /// Returns `None` for composite or undefined codes.
    pub fn label(self) -> Option<&'static str> {
        FAULT_LABELS
            .iter()
            .find(|(code, _)| *code == self)
            .map(|(_, label)| *label)
    }
}

/// Defined faults with their descriptions, in bit order.
pub const FAULT_LABELS: [(FaultCode, &str); 10] = [
    (FaultCode::INIT_FAILURE, "system initialization failure"),
    (FaultCode::COMM_TIMEOUT, "communication timeout"),
    (FaultCode::WATCHDOG, "watchdog timeout"),
    (FaultCode::MOTOR_ESTOP, "emergency stop active"),
    (FaultCode::MOTOR_TEMPERATURE, "controller temperature high"),
    (FaultCode::MOTOR_OVER_VOLTAGE, "battery voltage high"),
    (FaultCode::MOTOR_UNDER_VOLTAGE, "battery voltage low"),
    (FaultCode::MOTOR_DRIVER_FAULT, "motor driver fault"),
    (FaultCode::SENSOR_COMM_FAILURE, "IMU communication failure"),
    (FaultCode::SENSOR_CALIBRATION, "IMU calibration error"),
];

impl Default for FaultCode {
    fn default() -> Self {
        Self::empty()
    }
}

/// One slot of the fault history table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaultRecord {
    /// The code this record tracks (may be composite).
    pub code: FaultCode,
    /// Number of registrations since the record was created.
    pub count: u32,
    /// Timestamp of the most recent registration.
    pub last_occurrence: Millis,
    /// Whether the fault is currently active.
    pub active: bool,
}

impl FaultRecord {
    /// Fresh record for a first registration at `now`.
    pub const fn first(code: FaultCode, now: Millis) -> Self {
        Self {
            code,
            count: 1,
            last_occurrence: now,
            active: true,
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_mask_does_not_overlap_defined_faults() {
        assert!(!FaultCode::all().difference(FaultCode::CRITICAL_MASK).has_critical());
        let defined = FaultCode::INIT_FAILURE
            | FaultCode::COMM_TIMEOUT
            | FaultCode::WATCHDOG
            | FaultCode::MOTOR_MASK
            | FaultCode::SENSOR_COMM_FAILURE
            | FaultCode::SENSOR_CALIBRATION;
        assert!(!defined.has_critical());
    }

    #[test]
    fn undefined_bits_are_retained() {
        let code = FaultCode::from_bits_retain(0x1000_0000);
        assert!(code.has_critical());
        assert_eq!(code.bits(), 0x1000_0000);
    }

    #[test]
    fn labels_only_for_single_defined_flags() {
        assert_eq!(FaultCode::WATCHDOG.label(), Some("watchdog timeout"));
        assert_eq!((FaultCode::WATCHDOG | FaultCode::COMM_TIMEOUT).label(), None);
        assert_eq!(FaultCode::from_bits_retain(0x8000_0000).label(), None);
    }

    #[test]
    fn motor_mask_covers_the_five_controller_faults() {
        assert_eq!(FaultCode::MOTOR_MASK.bits(), 0x0000_1F00);
    }

    #[test]
    fn first_record_is_active_with_count_one() {
        let rec = FaultRecord::first(FaultCode::WATCHDOG, 42);
        assert_eq!(rec.count, 1);
        assert_eq!(rec.last_occurrence, 42);
        assert!(rec.active);
    }
}
