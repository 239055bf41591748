//! Operating mode of the rover control core.
//!
//! `#[repr(u8)]` so the mode can be published as a plain integer in
//! telemetry. Exactly one mode is current at any time; the control state
//! machine owns it.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Top-level operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OperatingMode {
    /// Boot settle period; hardware is being brought up.
    Initializing = 0,
    /// Sensor calibration in progress. Exit is driven externally.
    Calibrating = 1,
    /// Ready, drive disabled.
    Standby = 2,
    /// Drive enabled, motion commands forwarded to the motors.
    Operational = 3,
    /// Fault present, drive disabled. Left via the interlock acknowledge.
    Error = 4,
    /// Motors hard-stopped. Left only via an explicit reset to INITIALIZING.
    EmergencyStop = 5,
}

impl OperatingMode {
    /// All modes in discriminant order.
    pub const ALL: [Self; 6] = [
        Self::Initializing,
        Self::Calibrating,
        Self::Standby,
        Self::Operational,
        Self::Error,
        Self::EmergencyStop,
    ];

    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Initializing),
            1 => Some(Self::Calibrating),
            2 => Some(Self::Standby),
            3 => Some(Self::Operational),
            4 => Some(Self::Error),
            5 => Some(Self::EmergencyStop),
            _ => None,
        }
    }

    /// Raw telemetry value.
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Upper-case mode name as shown in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Initializing => "INITIALIZING",
            Self::Calibrating => "CALIBRATING",
            Self::Standby => "STANDBY",
            Self::Operational => "OPERATIONAL",
            Self::Error => "ERROR",
            Self::EmergencyStop => "EMERGENCY_STOP",
        }
    }

    /// Whether the transition table contains the edge `self -> target`.
    pub const fn allows(self, target: Self) -> bool {
        use OperatingMode::*;
        matches!(
            (self, target),
            (Initializing, Standby)
                | (Initializing, Error)
                | (Calibrating, Standby)
                | (Calibrating, Error)
                | (Standby, Operational)
                | (Standby, Calibrating)
                | (Standby, Error)
                | (Standby, EmergencyStop)
                | (Operational, Standby)
                | (Operational, Error)
                | (Operational, EmergencyStop)
                | (Error, Standby)
                | (Error, EmergencyStop)
                | (EmergencyStop, Initializing)
        )
    }
}

impl Default for OperatingMode {
    fn default() -> Self {
        Self::Initializing
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
