//! Error registry: active fault bitfield plus a bounded fault history.
//!
//! The history holds at most [`MAX_FAULT_RECORDS`] records keyed by code.
//! A repeated registration updates the existing record in place. When the
//! table is full, a new code replaces the record with the oldest
//! `last_occurrence`; on a tie the lowest slot is replaced.
//!
//! Records are never removed other than by that eviction. Clearing a fault
//! only drops its `active` flag so the history survives.

use heapless::Vec;
use rover_common::consts::{MAX_FAULT_RECORDS, Millis};
use rover_common::control_unit::error::{FAULT_LABELS, FaultCode, FaultRecord};
use rover_common::hal::types::{MotorFaultWords, RawMotorFault};
use tracing::{debug, info};

/// Motor controller raw bits and the fault code each one raises.
const MOTOR_FAULT_MAP: [(RawMotorFault, FaultCode); 5] = [
    (RawMotorFault::ESTOP, FaultCode::MOTOR_ESTOP),
    (
        RawMotorFault::TEMPERATURE.union(RawMotorFault::TEMPERATURE_2),
        FaultCode::MOTOR_TEMPERATURE,
    ),
    (RawMotorFault::MAIN_BATTERY_HIGH, FaultCode::MOTOR_OVER_VOLTAGE),
    (RawMotorFault::LOGIC_BATTERY_LOW, FaultCode::MOTOR_UNDER_VOLTAGE),
    (
        RawMotorFault::DRIVER_FAULT_M1.union(RawMotorFault::DRIVER_FAULT_M2),
        FaultCode::MOTOR_DRIVER_FAULT,
    ),
];

/// Active faults and their occurrence history.
#[derive(Debug, Clone, Default)]
pub struct ErrorRegistry {
    active: FaultCode,
    records: Vec<FaultRecord, MAX_FAULT_RECORDS>,
}

impl ErrorRegistry {
    /// Empty registry: no active faults, no history.
    pub const fn new() -> Self {
        Self {
            active: FaultCode::empty(),
            records: Vec::new(),
        }
    }

    // ─── Mutation ───────────────────────────────────────────────────

    /// Mark `code` active and record the occurrence at `now`.
    ///
    /// May evict the least recently seen record of an unrelated code.
    /// An empty code is ignored.
    pub fn register_fault(&mut self, code: FaultCode, now: Millis) {
        if code.is_empty() {
            return;
        }
        self.active |= code;
        debug!(code = ?code, "fault registered");

        if let Some(rec) = self.records.iter_mut().find(|r| r.code == code) {
            rec.count = rec.count.saturating_add(1);
            rec.last_occurrence = now;
            rec.active = true;
            return;
        }

        let fresh = FaultRecord::first(code, now);
        if self.records.push(fresh).is_err() {
            let slot = self.oldest_slot();
            debug!(
                evicted = ?self.records[slot].code,
                "fault history full, evicting oldest record"
            );
            self.records[slot] = fresh;
        }
    }

    /// Drop `code` from the active set. The record stays, inactive.
    pub fn clear_fault(&mut self, code: FaultCode) {
        self.active.remove(code);
        if let Some(rec) = self.records.iter_mut().find(|r| r.code == code) {
            rec.active = false;
        }
        debug!(code = ?code, "fault cleared");
    }

    /// Keep only bits inside [`FaultCode::CRITICAL_MASK`] active.
    pub fn reset_non_critical(&mut self) {
        self.active &= FaultCode::CRITICAL_MASK;
        for rec in self.records.iter_mut().filter(|r| !r.code.has_critical()) {
            rec.active = false;
        }
        debug!(remaining = ?self.active, "non-critical faults reset");
    }

    /// Recompute the motor-derived bits from the two controllers' raw fault
    /// words.
    ///
    /// Motor bits are cleared first, so a condition that went away is no
    /// longer active and a persistent one is not double counted in the
    /// bitfield. Each present condition is registered again, which bumps
    /// its record.
    pub fn sync_from_motor_faults(&mut self, words: MotorFaultWords, now: Millis) {
        self.active.remove(FaultCode::MOTOR_MASK);

        let raw = words.combined();
        for (bits, code) in MOTOR_FAULT_MAP {
            if raw.intersects(bits) {
                self.register_fault(code, now);
            }
        }
    }

    // ─── Queries ────────────────────────────────────────────────────

    /// True if any bit of `code` is active.
    #[inline]
    pub const fn has_fault(&self, code: FaultCode) -> bool {
        self.active.intersects(code)
    }

    /// Current active bitfield.
    #[inline]
    pub const fn active_faults(&self) -> FaultCode {
        self.active
    }

    /// True if no fault is active.
    #[inline]
    pub const fn is_clear(&self) -> bool {
        self.active.is_empty()
    }

    /// History record for exactly `code`, if one exists.
    pub fn record(&self, code: FaultCode) -> Option<FaultRecord> {
        self.records.iter().find(|r| r.code == code).copied()
    }

    /// Occupied history slots in slot order.
    pub fn records(&self) -> impl Iterator<Item = &FaultRecord> {
        self.records.iter()
    }

    /// Log a summary of the active faults with their descriptions.
    pub fn log_active(&self) {
        if self.active.is_empty() {
            return;
        }
        info!(active = ?self.active, "active faults");
        for (code, label) in FAULT_LABELS {
            if self.active.contains(code) {
                info!("  - {label}");
            }
        }
    }

    /// Slot with the smallest `last_occurrence`, first slot on ties.
    fn oldest_slot(&self) -> usize {
        let mut oldest = 0;
        for (i, rec) in self.records.iter().enumerate() {
            if rec.last_occurrence < self.records[oldest].last_occurrence {
                oldest = i;
            }
        }
        oldest
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
