//! Safety interlock predicates.
//!
//! Every actuator transition is gated by one of these. They are hard
//! invariants: manufacturer-mandated minimum on/off times and the rule
//! that the reversing valve must never move under compressor load.

use crate::domain::unit::{Mode, Unit};

/// Compressor minimum OFF time before it may turn on again (~8 min).
pub const MIN_OFF_TICKS: u64 = 96;
/// Compressor minimum ON time before it may turn off again (~7 min).
pub const MIN_ON_TICKS: u64 = 84;
/// Inrush stagger: the other unit's compressor must have been ON for
/// more than this many ticks before a second compressor may start.
pub const STAGGER_TICKS: u64 = 6;
/// Valve may not move until the compressor has been off for more than
/// this many ticks.
pub const VALVE_SETTLE_TICKS: u64 = 1;

pub const COMP_ON_MAX_TCOMP: f32 = 59.0;
pub const OHP_TRIP_TCOMP: f32 = 63.0;

/// Whether `unit`'s compressor may be turned on this tick.
///
/// `enabled` is the unit's config-level `use_ac1`/`use_ac2` flag.
/// `other_comp_on` / `other_comp_on_ticks` describe the sibling unit's
/// compressor state for the inrush stagger rule. `battery_mode` forces
/// the compressor off-only path (command register = 3).
pub fn can_comp_on(
    unit: &Unit,
    enabled: bool,
    tcomp: f32,
    other_comp_on: bool,
    other_comp_on_ticks: u64,
    battery_mode: bool,
) -> bool {
    if !enabled {
        return false;
    }
    if battery_mode {
        return false;
    }
    if unit.actuators.compressor {
        return false;
    }
    if tcomp > COMP_ON_MAX_TCOMP {
        return false;
    }
    let off_long_enough = unit.mode == Mode::Defrost || unit.cycles.compressor >= MIN_OFF_TICKS;
    if !off_long_enough {
        return false;
    }
    !other_comp_on || other_comp_on_ticks > STAGGER_TICKS
}

/// Whether `unit`'s compressor may be turned off this tick.
pub fn can_comp_off(unit: &Unit, battery_mode: bool) -> bool {
    if !unit.actuators.compressor {
        return false;
    }
    if unit.mode == Mode::Defrost || unit.mode == Mode::Ohp || battery_mode {
        return true;
    }
    unit.cycles.compressor >= MIN_ON_TICKS
}

/// Whether the four-way valve may be turned on.
pub fn can_valve_on(unit: &Unit) -> bool {
    !unit.actuators.compressor && unit.cycles.compressor > VALVE_SETTLE_TICKS
}

/// Whether the four-way valve may be turned off.
pub fn can_valve_off(unit: &Unit) -> bool {
    !unit.actuators.compressor && unit.cycles.compressor > VALVE_SETTLE_TICKS
}

/// The fan has no timing interlock.
pub fn can_fan_on(_unit: &Unit) -> bool {
    true
}

pub fn can_fan_off(_unit: &Unit) -> bool {
    true
}
