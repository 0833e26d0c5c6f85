//! Concrete per-unit mode states: the transition table from the
//! component design, plus the DEFROST banded schedule and the fan
//! policy that applies once a tick's mode is settled.

use super::context::FsmContext;
use super::{StateDescriptor, StateUpdateFn};
use crate::domain::interlock::OHP_TRIP_TCOMP;
use crate::domain::unit::{ActuatorState, Mode};

const COMP_COOLING_ENTER_TCOMP: f32 = 56.0;
const STARTING_TO_FIN_STACK_TICKS: u64 = 24;
const COMP_COOLING_MIN_TICKS: u64 = 10;
const FIN_STACK_MIN_TICKS: u64 = 10;
const DEFROST_TRIP_SHORT_TICKS: u64 = 159;
const DEFROST_TRIP_SHORT_TCOND: f32 = -6.0;
const DEFROST_TRIP_LONG_TICKS: u64 = 359;
const DEFROST_TRIP_LONG_TCOND: f32 = -3.0;
const DEFROST_DURATION_TICKS: u64 = 82;
const OHP_RECOVERY_TICKS: u64 = 24;

fn off_update(ctx: &FsmContext) -> Option<Mode> {
    if ctx.arbiter_wants_on && ctx.can_comp_on && ctx.valve_on {
        Some(Mode::Starting)
    } else {
        None
    }
}

fn starting_update(ctx: &FsmContext) -> Option<Mode> {
    if ctx.tcomp > OHP_TRIP_TCOMP {
        return Some(Mode::Ohp);
    }
    if !ctx.arbiter_wants_on && ctx.can_comp_off {
        return Some(Mode::Off);
    }
    if ctx.tcomp > COMP_COOLING_ENTER_TCOMP {
        return Some(Mode::CompCooling);
    }
    if ctx.ticks_in_mode > STARTING_TO_FIN_STACK_TICKS {
        return Some(Mode::FinStackHeating);
    }
    None
}

fn comp_cooling_update(ctx: &FsmContext) -> Option<Mode> {
    if ctx.tcomp > OHP_TRIP_TCOMP {
        return Some(Mode::Ohp);
    }
    if !ctx.arbiter_wants_on && ctx.can_comp_off {
        return Some(Mode::Off);
    }
    if ctx.tcomp < COMP_COOLING_ENTER_TCOMP && ctx.ticks_in_mode > COMP_COOLING_MIN_TICKS {
        return Some(Mode::FinStackHeating);
    }
    None
}

fn fin_stack_heating_update(ctx: &FsmContext) -> Option<Mode> {
    if ctx.tcomp > OHP_TRIP_TCOMP {
        return Some(Mode::Ohp);
    }
    if !ctx.arbiter_wants_on && ctx.can_comp_off {
        return Some(Mode::Off);
    }
    if ctx.tcomp > COMP_COOLING_ENTER_TCOMP && ctx.ticks_in_mode > FIN_STACK_MIN_TICKS {
        return Some(Mode::CompCooling);
    }
    if ctx.ticks_in_mode > DEFROST_TRIP_SHORT_TICKS && ctx.tcond < DEFROST_TRIP_SHORT_TCOND {
        return Some(Mode::Defrost);
    }
    if ctx.ticks_in_mode > DEFROST_TRIP_LONG_TICKS && ctx.tcond < DEFROST_TRIP_LONG_TCOND {
        return Some(Mode::Defrost);
    }
    None
}

fn defrost_update(ctx: &FsmContext) -> Option<Mode> {
    if ctx.tcomp > OHP_TRIP_TCOMP {
        return Some(Mode::Ohp);
    }
    if ctx.ticks_in_mode >= DEFROST_DURATION_TICKS {
        Some(Mode::Starting)
    } else {
        None
    }
}

fn ohp_update(ctx: &FsmContext) -> Option<Mode> {
    if ctx.ticks_in_mode > OHP_RECOVERY_TICKS {
        Some(Mode::Off)
    } else {
        None
    }
}

/// Build the table indexed by `Mode as usize`.
pub fn build_state_table() -> [StateDescriptor; Mode::COUNT] {
    let mut table = [StateDescriptor {
        on_enter: None,
        on_exit: None,
        on_update: off_update as StateUpdateFn,
    }; Mode::COUNT];

    table[Mode::Off as usize].on_update = off_update;
    table[Mode::Starting as usize].on_update = starting_update;
    table[Mode::CompCooling as usize].on_update = comp_cooling_update;
    table[Mode::FinStackHeating as usize].on_update = fin_stack_heating_update;
    table[Mode::Defrost as usize].on_update = defrost_update;
    table[Mode::Ohp as usize].on_update = ohp_update;
    table
}

/// The DEFROST schedule: valve/compressor/fan bands keyed by ticks since
/// DEFROST was entered.
pub fn defrost_schedule(ticks_in_mode: u64) -> ActuatorState {
    match ticks_in_mode {
        0..=8 => ActuatorState {
            valve: true,
            compressor: false,
            fan: false,
        },
        9..=17 => ActuatorState::all_off(),
        18..=57 => ActuatorState {
            valve: false,
            compressor: true,
            fan: false,
        },
        58..=69 => ActuatorState::all_off(),
        70..=81 => ActuatorState {
            valve: true,
            compressor: false,
            fan: false,
        },
        _ => ActuatorState::all_off(),
    }
}

/// Fan policy for non-DEFROST modes: `Some(true/false)` overrides the
/// arbiter's fan desire; `None` means DEFROST's banded schedule applies
/// instead.
pub fn fan_policy_for_mode(mode: Mode) -> Option<bool> {
    match mode {
        Mode::Starting | Mode::FinStackHeating => Some(true),
        Mode::CompCooling | Mode::Ohp | Mode::Off => Some(false),
        Mode::Defrost => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(tcomp: f32, tcond: f32, ticks_in_mode: u64, arbiter_wants_on: bool) -> FsmContext {
        FsmContext {
            tcomp,
            tcond,
            ticks_in_mode,
            arbiter_wants_on,
            valve_on: true,
            can_comp_on: true,
            can_comp_off: true,
        }
    }

    #[test]
    fn off_to_starting_requires_valve_on_and_can_comp_on() {
        let mut c = ctx(30.0, 10.0, 0, true);
        assert_eq!(off_update(&c), Some(Mode::Starting));
        c.valve_on = false;
        assert_eq!(off_update(&c), None);
        c.valve_on = true;
        c.can_comp_on = false;
        assert_eq!(off_update(&c), None);
    }

    #[test]
    fn starting_to_comp_cooling_at_56_degrees() {
        let c = ctx(56.1, 10.0, 5, true);
        assert_eq!(starting_update(&c), Some(Mode::CompCooling));
    }

    #[test]
    fn starting_to_fin_stack_after_24_ticks() {
        let c = ctx(40.0, 10.0, 25, true);
        assert_eq!(starting_update(&c), Some(Mode::FinStackHeating));
    }

    #[test]
    fn fin_stack_trips_defrost_on_short_window() {
        let c = ctx(40.0, -7.0, 160, true);
        assert_eq!(fin_stack_heating_update(&c), Some(Mode::Defrost));
    }

    #[test]
    fn fin_stack_trips_defrost_on_long_window() {
        let c = ctx(40.0, -4.0, 360, true);
        assert_eq!(fin_stack_heating_update(&c), Some(Mode::Defrost));
    }

    #[test]
    fn defrost_completes_at_exactly_82_ticks() {
        let mut c = ctx(40.0, -7.0, 81, true);
        assert_eq!(defrost_update(&c), None);
        c.ticks_in_mode = 82;
        assert_eq!(defrost_update(&c), Some(Mode::Starting));
    }

    #[test]
    fn defrost_trips_ohp_on_overheat_regardless_of_ticks_in_mode() {
        let c = ctx(63.1, -7.0, 30, true);
        assert_eq!(defrost_update(&c), Some(Mode::Ohp));
    }

    #[test]
    fn any_running_state_trips_ohp_above_63() {
        let c = ctx(63.1, 10.0, 5, true);
        assert_eq!(starting_update(&c), Some(Mode::Ohp));
        assert_eq!(comp_cooling_update(&c), Some(Mode::Ohp));
        assert_eq!(fin_stack_heating_update(&c), Some(Mode::Ohp));
        assert_eq!(defrost_update(&c), Some(Mode::Ohp));
    }

    #[test]
    fn ohp_recovers_to_off_after_24_ticks() {
        let mut c = ctx(40.0, 10.0, 24, true);
        assert_eq!(ohp_update(&c), None);
        c.ticks_in_mode = 25;
        assert_eq!(ohp_update(&c), Some(Mode::Off));
    }

    #[test]
    fn want_off_waits_for_can_comp_off() {
        let mut c = ctx(40.0, 10.0, 5, false);
        c.can_comp_off = false;
        assert_eq!(starting_update(&c), None);
        c.can_comp_off = true;
        assert_eq!(starting_update(&c), Some(Mode::Off));
    }

    #[test]
    fn defrost_schedule_bands_match_table() {
        assert_eq!(
            defrost_schedule(0),
            ActuatorState {
                valve: true,
                compressor: false,
                fan: false
            }
        );
        assert_eq!(defrost_schedule(10), ActuatorState::all_off());
        assert_eq!(
            defrost_schedule(30),
            ActuatorState {
                valve: false,
                compressor: true,
                fan: false
            }
        );
        assert_eq!(defrost_schedule(60), ActuatorState::all_off());
        assert_eq!(
            defrost_schedule(75),
            ActuatorState {
                valve: true,
                compressor: false,
                fan: false
            }
        );
    }
}
