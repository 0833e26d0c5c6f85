//! Load sharer / arbiter: turns the inbound command, the per-unit
//! enabled flags, and the fair-share run-cycle ledger into a per-unit
//! desire to be running.

use crate::domain::unit::Mode;
use crate::domain::CommandWord;

/// What the arbiter wants for one unit this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnitDesire {
    pub compressor_on: bool,
    /// Default valve position when the unit is not actively running.
    /// `true` in battery/emergency mode (safe-state for heating resume).
    pub valve_default_on: bool,
}

/// Everything the arbiter needs to decide both units' desires for one
/// tick. `*_running` reflects the actuator's actual compressor state,
/// not the mode.
pub struct ArbiterInput {
    pub command: CommandWord,
    pub use_ac1: bool,
    pub use_ac2: bool,
    pub ac1_mode: Mode,
    pub ac2_mode: Mode,
    pub ac1_running: bool,
    pub ac2_running: bool,
    /// Precomputed `CanTurnCompOn()` for this tick, used to swap the
    /// fair-share pick over to the other unit when the nominated one is
    /// blocked by an interlock.
    pub ac1_can_comp_on: bool,
    pub ac2_can_comp_on: bool,
    pub c1_run_cs: u64,
    pub c2_run_cs: u64,
    /// Desire carried over from the previous tick, used for command=0
    /// ("keep current desires").
    pub prev_ac1_desire: bool,
    pub prev_ac2_desire: bool,
}

/// Decide (AC1 desire, AC2 desire) for this tick.
///
/// A unit mid-DEFROST is desired regardless of command (it must
/// complete its schedule); a unit disabled by configuration is never
/// desired.
pub fn decide(input: &ArbiterInput) -> (UnitDesire, UnitDesire) {
    let battery = input.command == CommandWord::Battery;

    let (mut ac1_want, mut ac2_want) = match input.command {
        CommandWord::Idle => (input.prev_ac1_desire, input.prev_ac2_desire),
        CommandWord::Low => decide_low(input),
        CommandWord::High => (true, true),
        CommandWord::Battery => (false, false),
    };

    if input.ac1_mode == Mode::Defrost {
        ac1_want = true;
    }
    if input.ac2_mode == Mode::Defrost {
        ac2_want = true;
    }

    if !input.use_ac1 {
        ac1_want = false;
    }
    if !input.use_ac2 {
        ac2_want = false;
    }

    (
        UnitDesire {
            compressor_on: ac1_want,
            valve_default_on: battery,
        },
        UnitDesire {
            compressor_on: ac2_want,
            valve_default_on: battery,
        },
    )
}

/// command=1 (LOW): exactly one unit should compress, fair-share
/// tie-broken by the smaller cumulative run-cycle counter, with a swap
/// to the other unit if the nominated one is blocked by an interlock
/// (overheat, stagger, mid min-off-window) while the other is eligible.
fn decide_low(input: &ArbiterInput) -> (bool, bool) {
    let running_count = input.ac1_running as u8 + input.ac2_running as u8;

    match running_count {
        0 => {
            if !input.use_ac1 {
                (false, true)
            } else if !input.use_ac2 {
                (true, false)
            } else if input.c1_run_cs <= input.c2_run_cs {
                if input.ac1_can_comp_on || !input.ac2_can_comp_on {
                    (true, false)
                } else {
                    (false, true)
                }
            } else if input.ac2_can_comp_on || !input.ac1_can_comp_on {
                (false, true)
            } else {
                (true, false)
            }
        }
        1 => (input.ac1_running, input.ac2_running),
        _ => {
            // Both running: keep the less-used one, remove the other.
            if input.c1_run_cs <= input.c2_run_cs {
                (true, false)
            } else {
                (false, true)
            }
        }
    }
}
