//! Generic function-pointer-table finite state machine engine, driving
//! the per-unit mode state machine defined in [`states`].

pub mod context;
pub mod states;

pub use context::FsmContext;

use crate::domain::unit::Mode;

pub type StateEnterFn = fn(&mut FsmContext);
pub type StateExitFn = fn(&mut FsmContext);
pub type StateUpdateFn = fn(&FsmContext) -> Option<Mode>;

/// One state's behaviour: optional enter/exit hooks plus the update
/// function that decides whether to transition.
#[derive(Clone, Copy)]
pub struct StateDescriptor {
    pub on_enter: Option<StateEnterFn>,
    pub on_exit: Option<StateExitFn>,
    pub on_update: StateUpdateFn,
}

/// A table-driven state machine for one unit's mode.
pub struct Fsm {
    table: [StateDescriptor; Mode::COUNT],
    current: Mode,
    tick_count: u64,
    state_entry_tick: u64,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; Mode::COUNT], start: Mode) -> Self {
        Self {
            table,
            current: start,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    pub fn current_state(&self) -> Mode {
        self.current
    }

    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    /// Advance the clock by one tick, run the current state's update
    /// function, and transition if it requests one. `ctx.ticks_in_mode`
    /// should already reflect this tick's count before calling.
    pub fn tick(&mut self, ctx: &mut FsmContext) -> Mode {
        self.tick_count += 1;
        let descriptor = &self.table[self.current as usize];
        if let Some(next) = (descriptor.on_update)(ctx) {
            self.transition(next, ctx);
        }
        self.current
    }

    /// Force a transition regardless of the current state's update
    /// function. Used nowhere in normal operation but kept for tests and
    /// for a future administrative override.
    pub fn force_transition(&mut self, next: Mode, ctx: &mut FsmContext) {
        self.transition(next, ctx);
    }

    fn transition(&mut self, next: Mode, ctx: &mut FsmContext) {
        if next == self.current {
            return;
        }
        if let Some(on_exit) = self.table[self.current as usize].on_exit {
            on_exit(ctx);
        }
        self.current = next;
        self.state_entry_tick = self.tick_count;
        ctx.ticks_in_mode = 0;
        if let Some(on_enter) = self.table[self.current as usize].on_enter {
            on_enter(ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fsm::states::build_state_table;

    fn ctx() -> FsmContext {
        FsmContext {
            tcomp: 30.0,
            tcond: 10.0,
            ticks_in_mode: 0,
            arbiter_wants_on: false,
            valve_on: true,
            can_comp_on: true,
            can_comp_off: true,
        }
    }

    #[test]
    fn force_transition_bypasses_the_update_function() {
        let mut fsm = Fsm::new(build_state_table(), Mode::Off);
        let mut c = ctx();
        // off_update would never move straight to FIN-STACK-HEATING from
        // OFF; force_transition does it anyway, resetting ticks_in_mode.
        fsm.force_transition(Mode::FinStackHeating, &mut c);
        assert_eq!(fsm.current_state(), Mode::FinStackHeating);
        assert_eq!(fsm.ticks_in_current_state(), 0);
        assert_eq!(c.ticks_in_mode, 0);
    }

    #[test]
    fn force_transition_to_current_mode_is_a_no_op() {
        let mut fsm = Fsm::new(build_state_table(), Mode::Off);
        let mut c = ctx();
        c.ticks_in_mode = 5;
        fsm.force_transition(Mode::Off, &mut c);
        assert_eq!(fsm.current_state(), Mode::Off);
        assert_eq!(c.ticks_in_mode, 5, "no-op transition leaves ctx untouched");
    }
}
