//! Per-unit inputs to the mode state machine, assembled fresh each tick
//! by the controller before calling [`super::Fsm::tick`].

/// Everything a state's `on_update` needs to decide the next mode.
/// Pure data in, pure transition decision out — no I/O here.
#[derive(Debug, Clone, Copy)]
pub struct FsmContext {
    /// Compressor discharge temperature for this unit, °C.
    pub tcomp: f32,
    /// Condenser (fin stack) temperature for this unit, °C.
    pub tcond: f32,
    /// Ticks the mode has held its current value. Maintained by the
    /// engine; read-only from a state's point of view.
    pub ticks_in_mode: u64,
    /// Whether the arbiter currently desires this unit running.
    pub arbiter_wants_on: bool,
    /// Whether the valve is currently energized (ON).
    pub valve_on: bool,
    /// Precomputed `CanTurnCompOn()` for this tick.
    pub can_comp_on: bool,
    /// Precomputed `CanTurnCompOff()` for this tick.
    pub can_comp_off: bool,
}
