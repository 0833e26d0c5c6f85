//! The controller: sequences sensors → filter → command read → arbiter
//! → per-unit mode FSM → interlock-gated actuator driver → response
//! encode → link write → reporter, exactly once per tick. This is the
//! only place that touches more than one unit or more than one port at
//! a time.

use log::{info, warn};

use crate::config::Config;
use crate::domain::arbiter::{self, ArbiterInput};
use crate::domain::fsm::states::{build_state_table, defrost_schedule, fan_policy_for_mode};
use crate::domain::fsm::{Fsm, FsmContext};
use crate::domain::interlock;
use crate::domain::ports::{
    ActuatorPort, CommandLinkPort, PersistencePort, ReportSink, RunCycleLedger, SensorPort,
};
use crate::domain::response;
use crate::domain::sensors::{CorrectionOffsets, Readings, SensorHub};
use crate::domain::unit::{ActuatorState, Mode, Unit, UnitId};
use crate::domain::{CommandWord, ResponseWord};
use crate::error::{Error, Result};

/// Ticks of warm-up before the reporter starts emitting (suppresses
/// startup garbage in the filtered readings).
const REPORT_WARMUP_TICKS: u64 = 8;

/// Ticks between persistence flushes (~10 minutes).
const PERSIST_EVERY_TICKS: u64 = 120;

/// One tick's full telemetry, handed to [`ReportSink`] implementations.
#[derive(Debug, Clone, Copy)]
pub struct TelemetrySnapshot {
    pub tick: u64,
    pub readings: Readings,
    pub ac1_mode: Mode,
    pub ac2_mode: Mode,
    pub ac1_actuators: ActuatorState,
    pub ac2_actuators: ActuatorState,
    pub command: CommandWord,
    pub response: ResponseWord,
    pub c1_run_cs: u64,
    pub c2_run_cs: u64,
}

pub struct Controller {
    config: Config,
    sensors: SensorHub,
    ac1: Unit,
    ac2: Unit,
    ac1_fsm: Fsm,
    ac2_fsm: Fsm,
    ledger: RunCycleLedger,
    prev_ac1_desire: bool,
    prev_ac2_desire: bool,
    tick_count: u64,
}

impl Controller {
    pub fn new(config: Config, ledger: RunCycleLedger) -> Self {
        Self {
            config,
            sensors: SensorHub::new(),
            ac1: Unit::new(UnitId::Ac1),
            ac2: Unit::new(UnitId::Ac2),
            ac1_fsm: Fsm::new(build_state_table(), Mode::Off),
            ac2_fsm: Fsm::new(build_state_table(), Mode::Off),
            ledger,
            prev_ac1_desire: false,
            prev_ac2_desire: false,
            tick_count: 0,
        }
    }

    /// Replace the configuration wholesale, applied at the next tick
    /// boundary after a reload signal. Runtime state (modes, actuators,
    /// ledger) is untouched.
    pub fn apply_config(&mut self, config: Config) {
        info!("configuration reloaded");
        self.config = config;
    }

    pub fn ledger(&self) -> RunCycleLedger {
        self.ledger
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        sensor_port: &mut dyn SensorPort,
        actuator_port: &mut dyn ActuatorPort,
        link_port: &mut dyn CommandLinkPort,
        persistence_port: &mut dyn PersistencePort,
        report_sink: &mut dyn ReportSink,
    ) -> Result<()> {
        self.tick_count += 1;

        let corr = CorrectionOffsets {
            water_in: self.config.wicorr,
            water_out: self.config.wocorr,
            env: self.config.tenvcorr,
        };
        let readings = self.sensors.tick(sensor_port, corr)?;

        self.ac1.tick();
        self.ac2.tick();

        let command = link_port.read_command().map_err(Error::from)?;
        let battery = command == CommandWord::Battery;

        let ac1_can_comp_on = interlock::can_comp_on(
            &self.ac1,
            self.config.use_ac1,
            readings.ac1_comp,
            self.ac2.actuators.compressor,
            self.ac2.cycles.compressor,
            battery,
        );
        let ac2_can_comp_on = interlock::can_comp_on(
            &self.ac2,
            self.config.use_ac2,
            readings.ac2_comp,
            self.ac1.actuators.compressor,
            self.ac1.cycles.compressor,
            battery,
        );
        let ac1_can_comp_off = interlock::can_comp_off(&self.ac1, battery);
        let ac2_can_comp_off = interlock::can_comp_off(&self.ac2, battery);

        let (ac1_desire, ac2_desire) = arbiter::decide(&ArbiterInput {
            command,
            use_ac1: self.config.use_ac1,
            use_ac2: self.config.use_ac2,
            ac1_mode: self.ac1.mode,
            ac2_mode: self.ac2.mode,
            ac1_running: self.ac1.actuators.compressor,
            ac2_running: self.ac2.actuators.compressor,
            ac1_can_comp_on,
            ac2_can_comp_on,
            c1_run_cs: self.ledger.c1_run_cs,
            c2_run_cs: self.ledger.c2_run_cs,
            prev_ac1_desire: self.prev_ac1_desire,
            prev_ac2_desire: self.prev_ac2_desire,
        });
        self.prev_ac1_desire = ac1_desire.compressor_on;
        self.prev_ac2_desire = ac2_desire.compressor_on;

        step_unit(
            &mut self.ac1,
            &mut self.ac1_fsm,
            readings.ac1_comp,
            readings.ac1_cond,
            ac1_desire.compressor_on,
            ac1_desire.valve_default_on,
            ac1_can_comp_on,
            ac1_can_comp_off,
        );
        step_unit(
            &mut self.ac2,
            &mut self.ac2_fsm,
            readings.ac2_comp,
            readings.ac2_cond,
            ac2_desire.compressor_on,
            ac2_desire.valve_default_on,
            ac2_can_comp_on,
            ac2_can_comp_off,
        );

        actuator_port
            .set_ac1(self.ac1.actuators)
            .map_err(Error::from)?;
        actuator_port
            .set_ac2(self.ac2.actuators)
            .map_err(Error::from)?;

        if self.ac1.actuators.compressor {
            self.ledger.c1_run_cs += 1;
        }
        if self.ac2.actuators.compressor {
            self.ledger.c2_run_cs += 1;
        }

        if self.tick_count % PERSIST_EVERY_TICKS == 0 {
            if let Err(e) = persistence_port.save(&self.ledger) {
                warn!("failed to persist run-cycle ledger: {e}");
            }
        }

        // Recompute against the post-step_unit state: the flags captured
        // before step_unit ran are stale the instant a unit's mode or
        // actuators change this tick (e.g. the DEFROST->STARTING boundary,
        // where the pre-tick flag's DEFROST escape hatch let the
        // compressor start but the post-tick mode no longer reads
        // DEFROST). Using one consistent snapshot for both halves of the
        // response encoder keeps a unit that just started this tick from
        // also counting as startable.
        let ac1_can_comp_on = interlock::can_comp_on(
            &self.ac1,
            self.config.use_ac1,
            readings.ac1_comp,
            self.ac2.actuators.compressor,
            self.ac2.cycles.compressor,
            battery,
        );
        let ac2_can_comp_on = interlock::can_comp_on(
            &self.ac2,
            self.config.use_ac2,
            readings.ac2_comp,
            self.ac1.actuators.compressor,
            self.ac1.cycles.compressor,
            battery,
        );
        let ac1_can_comp_off = interlock::can_comp_off(&self.ac1, battery);
        let ac2_can_comp_off = interlock::can_comp_off(&self.ac2, battery);

        let nr_startable = [
            (ac1_can_comp_on && self.ac1.mode != Mode::Defrost) as u32,
            (ac2_can_comp_on && self.ac2.mode != Mode::Defrost) as u32,
        ]
        .iter()
        .sum();
        let nr_stoppable = [ac1_can_comp_off as u32, ac2_can_comp_off as u32]
            .iter()
            .sum();
        let response = response::encode(nr_startable, nr_stoppable, self.config.mode == 0);
        link_port.write_response(response).map_err(Error::from)?;

        if self.tick_count > REPORT_WARMUP_TICKS {
            let snapshot = TelemetrySnapshot {
                tick: self.tick_count,
                readings,
                ac1_mode: self.ac1.mode,
                ac2_mode: self.ac2.mode,
                ac1_actuators: self.ac1.actuators,
                ac2_actuators: self.ac2.actuators,
                command,
                response,
                c1_run_cs: self.ledger.c1_run_cs,
                c2_run_cs: self.ledger.c2_run_cs,
            };
            if let Err(e) = report_sink.report(&snapshot) {
                warn!("failed to emit telemetry: {e}");
            }
        }

        Ok(())
    }
}

/// Advance one unit's mode FSM and, gated by the safety interlocks,
/// apply the resulting compressor/fan/valve targets.
#[allow(clippy::too_many_arguments)]
fn step_unit(
    unit: &mut Unit,
    fsm: &mut Fsm,
    tcomp: f32,
    tcond: f32,
    wants_on: bool,
    valve_default_on: bool,
    can_comp_on: bool,
    can_comp_off: bool,
) {
    let before = unit.mode;

    let mut ctx = FsmContext {
        tcomp,
        tcond,
        ticks_in_mode: unit.cycles.mode,
        arbiter_wants_on: wants_on,
        valve_on: unit.actuators.valve,
        can_comp_on,
        can_comp_off,
    };
    let new_mode = fsm.tick(&mut ctx);
    unit.set_mode(new_mode);

    if new_mode != before {
        info!("{}: {} -> {}", unit.id, before.label(), new_mode.label());
    }

    let band = if new_mode == Mode::Defrost {
        Some(defrost_schedule(unit.cycles.mode))
    } else {
        None
    };

    let target_compressor = match band {
        Some(b) => b.compressor,
        None => matches!(new_mode, Mode::Starting | Mode::CompCooling | Mode::FinStackHeating),
    };
    let target_fan = match band {
        Some(b) => b.fan,
        None => fan_policy_for_mode(new_mode).unwrap_or(false),
    };
    let target_valve = match band {
        Some(b) => b.valve,
        None => match new_mode {
            Mode::Starting | Mode::CompCooling | Mode::FinStackHeating | Mode::Ohp => true,
            Mode::Off => wants_on || valve_default_on,
            Mode::Defrost => unreachable!(),
        },
    };

    if target_compressor && !unit.actuators.compressor {
        if can_comp_on {
            unit.set_compressor(true);
        }
    } else if !target_compressor && unit.actuators.compressor && can_comp_off {
        unit.set_compressor(false);
    }

    unit.set_fan(target_fan);

    if target_valve && !unit.actuators.valve {
        if interlock::can_valve_on(unit) {
            unit.set_valve(true);
        }
    } else if !target_valve && unit.actuators.valve && interlock::can_valve_off(unit) {
        unit.set_valve(false);
    }
}
