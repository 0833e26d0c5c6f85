//! Port traits: the boundary between the control kernel and the
//! hardware/filesystem adapters in [`crate::adapters`]. The domain
//! depends only on these; nothing here touches a file descriptor.

use crate::domain::sensors::Channel;
use crate::domain::unit::ActuatorState;
use crate::domain::{CommandWord, ResponseWord};
use crate::error::{GpioError, SensorError};

/// Reads one 1-Wire temperature channel.
pub trait SensorPort {
    fn read_channel(&mut self, channel: Channel) -> Result<f32, SensorError>;
}

/// Drives the six actuator relays, diffed against the previous tick by
/// the adapter so unchanged lines are never rewritten.
pub trait ActuatorPort {
    fn set_ac1(&mut self, state: ActuatorState) -> Result<(), GpioError>;
    fn set_ac2(&mut self, state: ActuatorState) -> Result<(), GpioError>;
    /// Force every actuator line off, used on fatal-error shutdown.
    fn disable_all(&mut self) -> Result<(), GpioError>;
}

/// Reads the inbound command register and writes the outbound response
/// register over the four dedicated GPIO lines.
pub trait CommandLinkPort {
    fn read_command(&mut self) -> Result<CommandWord, GpioError>;
    fn write_response(&mut self, response: ResponseWord) -> Result<(), GpioError>;
}

/// Cumulative per-compressor run-cycle counters, persisted across
/// restarts for fair-share tie-breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunCycleLedger {
    pub c1_run_cs: u64,
    pub c2_run_cs: u64,
}

/// Loads and saves the run-cycle ledger.
pub trait PersistencePort {
    fn load(&mut self) -> Result<RunCycleLedger, String>;
    fn save(&mut self, ledger: &RunCycleLedger) -> Result<(), String>;
}

/// Emits one tick's telemetry snapshot to its sinks (CSV append, text
/// table overwrite, JSON overwrite).
pub trait ReportSink {
    fn report(&mut self, snapshot: &crate::domain::service::TelemetrySnapshot) -> std::io::Result<()>;
}
