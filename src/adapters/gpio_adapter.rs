//! [`ActuatorPort`] adapter driving the six actuator relays over sysfs
//! GPIO, writing a line only when its target state differs from what
//! was last written (the diff discipline of component design §4.6 and
//! testable property §8.10 — avoids sysfs write amplification and
//! relay chatter on every tick).

use crate::config::Config;
use crate::domain::ports::ActuatorPort;
use crate::domain::unit::ActuatorState;
use crate::error::GpioError;
use crate::gpio::{Direction, Line};

struct UnitLines {
    compressor: Line,
    fan: Line,
    valve: Line,
    last_written: Option<ActuatorState>,
}

impl UnitLines {
    fn open(compressor: u32, fan: u32, valve: u32, invert: bool) -> Result<Self, GpioError> {
        Ok(Self {
            compressor: Line::open(compressor, Direction::Out, invert)?,
            fan: Line::open(fan, Direction::Out, invert)?,
            valve: Line::open(valve, Direction::Out, invert)?,
            last_written: None,
        })
    }

    /// Write each of the three lines only if that actuator's bit
    /// differs from what was last written to it.
    fn apply(&mut self, state: ActuatorState) -> Result<(), GpioError> {
        let last = self.last_written;
        if last.map(|s| s.compressor) != Some(state.compressor) {
            write_bit(&mut self.compressor, state.compressor)?;
        }
        if last.map(|s| s.fan) != Some(state.fan) {
            write_bit(&mut self.fan, state.fan)?;
        }
        if last.map(|s| s.valve) != Some(state.valve) {
            write_bit(&mut self.valve, state.valve)?;
        }
        self.last_written = Some(state);
        Ok(())
    }

    fn force_off(&mut self) -> Result<(), GpioError> {
        write_bit(&mut self.compressor, false)?;
        write_bit(&mut self.fan, false)?;
        write_bit(&mut self.valve, false)?;
        self.last_written = Some(ActuatorState::all_off());
        Ok(())
    }
}

fn write_bit(line: &mut Line, high: bool) -> Result<(), GpioError> {
    use embedded_hal::digital::OutputPin;
    if high {
        line.set_high()
    } else {
        line.set_low()
    }
}

/// Binds the six actuator relay lines (2 units x {compressor, fan,
/// valve}) at startup and drives them thereafter.
pub struct GpioActuators {
    ac1: UnitLines,
    ac2: UnitLines,
}

impl GpioActuators {
    pub fn open(cfg: &Config) -> Result<Self, GpioError> {
        Ok(Self {
            ac1: UnitLines::open(cfg.ac1cmp_pin, cfg.ac1fan_pin, cfg.ac1v_pin, cfg.invert_output)?,
            ac2: UnitLines::open(cfg.ac2cmp_pin, cfg.ac2fan_pin, cfg.ac2v_pin, cfg.invert_output)?,
        })
    }
}

impl ActuatorPort for GpioActuators {
    fn set_ac1(&mut self, state: ActuatorState) -> Result<(), GpioError> {
        self.ac1.apply(state)
    }

    fn set_ac2(&mut self, state: ActuatorState) -> Result<(), GpioError> {
        self.ac2.apply(state)
    }

    fn disable_all(&mut self) -> Result<(), GpioError> {
        self.ac1.force_off()?;
        self.ac2.force_off()
    }
}
