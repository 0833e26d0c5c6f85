//! [`CommandLinkPort`] adapter: the four dedicated GPIO lines shared
//! with the sibling controller. `commspin1`/`commspin2` are the two
//! inbound command bits; `commspin3`/`commspin4` are the two outbound
//! response bits, written with the same diff discipline as the
//! actuator lines. Polarity inversion applies only at the output pair
//! (`resp_bit0`/`resp_bit1`) — the inbound command lines are read as-is.

use crate::config::Config;
use crate::domain::ports::CommandLinkPort;
use crate::domain::{CommandWord, ResponseWord};
use crate::error::GpioError;
use crate::gpio::{Direction, Line};

pub struct GpioCommandLink {
    cmd_bit0: Line,
    cmd_bit1: Line,
    resp_bit0: Line,
    resp_bit1: Line,
    last_response: Option<ResponseWord>,
}

impl GpioCommandLink {
    pub fn open(cfg: &Config) -> Result<Self, GpioError> {
        Ok(Self {
            cmd_bit0: Line::open(cfg.commspin1, Direction::In, false)?,
            cmd_bit1: Line::open(cfg.commspin2, Direction::In, false)?,
            resp_bit0: Line::open(cfg.commspin3, Direction::Out, cfg.invert_output)?,
            resp_bit1: Line::open(cfg.commspin4, Direction::Out, cfg.invert_output)?,
            last_response: None,
        })
    }
}

impl CommandLinkPort for GpioCommandLink {
    fn read_command(&mut self) -> Result<CommandWord, GpioError> {
        use embedded_hal::digital::InputPin;
        let bit0 = self.cmd_bit0.is_high()?;
        let bit1 = self.cmd_bit1.is_high()?;
        let bits = (bit1 as u8) << 1 | bit0 as u8;
        Ok(CommandWord::from_bits(bits))
    }

    fn write_response(&mut self, response: ResponseWord) -> Result<(), GpioError> {
        use embedded_hal::digital::OutputPin;
        if self.last_response == Some(response) {
            return Ok(());
        }
        let bits = response.bits();
        if bits & 0b01 != 0 {
            self.resp_bit0.set_high()?;
        } else {
            self.resp_bit0.set_low()?;
        }
        if bits & 0b10 != 0 {
            self.resp_bit1.set_high()?;
        } else {
            self.resp_bit1.set_low()?;
        }
        self.last_response = Some(response);
        Ok(())
    }
}
