//! sysfs-backed GPIO line binding.
//!
//! The kernel-level export (`/sys/class/gpio/export`, or a gpiod chip
//! overlay) is assumed already performed by udev rules outside this
//! process; this module only opens the already-exported `value`/
//! `direction` files for a line number and exposes them through
//! `embedded-hal`'s digital traits, with a single point of polarity
//! inversion at the boundary so the rest of the system always works in
//! "1 = ON" terms.

use std::fs;
use std::path::PathBuf;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::error::GpioError;

fn line_path(line: u32, file: &str) -> PathBuf {
    PathBuf::from(format!("/sys/class/gpio/gpio{line}/{file}"))
}

/// One exported GPIO line, bound at startup.
pub struct Line {
    number: u32,
    invert: bool,
}

impl Line {
    /// Bind an already-exported line and set its direction.
    pub fn open(number: u32, direction: Direction, invert: bool) -> Result<Self, GpioError> {
        if !line_path(number, "value").exists() {
            export(number)?;
        }
        let dir_str = match direction {
            Direction::In => "in",
            Direction::Out => "out",
        };
        fs::write(line_path(number, "direction"), dir_str)
            .map_err(|_| GpioError::DirectionFailed { line: number })?;
        Ok(Self { number, invert })
    }

    fn read_raw(&self) -> Result<bool, GpioError> {
        let text = fs::read_to_string(line_path(self.number, "value"))
            .map_err(|_| GpioError::ReadFailed { line: self.number })?;
        Ok(text.trim() == "1")
    }

    fn write_raw(&self, high: bool) -> Result<(), GpioError> {
        let value = if high { "1" } else { "0" };
        fs::write(line_path(self.number, "value"), value)
            .map_err(|_| GpioError::WriteFailed { line: self.number })
    }

    /// Logical line number, used for logging and diagnostics.
    pub fn number(&self) -> u32 {
        self.number
    }
}

fn export(number: u32) -> Result<(), GpioError> {
    fs::write("/sys/class/gpio/export", number.to_string())
        .map_err(|_| GpioError::EnableFailed { line: number })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl ErrorType for Line {
    type Error = GpioError;
}

impl InputPin for Line {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        let raw = self.read_raw()?;
        Ok(raw ^ self.invert)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.is_high()?)
    }
}

impl OutputPin for Line {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write_raw(self.invert)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write_raw(!self.invert)
    }
}

impl embedded_hal::digital::Error for GpioError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}
