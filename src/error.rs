//! Unified error types for the heat pump supervisory daemon.
//!
//! A single `Error` enum that every subsystem funnels into, keeping the
//! main tick loop's error handling uniform and letting `main` map any
//! fatal condition onto the documented exit code in one place.

use std::fmt;

// ---------------------------------------------------------------------------
// Top-level daemon error
// ---------------------------------------------------------------------------

/// Every fallible operation inside the tick loop funnels into this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A sensor channel is in fatal-sensor-loss (consecutive error counter
    /// reached the escalation threshold).
    Sensor(SensorError),
    /// A GPIO line could not be enabled, direction-set, read, or written.
    Gpio(GpioError),
    /// Configuration could not be loaded or parsed at startup.
    Config(String),
    /// The persistence file could not be read or written.
    Persistence(String),
    /// Process-level initialisation failed (daemonize, PID lock, log file).
    Init(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Gpio(e) => write!(f, "gpio: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Persistence(msg) => write!(f, "persistence: {msg}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Map a fatal error onto the exit code documented for the process.
    ///
    /// `gpio_disable_failed` should be `true` when the shutdown path's own
    /// attempt to drive every GPIO output off also failed, which shifts the
    /// sensor-loss and general shutdown codes to their "-with-GPIO-errors"
    /// variants.
    pub fn exit_code(&self, gpio_disable_failed: bool) -> i32 {
        match self {
            Self::Sensor(SensorError::FatalLoss { .. }) => {
                if gpio_disable_failed {
                    66
                } else {
                    55
                }
            }
            Self::Sensor(_) => 55,
            Self::Gpio(GpioError::EnableFailed { .. }) => 11,
            Self::Gpio(GpioError::DirectionFailed { .. }) => 12,
            Self::Gpio(_) => {
                if gpio_disable_failed {
                    14
                } else {
                    12
                }
            }
            Self::Config(_) => 1,
            Self::Persistence(_) => 1,
            Self::Init(_) => 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    /// The device path could not be opened or read.
    ReadFailed { channel: &'static str },
    /// The two text records were read but no `t=<millidegrees>` suffix
    /// could be located or parsed.
    ParseFailed { channel: &'static str },
    /// The channel's consecutive-error counter reached the escalation
    /// threshold; the whole process must disable outputs and exit.
    FatalLoss { channel: &'static str },
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed { channel } => write!(f, "{channel}: read failed"),
            Self::ParseFailed { channel } => write!(f, "{channel}: unparsable reading"),
            Self::FatalLoss { channel } => {
                write!(f, "{channel}: fatal sensor loss, exceeded consecutive error limit")
            }
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// GPIO errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpioError {
    /// Exporting/opening the line failed at startup.
    EnableFailed { line: u32 },
    /// Setting the line's direction (in/out) failed at startup.
    DirectionFailed { line: u32 },
    /// A read of an input line failed.
    ReadFailed { line: u32 },
    /// A write to an output line failed.
    WriteFailed { line: u32 },
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnableFailed { line } => write!(f, "line {line}: enable failed"),
            Self::DirectionFailed { line } => write!(f, "line {line}: direction set failed"),
            Self::ReadFailed { line } => write!(f, "line {line}: read failed"),
            Self::WriteFailed { line } => write!(f, "line {line}: write failed"),
        }
    }
}

impl From<GpioError> for Error {
    fn from(e: GpioError) -> Self {
        Self::Gpio(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Daemon-wide `Result` alias.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_fatal_loss_without_gpio_failure_is_55() {
        let e = Error::Sensor(SensorError::FatalLoss { channel: "AC1-comp" });
        assert_eq!(e.exit_code(false), 55);
    }

    #[test]
    fn sensor_fatal_loss_with_gpio_failure_is_66() {
        let e = Error::Sensor(SensorError::FatalLoss { channel: "AC1-comp" });
        assert_eq!(e.exit_code(true), 66);
    }

    #[test]
    fn gpio_enable_failure_is_11() {
        let e = Error::Gpio(GpioError::EnableFailed { line: 5 });
        assert_eq!(e.exit_code(false), 11);
    }

    #[test]
    fn gpio_direction_failure_is_12() {
        let e = Error::Gpio(GpioError::DirectionFailed { line: 5 });
        assert_eq!(e.exit_code(false), 12);
    }
}
