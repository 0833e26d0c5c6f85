//! 1-Wire temperature channel reader.
//!
//! Each device file yields two text records (the kernel driver's CRC
//! status line, then a data line). This reads up to 39 bytes (the first
//! record, discarded) and up to 35 bytes (the second), locates `t=`, and
//! parses the signed milli-degree suffix that follows up to the first
//! non-digit character or EOF.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::SensorError;

const FIRST_RECORD_MAX: usize = 39;
const SECOND_RECORD_MAX: usize = 35;

/// Read one channel and return degrees Celsius.
pub fn read_channel(path: &Path, channel: &'static str) -> Result<f32, SensorError> {
    let mut file = File::open(path).map_err(|_| SensorError::ReadFailed { channel })?;

    let mut first = vec![0u8; FIRST_RECORD_MAX];
    let n1 = file
        .read(&mut first)
        .map_err(|_| SensorError::ReadFailed { channel })?;
    let _ = &first[..n1];

    let mut second = vec![0u8; SECOND_RECORD_MAX];
    let n2 = file
        .read(&mut second)
        .map_err(|_| SensorError::ReadFailed { channel })?;
    let second = String::from_utf8_lossy(&second[..n2]);

    parse_millidegrees(&second, channel)
}

fn parse_millidegrees(record: &str, channel: &'static str) -> Result<f32, SensorError> {
    let pos = record.find("t=").ok_or(SensorError::ParseFailed { channel })?;
    let rest = &record[pos + 2..];
    let digits_end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '-'))
        .unwrap_or(rest.len());
    let num_str = &rest[..digits_end];
    let millidegrees: i32 = num_str
        .parse()
        .map_err(|_| SensorError::ParseFailed { channel })?;
    Ok(millidegrees as f32 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positive_reading() {
        let record = "a3 01 4b 46 7f ff 0c 10 41 t=21187\n";
        assert_eq!(parse_millidegrees(record, "test").unwrap(), 21.187);
    }

    #[test]
    fn parses_negative_reading() {
        let record = "ff ff ff ff ff ff ff ff ff t=-5875\n";
        assert_eq!(parse_millidegrees(record, "test").unwrap(), -5.875);
    }

    #[test]
    fn tolerates_trailing_garbage_after_digits() {
        let record = "t=18625 garbage-after\n";
        assert_eq!(parse_millidegrees(record, "test").unwrap(), 18.625);
    }

    #[test]
    fn missing_t_equals_is_parse_failed() {
        let record = "no temperature field here";
        assert_eq!(
            parse_millidegrees(record, "test"),
            Err(SensorError::ParseFailed { channel: "test" })
        );
    }
}
