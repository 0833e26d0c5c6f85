//! Tick scheduler: pins the main loop to a 5-second cadence regardless of
//! how long the tick's own work took, within clock-skew tolerance.

use std::time::{Duration, Instant};

/// Nominal tick period.
pub const TICK_PERIOD: Duration = Duration::from_secs(5);

/// Ticks between wall-clock hour/month recapture (~5 minutes).
pub const HOUR_CAPTURE_TICKS: u64 = 60;

/// Busy-compensated sleep: sleeps just long enough to land the next tick
/// on the 5-second grid. If the tick's own work overran the period
/// (clock skew, NTP jump, DST, an unusually slow sensor read), sleeps a
/// flat 1 second instead of a negative duration.
pub fn sleep_to_next_tick(tick_started: Instant) {
    let elapsed = tick_started.elapsed();
    let remaining = if elapsed > TICK_PERIOD {
        Duration::from_secs(1)
    } else {
        TICK_PERIOD - elapsed
    };
    std::thread::sleep(remaining);
}

/// Tracks tick count and derives the periodic "every Nth tick" triggers
/// the scheduler and persistence layer key off of.
#[derive(Debug, Default)]
pub struct TickCounter {
    count: u64,
}

impl TickCounter {
    pub fn new() -> Self {
        Self { count: 0 }
    }

    /// Advance to the next tick, returning its 1-based index.
    pub fn advance(&mut self) -> u64 {
        self.count += 1;
        self.count
    }

    pub fn current(&self) -> u64 {
        self.count
    }

    pub fn is_hour_capture_tick(&self) -> bool {
        self.count % HOUR_CAPTURE_TICKS == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hour_capture_fires_every_60th_tick() {
        let mut tc = TickCounter::new();
        for _ in 0..59 {
            tc.advance();
            assert!(!tc.is_hour_capture_tick());
        }
        tc.advance();
        assert!(tc.is_hour_capture_tick());
    }
}
