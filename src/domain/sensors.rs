//! The 11-channel sensor reader and sanity filter.
//!
//! Reads flow through [`crate::domain::ports::SensorPort`] so the filter
//! logic here is testable without touching any 1-Wire device file.

use log::warn;

use crate::domain::ports::SensorPort;
use crate::error::SensorError;

/// Clamp applied to the inter-tick delta of any channel.
pub const MAX_TEMP_DIFF: f32 = 5.0;
/// Consecutive read failures before a channel is declared fatally lost.
pub const FATAL_ERROR_THRESHOLD: u8 = 5;
/// Sentinel meaning "never read".
pub const NEVER_READ: f32 = -200.0;
/// Ticks after startup during which raw readings are accepted unfiltered.
const JUST_STARTED_TICKS: u8 = 3;

/// The 11 sensor channels, in the order the data model numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Ac1Comp,
    Ac1Cond,
    He1In,
    He1Out,
    Ac2Comp,
    Ac2Cond,
    He2In,
    He2Out,
    WaterIn,
    WaterOut,
    Env,
}

impl Channel {
    pub const ALL: [Channel; 11] = [
        Channel::Ac1Comp,
        Channel::Ac1Cond,
        Channel::He1In,
        Channel::He1Out,
        Channel::Ac2Comp,
        Channel::Ac2Cond,
        Channel::He2In,
        Channel::He2Out,
        Channel::WaterIn,
        Channel::WaterOut,
        Channel::Env,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Ac1Comp => "AC1-comp",
            Self::Ac1Cond => "AC1-cond",
            Self::He1In => "HE1-in",
            Self::He1Out => "HE1-out",
            Self::Ac2Comp => "AC2-comp",
            Self::Ac2Cond => "AC2-cond",
            Self::He2In => "HE2-in",
            Self::He2Out => "HE2-out",
            Self::WaterIn => "water-in",
            Self::WaterOut => "water-out",
            Self::Env => "env",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ChannelState {
    current: f32,
    previous: f32,
    error_count: u8,
}

impl ChannelState {
    const fn new() -> Self {
        Self {
            current: NEVER_READ,
            previous: NEVER_READ,
            error_count: 0,
        }
    }
}

/// Additive correction offsets applied after filtering, per
/// configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrectionOffsets {
    pub water_in: f32,
    pub water_out: f32,
    pub env: f32,
}

/// One tick's filtered, corrected readings, keyed by semantic name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Readings {
    pub ac1_comp: f32,
    pub ac1_cond: f32,
    pub he1_in: f32,
    pub he1_out: f32,
    pub ac2_comp: f32,
    pub ac2_cond: f32,
    pub he2_in: f32,
    pub he2_out: f32,
    pub water_in: f32,
    pub water_out: f32,
    pub env: f32,
}

/// Owns the per-channel filter state across ticks.
pub struct SensorHub {
    channels: [ChannelState; 11],
    just_started: u8,
}

impl SensorHub {
    pub fn new() -> Self {
        Self {
            channels: [ChannelState::new(); 11],
            just_started: JUST_STARTED_TICKS,
        }
    }

    /// Read every channel through `port`, apply the sanity filter, and
    /// return the corrected snapshot. Returns `Err` the first tick a
    /// channel's consecutive-error counter reaches the fatal threshold;
    /// the caller must disable all GPIO outputs and exit.
    pub fn tick(
        &mut self,
        port: &mut dyn SensorPort,
        corr: CorrectionOffsets,
    ) -> Result<Readings, SensorError> {
        let accept_raw = self.just_started > 0;
        if accept_raw {
            self.just_started -= 1;
        }

        let mut filtered = [0.0f32; 11];
        for (i, &channel) in Channel::ALL.iter().enumerate() {
            let state = &mut self.channels[i];
            match port.read_channel(channel) {
                Ok(raw) => {
                    state.error_count = state.error_count.saturating_sub(1);
                    filtered[i] = apply_filter(state, raw, accept_raw);
                }
                Err(e) => {
                    state.error_count = state.error_count.saturating_add(1);
                    warn!("{}: {e}, consecutive errors = {}", channel.name(), state.error_count);
                    if state.error_count >= FATAL_ERROR_THRESHOLD {
                        return Err(SensorError::FatalLoss {
                            channel: channel.name(),
                        });
                    }
                    filtered[i] = state.current;
                }
            }
        }

        Ok(Readings {
            ac1_comp: filtered[0],
            ac1_cond: filtered[1],
            he1_in: filtered[2],
            he1_out: filtered[3],
            ac2_comp: filtered[4],
            ac2_cond: filtered[5],
            he2_in: filtered[6],
            he2_out: filtered[7],
            water_in: filtered[8] + corr.water_in,
            water_out: filtered[9] + corr.water_out,
            env: filtered[10] + corr.env,
        })
    }
}

impl Default for SensorHub {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_filter(state: &mut ChannelState, raw: f32, accept_raw: bool) -> f32 {
    let corrected = if accept_raw {
        raw
    } else if (raw - state.previous).abs() > MAX_TEMP_DIFF {
        let clamped = state.previous + MAX_TEMP_DIFF.copysign(raw - state.previous);
        warn!(
            "sensor correction: raw {raw:.3} clamped to {clamped:.3} (prev {:.3})",
            state.previous
        );
        clamped
    } else {
        raw
    };

    state.current = corrected;
    state.previous = corrected;
    corrected
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubPort {
        values: [f32; 11],
        fail: Option<usize>,
    }

    impl SensorPort for StubPort {
        fn read_channel(&mut self, channel: Channel) -> Result<f32, SensorError> {
            let idx = Channel::ALL.iter().position(|&c| c == channel).unwrap();
            if self.fail == Some(idx) {
                Err(SensorError::ReadFailed {
                    channel: channel.name(),
                })
            } else {
                Ok(self.values[idx])
            }
        }
    }

    #[test]
    fn accepts_raw_values_during_warmup() {
        let mut hub = SensorHub::new();
        let mut port = StubPort {
            values: [100.0; 11],
            fail: None,
        };
        let r = hub.tick(&mut port, CorrectionOffsets::default()).unwrap();
        assert_eq!(r.ac1_comp, 100.0);
    }

    #[test]
    fn clamps_large_jump_after_warmup() {
        let mut hub = SensorHub::new();
        let mut port = StubPort {
            values: [20.0; 11],
            fail: None,
        };
        for _ in 0..JUST_STARTED_TICKS {
            hub.tick(&mut port, CorrectionOffsets::default()).unwrap();
        }
        port.values[0] = 40.0;
        let r = hub.tick(&mut port, CorrectionOffsets::default()).unwrap();
        assert_eq!(r.ac1_comp, 25.0);
    }

    #[test]
    fn escalates_to_fatal_after_five_consecutive_failures() {
        let mut hub = SensorHub::new();
        let mut port = StubPort {
            values: [20.0; 11],
            fail: Some(0),
        };
        for _ in 0..JUST_STARTED_TICKS {
            hub.tick(&mut port, CorrectionOffsets::default()).unwrap();
        }
        let mut result = Ok(Readings {
            ac1_comp: 0.0,
            ac1_cond: 0.0,
            he1_in: 0.0,
            he1_out: 0.0,
            ac2_comp: 0.0,
            ac2_cond: 0.0,
            he2_in: 0.0,
            he2_out: 0.0,
            water_in: 0.0,
            water_out: 0.0,
            env: 0.0,
        });
        for _ in 0..FATAL_ERROR_THRESHOLD {
            result = hub.tick(&mut port, CorrectionOffsets::default());
        }
        assert!(result.is_err());
    }

    #[test]
    fn correction_offsets_apply_only_to_water_and_env_channels() {
        let mut hub = SensorHub::new();
        let mut port = StubPort {
            values: [20.0; 11],
            fail: None,
        };
        let corr = CorrectionOffsets {
            water_in: 1.0,
            water_out: -1.0,
            env: 0.5,
        };
        let r = hub.tick(&mut port, corr).unwrap();
        assert_eq!(r.water_in, 21.0);
        assert_eq!(r.water_out, 19.0);
        assert_eq!(r.env, 20.5);
        assert_eq!(r.ac1_comp, 20.0);
    }
}
