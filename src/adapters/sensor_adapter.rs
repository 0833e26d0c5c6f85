//! [`SensorPort`] adapter backed by the 11 configured 1-Wire device
//! paths.

use std::path::PathBuf;

use crate::config::Config;
use crate::domain::ports::SensorPort;
use crate::domain::sensors::Channel;
use crate::error::SensorError;
use crate::onewire;

pub struct OneWireSensors {
    paths: [PathBuf; 11],
}

impl OneWireSensors {
    pub fn new(cfg: &Config) -> Self {
        Self {
            paths: [
                PathBuf::from(&cfg.ac1cmp_sensor),
                PathBuf::from(&cfg.ac1cnd_sensor),
                PathBuf::from(&cfg.he1i_sensor),
                PathBuf::from(&cfg.he1o_sensor),
                PathBuf::from(&cfg.ac2cmp_sensor),
                PathBuf::from(&cfg.ac2cnd_sensor),
                PathBuf::from(&cfg.he2i_sensor),
                PathBuf::from(&cfg.he2o_sensor),
                PathBuf::from(&cfg.wi_sensor),
                PathBuf::from(&cfg.wo_sensor),
                PathBuf::from(&cfg.tenv_sensor),
            ],
        }
    }

    /// Replace the device paths after a configuration reload.
    pub fn reconfigure(&mut self, cfg: &Config) {
        *self = Self::new(cfg);
    }

    fn index(channel: Channel) -> usize {
        Channel::ALL.iter().position(|&c| c == channel).expect("Channel::ALL is exhaustive")
    }
}

impl SensorPort for OneWireSensors {
    fn read_channel(&mut self, channel: Channel) -> Result<f32, SensorError> {
        let path = &self.paths[Self::index(channel)];
        onewire::read_channel(path, channel.name())
    }
}
