//! Requested changes to a light group.

use std::num::NonZeroU32;

use clap::ValueEnum;

use crate::keylight::{Light, LightGroup};
use crate::temperature;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Power {
    On,
    Off,
}

impl Power {
    fn wire_value(self) -> i64 {
        match self {
            Power::On => 1,
            Power::Off => 0,
        }
    }
}

/// A single change applied to every light of a group. Each variant touches
/// one field only, so the order of a set of configurators does not matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Configurator {
    SetPower(Power),
    /// Brightness in percent, sent as-is.
    SetBrightness(u32),
    SetTemperature(NonZeroU32),
}

impl Configurator {
    pub fn apply(&self, light: &mut Light) {
        match *self {
            Configurator::SetPower(power) => light.on = power.wire_value(),
            Configurator::SetBrightness(brightness) => light.brightness = i64::from(brightness),
            Configurator::SetTemperature(kelvin) => {
                light.temperature = temperature::to_device_units(kelvin)
            }
        }
    }
}

/// Apply `configurators` in order to every light in `group`.
pub fn apply_all(group: &mut LightGroup, configurators: &[Configurator]) {
    for light in group.lights.iter_mut() {
        for c in configurators {
            c.apply(light);
        }
    }
}
