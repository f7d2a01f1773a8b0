//! Conversion between Kelvin and the Key Light's temperature units.
//!
//! The device stores color temperature as `1_000_000 / kelvin`. The Control
//! Center application only offers 2900K - 7000K in 50K steps, so converting
//! back rounds to the nearest multiple of 50. Values are never clamped here:
//! the device itself snaps anything outside 143..=344 to the closer extreme.

use std::num::NonZeroU32;

/// Warmest temperature the vendor application offers.
pub const MIN_KELVIN: u32 = 2900;
/// Coolest temperature the vendor application offers.
pub const MAX_KELVIN: u32 = 7000;
/// Granularity of the vendor application's temperature slider.
pub const KELVIN_STEP: i64 = 50;

const SCALE: f64 = 1_000_000.0;

/// Convert Kelvin to device units, rounding to the nearest integer.
pub fn to_device_units(kelvin: NonZeroU32) -> i64 {
    (SCALE / f64::from(kelvin.get())).round() as i64
}

/// Convert device units to Kelvin, rounded to the nearest 50K.
///
/// Returns `None` for `0`, which has no Kelvin equivalent.
pub fn to_kelvin(units: i64) -> Option<i64> {
    if units == 0 {
        return None;
    }

    let kelvin = (SCALE / (units as f64 * KELVIN_STEP as f64)).round() as i64;
    Some(kelvin * KELVIN_STEP)
}
