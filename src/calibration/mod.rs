//! Calibration tables for the three white emitters.
//!
//! Each emitter has a temperature-indexed color curve and a level-indexed
//! brightness curve. The intensity of an emitter is the product of both.

mod tables {
    include!(concat!(env!("OUT_DIR"), "/calibration_tables.rs"));
}

use tables::{
    BRIGHTNESS_COLD, BRIGHTNESS_NORMAL, BRIGHTNESS_WARM, COLOR_COLD, COLOR_NORMAL, COLOR_WARM,
};

/// Coldest supported color temperature, in mireds.
pub const MIN_TEMPERATURE: u16 = 153;

/// Warmest supported color temperature, in mireds.
pub const MAX_TEMPERATURE: u16 = 454;

/// Number of entries in each color curve.
pub const COLOR_TABLE_SIZE: usize = (MAX_TEMPERATURE - MIN_TEMPERATURE + 1) as usize;

/// Number of entries in each brightness curve (the whole `u8` domain).
pub const BRIGHTNESS_TABLE_SIZE: usize = 256;

/// Lowest valid brightness level.
pub const MIN_LEVEL: u8 = 1;

/// Highest valid brightness level.
pub const MAX_LEVEL: u8 = 254;

/// Logical emitter of a tunable white light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emitter {
    /// Neutral white.
    Normal,
    /// Cold white.
    Cold,
    /// Warm white.
    Warm,
}

impl Emitter {
    /// All emitters, in duty order.
    pub const ALL: [Self; 3] = [Self::Normal, Self::Cold, Self::Warm];

    const fn color_curve(self) -> &'static [f32; COLOR_TABLE_SIZE] {
        match self {
            Self::Normal => &COLOR_NORMAL,
            Self::Cold => &COLOR_COLD,
            Self::Warm => &COLOR_WARM,
        }
    }

    const fn brightness_curve(self) -> &'static [f32; BRIGHTNESS_TABLE_SIZE] {
        match self {
            Self::Normal => &BRIGHTNESS_NORMAL,
            Self::Cold => &BRIGHTNESS_COLD,
            Self::Warm => &BRIGHTNESS_WARM,
        }
    }
}

/// Color curve value of `emitter` at `temperature` mireds.
///
/// Callers clamp to `MIN_TEMPERATURE..=MAX_TEMPERATURE` first; out of range
/// values are pinned to the nearest bound.
pub fn color(emitter: Emitter, temperature: u16) -> f32 {
    debug_assert!((MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature));
    let index = temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE) - MIN_TEMPERATURE;
    emitter.color_curve()[usize::from(index)]
}

/// Brightness curve value of `emitter` at `level`.
pub fn brightness(emitter: Emitter, level: u8) -> f32 {
    emitter.brightness_curve()[usize::from(level)]
}

/// Normalized intensity of `emitter` for the given temperature and level.
pub fn intensity(emitter: Emitter, temperature: u16, level: u8) -> f32 {
    color(emitter, temperature) * brightness(emitter, level)
}
