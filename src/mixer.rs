//! Light state to channel duty mixing.

use crate::calibration::{self, Emitter, MAX_LEVEL, MAX_TEMPERATURE, MIN_LEVEL, MIN_TEMPERATURE};

/// `ExecuteIfOff` bit of the level control options.
pub const LEVEL_OPTION_EXECUTE_IF_OFF: u8 = 0b01;

/// Couple color temperature to level bit of the level control options.
pub const LEVEL_OPTION_COUPLE_TEMPERATURE: u8 = 0b10;

/// Snapshot of the desired light state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightState {
    pub on_off: bool,
    /// Current level, valid range is 1-254.
    pub level: u8,
    /// Color temperature in mireds.
    pub color_temperature: u16,
    /// Level control options bitmap.
    pub level_options: u8,
    /// Color temperature used at the lowest level when coupling is enabled.
    pub couple_min_temperature: u16,
}

impl LightState {
    pub const fn new() -> Self {
        Self {
            on_off: true,
            level: MAX_LEVEL,
            color_temperature: 366,
            level_options: 0,
            couple_min_temperature: MIN_TEMPERATURE,
        }
    }

    /// Check if color temperature is coupled to the level
    pub const fn is_temperature_coupled(&self) -> bool {
        self.level_options & LEVEL_OPTION_COUPLE_TEMPERATURE != 0
    }

    /// Level clamped to the valid range
    pub fn effective_level(&self) -> u8 {
        self.level.clamp(MIN_LEVEL, MAX_LEVEL)
    }

    /// Color temperature after applying level coupling and device bounds.
    ///
    /// With coupling enabled the requested temperature is used at the
    /// highest level and shifts linearly towards the couple minimum as the
    /// level goes down, reaching it at level 1. This follows the ZCL
    /// `CoupleColorTempToLevel` behavior.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn effective_temperature(&self) -> u16 {
        let requested = self.color_temperature.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
        if !self.is_temperature_coupled() {
            return requested;
        }

        let floor = self
            .couple_min_temperature
            .clamp(MIN_TEMPERATURE, MAX_TEMPERATURE);
        let steps_below_max = i32::from(MAX_LEVEL - self.effective_level());
        let max_temp = i32::from(requested);
        let min_temp = i32::from(floor);
        let span = i32::from(MAX_LEVEL - MIN_LEVEL);
        let temperature = max_temp - steps_below_max * (max_temp - min_temp) / span;

        // Bounded by requested and floor, both inside the device range
        temperature.clamp(i32::from(MIN_TEMPERATURE), i32::from(MAX_TEMPERATURE)) as u16
    }
}

impl Default for LightState {
    fn default() -> Self {
        Self::new()
    }
}

/// Duty fractions (0.0-1.0) of the normal, cold and warm channels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChannelDuty {
    pub normal: f32,
    pub cold: f32,
    pub warm: f32,
}

impl ChannelDuty {
    /// All channels off
    pub const OFF: Self = Self {
        normal: 0.0,
        cold: 0.0,
        warm: 0.0,
    };

    pub const fn new(normal: f32, cold: f32, warm: f32) -> Self {
        Self { normal, cold, warm }
    }

    /// Duty of a single emitter
    pub const fn get(&self, emitter: Emitter) -> f32 {
        match emitter {
            Emitter::Normal => self.normal,
            Emitter::Cold => self.cold,
            Emitter::Warm => self.warm,
        }
    }

    pub fn is_off(&self) -> bool {
        self.normal == 0.0 && self.cold == 0.0 && self.warm == 0.0
    }
}

/// Compute the channel duty for a light state.
///
/// An off light yields zero duty regardless of level and temperature.
pub fn mix(state: &LightState) -> ChannelDuty {
    if !state.on_off {
        return ChannelDuty::OFF;
    }

    let level = state.effective_level();
    let temperature = state.effective_temperature();

    ChannelDuty {
        normal: calibration::intensity(Emitter::Normal, temperature, level),
        cold: calibration::intensity(Emitter::Cold, temperature, level),
        warm: calibration::intensity(Emitter::Warm, temperature, level),
    }
}
