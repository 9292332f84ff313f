//! Hardware and timing configuration.

use embassy_time::Duration;

use crate::calibration::Emitter;

/// Default duration of the fade used when applying the light state.
///
/// Matches the spacing Zigbee stacks use for successive color updates.
pub const DEFAULT_SETTLE_DURATION: Duration = Duration::from_millis(100);

/// Default PWM frequency.
pub const DEFAULT_PWM_FREQUENCY_HZ: u32 = 5000;

/// Default PWM duty resolution.
pub const DEFAULT_DUTY_RESOLUTION_BITS: u8 = 13;

/// Widest duty resolution the PWM timer supports.
pub const MAX_DUTY_RESOLUTION_BITS: u8 = 20;

/// Maximum number of PWM channels the fade controller can drive.
pub const MAX_CHANNELS: usize = 8;

/// What a physical PWM output is wired to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRole {
    /// Driven by the duty of an emitter
    Emitter(Emitter),
    /// Not connected, always driven to zero
    Unused,
}

/// Configuration of a single PWM output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Hardware channel number
    pub channel: u8,
    /// Output GPIO
    pub gpio: u8,
    pub role: ChannelRole,
}

impl ChannelConfig {
    pub const fn new(channel: u8, gpio: u8, role: ChannelRole) -> Self {
        Self {
            channel,
            gpio,
            role,
        }
    }
}

/// Configuration of the PWM timer shared by all channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmTimerConfig {
    pub frequency_hz: u32,
    pub duty_resolution_bits: u8,
}

impl PwmTimerConfig {
    /// Check the resolution is one the timer supports
    pub const fn is_valid(&self) -> bool {
        self.duty_resolution_bits >= 1 && self.duty_resolution_bits <= MAX_DUTY_RESOLUTION_BITS
    }

    /// Largest duty value for the configured resolution
    #[allow(clippy::cast_lossless)]
    pub const fn max_duty(&self) -> u32 {
        match 1u32.checked_shl(self.duty_resolution_bits as u32) {
            Some(range) => range - 1,
            None => u32::MAX,
        }
    }
}

impl Default for PwmTimerConfig {
    fn default() -> Self {
        Self {
            frequency_hz: DEFAULT_PWM_FREQUENCY_HZ,
            duty_resolution_bits: DEFAULT_DUTY_RESOLUTION_BITS,
        }
    }
}

/// Channel layout of the reference board: normal, cold and warm on GPIO
/// 18-20, two spare outputs held low.
pub const DEFAULT_CHANNELS: [ChannelConfig; 5] = [
    ChannelConfig::new(0, 18, ChannelRole::Emitter(Emitter::Normal)),
    ChannelConfig::new(1, 19, ChannelRole::Emitter(Emitter::Cold)),
    ChannelConfig::new(2, 20, ChannelRole::Emitter(Emitter::Warm)),
    ChannelConfig::new(3, 21, ChannelRole::Unused),
    ChannelConfig::new(4, 22, ChannelRole::Unused),
];

/// Configuration for the light core
#[derive(Debug, Clone)]
pub struct EngineConfig<'a> {
    /// Fade duration used when applying the light state outside of effects
    pub settle_duration: Duration,
    pub timer: PwmTimerConfig,
    pub channels: &'a [ChannelConfig],
}

impl Default for EngineConfig<'_> {
    fn default() -> Self {
        Self {
            settle_duration: DEFAULT_SETTLE_DURATION,
            timer: PwmTimerConfig::default(),
            channels: &DEFAULT_CHANNELS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_duty() {
        assert_eq!(PwmTimerConfig::default().max_duty(), 8191);
        let wide = PwmTimerConfig {
            duty_resolution_bits: 32,
            ..PwmTimerConfig::default()
        };
        assert_eq!(wide.max_duty(), u32::MAX);
        assert!(!wide.is_valid());
        assert!(PwmTimerConfig::default().is_valid());
    }
}
