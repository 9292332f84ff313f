//! Error types reported by the light core.

use core::fmt;

use crate::effect::EffectId;

/// Failures while bringing up the PWM hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareError {
    /// No channels were configured.
    NoChannels,
    /// More channels were configured than the controller can track.
    TooManyChannels,
    /// A channel number does not fit the fading bitmap.
    InvalidChannel(u8),
    /// The duty resolution is outside the supported range.
    InvalidDutyResolution(u8),
    /// The PWM timer could not be configured.
    Timer,
    /// The given channel could not be configured.
    Channel(u8),
    /// A fade could not be started or stopped on the given channel.
    Fade(u8),
}

impl fmt::Display for HardwareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoChannels => write!(f, "no pwm channels configured"),
            Self::TooManyChannels => write!(f, "too many pwm channels configured"),
            Self::InvalidChannel(channel) => write!(f, "invalid pwm channel {}", channel),
            Self::InvalidDutyResolution(bits) => {
                write!(f, "unsupported pwm duty resolution of {} bits", bits)
            }
            Self::Timer => write!(f, "failed to configure pwm timer"),
            Self::Channel(channel) => write!(f, "failed to configure pwm channel {}", channel),
            Self::Fade(channel) => write!(f, "fade failed on pwm channel {}", channel),
        }
    }
}

impl core::error::Error for HardwareError {}

/// Errors returned by the public entry points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightError {
    /// The light was used before `initialize` succeeded.
    NotInitialized,
    /// No effect is registered under this raw id.
    UnknownEffect(u8),
    /// Hardware setup failed.
    HardwareConfig(HardwareError),
    /// The effect has no playable first frame.
    AuthoringInvariantViolated(EffectId),
}

impl fmt::Display for LightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "light driver is not initialized"),
            Self::UnknownEffect(id) => write!(f, "unknown effect id {:#04x}", id),
            Self::HardwareConfig(err) => write!(f, "hardware configuration failed: {}", err),
            Self::AuthoringInvariantViolated(id) => {
                write!(f, "effect {} has no playable first frame", id.as_str())
            }
        }
    }
}

impl core::error::Error for LightError {}

impl From<HardwareError> for LightError {
    fn from(err: HardwareError) -> Self {
        Self::HardwareConfig(err)
    }
}
