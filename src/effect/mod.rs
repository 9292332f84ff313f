//! Effect definitions
//!
//! An effect is static frame data: an ordered list of frames played in
//! sequence, repeated a fixed number of times. Frames only hold overrides
//! of the light state, the engine decides how to play them.

mod catalog;

use embassy_time::Duration;

use crate::mixer::LightState;

pub use catalog::{
    BLINK_FROM_OFF, BLINK_FROM_ON, BREATHE, CHANNEL_CHANGE, DELAYED_OFF_DIM_THEN_FADE,
    DELAYED_OFF_FADE, DYING_LIGHT, OKAY,
};

const EFFECT_NAME_BLINK: &str = "blink";
const EFFECT_NAME_BREATHE: &str = "breathe";
const EFFECT_NAME_OKAY: &str = "okay";
const EFFECT_NAME_CHANNEL_CHANGE: &str = "channel_change";
const EFFECT_NAME_DELAYED_OFF_FADE: &str = "delayed_off_fade";
const EFFECT_NAME_DELAYED_OFF_DIM_THEN_FADE: &str = "delayed_off_dim_then_fade";
const EFFECT_NAME_DYING_LIGHT: &str = "dying_light";
const EFFECT_NAME_FINISH: &str = "finish";
const EFFECT_NAME_STOP: &str = "stop";

// Identify cluster effect identifiers
const EFFECT_ID_BLINK: u8 = 0x00;
const EFFECT_ID_BREATHE: u8 = 0x01;
const EFFECT_ID_OKAY: u8 = 0x02;
const EFFECT_ID_CHANNEL_CHANGE: u8 = 0x0b;
const EFFECT_ID_FINISH: u8 = 0xfe;
const EFFECT_ID_STOP: u8 = 0xff;

// Device specific, used for off with effect
const EFFECT_ID_DELAYED_OFF_FADE: u8 = 0x40;
const EFFECT_ID_DELAYED_OFF_DIM_THEN_FADE: u8 = 0x41;
const EFFECT_ID_DYING_LIGHT: u8 = 0x42;

/// A single step of an effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectFrame {
    /// On/off override, `None` keeps the current state
    pub on_off: Option<bool>,
    /// Level override
    pub level: Option<u8>,
    /// Color temperature override, in mireds
    pub temperature: Option<u16>,
    /// Fade duration, also the minimum time before the next frame
    pub duration: Duration,
    /// `Finish` may end the effect instead of playing this frame
    pub abortable: bool,
}

impl EffectFrame {
    /// Frame without overrides
    pub const fn new(duration_ms: u64) -> Self {
        Self {
            on_off: None,
            level: None,
            temperature: None,
            duration: Duration::from_millis(duration_ms),
            abortable: false,
        }
    }

    /// Turn the light on at the given level
    pub const fn on_at(self, level: u8) -> Self {
        Self {
            on_off: Some(true),
            level: Some(level),
            ..self
        }
    }

    pub const fn on(self) -> Self {
        Self {
            on_off: Some(true),
            ..self
        }
    }

    pub const fn off(self) -> Self {
        Self {
            on_off: Some(false),
            ..self
        }
    }

    pub const fn temperature(self, temperature: u16) -> Self {
        Self {
            temperature: Some(temperature),
            ..self
        }
    }

    pub const fn abortable(self) -> Self {
        Self {
            abortable: true,
            ..self
        }
    }

    /// Light state this frame fades to, given the current state
    pub fn resolve(&self, current: &LightState) -> LightState {
        LightState {
            on_off: self.on_off.unwrap_or(current.on_off),
            level: self.level.unwrap_or(current.level),
            color_temperature: self.temperature.unwrap_or(current.color_temperature),
            ..*current
        }
    }
}

/// Immutable, named sequence of frames
#[derive(Debug)]
pub struct Effect {
    pub id: EffectId,
    pub frames: &'static [EffectFrame],
    /// Number of times the frame sequence is played
    pub repeats: u8,
}

impl Effect {
    pub const fn new(id: EffectId, frames: &'static [EffectFrame], repeats: u8) -> Self {
        Self {
            id,
            frames,
            repeats,
        }
    }

    /// Check if the effect has a first frame to play
    pub const fn is_playable(&self) -> bool {
        !self.frames.is_empty() && self.repeats > 0
    }
}

/// Known effects and the two control requests
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum EffectId {
    Blink = EFFECT_ID_BLINK,
    Breathe = EFFECT_ID_BREATHE,
    Okay = EFFECT_ID_OKAY,
    ChannelChange = EFFECT_ID_CHANNEL_CHANGE,
    DelayedOffFade = EFFECT_ID_DELAYED_OFF_FADE,
    DelayedOffDimThenFade = EFFECT_ID_DELAYED_OFF_DIM_THEN_FADE,
    DyingLight = EFFECT_ID_DYING_LIGHT,
    /// End the running effect at its next abortable frame
    Finish = EFFECT_ID_FINISH,
    /// Terminate the running effect immediately
    Stop = EFFECT_ID_STOP,
}

impl EffectId {
    pub fn from_raw(value: u8) -> Option<Self> {
        Some(match value {
            EFFECT_ID_BLINK => Self::Blink,
            EFFECT_ID_BREATHE => Self::Breathe,
            EFFECT_ID_OKAY => Self::Okay,
            EFFECT_ID_CHANNEL_CHANGE => Self::ChannelChange,
            EFFECT_ID_DELAYED_OFF_FADE => Self::DelayedOffFade,
            EFFECT_ID_DELAYED_OFF_DIM_THEN_FADE => Self::DelayedOffDimThenFade,
            EFFECT_ID_DYING_LIGHT => Self::DyingLight,
            EFFECT_ID_FINISH => Self::Finish,
            EFFECT_ID_STOP => Self::Stop,
            _ => return None,
        })
    }

    pub const fn as_raw(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blink => EFFECT_NAME_BLINK,
            Self::Breathe => EFFECT_NAME_BREATHE,
            Self::Okay => EFFECT_NAME_OKAY,
            Self::ChannelChange => EFFECT_NAME_CHANNEL_CHANGE,
            Self::DelayedOffFade => EFFECT_NAME_DELAYED_OFF_FADE,
            Self::DelayedOffDimThenFade => EFFECT_NAME_DELAYED_OFF_DIM_THEN_FADE,
            Self::DyingLight => EFFECT_NAME_DYING_LIGHT,
            Self::Finish => EFFECT_NAME_FINISH,
            Self::Stop => EFFECT_NAME_STOP,
        }
    }

    pub fn parse_from_str(s: &str) -> Option<Self> {
        match s {
            EFFECT_NAME_BLINK => Some(Self::Blink),
            EFFECT_NAME_BREATHE => Some(Self::Breathe),
            EFFECT_NAME_OKAY => Some(Self::Okay),
            EFFECT_NAME_CHANNEL_CHANGE => Some(Self::ChannelChange),
            EFFECT_NAME_DELAYED_OFF_FADE => Some(Self::DelayedOffFade),
            EFFECT_NAME_DELAYED_OFF_DIM_THEN_FADE => Some(Self::DelayedOffDimThenFade),
            EFFECT_NAME_DYING_LIGHT => Some(Self::DyingLight),
            EFFECT_NAME_FINISH => Some(Self::Finish),
            EFFECT_NAME_STOP => Some(Self::Stop),
            _ => None,
        }
    }

    /// Check if this id controls the running effect rather than naming one
    pub const fn is_control(self) -> bool {
        matches!(self, Self::Finish | Self::Stop)
    }

    /// Frame data to play for this id.
    ///
    /// Blink has a variant per starting state, picked from `on_off`.
    /// Control ids have no frames.
    pub fn effect(self, on_off: bool) -> Option<&'static Effect> {
        Some(match self {
            Self::Blink if on_off => &BLINK_FROM_ON,
            Self::Blink => &BLINK_FROM_OFF,
            Self::Breathe => &BREATHE,
            Self::Okay => &OKAY,
            Self::ChannelChange => &CHANNEL_CHANGE,
            Self::DelayedOffFade => &DELAYED_OFF_FADE,
            Self::DelayedOffDimThenFade => &DELAYED_OFF_DIM_THEN_FADE,
            Self::DyingLight => &DYING_LIGHT,
            Self::Finish | Self::Stop => return None,
        })
    }
}
