//! Built-in effects.

use super::{Effect, EffectFrame, EffectId};
use crate::calibration::{MAX_LEVEL, MIN_LEVEL};

const BLINK_FROM_OFF_FRAMES: [EffectFrame; 2] = [
    EffectFrame::new(500).on_at(MAX_LEVEL),
    EffectFrame::new(500).off(),
];

const BLINK_FROM_ON_FRAMES: [EffectFrame; 2] = [
    EffectFrame::new(500).off(),
    EffectFrame::new(500).on(),
];

const OKAY_FRAMES: [EffectFrame; 4] = [
    EffectFrame::new(250).on_at(MAX_LEVEL),
    EffectFrame::new(250).off(),
    EffectFrame::new(250).on_at(MAX_LEVEL),
    EffectFrame::new(250).off(),
];

// A breathe cycle ends on the bright frame, `Finish` lets it complete.
const BREATHE_FRAMES: [EffectFrame; 2] = [
    EffectFrame::new(500).on_at(26).abortable(),
    EffectFrame::new(500).on_at(MAX_LEVEL),
];

const CHANNEL_CHANGE_FRAMES: [EffectFrame; 2] = [
    EffectFrame::new(500).on_at(MAX_LEVEL),
    EffectFrame::new(7500).on_at(MIN_LEVEL).abortable(),
];

const DELAYED_OFF_FADE_FRAMES: [EffectFrame; 1] = [EffectFrame::new(800).off()];

const DELAYED_OFF_DIM_THEN_FADE_FRAMES: [EffectFrame; 2] = [
    EffectFrame::new(800).on_at(127),
    EffectFrame::new(12000).off(),
];

const DYING_LIGHT_FRAMES: [EffectFrame; 3] = [
    EffectFrame::new(500).on_at(MAX_LEVEL),
    EffectFrame::new(500).on_at(64),
    EffectFrame::new(1000).off(),
];

/// Single on/off blink starting from off
pub static BLINK_FROM_OFF: Effect = Effect::new(EffectId::Blink, &BLINK_FROM_OFF_FRAMES, 1);

/// Single off/on blink starting from on
pub static BLINK_FROM_ON: Effect = Effect::new(EffectId::Blink, &BLINK_FROM_ON_FRAMES, 1);

/// Double blink
pub static OKAY: Effect = Effect::new(EffectId::Okay, &OKAY_FRAMES, 1);

/// Dim and bright, once per second, 15 times
pub static BREATHE: Effect = Effect::new(EffectId::Breathe, &BREATHE_FRAMES, 15);

/// Bright pulse followed by a long dim hold
pub static CHANNEL_CHANGE: Effect =
    Effect::new(EffectId::ChannelChange, &CHANNEL_CHANGE_FRAMES, 1);

/// Fade to off
pub static DELAYED_OFF_FADE: Effect =
    Effect::new(EffectId::DelayedOffFade, &DELAYED_OFF_FADE_FRAMES, 1);

/// Dim to half, then slowly fade to off
pub static DELAYED_OFF_DIM_THEN_FADE: Effect = Effect::new(
    EffectId::DelayedOffDimThenFade,
    &DELAYED_OFF_DIM_THEN_FADE_FRAMES,
    1,
);

/// Flare up, dim, then fade to off
pub static DYING_LIGHT: Effect = Effect::new(EffectId::DyingLight, &DYING_LIGHT_FRAMES, 1);
