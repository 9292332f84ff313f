//! Timed multi-channel fades on top of a PWM peripheral.
//!
//! A fade marks every channel it touches in a shared bitmap before any
//! hardware call, so a completion interrupt firing early can never be lost.
//! Each completion clears its bit from interrupt context. The transition to
//! an empty bitmap wakes the engine exactly once.

use core::cell::Cell;

use critical_section::Mutex;
use embassy_time::Duration;
use heapless::Vec;

use crate::config::{ChannelConfig, ChannelRole, MAX_CHANNELS, PwmTimerConfig};
use crate::error::HardwareError;
use crate::log::log;
use crate::mixer::ChannelDuty;
use crate::request::RequestInbox;

/// PWM hardware abstraction
///
/// Implement this trait to support different hardware platforms.
pub trait PwmDriver {
    /// Configure the timer shared by all channels
    fn configure_timer(&mut self, timer: &PwmTimerConfig) -> Result<(), HardwareError>;

    /// Configure a single output, initially at zero duty
    fn configure_channel(&mut self, config: &ChannelConfig) -> Result<(), HardwareError>;

    /// Register the notifier the completion interrupt reports to
    fn register_fade_callback(&mut self, notifier: FadeNotifier);

    /// Start a fade to `duty` lasting `duration`, without waiting for it
    fn start_fade(&mut self, channel: u8, duty: u32, duration: Duration)
    -> Result<(), HardwareError>;

    /// Cancel the fade in progress on `channel`, if any
    fn stop_fade(&mut self, channel: u8) -> Result<(), HardwareError>;
}

/// Bitmap of channels with a fade in flight
pub struct FadeTracker {
    fading: Mutex<Cell<u8>>,
}

impl FadeTracker {
    pub const fn new() -> Self {
        Self {
            fading: Mutex::new(Cell::new(0)),
        }
    }

    /// Mark channels as fading
    pub(crate) fn mark(&self, mask: u8) {
        critical_section::with(|cs| {
            let fading = self.fading.borrow(cs);
            fading.set(fading.get() | mask);
        });
    }

    /// Clear the bit of `channel`.
    ///
    /// Returns true if this settled the last fading channel.
    pub fn complete(&self, channel: u8) -> bool {
        let Some(bit) = channel_bit(channel) else {
            return false;
        };
        critical_section::with(|cs| {
            let fading = self.fading.borrow(cs);
            let before = fading.get();
            let after = before & !bit;
            fading.set(after);
            before != 0 && after == 0
        })
    }

    /// Forget all fades
    pub(crate) fn clear(&self) {
        critical_section::with(|cs| self.fading.borrow(cs).set(0));
    }

    /// Bitmap of channels still fading
    pub fn fading_mask(&self) -> u8 {
        critical_section::with(|cs| self.fading.borrow(cs).get())
    }

    pub fn is_fading(&self) -> bool {
        self.fading_mask() != 0
    }
}

impl Default for FadeTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle given to the fade completion interrupt
#[derive(Clone, Copy)]
pub struct FadeNotifier {
    tracker: &'static FadeTracker,
    inbox: &'static RequestInbox,
}

impl FadeNotifier {
    pub const fn new(tracker: &'static FadeTracker, inbox: &'static RequestInbox) -> Self {
        Self { tracker, inbox }
    }

    /// Report that the fade on `channel` completed.
    ///
    /// Interrupt safe. Wakes the engine once the last fading channel settles,
    /// so completions arriving in one burst raise a single wake.
    pub fn notify(&self, channel: u8) {
        if self.tracker.complete(channel) {
            self.inbox.wake();
        }
    }

    pub fn tracker(&self) -> &'static FadeTracker {
        self.tracker
    }
}

fn channel_bit(channel: u8) -> Option<u8> {
    if usize::from(channel) < MAX_CHANNELS {
        Some(1 << channel)
    } else {
        None
    }
}

/// Scale a duty fraction to the hardware duty range
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn hardware_duty(fraction: f32, max_duty: u32) -> u32 {
    libm::roundf(fraction.clamp(0.0, 1.0) * max_duty as f32) as u32
}

/// Drives all configured channels towards a channel duty
pub struct FadeController<P: PwmDriver> {
    pwm: P,
    notifier: FadeNotifier,
    timer: PwmTimerConfig,
    channels: Vec<ChannelConfig, MAX_CHANNELS>,
    mask: u8,
}

impl<P: PwmDriver> FadeController<P> {
    /// Create a controller for the given channels
    ///
    /// Hardware is not touched until [`FadeController::configure`].
    pub fn new(
        pwm: P,
        notifier: FadeNotifier,
        timer: PwmTimerConfig,
        channels: &[ChannelConfig],
    ) -> Result<Self, HardwareError> {
        if channels.is_empty() {
            // No fade would ever complete and wake the engine
            return Err(HardwareError::NoChannels);
        }
        if !timer.is_valid() {
            return Err(HardwareError::InvalidDutyResolution(timer.duty_resolution_bits));
        }

        let mut configured = Vec::new();
        let mut mask = 0;
        for config in channels {
            let bit =
                channel_bit(config.channel).ok_or(HardwareError::InvalidChannel(config.channel))?;
            configured
                .push(*config)
                .map_err(|_| HardwareError::TooManyChannels)?;
            mask |= bit;
        }

        Ok(Self {
            pwm,
            notifier,
            timer,
            channels: configured,
            mask,
        })
    }

    /// Configure the timer and every channel, then hook up completions
    pub fn configure(&mut self) -> Result<(), HardwareError> {
        self.pwm.configure_timer(&self.timer)?;
        for config in &self.channels {
            self.pwm.configure_channel(config)?;
        }
        self.pwm.register_fade_callback(self.notifier);
        Ok(())
    }

    /// Fade every channel to `duty` over `duration`.
    ///
    /// Each channel is explicitly stopped before the new fade starts, since
    /// some peripherals block or fault when a non-blocking fade is started
    /// over a running one.
    pub fn start_fade(&mut self, duty: &ChannelDuty, duration: Duration) {
        self.notifier.tracker.mark(self.mask);

        let max_duty = self.timer.max_duty();
        for config in &self.channels {
            let fraction = match config.role {
                ChannelRole::Emitter(emitter) => duty.get(emitter),
                ChannelRole::Unused => 0.0,
            };
            let target = hardware_duty(fraction, max_duty);

            if let Err(err) = self.pwm.stop_fade(config.channel) {
                log!("[FadeController.start_fade] stop failed on {}: {}", config.channel, err);
            }
            if let Err(err) = self.pwm.start_fade(config.channel, target, duration) {
                log!("[FadeController.start_fade] start failed on {}: {}", config.channel, err);
                // This fade will never report completion
                self.notifier.notify(config.channel);
            }
        }
    }

    /// Cancel all fades immediately
    pub fn stop_all(&mut self) {
        for config in &self.channels {
            if let Err(err) = self.pwm.stop_fade(config.channel) {
                log!("[FadeController.stop_all] stop failed on {}: {}", config.channel, err);
            }
        }
        self.notifier.tracker.clear();
    }

    /// Check if any channel is still fading
    pub fn is_fading(&self) -> bool {
        self.notifier.tracker.is_fading()
    }

    pub fn channels(&self) -> &[ChannelConfig] {
        &self.channels
    }

    pub fn pwm(&self) -> &P {
        &self.pwm
    }
}
