//! Shared test infrastructure for the light core integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::RefCell;
use std::rc::Rc;

use wamb_light_core::config::DEFAULT_CHANNELS;
use wamb_light_core::{
    ChannelConfig, Duration, EffectEngine, EngineConfig, EngineState, FadeNotifier,
    HardwareError, Instant, LightDriver, PwmDriver, PwmTimerConfig, SharedLightState,
    StepOutcome,
};

/// Max duty of the default 13-bit timer
pub const MAX_DUTY: u32 = 8191;

// ============================================================================
// Mock PWM
// ============================================================================

/// Hardware call recorded by [`MockPwm`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PwmEvent {
    Timer(PwmTimerConfig),
    Channel(u8),
    Stop(u8),
    Fade {
        channel: u8,
        duty: u32,
        duration: Duration,
    },
}

pub type EventLog = Rc<RefCell<Vec<PwmEvent>>>;

/// PWM peripheral that records every call and can fail on command
#[derive(Default)]
pub struct MockPwm {
    pub events: EventLog,
    pub fail_timer: bool,
    pub fail_channel: Option<u8>,
    pub fail_start_on: Option<u8>,
    /// Report each fade as completed as soon as it starts
    pub auto_complete: bool,
    pub notifier: Option<FadeNotifier>,
}

impl MockPwm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the call history
    pub fn events(&self) -> EventLog {
        Rc::clone(&self.events)
    }
}

impl PwmDriver for MockPwm {
    fn configure_timer(&mut self, timer: &PwmTimerConfig) -> Result<(), HardwareError> {
        if self.fail_timer {
            return Err(HardwareError::Timer);
        }
        self.events.borrow_mut().push(PwmEvent::Timer(*timer));
        Ok(())
    }

    fn configure_channel(&mut self, config: &ChannelConfig) -> Result<(), HardwareError> {
        if self.fail_channel == Some(config.channel) {
            return Err(HardwareError::Channel(config.channel));
        }
        self.events
            .borrow_mut()
            .push(PwmEvent::Channel(config.channel));
        Ok(())
    }

    fn register_fade_callback(&mut self, notifier: FadeNotifier) {
        self.notifier = Some(notifier);
    }

    fn start_fade(
        &mut self,
        channel: u8,
        duty: u32,
        duration: Duration,
    ) -> Result<(), HardwareError> {
        if self.fail_start_on == Some(channel) {
            return Err(HardwareError::Fade(channel));
        }
        self.events.borrow_mut().push(PwmEvent::Fade {
            channel,
            duty,
            duration,
        });
        if self.auto_complete {
            if let Some(notifier) = self.notifier {
                notifier.notify(channel);
            }
        }
        Ok(())
    }

    fn stop_fade(&mut self, channel: u8) -> Result<(), HardwareError> {
        self.events.borrow_mut().push(PwmEvent::Stop(channel));
        Ok(())
    }
}

/// Duties and durations of every fade started on `channel`
pub fn channel_fades(events: &EventLog, channel: u8) -> Vec<(u32, Duration)> {
    events
        .borrow()
        .iter()
        .filter_map(|event| match *event {
            PwmEvent::Fade {
                channel: c,
                duty,
                duration,
            } if c == channel => Some((duty, duration)),
            _ => None,
        })
        .collect()
}

/// Number of fades started across all channels
pub fn fade_count(events: &EventLog) -> usize {
    events
        .borrow()
        .iter()
        .filter(|event| matches!(event, PwmEvent::Fade { .. }))
        .count()
}

// ============================================================================
// Harness
// ============================================================================

pub type TestEngine = EffectEngine<MockPwm, &'static SharedLightState>;

/// An initialized driver with its engine, on the default channel layout
pub struct Harness {
    pub driver: &'static LightDriver,
    pub light: &'static SharedLightState,
    pub engine: TestEngine,
    pub events: EventLog,
    pub now: Instant,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_pwm(MockPwm::new())
    }

    pub fn with_pwm(pwm: MockPwm) -> Self {
        let driver: &'static LightDriver = Box::leak(Box::new(LightDriver::new()));
        let light: &'static SharedLightState = Box::leak(Box::new(SharedLightState::default()));
        let events = pwm.events();
        let engine = driver
            .initialize(pwm, light, &EngineConfig::default())
            .expect("hardware setup")
            .expect("first initialize returns the engine");
        events.borrow_mut().clear();

        Self {
            driver,
            light,
            engine,
            events,
            now: Instant::from_millis(0),
        }
    }

    /// Step the engine at the current simulated time
    pub fn step(&mut self) -> StepOutcome {
        self.engine.step(self.now)
    }

    pub fn advance(&mut self, millis: u64) {
        self.now += Duration::from_millis(millis);
    }

    /// Report completion of every configured channel, as the ISR would
    pub fn complete_all(&self) {
        let notifier = self.driver.notifier();
        for config in DEFAULT_CHANNELS {
            notifier.notify(config.channel);
        }
    }

    pub fn is_fading(&self) -> bool {
        self.engine.fades().is_fading()
    }

    /// Drive the engine until it is idle with nothing in flight.
    ///
    /// Fades complete instantly; sleeps jump the clock to their deadline.
    pub fn run_until_idle(&mut self) {
        for _ in 0..10_000 {
            match self.step() {
                StepOutcome::Reevaluate => {}
                StepOutcome::SleepUntil(deadline) => self.now = deadline,
                StepOutcome::WaitForEvent => {
                    if self.is_fading() {
                        self.complete_all();
                    } else if self.engine.state() == EngineState::Idle {
                        return;
                    }
                }
            }
        }
        panic!("engine did not settle");
    }

    pub fn channel_fades(&self, channel: u8) -> Vec<(u32, Duration)> {
        channel_fades(&self.events, channel)
    }

    pub fn fade_count(&self) -> usize {
        fade_count(&self.events)
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }
}
