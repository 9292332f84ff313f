//! Public entry points of the light core.
//!
//! A [`LightDriver`] lives in a `static` and is shared by every producer:
//! the Zigbee handlers request state updates and effects through it, and
//! the board setup code calls [`LightDriver::initialize`] once to obtain the
//! [`EffectEngine`] it then runs on a worker task.

use core::cell::Cell;

use critical_section::Mutex;

use crate::config::EngineConfig;
use crate::effect::EffectId;
use crate::engine::EffectEngine;
use crate::error::{HardwareError, LightError};
use crate::fade::{FadeController, FadeNotifier, FadeTracker, PwmDriver};
use crate::log::log;
use crate::request::RequestInbox;
use crate::state::LightStateSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InitState {
    Uninitialized,
    /// Hardware configuration in progress
    Initializing,
    Ready,
}

/// Shared handle to the light core
pub struct LightDriver {
    inbox: RequestInbox,
    tracker: FadeTracker,
    init: Mutex<Cell<InitState>>,
}

impl LightDriver {
    pub const fn new() -> Self {
        Self {
            inbox: RequestInbox::new(),
            tracker: FadeTracker::new(),
            init: Mutex::new(Cell::new(InitState::Uninitialized)),
        }
    }

    /// Configure the PWM hardware and build the engine.
    ///
    /// Returns the engine the caller must run on its worker task. Repeated
    /// calls are ignored with a warning and return `Ok(None)`. On a hardware
    /// error no engine is created and initialization may be retried.
    pub fn initialize<P: PwmDriver, S: LightStateSource>(
        &'static self,
        pwm: P,
        light: S,
        config: &EngineConfig<'_>,
    ) -> Result<Option<EffectEngine<P, S>>, HardwareError> {
        let claimed = critical_section::with(|cs| {
            let init = self.init.borrow(cs);
            if init.get() == InitState::Uninitialized {
                init.set(InitState::Initializing);
                true
            } else {
                false
            }
        });
        if !claimed {
            log!("[LightDriver.initialize] already initialized, ignoring");
            return Ok(None);
        }

        let fades = match self.configure(pwm, config) {
            Ok(fades) => fades,
            Err(err) => {
                log!("[LightDriver.initialize] hardware setup failed: {}", err);
                self.set_init(InitState::Uninitialized);
                return Err(err);
            }
        };
        self.set_init(InitState::Ready);
        log!(
            "[LightDriver.initialize] {} channels ready",
            fades.channels().len()
        );
        Ok(Some(EffectEngine::new(
            fades,
            &self.inbox,
            light,
            config.settle_duration,
        )))
    }

    /// Signal that the light state changed.
    ///
    /// Non-blocking; successive updates coalesce into one.
    pub fn apply_state_update(&self) -> Result<(), LightError> {
        self.ensure_ready("apply_state_update")?;
        self.inbox.state_changed();
        Ok(())
    }

    /// Request an effect, `Finish` or `Stop`
    pub fn trigger_effect(&self, id: EffectId) -> Result<(), LightError> {
        self.ensure_ready("trigger_effect")?;
        self.inbox.effect(id);
        Ok(())
    }

    /// Request an effect by its raw Zigbee identifier
    pub fn trigger_raw_effect(&self, raw: u8) -> Result<(), LightError> {
        let Some(id) = EffectId::from_raw(raw) else {
            log!("[LightDriver.trigger_raw_effect] unknown effect id {:#04x}", raw);
            return Err(LightError::UnknownEffect(raw));
        };
        self.trigger_effect(id)
    }

    pub fn is_initialized(&self) -> bool {
        critical_section::with(|cs| self.init.borrow(cs).get() == InitState::Ready)
    }

    /// Completion handle for the PWM fade interrupt
    pub fn notifier(&'static self) -> FadeNotifier {
        FadeNotifier::new(&self.tracker, &self.inbox)
    }

    fn configure<P: PwmDriver>(
        &'static self,
        pwm: P,
        config: &EngineConfig<'_>,
    ) -> Result<FadeController<P>, HardwareError> {
        let mut fades = FadeController::new(pwm, self.notifier(), config.timer, config.channels)?;
        fades.configure()?;
        Ok(fades)
    }

    fn ensure_ready(&self, caller: &str) -> Result<(), LightError> {
        if self.is_initialized() {
            Ok(())
        } else {
            log!("[LightDriver.{}] not initialized, request dropped", caller);
            Err(LightError::NotInitialized)
        }
    }

    fn set_init(&self, state: InitState) {
        critical_section::with(|cs| self.init.borrow(cs).set(state));
    }
}

impl Default for LightDriver {
    fn default() -> Self {
        Self::new()
    }
}
