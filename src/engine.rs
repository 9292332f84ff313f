//! Effect Engine - the state machine driving the fade controller
//!
//! The engine:
//! - Drains coalesced requests from the [`RequestInbox`]
//! - Applies the desired light state with a short settle fade
//! - Plays effects frame by frame, paced by each frame's duration
//! - Waits for the fade controller to settle before moving on
//!
//! [`EffectEngine::step`] makes one decision and reports when it needs to run
//! again. [`EffectEngine::run`] drives it from a worker task.

use embassy_futures::select::select;
use embassy_time::{Duration, Instant, Timer};

use crate::effect::{Effect, EffectId};
use crate::error::LightError;
use crate::fade::{FadeController, PwmDriver};
use crate::log::log;
use crate::mixer::mix;
use crate::request::RequestInbox;
use crate::state::LightStateSource;

/// Engine states visible from outside
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No effect running, the light follows its desired state
    Idle,
    /// An effect is playing
    RunningEffect,
}

/// When the engine needs to step again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step again right away
    Reevaluate,
    /// Step at the given instant, or earlier when woken
    SleepUntil(Instant),
    /// Step when woken by a request or a settled fade
    WaitForEvent,
}

/// A running instance of an effect
#[derive(Debug)]
struct EffectInvocation {
    effect: &'static Effect,
    /// Frame to play on the next advance
    next_frame: usize,
    /// Frame currently on the outputs
    current_frame: Option<usize>,
    repeats_remaining: u8,
    frame_started_at: Instant,
    frame_duration: Duration,
    abort_requested: bool,
}

impl EffectInvocation {
    fn new(effect: &'static Effect, now: Instant) -> Self {
        Self {
            effect,
            next_frame: 0,
            current_frame: None,
            repeats_remaining: effect.repeats,
            frame_started_at: now,
            frame_duration: Duration::from_millis(0),
            abort_requested: false,
        }
    }

    fn is_on_abortable_frame(&self) -> bool {
        self.current_frame
            .and_then(|index| self.effect.frames.get(index))
            .is_some_and(|frame| frame.abortable)
    }

    fn frame_deadline(&self) -> Instant {
        self.frame_started_at + self.frame_duration
    }
}

/// Effect Engine - plays effects and light state changes
pub struct EffectEngine<P: PwmDriver, S: LightStateSource> {
    fades: FadeController<P>,
    inbox: &'static RequestInbox,
    light: S,
    settle_duration: Duration,

    invocation: Option<EffectInvocation>,
    state_pending: bool,
}

impl<P: PwmDriver, S: LightStateSource> EffectEngine<P, S> {
    pub fn new(
        fades: FadeController<P>,
        inbox: &'static RequestInbox,
        light: S,
        settle_duration: Duration,
    ) -> Self {
        Self {
            fades,
            inbox,
            light,
            settle_duration,
            invocation: None,
            state_pending: false,
        }
    }

    /// Run the engine loop indefinitely
    pub async fn run(&mut self) -> ! {
        loop {
            match self.step(Instant::now()) {
                StepOutcome::Reevaluate => {}
                StepOutcome::SleepUntil(deadline) => {
                    select(self.inbox.wait(), Timer::at(deadline)).await;
                }
                StepOutcome::WaitForEvent => self.inbox.wait().await,
            }
        }
    }

    /// Make one decision.
    ///
    /// Drains all pending requests, handles `Stop` and `Finish` first, then
    /// starts a newly requested effect or advances the current one.
    pub fn step(&mut self, now: Instant) -> StepOutcome {
        let requests = self.inbox.drain();

        if requests.state_changed {
            self.state_pending = true;
        }
        if requests.stop {
            self.stop();
        }
        if requests.finish {
            self.finish();
        }
        if let Some(id) = requests.effect {
            if let Err(err) = self.start_effect(id, now) {
                log!("[EffectEngine.step] effect rejected: {}", err);
            }
        }

        if self.invocation.is_some() {
            self.step_effect(now)
        } else {
            self.step_idle()
        }
    }

    /// Current state of the engine
    pub fn state(&self) -> EngineState {
        if self.invocation.is_some() {
            EngineState::RunningEffect
        } else {
            EngineState::Idle
        }
    }

    /// Id of the running effect
    pub fn active_effect(&self) -> Option<EffectId> {
        self.invocation.as_ref().map(|invocation| invocation.effect.id)
    }

    /// Check if a light state update waits to be applied
    pub fn has_pending_state(&self) -> bool {
        self.state_pending
    }

    pub fn fades(&self) -> &FadeController<P> {
        &self.fades
    }

    fn step_idle(&mut self) -> StepOutcome {
        if self.fades.is_fading() {
            return StepOutcome::WaitForEvent;
        }
        if self.state_pending {
            self.state_pending = false;
            self.apply_current_state();
        }
        StepOutcome::WaitForEvent
    }

    fn step_effect(&mut self, now: Instant) -> StepOutcome {
        if self.fades.is_fading() {
            return StepOutcome::WaitForEvent;
        }
        let Some(invocation) = self.invocation.as_mut() else {
            return StepOutcome::Reevaluate;
        };

        // The frame duration paces the effect even if the fade settled early
        let deadline = invocation.frame_deadline();
        if now < deadline {
            return StepOutcome::SleepUntil(deadline);
        }

        let frames = invocation.effect.frames;
        let Some(frame) = frames.get(invocation.next_frame).copied() else {
            invocation.repeats_remaining = invocation.repeats_remaining.saturating_sub(1);
            if invocation.repeats_remaining > 0 {
                invocation.next_frame = 0;
                return StepOutcome::Reevaluate;
            }
            log!(
                "[EffectEngine.step_effect] effect {} complete",
                invocation.effect.id.as_str()
            );
            self.end_effect();
            return StepOutcome::WaitForEvent;
        };

        if invocation.abort_requested && frame.abortable {
            log!(
                "[EffectEngine.step_effect] effect {} finished at frame {}",
                invocation.effect.id.as_str(),
                invocation.next_frame
            );
            self.end_effect();
            return StepOutcome::WaitForEvent;
        }

        invocation.current_frame = Some(invocation.next_frame);
        invocation.next_frame += 1;
        invocation.frame_started_at = now;
        invocation.frame_duration = frame.duration;

        let target = frame.resolve(&self.light.snapshot());
        self.fades.start_fade(&mix(&target), frame.duration);
        StepOutcome::WaitForEvent
    }

    /// Start an effect, superseding the running one
    fn start_effect(&mut self, id: EffectId, now: Instant) -> Result<(), LightError> {
        let on_off = self.light.snapshot().on_off;
        let Some(effect) = id.effect(on_off) else {
            return Err(LightError::UnknownEffect(id.as_raw()));
        };
        if !effect.is_playable() {
            return Err(LightError::AuthoringInvariantViolated(id));
        }

        log!("[EffectEngine.start_effect] starting {}", id.as_str());
        self.invocation = Some(EffectInvocation::new(effect, now));
        Ok(())
    }

    /// Abort everything and fall back to the desired state
    fn stop(&mut self) {
        if let Some(invocation) = self.invocation.take() {
            log!("[EffectEngine.stop] stopping {}", invocation.effect.id.as_str());
        }
        self.fades.stop_all();
        self.state_pending = false;
        self.apply_current_state();
    }

    /// End the running effect at its next abortable frame
    fn finish(&mut self) {
        let Some(invocation) = self.invocation.as_mut() else {
            log!("[EffectEngine.finish] no effect running, ignoring");
            return;
        };
        if invocation.is_on_abortable_frame() {
            log!(
                "[EffectEngine.finish] effect {} finished on abortable frame",
                invocation.effect.id.as_str()
            );
            self.end_effect();
        } else {
            invocation.abort_requested = true;
        }
    }

    fn end_effect(&mut self) {
        self.invocation = None;
        // The restore fade covers any update queued during the effect
        self.state_pending = false;
        self.apply_current_state();
    }

    fn apply_current_state(&mut self) {
        let duty = mix(&self.light.snapshot());
        self.fades.start_fade(&duty, self.settle_duration);
    }
}
