//! Request inbox of the effect engine.
//!
//! Producers record requests as coalesced flags under a short critical
//! section and raise the wake signal. The engine drains all flags at once
//! at the top of each step, so it sees either all of a producer's update or
//! none of it.

use core::cell::Cell;

use critical_section::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::effect::EffectId;

/// Wake notification of the engine worker. Safe to raise from interrupts.
pub type WakeSignal = Signal<CriticalSectionRawMutex, ()>;

/// Requests recorded since the last drain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingRequests {
    /// The light state snapshot changed
    pub state_changed: bool,
    /// Most recently requested effect
    pub effect: Option<EffectId>,
    /// Wind the running effect down at the next abortable frame
    pub finish: bool,
    /// Terminate immediately
    pub stop: bool,
}

impl PendingRequests {
    pub const fn new() -> Self {
        Self {
            state_changed: false,
            effect: None,
            finish: false,
            stop: false,
        }
    }

    pub const fn is_empty(&self) -> bool {
        !self.state_changed && self.effect.is_none() && !self.finish && !self.stop
    }

    /// Merge a new effect request.
    ///
    /// `Stop` discards everything recorded before it, and later effect
    /// requests overwrite earlier ones.
    fn record_effect(&mut self, id: EffectId) {
        match id {
            EffectId::Stop => {
                *self = Self {
                    stop: true,
                    ..Self::new()
                };
            }
            EffectId::Finish => self.finish = true,
            _ => self.effect = Some(id),
        }
    }
}

/// Shared inbox between producers and the engine worker
pub struct RequestInbox {
    pending: Mutex<Cell<PendingRequests>>,
    wake: WakeSignal,
}

impl RequestInbox {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(Cell::new(PendingRequests::new())),
            wake: Signal::new(),
        }
    }

    /// Record that the light state snapshot changed
    pub fn state_changed(&self) {
        critical_section::with(|cs| {
            let cell = self.pending.borrow(cs);
            let mut pending = cell.get();
            pending.state_changed = true;
            cell.set(pending);
        });
        self.wake();
    }

    /// Record an effect, `Finish` or `Stop` request
    pub fn effect(&self, id: EffectId) {
        critical_section::with(|cs| {
            let cell = self.pending.borrow(cs);
            let mut pending = cell.get();
            pending.record_effect(id);
            cell.set(pending);
        });
        self.wake();
    }

    /// Take all pending requests, leaving the inbox empty
    pub fn drain(&self) -> PendingRequests {
        critical_section::with(|cs| self.pending.borrow(cs).replace(PendingRequests::new()))
    }

    /// Wake the worker
    pub fn wake(&self) {
        self.wake.signal(());
    }

    /// Consume a pending wake without waiting
    pub fn take_wake(&self) -> bool {
        self.wake.try_take().is_some()
    }

    /// Wait until the worker is woken
    pub async fn wait(&self) {
        self.wake.wait().await;
    }
}

impl Default for RequestInbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_requests_coalesce_to_latest() {
        let inbox = RequestInbox::new();
        inbox.effect(EffectId::Blink);
        inbox.effect(EffectId::Breathe);
        inbox.state_changed();
        inbox.state_changed();

        let pending = inbox.drain();
        assert_eq!(pending.effect, Some(EffectId::Breathe));
        assert!(pending.state_changed);
        assert!(inbox.drain().is_empty());
    }

    #[test]
    fn test_stop_discards_earlier_requests() {
        let inbox = RequestInbox::new();
        inbox.state_changed();
        inbox.effect(EffectId::Okay);
        inbox.effect(EffectId::Finish);
        inbox.effect(EffectId::Stop);

        let pending = inbox.drain();
        assert!(pending.stop);
        assert_eq!(pending.effect, None);
        assert!(!pending.finish);
        assert!(!pending.state_changed);
    }

    #[test]
    fn test_effect_after_stop_survives() {
        let inbox = RequestInbox::new();
        inbox.effect(EffectId::Stop);
        inbox.effect(EffectId::Blink);

        let pending = inbox.drain();
        assert!(pending.stop);
        assert_eq!(pending.effect, Some(EffectId::Blink));
    }

    #[test]
    fn test_requests_raise_wake() {
        let inbox = RequestInbox::new();
        assert!(!inbox.take_wake());
        inbox.state_changed();
        inbox.effect(EffectId::Blink);
        assert!(inbox.take_wake());
        assert!(!inbox.take_wake());
    }
}
