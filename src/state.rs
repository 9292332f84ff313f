//! Light state shared with the light configuration owner
//!
//! The owner writes the desired state, the engine only takes snapshots.

use core::cell::Cell;

use critical_section::Mutex;

use crate::mixer::LightState;

/// Read access to the desired light state
pub trait LightStateSource {
    /// Current state, read as a whole
    fn snapshot(&self) -> LightState;
}

/// Light state cell guarded by a critical section
pub struct SharedLightState {
    inner: Mutex<Cell<LightState>>,
}

impl SharedLightState {
    pub const fn new(initial: LightState) -> Self {
        Self {
            inner: Mutex::new(Cell::new(initial)),
        }
    }

    /// Replace the whole state
    pub fn set(&self, state: LightState) {
        critical_section::with(|cs| self.inner.borrow(cs).set(state));
    }

    /// Modify the state in place
    pub fn update(&self, f: impl FnOnce(&mut LightState)) {
        critical_section::with(|cs| {
            let cell = self.inner.borrow(cs);
            let mut state = cell.get();
            f(&mut state);
            cell.set(state);
        });
    }

    pub fn set_on_off(&self, on_off: bool) {
        self.update(|state| state.on_off = on_off);
    }

    pub fn set_level(&self, level: u8) {
        self.update(|state| state.level = level);
    }

    pub fn set_color_temperature(&self, color_temperature: u16) {
        self.update(|state| state.color_temperature = color_temperature);
    }

    pub fn set_level_options(&self, level_options: u8) {
        self.update(|state| state.level_options = level_options);
    }
}

impl Default for SharedLightState {
    fn default() -> Self {
        Self::new(LightState::new())
    }
}

impl LightStateSource for SharedLightState {
    fn snapshot(&self) -> LightState {
        critical_section::with(|cs| self.inner.borrow(cs).get())
    }
}

impl<T: LightStateSource + ?Sized> LightStateSource for &T {
    fn snapshot(&self) -> LightState {
        (**self).snapshot()
    }
}
