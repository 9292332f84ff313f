#![no_std]

pub mod calibration;
pub mod config;
pub mod driver;
pub mod effect;
pub mod engine;
pub mod error;
pub mod fade;
mod log;
pub mod mixer;
pub mod request;
pub mod state;

pub use calibration::Emitter;
pub use config::{ChannelConfig, ChannelRole, EngineConfig, PwmTimerConfig};
pub use driver::LightDriver;
pub use effect::{Effect, EffectFrame, EffectId};
pub use engine::{EffectEngine, EngineState, StepOutcome};
pub use error::{HardwareError, LightError};
pub use fade::{FadeController, FadeNotifier, FadeTracker, PwmDriver};
pub use mixer::{ChannelDuty, LightState, mix};
pub use request::RequestInbox;
pub use state::{LightStateSource, SharedLightState};

pub use embassy_time::{Duration, Instant};
