//! Diagnostics output.
//!
//! Lines are printed through `esp-println` when the `esp32-log` feature is
//! enabled. Without it the arguments are still type-checked but nothing is
//! formatted or emitted.

macro_rules! log {
    ($($arg:tt)*) => {{
        #[cfg(feature = "esp32-log")]
        esp_println::println!($($arg)*);
        #[cfg(not(feature = "esp32-log"))]
        if false {
            let _ = core::format_args!($($arg)*);
        }
    }};
}

pub(crate) use log;
