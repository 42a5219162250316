//! Log output.
//!
//! In the browser messages go straight to the developer console; on native
//! targets (tests, tooling) they go through the `log` facade.

use crate::config::APP_NAME;

/// Log a warning.
pub fn warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&format!("[{}] {}", APP_NAME, message).into());

    #[cfg(not(target_arch = "wasm32"))]
    log::warn!(target: APP_NAME, "{}", message);
}

/// Log an informational message.
pub fn info(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&format!("[{}] {}", APP_NAME, message).into());

    #[cfg(not(target_arch = "wasm32"))]
    log::info!(target: APP_NAME, "{}", message);
}

/// Log a debug message.
pub fn debug(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::debug_1(&format!("[{}] {}", APP_NAME, message).into());

    #[cfg(not(target_arch = "wasm32"))]
    log::debug!(target: APP_NAME, "{}", message);
}
