//! Small crate-wide logging macros.
//!
//! Everything ends up on the browser console. Off the wasm target (unit tests
//! on the host) the same lines go to stderr, because the `web_sys::console`
//! bindings cannot be called there.

/// Log to `console.log`, debug builds only.
///
/// ```rust,ignore
/// debug_log!("dispatching {} {}", method, url);
/// ```
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        if cfg!(debug_assertions) {
            $crate::macros::console_log(&format!($($arg)*));
        }
    };
}

/// Log to `console.warn`.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        $crate::macros::console_warn(&format!($($arg)*))
    };
}

/// Log to `console.error`.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        $crate::macros::console_error(&format!($($arg)*))
    };
}

#[doc(hidden)]
pub fn console_log(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::log_1(&msg.into());
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("{}", msg);
}

#[doc(hidden)]
pub fn console_warn(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&msg.into());
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("warn: {}", msg);
}

#[doc(hidden)]
pub fn console_error(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::error_1(&msg.into());
    #[cfg(not(target_arch = "wasm32"))]
    eprintln!("error: {}", msg);
}
