pub mod config;
pub mod transport;

pub use config::DispatchConfig;
pub use transport::{Body, Credentials, FetchTransport, Mode, RequestOptions, Transport, TransportResponse};

use lazy_static::lazy_static;
use std::sync::RwLock;
use wasm_bindgen::prelude::*;

lazy_static! {
    static ref DISPATCH_CONFIG: RwLock<Option<DispatchConfig>> = RwLock::new(None);
}

/// Initialise the configuration from build-time environment variables.
pub fn init_config() {
    set_config(DispatchConfig::from_env());
}

pub fn set_config(config: DispatchConfig) {
    crate::debug_log!("send_back config: {:?}", config);
    match DISPATCH_CONFIG.write() {
        Ok(mut guard) => *guard = Some(config),
        Err(e) => crate::error_log!("send_back config lock poisoned: {}", e),
    }
}

/// The active configuration, or the build-time defaults when none was set.
pub fn current_config() -> DispatchConfig {
    DISPATCH_CONFIG
        .read()
        .ok()
        .and_then(|guard| guard.clone())
        .unwrap_or_else(DispatchConfig::from_env)
}

/// Initialise the configuration from a JS object, e.g.
/// `init_send_back_config({ baseUrl: "/api", notices: "toast" })`.
#[wasm_bindgen]
pub fn init_send_back_config(config: JsValue) -> Result<(), JsValue> {
    let config: DispatchConfig = if config.is_undefined() || config.is_null() {
        DispatchConfig::from_env()
    } else {
        serde_wasm_bindgen::from_value(config)?
    };
    set_config(config.normalized());
    Ok(())
}
