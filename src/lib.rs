//! Browser-side request helper.
//!
//! Sends one request, reads the `{detail: {success, errors}}` reply and
//! navigates, reloads or stays on the page accordingly. Exposed to pages as
//! `send_back(url, options, onError?, onSuccess?)` and as the `SendBack`
//! class.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

pub mod macros;
pub mod collaborators;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod network;
pub mod outcome;
pub mod page;
pub mod toast;

#[cfg(test)]
mod tests;

pub use collaborators::{Callbacks, ErrorsHandler, JsCallback, RedirectResolver, SuccessHandler};
pub use dispatcher::Dispatcher;
pub use error::DispatchError;
pub use network::{DispatchConfig, RequestOptions};
pub use outcome::Outcome;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

async fn run_browser(
    url: String,
    fetch_options: JsValue,
    on_error: Option<js_sys::Function>,
    on_success: Option<js_sys::Function>,
) -> Outcome {
    let dispatcher = Dispatcher::browser(network::current_config());

    let options = match RequestOptions::from_js(&fetch_options) {
        Ok(options) => options,
        Err(err) => return dispatcher.fail(&err),
    };

    let on_error = on_error.map(JsCallback::new);
    let on_success = on_success.map(JsCallback::new);
    let callbacks = Callbacks {
        on_error: on_error.as_ref().map(|c| c as &dyn ErrorsHandler),
        on_success: on_success.as_ref().map(|c| c as &dyn SuccessHandler),
    };

    dispatcher.send_back(&url, &options, callbacks).await
}

/// Send a request and act on the reply. Resolves with `"navigate"`,
/// `"reload"` or `"stay"` once the page action has been started; never
/// rejects.
#[wasm_bindgen]
pub async fn send_back(
    url: String,
    fetch_options: JsValue,
    on_error: Option<js_sys::Function>,
    on_success: Option<js_sys::Function>,
) -> Result<JsValue, JsValue> {
    let outcome = run_browser(url, fetch_options, on_error, on_success).await;
    Ok(JsValue::from_str(outcome.kind()))
}

/// Object-style entry point for pages that keep a helper instance around.
/// Each `fetch` is independent; the instance only remembers the last
/// outcome for inspection.
#[wasm_bindgen]
#[derive(Default)]
pub struct SendBack {
    last: Rc<RefCell<Option<Outcome>>>,
}

#[wasm_bindgen]
impl SendBack {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch(
        &self,
        url: String,
        fetch_options: JsValue,
        on_error: Option<js_sys::Function>,
        on_success: Option<js_sys::Function>,
    ) -> js_sys::Promise {
        let last = Rc::clone(&self.last);
        future_to_promise(async move {
            let outcome = run_browser(url, fetch_options, on_error, on_success).await;
            let kind = outcome.kind();
            *last.borrow_mut() = Some(outcome);
            Ok(JsValue::from_str(kind))
        })
    }

    /// `"navigate"`, `"reload"`, `"stay"`, or `undefined` before the first
    /// completed fetch.
    #[wasm_bindgen(js_name = lastOutcome)]
    pub fn last_outcome(&self) -> Option<String> {
        self.last.borrow().as_ref().map(|o| o.kind().to_string())
    }

    /// Navigation target of the last outcome, if it was a redirect.
    #[wasm_bindgen(js_name = lastRedirect)]
    pub fn last_redirect(&self) -> Option<String> {
        match self.last.borrow().as_ref() {
            Some(Outcome::Navigate(target)) => Some(target.clone()),
            _ => None,
        }
    }
}
