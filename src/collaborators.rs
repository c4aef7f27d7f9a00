//! Handlers the dispatcher calls out to while interpreting a response, and
//! their JavaScript-backed implementations.

use futures::future::{FutureExt, LocalBoxFuture};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::error::DispatchError;

/// Maps the final URL of a transport-level redirect to the page location the
/// browser should go to.
pub trait RedirectResolver {
    fn resolve<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<String, DispatchError>>;
}

/// Receives the `errors` payload of an envelope.
pub trait ErrorsHandler {
    fn handle<'a>(&'a self, errors: &'a Value) -> LocalBoxFuture<'a, Result<(), DispatchError>>;
}

/// Receives every success item, in envelope order.
pub trait SuccessHandler {
    fn on_item<'a>(
        &'a self,
        key: &'a Value,
        value: &'a Value,
    ) -> LocalBoxFuture<'a, Result<(), DispatchError>>;
}

/// Optional per-call handlers.
#[derive(Clone, Copy, Default)]
pub struct Callbacks<'a> {
    pub on_error: Option<&'a dyn ErrorsHandler>,
    pub on_success: Option<&'a dyn SuccessHandler>,
}

impl<'a> Callbacks<'a> {
    pub fn on_error(mut self, handler: &'a dyn ErrorsHandler) -> Self {
        self.on_error = Some(handler);
        self
    }

    pub fn on_success(mut self, handler: &'a dyn SuccessHandler) -> Self {
        self.on_success = Some(handler);
        self
    }
}

/// A JS function supplied by the page. A returned Promise is awaited; a
/// throw or a rejection becomes [`DispatchError::Callback`].
#[derive(Debug, Clone)]
pub struct JsCallback(js_sys::Function);

impl JsCallback {
    pub fn new(function: js_sys::Function) -> Self {
        Self(function)
    }

    async fn call(&self, args: &[JsValue]) -> Result<JsValue, DispatchError> {
        let result = match args {
            [] => self.0.call0(&JsValue::NULL),
            [a] => self.0.call1(&JsValue::NULL, a),
            [a, b, ..] => self.0.call2(&JsValue::NULL, a, b),
        }
        .map_err(DispatchError::callback)?;

        match result.dyn_into::<js_sys::Promise>() {
            Ok(promise) => JsFuture::from(promise)
                .await
                .map_err(DispatchError::callback),
            Err(value) => Ok(value),
        }
    }
}

impl ErrorsHandler for JsCallback {
    fn handle<'a>(&'a self, errors: &'a Value) -> LocalBoxFuture<'a, Result<(), DispatchError>> {
        async move {
            self.call(&[to_js(errors)?]).await?;
            Ok(())
        }
        .boxed_local()
    }
}

impl SuccessHandler for JsCallback {
    fn on_item<'a>(
        &'a self,
        key: &'a Value,
        value: &'a Value,
    ) -> LocalBoxFuture<'a, Result<(), DispatchError>> {
        async move {
            self.call(&[to_js(key)?, to_js(value)?]).await?;
            Ok(())
        }
        .boxed_local()
    }
}

/// A function looked up by name on the global object at call time, so pages
/// may define it after the module has loaded.
#[derive(Debug, Clone)]
pub struct GlobalFunction {
    name: String,
}

impl GlobalFunction {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn lookup(&self) -> Result<JsCallback, DispatchError> {
        let value = js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str(&self.name))
            .map_err(DispatchError::js)?;
        value
            .dyn_into::<js_sys::Function>()
            .map(JsCallback::new)
            .map_err(|_| DispatchError::MissingCollaborator(self.name.clone()))
    }
}

impl RedirectResolver for GlobalFunction {
    fn resolve<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<String, DispatchError>> {
        async move {
            let resolved = self.lookup()?.call(&[JsValue::from_str(url)]).await?;
            Ok(locator_from_js(&resolved))
        }
        .boxed_local()
    }
}

impl ErrorsHandler for GlobalFunction {
    fn handle<'a>(&'a self, errors: &'a Value) -> LocalBoxFuture<'a, Result<(), DispatchError>> {
        async move { self.lookup()?.handle(errors).await }.boxed_local()
    }
}

/// Plain-object conversion, so callbacks see ordinary JS objects rather than
/// `Map`s.
fn to_js(value: &Value) -> Result<JsValue, DispatchError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| DispatchError::Js(e.to_string()))
}

fn locator_from_js(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Some(n) = value.as_f64() {
        return n.to_string();
    }
    String::new()
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use serde_json::json;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn js_callback_awaits_returned_promise() {
        let f = js_sys::Function::new_with_args(
            "key, value",
            "globalThis.__sendBackSeen = key + '=' + value.id; return Promise.resolve();",
        );
        JsCallback::new(f)
            .on_item(&json!("row"), &json!({"id": 7}))
            .await
            .unwrap();
        let seen = js_sys::Reflect::get(&js_sys::global(), &"__sendBackSeen".into()).unwrap();
        assert_eq!(seen.as_string().as_deref(), Some("row=7"));
    }

    #[wasm_bindgen_test]
    async fn rejected_promise_is_a_callback_error() {
        let f = js_sys::Function::new_with_args("errors", "return Promise.reject('bad form');");
        let err = JsCallback::new(f).handle(&json!({"a": 1})).await.unwrap_err();
        assert_eq!(err, DispatchError::Callback("bad form".to_string()));
    }

    #[wasm_bindgen_test]
    async fn thrown_error_keeps_its_name() {
        let f = js_sys::Function::new_with_args("errors", "throw new RangeError('nope');");
        let err = JsCallback::new(f).handle(&json!(true)).await.unwrap_err();
        assert_eq!(err.to_string(), "RangeError: nope");
    }

    #[wasm_bindgen_test]
    async fn missing_global_is_reported_by_name() {
        let err = GlobalFunction::new("__sendBackNoSuchFn")
            .resolve("/x")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::MissingCollaborator("__sendBackNoSuchFn".to_string())
        );
    }

    #[wasm_bindgen_test]
    async fn global_resolver_result_becomes_locator() {
        js_sys::Function::new_no_args(
            "globalThis.__sendBackResolve = async (url) => url.replace('/login', '/home');",
        )
        .call0(&JsValue::NULL)
        .unwrap();
        let target = GlobalFunction::new("__sendBackResolve")
            .resolve("https://site.test/login")
            .await
            .unwrap();
        assert_eq!(target, "https://site.test/home");
    }
}
