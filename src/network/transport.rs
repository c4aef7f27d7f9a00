//! The request side of a dispatch: options, the `Transport` seam and the
//! `window.fetch` implementation behind it.

use futures::future::{FutureExt, LocalBoxFuture};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestCredentials, RequestInit, RequestMode, Response};

use crate::error::DispatchError;

/// Request body. `Js` carries page objects such as `FormData` untouched.
#[derive(Debug, Clone)]
pub enum Body {
    Text(String),
    Js(JsValue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    Omit,
    SameOrigin,
    Include,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Cors,
    NoCors,
    SameOrigin,
}

/// Transport settings passed through to the fetch call.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
    pub credentials: Option<Credentials>,
    pub mode: Option<Mode>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default().with_method("GET")
    }

    /// POST a JSON document.
    pub fn post_json(json: &str) -> Self {
        Self::default()
            .with_method("POST")
            .with_header("Content-Type", "application/json")
            .with_body(Body::Text(json.to_string()))
    }

    pub fn with_method(mut self, method: &str) -> Self {
        self.method = Some(method.to_string());
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Read a JS `RequestInit`-like object (`{method, headers, body,
    /// credentials, mode}`). `undefined` / `null` give the defaults.
    pub fn from_js(init: &JsValue) -> Result<Self, DispatchError> {
        if init.is_undefined() || init.is_null() {
            return Ok(Self::default());
        }

        let mut options = Self {
            method: js_field(init, "method")?.as_string(),
            headers: read_headers(&js_field(init, "headers")?)?,
            ..Self::default()
        };

        let body = js_field(init, "body")?;
        if !body.is_undefined() && !body.is_null() {
            options.body = Some(match body.as_string() {
                Some(text) => Body::Text(text),
                None => Body::Js(body),
            });
        }

        if let Some(value) = js_field(init, "credentials")?.as_string() {
            options.credentials = Some(value.parse()?);
        }
        if let Some(value) = js_field(init, "mode")?.as_string() {
            options.mode = Some(value.parse()?);
        }
        Ok(options)
    }

    pub(crate) fn to_request(&self, url: &str) -> Result<Request, DispatchError> {
        let init = RequestInit::new();
        if let Some(method) = &self.method {
            init.set_method(method);
        }

        let headers = Headers::new().map_err(DispatchError::js)?;
        for (name, value) in &self.headers {
            headers.append(name, value).map_err(DispatchError::js)?;
        }
        init.set_headers(&headers);

        match &self.body {
            Some(Body::Text(text)) => init.set_body(&JsValue::from_str(text)),
            Some(Body::Js(value)) => init.set_body(value),
            None => {}
        }
        if let Some(credentials) = self.credentials {
            init.set_credentials(credentials.into());
        }
        if let Some(mode) = self.mode {
            init.set_mode(mode.into());
        }

        Request::new_with_str_and_init(url, &init).map_err(DispatchError::js)
    }
}

fn js_field(target: &JsValue, name: &str) -> Result<JsValue, DispatchError> {
    js_sys::Reflect::get(target, &JsValue::from_str(name)).map_err(DispatchError::js)
}

/// Accepts a `Headers` instance, an array of pairs or a plain object.
fn read_headers(value: &JsValue) -> Result<Vec<(String, String)>, DispatchError> {
    if value.is_undefined() || value.is_null() {
        return Ok(Vec::new());
    }

    let entries: Vec<JsValue> = match js_sys::try_iter(value).map_err(DispatchError::js)? {
        Some(iter) => iter.collect::<Result<_, _>>().map_err(DispatchError::js)?,
        None => js_sys::Object::entries(value.unchecked_ref()).iter().collect(),
    };

    entries
        .iter()
        .map(|entry| {
            let pair = js_sys::Array::from(entry);
            match (pair.get(0).as_string(), pair.get(1).as_string()) {
                (Some(name), Some(value)) => Ok((name, value)),
                _ => Err(DispatchError::Js(
                    "TypeError: header names and values must be strings".to_string(),
                )),
            }
        })
        .collect()
}

impl std::str::FromStr for Credentials {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "omit" => Ok(Self::Omit),
            "same-origin" => Ok(Self::SameOrigin),
            "include" => Ok(Self::Include),
            other => Err(DispatchError::Js(format!(
                "TypeError: '{}' is not a valid value for credentials",
                other
            ))),
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cors" => Ok(Self::Cors),
            "no-cors" => Ok(Self::NoCors),
            "same-origin" => Ok(Self::SameOrigin),
            other => Err(DispatchError::Js(format!(
                "TypeError: '{}' is not a valid value for mode",
                other
            ))),
        }
    }
}

impl From<Credentials> for RequestCredentials {
    fn from(c: Credentials) -> Self {
        match c {
            Credentials::Omit => RequestCredentials::Omit,
            Credentials::SameOrigin => RequestCredentials::SameOrigin,
            Credentials::Include => RequestCredentials::Include,
        }
    }
}

impl From<Mode> for RequestMode {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Cors => RequestMode::Cors,
            Mode::NoCors => RequestMode::NoCors,
            Mode::SameOrigin => RequestMode::SameOrigin,
        }
    }
}

/// A completed response whose body has not been read yet.
pub trait TransportResponse {
    fn ok(&self) -> bool;
    fn status(&self) -> u16;
    /// Whether the transport followed a redirect to get here.
    fn redirected(&self) -> bool;
    /// Final URL after redirects.
    fn url(&self) -> String;
    fn text(self: Box<Self>) -> LocalBoxFuture<'static, Result<String, DispatchError>>;
}

/// Performs one network request. A rejected request is an `Err`; any
/// response, whatever its status, is an `Ok`.
pub trait Transport {
    fn send<'a>(
        &'a self,
        url: &'a str,
        options: &'a RequestOptions,
    ) -> LocalBoxFuture<'a, Result<Box<dyn TransportResponse>, DispatchError>>;
}

/// `window.fetch`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FetchTransport;

impl Transport for FetchTransport {
    fn send<'a>(
        &'a self,
        url: &'a str,
        options: &'a RequestOptions,
    ) -> LocalBoxFuture<'a, Result<Box<dyn TransportResponse>, DispatchError>> {
        async move {
            let request = options.to_request(url)?;
            let window = web_sys::window()
                .ok_or_else(|| DispatchError::Js("no global `window` exists".to_string()))?;
            let value = JsFuture::from(window.fetch_with_request(&request))
                .await
                .map_err(DispatchError::rejected)?;
            let response: Response = value.dyn_into().map_err(DispatchError::js)?;
            Ok(Box::new(FetchResponse(response)) as Box<dyn TransportResponse>)
        }
        .boxed_local()
    }
}

struct FetchResponse(Response);

impl TransportResponse for FetchResponse {
    fn ok(&self) -> bool {
        self.0.ok()
    }

    fn status(&self) -> u16 {
        self.0.status()
    }

    fn redirected(&self) -> bool {
        self.0.redirected()
    }

    fn url(&self) -> String {
        self.0.url()
    }

    fn text(self: Box<Self>) -> LocalBoxFuture<'static, Result<String, DispatchError>> {
        let promise = self.0.text();
        async move {
            let text = JsFuture::from(promise.map_err(DispatchError::js)?)
                .await
                .map_err(DispatchError::rejected)?;
            Ok(text.as_string().unwrap_or_default())
        }
        .boxed_local()
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn eval(src: &str) -> JsValue {
        js_sys::Function::new_no_args(&format!("return {};", src))
            .call0(&JsValue::NULL)
            .unwrap()
    }

    #[wasm_bindgen_test]
    fn reads_plain_request_init() {
        let init = eval(
            r#"{method: "POST", headers: {"X-Token": "abc"}, body: "a=1",
                credentials: "same-origin", mode: "cors"}"#,
        );
        let options = RequestOptions::from_js(&init).unwrap();
        assert_eq!(options.method.as_deref(), Some("POST"));
        assert_eq!(options.headers, vec![("X-Token".to_string(), "abc".to_string())]);
        assert!(matches!(options.body, Some(Body::Text(ref t)) if t == "a=1"));
        assert_eq!(options.credentials, Some(Credentials::SameOrigin));
        assert_eq!(options.mode, Some(Mode::Cors));
    }

    #[wasm_bindgen_test]
    fn keeps_non_string_bodies_opaque() {
        let init = eval(r#"{method: "POST", body: new FormData()}"#);
        let options = RequestOptions::from_js(&init).unwrap();
        assert!(matches!(options.body, Some(Body::Js(_))));
    }

    #[wasm_bindgen_test]
    fn accepts_headers_instance_and_pairs() {
        let init = eval(r#"{headers: new Headers([["accept", "application/json"]])}"#);
        let options = RequestOptions::from_js(&init).unwrap();
        assert_eq!(
            options.headers,
            vec![("accept".to_string(), "application/json".to_string())]
        );
    }

    #[wasm_bindgen_test]
    fn rejects_unknown_credentials() {
        let init = eval(r#"{credentials: "sometimes"}"#);
        assert!(RequestOptions::from_js(&init).is_err());
    }

    #[wasm_bindgen_test]
    fn undefined_init_gives_defaults() {
        let options = RequestOptions::from_js(&JsValue::UNDEFINED).unwrap();
        assert!(options.method.is_none());
        assert!(options.headers.is_empty());
    }

    #[wasm_bindgen_test]
    fn builds_request_with_method_and_headers() {
        let request = RequestOptions::post_json(r#"{"a":1}"#)
            .with_credentials(Credentials::Include)
            .to_request("https://example.test/save")
            .unwrap();
        assert_eq!(request.method(), "POST");
        assert_eq!(
            request.headers().get("content-type").unwrap().as_deref(),
            Some("application/json")
        );
    }
}
