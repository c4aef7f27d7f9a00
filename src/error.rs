//! Error type shared by the dispatcher and its collaborators.
//!
//! None of these escape `Dispatcher::dispatch`: every variant is caught at
//! the top of the call and turned into an error notice plus a page reload.
//! The `Display` text is what the user sees after `"Error: "`.

use serde_json::error::Category;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// The server answered with a non-success status. Carries the body text.
    #[error("{body}")]
    TransportFailure { status: u16, body: String },

    /// The fetch promise itself rejected (network down, CORS, aborted).
    #[error("{0}")]
    Rejected(String),

    /// The body is not a usable response envelope.
    #[error("{0}")]
    Malformed(String),

    /// A caller callback or an external collaborator threw or rejected.
    #[error("{0}")]
    Callback(String),

    /// A configured global JS function does not exist on the page.
    #[error("TypeError: {0} is not a function")]
    MissingCollaborator(String),

    #[error("{0}")]
    Js(String),
}

impl DispatchError {
    pub fn rejected(value: JsValue) -> Self {
        Self::Rejected(js_message(&value))
    }

    pub fn callback(value: JsValue) -> Self {
        Self::Callback(js_message(&value))
    }

    pub fn js(value: JsValue) -> Self {
        Self::Js(js_message(&value))
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        let name = match err.classify() {
            Category::Data => "TypeError",
            Category::Syntax | Category::Eof | Category::Io => "SyntaxError",
        };
        Self::Malformed(format!("{}: {}", name, err))
    }
}

impl From<DispatchError> for JsValue {
    fn from(err: DispatchError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

/// Render a thrown JS value the way a template literal would: `Error`
/// objects become `"Name: message"`, strings stay as they are, and anything
/// else goes through `String(value)`.
pub(crate) fn js_message(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.to_string());
    }
    if let Some(text) = value.as_string() {
        return text;
    }
    if value.is_null() {
        return "null".to_string();
    }
    if value.is_undefined() {
        return "undefined".to_string();
    }
    String::from(value.unchecked_ref::<js_sys::Object>().to_string())
}
