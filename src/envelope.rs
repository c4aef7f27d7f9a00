//! The JSON reply shape understood by the dispatcher:
//!
//! ```json
//! { "detail": { "success": [ { "key": "redirect", "value": "/home" } ],
//!               "errors": null } }
//! ```
//!
//! Property access follows the browser helper this replaces: a `detail`
//! that is a string, number or array simply has no `success` / `errors`,
//! while a missing or `null` one is an error. Presence of `success` /
//! `errors` is decided with JavaScript truthiness, and items are only
//! inspected when the dispatcher reaches them.

use serde_json::{Map, Value};

use crate::error::DispatchError;

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub detail: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuccessItem {
    pub key: Value,
    pub value: Value,
}

/// What a success item asks the page to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal<'a> {
    Redirect,
    Message,
    Reload,
    Other(&'a Value),
}

/// Which half of the envelope the dispatcher acts on. `errors` wins over
/// `success`; the two are never processed together.
#[derive(Debug, Clone, PartialEq)]
pub enum Branch {
    Errors(Value),
    /// Raw items, converted one by one with [`SuccessItem::from_value`].
    Success(Vec<Value>),
    Empty,
}

impl ResponseEnvelope {
    pub fn parse(body: &str) -> Result<Self, DispatchError> {
        let root: Value = serde_json::from_str(body)?;
        let detail = match root {
            Value::Object(mut fields) => fields.remove("detail").unwrap_or(Value::Null),
            _ => Value::Null,
        };
        if detail.is_null() {
            return Err(DispatchError::Malformed(
                "TypeError: Cannot read properties of undefined (reading 'success')".to_string(),
            ));
        }
        Ok(Self { detail })
    }

    pub fn into_branch(self) -> Result<Branch, DispatchError> {
        match self.detail {
            Value::Object(fields) => branch_of(fields),
            _ => Ok(Branch::Empty),
        }
    }
}

fn branch_of(mut fields: Map<String, Value>) -> Result<Branch, DispatchError> {
    if let Some(errors) = fields.remove("errors").filter(is_truthy) {
        return Ok(Branch::Errors(errors));
    }
    match fields.remove("success").filter(is_truthy) {
        Some(Value::Array(items)) => Ok(Branch::Success(items)),
        // Iterating a string walks its characters.
        Some(Value::String(s)) => Ok(Branch::Success(
            s.chars().map(|c| Value::String(c.to_string())).collect(),
        )),
        Some(other) => Err(DispatchError::Malformed(format!(
            "TypeError: detail.success is not iterable ({})",
            other
        ))),
        None => Ok(Branch::Empty),
    }
}

impl SuccessItem {
    /// Read `key` / `value` off one raw item. Only `null` fails; other
    /// non-object items have neither field.
    pub fn from_value(raw: &Value) -> Result<Self, DispatchError> {
        match raw {
            Value::Null => Err(DispatchError::Malformed(
                "TypeError: Cannot read properties of null (reading 'key')".to_string(),
            )),
            Value::Object(fields) => Ok(Self {
                key: fields.get("key").cloned().unwrap_or(Value::Null),
                value: fields.get("value").cloned().unwrap_or(Value::Null),
            }),
            _ => Ok(Self {
                key: Value::Null,
                value: Value::Null,
            }),
        }
    }

    pub fn signal(&self) -> Signal<'_> {
        match self.key.as_str() {
            Some("redirect") => Signal::Redirect,
            Some("message") => Signal::Message,
            Some("reload") => Signal::Reload,
            _ => Signal::Other(&self.key),
        }
    }
}

/// JavaScript `Boolean(value)` for JSON values.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// JavaScript `String(value)` for JSON values, as produced by a template
/// literal: arrays join their elements with `,`, objects render as
/// `[object Object]`, whole floats drop the fraction.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => f.to_string(),
            _ => n.to_string(),
        },
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Navigation target carried by a `redirect` item. Falsy values yield an
/// empty target, which is later replaced by the fallback location.
pub fn to_locator(value: &Value) -> String {
    if is_truthy(value) {
        display_value(value)
    } else {
        String::new()
    }
}
