//! Sinks for the user-visible side of a dispatch: notices, navigation and
//! reload.

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// A `message` item sent by the server.
    Message,
    /// A recoverable problem, e.g. a redirect without a target.
    Warning,
    /// A failed dispatch. The page is about to reload.
    Error,
}

/// How the browser dispatcher shows notices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeStyle {
    #[default]
    Alert,
    Toast,
}

/// Synchronous "show the user this text".
pub trait NoticeSink {
    fn notice(&self, kind: NoticeKind, text: &str);
}

/// Terminal page actions.
pub trait Page {
    fn navigate(&self, target: &str) -> Result<(), DispatchError>;
    fn reload(&self) -> Result<(), DispatchError>;
}

/// Blocking `window.alert` notices.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlertNotices;

impl NoticeSink for AlertNotices {
    fn notice(&self, _kind: NoticeKind, text: &str) {
        let Some(window) = web_sys::window() else {
            crate::warn_log!("No window to show notice: {}", text);
            return;
        };
        if let Err(e) = window.alert_with_message(text) {
            crate::warn_log!("alert() failed: {:?}", e);
        }
    }
}

/// The current browser tab.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserPage;

impl BrowserPage {
    fn location() -> Result<web_sys::Location, DispatchError> {
        web_sys::window()
            .map(|w| w.location())
            .ok_or_else(|| DispatchError::Js("no global `window` exists".to_string()))
    }
}

impl Page for BrowserPage {
    fn navigate(&self, target: &str) -> Result<(), DispatchError> {
        Self::location()?.set_href(target).map_err(DispatchError::js)
    }

    fn reload(&self) -> Result<(), DispatchError> {
        Self::location()?.reload().map_err(DispatchError::js)
    }
}

/// Build the notice sink for a configured style.
pub fn notices_for(style: NoticeStyle) -> Box<dyn NoticeSink> {
    match style {
        NoticeStyle::Alert => Box::new(AlertNotices),
        NoticeStyle::Toast => Box::new(crate::toast::ToastNotices),
    }
}
