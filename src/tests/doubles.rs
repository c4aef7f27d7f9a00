//! In-memory stand-ins for the browser, shared through `Rc` handles so the
//! test can inspect what the dispatcher did after handing ownership over.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture};
use serde_json::Value;

use crate::collaborators::{ErrorsHandler, RedirectResolver, SuccessHandler};
use crate::dispatcher::Dispatcher;
use crate::envelope::display_value;
use crate::error::DispatchError;
use crate::network::config::DispatchConfig;
use crate::network::transport::{RequestOptions, Transport, TransportResponse};
use crate::page::{NoticeKind, NoticeSink, Page};

#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub redirected: bool,
    pub url: String,
    pub body: Result<String, DispatchError>,
    pub body_reads: Rc<Cell<usize>>,
}

impl StubResponse {
    pub fn json(body: Value) -> Self {
        Self {
            status: 200,
            redirected: false,
            url: String::new(),
            body: Ok(body.to_string()),
            body_reads: Rc::default(),
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            body: Ok(body.to_string()),
            status,
            ..Self::json(Value::Null)
        }
    }

    pub fn redirected_to(url: &str) -> Self {
        Self {
            redirected: true,
            url: url.to_string(),
            ..Self::raw(200, "<html>login</html>")
        }
    }
}

impl TransportResponse for StubResponse {
    fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn status(&self) -> u16 {
        self.status
    }

    fn redirected(&self) -> bool {
        self.redirected
    }

    fn url(&self) -> String {
        self.url.clone()
    }

    fn text(self: Box<Self>) -> LocalBoxFuture<'static, Result<String, DispatchError>> {
        self.body_reads.set(self.body_reads.get() + 1);
        futures::future::ready(self.body).boxed_local()
    }
}

/// Answers every request with the same reply and records the URLs.
pub struct StubTransport {
    reply: Result<StubResponse, DispatchError>,
    pub sent: Rc<RefCell<Vec<String>>>,
}

impl Transport for StubTransport {
    fn send<'a>(
        &'a self,
        url: &'a str,
        _options: &'a RequestOptions,
    ) -> LocalBoxFuture<'a, Result<Box<dyn TransportResponse>, DispatchError>> {
        self.sent.borrow_mut().push(url.to_string());
        let reply = self
            .reply
            .clone()
            .map(|r| Box::new(r) as Box<dyn TransportResponse>);
        futures::future::ready(reply).boxed_local()
    }
}

/// Prefixes the final URL with `resolved:` unless told to fail or given a
/// fixed `target`.
#[derive(Clone, Default)]
pub struct StubResolver {
    pub calls: Rc<RefCell<Vec<String>>>,
    pub fail: Option<String>,
    pub target: Option<String>,
}

impl RedirectResolver for StubResolver {
    fn resolve<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<String, DispatchError>> {
        self.calls.borrow_mut().push(url.to_string());
        let result = match (&self.fail, &self.target) {
            (Some(msg), _) => Err(DispatchError::Callback(msg.clone())),
            (None, Some(target)) => Ok(target.clone()),
            (None, None) => Ok(format!("resolved:{}", url)),
        };
        futures::future::ready(result).boxed_local()
    }
}

#[derive(Clone, Default)]
pub struct RecordingErrors {
    pub calls: Rc<RefCell<Vec<Value>>>,
}

impl ErrorsHandler for RecordingErrors {
    fn handle<'a>(&'a self, errors: &'a Value) -> LocalBoxFuture<'a, Result<(), DispatchError>> {
        self.calls.borrow_mut().push(errors.clone());
        futures::future::ready(Ok(())).boxed_local()
    }
}

/// Records items; fails on the first item whose key equals `fail_on`.
#[derive(Clone, Default)]
pub struct RecordingSuccess {
    pub calls: Rc<RefCell<Vec<(Value, Value)>>>,
    pub fail_on: Option<String>,
}

impl SuccessHandler for RecordingSuccess {
    fn on_item<'a>(
        &'a self,
        key: &'a Value,
        value: &'a Value,
    ) -> LocalBoxFuture<'a, Result<(), DispatchError>> {
        async move {
            self.calls.borrow_mut().push((key.clone(), value.clone()));
            if self.fail_on.is_some() && key.as_str() == self.fail_on.as_deref() {
                return Err(DispatchError::Callback(format!("handler refused {}", display_value(key))));
            }
            Ok(())
        }
        .boxed_local()
    }
}

#[derive(Clone, Default)]
pub struct RecordingNotices {
    pub shown: Rc<RefCell<Vec<(NoticeKind, String)>>>,
}

impl NoticeSink for RecordingNotices {
    fn notice(&self, kind: NoticeKind, text: &str) {
        self.shown.borrow_mut().push((kind, text.to_string()));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAction {
    Navigate(String),
    Reload,
}

#[derive(Clone, Default)]
pub struct RecordingPage {
    pub actions: Rc<RefCell<Vec<PageAction>>>,
}

impl Page for RecordingPage {
    fn navigate(&self, target: &str) -> Result<(), DispatchError> {
        self.actions
            .borrow_mut()
            .push(PageAction::Navigate(target.to_string()));
        Ok(())
    }

    fn reload(&self) -> Result<(), DispatchError> {
        self.actions.borrow_mut().push(PageAction::Reload);
        Ok(())
    }
}

/// A dispatcher wired to doubles, plus handles on everything it touches.
pub struct Harness {
    pub dispatcher: Dispatcher,
    pub sent: Rc<RefCell<Vec<String>>>,
    pub resolver: StubResolver,
    pub reporter: RecordingErrors,
    pub notices: RecordingNotices,
    pub page: RecordingPage,
}

impl Harness {
    pub fn new(reply: Result<StubResponse, DispatchError>) -> Self {
        Self::build(DispatchConfig::default(), reply, StubResolver::default())
    }

    pub fn build(
        config: DispatchConfig,
        reply: Result<StubResponse, DispatchError>,
        resolver: StubResolver,
    ) -> Self {
        let sent = Rc::new(RefCell::new(Vec::new()));
        let reporter = RecordingErrors::default();
        let notices = RecordingNotices::default();
        let page = RecordingPage::default();
        let dispatcher = Dispatcher::new(
            config,
            Box::new(StubTransport {
                reply,
                sent: Rc::clone(&sent),
            }),
            Box::new(resolver.clone()),
            Box::new(reporter.clone()),
            Box::new(notices.clone()),
            Box::new(page.clone()),
        );
        Self {
            dispatcher,
            sent,
            resolver,
            reporter,
            notices,
            page,
        }
    }

    pub fn notices(&self) -> Vec<(NoticeKind, String)> {
        self.notices.shown.borrow().clone()
    }

    pub fn actions(&self) -> Vec<PageAction> {
        self.page.actions.borrow().clone()
    }
}
