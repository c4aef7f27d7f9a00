//! One request in, one page action out.
//!
//! [`Dispatcher::dispatch`] sends the request, interprets the reply and
//! returns an [`Outcome`]. It never fails: anything that goes wrong on the
//! way is shown to the user and turned into [`Outcome::Reload`].
//! [`Dispatcher::send_back`] additionally performs the outcome on the page.

use crate::collaborators::{Callbacks, ErrorsHandler, GlobalFunction, RedirectResolver};
use crate::envelope::{display_value, to_locator, Branch, ResponseEnvelope, Signal, SuccessItem};
use crate::error::DispatchError;
use crate::network::config::DispatchConfig;
use crate::network::transport::{FetchTransport, RequestOptions, Transport};
use crate::outcome::{Outcome, RequestOutcome};
use crate::page::{notices_for, BrowserPage, NoticeKind, NoticeSink, Page};
use crate::{debug_log, error_log, warn_log};

pub struct Dispatcher {
    config: DispatchConfig,
    transport: Box<dyn Transport>,
    resolver: Box<dyn RedirectResolver>,
    reporter: Box<dyn ErrorsHandler>,
    notices: Box<dyn NoticeSink>,
    page: Box<dyn Page>,
}

impl Dispatcher {
    pub fn new(
        config: DispatchConfig,
        transport: Box<dyn Transport>,
        resolver: Box<dyn RedirectResolver>,
        reporter: Box<dyn ErrorsHandler>,
        notices: Box<dyn NoticeSink>,
        page: Box<dyn Page>,
    ) -> Self {
        Self {
            config,
            transport,
            resolver,
            reporter,
            notices,
            page,
        }
    }

    /// `window.fetch`, the configured global resolver/reporter functions,
    /// configured notices and the current tab.
    pub fn browser(config: DispatchConfig) -> Self {
        let resolver = GlobalFunction::new(config.redirect_resolver.clone());
        let reporter = GlobalFunction::new(config.error_reporter.clone());
        let notices = notices_for(config.notices);
        Self::new(
            config,
            Box::new(FetchTransport),
            Box::new(resolver),
            Box::new(reporter),
            notices,
            Box::new(BrowserPage),
        )
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    pub async fn dispatch(
        &self,
        target: &str,
        options: &RequestOptions,
        callbacks: Callbacks<'_>,
    ) -> Outcome {
        let url = self.config.url(target);
        debug_log!(
            "send_back: {} {}",
            options.method.as_deref().unwrap_or("GET"),
            url
        );

        let mut state = RequestOutcome::default();
        if let Err(err) = self.run(&url, options, callbacks, &mut state).await {
            self.recover(&err, &mut state);
        }

        let outcome = state.finish(&self.config.fallback_target, self.notices.as_ref());
        debug_log!("send_back: {} -> {:?}", url, outcome);
        outcome
    }

    /// [`dispatch`](Self::dispatch), then navigate or reload the page.
    pub async fn send_back(
        &self,
        target: &str,
        options: &RequestOptions,
        callbacks: Callbacks<'_>,
    ) -> Outcome {
        let outcome = self.dispatch(target, options, callbacks).await;
        self.apply(&outcome);
        outcome
    }

    /// Handle an error raised before a request could be sent, e.g. unusable
    /// JS request options. Same treatment as a failed request.
    pub fn fail(&self, err: &DispatchError) -> Outcome {
        let mut state = RequestOutcome::default();
        self.recover(err, &mut state);
        let outcome = state.finish(&self.config.fallback_target, self.notices.as_ref());
        self.apply(&outcome);
        outcome
    }

    fn apply(&self, outcome: &Outcome) {
        if let Err(e) = outcome.apply(self.page.as_ref()) {
            error_log!("Failed to {} page: {}", outcome.kind(), e);
        }
    }

    fn recover(&self, err: &DispatchError, state: &mut RequestOutcome) {
        let text = format!("Error: {}", err);
        error_log!("{}", text);
        self.notices.notice(NoticeKind::Error, &text);
        state.fail();
    }

    async fn run(
        &self,
        url: &str,
        options: &RequestOptions,
        callbacks: Callbacks<'_>,
        state: &mut RequestOutcome,
    ) -> Result<(), DispatchError> {
        let response = self.transport.send(url, options).await?;

        if !response.ok() {
            let status = response.status();
            let body = response.text().await?;
            return Err(DispatchError::TransportFailure { status, body });
        }

        if response.redirected() {
            let final_url = response.url();
            debug_log!("send_back: followed redirect to {}", final_url);
            let target = self.resolver.resolve(&final_url).await?;
            state.redirect(target);
            return Ok(());
        }

        let body = response.text().await?;
        match ResponseEnvelope::parse(&body)?.into_branch()? {
            Branch::Errors(errors) => match callbacks.on_error {
                Some(handler) => handler.handle(&errors).await?,
                None => self.reporter.handle(&errors).await?,
            },
            Branch::Success(raw_items) => {
                for raw in &raw_items {
                    let item = SuccessItem::from_value(raw)?;
                    match item.signal() {
                        Signal::Redirect => state.redirect(to_locator(&item.value)),
                        Signal::Message => self.notices.notice(
                            NoticeKind::Message,
                            &format!("Message: {}", display_value(&item.value)),
                        ),
                        Signal::Reload => state.reload(),
                        Signal::Other(key) if callbacks.on_success.is_none() => {
                            warn_log!("send_back: unhandled success key {}", key);
                        }
                        Signal::Other(_) => {}
                    }
                    if let Some(handler) = callbacks.on_success {
                        handler.on_item(&item.key, &item.value).await?;
                    }
                }
            }
            Branch::Empty => {}
        }
        Ok(())
    }
}
