use crate::error::DispatchError;
use crate::page::{NoticeKind, NoticeSink, Page};

/// What a finished dispatch asks the page to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Navigate(String),
    Reload,
    Stay,
}

impl Outcome {
    /// Short name handed back to JavaScript callers.
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Navigate(_) => "navigate",
            Outcome::Reload => "reload",
            Outcome::Stay => "stay",
        }
    }

    /// Fire the terminal side effect.
    pub fn apply(&self, page: &dyn Page) -> Result<(), DispatchError> {
        match self {
            Outcome::Navigate(target) => page.navigate(target),
            Outcome::Reload => page.reload(),
            Outcome::Stay => Ok(()),
        }
    }
}

/// Flags collected while one dispatch runs. Created fresh per call and
/// consumed by [`RequestOutcome::finish`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct RequestOutcome {
    should_reload: bool,
    should_redirect: bool,
    redirect_target: String,
}

impl RequestOutcome {
    pub fn redirect(&mut self, target: String) {
        self.should_redirect = true;
        self.redirect_target = target;
    }

    pub fn reload(&mut self) {
        self.should_reload = true;
    }

    /// Any failure degrades to a reload; a pending redirect is dropped.
    pub fn fail(&mut self) {
        self.should_redirect = false;
        self.should_reload = true;
    }

    /// Redirect beats reload. An empty redirect target is replaced by
    /// `fallback` after warning the user.
    pub fn finish(self, fallback: &str, notices: &dyn NoticeSink) -> Outcome {
        if self.should_redirect {
            let target = if self.redirect_target.is_empty() {
                crate::warn_log!("Redirect target is empty, falling back to {}", fallback);
                notices.notice(NoticeKind::Warning, "Redirect.value is not URL");
                fallback.to_string()
            } else {
                self.redirect_target
            };
            Outcome::Navigate(target)
        } else if self.should_reload {
            Outcome::Reload
        } else {
            Outcome::Stay
        }
    }
}
