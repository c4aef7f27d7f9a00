use serde::{Deserialize, Serialize};

use crate::page::NoticeStyle;

/// Runtime settings for the browser dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DispatchConfig {
    /// Prefix for relative request targets. `None` keeps them same-origin.
    pub base_url: Option<String>,
    /// Where to navigate when a redirect carries no target.
    pub fallback_target: String,
    /// Global JS function resolving transport-level redirects.
    pub redirect_resolver: String,
    /// Global JS function reporting envelope errors when the caller passes
    /// no error callback.
    pub error_reporter: String,
    pub notices: NoticeStyle,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            fallback_target: "/".to_string(),
            redirect_resolver: "check_redirect".to_string(),
            error_reporter: "errorsHandling".to_string(),
            notices: NoticeStyle::Alert,
        }
    }
}

impl DispatchConfig {
    /// Defaults, plus the base URL baked in at build time via the
    /// `SEND_BACK_BASE_URL` environment variable when it is set.
    pub fn from_env() -> Self {
        let config = Self::default();
        match option_env!("SEND_BACK_BASE_URL") {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        let trimmed = url.trim().trim_end_matches('/');
        self.base_url = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Tidy values that came from JavaScript.
    pub fn normalized(self) -> Self {
        let base = self.base_url.clone().unwrap_or_default();
        let mut config = self.with_base_url(&base);
        if config.fallback_target.trim().is_empty() {
            config.fallback_target = "/".to_string();
        }
        config
    }

    /// Full request URL for `target`. Only root-relative paths are joined to
    /// the base URL; absolute and protocol-relative targets pass through.
    pub fn url(&self, target: &str) -> String {
        match &self.base_url {
            Some(base) if target.starts_with('/') && !target.starts_with("//") => {
                format!("{}{}", base, target)
            }
            _ => target.to_string(),
        }
    }
}
