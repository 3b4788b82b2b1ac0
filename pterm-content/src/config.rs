use std::time::Duration;
use tracing::warn;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

const API_PREFIX: &str = "api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentConfig {
    base_url: Option<String>,
    timeout: Duration,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl ContentConfig {
    pub fn new(base_url: Option<String>, timeout_secs: Option<u64>) -> Self {
        Self {
            base_url: sanitize_base_url(base_url),
            timeout: Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }

    pub fn from_getter(mut getter: impl FnMut(&str) -> Option<String>) -> Self {
        let base_url = getter("PTERM_CONTENT_URL");
        let timeout_secs = getter("PTERM_CONTENT_TIMEOUT_SECS").and_then(|value| {
            match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Some(secs),
                _ => {
                    warn!("ignoring PTERM_CONTENT_TIMEOUT_SECS={value:?}");
                    None
                }
            }
        });
        ContentConfig::new(base_url, timeout_secs)
    }

    pub fn from_env() -> Self {
        Self::from_getter(|key| std::env::var(key).ok())
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `{base}/api/{resource}`, if a base URL is configured.
    pub fn endpoint(&self, resource: &str) -> Option<String> {
        self.base_url
            .as_deref()
            .map(|base| format!("{base}/{API_PREFIX}/{}", resource.trim_start_matches('/')))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = sanitize_base_url(Some(base_url.into()));
        self
    }
}

fn sanitize_base_url(base_url: Option<String>) -> Option<String> {
    base_url.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.trim_end_matches('/').to_string())
        }
    })
}
