use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Default prompt rendered before the current line and in echo blocks.
pub const DEFAULT_PROMPT: &str = "guest@portfolio:~$ ";

/// Default number of scrollback blocks kept.
pub const DEFAULT_MAX_BLOCKS: usize = 500;

/// Default number of history entries kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// How long a command may ignore an interrupt before it is abandoned.
pub const DEFAULT_INTERRUPT_GRACE_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    pub prompt: String,
    pub max_blocks: usize,
    /// `None` keeps every entry.
    pub history_limit: Option<usize>,
    pub interrupt_grace_ms: u64,
    pub banner: Option<String>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            max_blocks: DEFAULT_MAX_BLOCKS,
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
            interrupt_grace_ms: DEFAULT_INTERRUPT_GRACE_MS,
            banner: None,
        }
    }
}

impl TerminalConfig {
    /// Build a config from a key lookup (usually the process environment).
    pub fn from_getter(mut getter: impl FnMut(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let prompt = getter("PTERM_PROMPT")
            .filter(|p| !p.is_empty())
            .unwrap_or(defaults.prompt);

        let max_blocks = parse_or("PTERM_MAX_BLOCKS", getter("PTERM_MAX_BLOCKS"))
            .unwrap_or(defaults.max_blocks)
            .max(1);

        let history_limit = match parse_or::<usize>(
            "PTERM_HISTORY_LIMIT",
            getter("PTERM_HISTORY_LIMIT"),
        ) {
            Some(0) => None,
            Some(limit) => Some(limit),
            None => defaults.history_limit,
        };

        let interrupt_grace_ms = parse_or(
            "PTERM_INTERRUPT_GRACE_MS",
            getter("PTERM_INTERRUPT_GRACE_MS"),
        )
        .unwrap_or(defaults.interrupt_grace_ms);

        let banner = getter("PTERM_BANNER").filter(|b| !b.trim().is_empty());

        Self {
            prompt,
            max_blocks,
            history_limit,
            interrupt_grace_ms,
            banner,
        }
    }

    pub fn from_env() -> Self {
        Self::from_getter(|key| std::env::var(key).ok())
    }

    pub fn interrupt_grace(&self) -> Duration {
        Duration::from_millis(self.interrupt_grace_ms)
    }

    pub fn with_max_blocks(mut self, max_blocks: usize) -> Self {
        self.max_blocks = max_blocks.max(1);
        self
    }

    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, value: Option<String>) -> Option<T> {
    let value = value?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("ignoring invalid value for {key}: {value:?}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn getter(pairs: &[(&str, &str)]) -> impl FnMut(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = TerminalConfig::from_getter(|_| None);
        assert_eq!(cfg, TerminalConfig::default());
        assert_eq!(cfg.interrupt_grace(), Duration::from_millis(2000));
    }

    #[test]
    fn reads_values_from_getter() {
        let cfg = TerminalConfig::from_getter(getter(&[
            ("PTERM_PROMPT", "> "),
            ("PTERM_MAX_BLOCKS", "20"),
            ("PTERM_HISTORY_LIMIT", "0"),
            ("PTERM_INTERRUPT_GRACE_MS", "50"),
            ("PTERM_BANNER", "hello"),
        ]));
        assert_eq!(cfg.prompt, "> ");
        assert_eq!(cfg.max_blocks, 20);
        assert_eq!(cfg.history_limit, None);
        assert_eq!(cfg.interrupt_grace_ms, 50);
        assert_eq!(cfg.banner.as_deref(), Some("hello"));
    }

    #[test]
    fn invalid_values_fall_back() {
        let cfg = TerminalConfig::from_getter(getter(&[
            ("PTERM_MAX_BLOCKS", "lots"),
            ("PTERM_HISTORY_LIMIT", "-1"),
        ]));
        assert_eq!(cfg.max_blocks, DEFAULT_MAX_BLOCKS);
        assert_eq!(cfg.history_limit, Some(DEFAULT_HISTORY_LIMIT));
    }

    #[test]
    fn max_blocks_is_never_zero() {
        let cfg = TerminalConfig::from_getter(getter(&[("PTERM_MAX_BLOCKS", "0")]));
        assert_eq!(cfg.max_blocks, 1);
        assert_eq!(TerminalConfig::default().with_max_blocks(0).max_blocks, 1);
    }
}
