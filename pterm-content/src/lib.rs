//! Collaborators serving the portfolio and blog records.

mod client;
mod config;
mod static_source;

pub use crate::client::HttpContentSource;
pub use crate::config::{ContentConfig, DEFAULT_TIMEOUT_SECS};
pub use crate::static_source::StaticContentSource;

use anyhow::Result;
use pterm_types::ContentSource;
use std::sync::Arc;
use tracing::info;

/// HTTP source when a base URL is configured, the built-in records
/// otherwise.
pub fn content_source(config: &ContentConfig) -> Result<Arc<dyn ContentSource>> {
    match config.base_url() {
        Some(url) => {
            info!("content source: {url}");
            Ok(Arc::new(HttpContentSource::try_from_config(config)?))
        }
        None => {
            info!("content source: built-in sample");
            Ok(Arc::new(StaticContentSource::sample()))
        }
    }
}
