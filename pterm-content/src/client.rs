use anyhow::{Context as _, Result, anyhow};
use async_trait::async_trait;
use pterm_types::{ContentSource, Post, Profile, Project};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ContentConfig;

/// JSON client for the portfolio and blog APIs.
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    client: Client,
    config: ContentConfig,
}

impl HttpContentSource {
    pub fn try_from_config(config: &ContentConfig) -> Result<Self> {
        if config.base_url().is_none() {
            return Err(anyhow!("content base URL is not configured"));
        }
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, resource: &str) -> Result<T> {
        let url = self
            .config
            .endpoint(resource)
            .ok_or_else(|| anyhow!("content base URL is not configured"))?;
        debug!("req: GET {url}");

        let res = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("{resource} unavailable"))?
            .error_for_status()
            .with_context(|| format!("{resource} unavailable"))?;
        let data = res
            .json::<T>()
            .await
            .with_context(|| format!("unexpected {resource} response"))?;
        Ok(data)
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn profile(&self) -> Result<Profile> {
        self.fetch("profile").await
    }

    async fn projects(&self) -> Result<Vec<Project>> {
        self.fetch("projects").await
    }

    async fn posts(&self) -> Result<Vec<Post>> {
        self.fetch("posts").await
    }
}
