//! Records served by the portfolio/blog collaborators and the interface
//! command handlers use to fetch them.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub published: NaiveDate,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Opaque async data source backing the content commands.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn profile(&self) -> Result<Profile>;

    async fn projects(&self) -> Result<Vec<Project>>;

    async fn posts(&self) -> Result<Vec<Post>>;
}
