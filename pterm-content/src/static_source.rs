use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use pterm_types::{ContentSource, Post, Profile, Project};

/// Serves a fixed set of records from memory.
#[derive(Debug, Clone)]
pub struct StaticContentSource {
    profile: Profile,
    projects: Vec<Project>,
    posts: Vec<Post>,
}

impl StaticContentSource {
    pub fn new(profile: Profile, projects: Vec<Project>, posts: Vec<Post>) -> Self {
        Self {
            profile,
            projects,
            posts,
        }
    }

    /// Records shown when no content API is configured.
    pub fn sample() -> Self {
        let profile = Profile {
            name: "Guest Author".to_string(),
            title: "Software Engineer".to_string(),
            location: Some("Remote".to_string()),
            summary: Some("Builds tools for the terminal and the web.".to_string()),
        };
        let projects = vec![
            project(
                "pterm",
                "pterm",
                "Terminal emulator core for this site",
                &["rust", "terminal"],
            ),
            project(
                "blog-engine",
                "Blog engine",
                "Static site generator behind the blog",
                &["rust", "web"],
            ),
            project(
                "dotfiles",
                "dotfiles",
                "Shell and editor configuration",
                &["shell"],
            ),
        ];
        let posts = vec![
            post("hello-world", "Hello, world", (2023, 11, 2)),
            post("terminal-in-the-browser", "A terminal in the browser", (2024, 5, 18)),
            post("fifo-everywhere", "FIFO everywhere", (2024, 9, 7)),
        ];
        Self::new(profile, projects, posts)
    }
}

fn project(slug: &str, title: &str, summary: &str, tags: &[&str]) -> Project {
    Project {
        slug: slug.to_string(),
        title: title.to_string(),
        summary: summary.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        url: Some(format!("/projects/{slug}")),
    }
}

fn post(slug: &str, title: &str, (y, m, d): (i32, u32, u32)) -> Post {
    Post {
        slug: slug.to_string(),
        title: title.to_string(),
        published: NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default(),
        summary: None,
    }
}

#[async_trait]
impl ContentSource for StaticContentSource {
    async fn profile(&self) -> Result<Profile> {
        Ok(self.profile.clone())
    }

    async fn projects(&self) -> Result<Vec<Project>> {
        Ok(self.projects.clone())
    }

    async fn posts(&self) -> Result<Vec<Post>> {
        Ok(self.posts.clone())
    }
}
