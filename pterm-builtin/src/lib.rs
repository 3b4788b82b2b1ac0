use pterm_types::{CommandDescriptor, CommandError, ContentSource, ExecutionContext};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

// Builtin command modules
mod clear;
mod date;
mod echo;
mod help;
mod history;
mod open;
mod posts;
mod projects;
mod sleep;
mod whoami;

pub use open::SECTIONS;

/// Every builtin command, in the order `help` lists them.
///
/// Commands that read portfolio or blog records go through `content`.
pub fn builtin_commands(content: Arc<dyn ContentSource>) -> Vec<CommandDescriptor> {
    let commands = vec![
        // Core terminal commands
        help::descriptor(),
        clear::descriptor(),
        history::descriptor(),
        echo::descriptor(),
        date::descriptor(),
        sleep::descriptor(),
        // Site navigation
        open::descriptor(),
        // Portfolio and blog content
        whoami::descriptor(content.clone()),
        projects::descriptor(content.clone()),
        posts::descriptor(content),
    ];
    debug!("builtin commands: {}", commands.len());
    commands
}

/// Await `fut` unless the command is interrupted first.
pub(crate) async fn until_cancelled<T>(
    ctx: &ExecutionContext,
    fut: impl Future<Output = anyhow::Result<T>>,
) -> Result<T, CommandError> {
    tokio::select! {
        biased;
        _ = ctx.cancelled() => {
            debug!("{}: interrupted", ctx.command);
            Err(CommandError::Interrupted)
        }
        res = fut => Ok(res?),
    }
}

/// Parse a positive count argument.
pub(crate) fn parse_count(name: &str, value: &str) -> Result<usize, CommandError> {
    match value.parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(CommandError::Usage(format!(
            "{name} must be a positive number, got '{value}'"
        ))),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use pterm_types::{
        CommandDescriptor, CommandResult, ContentSource, ExecutionContext, ParsedArgs, Post,
        Profile, Project,
    };

    /// Records for handler tests. `None` makes every call fail.
    pub struct FakeContent(pub Option<(Profile, Vec<Project>, Vec<Post>)>);

    impl FakeContent {
        pub fn sample() -> Self {
            let profile = Profile {
                name: "Ada".to_string(),
                title: "Engineer".to_string(),
                location: Some("London".to_string()),
                summary: None,
            };
            let project = |slug: &str, tags: &[&str]| Project {
                slug: slug.to_string(),
                title: slug.to_uppercase(),
                summary: format!("{slug} summary"),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                url: None,
            };
            let post = |slug: &str, day: u32| Post {
                slug: slug.to_string(),
                title: format!("Post {slug}"),
                published: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
                summary: None,
            };
            Self(Some((
                profile,
                vec![project("alpha", &["rust"]), project("beta", &["web", "Rust"])],
                vec![post("old", 1), post("new", 20), post("mid", 10)],
            )))
        }

        pub fn failing() -> Self {
            Self(None)
        }

        fn data(&self) -> Result<&(Profile, Vec<Project>, Vec<Post>)> {
            self.0.as_ref().ok_or_else(|| anyhow!("content service unavailable"))
        }
    }

    #[async_trait]
    impl ContentSource for FakeContent {
        async fn profile(&self) -> Result<Profile> {
            Ok(self.data()?.0.clone())
        }

        async fn projects(&self) -> Result<Vec<Project>> {
            Ok(self.data()?.1.clone())
        }

        async fn posts(&self) -> Result<Vec<Post>> {
            Ok(self.data()?.2.clone())
        }
    }

    /// Validate `args` against the descriptor and run it.
    pub async fn run(
        descriptor: &CommandDescriptor,
        args: &[&str],
        ctx: ExecutionContext,
    ) -> CommandResult {
        let tokens: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let parsed: ParsedArgs = descriptor
            .arg_spec
            .parse(&tokens)
            .map_err(|err| pterm_types::CommandError::Usage(err.to_string()))?;
        let ctx = ExecutionContext {
            command: descriptor.name.clone(),
            ..ctx
        };
        descriptor.handler.execute(parsed, ctx).await
    }
}
