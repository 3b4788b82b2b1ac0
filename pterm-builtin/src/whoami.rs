use crate::until_cancelled;
use async_trait::async_trait;
use pterm_types::{
    CommandDescriptor, CommandHandler, CommandOutput, CommandResult, ContentSource,
    ExecutionContext, ParsedArgs,
};
use std::sync::Arc;

/// Built-in whoami command description
pub fn description() -> &'static str {
    "Show who runs this site"
}

pub fn descriptor(content: Arc<dyn ContentSource>) -> CommandDescriptor {
    CommandDescriptor::new("whoami", description(), Whoami { content })
}

struct Whoami {
    content: Arc<dyn ContentSource>,
}

#[async_trait]
impl CommandHandler for Whoami {
    async fn execute(&self, _args: ParsedArgs, ctx: ExecutionContext) -> CommandResult {
        let profile = until_cancelled(&ctx, self.content.profile()).await?;
        let mut lines = vec![profile.name, profile.title];
        if let Some(location) = profile.location {
            lines.push(format!("location: {location}"));
        }
        if let Some(summary) = profile.summary {
            lines.push(String::new());
            lines.push(summary);
        }
        Ok(CommandOutput::lines(lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeContent, run};

    #[tokio::test]
    async fn test_profile_lines() {
        let out = run(
            &descriptor(Arc::new(FakeContent::sample())),
            &[],
            ExecutionContext::default(),
        )
        .await
        .unwrap();
        assert_eq!(out.blocks[0].lines, vec!["Ada", "Engineer", "location: London"]);
    }

    #[tokio::test]
    async fn test_collaborator_failure_is_an_error() {
        let err = run(
            &descriptor(Arc::new(FakeContent::failing())),
            &[],
            ExecutionContext::default(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "content service unavailable");
    }
}
