use crate::{parse_count, until_cancelled};
use async_trait::async_trait;
use pterm_types::{
    ArgSpec, CommandDescriptor, CommandHandler, CommandOutput, CommandResult, ContentSource,
    ExecutionContext, ParsedArgs,
};
use std::cmp::Reverse;
use std::sync::Arc;

const DEFAULT_LIMIT: usize = 10;

/// Built-in posts command description
pub fn description() -> &'static str {
    "List recent blog posts, newest first"
}

pub fn descriptor(content: Arc<dyn ContentSource>) -> CommandDescriptor {
    CommandDescriptor::new("posts", description(), Posts { content })
        .alias("blog")
        .args(ArgSpec::none().option("limit", Some('n')))
}

struct Posts {
    content: Arc<dyn ContentSource>,
}

#[async_trait]
impl CommandHandler for Posts {
    async fn execute(&self, args: ParsedArgs, ctx: ExecutionContext) -> CommandResult {
        let limit = match args.value("limit") {
            Some(value) => parse_count("limit", value)?,
            None => DEFAULT_LIMIT,
        };
        let mut posts = until_cancelled(&ctx, self.content.posts()).await?;
        if posts.is_empty() {
            return Ok(CommandOutput::info("no posts yet"));
        }

        posts.sort_by_key(|p| Reverse(p.published));
        let lines: Vec<String> = posts
            .iter()
            .take(limit)
            .map(|p| format!("{}  {}  (/blog/{})", p.published, p.title, p.slug))
            .collect();
        Ok(CommandOutput::lines(lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeContent, run};

    fn posts() -> CommandDescriptor {
        descriptor(Arc::new(FakeContent::sample()))
    }

    #[tokio::test]
    async fn test_newest_first() {
        let out = run(&posts(), &[], ExecutionContext::default())
            .await
            .unwrap();
        assert_eq!(
            out.blocks[0].lines,
            vec![
                "2024-01-20  Post new  (/blog/new)",
                "2024-01-10  Post mid  (/blog/mid)",
                "2024-01-01  Post old  (/blog/old)",
            ]
        );
    }

    #[tokio::test]
    async fn test_limit() {
        let out = run(&posts(), &["--limit", "1"], ExecutionContext::default())
            .await
            .unwrap();
        assert_eq!(out.blocks[0].lines, vec!["2024-01-20  Post new  (/blog/new)"]);

        assert!(
            run(&posts(), &["-n", "0"], ExecutionContext::default())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_interrupted_before_fetch() {
        let ctx = ExecutionContext::default();
        ctx.cancel.cancel();
        let err = run(&posts(), &[], ctx).await.unwrap_err();
        assert!(matches!(err, pterm_types::CommandError::Interrupted));
    }
}
