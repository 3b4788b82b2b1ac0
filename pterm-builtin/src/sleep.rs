use async_trait::async_trait;
use pterm_types::{
    ArgSpec, CommandDescriptor, CommandError, CommandHandler, CommandOutput, CommandResult,
    ExecutionContext, ParsedArgs,
};
use std::time::Duration;
use tracing::debug;

const MAX_SECONDS: f64 = 3600.0;

/// Built-in sleep command description
pub fn description() -> &'static str {
    "Wait for the given number of seconds (Ctrl+C to stop)"
}

pub fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new("sleep", description(), Sleep).args(ArgSpec::none().required("seconds"))
}

struct Sleep;

fn parse_seconds(value: &str) -> Result<Duration, CommandError> {
    match value.parse::<f64>() {
        Ok(secs) if (0.0..=MAX_SECONDS).contains(&secs) => Ok(Duration::from_secs_f64(secs)),
        _ => Err(CommandError::Usage(format!(
            "invalid duration '{value}' (0 to {MAX_SECONDS} seconds)"
        ))),
    }
}

#[async_trait]
impl CommandHandler for Sleep {
    async fn execute(&self, args: ParsedArgs, ctx: ExecutionContext) -> CommandResult {
        let duration = parse_seconds(args.get(0).unwrap_or_default())?;
        debug!("sleep {duration:?}");
        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(CommandError::Interrupted),
            _ = tokio::time::sleep(duration) => Ok(CommandOutput::empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::run;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("1.5").unwrap(), Duration::from_millis(1500));
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("forever").is_err());
        assert!(parse_seconds("7200").is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_then_completes() {
        let out = run(&descriptor(), &["30"], ExecutionContext::default())
            .await
            .unwrap();
        assert!(out.blocks.is_empty());
    }

    #[tokio::test]
    async fn test_honours_interrupt() {
        let ctx = ExecutionContext::default();
        ctx.cancel.cancel();
        let err = run(&descriptor(), &["30"], ctx).await.unwrap_err();
        assert!(matches!(err, CommandError::Interrupted));
    }
}
