use crate::parse_count;
use pterm_types::{
    ArgSpec, CommandDescriptor, CommandOutput, CommandResult, ExecutionContext, FnHandler,
    ParsedArgs,
};

/// Built-in history command description
pub fn description() -> &'static str {
    "Show command history"
}

pub fn descriptor() -> CommandDescriptor {
    CommandDescriptor::new("history", description(), FnHandler::new(command))
        .args(ArgSpec::none().optional("count"))
}

/// Numbered history, oldest first. `history <n>` keeps the last `n`.
pub fn command(args: ParsedArgs, ctx: ExecutionContext) -> CommandResult {
    let count = match args.get(0) {
        Some(value) => parse_count("count", value)?,
        None => ctx.history.len(),
    };
    let skip = ctx.history.len().saturating_sub(count);
    let lines: Vec<String> = ctx
        .history
        .iter()
        .enumerate()
        .skip(skip)
        .map(|(i, line)| format!("{:>4}  {line}", i + 1))
        .collect();
    if lines.is_empty() {
        return Ok(CommandOutput::info("history is empty"));
    }
    Ok(CommandOutput::lines(lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::run;

    fn ctx(history: &[&str]) -> ExecutionContext {
        ExecutionContext {
            history: history.iter().map(|h| h.to_string()).collect(),
            ..ExecutionContext::default()
        }
    }

    #[tokio::test]
    async fn test_numbered_entries() {
        let out = run(&descriptor(), &[], ctx(&["help", "whoami", "history"]))
            .await
            .unwrap();
        assert_eq!(
            out.blocks[0].lines,
            vec!["   1  help", "   2  whoami", "   3  history"]
        );
    }

    #[tokio::test]
    async fn test_last_count() {
        let out = run(&descriptor(), &["2"], ctx(&["a", "b", "c"]))
            .await
            .unwrap();
        assert_eq!(out.blocks[0].lines, vec!["   2  b", "   3  c"]);

        let out = run(&descriptor(), &["10"], ctx(&["a"])).await.unwrap();
        assert_eq!(out.blocks[0].lines, vec!["   1  a"]);
    }

    #[tokio::test]
    async fn test_bad_count() {
        let err = run(&descriptor(), &["zero"], ctx(&["a"])).await.unwrap_err();
        assert_eq!(err.to_string(), "count must be a positive number, got 'zero'");
    }
}
